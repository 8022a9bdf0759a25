use ct_codecs::{Base64NoPadding, Encoder};
use rand::{CryptoRng, RngCore, SeedableRng};
use rand_chacha::ChaCha20Rng;

pub fn get_rng() -> impl RngCore + CryptoRng {
    ChaCha20Rng::from_entropy()
}

pub fn generate_random_bytes<const N: usize>() -> [u8; N] {
    let mut buffer = [0u8; N];
    get_rng().fill_bytes(&mut buffer);
    buffer
}

/// Challenge nonce stored alongside a presentation row, standard alphabet
/// without padding.
pub fn generate_nonce() -> String {
    //This operation should be safe as we control the input.
    Base64NoPadding::encode_to_string(generate_random_bytes::<32>()).unwrap_or_default()
}
