/// Where and for whom a request object token is minted.
///
/// `host` and `path` locate the direct-post endpoint the wallet must answer
/// to; `path` carries its leading slash. `did` becomes the `client_id` claim
/// and `key` names the signer key used for the token signature.
#[derive(Clone, Debug, Default)]
pub struct RequestObjectContext {
    pub scheme: String,
    pub host: String,
    pub path: String,
    pub did: String,
    pub key: String,
}
