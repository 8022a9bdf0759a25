pub mod http_client;
pub mod policy;
pub mod request_object;
pub mod signer;
