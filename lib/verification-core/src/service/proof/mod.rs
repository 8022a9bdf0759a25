use std::sync::Arc;

use crate::provider::http_client::HttpClient;
use crate::provider::signer::SignerClient;
use crate::repository::presentation_repository::PresentationRepository;

pub mod service;

#[cfg(test)]
mod test;

/// Management of proof rows plus the completion leg: signing the selected
/// credentials and posting them to the recorded response endpoint.
#[derive(Clone)]
pub struct ProofService {
    presentation_repository: Arc<dyn PresentationRepository>,
    signer_client: Arc<dyn SignerClient>,
    http_client: Arc<dyn HttpClient>,
}

impl ProofService {
    pub fn new(
        presentation_repository: Arc<dyn PresentationRepository>,
        signer_client: Arc<dyn SignerClient>,
        http_client: Arc<dyn HttpClient>,
    ) -> Self {
        Self {
            presentation_repository,
            signer_client,
            http_client,
        }
    }
}
