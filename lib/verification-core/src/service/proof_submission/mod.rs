use std::sync::Arc;

use crate::config::core_config::CoreConfig;
use crate::proto::messaging_client::MessagingClient;
use crate::provider::signer::SignerClient;
use crate::repository::presentation_repository::PresentationRepository;
use crate::service::presentation_request::PresentationRequestService;

pub mod service;


/// Intake of wallet answers posted to the direct-post endpoint.
#[derive(Clone)]
pub struct ProofSubmissionService {
    presentation_repository: Arc<dyn PresentationRepository>,
    signer_client: Arc<dyn SignerClient>,
    messaging: Arc<dyn MessagingClient>,
    request_service: Arc<PresentationRequestService>,
    config: Arc<CoreConfig>,
}

impl ProofSubmissionService {
    pub fn new(
        presentation_repository: Arc<dyn PresentationRepository>,
        signer_client: Arc<dyn SignerClient>,
        messaging: Arc<dyn MessagingClient>,
        request_service: Arc<PresentationRequestService>,
        config: Arc<CoreConfig>,
    ) -> Self {
        Self {
            presentation_repository,
            signer_client,
            messaging,
            request_service,
            config,
        }
    }
}
