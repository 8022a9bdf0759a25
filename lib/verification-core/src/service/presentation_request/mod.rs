use std::sync::Arc;

use crate::config::core_config::CoreConfig;
use crate::proto::messaging_client::MessagingClient;
use crate::provider::signer::SignerClient;
use crate::repository::presentation_repository::PresentationRepository;

pub mod dto;
pub mod listener;
pub mod service;


/// Creation and handout of presentation requests.
///
/// Rows are minted either over the presentation-request topic or through the
/// HTTP request endpoint; both paths converge here. The request object handed
/// to wallets is signed by the external signer service.
#[derive(Clone)]
pub struct PresentationRequestService {
    presentation_repository: Arc<dyn PresentationRepository>,
    signer_client: Arc<dyn SignerClient>,
    messaging: Arc<dyn MessagingClient>,
    config: Arc<CoreConfig>,
}

impl PresentationRequestService {
    pub fn new(
        presentation_repository: Arc<dyn PresentationRepository>,
        signer_client: Arc<dyn SignerClient>,
        messaging: Arc<dyn MessagingClient>,
        config: Arc<CoreConfig>,
    ) -> Self {
        Self {
            presentation_repository,
            signer_client,
            messaging,
            config,
        }
    }
}
