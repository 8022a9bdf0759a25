//! Core of the credential verification service: configuration, the
//! presentation store abstraction, clients for the neighbouring signer,
//! policy and storage services, and the services implementing the
//! presentation exchange itself. [`VerificationCore`] assembles all of it
//! once at startup.

use std::sync::Arc;

use crate::config::core_config::CoreConfig;
use crate::handler::EventHandlerSet;
use crate::proto::messaging_client::MessagingClient;
use crate::proto::messaging_client::rumqttc_client::RumqttcClient;
use crate::provider::http_client::HttpClient;
use crate::provider::http_client::reqwest_client::ReqwestClient;
use crate::provider::policy::HttpPolicyEvaluator;
use crate::provider::request_object::HttpRequestObjectFetcher;
use crate::provider::signer::SignerServiceClient;
use crate::repository::presentation_repository::PresentationRepository;
use crate::service::authorization::AuthorizationService;
use crate::service::authorization::listener::AuthorizationListener;
use crate::service::error::ServiceError;
use crate::service::presentation_request::PresentationRequestService;
use crate::service::presentation_request::listener::PresentationRequestListener;
use crate::service::proof::ProofService;
use crate::service::proof_submission::ProofSubmissionService;

pub mod config;
pub mod handler;
pub mod model;
pub mod proto;
pub mod provider;
pub mod repository;
pub mod service;

/// The assembled verifier. Handlers are registered but not started; call
/// `handlers.start()` once the surrounding runtime is up.
pub struct VerificationCore {
    pub config: Arc<CoreConfig>,
    pub presentation_request_service: Arc<PresentationRequestService>,
    pub authorization_service: Arc<AuthorizationService>,
    pub proof_service: Arc<ProofService>,
    pub proof_submission_service: Arc<ProofSubmissionService>,
    pub handlers: EventHandlerSet,
}

impl VerificationCore {
    pub fn new(
        config: CoreConfig,
        presentation_repository: Arc<dyn PresentationRepository>,
    ) -> Result<Self, ServiceError> {
        let config = Arc::new(config);

        // wallets regularly present self signed certificates; redirects are
        // handled explicitly by the request object fetcher
        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .danger_accept_invalid_certs(true)
            .build()
            .map_err(|error| ServiceError::Other(error.to_string()))?;
        let http_client: Arc<dyn HttpClient> = Arc::new(ReqwestClient::new(client));

        let messaging: Arc<dyn MessagingClient> = Arc::new(RumqttcClient::connect(
            &config.messaging.broker_url,
            config.messaging.broker_port,
            config.messaging.reply_timeout,
        ));

        let signer_client = Arc::new(SignerServiceClient::new(
            http_client.clone(),
            messaging.clone(),
            config.signer.clone(),
        ));
        let policy_evaluator = Arc::new(HttpPolicyEvaluator::new(http_client.clone()));
        let request_object_fetcher = Arc::new(HttpRequestObjectFetcher::new(
            http_client.clone(),
            config.external_presentation.client_url_scheme.clone(),
        ));

        let presentation_request_service = Arc::new(PresentationRequestService::new(
            presentation_repository.clone(),
            signer_client.clone(),
            messaging.clone(),
            config.clone(),
        ));
        let authorization_service = Arc::new(AuthorizationService::new(
            presentation_repository.clone(),
            policy_evaluator,
            request_object_fetcher,
            config.clone(),
        ));
        let proof_service = Arc::new(ProofService::new(
            presentation_repository.clone(),
            signer_client.clone(),
            http_client,
        ));
        let proof_submission_service = Arc::new(ProofSubmissionService::new(
            presentation_repository,
            signer_client,
            messaging.clone(),
            presentation_request_service.clone(),
            config.clone(),
        ));

        let mut handlers = EventHandlerSet::default();
        handlers.register(Arc::new(PresentationRequestListener::new(
            presentation_request_service.clone(),
            messaging.clone(),
            config.topics.presentation_request.clone(),
        )));
        handlers.register(Arc::new(AuthorizationListener::new(
            authorization_service.clone(),
            messaging,
            config.topics.authorization.clone(),
            config.topics.authorization_reply.clone(),
        )));

        Ok(Self {
            config,
            presentation_request_service,
            authorization_service,
            proof_service,
            proof_submission_service,
            handlers,
        })
    }
}
