use std::sync::Arc;

use crate::config::core_config::CoreConfig;
use crate::provider::policy::PolicyEvaluator;
use crate::provider::request_object::RequestObjectFetcher;
use crate::repository::presentation_repository::PresentationRepository;

pub mod listener;
pub mod service;

#[derive(Clone)]
pub struct AuthorizationService {
    presentation_repository: Arc<dyn PresentationRepository>,
    policy_evaluator: Arc<dyn PolicyEvaluator>,
    request_object_fetcher: Arc<dyn RequestObjectFetcher>,
    config: Arc<CoreConfig>,
}

impl AuthorizationService {
    pub fn new(
        presentation_repository: Arc<dyn PresentationRepository>,
        policy_evaluator: Arc<dyn PolicyEvaluator>,
        request_object_fetcher: Arc<dyn RequestObjectFetcher>,
        config: Arc<CoreConfig>,
    ) -> Self {
        Self {
            presentation_repository,
            policy_evaluator,
            request_object_fetcher,
            config,
        }
    }
}

#[cfg(test)]
mod test;
