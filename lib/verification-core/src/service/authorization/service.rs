use secrecy::ExposeSecret;
use serde_json::json;
use url::Url;
use uuid::Uuid;
use verification_crypto::sign_id;

use super::AuthorizationService;
use crate::model::request_object::RESPONSE_MODE_DIRECT_POST;
use crate::provider::http_client::Headers;
use crate::provider::policy::decision_allows;
use crate::provider::request_object::parse_percent_encoded_url;
use crate::service::error::{BusinessLogicError, ServiceError, ValidationError};

impl AuthorizationService {
    /// Resolve the authorization endpoint the presenter is redirected to.
    ///
    /// A caller supplied override that does not parse falls back silently to
    /// the configured endpoint; a broken configured endpoint is an error.
    pub fn resolve_authorization_url(
        &self,
        override_url: Option<&str>,
    ) -> Result<Url, ServiceError> {
        if let Some(raw) = override_url {
            if let Ok(url) = parse_percent_encoded_url(raw, None) {
                return Ok(url);
            }
        }
        let endpoint = &self.config.external_presentation.authorize_endpoint;
        Url::parse(endpoint)
            .map_err(|_| ValidationError::UnparsableAuthorizeEndpoint(endpoint.clone()).into())
    }

    /// Run the authorization exchange for a wallet initiated request: policy
    /// gates, request object fetch, row creation, redirect assembly.
    ///
    /// Returns the URL the presenter is redirected to, carrying the minted
    /// row id as `presentation` together with the request object nonce.
    pub async fn handle_request_object(
        &self,
        tenant_id: &str,
        client_id: &str,
        request_uri: &str,
        headers: Headers,
        mut auth_url: Url,
    ) -> Result<String, ServiceError> {
        if let Some(policy) = configured(&self.config.external_presentation.client_id_policy) {
            let input = json!({ "clientId": client_id });
            let decision = self.policy_evaluator.evaluate(policy, &input).await?;
            if !decision_allows(&decision) {
                return Err(BusinessLogicError::PolicyDenied.into());
            }
        }

        let object = self
            .request_object_fetcher
            .fetch(request_uri, headers)
            .await?;

        if object.response_mode != RESPONSE_MODE_DIRECT_POST {
            return Err(
                BusinessLogicError::UnsupportedResponseMode(object.response_mode).into(),
            );
        }

        if let Some(policy) = configured(&self.config.external_presentation.request_object_policy) {
            let input = serde_json::to_value(&object)
                .map_err(|error| ServiceError::MappingError(error.to_string()))?;
            let decision = self.policy_evaluator.evaluate(policy, &input).await?;
            if !decision_allows(&decision) {
                return Err(BusinessLogicError::PolicyDenied.into());
            }
        }

        // the request object state is the correlation id whenever the wallet set one
        let request_id = if object.state.is_empty() {
            Uuid::new_v4().to_string()
        } else {
            object.state.clone()
        };
        let id = sign_id(tenant_id, self.config.signing_key.expose_secret())?;

        self.presentation_repository
            .store_request_object(tenant_id, &request_id, &id, &object)
            .await?;

        auth_url
            .query_pairs_mut()
            .append_pair("presentation", &id)
            .append_pair("nonce", &object.nonce);
        Ok(auth_url.to_string())
    }
}

/// An empty policy URL means the gate is disabled.
fn configured(policy_url: &str) -> Option<&str> {
    (!policy_url.is_empty()).then_some(policy_url)
}
