use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use serde_with::base64::Base64;
use serde_with::serde_as;

use super::http_client::HttpClient;
use crate::config::core_config::SignerServiceConfig;
use crate::proto::events::{CreateTokenReply, CreateTokenRequest, EVENT_TYPE_SIGN_TOKEN};
use crate::proto::messaging_client::{Event, MessagingClient, MessagingError};

#[derive(Debug, thiserror::Error)]
pub enum SignerClientError {
    #[error("signer service call error: {0}")]
    Transport(#[from] super::http_client::Error),
    #[error("signer service call error, result was: {0}")]
    Rejected(String),
    #[error("signer payload could not be encoded: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("signer messaging error: {0}")]
    Messaging(#[from] MessagingError),
}

/// Cryptographic operations delegated to the signer service. Presentations
/// are verified and signed over HTTP, request object tokens are minted over
/// the messaging RPC topic.
#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
#[async_trait::async_trait]
pub trait SignerClient: Send + Sync {
    /// Whether the signer service accepts the presentation element as valid.
    async fn verify_presentation(&self, presentation: &Value) -> Result<bool, SignerClientError>;

    /// Sign a presentation envelope; the response body is the signed token.
    async fn sign_presentation(&self, payload: &Value) -> Result<Vec<u8>, SignerClientError>;

    async fn create_request_token(
        &self,
        request: CreateTokenRequest,
    ) -> Result<Vec<u8>, SignerClientError>;
}

#[serde_as]
#[derive(Serialize)]
struct VerifyRequest {
    #[serde_as(as = "Base64")]
    presentation: Vec<u8>,
}

pub struct SignerServiceClient {
    http_client: Arc<dyn HttpClient>,
    messaging: Arc<dyn MessagingClient>,
    config: SignerServiceConfig,
}

impl SignerServiceClient {
    pub fn new(
        http_client: Arc<dyn HttpClient>,
        messaging: Arc<dyn MessagingClient>,
        config: SignerServiceConfig,
    ) -> Self {
        Self {
            http_client,
            messaging,
            config,
        }
    }
}

#[async_trait::async_trait]
impl SignerClient for SignerServiceClient {
    async fn verify_presentation(&self, presentation: &Value) -> Result<bool, SignerClientError> {
        let request = VerifyRequest {
            presentation: serde_json::to_vec(presentation)?,
        };
        let response = self
            .http_client
            .post(&self.config.presentation_verify_url)
            .json(&request)?
            .send()
            .await?;
        if response.status.0 != 200 {
            return Err(SignerClientError::Rejected(
                String::from_utf8_lossy(&response.body).into_owned(),
            ));
        }
        // a reply without a boolean verdict counts as invalid, not as an error
        let verdict: Value = response.json()?;
        Ok(verdict.get("valid").and_then(Value::as_bool).unwrap_or(false))
    }

    async fn sign_presentation(&self, payload: &Value) -> Result<Vec<u8>, SignerClientError> {
        let response = self
            .http_client
            .post(&self.config.presentation_sign_url)
            .json(payload)?
            .send()
            .await?;
        if response.status.0 != 200 {
            return Err(SignerClientError::Rejected(
                String::from_utf8_lossy(&response.body).into_owned(),
            ));
        }
        Ok(response.body)
    }

    async fn create_request_token(
        &self,
        request: CreateTokenRequest,
    ) -> Result<Vec<u8>, SignerClientError> {
        let event = Event::new(EVENT_TYPE_SIGN_TOKEN, serde_json::to_value(&request)?);
        let reply = self.messaging.request(&self.config.signer_topic, event).await?;
        let reply: CreateTokenReply = reply.data_as()?;
        Ok(reply.token)
    }
}
