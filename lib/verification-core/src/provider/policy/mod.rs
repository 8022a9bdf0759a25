use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;

use super::http_client::HttpClient;

#[derive(Debug, thiserror::Error)]
#[error("policy evaluation failed: {0}")]
pub struct PolicyError(#[from] super::http_client::Error);

/// Evaluation of externally hosted decision policies.
#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
#[async_trait::async_trait]
pub trait PolicyEvaluator: Send + Sync {
    /// POST the input document to the policy endpoint and return the decision
    /// document verbatim.
    async fn evaluate(
        &self,
        policy_url: &str,
        input: &Value,
    ) -> Result<HashMap<String, Value>, PolicyError>;
}

/// A decision permits processing only when it carries the string `"true"`
/// under `allow`; anything else, including a bare boolean, denies.
pub fn decision_allows(decision: &HashMap<String, Value>) -> bool {
    matches!(decision.get("allow"), Some(Value::String(allow)) if allow == "true")
}

pub struct HttpPolicyEvaluator {
    client: Arc<dyn HttpClient>,
}

impl HttpPolicyEvaluator {
    pub fn new(client: Arc<dyn HttpClient>) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl PolicyEvaluator for HttpPolicyEvaluator {
    async fn evaluate(
        &self,
        policy_url: &str,
        input: &Value,
    ) -> Result<HashMap<String, Value>, PolicyError> {
        let response = self.client.post(policy_url).json(input)?.send().await?;
        Ok(response.error_for_status()?.json()?)
    }
}

#[cfg(test)]
mod test {
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::provider::http_client::reqwest_client::ReqwestClient;

    fn to_decision(value: Value) -> HashMap<String, Value> {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn only_the_string_true_allows() {
        assert!(decision_allows(&to_decision(json!({"allow": "true"}))));
        assert!(!decision_allows(&to_decision(json!({"allow": true}))));
        assert!(!decision_allows(&to_decision(json!({"allow": "false"}))));
        assert!(!decision_allows(&to_decision(json!({}))));
    }

    #[tokio::test]
    async fn evaluate_posts_the_input_and_decodes_the_decision() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/policy/client-id"))
            .and(header("Content-Type", "application/json"))
            .and(body_json(json!({"clientId": "did:web:wallet"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"allow": "true"})))
            .expect(1)
            .mount(&server)
            .await;

        let evaluator = HttpPolicyEvaluator::new(Arc::new(ReqwestClient::default()));
        let decision = evaluator
            .evaluate(
                &format!("{}/policy/client-id", server.uri()),
                &json!({"clientId": "did:web:wallet"}),
            )
            .await
            .unwrap();

        assert!(decision_allows(&decision));
    }

    #[tokio::test]
    async fn evaluate_fails_on_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let evaluator = HttpPolicyEvaluator::new(Arc::new(ReqwestClient::default()));
        let result = evaluator.evaluate(&server.uri(), &json!({})).await;

        assert!(result.is_err());
    }
}
