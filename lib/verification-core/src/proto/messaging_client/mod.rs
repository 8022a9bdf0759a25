use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod rumqttc_client;

#[derive(Debug, thiserror::Error)]
pub enum MessagingError {
    #[error("broker connection failure: `{0}`")]
    ConnectionFailure(String),
    #[error("publish failure: `{0}`")]
    PublishFailure(String),
    #[error("subscribe failure: `{0}`")]
    SubscribeFailure(String),
    #[error("event payload error: `{0}`")]
    Payload(#[from] serde_json::Error),
    #[error("subscription closed")]
    SubscriptionClosed,
    #[error("no reply within the configured timeout")]
    ReplyTimeout,
}

/// Envelope for broker traffic. Payloads are JSON documents typed by
/// `event_type`; request events name the topic their reply must go to.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: String,
    #[serde(rename = "type")]
    pub event_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply_to: Option<String>,
    pub data: serde_json::Value,
}

impl Event {
    pub fn new(event_type: impl Into<String>, data: serde_json::Value) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            event_type: event_type.into(),
            reply_to: None,
            data,
        }
    }

    pub fn data_as<T: DeserializeOwned>(&self) -> Result<T, MessagingError> {
        Ok(serde_json::from_value(self.data.clone())?)
    }
}

#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
#[async_trait::async_trait]
pub trait MessagingSubscription: Send + Sync {
    /// Wait for the next event on the subscribed topic.
    async fn next(&mut self) -> Result<Event, MessagingError>;
}

#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
#[async_trait::async_trait]
pub trait MessagingClient: Send + Sync {
    async fn publish(&self, topic: &str, event: Event) -> Result<(), MessagingError>;

    /// Publish `event` and wait for the answer on its reply topic.
    async fn request(&self, topic: &str, event: Event) -> Result<Event, MessagingError>;

    async fn subscribe(&self, topic: &str)
    -> Result<Box<dyn MessagingSubscription>, MessagingError>;

    /// Whether the broker connection is currently healthy.
    fn alive(&self) -> bool;
}
