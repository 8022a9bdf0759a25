use std::sync::Arc;
use std::time::Duration;

use super::PresentationRequestService;
use crate::handler::EventHandler;
use crate::proto::messaging_client::{Event, MessagingClient};

/// Serves creation requests arriving over the presentation-request topic.
/// Every request gets exactly one reply on its reply topic.
pub struct PresentationRequestListener {
    service: Arc<PresentationRequestService>,
    messaging: Arc<dyn MessagingClient>,
    topic: String,
}

impl PresentationRequestListener {
    pub fn new(
        service: Arc<PresentationRequestService>,
        messaging: Arc<dyn MessagingClient>,
        topic: impl Into<String>,
    ) -> Self {
        Self {
            service,
            messaging,
            topic: topic.into(),
        }
    }

    pub(crate) async fn handle(&self, event: Event) {
        let Some(reply_to) = event.reply_to.clone() else {
            tracing::warn!(
                event_type = %event.event_type,
                "creation request without a reply topic, dropping"
            );
            return;
        };
        let reply = self.service.handle_creation_event(&event).await;
        if let Err(error) = self.messaging.publish(&reply_to, reply).await {
            tracing::error!(%error, "creation reply could not be published");
        }
    }
}

#[async_trait::async_trait]
impl EventHandler for PresentationRequestListener {
    fn name(&self) -> &'static str {
        "presentation-request"
    }

    async fn listen(&self) {
        loop {
            let mut subscription = match self.messaging.subscribe(&self.topic).await {
                Ok(subscription) => subscription,
                Err(error) => {
                    tracing::error!(%error, topic = %self.topic, "subscription failed");
                    tokio::time::sleep(Duration::from_secs(1)).await;
                    continue;
                }
            };
            loop {
                match subscription.next().await {
                    Ok(event) => self.handle(event).await,
                    Err(error) => {
                        tracing::error!(%error, topic = %self.topic, "event stream failed");
                        break;
                    }
                }
            }
        }
    }

    fn alive(&self) -> bool {
        self.messaging.alive()
    }
}
