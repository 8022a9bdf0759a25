use std::sync::Arc;
use std::time::Duration;

use super::AuthorizationService;
use crate::handler::EventHandler;
use crate::proto::events::{
    EVENT_TYPE_PRESENTATION_AUTHORIZATION_REMOTE, RemoteAuthorizationReply,
    RemoteAuthorizationRequest, ReplyBase,
};
use crate::proto::messaging_client::{Event, MessagingClient};
use crate::provider::http_client::Headers;

/// Serves authorization requests arriving over messaging instead of the HTTP
/// authorize endpoint. Successes are confirmed on the reply topic, failures
/// are only logged; the requester learns nothing more than the logs do.
pub struct AuthorizationListener {
    service: Arc<AuthorizationService>,
    messaging: Arc<dyn MessagingClient>,
    topic: String,
    reply_topic: String,
}

impl AuthorizationListener {
    pub fn new(
        service: Arc<AuthorizationService>,
        messaging: Arc<dyn MessagingClient>,
        topic: impl Into<String>,
        reply_topic: impl Into<String>,
    ) -> Self {
        Self {
            service,
            messaging,
            topic: topic.into(),
            reply_topic: reply_topic.into(),
        }
    }

    pub(crate) async fn handle(&self, event: Event) {
        if event.event_type != EVENT_TYPE_PRESENTATION_AUTHORIZATION_REMOTE {
            return;
        }

        let request: RemoteAuthorizationRequest = match event.data_as() {
            Ok(request) => request,
            Err(error) => {
                tracing::error!(%error, "could not decode remote authorization request");
                return;
            }
        };

        let auth_url = match self.service.resolve_authorization_url(None) {
            Ok(url) => url,
            Err(error) => {
                tracing::error!(%error, "authorize endpoint is not usable");
                return;
            }
        };

        let headers = Headers::from([
            ("X-NAMESPACE".to_owned(), request.base.tenant_id.clone()),
            ("X-GROUP".to_owned(), request.base.group_id.clone()),
            ("X-KEY".to_owned(), request.key.clone()),
            ("X-DID".to_owned(), request.did.clone()),
        ]);

        if let Err(error) = self
            .service
            .handle_request_object(
                &request.base.tenant_id,
                &request.client_id,
                &request.request_uri,
                headers,
                auth_url,
            )
            .await
        {
            tracing::error!(%error, "remote authorization failed");
            return;
        }

        let reply = RemoteAuthorizationReply {
            base: ReplyBase {
                tenant_id: request.base.tenant_id,
                request_id: request.base.request_id,
                error: None,
            },
        };
        let data = match serde_json::to_value(&reply) {
            Ok(data) => data,
            Err(error) => {
                tracing::error!(%error, "could not encode remote authorization reply");
                return;
            }
        };
        let event = Event::new(EVENT_TYPE_PRESENTATION_AUTHORIZATION_REMOTE, data);
        if let Err(error) = self.messaging.publish(&self.reply_topic, event).await {
            tracing::error!(%error, "could not publish remote authorization reply");
        }
    }
}

#[async_trait::async_trait]
impl EventHandler for AuthorizationListener {
    fn name(&self) -> &'static str {
        "authorization"
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
