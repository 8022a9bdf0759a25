use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use rumqttc::{AsyncClient, Event as MqttEvent, MqttOptions, Packet, QoS};
use tokio::sync::{RwLock, broadcast};
use uuid::Uuid;

use super::{Event, MessagingClient, MessagingError, MessagingSubscription};

// rough limit for presentation blobs travelling to the storage pipeline
const MAX_PACKET_SIZE: usize = 30 * 1024 * 1024;
const CHANNEL_CAPACITY: usize = 16;

type TopicSenders = Arc<RwLock<HashMap<String, broadcast::Sender<Event>>>>;

/// MQTT backed messaging. One connection per process; incoming publishes are
/// fanned out to broadcast channels keyed by topic.
pub struct RumqttcClient {
    client: AsyncClient,
    topics: TopicSenders,
    connected: Arc<AtomicBool>,
    reply_timeout: Duration,
}

impl RumqttcClient {
    pub fn connect(host: &str, port: u16, reply_timeout: Duration) -> Self {
        let mut options = MqttOptions::new(
            format!("verification-core-{}", Uuid::new_v4()),
            host,
            port,
        );
        options.set_max_packet_size(MAX_PACKET_SIZE, MAX_PACKET_SIZE);

        let (client, mut event_loop) = AsyncClient::new(options, CHANNEL_CAPACITY);
        let topics: TopicSenders = Arc::default();
        let connected = Arc::new(AtomicBool::new(true));

        let task_topics = topics.clone();
        let task_connected = connected.clone();
        tokio::spawn(async move {
            loop {
                match event_loop.poll().await {
                    Ok(MqttEvent::Incoming(Packet::Publish(publish))) => {
                        task_connected.store(true, Ordering::Relaxed);
                        let event: Event = match serde_json::from_slice(&publish.payload) {
                            Ok(event) => event,
                            Err(error) => {
                                tracing::warn!(%error, topic = %publish.topic, "dropping undecodable event");
                                continue;
                            }
                        };
                        if let Some(sender) = task_topics.read().await.get(&publish.topic) {
                            if sender.send(event).is_err() {
                                tracing::debug!(topic = %publish.topic, "no receiver for event");
                            }
                        }
                    }
                    Ok(_) => {
                        task_connected.store(true, Ordering::Relaxed);
                    }
                    Err(error) => {
                        task_connected.store(false, Ordering::Relaxed);
                        tracing::error!(%error, "broker connection error");
                        tokio::time::sleep(Duration::from_millis(500)).await;
                    }
                }
            }
        });

        Self {
            client,
            topics,
            connected,
            reply_timeout,
        }
    }

    async fn unsubscribe(&self, topic: &str) {
        self.topics.write().await.remove(topic);
        if let Err(error) = self.client.unsubscribe(topic).await {
            tracing::warn!(%error, topic, "failed to unsubscribe reply topic");
        }
    }
}

#[async_trait::async_trait]
impl MessagingClient for RumqttcClient {
    async fn publish(&self, topic: &str, event: Event) -> Result<(), MessagingError> {
        let payload = serde_json::to_vec(&event)?;
        self.client
            .publish(topic, QoS::AtMostOnce, false, payload)
            .await
            .map_err(|error| MessagingError::PublishFailure(error.to_string()))
    }

    async fn request(&self, topic: &str, mut event: Event) -> Result<Event, MessagingError> {
        let reply_topic = format!("{topic}/reply/{}", event.id);
        event.reply_to = Some(reply_topic.clone());

        let mut subscription = self.subscribe(&reply_topic).await?;
        let reply = async {
            self.publish(topic, event).await?;
            tokio::time::timeout(self.reply_timeout, subscription.next())
                .await
                .map_err(|_| MessagingError::ReplyTimeout)?
        }
        .await;
        self.unsubscribe(&reply_topic).await;
        reply
    }

    async fn subscribe(
        &self,
        topic: &str,
    ) -> Result<Box<dyn MessagingSubscription>, MessagingError> {
        let receiver = {
            let mut topics = self.topics.write().await;
            match topics.get(topic) {
                Some(sender) => sender.subscribe(),
                None => {
                    let (sender, receiver) = broadcast::channel(CHANNEL_CAPACITY);
                    topics.insert(topic.to_owned(), sender);
                    receiver
                }
            }
        };
        self.client
            .subscribe(topic, QoS::AtMostOnce)
            .await
            .map_err(|error| MessagingError::SubscribeFailure(error.to_string()))?;
        Ok(Box::new(RumqttcSubscription { receiver }))
    }

    fn alive(&self) -> bool {
        self.connected.load(Ordering::Relaxed)
    }
}

struct RumqttcSubscription {
    receiver: broadcast::Receiver<Event>,
}

#[async_trait::async_trait]
impl MessagingSubscription for RumqttcSubscription {
    async fn next(&mut self) -> Result<Event, MessagingError> {
        loop {
            match self.receiver.recv().await {
                Ok(event) => return Ok(event),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "subscription lagged, events dropped");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    return Err(MessagingError::SubscriptionClosed);
                }
            }
        }
    }
}
