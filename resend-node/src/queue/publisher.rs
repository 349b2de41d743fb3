//! Hands accepted webhook events to RabbitMQ.
//!
//! One durable queue, one payload type. The link to the broker opens on the
//! first publish and is reopened whenever its channel has gone away.

use std::sync::Arc;

use lapin::{
    options::{BasicPublishOptions, QueueDeclareOptions},
    types::FieldTable,
    BasicProperties, Channel, Connection, ConnectionProperties,
};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::types::{EventMessage, EVENTS_QUEUE};
use crate::error::Result;

/// AMQP delivery mode for messages that survive a broker restart.
const PERSISTENT: u8 = 2;

/// Publisher shared by every webhook request. Clones share one link.
#[derive(Clone)]
pub struct Publisher {
    shared: Arc<Shared>,
}

struct Shared {
    url: String,
    link: Mutex<Option<Link>>,
}

/// An open broker connection whose channel has the events queue declared.
struct Link {
    connection: Connection,
    channel: Channel,
}

impl Link {
    async fn open(url: &str) -> Result<Self> {
        let connection = Connection::connect(url, ConnectionProperties::default()).await?;
        let channel = connection.create_channel().await?;

        let declare = QueueDeclareOptions {
            durable: true,
            ..Default::default()
        };
        channel
            .queue_declare(EVENTS_QUEUE, declare, FieldTable::default())
            .await?;

        info!(queue = EVENTS_QUEUE, "events_queue_ready");
        Ok(Self {
            connection,
            channel,
        })
    }

    fn is_usable(&self) -> bool {
        self.channel.status().connected()
    }

    async fn shut(self) {
        if let Err(e) = self.channel.close(200, "bye").await {
            debug!(error = %e, "events_channel_close_failed");
        }
        if let Err(e) = self.connection.close(200, "bye").await {
            warn!(error = %e, "events_connection_close_failed");
        }
    }
}

/// Message properties: persistent JSON, tagged with the event type and the
/// Svix message id so consumers can deduplicate retries.
fn properties(message: &EventMessage) -> BasicProperties {
    BasicProperties::default()
        .with_delivery_mode(PERSISTENT)
        .with_content_type("application/json".into())
        .with_kind(message.event_type.as_str().into())
        .with_message_id(message.message_id().into())
}

impl Publisher {
    pub fn new(url: String) -> Self {
        Self {
            shared: Arc::new(Shared {
                url,
                link: Mutex::new(None),
            }),
        }
    }

    /// Channel to publish on, reopening the link if it dropped.
    async fn channel(&self) -> Result<Channel> {
        let mut link = self.shared.link.lock().await;

        if let Some(open) = link.as_ref().filter(|l| l.is_usable()) {
            return Ok(open.channel.clone());
        }
        if let Some(stale) = link.take() {
            info!("events_link_reopening");
            stale.shut().await;
        }

        let fresh = Link::open(&self.shared.url).await?;
        let channel = fresh.channel.clone();
        *link = Some(fresh);
        Ok(channel)
    }

    /// Publish one event and wait for the broker to confirm it.
    pub async fn publish_event(&self, message: &EventMessage) -> Result<()> {
        let body = serde_json::to_vec(message)?;
        let channel = self.channel().await?;

        channel
            .basic_publish(
                "",
                EVENTS_QUEUE,
                BasicPublishOptions::default(),
                &body,
                properties(message),
            )
            .await?
            .await?;

        debug!(
            event_type = %message.event_type,
            message_id = %message.message_id(),
            bytes = body.len(),
            "event_published"
        );
        Ok(())
    }

    /// Drop the broker link, if one is open.
    pub async fn close(&self) {
        let link = self.shared.link.lock().await.take();
        match link {
            Some(link) => {
                link.shut().await;
                info!("events_link_closed");
            }
            None => debug!("events_link_never_opened"),
        }
    }
}
