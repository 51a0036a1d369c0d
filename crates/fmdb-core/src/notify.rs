// ── Change notification ──
//
// After a mutation succeeds the engine announces it as
// `<entity>.<created|updated|deleted|renamed>`. Delivery is someone else's
// problem: a publisher failure is logged and never fails the mutation.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use strum::Display;
use thiserror::Error;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::model::EntityKind;

const DEFAULT_BROADCAST_CAPACITY: usize = 256;

/// What happened to a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum ChangeKind {
    Created,
    Updated,
    Deleted,
    Renamed,
}

/// `device_type.created`, `room.renamed`, ...
pub fn event_type(entity: EntityKind, change: ChangeKind) -> String {
    format!("{}.{change}", entity.event_prefix())
}

/// One published change, as subscribers receive it.
#[derive(Debug, Clone, Serialize)]
pub struct ChangeEvent {
    pub id: Uuid,
    pub event_type: String,
    pub timestamp: DateTime<Utc>,
    pub payload: Value,
}

#[derive(Debug, Error)]
#[error("event publish failed: {0}")]
pub struct PublishError(pub String);

/// Outbound seam for change events.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    async fn publish(&self, event_type: &str, payload: Value) -> Result<(), PublishError>;
}

// ── Implementations ─────────────────────────────────────────────────

/// Drops every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopPublisher;

#[async_trait]
impl EventPublisher for NoopPublisher {
    async fn publish(&self, _event_type: &str, _payload: Value) -> Result<(), PublishError> {
        Ok(())
    }
}

/// Fans events out to in-process subscribers over a tokio broadcast
/// channel. Having no subscribers is not an error.
#[derive(Debug, Clone)]
pub struct BroadcastPublisher {
    tx: broadcast::Sender<Arc<ChangeEvent>>,
}

impl Default for BroadcastPublisher {
    fn default() -> Self {
        Self::new(DEFAULT_BROADCAST_CAPACITY)
    }
}

impl BroadcastPublisher {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Arc<ChangeEvent>> {
        self.tx.subscribe()
    }
}

#[async_trait]
impl EventPublisher for BroadcastPublisher {
    async fn publish(&self, event_type: &str, payload: Value) -> Result<(), PublishError> {
        let event = ChangeEvent {
            id: Uuid::new_v4(),
            event_type: event_type.to_owned(),
            timestamp: Utc::now(),
            payload,
        };
        // Err here only means nobody is listening
        let _ = self.tx.send(Arc::new(event));
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn event_names() {
        assert_eq!(
            event_type(EntityKind::DeviceType, ChangeKind::Created),
            "device_type.created"
        );
        assert_eq!(event_type(EntityKind::Room, ChangeKind::Renamed), "room.renamed");
    }

    #[tokio::test]
    async fn broadcast_reaches_subscribers() {
        let publisher = BroadcastPublisher::default();
        let mut rx = publisher.subscribe();

        publisher
            .publish("building.deleted", json!({ "_id": "ITB" }))
            .await
            .unwrap();

        let event = rx.recv().await.unwrap();
        assert_eq!(event.event_type, "building.deleted");
        assert_eq!(event.payload["_id"], "ITB");
    }

    #[tokio::test]
    async fn broadcast_without_subscribers_is_ok() {
        let publisher = BroadcastPublisher::new(4);
        assert!(publisher.publish("room.created", Value::Null).await.is_ok());
    }
}
