use chrono::{DateTime, Utc};
use metrics::counter;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::entities::storage_bin::BinStatus;

/// Level of the storage hierarchy an event refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum HierarchyLevel {
    Warehouse,
    StorageArea,
    StorageLocation,
    StorageBin,
    StorageBinType,
    LocationRelationship,
}

/// Published after a mutation has been committed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum HierarchyEvent {
    Created {
        level: HierarchyLevel,
        id: i32,
        code: String,
    },
    Updated {
        level: HierarchyLevel,
        id: i32,
        geometry_changed: bool,
    },
    Deactivated {
        level: HierarchyLevel,
        id: i32,
    },
    Deleted {
        level: HierarchyLevel,
        id: i32,
    },
    BinStatusChanged {
        bin_id: i32,
        from: BinStatus,
        to: BinStatus,
    },
    DetectionRecorded {
        bin_id: i32,
        confidence: f64,
        estimated_count: Option<i32>,
    },
    PhotoSessionAttached {
        location_id: i32,
        session_id: i32,
    },
}

impl HierarchyEvent {
    pub fn name(&self) -> &'static str {
        match self {
            HierarchyEvent::Created { .. } => "created",
            HierarchyEvent::Updated { .. } => "updated",
            HierarchyEvent::Deactivated { .. } => "deactivated",
            HierarchyEvent::Deleted { .. } => "deleted",
            HierarchyEvent::BinStatusChanged { .. } => "bin_status_changed",
            HierarchyEvent::DetectionRecorded { .. } => "detection_recorded",
            HierarchyEvent::PhotoSessionAttached { .. } => "photo_session_attached",
        }
    }
}

/// Envelope carried on the channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventEnvelope {
    pub event: HierarchyEvent,
    pub request_id: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<EventEnvelope>,
}

impl EventSender {
    /// Creates a new EventSender
    pub fn new(sender: mpsc::Sender<EventEnvelope>) -> Self {
        Self { sender }
    }

    /// Creates a bounded channel and returns both ends.
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<EventEnvelope>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self::new(tx), rx)
    }

    /// Sends an event asynchronously
    pub async fn send(&self, event: HierarchyEvent) -> Result<(), String> {
        let envelope = EventEnvelope {
            event,
            request_id: crate::tracing::current_request_id().map(|id| id.0),
            occurred_at: Utc::now(),
        };
        self.sender
            .send(envelope)
            .await
            .map_err(|e| format!("Failed to send event: {}", e))
    }

    /// Publishes a post-commit event. Delivery failures are logged only; the
    /// mutation that produced the event is already durable.
    pub async fn publish(&self, event: HierarchyEvent) {
        let name = event.name();
        if let Err(e) = self.send(event).await {
            counter!("storage.events.dropped", 1, "event" => name);
            warn!(event = name, error = %e, "hierarchy event not delivered");
        }
    }
}

/// Drains the channel until every sender is dropped. Returns the number of
/// events handled.
pub async fn process_events(mut rx: mpsc::Receiver<EventEnvelope>) -> u64 {
    info!("Starting event processing loop");
    let mut handled = 0;

    while let Some(envelope) = rx.recv().await {
        let name = envelope.event.name();
        counter!("storage.events.processed", 1, "event" => name);
        info!(
            event = name,
            request_id = envelope.request_id.as_deref().unwrap_or("-"),
            payload = ?envelope.event,
            "hierarchy event"
        );
        handled += 1;
    }

    info!(handled, "Event processing loop stopped");
    handled
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn events_are_drained_until_senders_drop() {
        let (sender, rx) = EventSender::channel(8);
        sender
            .publish(HierarchyEvent::Created {
                level: HierarchyLevel::Warehouse,
                id: 1,
                code: "GH-001".into(),
            })
            .await;
        sender
            .publish(HierarchyEvent::Deactivated {
                level: HierarchyLevel::StorageArea,
                id: 2,
            })
            .await;
        drop(sender);

        assert_eq!(process_events(rx).await, 2);
    }

    #[tokio::test]
    async fn closed_channel_reports_error_without_panicking() {
        let (sender, rx) = EventSender::channel(1);
        drop(rx);
        let event = HierarchyEvent::Deleted {
            level: HierarchyLevel::StorageBinType,
            id: 3,
        };
        assert!(sender.send(event.clone()).await.is_err());
        sender.publish(event).await;
    }

    #[test]
    fn events_serialize_with_tag() {
        let json = serde_json::to_value(HierarchyEvent::BinStatusChanged {
            bin_id: 5,
            from: BinStatus::Active,
            to: BinStatus::Maintenance,
        })
        .unwrap();
        assert_eq!(json["event"], "bin_status_changed");
        assert_eq!(json["to"], "maintenance");
    }
}
