use chrono::{DateTime, Utc};
use std::fmt;
use thiserror::Error;
use tokio::sync::mpsc;
use uuid::Uuid;

/// Serialized frame queued for an observer's writer task.
pub type OutboundFrame = String;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryError {
    #[error("observer queue is full")]
    QueueFull,
    #[error("observer has disconnected")]
    Closed,
}

/// A live-feed observer. Frames go through a bounded queue drained by the
/// observer's own writer task, so one slow socket never stalls the others.
pub struct ObserverConnection {
    /// Unique connection ID
    pub id: Uuid,
    pub connected_at: DateTime<Utc>,
    sender: mpsc::Sender<OutboundFrame>,
}

impl fmt::Debug for ObserverConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObserverConnection")
            .field("id", &self.id)
            .field("connected_at", &self.connected_at)
            .field("channel_closed", &self.sender.is_closed())
            .field("queue_capacity", &self.sender.capacity())
            .finish()
    }
}

impl ObserverConnection {
    pub fn new(sender: mpsc::Sender<OutboundFrame>) -> Self {
        Self {
            id: Uuid::now_v7(),
            connected_at: Utc::now(),
            sender,
        }
    }

    /// Queue a frame without waiting.
    pub fn try_send(&self, frame: OutboundFrame) -> Result<(), DeliveryError> {
        self.sender.try_send(frame).map_err(|err| match err {
            mpsc::error::TrySendError::Full(_) => DeliveryError::QueueFull,
            mpsc::error::TrySendError::Closed(_) => DeliveryError::Closed,
        })
    }

    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_and_closed_queues_are_distinguished() {
        let (tx, rx) = mpsc::channel(1);
        let connection = ObserverConnection::new(tx);

        assert_eq!(connection.try_send("a".into()), Ok(()));
        assert_eq!(connection.try_send("b".into()), Err(DeliveryError::QueueFull));

        drop(rx);
        assert!(connection.is_closed());
        assert_eq!(connection.try_send("c".into()), Err(DeliveryError::Closed));
    }
}
