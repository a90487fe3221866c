use crate::infra::websocket::connection::{DeliveryError, ObserverConnection};
use dashmap::DashMap;
use runway_core::api::ObserverMessage;
use std::{fmt, sync::Arc};
use tracing::{debug, error, warn};
use uuid::Uuid;

/// Counts from a single fan-out pass.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BroadcastReport {
    pub delivered: usize,
    pub skipped: usize,
    pub pruned: usize,
}

#[derive(Clone, Default)]
pub struct ConnectionManager {
    /// Registered observers mapped by connection ID
    connections: Arc<DashMap<Uuid, Arc<ObserverConnection>>>,
}

impl fmt::Debug for ConnectionManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionManager")
            .field("connection_count", &self.connections.len())
            .finish()
    }
}

impl ConnectionManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an observer for live fan-out
    pub fn add_connection(&self, connection: Arc<ObserverConnection>) {
        self.connections.insert(connection.id, connection);
    }

    pub fn remove_connection(&self, conn_id: Uuid) {
        self.connections.remove(&conn_id);
    }

    pub fn get_connection(&self, conn_id: &Uuid) -> Option<Arc<ObserverConnection>> {
        self.connections.get(conn_id).map(|c| c.clone())
    }

    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    /// Serialize `message` once and queue it for every registered observer.
    ///
    /// Observers with a full queue miss this message only. Observers whose
    /// writer has gone away are dropped from the registry.
    pub fn broadcast(&self, message: &ObserverMessage) -> BroadcastReport {
        let frame = match message.to_json() {
            Ok(frame) => frame,
            Err(err) => {
                error!(error = %err, "failed to serialize observer message");
                return BroadcastReport::default();
            }
        };

        let mut report = BroadcastReport::default();
        let mut closed = Vec::new();

        for entry in self.connections.iter() {
            match entry.value().try_send(frame.clone()) {
                Ok(()) => report.delivered += 1,
                Err(DeliveryError::QueueFull) => {
                    warn!(connection = %entry.key(), "observer queue full; message skipped");
                    report.skipped += 1;
                }
                Err(DeliveryError::Closed) => closed.push(*entry.key()),
            }
        }

        // Removal happens after iteration; DashMap shards stay read-locked while iterating.
        for conn_id in closed {
            debug!(connection = %conn_id, "pruning closed observer");
            self.connections.remove(&conn_id);
            report.pruned += 1;
        }

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use runway_core::{api::SnapshotMessage, notify::ChangeChannel};
    use serde_json::json;
    use tokio::sync::mpsc;

    fn observer(capacity: usize) -> (Arc<ObserverConnection>, mpsc::Receiver<String>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Arc::new(ObserverConnection::new(tx)), rx)
    }

    #[tokio::test]
    async fn full_queue_only_affects_that_observer() {
        let manager = ConnectionManager::new();
        let (slow, _slow_rx) = observer(1);
        let (fast, mut fast_rx) = observer(8);
        manager.add_connection(slow);
        manager.add_connection(fast);

        let first = ObserverMessage::notification(ChangeChannel::StorageChange, json!({ "n": 1 }));
        let second = ObserverMessage::notification(ChangeChannel::StorageChange, json!({ "n": 2 }));

        assert_eq!(manager.broadcast(&first).delivered, 2);
        let report = manager.broadcast(&second);
        assert_eq!(report.delivered, 1);
        assert_eq!(report.skipped, 1);
        assert_eq!(manager.connection_count(), 2);

        assert_eq!(fast_rx.recv().await.unwrap(), first.to_json().unwrap());
        assert_eq!(fast_rx.recv().await.unwrap(), second.to_json().unwrap());
    }

    #[tokio::test]
    async fn closed_observers_are_pruned() {
        let manager = ConnectionManager::new();
        let (gone, gone_rx) = observer(4);
        let (alive, _alive_rx) = observer(4);
        manager.add_connection(gone);
        manager.add_connection(alive);
        drop(gone_rx);

        let report = manager.broadcast(&SnapshotMessage::InitialPipelines(Vec::new()).into());

        assert_eq!(report.delivered, 1);
        assert_eq!(report.pruned, 1);
        assert_eq!(manager.connection_count(), 1);
    }
}
