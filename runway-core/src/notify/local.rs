use async_trait::async_trait;
use futures::StreamExt;
use tokio::sync::broadcast;
use tokio_stream::wrappers::{BroadcastStream, errors::BroadcastStreamRecvError};
use tracing::warn;

use super::{ChangeChannel, ChangeNotification, ChangeNotifier, ChangeStream};
use crate::error::Result;

const DEFAULT_CAPACITY: usize = 256;

/// In-process notifier. Publishers call [`LocalChangeNotifier::publish`]
/// directly instead of going through database triggers.
#[derive(Debug, Clone)]
pub struct LocalChangeNotifier {
    sender: broadcast::Sender<ChangeNotification>,
}

impl Default for LocalChangeNotifier {
    fn default() -> Self {
        Self::new()
    }
}

impl LocalChangeNotifier {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Returns the number of subscribers that received the notification.
    pub fn publish(&self, channel: ChangeChannel, payload: impl Into<String>) -> usize {
        self.sender
            .send(ChangeNotification::new(channel, payload))
            .unwrap_or(0)
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

#[async_trait]
impl ChangeNotifier for LocalChangeNotifier {
    async fn subscribe(&self) -> Result<ChangeStream> {
        let stream = BroadcastStream::new(self.sender.subscribe()).filter_map(|item| async move {
            match item {
                Ok(notification) => Some(notification),
                Err(BroadcastStreamRecvError::Lagged(skipped)) => {
                    warn!(skipped, "change subscriber lagged; notifications dropped");
                    None
                }
            }
        });
        Ok(Box::pin(stream))
    }
}
