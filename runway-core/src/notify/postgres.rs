use std::{fmt, time::Duration};

use async_trait::async_trait;
use sqlx::{PgPool, postgres::PgListener};
use tokio::{sync::mpsc, time::sleep};
use tokio_stream::wrappers::ReceiverStream;
use tracing::{debug, error, info, warn};

use super::{ChangeChannel, ChangeNotification, ChangeNotifier, ChangeStream};
use crate::error::{Result, RunwayError};

const DEFAULT_CHANNEL_CAPACITY: usize = 512;
const DEFAULT_RETRY_DELAY_MS: u64 = 1_000;

#[derive(Clone, Debug)]
pub struct PgChangeNotifierConfig {
    pub channel_capacity: usize,
    /// Pause after a listener error before receiving again.
    pub retry_delay: Duration,
}

impl Default for PgChangeNotifierConfig {
    fn default() -> Self {
        Self {
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
            retry_delay: Duration::from_millis(DEFAULT_RETRY_DELAY_MS),
        }
    }
}

/// `LISTEN`s on the change channels over a dedicated connection.
#[derive(Clone)]
pub struct PgChangeNotifier {
    pool: PgPool,
    config: PgChangeNotifierConfig,
}

impl fmt::Debug for PgChangeNotifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PgChangeNotifier")
            .field("pool_size", &self.pool.size())
            .field("config", &self.config)
            .finish()
    }
}

impl PgChangeNotifier {
    pub fn new(pool: PgPool) -> Self {
        Self::with_config(pool, PgChangeNotifierConfig::default())
    }

    pub fn with_config(pool: PgPool, config: PgChangeNotifierConfig) -> Self {
        Self { pool, config }
    }
}

#[async_trait]
impl ChangeNotifier for PgChangeNotifier {
    async fn subscribe(&self) -> Result<ChangeStream> {
        let mut listener = PgListener::connect_with(&self.pool)
            .await
            .map_err(|e| RunwayError::UpstreamUnavailable(format!("notification listener connect failed: {e}")))?;

        let channels: Vec<&str> = ChangeChannel::ALL.iter().map(|c| c.as_str()).collect();
        listener
            .listen_all(channels.iter().copied())
            .await
            .map_err(|e| RunwayError::UpstreamUnavailable(format!("LISTEN failed: {e}")))?;
        info!(channels = ?channels, "listening for change notifications");

        let (tx, rx) = mpsc::channel(self.config.channel_capacity.max(1));
        let retry_delay = self.config.retry_delay;

        tokio::spawn(async move {
            loop {
                match listener.recv().await {
                    Ok(notification) => {
                        let channel = match notification.channel().parse::<ChangeChannel>() {
                            Ok(channel) => channel,
                            Err(_) => {
                                debug!(channel = notification.channel(), "ignoring notification on foreign channel");
                                continue;
                            }
                        };
                        let change = ChangeNotification::new(channel, notification.payload());
                        if tx.send(change).await.is_err() {
                            debug!("change stream dropped; stopping listener");
                            break;
                        }
                    }
                    Err(err) => {
                        error!(error = %err, "notification listener error");
                        if tx.is_closed() {
                            break;
                        }
                        warn!(delay_ms = retry_delay.as_millis() as u64, "resuming notification listener");
                        sleep(retry_delay).await;
                    }
                }
            }
        });

        Ok(Box::pin(ReceiverStream::new(rx)))
    }
}
