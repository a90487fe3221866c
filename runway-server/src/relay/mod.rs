//! Live update relay.
//!
//! One task consumes the change stream and fans each notification out to
//! every registered observer. Notifications are handled strictly in arrival
//! order: the pipeline refresh that follows a `pipeline_change` is sent
//! before the next notification is looked at.

use std::sync::Arc;

use futures_util::StreamExt;
use runway_core::{
    Result, RunwayError,
    api::{ObserverMessage, SnapshotMessage},
    application::CapacityUnitOfWork,
    database::ports::{PipelineFilter, UsageHistoryFilter},
    notify::{ChangeChannel, ChangeNotification, ChangeNotifier, ChangeStream},
};
use tokio::{
    sync::{Mutex, mpsc, oneshot},
    task::JoinHandle,
};
use tracing::{debug, error, info, warn};

use crate::infra::websocket::{
    BroadcastReport, ConnectionManager, ObserverConnection, OutboundFrame,
};

/// Snapshots every new observer receives before live traffic.
pub const INITIAL_SNAPSHOT_COUNT: usize = 3;

/// Fans store changes out to observers and primes new observers.
pub struct LiveUpdateRelay {
    core: RelayCore,
    notifier: Arc<dyn ChangeNotifier>,
    task: Mutex<Option<RelayTask>>,
}

impl std::fmt::Debug for LiveUpdateRelay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LiveUpdateRelay")
            .field("connections", &self.core.connections)
            .field("running", &self.task.try_lock().map(|t| t.is_some()).ok())
            .finish()
    }
}

struct RelayTask {
    shutdown: oneshot::Sender<()>,
    handle: JoinHandle<()>,
}

#[derive(Clone)]
struct RelayCore {
    unit_of_work: Arc<CapacityUnitOfWork>,
    connections: Arc<ConnectionManager>,
}

impl LiveUpdateRelay {
    pub fn new(
        unit_of_work: Arc<CapacityUnitOfWork>,
        notifier: Arc<dyn ChangeNotifier>,
        connections: Arc<ConnectionManager>,
    ) -> Self {
        Self {
            core: RelayCore {
                unit_of_work,
                connections,
            },
            notifier,
            task: Mutex::new(None),
        }
    }

    pub fn connections(&self) -> &Arc<ConnectionManager> {
        &self.core.connections
    }

    /// Subscribe to the notifier and start forwarding. Calling `start` on a
    /// running relay is a no-op.
    pub async fn start(&self) -> Result<()> {
        let mut task = self.task.lock().await;
        if task.as_ref().is_some_and(|t| !t.handle.is_finished()) {
            debug!("live relay already running");
            return Ok(());
        }

        let stream = self.notifier.subscribe().await?;
        let (shutdown, shutdown_rx) = oneshot::channel();
        let core = self.core.clone();
        let handle = tokio::spawn(core.run(stream, shutdown_rx));

        *task = Some(RelayTask { shutdown, handle });
        info!("live relay started");
        Ok(())
    }

    /// Stop forwarding and wait for the relay task to finish. Registered
    /// observers stay connected but receive nothing further.
    pub async fn stop(&self) {
        let Some(RelayTask { shutdown, handle }) = self.task.lock().await.take()
        else {
            return;
        };
        let _ = shutdown.send(());
        if let Err(err) = handle.await {
            error!(error = %err, "live relay task panicked");
        }
        info!("live relay stopped");
    }

    pub async fn is_running(&self) -> bool {
        self.task
            .lock()
            .await
            .as_ref()
            .is_some_and(|t| !t.handle.is_finished())
    }

    /// Forward one notification. Exposed for callers that drive the relay
    /// without a background task.
    pub async fn handle_notification(&self, notification: ChangeNotification) {
        self.core.handle_notification(notification).await;
    }

    pub async fn initial_snapshots(&self) -> Result<[SnapshotMessage; INITIAL_SNAPSHOT_COUNT]> {
        self.core.initial_snapshots().await
    }

    /// Create an observer, queue the three initial snapshots on it, and only
    /// then register it for live fan-out. Fails without registering anything
    /// when the store cannot produce the snapshots.
    pub async fn attach_observer(
        &self,
        queue_capacity: usize,
    ) -> Result<(Arc<ObserverConnection>, mpsc::Receiver<OutboundFrame>)> {
        let snapshots = self.core.initial_snapshots().await?;

        let (tx, rx) = mpsc::channel(queue_capacity.max(INITIAL_SNAPSHOT_COUNT));
        let connection = Arc::new(ObserverConnection::new(tx));

        for snapshot in snapshots {
            let frame = ObserverMessage::from(snapshot).to_json()?;
            connection
                .try_send(frame)
                .map_err(|err| RunwayError::Internal(err.to_string()))?;
        }

        self.core.connections.add_connection(connection.clone());
        debug!(connection = %connection.id, "observer registered");
        Ok((connection, rx))
    }
}

impl RelayCore {
    async fn run(self, mut stream: ChangeStream, mut shutdown: oneshot::Receiver<()>) {
        loop {
            tokio::select! {
                biased;
                _ = &mut shutdown => break,
                next = stream.next() => match next {
                    Some(notification) => self.handle_notification(notification).await,
                    None => {
                        warn!("change stream ended; live relay exiting");
                        break;
                    }
                },
            }
        }
    }

    async fn handle_notification(&self, notification: ChangeNotification) {
        let channel = notification.channel;
        let payload = match notification.parse_payload() {
            Ok(payload) => payload,
            Err(err) => {
                warn!(%channel, error = %err, "dropping malformed notification");
                return;
            }
        };

        let report = self
            .connections
            .broadcast(&ObserverMessage::notification(channel, payload));
        log_report(channel, &report);

        if channel == ChangeChannel::PipelineChange {
            match self
                .unit_of_work
                .pipelines
                .list_pipelines(&PipelineFilter::default())
                .await
            {
                Ok(pipelines) => {
                    let refresh = SnapshotMessage::InitialPipelines(pipelines).into();
                    self.connections.broadcast(&refresh);
                }
                Err(err) => {
                    warn!(error = %err, "pipeline refresh failed after pipeline_change");
                }
            }
        }
    }

    async fn initial_snapshots(&self) -> Result<[SnapshotMessage; INITIAL_SNAPSHOT_COUNT]> {
        let systems = self.unit_of_work.systems.list_systems().await?;
        let pipelines = self
            .unit_of_work
            .pipelines
            .list_pipelines(&PipelineFilter::default())
            .await?;
        let history = self
            .unit_of_work
            .history
            .list_samples(&UsageHistoryFilter::default())
            .await?;

        Ok([
            SnapshotMessage::InitialStorage(systems),
            SnapshotMessage::InitialPipelines(pipelines),
            SnapshotMessage::InitialHistory(history),
        ])
    }
}

fn log_report(channel: ChangeChannel, report: &BroadcastReport) {
    debug!(
        %channel,
        delivered = report.delivered,
        skipped = report.skipped,
        pruned = report.pruned,
        "notification relayed"
    );
}
