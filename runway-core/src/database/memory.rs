use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use chrono::{Duration, Utc};
use serde::Serialize;
use serde_json::json;
use tokio::sync::RwLock;

use crate::{
    database::ports::{
        PipelineFilter, PipelinesRepository, StorageSystemsRepository, UsageHistoryFilter,
        UsageHistoryRepository,
    },
    error::{Result, RunwayError},
    model::{Pipeline, PipelineStatus, StorageSystem, UsageSample},
    notify::{ChangeChannel, LocalChangeNotifier},
    types::{PipelineID, StorageSystemID},
};

#[derive(Debug, Default)]
struct Tables {
    systems: HashMap<StorageSystemID, StorageSystem>,
    pipelines: HashMap<PipelineID, Pipeline>,
    history: Vec<UsageSample>,
}

/// Process-local store implementing every repository port.
///
/// When built with a [`LocalChangeNotifier`], mutations announce themselves
/// on the same channels and with the same payload shape as the database
/// triggers.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    tables: Arc<RwLock<Tables>>,
    notifier: Option<LocalChangeNotifier>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_notifier(notifier: LocalChangeNotifier) -> Self {
        Self {
            tables: Arc::default(),
            notifier: Some(notifier),
        }
    }

    pub fn notifier(&self) -> Option<&LocalChangeNotifier> {
        self.notifier.as_ref()
    }

    pub async fn insert_system(&self, system: StorageSystem) -> StorageSystemID {
        let id = system.id;
        self.tables.write().await.systems.insert(id, system.clone());
        self.announce(ChangeChannel::StorageChange, "storage_systems", "INSERT", &system);
        id
    }

    pub async fn insert_pipeline(&self, pipeline: Pipeline) -> PipelineID {
        let id = pipeline.id;
        self.tables.write().await.pipelines.insert(id, pipeline.clone());
        self.announce(ChangeChannel::PipelineChange, "pipelines", "INSERT", &pipeline);
        id
    }

    pub async fn record_sample(&self, sample: UsageSample) {
        let mut tables = self.tables.write().await;
        let at = tables
            .history
            .partition_point(|existing| existing.recorded_at <= sample.recorded_at);
        tables.history.insert(at, sample);
    }

    pub async fn set_used_capacity(&self, id: StorageSystemID, used_capacity_gb: f64) -> Result<StorageSystem> {
        let updated = {
            let mut tables = self.tables.write().await;
            let system = tables
                .systems
                .get_mut(&id)
                .ok_or_else(|| RunwayError::NotFound(format!("storage system {id}")))?;
            system.used_capacity_gb = used_capacity_gb;
            system.updated_at = Utc::now();
            system.clone()
        };
        self.announce(ChangeChannel::StorageChange, "storage_systems", "UPDATE", &updated);
        Ok(updated)
    }

    /// A small fleet with two weeks of history, used by the in-memory server
    /// mode.
    pub async fn seeded_demo(notifier: LocalChangeNotifier) -> Self {
        let store = Self::with_notifier(notifier);

        let warehouse = StorageSystem::new("warehouse", 500.0, 430.0);
        let archive = StorageSystem::new("archive", 2_000.0, 900.0);
        let warehouse_id = store.insert_system(warehouse).await;
        let archive_id = store.insert_system(archive).await;

        store
            .insert_pipeline(
                Pipeline::new("clickstream-ingest", PipelineStatus::Active, 8.0)
                    .with_description("Raw clickstream events")
                    .scoped_to(warehouse_id),
            )
            .await;
        store
            .insert_pipeline(
                Pipeline::new("orders-etl", PipelineStatus::Active, 4.5)
                    .with_description("Nightly order snapshots")
                    .scoped_to(warehouse_id),
            )
            .await;
        store
            .insert_pipeline(
                Pipeline::new("warehouse-compaction", PipelineStatus::Paused, -6.0)
                    .with_description("Parquet compaction and dedup")
                    .scoped_to(warehouse_id),
            )
            .await;
        store
            .insert_pipeline(
                Pipeline::new("cold-tiering", PipelineStatus::Active, 12.0)
                    .with_description("Moves aged partitions to the archive")
                    .scoped_to(archive_id),
            )
            .await;

        let today = Utc::now();
        for days_ago in (0..14i64).rev() {
            let at = today - Duration::days(days_ago);
            let days_ago = days_ago as f64;
            store
                .record_sample(UsageSample::new(warehouse_id, at, 430.0 - 12.5 * days_ago))
                .await;
            store
                .record_sample(UsageSample::new(archive_id, at, 900.0 - 12.0 * days_ago))
                .await;
        }

        store
    }

    fn announce<T: Serialize>(&self, channel: ChangeChannel, table: &str, operation: &str, record: &T) {
        let Some(notifier) = &self.notifier else {
            return;
        };
        let payload = json!({
            "operation": operation,
            "table": table,
            "record": record,
        });
        notifier.publish(channel, payload.to_string());
    }
}

#[async_trait]
impl StorageSystemsRepository for InMemoryStore {
    async fn list_systems(&self) -> Result<Vec<StorageSystem>> {
        let tables = self.tables.read().await;
        let mut systems: Vec<StorageSystem> = tables.systems.values().cloned().collect();
        systems.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(systems)
    }

    async fn get_system(&self, id: StorageSystemID) -> Result<Option<StorageSystem>> {
        Ok(self.tables.read().await.systems.get(&id).cloned())
    }
}

#[async_trait]
impl PipelinesRepository for InMemoryStore {
    async fn list_pipelines(&self, filter: &PipelineFilter) -> Result<Vec<Pipeline>> {
        let tables = self.tables.read().await;
        let mut pipelines: Vec<Pipeline> = tables
            .pipelines
            .values()
            .filter(|pipeline| filter.matches(pipeline))
            .cloned()
            .collect();
        pipelines.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(pipelines)
    }

    async fn get_pipeline(&self, id: PipelineID) -> Result<Option<Pipeline>> {
        Ok(self.tables.read().await.pipelines.get(&id).cloned())
    }

    async fn update_pipeline_status(&self, id: PipelineID, status: PipelineStatus) -> Result<Pipeline> {
        let updated = {
            let mut tables = self.tables.write().await;
            let pipeline = tables
                .pipelines
                .get_mut(&id)
                .ok_or_else(|| RunwayError::NotFound(format!("pipeline {id}")))?;
            pipeline.status = status;
            pipeline.updated_at = Utc::now();
            pipeline.clone()
        };
        self.announce(ChangeChannel::PipelineChange, "pipelines", "UPDATE", &updated);
        Ok(updated)
    }
}

#[async_trait]
impl UsageHistoryRepository for InMemoryStore {
    async fn list_samples(&self, filter: &UsageHistoryFilter) -> Result<Vec<UsageSample>> {
        let tables = self.tables.read().await;
        Ok(tables
            .history
            .iter()
            .filter(|sample| filter.matches(sample))
            .cloned()
            .collect())
    }

    async fn recent_samples(&self, system: StorageSystemID, limit: usize) -> Result<Vec<UsageSample>> {
        let tables = self.tables.read().await;
        let matching: Vec<&UsageSample> = tables
            .history
            .iter()
            .filter(|sample| sample.storage_system_id == system)
            .collect();
        let skip = matching.len().saturating_sub(limit);
        Ok(matching.into_iter().skip(skip).cloned().collect())
    }
}
