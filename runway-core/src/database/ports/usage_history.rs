use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::{Result, model::UsageSample, types::StorageSystemID};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UsageHistoryFilter {
    pub storage_system_id: Option<StorageSystemID>,
    /// Inclusive lower bound.
    pub from: Option<DateTime<Utc>>,
    /// Inclusive upper bound.
    pub to: Option<DateTime<Utc>>,
}

impl UsageHistoryFilter {
    pub fn matches(&self, sample: &UsageSample) -> bool {
        self.storage_system_id
            .is_none_or(|system| sample.storage_system_id == system)
            && self.from.is_none_or(|from| sample.recorded_at >= from)
            && self.to.is_none_or(|to| sample.recorded_at <= to)
    }
}

#[async_trait]
pub trait UsageHistoryRepository: Send + Sync {
    /// Samples ordered by `recorded_at` ascending.
    async fn list_samples(&self, filter: &UsageHistoryFilter) -> Result<Vec<UsageSample>>;

    /// The `limit` newest samples of one system, ordered oldest first.
    async fn recent_samples(&self, system: StorageSystemID, limit: usize) -> Result<Vec<UsageSample>>;
}
