use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::StorageSystemID;

/// Point-in-time snapshot of a storage system's capacity, in gigabytes.
///
/// Snapshots are written by ingestion and compaction jobs outside this
/// service; `used_capacity_gb` may briefly exceed `total_capacity_gb` when a
/// snapshot is stale, which the projection engine reports rather than trusts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageSystem {
    pub id: StorageSystemID,
    pub name: String,
    pub total_capacity_gb: f64,
    pub used_capacity_gb: f64,
    pub updated_at: DateTime<Utc>,
}

impl StorageSystem {
    pub fn new(name: impl Into<String>, total_capacity_gb: f64, used_capacity_gb: f64) -> Self {
        Self {
            id: StorageSystemID::new(),
            name: name.into(),
            total_capacity_gb,
            used_capacity_gb,
            updated_at: Utc::now(),
        }
    }

    pub fn with_id(mut self, id: StorageSystemID) -> Self {
        self.id = id;
        self
    }

    /// Fraction of capacity in use, clamped to `[0, 1]`.
    pub fn utilization(&self) -> f64 {
        if self.total_capacity_gb <= 0.0 {
            return 0.0;
        }
        (self.used_capacity_gb / self.total_capacity_gb).clamp(0.0, 1.0)
    }
}
