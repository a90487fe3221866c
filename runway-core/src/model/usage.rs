use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{StorageSystemID, UsageSampleID};

/// One append-only usage reading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageSample {
    pub id: UsageSampleID,
    pub storage_system_id: StorageSystemID,
    pub recorded_at: DateTime<Utc>,
    pub used_capacity_gb: f64,
}

impl UsageSample {
    pub fn new(
        storage_system_id: StorageSystemID,
        recorded_at: DateTime<Utc>,
        used_capacity_gb: f64,
    ) -> Self {
        Self {
            id: UsageSampleID::new(),
            storage_system_id,
            recorded_at,
            used_capacity_gb,
        }
    }
}
