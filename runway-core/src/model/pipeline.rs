use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    error::RunwayError,
    types::{PipelineID, StorageSystemID},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PipelineStatus {
    Active,
    Failed,
    Paused,
}

impl PipelineStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Failed => "failed",
            Self::Paused => "paused",
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active)
    }
}

impl fmt::Display for PipelineStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PipelineStatus {
    type Err = RunwayError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw {
            "active" => Ok(Self::Active),
            "failed" => Ok(Self::Failed),
            "paused" => Ok(Self::Paused),
            other => Err(RunwayError::Validation(format!(
                "invalid pipeline status '{other}': expected one of active, failed, paused"
            ))),
        }
    }
}

/// A data pipeline that grows (positive rate) or shrinks (negative rate) the
/// usage of the storage it writes to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pipeline {
    pub id: PipelineID,
    pub name: String,
    pub status: PipelineStatus,
    pub impact_rate_gb_per_day: f64,
    pub description: Option<String>,
    /// `None` means the pipeline affects every storage system.
    pub storage_system_id: Option<StorageSystemID>,
    pub updated_at: DateTime<Utc>,
}

impl Pipeline {
    pub fn new(name: impl Into<String>, status: PipelineStatus, impact_rate_gb_per_day: f64) -> Self {
        Self {
            id: PipelineID::new(),
            name: name.into(),
            status,
            impact_rate_gb_per_day,
            description: None,
            storage_system_id: None,
            updated_at: Utc::now(),
        }
    }

    pub fn with_id(mut self, id: PipelineID) -> Self {
        self.id = id;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn scoped_to(mut self, system: StorageSystemID) -> Self {
        self.storage_system_id = Some(system);
        self
    }

    pub fn affects(&self, system: StorageSystemID) -> bool {
        self.storage_system_id.is_none_or(|scoped| scoped == system)
    }
}
