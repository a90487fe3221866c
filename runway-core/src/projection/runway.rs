use serde::{Deserialize, Serialize};

use crate::{
    model::{Pipeline, StorageSystem},
    types::StorageSystemID,
};

pub const DEFAULT_WARNING_DAYS: u64 = 7;
pub const DEFAULT_CRITICAL_DAYS: u64 = 3;

/// How long until a storage system fills up at its current net rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Runway {
    Days { days: u64 },
    /// Usage is flat or shrinking; the system never fills at this rate.
    Unbounded,
}

impl Runway {
    pub fn days(&self) -> Option<u64> {
        match self {
            Self::Days { days } => Some(*days),
            Self::Unbounded => None,
        }
    }

    pub fn is_unbounded(&self) -> bool {
        matches!(self, Self::Unbounded)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunwayThresholds {
    pub warning_days: u64,
    pub critical_days: u64,
}

impl Default for RunwayThresholds {
    fn default() -> Self {
        Self {
            warning_days: DEFAULT_WARNING_DAYS,
            critical_days: DEFAULT_CRITICAL_DAYS,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunwayAlert {
    Ok,
    Warning,
    Critical,
}

impl RunwayAlert {
    pub fn classify(runway: Runway, thresholds: &RunwayThresholds) -> Self {
        match runway {
            Runway::Unbounded => Self::Ok,
            Runway::Days { days } if days <= thresholds.critical_days => Self::Critical,
            Runway::Days { days } if days <= thresholds.warning_days => Self::Warning,
            Runway::Days { .. } => Self::Ok,
        }
    }
}

/// Snapshot inconsistencies detected while computing remaining capacity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DataQualityWarning {
    UsedExceedsTotal { used_gb: f64, total_gb: f64 },
    NegativeUsage { used_gb: f64 },
    NonPositiveCapacity { total_gb: f64 },
    /// Used capacity is NaN or infinite; treated as a full system.
    NonFiniteUsage { used_gb: f64 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunwayEstimate {
    pub storage_system_id: StorageSystemID,
    pub total_capacity_gb: f64,
    pub used_capacity_gb: f64,
    pub remaining_capacity_gb: f64,
    pub net_rate_gb_per_day: f64,
    pub runway: Runway,
    pub alert: RunwayAlert,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<DataQualityWarning>,
}

/// Sum of impact rates over active pipelines. An empty collection yields 0.
pub fn net_daily_rate<'a, I>(pipelines: I) -> f64
where
    I: IntoIterator<Item = &'a Pipeline>,
{
    pipelines
        .into_iter()
        .filter(|pipeline| pipeline.status.is_active())
        .map(|pipeline| pipeline.impact_rate_gb_per_day)
        .sum()
}

/// `total - used`, clamped to `[0, total]`, plus any snapshot warnings.
pub fn remaining_capacity(system: &StorageSystem) -> (f64, Vec<DataQualityWarning>) {
    let total = system.total_capacity_gb;
    let used = system.used_capacity_gb;
    let mut warnings = Vec::new();

    if !total.is_finite() || total <= 0.0 {
        warnings.push(DataQualityWarning::NonPositiveCapacity { total_gb: total });
        return (0.0, warnings);
    }
    if !used.is_finite() {
        warnings.push(DataQualityWarning::NonFiniteUsage { used_gb: used });
        return (0.0, warnings);
    }
    if used > total {
        warnings.push(DataQualityWarning::UsedExceedsTotal {
            used_gb: used,
            total_gb: total,
        });
    }
    if used < 0.0 {
        warnings.push(DataQualityWarning::NegativeUsage { used_gb: used });
    }

    ((total - used).clamp(0.0, total), warnings)
}

pub fn runway_days(remaining_gb: f64, net_rate_gb_per_day: f64) -> Runway {
    if net_rate_gb_per_day > 0.0 {
        let days = (remaining_gb.max(0.0) / net_rate_gb_per_day).floor();
        Runway::Days { days: days as u64 }
    } else {
        Runway::Unbounded
    }
}

/// Runway for `system` given the pipelines that write to it. Pipelines scoped
/// to a different system are ignored.
pub fn estimate_runway(
    system: &StorageSystem,
    pipelines: &[Pipeline],
    thresholds: &RunwayThresholds,
) -> RunwayEstimate {
    let net_rate = net_daily_rate(pipelines.iter().filter(|p| p.affects(system.id)));
    let (remaining, warnings) = remaining_capacity(system);
    let runway = runway_days(remaining, net_rate);

    RunwayEstimate {
        storage_system_id: system.id,
        total_capacity_gb: system.total_capacity_gb,
        used_capacity_gb: system.used_capacity_gb,
        remaining_capacity_gb: remaining,
        net_rate_gb_per_day: net_rate,
        runway,
        alert: RunwayAlert::classify(runway, thresholds),
        warnings,
    }
}
