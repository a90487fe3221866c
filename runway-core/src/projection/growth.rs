use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::runway::{Runway, RunwayEstimate, RunwayThresholds, estimate_runway, remaining_capacity, runway_days};
use crate::model::{Pipeline, StorageSystem, UsageSample};

pub const DEFAULT_GROWTH_WINDOW: usize = 7;

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Growth actually observed in the usage history, as opposed to the rate
/// declared by pipelines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObservedGrowth {
    pub samples: usize,
    pub window_start: DateTime<Utc>,
    pub window_end: DateTime<Utc>,
    pub growth_gb_per_day: f64,
}

/// Growth per day between the oldest and newest of the `window` most recent
/// samples. `None` when fewer than two samples remain or they share a
/// timestamp.
pub fn observed_growth(samples: &[UsageSample], window: usize) -> Option<ObservedGrowth> {
    let mut ordered: Vec<&UsageSample> = samples.iter().collect();
    ordered.sort_by_key(|sample| sample.recorded_at);

    let window = window.max(2);
    let recent = &ordered[ordered.len().saturating_sub(window)..];
    let (oldest, newest) = match recent {
        [first, .., last] => (*first, *last),
        _ => return None,
    };

    let elapsed = (newest.recorded_at - oldest.recorded_at).num_seconds() as f64 / SECONDS_PER_DAY;
    if elapsed <= 0.0 {
        return None;
    }

    Some(ObservedGrowth {
        samples: recent.len(),
        window_start: oldest.recorded_at,
        window_end: newest.recorded_at,
        growth_gb_per_day: (newest.used_capacity_gb - oldest.used_capacity_gb) / elapsed,
    })
}

/// Summary combining the pipeline-declared runway with what the history
/// shows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapacityMetrics {
    pub system: StorageSystem,
    pub utilization: f64,
    pub estimate: RunwayEstimate,
    pub observed: Option<ObservedGrowth>,
    /// Runway at the observed growth rate, when one is available.
    pub observed_runway: Option<Runway>,
}

pub fn capacity_metrics(
    system: &StorageSystem,
    pipelines: &[Pipeline],
    samples: &[UsageSample],
    thresholds: &RunwayThresholds,
    window: usize,
) -> CapacityMetrics {
    let estimate = estimate_runway(system, pipelines, thresholds);
    let observed = observed_growth(samples, window);
    let observed_runway = observed.as_ref().map(|growth| {
        let (remaining, _) = remaining_capacity(system);
        runway_days(remaining, growth.growth_gb_per_day)
    });

    CapacityMetrics {
        system: system.clone(),
        utilization: system.utilization(),
        estimate,
        observed,
        observed_runway,
    }
}
