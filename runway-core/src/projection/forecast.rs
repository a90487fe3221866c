use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use super::runway::{RunwayEstimate, RunwayThresholds, estimate_runway, net_daily_rate};
use crate::{
    model::{Pipeline, PipelineStatus, StorageSystem},
    types::{PipelineID, StorageSystemID},
};

pub const DEFAULT_HORIZON_DAYS: u32 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForecastRequest {
    pub horizon_days: u32,
    /// Day zero. Only used to label points with calendar dates.
    pub start_date: NaiveDate,
}

impl ForecastRequest {
    pub fn new(horizon_days: u32, start_date: NaiveDate) -> Self {
        Self {
            horizon_days,
            start_date,
        }
    }

    pub fn starting(start_date: NaiveDate) -> Self {
        Self::new(DEFAULT_HORIZON_DAYS, start_date)
    }
}

/// One "what if this pipeline stopped contributing" scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioDescriptor {
    pub pipeline_id: PipelineID,
    pub pipeline_name: String,
    pub removed_rate_gb_per_day: f64,
    pub net_rate_gb_per_day: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioProjection {
    pub pipeline_id: PipelineID,
    pub projected_gb: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub day: u32,
    pub date: NaiveDate,
    pub baseline_gb: f64,
    pub scenarios: Vec<ScenarioProjection>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Forecast {
    pub storage_system_id: StorageSystemID,
    pub horizon_days: u32,
    pub total_capacity_gb: f64,
    pub net_rate_gb_per_day: f64,
    pub scenarios: Vec<ScenarioDescriptor>,
    pub points: Vec<ForecastPoint>,
}

/// `used + day * rate`, clamped to `[0, total]`.
pub fn project_usage(used_gb: f64, rate_gb_per_day: f64, day: u32, total_gb: f64) -> f64 {
    let ceiling = if total_gb.is_finite() { total_gb.max(0.0) } else { 0.0 };
    let projected = used_gb + f64::from(day) * rate_gb_per_day;
    if projected.is_nan() {
        return ceiling;
    }
    projected.clamp(0.0, ceiling)
}

/// Day-by-day usage projection for the baseline net rate and for one
/// independent scenario per active pipeline. Scenarios never compound: each
/// removes exactly one pipeline's contribution from the baseline.
pub fn forecast(system: &StorageSystem, pipelines: &[Pipeline], request: ForecastRequest) -> Forecast {
    let relevant: Vec<&Pipeline> = pipelines.iter().filter(|p| p.affects(system.id)).collect();
    let net_rate = net_daily_rate(relevant.iter().copied());

    let scenarios: Vec<ScenarioDescriptor> = relevant
        .iter()
        .filter(|pipeline| pipeline.status.is_active())
        .map(|pipeline| ScenarioDescriptor {
            pipeline_id: pipeline.id,
            pipeline_name: pipeline.name.clone(),
            removed_rate_gb_per_day: pipeline.impact_rate_gb_per_day,
            net_rate_gb_per_day: net_rate - pipeline.impact_rate_gb_per_day,
        })
        .collect();

    let used = system.used_capacity_gb;
    let total = system.total_capacity_gb;

    let points = (1..=request.horizon_days)
        .map(|day| ForecastPoint {
            day,
            date: label_date(request.start_date, day),
            baseline_gb: project_usage(used, net_rate, day, total),
            scenarios: scenarios
                .iter()
                .map(|scenario| ScenarioProjection {
                    pipeline_id: scenario.pipeline_id,
                    projected_gb: project_usage(used, scenario.net_rate_gb_per_day, day, total),
                })
                .collect(),
        })
        .collect();

    Forecast {
        storage_system_id: system.id,
        horizon_days: request.horizon_days,
        total_capacity_gb: total,
        net_rate_gb_per_day: net_rate,
        scenarios,
        points,
    }
}

fn label_date(start: NaiveDate, day: u32) -> NaiveDate {
    start.checked_add_days(Days::new(u64::from(day))).unwrap_or(NaiveDate::MAX)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WhatIfOutcome {
    pub failed_pipelines: Vec<PipelineID>,
    /// Requested ids that do not match any pipeline affecting the system.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unknown_pipelines: Vec<PipelineID>,
    pub current: RunwayEstimate,
    pub adjusted: RunwayEstimate,
    pub forecast: Forecast,
}

/// Re-evaluates runway and forecast as if every pipeline in `failed` had
/// status `failed`. Failing several pipelines removes each of their
/// contributions; the inputs are left untouched.
pub fn what_if(
    system: &StorageSystem,
    pipelines: &[Pipeline],
    failed: &[PipelineID],
    thresholds: &RunwayThresholds,
    request: ForecastRequest,
) -> WhatIfOutcome {
    let hypothetical: Vec<Pipeline> = pipelines
        .iter()
        .map(|pipeline| {
            let mut pipeline = pipeline.clone();
            if failed.contains(&pipeline.id) {
                pipeline.status = PipelineStatus::Failed;
            }
            pipeline
        })
        .collect();

    let mut failed_pipelines = Vec::new();
    let mut unknown_pipelines = Vec::new();
    for id in failed {
        let known = pipelines.iter().any(|p| p.id == *id && p.affects(system.id));
        let bucket = if known {
            &mut failed_pipelines
        } else {
            &mut unknown_pipelines
        };
        if !bucket.contains(id) {
            bucket.push(*id);
        }
    }

    WhatIfOutcome {
        failed_pipelines,
        unknown_pipelines,
        current: estimate_runway(system, pipelines, thresholds),
        adjusted: estimate_runway(system, &hypothetical, thresholds),
        forecast: forecast(system, &hypothetical, request),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::projection::Runway;

    fn start() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 1, 1).unwrap()
    }

    #[test]
    fn baseline_grows_linearly_until_full() {
        let system = StorageSystem::new("primary", 500.0, 450.0);
        let pipelines = [Pipeline::new("ingest", PipelineStatus::Active, 10.0)];

        let forecast = forecast(&system, &pipelines, ForecastRequest::new(7, start()));

        let baseline: Vec<f64> = forecast.points.iter().map(|p| p.baseline_gb).collect();
        assert_eq!(baseline, vec![460.0, 470.0, 480.0, 490.0, 500.0, 500.0, 500.0]);
        assert_eq!(forecast.points[0].date, NaiveDate::from_ymd_opt(2026, 1, 2).unwrap());
        assert_eq!(forecast.points.len(), 7);
    }

    #[test]
    fn default_horizon_is_thirty_days() {
        let system = StorageSystem::new("primary", 500.0, 100.0);
        let forecast = forecast(&system, &[], ForecastRequest::starting(start()));
        assert_eq!(forecast.points.len(), 30);
        assert_eq!(forecast.points.last().unwrap().day, 30);
    }

    #[test]
    fn one_scenario_per_active_pipeline_each_independent() {
        let system = StorageSystem::new("primary", 1000.0, 100.0);
        let a = Pipeline::new("a", PipelineStatus::Active, 10.0);
        let b = Pipeline::new("b", PipelineStatus::Active, 5.0);
        let c = Pipeline::new("c", PipelineStatus::Paused, 50.0);
        let pipelines = [a.clone(), b.clone(), c];

        let forecast = forecast(&system, &pipelines, ForecastRequest::new(2, start()));

        assert_eq!(forecast.net_rate_gb_per_day, 15.0);
        assert_eq!(forecast.scenarios.len(), 2);
        assert_eq!(forecast.scenarios[0].pipeline_id, a.id);
        assert_eq!(forecast.scenarios[0].net_rate_gb_per_day, 5.0);
        assert_eq!(forecast.scenarios[1].net_rate_gb_per_day, 10.0);

        let day_two = &forecast.points[1];
        assert_eq!(day_two.baseline_gb, 130.0);
        assert_eq!(day_two.scenarios[0].projected_gb, 110.0);
        assert_eq!(day_two.scenarios[1].projected_gb, 120.0);
    }

    #[test]
    fn removing_a_shrinking_pipeline_grows_usage() {
        let system = StorageSystem::new("primary", 1000.0, 500.0);
        let pipelines = [
            Pipeline::new("ingest", PipelineStatus::Active, 10.0),
            Pipeline::new("compaction", PipelineStatus::Active, -20.0),
        ];

        let forecast = forecast(&system, &pipelines, ForecastRequest::new(1, start()));

        assert_eq!(forecast.points[0].baseline_gb, 490.0);
        assert_eq!(forecast.points[0].scenarios[1].projected_gb, 510.0);
    }

    #[test]
    fn projections_never_leave_capacity_bounds() {
        assert_eq!(project_usage(10.0, -20.0, 3, 100.0), 0.0);
        assert_eq!(project_usage(90.0, 20.0, 3, 100.0), 100.0);
        assert_eq!(project_usage(90.0, 20.0, 3, -5.0), 0.0);
        assert_eq!(project_usage(10.0, 1.0, 3, f64::NAN), 0.0);
        assert_eq!(project_usage(10.0, 1.0, 3, f64::INFINITY), 0.0);
        assert_eq!(project_usage(f64::NAN, 1.0, 3, 100.0), 100.0);
    }

    #[test]
    fn zero_horizon_yields_no_points() {
        let system = StorageSystem::new("primary", 500.0, 100.0);
        let forecast = forecast(&system, &[], ForecastRequest::new(0, start()));
        assert!(forecast.points.is_empty());
    }

    #[test]
    fn what_if_fails_every_named_pipeline() {
        let system = StorageSystem::new("primary", 500.0, 400.0);
        let a = Pipeline::new("a", PipelineStatus::Active, 10.0);
        let b = Pipeline::new("b", PipelineStatus::Active, 15.0);
        let pipelines = [a.clone(), b.clone()];

        let outcome = what_if(
            &system,
            &pipelines,
            &[a.id],
            &RunwayThresholds::default(),
            ForecastRequest::new(5, start()),
        );
        assert_eq!(outcome.current.runway, Runway::Days { days: 4 });
        assert_eq!(outcome.adjusted.net_rate_gb_per_day, 15.0);
        assert_eq!(outcome.adjusted.runway, Runway::Days { days: 6 });
        assert_eq!(outcome.failed_pipelines, vec![a.id]);

        let outcome = what_if(
            &system,
            &pipelines,
            &[a.id, b.id, a.id],
            &RunwayThresholds::default(),
            ForecastRequest::new(5, start()),
        );
        assert_eq!(outcome.adjusted.runway, Runway::Unbounded);
        assert_eq!(outcome.failed_pipelines, vec![a.id, b.id]);
        assert!(outcome.forecast.scenarios.is_empty());
        assert!(outcome.forecast.points.iter().all(|p| p.baseline_gb == 400.0));

        // inputs untouched
        assert!(pipelines.iter().all(|p| p.status == PipelineStatus::Active));
    }

    #[test]
    fn what_if_reports_unknown_pipelines() {
        let system = StorageSystem::new("primary", 500.0, 400.0);
        let pipelines = [Pipeline::new("a", PipelineStatus::Active, 10.0)];
        let stranger = PipelineID::new();

        let outcome = what_if(
            &system,
            &pipelines,
            &[stranger],
            &RunwayThresholds::default(),
            ForecastRequest::new(1, start()),
        );

        assert_eq!(outcome.unknown_pipelines, vec![stranger]);
        assert!(outcome.failed_pipelines.is_empty());
        assert_eq!(outcome.adjusted, outcome.current);
    }
}
