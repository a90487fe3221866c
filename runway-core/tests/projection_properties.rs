//! Property tests for the runway projection engine.

use chrono::NaiveDate;
use proptest::prelude::*;
use runway_core::{
    model::{Pipeline, PipelineStatus, StorageSystem},
    projection::{ForecastRequest, Runway, RunwayThresholds, estimate_runway, forecast, net_daily_rate},
};

fn status_strategy() -> impl Strategy<Value = PipelineStatus> {
    prop_oneof![
        Just(PipelineStatus::Active),
        Just(PipelineStatus::Failed),
        Just(PipelineStatus::Paused),
    ]
}

fn pipeline_strategy() -> impl Strategy<Value = Pipeline> {
    let rate = prop_oneof![-50.0f64..-0.01, 0.0f64..50.0];
    (status_strategy(), rate).prop_map(|(status, rate)| Pipeline::new("p", status, rate))
}

fn start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 6, 1).unwrap()
}

proptest! {
    /// Flat or shrinking usage never yields a finite runway.
    #[test]
    fn non_positive_net_rate_is_unbounded(
        total in 1.0f64..10_000.0,
        used_fraction in 0.0f64..1.5,
        pipelines in prop::collection::vec(pipeline_strategy(), 0..6),
    ) {
        let system = StorageSystem::new("s", total, total * used_fraction);
        let estimate = estimate_runway(&system, &pipelines, &RunwayThresholds::default());
        if estimate.net_rate_gb_per_day <= 0.0 {
            prop_assert_eq!(estimate.runway, Runway::Unbounded);
        } else {
            prop_assert!(estimate.runway.days().is_some());
        }
    }

    /// runway = floor((total - used) / rate), and more usage never buys more runway.
    #[test]
    fn runway_is_floor_and_monotone_in_usage(
        total in 1.0f64..10_000.0,
        used_a in 0.0f64..10_000.0,
        used_b in 0.0f64..10_000.0,
        rate in 0.01f64..500.0,
    ) {
        let (low, high) = if used_a <= used_b { (used_a, used_b) } else { (used_b, used_a) };
        let pipelines = [Pipeline::new("p", PipelineStatus::Active, rate)];
        let thresholds = RunwayThresholds::default();

        let low_estimate = estimate_runway(&StorageSystem::new("s", total, low), &pipelines, &thresholds);
        let high_estimate = estimate_runway(&StorageSystem::new("s", total, high), &pipelines, &thresholds);

        let expected = ((total - low).max(0.0) / rate).floor() as u64;
        prop_assert_eq!(low_estimate.runway, Runway::Days { days: expected });
        prop_assert!(high_estimate.runway.days().unwrap() <= low_estimate.runway.days().unwrap());
    }

    /// Every projected value stays within [0, total].
    #[test]
    fn forecast_values_are_clamped(
        total in 0.0f64..5_000.0,
        used in -100.0f64..6_000.0,
        pipelines in prop::collection::vec(pipeline_strategy(), 0..5),
        horizon in 0u32..90,
    ) {
        let system = StorageSystem::new("s", total, used);
        let forecast = forecast(&system, &pipelines, ForecastRequest::new(horizon, start()));

        prop_assert_eq!(forecast.points.len(), horizon as usize);
        for point in &forecast.points {
            prop_assert!(point.baseline_gb >= 0.0 && point.baseline_gb <= total);
            for scenario in &point.scenarios {
                prop_assert!(scenario.projected_gb >= 0.0 && scenario.projected_gb <= total);
            }
        }
    }

    /// Dropping a growing pipeline never raises the net rate; dropping a
    /// shrinking one always does.
    #[test]
    fn what_if_subtraction_has_the_right_sign(
        pipelines in prop::collection::vec(pipeline_strategy(), 1..6),
    ) {
        let system = StorageSystem::new("s", 1_000.0, 10.0);
        let forecast = forecast(&system, &pipelines, ForecastRequest::new(1, start()));
        let baseline = net_daily_rate(&pipelines);

        for scenario in &forecast.scenarios {
            if scenario.removed_rate_gb_per_day >= 0.0 {
                prop_assert!(scenario.net_rate_gb_per_day <= baseline);
            } else {
                prop_assert!(scenario.net_rate_gb_per_day > baseline);
            }
        }
    }
}
