//! Runway projection engine.
//!
//! Everything in this module is a pure function of already-fetched
//! snapshots. Store access belongs to the caller.
//!
//! Contracts shared by every computation here:
//! - only `active` pipelines contribute to the net daily rate; failed and
//!   paused pipelines contribute nothing and carry no extra penalty
//! - runway days are truncated (`floor`), never rounded
//! - projected usage is always clamped to `[0, total]`

pub mod forecast;
pub mod growth;
pub mod runway;

pub use forecast::{
    DEFAULT_HORIZON_DAYS, Forecast, ForecastPoint, ForecastRequest, ScenarioDescriptor,
    ScenarioProjection, WhatIfOutcome, forecast, project_usage, what_if,
};
pub use growth::{CapacityMetrics, DEFAULT_GROWTH_WINDOW, ObservedGrowth, capacity_metrics, observed_growth};
pub use runway::{
    DataQualityWarning, Runway, RunwayAlert, RunwayEstimate, RunwayThresholds, estimate_runway,
    net_daily_rate, remaining_capacity, runway_days,
};
