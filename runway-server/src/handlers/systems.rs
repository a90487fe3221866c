use axum::{
    Json,
    extract::{Path, Query, State, rejection::JsonRejection},
};
use chrono::Utc;
use runway_config::RunwayConfig;
use runway_core::{
    model::{Pipeline, StorageSystem},
    projection::{
        CapacityMetrics, Forecast, ForecastRequest, RunwayEstimate, WhatIfOutcome,
        capacity_metrics, estimate_runway, forecast, what_if,
    },
    types::{PipelineID, StorageSystemID},
};
use serde::Deserialize;

use crate::{
    errors::{AppError, AppResult},
    handlers::parse_param,
    infra::app_state::AppState,
};

#[derive(Debug, Default, Deserialize)]
pub struct ForecastQuery {
    pub horizon_days: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct WhatIfRequest {
    #[serde(default)]
    pub failed_pipelines: Vec<PipelineID>,
    pub horizon_days: Option<u32>,
}

pub async fn list_systems_handler(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<StorageSystem>>> {
    let systems = state.unit_of_work().systems.list_systems().await?;
    Ok(Json(systems))
}

pub async fn get_system_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<StorageSystem>> {
    let id: StorageSystemID = parse_param(&id)?;
    Ok(Json(load_system(&state, id).await?))
}

pub async fn runway_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<RunwayEstimate>> {
    let (system, pipelines) = load_snapshot(&state, &id).await?;
    let thresholds = state.config().runway.thresholds();
    Ok(Json(estimate_runway(&system, &pipelines, &thresholds)))
}

pub async fn forecast_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<ForecastQuery>,
) -> AppResult<Json<Forecast>> {
    let horizon = parse_horizon(query.horizon_days.as_deref(), &state.config().runway)?;
    let (system, pipelines) = load_snapshot(&state, &id).await?;

    let request = ForecastRequest::new(horizon, Utc::now().date_naive());
    Ok(Json(forecast(&system, &pipelines, request)))
}

pub async fn what_if_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<WhatIfRequest>, JsonRejection>,
) -> AppResult<Json<WhatIfOutcome>> {
    let Json(request) = payload?;
    let runway = &state.config().runway;
    if request.horizon_days == Some(0) {
        return Err(AppError::bad_request("horizon_days must be at least 1"));
    }
    let horizon = runway.horizon(request.horizon_days);
    let (system, pipelines) = load_snapshot(&state, &id).await?;

    let outcome = what_if(
        &system,
        &pipelines,
        &request.failed_pipelines,
        &runway.thresholds(),
        ForecastRequest::new(horizon, Utc::now().date_naive()),
    );
    Ok(Json(outcome))
}

pub async fn metrics_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<CapacityMetrics>> {
    let (system, pipelines) = load_snapshot(&state, &id).await?;
    let runway = &state.config().runway;
    let samples = state
        .unit_of_work()
        .history
        .recent_samples(system.id, runway.growth_window)
        .await?;

    Ok(Json(capacity_metrics(
        &system,
        &pipelines,
        &samples,
        &runway.thresholds(),
        runway.growth_window,
    )))
}

async fn load_system(state: &AppState, id: StorageSystemID) -> AppResult<StorageSystem> {
    state
        .unit_of_work()
        .systems
        .get_system(id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("storage system {id} not found")))
}

/// The system and every pipeline that affects it, read back to back.
async fn load_snapshot(state: &AppState, raw_id: &str) -> AppResult<(StorageSystem, Vec<Pipeline>)> {
    let id: StorageSystemID = parse_param(raw_id)?;
    let system = load_system(state, id).await?;
    let pipelines = state.unit_of_work().pipelines.pipelines_for_system(id).await?;
    Ok((system, pipelines))
}

fn parse_horizon(raw: Option<&str>, runway: &RunwayConfig) -> AppResult<u32> {
    let requested = match raw.map(str::trim).filter(|value| !value.is_empty()) {
        None => None,
        Some(value) => match value.parse::<u32>() {
            Ok(0) | Err(_) => {
                return Err(AppError::bad_request(format!(
                    "horizon_days must be a positive integer, got '{value}'"
                )));
            }
            Ok(days) => Some(days),
        },
    };
    Ok(runway.horizon(requested))
}
