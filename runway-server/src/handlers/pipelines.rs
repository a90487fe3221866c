use axum::{
    Json,
    extract::{Path, Query, State, rejection::JsonRejection},
};
use runway_core::{
    database::ports::PipelineFilter,
    model::{Pipeline, PipelineStatus},
    types::{PipelineID, StorageSystemID},
};
use serde::Deserialize;
use tracing::info;

use crate::{
    errors::{AppError, AppResult},
    handlers::parse_param,
    infra::app_state::AppState,
};

#[derive(Debug, Default, Deserialize)]
pub struct PipelineQuery {
    pub status: Option<String>,
    pub system_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct StatusUpdateRequest {
    pub status: String,
}

pub async fn list_pipelines_handler(
    State(state): State<AppState>,
    Query(query): Query<PipelineQuery>,
) -> AppResult<Json<Vec<Pipeline>>> {
    let filter = PipelineFilter {
        status: query
            .status
            .as_deref()
            .map(parse_param::<PipelineStatus>)
            .transpose()?,
        storage_system_id: query
            .system_id
            .as_deref()
            .map(parse_param::<StorageSystemID>)
            .transpose()?,
    };

    let pipelines = state.unit_of_work().pipelines.list_pipelines(&filter).await?;
    Ok(Json(pipelines))
}

pub async fn get_pipeline_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<Pipeline>> {
    let id: PipelineID = parse_param(&id)?;
    state
        .unit_of_work()
        .pipelines
        .get_pipeline(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::not_found(format!("pipeline {id} not found")))
}

/// Sets a pipeline's status. The status is validated before the store is
/// touched, so an unknown value never reaches the database.
pub async fn update_status_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<StatusUpdateRequest>, JsonRejection>,
) -> AppResult<Json<Pipeline>> {
    let Json(request) = payload?;
    let status: PipelineStatus = parse_param(&request.status)?;
    let id: PipelineID = parse_param(&id)?;

    let updated = state
        .unit_of_work()
        .pipelines
        .update_pipeline_status(id, status)
        .await?;

    info!(pipeline = %updated.id, status = %updated.status, "pipeline status updated");
    Ok(Json(updated))
}
