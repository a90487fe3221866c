use axum::{
    Router,
    routing::{get, post, put},
};
use runway_core::api::routes::v1;

use crate::{
    AppState,
    handlers::{history, pipelines, systems, websocket},
};

/// Create all v1 API routes
pub fn create_v1_router() -> Router<AppState> {
    Router::new()
        .route(v1::systems::COLLECTION, get(systems::list_systems_handler))
        .route(v1::systems::ITEM, get(systems::get_system_handler))
        .route(v1::systems::RUNWAY, get(systems::runway_handler))
        .route(v1::systems::FORECAST, get(systems::forecast_handler))
        .route(v1::systems::WHAT_IF, post(systems::what_if_handler))
        .route(v1::systems::METRICS, get(systems::metrics_handler))
        .route(v1::pipelines::COLLECTION, get(pipelines::list_pipelines_handler))
        .route(v1::pipelines::ITEM, get(pipelines::get_pipeline_handler))
        .route(v1::pipelines::STATUS, put(pipelines::update_status_handler))
        .route(v1::history::COLLECTION, get(history::list_history_handler))
        .route(v1::live::WEBSOCKET, get(websocket::websocket_handler))
}
