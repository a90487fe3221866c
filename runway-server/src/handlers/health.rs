use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde_json::{Value, json};
use tracing::debug;

use crate::infra::app_state::AppState;

pub async fn ping_handler() -> Json<Value> {
    debug!("ping");
    Json(json!({
        "status": "ok",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Liveness plus a store round-trip. Responds 503 when the store is down.
pub async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    let mut health = json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "version": env!("CARGO_PKG_VERSION"),
        "checks": {}
    });
    let mut healthy = true;

    match state.unit_of_work().systems.list_systems().await {
        Ok(systems) => {
            health["checks"]["store"] = json!({
                "status": "healthy",
                "storage_systems": systems.len(),
            });
        }
        Err(err) => {
            health["checks"]["store"] = json!({
                "status": "unhealthy",
                "error": err.to_string(),
            });
            healthy = false;
        }
    }

    if let Some(postgres) = &state.postgres {
        let stats = postgres.pool_stats();
        health["checks"]["pool"] = json!({
            "size": stats.size,
            "idle": stats.idle,
            "max_size": stats.max_size,
        });
    }

    health["checks"]["live_feed"] = json!({
        "relay_running": state.relay.is_running().await,
        "observers": state.websocket_manager.connection_count(),
    });

    if healthy {
        (StatusCode::OK, Json(health))
    } else {
        health["status"] = json!("unhealthy");
        (StatusCode::SERVICE_UNAVAILABLE, Json(health))
    }
}
