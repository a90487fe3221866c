use axum::{
    Router,
    http::{HeaderValue, Method, header},
    routing::get,
};
use runway_core::api::routes;
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};
use tracing::{info, warn};

use crate::{
    handlers::health::{health_handler, ping_handler},
    infra::app_state::AppState,
    routes::create_api_router,
};

pub fn create_app(state: AppState) -> Router {
    // Build CORS layer (permissive in dev, allow-list in prod)
    let cors_layer = if state.config().dev_mode {
        CorsLayer::permissive()
    } else {
        let origins: Vec<HeaderValue> = state
            .config()
            .cors
            .allowed_origins
            .iter()
            .filter_map(|origin| match HeaderValue::from_str(origin) {
                Ok(value) => Some(value),
                Err(_) => {
                    warn!(%origin, "ignoring invalid CORS origin");
                    None
                }
            })
            .collect();

        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods([Method::GET, Method::POST, Method::PUT, Method::OPTIONS])
            .allow_headers([header::CONTENT_TYPE])
    };

    let mut app = Router::new()
        .route(routes::PING, get(ping_handler))
        .route(routes::HEALTH, get(health_handler))
        .merge(create_api_router());

    // Prebuilt dashboard bundle; client-side routes fall back to index.html.
    if let Some(dir) = state.config().server.static_dir.clone()
        && dir.is_dir()
    {
        info!(path = %dir.display(), "serving static dashboard");
        let index = dir.join("index.html");
        app = app.fallback_service(ServeDir::new(dir).fallback(ServeFile::new(index)));
    }

    app.layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(cors_layer),
    )
    .with_state(state)
}
