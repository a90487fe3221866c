use std::sync::Arc;

use axum_test::TestServer;
use chrono::{Duration, Utc};
use runway_config::{
    Config, ConfigMetadata, CorsConfig, DatabaseConfig, RelayConfig, RunwayConfig,
    ServerConfig,
};
use runway_core::{
    application::CapacityUnitOfWork,
    database::InMemoryStore,
    model::{Pipeline, PipelineStatus, StorageSystem, UsageSample},
    notify::LocalChangeNotifier,
    types::{PipelineID, StorageSystemID},
};
use runway_server::{
    AppState, create_app, infra::websocket::ConnectionManager, relay::LiveUpdateRelay,
};

// Code is used by test modules, but not in this scope
#[allow(unused)]
#[derive(Debug)]
pub struct Fixture {
    pub store: InMemoryStore,
    pub notifier: LocalChangeNotifier,
    pub state: AppState,
    pub primary: StorageSystemID,
    pub ingest: PipelineID,
    pub cleanup: PipelineID,
}

pub fn test_config() -> Config {
    Config {
        server: ServerConfig {
            host: "127.0.0.1".into(),
            port: 0,
            static_dir: None,
        },
        database: DatabaseConfig {
            primary_url: None,
            max_connections: 1,
        },
        cors: CorsConfig {
            allowed_origins: Vec::new(),
        },
        runway: RunwayConfig {
            default_horizon_days: 30,
            max_horizon_days: 365,
            warning_days: 7,
            critical_days: 3,
            growth_window: 7,
        },
        relay: RelayConfig { observer_queue: 16 },
        dev_mode: true,
        metadata: ConfigMetadata::default(),
    }
}

/// One 500 GB system at 450 GB used, an active 10 GB/day pipeline scoped to
/// it, a paused unscoped cleanup job, and three daily samples.
#[allow(unused)]
pub async fn fixture() -> Fixture {
    let notifier = LocalChangeNotifier::new();
    let store = InMemoryStore::with_notifier(notifier.clone());

    let primary = store
        .insert_system(StorageSystem::new("primary", 500.0, 450.0))
        .await;
    let ingest = store
        .insert_pipeline(Pipeline::new("ingest", PipelineStatus::Active, 10.0).scoped_to(primary))
        .await;
    let cleanup = store
        .insert_pipeline(Pipeline::new("cleanup", PipelineStatus::Paused, -5.0))
        .await;

    let now = Utc::now();
    for (days_ago, used) in [(2, 430.0), (1, 440.0), (0, 450.0)] {
        store
            .record_sample(UsageSample::new(primary, now - Duration::days(days_ago), used))
            .await;
    }

    let unit_of_work = Arc::new(CapacityUnitOfWork::in_memory(store.clone()));
    let websocket_manager = Arc::new(ConnectionManager::new());
    let relay = Arc::new(LiveUpdateRelay::new(
        unit_of_work.clone(),
        Arc::new(notifier.clone()),
        websocket_manager.clone(),
    ));

    let state = AppState {
        unit_of_work,
        postgres: None,
        config: Arc::new(test_config()),
        websocket_manager,
        relay,
    };

    Fixture {
        store,
        notifier,
        state,
        primary,
        ingest,
        cleanup,
    }
}

#[allow(unused)]
pub fn test_server(state: AppState) -> TestServer {
    TestServer::builder()
        .http_transport()
        .build(create_app(state))
        .expect("test server")
}
