use std::{fmt, sync::Arc};

use runway_config::Config;
use runway_core::{application::CapacityUnitOfWork, database::PostgresDatabase};

use crate::{infra::websocket::ConnectionManager, relay::LiveUpdateRelay};

#[derive(Clone)]
pub struct AppState {
    pub unit_of_work: Arc<CapacityUnitOfWork>,
    /// Present when serving from PostgreSQL; used for pool health only.
    pub postgres: Option<Arc<PostgresDatabase>>,
    pub config: Arc<Config>,
    pub websocket_manager: Arc<ConnectionManager>,
    pub relay: Arc<LiveUpdateRelay>,
}

impl fmt::Debug for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState").finish_non_exhaustive()
    }
}

impl AppState {
    pub fn unit_of_work(&self) -> &CapacityUnitOfWork {
        &self.unit_of_work
    }

    pub fn config(&self) -> &Config {
        &self.config
    }
}
