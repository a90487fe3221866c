pub mod sources;

use std::path::PathBuf;

use runway_core::projection::RunwayThresholds;

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub cors: CorsConfig,
    pub runway: RunwayConfig,
    pub relay: RelayConfig,
    pub dev_mode: bool,
    pub metadata: ConfigMetadata,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Directory holding a built dashboard bundle, served for unmatched paths.
    pub static_dir: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub primary_url: Option<String>,
    pub max_connections: u32,
}

#[derive(Debug, Clone)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
}

impl CorsConfig {
    pub fn is_wildcard_included(&self) -> bool {
        self.allowed_origins
            .iter()
            .any(|origin| origin.trim() == "*")
    }
}

/// Projection defaults and limits applied by the HTTP layer.
#[derive(Debug, Clone)]
pub struct RunwayConfig {
    pub default_horizon_days: u32,
    pub max_horizon_days: u32,
    pub warning_days: u64,
    pub critical_days: u64,
    /// Number of recent usage samples used for observed growth.
    pub growth_window: usize,
}

impl RunwayConfig {
    pub fn thresholds(&self) -> RunwayThresholds {
        RunwayThresholds {
            warning_days: self.warning_days,
            critical_days: self.critical_days,
        }
    }

    /// Resolve a requested horizon, falling back to the default and capping
    /// at the configured maximum.
    pub fn horizon(&self, requested: Option<u32>) -> u32 {
        requested
            .unwrap_or(self.default_horizon_days)
            .min(self.max_horizon_days)
    }
}

#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// Outbound messages buffered per observer before new ones are skipped.
    pub observer_queue: usize,
}

#[derive(Debug, Clone, Default)]
pub struct ConfigMetadata {
    pub config_path: Option<PathBuf>,
    pub env_file_loaded: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn runway() -> RunwayConfig {
        RunwayConfig {
            default_horizon_days: 30,
            max_horizon_days: 365,
            warning_days: 7,
            critical_days: 3,
            growth_window: 7,
        }
    }

    #[test]
    fn horizon_defaults_and_caps() {
        let cfg = runway();
        assert_eq!(cfg.horizon(None), 30);
        assert_eq!(cfg.horizon(Some(90)), 90);
        assert_eq!(cfg.horizon(Some(10_000)), 365);
    }

    #[test]
    fn wildcard_detection_trims() {
        let cors = CorsConfig {
            allowed_origins: vec!["http://localhost:3000".into(), " * ".into()],
        };
        assert!(cors.is_wildcard_included());
    }
}
