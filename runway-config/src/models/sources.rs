use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::util::{parse_bool_var, parse_csv_var, parse_var};

/// Raw configuration as defined in a TOML file.
#[derive(Debug, Default, Clone, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct FileConfig {
    #[serde(default)]
    pub server: FileServerConfig,
    #[serde(default)]
    pub database: FileDatabaseConfig,
    #[serde(default)]
    pub cors: FileCorsConfig,
    #[serde(default)]
    pub runway: FileRunwayConfig,
    #[serde(default)]
    pub relay: FileRelayConfig,
    pub dev_mode: Option<bool>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileServerConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub static_dir: Option<PathBuf>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileDatabaseConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_connections: Option<u32>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileCorsConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allowed_origins: Option<Vec<String>>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileRunwayConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_horizon_days: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_horizon_days: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning_days: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub critical_days: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub growth_window: Option<usize>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileRelayConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub observer_queue: Option<usize>,
}

/// Environment-derived configuration values.
#[derive(Debug, Default, Clone)]
pub struct EnvConfig {
    pub config_path: Option<PathBuf>,
    pub server_host: Option<String>,
    pub server_port: Option<u16>,
    pub static_dir: Option<PathBuf>,
    pub database_url: Option<String>,
    pub database_host: Option<String>,
    pub database_port: Option<u16>,
    pub database_user: Option<String>,
    pub database_name: Option<String>,
    pub database_password: Option<String>,
    pub database_max_connections: Option<u32>,
    pub cors_allowed_origins: Option<Vec<String>>,
    pub default_horizon_days: Option<u32>,
    pub max_horizon_days: Option<u32>,
    pub warning_days: Option<u64>,
    pub critical_days: Option<u64>,
    pub growth_window: Option<usize>,
    pub observer_queue: Option<usize>,
    pub dev_mode: Option<bool>,
}

impl EnvConfig {
    pub fn gather() -> Self {
        Self {
            config_path: std::env::var("RUNWAY_CONFIG_PATH")
                .ok()
                .filter(|value| !value.trim().is_empty())
                .map(PathBuf::from),
            server_host: std::env::var("SERVER_HOST").ok(),
            server_port: parse_var("SERVER_PORT").or_else(|| parse_var("PORT")),
            static_dir: std::env::var("STATIC_DIR").ok().map(PathBuf::from),
            database_url: std::env::var("DATABASE_URL").ok(),
            database_host: std::env::var("DB_HOST").ok(),
            database_port: parse_var("DB_PORT"),
            database_user: std::env::var("DB_USER").ok(),
            database_name: std::env::var("DB_NAME").ok(),
            database_password: std::env::var("DB_PASSWORD").ok(),
            database_max_connections: parse_var("DB_MAX_CONNECTIONS"),

            cors_allowed_origins: parse_csv_var("CORS_ALLOWED_ORIGINS"),

            default_horizon_days: parse_var("RUNWAY_DEFAULT_HORIZON_DAYS"),
            max_horizon_days: parse_var("RUNWAY_MAX_HORIZON_DAYS"),
            warning_days: parse_var("RUNWAY_WARNING_DAYS"),
            critical_days: parse_var("RUNWAY_CRITICAL_DAYS"),
            growth_window: parse_var("RUNWAY_GROWTH_WINDOW"),
            observer_queue: parse_var("RELAY_OBSERVER_QUEUE"),

            dev_mode: parse_bool_var("DEV_MODE"),
        }
    }
}
