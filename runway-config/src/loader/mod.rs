pub mod db_url;
pub mod error;

use std::{
    fs,
    path::{Path, PathBuf},
};

use runway_core::{
    database::postgres::DEFAULT_MAX_CONNECTIONS,
    projection::{
        DEFAULT_GROWTH_WINDOW, DEFAULT_HORIZON_DAYS,
        runway::{DEFAULT_CRITICAL_DAYS, DEFAULT_WARNING_DAYS},
    },
};

use crate::{
    models::{
        Config, ConfigMetadata, CorsConfig, DatabaseConfig, RelayConfig,
        RunwayConfig, ServerConfig,
        sources::{EnvConfig, FileConfig},
    },
    validation::{self, ConfigWarnings, HORIZON_LIMIT_DAYS},
};

pub use error::ConfigLoadError;

const DEFAULT_CONFIG_LOCATIONS: [&str; 2] =
    ["runway.toml", "config/runway.toml"];
const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 5000;
const DEFAULT_OBSERVER_QUEUE: usize = 64;

#[derive(Debug, Default, Clone)]
pub struct ConfigLoaderOptions {
    pub config_path: Option<PathBuf>,
    pub env_file: Option<PathBuf>,
}

#[derive(Debug, Default)]
pub struct ConfigLoader {
    options: ConfigLoaderOptions,
}

#[derive(Debug)]
pub struct ConfigLoad {
    pub config: Config,
    pub warnings: ConfigWarnings,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: ConfigLoaderOptions) -> Self {
        Self { options }
    }

    pub fn with_config_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.options.config_path = Some(path.into());
        self
    }

    pub fn with_env_file<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.options.env_file = Some(path.into());
        self
    }

    pub fn load(&self) -> Result<ConfigLoad, ConfigLoadError> {
        let env_file_loaded = match &self.options.env_file {
            Some(path) => dotenvy::from_path(path).map(|_| true).or_else(
                |err| match err {
                    dotenvy::Error::Io(_) => Ok(false),
                    _ => Err(err),
                },
            )?,
            None => {
                dotenvy::dotenv().map(|_| true).or_else(|err| match err {
                    dotenvy::Error::Io(_) => Ok(false),
                    _ => Err(err),
                })?
            }
        };

        let env = EnvConfig::gather();
        let (file_config, config_path) = self.load_file_config(&env)?;

        let metadata = ConfigMetadata {
            config_path,
            env_file_loaded,
        };
        let (config, warnings) = compose(file_config, env, metadata)?;

        Ok(ConfigLoad { config, warnings })
    }

    /// Locate and parse the TOML file. A path named explicitly (option or
    /// `RUNWAY_CONFIG_PATH`) must exist; default locations are optional.
    fn load_file_config(
        &self,
        env: &EnvConfig,
    ) -> Result<(Option<FileConfig>, Option<PathBuf>), ConfigLoadError> {
        let explicit = self
            .options
            .config_path
            .clone()
            .or_else(|| env.config_path.clone());

        let path = match explicit {
            Some(path) if !path.exists() => {
                return Err(ConfigLoadError::MissingConfig { path });
            }
            Some(path) => path,
            None => match DEFAULT_CONFIG_LOCATIONS
                .iter()
                .map(PathBuf::from)
                .find(|candidate| candidate.exists())
            {
                Some(path) => path,
                None => return Ok((None, None)),
            },
        };

        let file_config = read_file_config(&path)?;
        Ok((Some(file_config), Some(path)))
    }
}

pub fn read_file_config(path: &Path) -> Result<FileConfig, ConfigLoadError> {
    let contents =
        fs::read_to_string(path).map_err(|source| ConfigLoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
    toml::from_str(&contents).map_err(|source| ConfigLoadError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Merge file and environment values over the built-in defaults, then
/// apply guard rails. Environment values win over file values.
pub fn compose(
    file_config: Option<FileConfig>,
    env: EnvConfig,
    metadata: ConfigMetadata,
) -> Result<(Config, ConfigWarnings), ConfigLoadError> {
    let mut warnings = ConfigWarnings::default();

    if metadata.config_path.is_none() {
        warnings.push_with_hint(
            "No runway.toml detected; falling back to environment variables",
            "Create runway.toml or set RUNWAY_CONFIG_PATH",
        );
    }

    let FileConfig {
        server: file_server,
        database: file_database,
        cors: file_cors,
        runway: file_runway,
        relay: file_relay,
        dev_mode: file_dev_mode,
    } = file_config.unwrap_or_default();

    let server = ServerConfig {
        host: env
            .server_host
            .clone()
            .or(file_server.host)
            .unwrap_or_else(|| DEFAULT_HOST.to_string()),
        port: env.server_port.or(file_server.port).unwrap_or(DEFAULT_PORT),
        static_dir: env.static_dir.clone().or(file_server.static_dir),
    };

    let database = DatabaseConfig {
        primary_url: db_url::resolve_database_url(&env, &file_database)?,
        max_connections: env
            .database_max_connections
            .or(file_database.max_connections)
            .unwrap_or(DEFAULT_MAX_CONNECTIONS),
    };

    let cors = CorsConfig {
        allowed_origins: env
            .cors_allowed_origins
            .clone()
            .or(file_cors.allowed_origins)
            .unwrap_or_else(default_cors_origins),
    };

    let runway = RunwayConfig {
        default_horizon_days: env
            .default_horizon_days
            .or(file_runway.default_horizon_days)
            .unwrap_or(DEFAULT_HORIZON_DAYS),
        max_horizon_days: env
            .max_horizon_days
            .or(file_runway.max_horizon_days)
            .unwrap_or(HORIZON_LIMIT_DAYS),
        warning_days: env
            .warning_days
            .or(file_runway.warning_days)
            .unwrap_or(DEFAULT_WARNING_DAYS),
        critical_days: env
            .critical_days
            .or(file_runway.critical_days)
            .unwrap_or(DEFAULT_CRITICAL_DAYS),
        growth_window: env
            .growth_window
            .or(file_runway.growth_window)
            .unwrap_or(DEFAULT_GROWTH_WINDOW),
    };

    let relay = RelayConfig {
        observer_queue: env
            .observer_queue
            .or(file_relay.observer_queue)
            .unwrap_or(DEFAULT_OBSERVER_QUEUE),
    };

    let dev_mode = env.dev_mode.or(file_dev_mode).unwrap_or(false);

    let config = Config {
        server,
        database,
        cors,
        runway,
        relay,
        dev_mode,
        metadata,
    };

    warnings.extend(validation::apply_guard_rails(&config)?);

    Ok((config, warnings))
}

fn default_cors_origins() -> Vec<String> {
    vec![
        "http://localhost:3000".to_string(),
        "http://localhost:5173".to_string(),
    ]
}
