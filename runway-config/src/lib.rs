//! Configuration for the runway capacity server.
//!
//! Values are layered in a fixed order: an optional `.env` file, then a TOML
//! file (`runway.toml`), then process environment variables. The server
//! applies its own CLI flags on top of the result.

pub mod loader;
pub mod models;
pub mod util;
pub mod validation;

pub use loader::{ConfigLoad, ConfigLoader, error::ConfigLoadError};
pub use models::{
    Config, ConfigMetadata, CorsConfig, DatabaseConfig, RelayConfig,
    RunwayConfig, ServerConfig,
};
pub use validation::{ConfigGuardRailError, ConfigWarning, ConfigWarnings};
