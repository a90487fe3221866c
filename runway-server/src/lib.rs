//! # Runway Server
//!
//! HTTP and WebSocket front end for storage capacity monitoring.
//!
//! - **Runway projections**: days until each storage system fills, per-pipeline
//!   forecast scenarios and what-if evaluation
//! - **Pipeline control**: status updates that flow back through the store's
//!   change notifications
//! - **Live feed**: a WebSocket relay of `storage_change` / `pipeline_change`
//!   notifications, primed with full snapshots on connect

pub mod app;
pub mod errors;
pub mod handlers;
pub mod infra;
pub mod relay;
pub mod routes;

pub use app::create_app;
pub use infra::app_state::AppState;
