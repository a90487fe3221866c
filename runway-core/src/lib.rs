//! # Runway Core
//!
//! Core library for the Runway storage-capacity service: the storage model,
//! the runway projection engine, repository ports with their PostgreSQL and
//! in-memory adapters, and the change-notification plumbing the live relay
//! subscribes to.
//!
//! ## Architecture
//!
//! - [`model`]: storage systems, pipelines and usage samples
//! - [`projection`]: pure runway, forecast and growth computations
//! - [`database`]: repository ports and their adapters
//! - [`notify`]: change-notification port (`LISTEN/NOTIFY` and in-process)
//! - [`api`]: route constants and observer envelopes shared with clients
//!
//! ## Examples
//!
//! ```
//! use runway_core::model::{Pipeline, PipelineStatus, StorageSystem};
//! use runway_core::projection::{Runway, RunwayThresholds, estimate_runway};
//!
//! let system = StorageSystem::new("archive", 500.0, 450.0);
//! let ingest = Pipeline::new("ingest", PipelineStatus::Active, 10.0);
//!
//! let estimate = estimate_runway(&system, &[ingest], &RunwayThresholds::default());
//! assert_eq!(estimate.runway, Runway::Days { days: 5 });
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]

/// Route constants and observer message envelopes
pub mod api;

/// Aggregated repository façade used by application services
pub mod application;

/// Repository ports and implementations
pub mod database;

/// Error types
pub mod error;

/// Storage domain model
pub mod model;

/// Change-notification port and adapters
pub mod notify;

/// Runway and forecast projection engine
pub mod projection;

/// Strongly typed identifiers
pub mod types;

pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

pub use error::{Result, RunwayError};
