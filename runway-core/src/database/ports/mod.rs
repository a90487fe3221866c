//! Repository ports (interfaces) used by the HTTP handlers and the live relay.

pub mod pipelines;
pub mod storage_systems;
pub mod usage_history;

pub use pipelines::{PipelineFilter, PipelinesRepository};
pub use storage_systems::StorageSystemsRepository;
pub use usage_history::{UsageHistoryFilter, UsageHistoryRepository};
