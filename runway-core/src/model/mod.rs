pub mod pipeline;
pub mod storage;
pub mod usage;

pub use pipeline::{Pipeline, PipelineStatus};
pub use storage::StorageSystem;
pub use usage::UsageSample;
