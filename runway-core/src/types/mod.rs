pub mod ids;

pub use ids::{PipelineID, StorageSystemID, UsageSampleID};
