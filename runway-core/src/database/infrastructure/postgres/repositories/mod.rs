pub mod pipelines;
pub mod storage_systems;
pub mod usage_history;
