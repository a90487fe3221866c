use async_trait::async_trait;

use crate::{
    Result,
    model::{Pipeline, PipelineStatus},
    types::{PipelineID, StorageSystemID},
};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PipelineFilter {
    pub status: Option<PipelineStatus>,
    /// Pipelines that affect this system, scoped or unscoped.
    pub storage_system_id: Option<StorageSystemID>,
}

impl PipelineFilter {
    pub fn matches(&self, pipeline: &Pipeline) -> bool {
        self.status.is_none_or(|status| pipeline.status == status)
            && self
                .storage_system_id
                .is_none_or(|system| pipeline.affects(system))
    }
}

#[async_trait]
pub trait PipelinesRepository: Send + Sync {
    async fn list_pipelines(&self, filter: &PipelineFilter) -> Result<Vec<Pipeline>>;
    async fn get_pipeline(&self, id: PipelineID) -> Result<Option<Pipeline>>;

    async fn pipelines_for_system(&self, system: StorageSystemID) -> Result<Vec<Pipeline>> {
        self.list_pipelines(&PipelineFilter {
            status: None,
            storage_system_id: Some(system),
        })
        .await
    }

    /// Sets the status and returns the updated pipeline, or `NotFound`.
    async fn update_pipeline_status(&self, id: PipelineID, status: PipelineStatus) -> Result<Pipeline>;
}
