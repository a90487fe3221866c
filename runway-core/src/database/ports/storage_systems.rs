use async_trait::async_trait;

use crate::{Result, model::StorageSystem, types::StorageSystemID};

#[async_trait]
pub trait StorageSystemsRepository: Send + Sync {
    async fn list_systems(&self) -> Result<Vec<StorageSystem>>;
    async fn get_system(&self, id: StorageSystemID) -> Result<Option<StorageSystem>>;
}
