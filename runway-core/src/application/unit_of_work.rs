use std::any::type_name_of_val;
use std::fmt;
use std::sync::Arc;

use crate::database::{
    InMemoryStore, PostgresDatabase,
    ports::{PipelinesRepository, StorageSystemsRepository, UsageHistoryRepository},
};

/// Aggregates the repository ports used by handlers and the live relay.
#[derive(Clone)]
pub struct CapacityUnitOfWork {
    pub systems: Arc<dyn StorageSystemsRepository>,
    pub pipelines: Arc<dyn PipelinesRepository>,
    pub history: Arc<dyn UsageHistoryRepository>,
}

impl fmt::Debug for CapacityUnitOfWork {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CapacityUnitOfWork")
            .field("systems", &type_name_of_val(self.systems.as_ref()))
            .field("pipelines", &type_name_of_val(self.pipelines.as_ref()))
            .field("history", &type_name_of_val(self.history.as_ref()))
            .finish()
    }
}

impl CapacityUnitOfWork {
    pub fn new(
        systems: Arc<dyn StorageSystemsRepository>,
        pipelines: Arc<dyn PipelinesRepository>,
        history: Arc<dyn UsageHistoryRepository>,
    ) -> Self {
        Self {
            systems,
            pipelines,
            history,
        }
    }

    pub fn postgres(db: &PostgresDatabase) -> Self {
        Self::new(
            Arc::new(db.storage_systems()),
            Arc::new(db.pipelines()),
            Arc::new(db.usage_history()),
        )
    }

    pub fn in_memory(store: InMemoryStore) -> Self {
        let store = Arc::new(store);
        Self::new(store.clone(), store.clone(), store)
    }
}
