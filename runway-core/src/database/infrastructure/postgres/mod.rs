pub mod repositories;

pub use repositories::{
    pipelines::PostgresPipelinesRepository, storage_systems::PostgresStorageSystemsRepository,
    usage_history::PostgresUsageHistoryRepository,
};

use crate::error::RunwayError;

/// Connection-level failures become `UpstreamUnavailable`; anything else is
/// a plain database error.
pub(crate) fn db_error(operation: &str, err: sqlx::Error) -> RunwayError {
    match err {
        sqlx::Error::Io(_)
        | sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed
        | sqlx::Error::WorkerCrashed
        | sqlx::Error::Tls(_) => RunwayError::UpstreamUnavailable(format!("{operation}: {err}")),
        other => {
            tracing::error!(error = ?other, operation, "database operation failed");
            RunwayError::Database(other)
        }
    }
}
