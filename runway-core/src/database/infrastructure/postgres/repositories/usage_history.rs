use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use super::super::db_error;
use crate::{
    database::ports::{UsageHistoryFilter, UsageHistoryRepository},
    error::Result,
    model::UsageSample,
    types::{StorageSystemID, UsageSampleID},
};

#[derive(Clone, Debug)]
pub struct PostgresUsageHistoryRepository {
    pool: PgPool,
}

impl PostgresUsageHistoryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct UsageSampleRow {
    id: Uuid,
    storage_system_id: Uuid,
    recorded_at: DateTime<Utc>,
    used_capacity_gb: f64,
}

impl From<UsageSampleRow> for UsageSample {
    fn from(row: UsageSampleRow) -> Self {
        Self {
            id: UsageSampleID(row.id),
            storage_system_id: StorageSystemID(row.storage_system_id),
            recorded_at: row.recorded_at,
            used_capacity_gb: row.used_capacity_gb,
        }
    }
}

#[async_trait]
impl UsageHistoryRepository for PostgresUsageHistoryRepository {
    async fn list_samples(&self, filter: &UsageHistoryFilter) -> Result<Vec<UsageSample>> {
        let rows = sqlx::query_as::<_, UsageSampleRow>(
            r#"
            SELECT id, storage_system_id, recorded_at, used_capacity_gb
            FROM storage_usage_history
            WHERE ($1::uuid IS NULL OR storage_system_id = $1)
              AND ($2::timestamptz IS NULL OR recorded_at >= $2)
              AND ($3::timestamptz IS NULL OR recorded_at <= $3)
            ORDER BY recorded_at ASC, id ASC
            "#,
        )
        .bind(filter.storage_system_id.map(|id| id.as_uuid()))
        .bind(filter.from)
        .bind(filter.to)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("list usage history", e))?;

        Ok(rows.into_iter().map(UsageSample::from).collect())
    }

    async fn recent_samples(&self, system: StorageSystemID, limit: usize) -> Result<Vec<UsageSample>> {
        let rows = sqlx::query_as::<_, UsageSampleRow>(
            r#"
            SELECT id, storage_system_id, recorded_at, used_capacity_gb
            FROM (
                SELECT id, storage_system_id, recorded_at, used_capacity_gb
                FROM storage_usage_history
                WHERE storage_system_id = $1
                ORDER BY recorded_at DESC, id DESC
                LIMIT $2
            ) AS recent
            ORDER BY recorded_at ASC, id ASC
            "#,
        )
        .bind(system.as_uuid())
        .bind(i64::try_from(limit).unwrap_or(i64::MAX))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("list recent usage samples", e))?;

        Ok(rows.into_iter().map(UsageSample::from).collect())
    }
}
