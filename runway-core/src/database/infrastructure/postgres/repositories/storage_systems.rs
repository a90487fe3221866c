use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use super::super::db_error;
use crate::{
    database::ports::StorageSystemsRepository, error::Result, model::StorageSystem,
    types::StorageSystemID,
};

#[derive(Clone, Debug)]
pub struct PostgresStorageSystemsRepository {
    pool: PgPool,
}

impl PostgresStorageSystemsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct StorageSystemRow {
    id: Uuid,
    name: String,
    total_capacity_gb: f64,
    used_capacity_gb: f64,
    updated_at: DateTime<Utc>,
}

impl From<StorageSystemRow> for StorageSystem {
    fn from(row: StorageSystemRow) -> Self {
        Self {
            id: StorageSystemID(row.id),
            name: row.name,
            total_capacity_gb: row.total_capacity_gb,
            used_capacity_gb: row.used_capacity_gb,
            updated_at: row.updated_at,
        }
    }
}

#[async_trait]
impl StorageSystemsRepository for PostgresStorageSystemsRepository {
    async fn list_systems(&self) -> Result<Vec<StorageSystem>> {
        let rows = sqlx::query_as::<_, StorageSystemRow>(
            r#"
            SELECT id, name, total_capacity_gb, used_capacity_gb, updated_at
            FROM storage_systems
            ORDER BY name, id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("list storage systems", e))?;

        Ok(rows.into_iter().map(StorageSystem::from).collect())
    }

    async fn get_system(&self, id: StorageSystemID) -> Result<Option<StorageSystem>> {
        let row = sqlx::query_as::<_, StorageSystemRow>(
            r#"
            SELECT id, name, total_capacity_gb, used_capacity_gb, updated_at
            FROM storage_systems
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("get storage system", e))?;

        Ok(row.map(StorageSystem::from))
    }
}
