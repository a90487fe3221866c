use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use tracing::{info, warn};
use uuid::Uuid;

use super::super::db_error;
use crate::{
    database::ports::{PipelineFilter, PipelinesRepository},
    error::{Result, RunwayError},
    model::{Pipeline, PipelineStatus},
    types::{PipelineID, StorageSystemID},
};

const PIPELINE_COLUMNS: &str =
    "id, name, status, impact_rate_gb_per_day, description, storage_system_id, updated_at";

#[derive(Clone, Debug)]
pub struct PostgresPipelinesRepository {
    pool: PgPool,
}

impl PostgresPipelinesRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct PipelineRow {
    id: Uuid,
    name: String,
    status: String,
    impact_rate_gb_per_day: f64,
    description: Option<String>,
    storage_system_id: Option<Uuid>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<PipelineRow> for Pipeline {
    type Error = RunwayError;

    fn try_from(row: PipelineRow) -> Result<Self> {
        let status: PipelineStatus = row.status.parse().map_err(|_| {
            RunwayError::Internal(format!(
                "pipeline {} has unknown status '{}' in the store",
                row.id, row.status
            ))
        })?;

        Ok(Self {
            id: PipelineID(row.id),
            name: row.name,
            status,
            impact_rate_gb_per_day: row.impact_rate_gb_per_day,
            description: row.description,
            storage_system_id: row.storage_system_id.map(StorageSystemID),
            updated_at: row.updated_at,
        })
    }
}

fn into_pipelines(rows: Vec<PipelineRow>) -> Vec<Pipeline> {
    rows.into_iter()
        .filter_map(|row| match Pipeline::try_from(row) {
            Ok(pipeline) => Some(pipeline),
            Err(err) => {
                warn!(error = %err, "skipping unreadable pipeline row");
                None
            }
        })
        .collect()
}

#[async_trait]
impl PipelinesRepository for PostgresPipelinesRepository {
    async fn list_pipelines(&self, filter: &PipelineFilter) -> Result<Vec<Pipeline>> {
        let sql = format!(
            r#"
            SELECT {PIPELINE_COLUMNS}
            FROM pipelines
            WHERE ($1::text IS NULL OR status = $1)
              AND ($2::uuid IS NULL OR storage_system_id IS NULL OR storage_system_id = $2)
            ORDER BY name, id
            "#
        );

        let rows = sqlx::query_as::<_, PipelineRow>(&sql)
            .bind(filter.status.map(|status| status.as_str()))
            .bind(filter.storage_system_id.map(|id| id.as_uuid()))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| db_error("list pipelines", e))?;

        Ok(into_pipelines(rows))
    }

    async fn get_pipeline(&self, id: PipelineID) -> Result<Option<Pipeline>> {
        let sql = format!("SELECT {PIPELINE_COLUMNS} FROM pipelines WHERE id = $1");

        let row = sqlx::query_as::<_, PipelineRow>(&sql)
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_error("get pipeline", e))?;

        row.map(Pipeline::try_from).transpose()
    }

    async fn update_pipeline_status(&self, id: PipelineID, status: PipelineStatus) -> Result<Pipeline> {
        let sql = format!(
            r#"
            UPDATE pipelines
            SET status = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING {PIPELINE_COLUMNS}
            "#
        );

        let row = sqlx::query_as::<_, PipelineRow>(&sql)
            .bind(id.as_uuid())
            .bind(status.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_error("update pipeline status", e))?
            .ok_or_else(|| RunwayError::NotFound(format!("pipeline {id}")))?;

        info!(pipeline_id = %id, status = %status, "pipeline status updated");
        Pipeline::try_from(row)
    }
}
