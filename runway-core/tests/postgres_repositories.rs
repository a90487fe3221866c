//! Repository tests against a live PostgreSQL.
//!
//! Enable with `--features postgres-tests` and a `DATABASE_URL` the test
//! harness may create scratch databases on.
#![cfg(feature = "postgres-tests")]

use std::time::Duration;

use futures::StreamExt;
use runway_core::{
    RunwayError,
    database::{
        PostgresDatabase,
        ports::{
            PipelineFilter, PipelinesRepository, StorageSystemsRepository, UsageHistoryFilter,
            UsageHistoryRepository,
        },
    },
    model::PipelineStatus,
    notify::{ChangeChannel, ChangeNotifier, PgChangeNotifier},
    types::{PipelineID, StorageSystemID},
};
use sqlx::PgPool;
use uuid::Uuid;

async fn seed(pool: &PgPool) -> (StorageSystemID, PipelineID) {
    let system: Uuid = sqlx::query_scalar(
        "INSERT INTO storage_systems (name, total_capacity_gb, used_capacity_gb) VALUES ('primary', 500, 450) RETURNING id",
    )
    .fetch_one(pool)
    .await
    .unwrap();

    let pipeline: Uuid = sqlx::query_scalar(
        "INSERT INTO pipelines (name, status, impact_rate_gb_per_day, storage_system_id) VALUES ('ingest', 'active', 10, $1) RETURNING id",
    )
    .bind(system)
    .fetch_one(pool)
    .await
    .unwrap();

    sqlx::query(
        "INSERT INTO pipelines (name, status, impact_rate_gb_per_day) VALUES ('global-backfill', 'paused', 3)",
    )
    .execute(pool)
    .await
    .unwrap();

    for (days_ago, used) in [(2, 430.0), (1, 440.0), (0, 450.0)] {
        sqlx::query(
            "INSERT INTO storage_usage_history (storage_system_id, recorded_at, used_capacity_gb) VALUES ($1, NOW() - make_interval(days => $2), $3)",
        )
        .bind(system)
        .bind(days_ago)
        .bind(used)
        .execute(pool)
        .await
        .unwrap();
    }

    (StorageSystemID(system), PipelineID(pipeline))
}

#[sqlx::test(migrator = "runway_core::MIGRATOR")]
async fn reads_systems_pipelines_and_history(pool: PgPool) {
    let (system_id, _) = seed(&pool).await;
    let db = PostgresDatabase::from_pool(pool);

    let system = db.storage_systems().get_system(system_id).await.unwrap().unwrap();
    assert_eq!(system.total_capacity_gb, 500.0);

    let for_system = db.pipelines().pipelines_for_system(system_id).await.unwrap();
    assert_eq!(for_system.len(), 2);

    let active = db
        .pipelines()
        .list_pipelines(&PipelineFilter {
            status: Some(PipelineStatus::Active),
            storage_system_id: None,
        })
        .await
        .unwrap();
    assert_eq!(active.len(), 1);

    let history = db
        .usage_history()
        .list_samples(&UsageHistoryFilter::default())
        .await
        .unwrap();
    let readings: Vec<f64> = history.iter().map(|s| s.used_capacity_gb).collect();
    assert_eq!(readings, vec![430.0, 440.0, 450.0]);

    let recent = db.usage_history().recent_samples(system_id, 2).await.unwrap();
    assert_eq!(recent.len(), 2);
    assert_eq!(recent[0].used_capacity_gb, 440.0);
}

#[sqlx::test(migrator = "runway_core::MIGRATOR")]
async fn status_update_fires_pipeline_change(pool: PgPool) {
    let (_, pipeline_id) = seed(&pool).await;
    let db = PostgresDatabase::from_pool(pool.clone());
    let notifier = PgChangeNotifier::new(pool);
    let mut changes = notifier.subscribe().await.unwrap();

    let updated = db
        .pipelines()
        .update_pipeline_status(pipeline_id, PipelineStatus::Failed)
        .await
        .unwrap();
    assert_eq!(updated.status, PipelineStatus::Failed);

    let change = tokio::time::timeout(Duration::from_secs(5), changes.next())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(change.channel, ChangeChannel::PipelineChange);
    let payload = change.parse_payload().unwrap();
    assert_eq!(payload["record"]["status"], "failed");
}

#[sqlx::test(migrator = "runway_core::MIGRATOR")]
async fn missing_pipeline_update_is_not_found(pool: PgPool) {
    let db = PostgresDatabase::from_pool(pool);
    let err = db
        .pipelines()
        .update_pipeline_status(PipelineID::new(), PipelineStatus::Paused)
        .await
        .unwrap_err();
    assert!(matches!(err, RunwayError::NotFound(_)));
}
