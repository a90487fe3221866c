use axum::{
    Json,
    extract::{Query, State},
};
use chrono::{DateTime, Utc};
use runway_core::{
    database::ports::UsageHistoryFilter, model::UsageSample, types::StorageSystemID,
};
use serde::Deserialize;

use crate::{
    errors::{AppError, AppResult},
    handlers::parse_param,
    infra::app_state::AppState,
};

#[derive(Debug, Default, Deserialize)]
pub struct HistoryQuery {
    pub system_id: Option<String>,
    /// RFC 3339, inclusive
    pub from: Option<String>,
    /// RFC 3339, inclusive
    pub to: Option<String>,
}

pub async fn list_history_handler(
    State(state): State<AppState>,
    Query(query): Query<HistoryQuery>,
) -> AppResult<Json<Vec<UsageSample>>> {
    let filter = UsageHistoryFilter {
        storage_system_id: query
            .system_id
            .as_deref()
            .map(parse_param::<StorageSystemID>)
            .transpose()?,
        from: query.from.as_deref().map(|raw| parse_timestamp("from", raw)).transpose()?,
        to: query.to.as_deref().map(|raw| parse_timestamp("to", raw)).transpose()?,
    };

    if let (Some(from), Some(to)) = (filter.from, filter.to)
        && from > to
    {
        return Err(AppError::bad_request("'from' must not be later than 'to'"));
    }

    let samples = state.unit_of_work().history.list_samples(&filter).await?;
    Ok(Json(samples))
}

fn parse_timestamp(field: &str, raw: &str) -> AppResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw.trim())
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|_| AppError::bad_request(format!("'{field}' must be an RFC 3339 timestamp")))
}
