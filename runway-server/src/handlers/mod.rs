pub mod health;
pub mod history;
pub mod pipelines;
pub mod systems;
pub mod websocket;

use std::str::FromStr;

use runway_core::RunwayError;

use crate::errors::AppError;

/// Parse a path or query value into a domain type, reporting failures as 400.
pub(crate) fn parse_param<T>(raw: &str) -> Result<T, AppError>
where
    T: FromStr<Err = RunwayError>,
{
    raw.parse::<T>().map_err(AppError::from)
}
