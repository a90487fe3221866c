//! Change notifications announced by the store.
//!
//! The store publishes on two channels whenever a storage system or pipeline
//! row changes. Payloads are owned by the publisher and stay raw strings
//! here; parsing them is the subscriber's business.

pub mod local;
pub mod postgres;

use std::{fmt, pin::Pin, str::FromStr};

use async_trait::async_trait;
use futures::Stream;
use serde::{Deserialize, Serialize};

use crate::error::{Result, RunwayError};

pub use local::LocalChangeNotifier;
pub use postgres::{PgChangeNotifier, PgChangeNotifierConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeChannel {
    StorageChange,
    PipelineChange,
}

impl ChangeChannel {
    pub const ALL: [ChangeChannel; 2] = [Self::StorageChange, Self::PipelineChange];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::StorageChange => "storage_change",
            Self::PipelineChange => "pipeline_change",
        }
    }
}

impl fmt::Display for ChangeChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChangeChannel {
    type Err = RunwayError;

    fn from_str(raw: &str) -> Result<Self> {
        match raw {
            "storage_change" => Ok(Self::StorageChange),
            "pipeline_change" => Ok(Self::PipelineChange),
            other => Err(RunwayError::Validation(format!("unknown change channel '{other}'"))),
        }
    }
}

/// A single announcement, payload untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeNotification {
    pub channel: ChangeChannel,
    pub payload: String,
}

impl ChangeNotification {
    pub fn new(channel: ChangeChannel, payload: impl Into<String>) -> Self {
        Self {
            channel,
            payload: payload.into(),
        }
    }

    /// Parse the payload as JSON.
    pub fn parse_payload(&self) -> Result<serde_json::Value> {
        serde_json::from_str(&self.payload).map_err(|err| RunwayError::MalformedNotification {
            channel: self.channel.to_string(),
            reason: err.to_string(),
        })
    }
}

pub type ChangeStream = Pin<Box<dyn Stream<Item = ChangeNotification> + Send>>;

/// Subscription side of the store's change announcements.
#[async_trait]
pub trait ChangeNotifier: Send + Sync {
    /// Start listening on every [`ChangeChannel`]. The stream ends when the
    /// notifier shuts down.
    async fn subscribe(&self) -> Result<ChangeStream>;
}
