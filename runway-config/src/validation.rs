use thiserror::Error;

use crate::models::Config;

/// Longest projection horizon the server will ever compute.
pub const HORIZON_LIMIT_DAYS: u32 = 365;

#[derive(Debug, Error)]
pub enum ConfigGuardRailError {
    #[error("critical threshold ({critical} days) exceeds warning threshold ({warning} days)")]
    InvertedThresholds { critical: u64, warning: u64 },
    #[error("{field} must be greater than zero")]
    ZeroValue { field: &'static str },
    #[error(
        "default horizon ({default} days) exceeds maximum horizon ({max} days)"
    )]
    DefaultHorizonAboveMax { default: u32, max: u32 },
    #[error("maximum horizon ({max} days) exceeds the {limit}-day limit")]
    HorizonTooLong { max: u32, limit: u32 },
    #[error("growth window needs at least two samples, got {window}")]
    GrowthWindowTooSmall { window: usize },
    #[error("CORS wildcard origins are not allowed when DEV_MODE is false")]
    DangerousCorsWildcard,
}

#[derive(Debug, Clone)]
pub struct ConfigWarning {
    pub message: String,
    pub hint: Option<String>,
}

#[derive(Debug, Default, Clone)]
pub struct ConfigWarnings {
    pub items: Vec<ConfigWarning>,
}

impl ConfigWarnings {
    pub fn push<S: Into<String>>(&mut self, message: S) {
        self.items.push(ConfigWarning {
            message: message.into(),
            hint: None,
        });
    }

    pub fn push_with_hint<S: Into<String>, H: Into<String>>(
        &mut self,
        message: S,
        hint: H,
    ) {
        self.items.push(ConfigWarning {
            message: message.into(),
            hint: Some(hint.into()),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn extend(&mut self, other: ConfigWarnings) {
        self.items.extend(other.items);
    }
}

pub fn apply_guard_rails(
    config: &Config,
) -> Result<ConfigWarnings, ConfigGuardRailError> {
    let mut warnings = ConfigWarnings::default();
    let runway = &config.runway;

    if runway.default_horizon_days == 0 {
        return Err(ConfigGuardRailError::ZeroValue {
            field: "runway.default_horizon_days",
        });
    }
    if runway.max_horizon_days == 0 {
        return Err(ConfigGuardRailError::ZeroValue {
            field: "runway.max_horizon_days",
        });
    }
    if runway.max_horizon_days > HORIZON_LIMIT_DAYS {
        return Err(ConfigGuardRailError::HorizonTooLong {
            max: runway.max_horizon_days,
            limit: HORIZON_LIMIT_DAYS,
        });
    }
    if runway.default_horizon_days > runway.max_horizon_days {
        return Err(ConfigGuardRailError::DefaultHorizonAboveMax {
            default: runway.default_horizon_days,
            max: runway.max_horizon_days,
        });
    }
    if runway.critical_days > runway.warning_days {
        return Err(ConfigGuardRailError::InvertedThresholds {
            critical: runway.critical_days,
            warning: runway.warning_days,
        });
    }
    if runway.growth_window < 2 {
        return Err(ConfigGuardRailError::GrowthWindowTooSmall {
            window: runway.growth_window,
        });
    }
    if config.relay.observer_queue == 0 {
        return Err(ConfigGuardRailError::ZeroValue {
            field: "relay.observer_queue",
        });
    }
    if config.database.max_connections == 0 {
        return Err(ConfigGuardRailError::ZeroValue {
            field: "database.max_connections",
        });
    }

    if !config.dev_mode && config.cors.is_wildcard_included() {
        return Err(ConfigGuardRailError::DangerousCorsWildcard);
    }

    if config.database.primary_url.is_none() {
        warnings.push_with_hint(
            "No database URL configured",
            "Set DATABASE_URL (or DB_HOST/DB_USER/DB_NAME), or run with --in-memory",
        );
    }

    if let Some(dir) = &config.server.static_dir
        && !dir.is_dir()
    {
        warnings.push_with_hint(
            format!("Static directory {} does not exist", dir.display()),
            "Build the dashboard bundle or unset STATIC_DIR",
        );
    }

    if runway.critical_days == 0 {
        warnings.push("critical_days is 0; only exhausted systems will alert as critical");
    }

    Ok(warnings)
}
