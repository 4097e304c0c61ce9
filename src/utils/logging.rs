//! Logging configuration and setup
//!
//! This module provides logging initialization and structured logging utilities
//! for the ChekwasMed application.

use tracing::{debug, error, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use uuid::Uuid;

use crate::config::LoggingConfig;
use crate::utils::errors::{ChekwasError, Result};

/// Initialize logging based on configuration.
///
/// `RUST_LOG` takes precedence over the configured level. The returned guard
/// flushes the file writer when dropped, so keep it alive for the whole run.
pub fn init_logging(config: &LoggingConfig) -> Result<Option<WorkerGuard>> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    let (plain_stdout, json_stdout) = if config.json {
        (None, Some(fmt::layer().json().with_writer(std::io::stdout)))
    } else {
        (Some(fmt::layer().with_writer(std::io::stdout)), None)
    };

    let (file_layer, guard) = match &config.directory {
        Some(directory) => {
            let file_appender = tracing_appender::rolling::daily(directory, &config.file_prefix);
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
            let layer = fmt::layer().with_ansi(false).with_writer(non_blocking);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(plain_stdout)
        .with(json_stdout)
        .with(file_layer)
        .try_init()
        .map_err(|e| ChekwasError::Config(format!("Failed to initialize logging: {}", e)))?;

    info!("Logging initialized with level: {}", config.level);
    Ok(guard)
}

/// Log user actions with structured data
pub fn log_user_action(user_id: Uuid, action: &str, details: Option<&str>) {
    info!(
        user_id = %user_id,
        action = action,
        details = details,
        "User action performed"
    );
}

/// Log authentication attempts
pub fn log_auth_event(email: &str, action: &str, success: bool, details: Option<&str>) {
    if success {
        info!(email = email, action = action, details = details, "Authentication event: success");
    } else {
        warn!(email = email, action = action, details = details, "Authentication event: failure");
    }
}

/// Log catalog changes
pub fn log_catalog_change(medication_id: Uuid, action: &str, user_id: Uuid) {
    info!(
        medication_id = %medication_id,
        action = action,
        user_id = %user_id,
        "Catalog changed"
    );
}

/// Log interaction check outcomes
pub fn log_interaction_check(user_id: Uuid, medication_count: usize, conflicts: usize, risk_level: &str) {
    if conflicts > 0 {
        warn!(
            user_id = %user_id,
            medication_count = medication_count,
            conflicts = conflicts,
            risk_level = risk_level,
            "Interaction check found conflicts"
        );
    } else {
        debug!(
            user_id = %user_id,
            medication_count = medication_count,
            risk_level = risk_level,
            "Interaction check clean"
        );
    }
}

/// Log cache errors that were tolerated
pub fn log_cache_error(operation: &str, error: &str) {
    warn!(operation = operation, error = error, "Cache operation failed, falling back to database");
}

/// Log database operations
pub fn log_database_operation(operation: &str, table: &str, duration_ms: u64, success: bool) {
    if success {
        debug!(
            operation = operation,
            table = table,
            duration_ms = duration_ms,
            "Database operation completed"
        );
    } else {
        error!(
            operation = operation,
            table = table,
            duration_ms = duration_ms,
            "Database operation failed"
        );
    }
}
