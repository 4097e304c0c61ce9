//! Configuration validation module
//!
//! This module provides validation functions for application configuration
//! to ensure all required settings are properly configured.

use super::settings::DEV_JWT_SECRET;
use super::Settings;
use crate::utils::errors::{ChekwasError, Result};

const MIN_JWT_SECRET_LENGTH: usize = 16;
const MAX_TOKEN_TTL_HOURS: i64 = 24 * 365;

/// Validate all configuration settings
pub fn validate_settings(settings: &Settings) -> Result<()> {
    validate_server_config(&settings.server)?;
    validate_database_config(&settings.database)?;
    validate_auth_config(&settings.auth)?;
    validate_catalog_config(&settings.catalog)?;
    validate_rate_limit_config(&settings.rate_limit)?;
    validate_logging_config(&settings.logging)?;

    if settings.features.search_cache {
        validate_redis_config(&settings.redis)?;
    }

    Ok(())
}

fn validate_server_config(config: &super::ServerConfig) -> Result<()> {
    if config.host.is_empty() {
        return Err(ChekwasError::Config("Server host is required".to_string()));
    }

    if config.port == 0 {
        return Err(ChekwasError::Config("Server port must be greater than 0".to_string()));
    }

    Ok(())
}

/// Validate database configuration
fn validate_database_config(config: &super::DatabaseConfig) -> Result<()> {
    if config.url.is_empty() {
        return Err(ChekwasError::Config("Database URL is required".to_string()));
    }

    if config.max_connections == 0 {
        return Err(ChekwasError::Config(
            "Max connections must be greater than 0".to_string(),
        ));
    }

    if config.min_connections > config.max_connections {
        return Err(ChekwasError::Config(
            "Min connections cannot be greater than max connections".to_string(),
        ));
    }

    if config.acquire_timeout_seconds == 0 {
        return Err(ChekwasError::Config(
            "Acquire timeout must be greater than 0".to_string(),
        ));
    }

    Ok(())
}

/// Validate Redis configuration
fn validate_redis_config(config: &super::RedisConfig) -> Result<()> {
    if config.url.is_empty() {
        return Err(ChekwasError::Config("Redis URL is required".to_string()));
    }

    if config.ttl_seconds == 0 {
        return Err(ChekwasError::Config("Redis TTL must be greater than 0".to_string()));
    }

    Ok(())
}

fn validate_auth_config(config: &super::AuthConfig) -> Result<()> {
    if config.jwt_secret.len() < MIN_JWT_SECRET_LENGTH {
        return Err(ChekwasError::Config(format!(
            "JWT secret must be at least {} characters",
            MIN_JWT_SECRET_LENGTH
        )));
    }

    if config.token_ttl_hours <= 0 {
        return Err(ChekwasError::Config(
            "Token lifetime must be greater than 0".to_string(),
        ));
    }

    if config.token_ttl_hours > MAX_TOKEN_TTL_HOURS {
        return Err(ChekwasError::Config(format!(
            "Token lifetime cannot exceed {} hours",
            MAX_TOKEN_TTL_HOURS
        )));
    }

    Ok(())
}

/// Log a warning for each insecure default still in use.
/// Returns whether any was found. Call once logging is initialized.
pub fn warn_insecure_defaults(settings: &Settings) -> bool {
    let dev_secret = settings.auth.jwt_secret == DEV_JWT_SECRET;
    if dev_secret {
        tracing::warn!("Using the built-in development JWT secret; set CHEKWASMED__AUTH__JWT_SECRET");
    }
    dev_secret
}

fn validate_catalog_config(config: &super::CatalogConfig) -> Result<()> {
    if config.search_min_length == 0 {
        return Err(ChekwasError::Config(
            "Search minimum length must be greater than 0".to_string(),
        ));
    }

    if config.search_limit <= 0 {
        return Err(ChekwasError::Config(
            "Search limit must be greater than 0".to_string(),
        ));
    }

    if config.max_interaction_selection < 2 {
        return Err(ChekwasError::Config(
            "Interaction selection must allow at least 2 medications".to_string(),
        ));
    }

    Ok(())
}

fn validate_rate_limit_config(config: &super::RateLimitSettings) -> Result<()> {
    if !config.enabled {
        return Ok(());
    }

    if config.max_requests == 0 || config.window_seconds == 0 {
        return Err(ChekwasError::Config(
            "Rate limit requests and window must be greater than 0".to_string(),
        ));
    }

    Ok(())
}

/// Validate logging configuration
fn validate_logging_config(config: &super::LoggingConfig) -> Result<()> {
    if config.level.is_empty() {
        return Err(ChekwasError::Config("Log level is required".to_string()));
    }

    let valid_levels = ["trace", "debug", "info", "warn", "error"];
    if !valid_levels.contains(&config.level.as_str()) {
        return Err(ChekwasError::Config(format!(
            "Invalid log level: {}. Valid levels: {:?}",
            config.level, valid_levels
        )));
    }

    if config.directory.is_some() && config.file_prefix.is_empty() {
        return Err(ChekwasError::Config(
            "Log file prefix is required when a log directory is set".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn default_settings_are_valid() {
        assert!(validate_settings(&Settings::default()).is_ok());
    }

    #[test]
    fn rejects_short_jwt_secret() {
        let mut settings = Settings::default();
        settings.auth.jwt_secret = "short".to_string();
        assert_matches!(validate_settings(&settings), Err(ChekwasError::Config(_)));
    }

    #[test]
    fn rejects_token_lifetime_out_of_range() {
        let mut settings = Settings::default();
        settings.auth.token_ttl_hours = 0;
        assert_matches!(validate_settings(&settings), Err(ChekwasError::Config(_)));

        settings.auth.token_ttl_hours = i64::MAX;
        assert_matches!(validate_settings(&settings), Err(ChekwasError::Config(msg)) if msg.contains("cannot exceed"));

        settings.auth.token_ttl_hours = MAX_TOKEN_TTL_HOURS;
        assert!(validate_settings(&settings).is_ok());
    }

    #[test]
    fn dev_secret_is_reported_as_insecure() {
        let mut settings = Settings::default();
        assert!(warn_insecure_defaults(&settings));

        settings.auth.jwt_secret = "a-properly-configured-secret".to_string();
        assert!(!warn_insecure_defaults(&settings));
    }

    #[test]
    fn rejects_min_connections_above_max() {
        let mut settings = Settings::default();
        settings.database.min_connections = 20;
        assert_matches!(validate_settings(&settings), Err(ChekwasError::Config(msg)) if msg.contains("Min connections"));
    }

    #[test]
    fn rejects_unknown_log_level() {
        let mut settings = Settings::default();
        settings.logging.level = "verbose".to_string();
        assert!(validate_settings(&settings).is_err());
    }

    #[test]
    fn redis_only_checked_when_cache_enabled() {
        let mut settings = Settings::default();
        settings.redis.url = String::new();
        assert!(validate_settings(&settings).is_ok());

        settings.features.search_cache = true;
        assert!(validate_settings(&settings).is_err());
    }

    #[test]
    fn disabled_rate_limit_skips_checks() {
        let mut settings = Settings::default();
        settings.rate_limit.enabled = false;
        settings.rate_limit.max_requests = 0;
        assert!(validate_settings(&settings).is_ok());
    }
}
