//! Application settings management
//!
//! This module defines the configuration structure and provides methods
//! for loading settings from TOML files and environment variables.

use serde::{Deserialize, Serialize};

/// Main application configuration structure
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Settings {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub redis: RedisConfig,
    pub auth: AuthConfig,
    pub catalog: CatalogConfig,
    pub rate_limit: RateLimitSettings,
    pub logging: LoggingConfig,
    pub features: FeaturesConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Allowed CORS origins. Empty means any origin.
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

/// Database configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout_seconds: u64,
    pub run_migrations: bool,
}

/// Redis configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RedisConfig {
    pub url: String,
    pub prefix: String,
    pub ttl_seconds: u64,
}

/// Token issuing configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub token_ttl_hours: i64,
}

/// Medication catalog configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CatalogConfig {
    pub search_min_length: usize,
    pub search_limit: i64,
    pub max_interaction_selection: usize,
    pub restrict_writes_to_clinicians: bool,
    pub seed_on_startup: bool,
}

/// Rate limiting for the public auth endpoints
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RateLimitSettings {
    pub enabled: bool,
    pub max_requests: u32,
    pub window_seconds: u64,
    pub burst_allowance: u32,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    pub level: String,
    pub json: bool,
    /// Directory for daily rolling log files. No file output when unset.
    pub directory: Option<String>,
    pub file_prefix: String,
}

/// Feature flags configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FeaturesConfig {
    pub search_cache: bool,
}

/// Secret used when nothing is configured. Startup warns when it is in use.
pub const DEV_JWT_SECRET: &str = "chekwasmed-development-secret";

impl Settings {
    /// Load settings from defaults, `config.toml` and environment variables
    pub fn new() -> Result<Self, config::ConfigError> {
        Self::load_from("config")
    }

    /// Load settings using `file_stem` as the optional configuration file
    pub fn load_from(file_stem: &str) -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::Config::try_from(&Settings::default())?)
            .add_source(config::File::with_name(file_stem).required(false))
            .add_source(
                config::Environment::with_prefix("CHEKWASMED")
                    .prefix_separator("__")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("server.cors_origins")
                    .try_parsing(true),
            )
            .build()?;

        settings.try_deserialize()
    }

    /// Validate configuration settings
    pub fn validate(&self) -> Result<(), crate::utils::errors::ChekwasError> {
        super::validation::validate_settings(self)
    }

    /// Warn about insecure defaults; needs logging to be initialized
    pub fn warn_insecure_defaults(&self) -> bool {
        super::validation::warn_insecure_defaults(self)
    }

    /// Socket address string the server binds to
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 5000,
                cors_origins: vec![],
            },
            database: DatabaseConfig {
                url: "postgresql://localhost/chekwasmed".to_string(),
                max_connections: 10,
                min_connections: 1,
                acquire_timeout_seconds: 30,
                run_migrations: true,
            },
            redis: RedisConfig {
                url: "redis://localhost:6379".to_string(),
                prefix: "chekwasmed:".to_string(),
                ttl_seconds: 300,
            },
            auth: AuthConfig {
                jwt_secret: DEV_JWT_SECRET.to_string(),
                token_ttl_hours: 24 * 7,
            },
            catalog: CatalogConfig {
                search_min_length: 2,
                search_limit: 20,
                max_interaction_selection: 50,
                restrict_writes_to_clinicians: false,
                seed_on_startup: false,
            },
            rate_limit: RateLimitSettings {
                enabled: true,
                max_requests: 20,
                window_seconds: 60,
                burst_allowance: 5,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                json: false,
                directory: None,
                file_prefix: "chekwasmed.log".to_string(),
            },
            features: FeaturesConfig {
                search_cache: false,
            },
        }
    }
}
