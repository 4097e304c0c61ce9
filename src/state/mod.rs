//! Shared application state
//!
//! Cloned into every handler and middleware. Everything inside is cheap to
//! clone: the pool, the Redis connection manager and the limiter map are all
//! reference counted.

use std::sync::Arc;

use crate::config::Settings;
use crate::database::{DatabasePool, DatabaseService};
use crate::middleware::RateLimiter;
use crate::services::{CacheService, ServiceFactory};

#[derive(Debug, Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub database: DatabaseService,
    pub services: ServiceFactory,
    pub rate_limiter: RateLimiter,
}

impl AppState {
    pub fn new(settings: Settings, pool: DatabasePool, cache: Option<CacheService>) -> Self {
        let database = DatabaseService::new(pool);
        let services = ServiceFactory::new(&settings, database.clone(), cache);
        let rate_limiter = RateLimiter::from_settings(&settings.rate_limit);

        Self {
            settings: Arc::new(settings),
            database,
            services,
            rate_limiter,
        }
    }
}
