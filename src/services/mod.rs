//! Services module
//!
//! This module contains business logic services

pub mod auth;
pub mod cache;
pub mod interaction;
pub mod medication;
pub mod user;
pub mod user_medication;

// Re-export commonly used services
pub use auth::{AuthResponse, AuthService, Claims};
pub use cache::CacheService;
pub use interaction::InteractionService;
pub use medication::{require_role, MedicationService};
pub use user::UserService;
pub use user_medication::UserMedicationService;

use crate::config::Settings;
use crate::database::DatabaseService;

/// Service factory for creating and managing all services
#[derive(Debug, Clone)]
pub struct ServiceFactory {
    pub auth_service: AuthService,
    pub user_service: UserService,
    pub medication_service: MedicationService,
    pub user_medication_service: UserMedicationService,
    pub interaction_service: InteractionService,
    pub cache_service: Option<CacheService>,
}

impl ServiceFactory {
    /// Create a new ServiceFactory with all services initialized
    pub fn new(settings: &Settings, database: DatabaseService, cache: Option<CacheService>) -> Self {
        Self {
            auth_service: AuthService::new(database.users.clone(), &settings.auth),
            user_service: UserService::new(database.users.clone()),
            medication_service: MedicationService::new(
                database.medications.clone(),
                cache.clone(),
                settings.catalog.clone(),
            ),
            user_medication_service: UserMedicationService::new(database.clone()),
            interaction_service: InteractionService::new(
                database,
                settings.catalog.max_interaction_selection,
            ),
            cache_service: cache,
        }
    }

    /// Health check for optional services
    pub async fn health_check(&self) -> ServiceHealthStatus {
        let redis_healthy = match &self.cache_service {
            Some(cache) => Some(cache.health_check().await.unwrap_or(false)),
            None => None,
        };

        ServiceHealthStatus { redis_healthy }
    }
}

/// Health status of optional services. `None` means not configured.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ServiceHealthStatus {
    pub redis_healthy: Option<bool>,
}
