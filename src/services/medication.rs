//! Medication catalog service
//!
//! Search results are cached in Redis when a cache is configured. Any catalog
//! write clears the cached searches.

use uuid::Uuid;

use crate::config::CatalogConfig;
use crate::database::repositories::MedicationRepository;
use crate::models::medication::{
    CreateMedicationRequest, ListMedicationsQuery, Medication, MedicationDraft, MedicationSummary,
    UpdateMedicationRequest,
};
use crate::models::user::{Role, User};
use crate::services::cache::CacheService;
use crate::utils::errors::{ChekwasError, Result};
use crate::utils::helpers::{clamp_limit, escape_like};
use crate::utils::logging::{log_cache_error, log_catalog_change};

const SEARCH_KEY_PREFIX: &str = "search:";
const MAX_PAGE_SIZE: i64 = 100;
const DEFAULT_PAGE_SIZE: i64 = 50;

pub const CATALOG_WRITE_ROLES: &[Role] = &[Role::Doctor, Role::Pharmacist];

#[derive(Debug, Clone)]
pub struct MedicationService {
    medications: MedicationRepository,
    cache: Option<CacheService>,
    config: CatalogConfig,
}

impl MedicationService {
    pub fn new(medications: MedicationRepository, cache: Option<CacheService>, config: CatalogConfig) -> Self {
        Self {
            medications,
            cache,
            config,
        }
    }

    /// Trimmed search term, rejected when shorter than the configured minimum
    pub fn validate_search_term(&self, raw: Option<&str>) -> Result<String> {
        let term = raw.unwrap_or_default().trim();
        if term.chars().count() < self.config.search_min_length {
            return Err(ChekwasError::InvalidInput(format!(
                "Search term must be at least {} characters",
                self.config.search_min_length
            )));
        }
        Ok(term.to_string())
    }

    /// Substring search over generic, brand and ingredient names
    pub async fn search(&self, raw: Option<&str>) -> Result<Vec<MedicationSummary>> {
        let term = self.validate_search_term(raw)?;
        let cache_key = format!("{}{}", SEARCH_KEY_PREFIX, term.to_lowercase());

        if let Some(cache) = &self.cache {
            match cache.get::<Vec<MedicationSummary>>(&cache_key).await {
                Ok(Some(hit)) => return Ok(hit),
                Ok(None) => {}
                Err(e) => log_cache_error("get", &e.to_string()),
            }
        }

        let results: Vec<MedicationSummary> = self
            .medications
            .search(&escape_like(&term), self.config.search_limit)
            .await?
            .iter()
            .map(Medication::summary)
            .collect();

        if let Some(cache) = &self.cache {
            if let Err(e) = cache.set(&cache_key, &results).await {
                log_cache_error("set", &e.to_string());
            }
        }

        Ok(results)
    }

    pub async fn list(&self, query: ListMedicationsQuery) -> Result<Vec<Medication>> {
        let limit = clamp_limit(query.limit, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE);
        let offset = query.offset.unwrap_or(0).max(0);
        self.medications.list(query.drug_class, limit, offset).await
    }

    pub async fn get(&self, id: Uuid) -> Result<Medication> {
        self.medications
            .find_by_id(id)
            .await?
            .ok_or(ChekwasError::MedicationNotFound { medication_id: id })
    }

    pub async fn create(&self, user: &User, request: CreateMedicationRequest) -> Result<Medication> {
        self.check_write_access(user)?;
        let draft = request.into_draft()?;
        self.check_references(None, &draft).await?;

        let medication = self.medications.create(&draft).await?;
        log_catalog_change(medication.id, "create", user.id);
        self.invalidate_search_cache().await;
        Ok(medication)
    }

    pub async fn update(&self, user: &User, id: Uuid, request: UpdateMedicationRequest) -> Result<Medication> {
        self.check_write_access(user)?;
        let current = self.get(id).await?;
        let draft = request.apply_to(current.to_draft())?;
        self.check_references(Some(id), &draft).await?;

        let medication = self
            .medications
            .update(id, &draft)
            .await?
            .ok_or(ChekwasError::MedicationNotFound { medication_id: id })?;
        log_catalog_change(id, "update", user.id);
        self.invalidate_search_cache().await;
        Ok(medication)
    }

    /// Soft delete
    pub async fn delete(&self, user: &User, id: Uuid) -> Result<()> {
        self.check_write_access(user)?;
        if !self.medications.soft_delete(id).await? {
            return Err(ChekwasError::MedicationNotFound { medication_id: id });
        }

        log_catalog_change(id, "delete", user.id);
        self.invalidate_search_cache().await;
        Ok(())
    }

    fn check_write_access(&self, user: &User) -> Result<()> {
        if self.config.restrict_writes_to_clinicians {
            require_role(user, CATALOG_WRITE_ROLES)?;
        }
        Ok(())
    }

    /// Interaction lists may only reference other active catalog entries
    async fn check_references(&self, own_id: Option<Uuid>, draft: &MedicationDraft) -> Result<()> {
        let referenced = draft.referenced_ids();
        if own_id.is_some_and(|id| referenced.contains(&id)) {
            return Err(ChekwasError::InvalidInput(
                "A medication cannot interact with itself".to_string(),
            ));
        }

        let found = self.medications.find_active_by_ids(&referenced).await?;
        if let Some(missing) = referenced.iter().find(|id| !found.iter().any(|m| m.id == **id)) {
            return Err(ChekwasError::InvalidInput(format!(
                "Interaction references unknown medication {}",
                missing
            )));
        }
        Ok(())
    }

    async fn invalidate_search_cache(&self) {
        if let Some(cache) = &self.cache {
            if let Err(e) = cache.delete_pattern(&format!("{}*", SEARCH_KEY_PREFIX)).await {
                log_cache_error("invalidate", &e.to_string());
            }
        }
    }
}

/// Reject users whose role is not in `roles`
pub fn require_role(user: &User, roles: &[Role]) -> Result<()> {
    if roles.contains(&user.role) {
        return Ok(());
    }

    let names: Vec<&str> = roles.iter().map(Role::as_str).collect();
    Err(ChekwasError::PermissionDenied(format!(
        "Access denied. Required role: {}",
        names.join(" or ")
    )))
}
