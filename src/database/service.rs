//! Database service layer
//!
//! This module provides a high-level interface to database operations

use std::collections::HashMap;

use uuid::Uuid;

use crate::database::connection::{health_check, DatabasePool};
use crate::database::repositories::{MedicationRepository, UserMedicationRepository, UserRepository};
use crate::models::user_medication::RegimenEntry;
use crate::utils::errors::Result;

#[derive(Debug, Clone)]
pub struct DatabaseService {
    pool: DatabasePool,
    pub users: UserRepository,
    pub medications: MedicationRepository,
    pub user_medications: UserMedicationRepository,
}

impl DatabaseService {
    pub fn new(pool: DatabasePool) -> Self {
        Self {
            users: UserRepository::new(pool.clone()),
            medications: MedicationRepository::new(pool.clone()),
            user_medications: UserMedicationRepository::new(pool.clone()),
            pool,
        }
    }

    /// Check that the database answers
    pub async fn health_check(&self) -> Result<()> {
        health_check(&self.pool).await
    }

    /// Active regimen of a user, each entry joined with its catalog medication
    pub async fn regimen_with_medications(&self, user_id: Uuid) -> Result<Vec<RegimenEntry>> {
        let entries = self.user_medications.list_active_by_user(user_id).await?;
        let ids: Vec<Uuid> = entries.iter().map(|entry| entry.medication_id).collect();

        let by_id: HashMap<Uuid, _> = self
            .medications
            .find_active_by_ids(&ids)
            .await?
            .into_iter()
            .map(|medication| (medication.id, medication.summary()))
            .collect();

        Ok(entries
            .into_iter()
            .map(|entry| {
                let medication = by_id.get(&entry.medication_id).cloned();
                RegimenEntry::new(entry, medication)
            })
            .collect())
    }
}
