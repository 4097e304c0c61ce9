//! Regimen service

use uuid::Uuid;

use crate::database::DatabaseService;
use crate::models::user::User;
use crate::models::user_medication::{
    AddUserMedicationRequest, MissedDoseRequest, RegimenEntry, UpdateUserMedicationRequest,
    UserMedication,
};
use crate::utils::errors::{ChekwasError, Result};
use crate::utils::logging::log_user_action;

#[derive(Debug, Clone)]
pub struct UserMedicationService {
    database: DatabaseService,
}

impl UserMedicationService {
    pub fn new(database: DatabaseService) -> Self {
        Self { database }
    }

    /// Active regimen, newest first
    pub async fn list(&self, user: &User) -> Result<Vec<RegimenEntry>> {
        self.database.regimen_with_medications(user.id).await
    }

    pub async fn get(&self, user: &User, id: Uuid) -> Result<RegimenEntry> {
        let entry = self
            .database
            .user_medications
            .find_for_user(user.id, id)
            .await?
            .ok_or(ChekwasError::UserMedicationNotFound { user_medication_id: id })?;
        self.with_medication(entry).await
    }

    pub async fn add(&self, user: &User, request: AddUserMedicationRequest) -> Result<RegimenEntry> {
        let new_entry = request.validate()?;

        let medication = self
            .database
            .medications
            .find_by_id(new_entry.medication_id)
            .await?
            .ok_or(ChekwasError::MedicationNotFound {
                medication_id: new_entry.medication_id,
            })?;

        let entry = self.database.user_medications.create(user.id, &new_entry).await?;
        log_user_action(user.id, "add_medication", Some(&medication.generic_name));
        Ok(RegimenEntry::new(entry, Some(medication.summary())))
    }

    pub async fn update(&self, user: &User, id: Uuid, request: UpdateUserMedicationRequest) -> Result<RegimenEntry> {
        let mut entry = self
            .database
            .user_medications
            .find_for_user(user.id, id)
            .await?
            .ok_or(ChekwasError::UserMedicationNotFound { user_medication_id: id })?;

        request.apply_to(&mut entry)?;

        let saved = self
            .database
            .user_medications
            .update(&entry)
            .await?
            .ok_or(ChekwasError::UserMedicationNotFound { user_medication_id: id })?;
        log_user_action(user.id, "update_medication", None);
        self.with_medication(saved).await
    }

    pub async fn record_missed_dose(&self, user: &User, id: Uuid, request: MissedDoseRequest) -> Result<RegimenEntry> {
        let dose = request.into_missed_dose();
        let entry = self
            .database
            .user_medications
            .append_missed_dose(user.id, id, &dose)
            .await?
            .ok_or(ChekwasError::UserMedicationNotFound { user_medication_id: id })?;

        log_user_action(user.id, "missed_dose", dose.reason.as_deref());
        self.with_medication(entry).await
    }

    /// Soft delete, setting the end date when missing
    pub async fn remove(&self, user: &User, id: Uuid) -> Result<()> {
        self.database
            .user_medications
            .deactivate(user.id, id)
            .await?
            .ok_or(ChekwasError::UserMedicationNotFound { user_medication_id: id })?;

        log_user_action(user.id, "remove_medication", None);
        Ok(())
    }

    async fn with_medication(&self, entry: UserMedication) -> Result<RegimenEntry> {
        let medication = self
            .database
            .medications
            .find_active_by_ids(&[entry.medication_id])
            .await?
            .into_iter()
            .next()
            .map(|m| m.summary());
        Ok(RegimenEntry::new(entry, medication))
    }
}
