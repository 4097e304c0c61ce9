//! Regimen repository

use chrono::Utc;
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::user_medication::{MissedDose, NewUserMedication, UserMedication};
use crate::utils::errors::{ChekwasError, Result};

pub const ALREADY_TAKING: &str = "You are already taking this medication";

#[derive(Clone, Debug)]
pub struct UserMedicationRepository {
    pool: PgPool,
}

impl UserMedicationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Add an entry to the user's regimen
    pub async fn create(&self, user_id: Uuid, entry: &NewUserMedication) -> Result<UserMedication> {
        sqlx::query_as::<_, UserMedication>(
            r#"
            INSERT INTO user_medications (
                user_id, medication_id, dosage, frequency, prescribed_by, indication,
                start_date, notes, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $9)
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(entry.medication_id)
        .bind(Json(&entry.dosage))
        .bind(Json(&entry.frequency))
        .bind(Json(&entry.prescribed_by))
        .bind(&entry.indication)
        .bind(entry.start_date)
        .bind(&entry.notes)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| ChekwasError::from_unique_violation(e, ALREADY_TAKING))
    }

    /// Active entries of a user, newest first
    pub async fn list_active_by_user(&self, user_id: Uuid) -> Result<Vec<UserMedication>> {
        let entries = sqlx::query_as::<_, UserMedication>(
            "SELECT * FROM user_medications WHERE user_id = $1 AND is_active ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }

    /// Active entry owned by `user_id`
    pub async fn find_for_user(&self, user_id: Uuid, id: Uuid) -> Result<Option<UserMedication>> {
        let entry = sqlx::query_as::<_, UserMedication>(
            "SELECT * FROM user_medications WHERE id = $1 AND user_id = $2 AND is_active",
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(entry)
    }

    /// Persist the mutable fields of `entry`
    pub async fn update(&self, entry: &UserMedication) -> Result<Option<UserMedication>> {
        let updated = sqlx::query_as::<_, UserMedication>(
            r#"
            UPDATE user_medications
            SET dosage = $3,
                frequency = $4,
                prescribed_by = $5,
                indication = $6,
                end_date = $7,
                adherence_score = $8,
                experienced_side_effects = $9,
                notes = $10,
                patient_reported = $11,
                updated_at = $12
            WHERE id = $1 AND user_id = $2 AND is_active
            RETURNING *
            "#,
        )
        .bind(entry.id)
        .bind(entry.user_id)
        .bind(Json(&entry.dosage))
        .bind(Json(&entry.frequency))
        .bind(Json(&entry.prescribed_by))
        .bind(&entry.indication)
        .bind(entry.end_date)
        .bind(entry.adherence_score)
        .bind(Json(&entry.experienced_side_effects))
        .bind(&entry.notes)
        .bind(Json(&entry.patient_reported))
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        Ok(updated)
    }

    /// Append a missed dose to an active entry
    pub async fn append_missed_dose(
        &self,
        user_id: Uuid,
        id: Uuid,
        dose: &MissedDose,
    ) -> Result<Option<UserMedication>> {
        let updated = sqlx::query_as::<_, UserMedication>(
            r#"
            UPDATE user_medications
            SET missed_doses = missed_doses || $3::JSONB,
                updated_at = $4
            WHERE id = $1 AND user_id = $2 AND is_active
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(user_id)
        .bind(Json([dose]))
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        Ok(updated)
    }

    /// Soft delete, closing the entry at the current time if no end date is set
    pub async fn deactivate(&self, user_id: Uuid, id: Uuid) -> Result<Option<UserMedication>> {
        let now = Utc::now();
        let updated = sqlx::query_as::<_, UserMedication>(
            r#"
            UPDATE user_medications
            SET is_active = FALSE,
                end_date = COALESCE(end_date, $3),
                updated_at = $3
            WHERE id = $1 AND user_id = $2 AND is_active
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(user_id)
        .bind(now)
        .fetch_optional(&self.pool)
        .await?;

        Ok(updated)
    }
}
