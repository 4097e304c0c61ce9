//! Medication catalog repository

use std::time::Instant;

use chrono::Utc;
use sqlx::postgres::PgArguments;
use sqlx::query::QueryAs;
use sqlx::types::Json;
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

use crate::models::medication::{DrugClass, Medication, MedicationDraft};
use crate::utils::errors::{ChekwasError, Result};
use crate::utils::logging::log_database_operation;

const DUPLICATE_GENERIC_NAME: &str = "Medication with this generic name already exists";

type MedicationQuery<'q> = QueryAs<'q, Postgres, Medication, PgArguments>;

/// Binds every draft column in the order `$1..=$25`
fn bind_draft<'q>(query: MedicationQuery<'q>, draft: &'q MedicationDraft) -> MedicationQuery<'q> {
    query
        .bind(&draft.generic_name)
        .bind(&draft.brand_names)
        .bind(Json(&draft.active_ingredients))
        .bind(draft.drug_class.as_str())
        .bind(&draft.sub_class)
        .bind(&draft.therapeutic_area)
        .bind(draft.route_of_administration.as_str())
        .bind(&draft.description)
        .bind(Json(&draft.common_dosages))
        .bind(&draft.contraindications)
        .bind(Json(&draft.side_effects))
        .bind(draft.pregnancy_category.as_str())
        .bind(draft.pediatric_use)
        .bind(&draft.geriatric_considerations)
        .bind(&draft.interactions)
        .bind(&draft.major_interactions)
        .bind(&draft.moderate_interactions)
        .bind(&draft.minor_interactions)
        .bind(&draft.food_interactions)
        .bind(&draft.lifestyle_warnings)
        .bind(draft.fda_approved)
        .bind(draft.mhra_approved)
        .bind(draft.approval_date)
        .bind(draft.prescription_required)
        .bind(draft.controlled_schedule.as_str())
}

#[derive(Clone, Debug)]
pub struct MedicationRepository {
    pool: PgPool,
}

impl MedicationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a new catalog entry
    pub async fn create(&self, draft: &MedicationDraft) -> Result<Medication> {
        let query = sqlx::query_as::<_, Medication>(
            r#"
            INSERT INTO medications (
                generic_name, brand_names, active_ingredients, drug_class, sub_class,
                therapeutic_area, route_of_administration, description, common_dosages,
                contraindications, side_effects, pregnancy_category, pediatric_use,
                geriatric_considerations, interactions, major_interactions,
                moderate_interactions, minor_interactions, food_interactions,
                lifestyle_warnings, fda_approved, mhra_approved, approval_date,
                prescription_required, controlled_schedule, created_at, updated_at
            )
            VALUES (
                $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16,
                $17, $18, $19, $20, $21, $22, $23, $24, $25, $26, $26
            )
            RETURNING *
            "#,
        );

        bind_draft(query, draft)
            .bind(Utc::now())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| ChekwasError::from_unique_violation(e, DUPLICATE_GENERIC_NAME))
    }

    /// Find an active entry by ID
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Medication>> {
        let medication =
            sqlx::query_as::<_, Medication>("SELECT * FROM medications WHERE id = $1 AND is_active")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(medication)
    }

    /// Active entries among `ids`, in no particular order
    pub async fn find_active_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Medication>> {
        if ids.is_empty() {
            return Ok(vec![]);
        }

        let medications = sqlx::query_as::<_, Medication>(
            "SELECT * FROM medications WHERE id = ANY($1) AND is_active",
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(medications)
    }

    /// List active entries, optionally filtered by class
    pub async fn list(&self, drug_class: Option<DrugClass>, limit: i64, offset: i64) -> Result<Vec<Medication>> {
        let medications = sqlx::query_as::<_, Medication>(
            r#"
            SELECT * FROM medications
            WHERE is_active AND ($1::TEXT IS NULL OR drug_class = $1)
            ORDER BY generic_name
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(drug_class.map(|class| class.as_str()))
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(medications)
    }

    /// Case-insensitive substring search over generic, brand and ingredient names.
    ///
    /// `term` must already be escaped for LIKE.
    pub async fn search(&self, escaped_term: &str, limit: i64) -> Result<Vec<Medication>> {
        let started = Instant::now();
        let result = sqlx::query_as::<_, Medication>(
            r#"
            SELECT * FROM medications m
            WHERE m.is_active
              AND (
                m.generic_name ILIKE $1
                OR EXISTS (SELECT 1 FROM unnest(m.brand_names) AS brand WHERE brand ILIKE $1)
                OR EXISTS (
                    SELECT 1 FROM jsonb_array_elements(m.active_ingredients) AS ingredient
                    WHERE ingredient->>'name' ILIKE $1
                )
              )
            ORDER BY m.generic_name
            LIMIT $2
            "#,
        )
        .bind(format!("%{}%", escaped_term))
        .bind(limit)
        .fetch_all(&self.pool)
        .await;

        log_database_operation(
            "search",
            "medications",
            started.elapsed().as_millis() as u64,
            result.is_ok(),
        );
        Ok(result?)
    }

    /// Replace every writable column of an active entry
    pub async fn update(&self, id: Uuid, draft: &MedicationDraft) -> Result<Option<Medication>> {
        let query = sqlx::query_as::<_, Medication>(
            r#"
            UPDATE medications
            SET generic_name = $1, brand_names = $2, active_ingredients = $3,
                drug_class = $4, sub_class = $5, therapeutic_area = $6,
                route_of_administration = $7, description = $8, common_dosages = $9,
                contraindications = $10, side_effects = $11, pregnancy_category = $12,
                pediatric_use = $13, geriatric_considerations = $14, interactions = $15,
                major_interactions = $16, moderate_interactions = $17,
                minor_interactions = $18, food_interactions = $19,
                lifestyle_warnings = $20, fda_approved = $21, mhra_approved = $22,
                approval_date = $23, prescription_required = $24,
                controlled_schedule = $25, updated_at = $26
            WHERE id = $27 AND is_active
            RETURNING *
            "#,
        );

        bind_draft(query, draft)
            .bind(Utc::now())
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| ChekwasError::from_unique_violation(e, DUPLICATE_GENERIC_NAME))
    }

    /// Soft delete. Returns false when the entry was missing or already inactive.
    pub async fn soft_delete(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE medications SET is_active = FALSE, updated_at = $2 WHERE id = $1 AND is_active",
        )
        .bind(id)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Insert `draft` unless an active entry with the same generic name exists.
    /// Returns true when a row was inserted.
    pub async fn insert_if_absent(&self, draft: &MedicationDraft) -> Result<bool> {
        let query = sqlx::query_as::<_, Medication>(
            r#"
            INSERT INTO medications (
                generic_name, brand_names, active_ingredients, drug_class, sub_class,
                therapeutic_area, route_of_administration, description, common_dosages,
                contraindications, side_effects, pregnancy_category, pediatric_use,
                geriatric_considerations, interactions, major_interactions,
                moderate_interactions, minor_interactions, food_interactions,
                lifestyle_warnings, fda_approved, mhra_approved, approval_date,
                prescription_required, controlled_schedule, created_at, updated_at
            )
            VALUES (
                $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16,
                $17, $18, $19, $20, $21, $22, $23, $24, $25, $26, $26
            )
            ON CONFLICT (generic_name) WHERE is_active DO NOTHING
            RETURNING *
            "#,
        );

        let inserted = bind_draft(query, draft)
            .bind(Utc::now())
            .fetch_optional(&self.pool)
            .await?;

        Ok(inserted.is_some())
    }
}
