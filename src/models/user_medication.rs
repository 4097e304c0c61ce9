//! Regimen entries linking a user to a catalog medication

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::medication::MedicationSummary;
use crate::utils::errors::{ChekwasError, Result};
use crate::utils::helpers::{clean_list, clean_optional, days_between_ceil};

pub const MAX_TIMES_PER_DAY: u8 = 24;
pub const DEFAULT_ADHERENCE_SCORE: i16 = 100;

text_enum! {
    pub enum DosageUnit {
        Mg => "mg",
        G => "g",
        Ml => "ml",
        Tablets => "tablets",
        Capsules => "capsules",
        Units => "units",
        Drops => "drops",
    }
}

text_enum! {
    pub enum SideEffectSeverity {
        Mild => "mild",
        Moderate => "moderate",
        Severe => "severe",
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dosage {
    pub amount: f64,
    pub unit: DosageUnit,
}

impl Dosage {
    fn validate(&self) -> Result<()> {
        if !self.amount.is_finite() || self.amount <= 0.0 {
            return Err(ChekwasError::InvalidInput(
                "Dosage amount must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frequency {
    pub times_per_day: u8,
    #[serde(default)]
    pub schedule: Vec<String>,
    #[serde(default)]
    pub as_needed: bool,
}

impl Frequency {
    fn normalize(mut self) -> Result<Self> {
        if !(1..=MAX_TIMES_PER_DAY).contains(&self.times_per_day) {
            return Err(ChekwasError::InvalidInput(format!(
                "Times per day must be between 1 and {}",
                MAX_TIMES_PER_DAY
            )));
        }
        self.schedule = clean_list(self.schedule);
        Ok(self)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Prescriber {
    pub doctor_name: Option<String>,
    pub specialty: Option<String>,
    pub contact_info: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissedDose {
    pub date: DateTime<Utc>,
    pub reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperiencedSideEffect {
    pub effect: String,
    pub severity: Option<SideEffectSeverity>,
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub resolved: bool,
}

/// Patient's own 1-10 ratings
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PatientReported {
    pub effectiveness: Option<u8>,
    pub tolerability: Option<u8>,
}

impl PatientReported {
    fn validate(&self) -> Result<()> {
        for (label, score) in [("Effectiveness", self.effectiveness), ("Tolerability", self.tolerability)] {
            if let Some(score) = score {
                if !(1..=10).contains(&score) {
                    return Err(ChekwasError::InvalidInput(format!(
                        "{} must be between 1 and 10",
                        label
                    )));
                }
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UserMedication {
    pub id: Uuid,
    pub user_id: Uuid,
    pub medication_id: Uuid,
    #[sqlx(json)]
    pub dosage: Dosage,
    #[sqlx(json)]
    pub frequency: Frequency,
    #[sqlx(json)]
    pub prescribed_by: Option<Prescriber>,
    pub indication: Option<String>,
    pub start_date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
    pub adherence_score: i16,
    #[sqlx(json)]
    pub missed_doses: Vec<MissedDose>,
    #[sqlx(json)]
    pub experienced_side_effects: Vec<ExperiencedSideEffect>,
    pub notes: Option<String>,
    #[sqlx(json)]
    pub patient_reported: Option<PatientReported>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserMedication {
    /// Whole days on this medication, up to the end date or now
    pub fn duration_days(&self) -> i64 {
        self.duration_days_at(Utc::now())
    }

    pub fn duration_days_at(&self, now: DateTime<Utc>) -> i64 {
        days_between_ceil(self.start_date, self.end_date.unwrap_or(now))
    }
}

/// Regimen entry with its catalog medication, as returned by the API
#[derive(Debug, Clone, Serialize)]
pub struct RegimenEntry {
    #[serde(flatten)]
    pub entry: UserMedication,
    pub duration_days: i64,
    pub medication: Option<MedicationSummary>,
}

impl RegimenEntry {
    pub fn new(entry: UserMedication, medication: Option<MedicationSummary>) -> Self {
        let duration_days = entry.duration_days();
        Self {
            entry,
            duration_days,
            medication,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AddUserMedicationRequest {
    pub medication_id: Option<Uuid>,
    pub dosage: Option<Dosage>,
    pub frequency: Option<Frequency>,
    pub prescribed_by: Option<Prescriber>,
    pub indication: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub notes: Option<String>,
}

/// Validated regimen entry ready for insertion
#[derive(Debug, Clone)]
pub struct NewUserMedication {
    pub medication_id: Uuid,
    pub dosage: Dosage,
    pub frequency: Frequency,
    pub prescribed_by: Option<Prescriber>,
    pub indication: Option<String>,
    pub start_date: DateTime<Utc>,
    pub notes: Option<String>,
}

impl AddUserMedicationRequest {
    pub fn validate(self) -> Result<NewUserMedication> {
        let (medication_id, dosage, frequency) = match (self.medication_id, self.dosage, self.frequency) {
            (Some(id), Some(dosage), Some(frequency)) => (id, dosage, frequency),
            (id, dosage, frequency) => {
                let mut missing = Vec::new();
                if id.is_none() {
                    missing.push("medication_id".to_string());
                }
                if dosage.is_none() {
                    missing.push("dosage".to_string());
                }
                if frequency.is_none() {
                    missing.push("frequency".to_string());
                }
                return Err(ChekwasError::MissingFields(missing));
            }
        };

        dosage.validate()?;
        let frequency = frequency.normalize()?;

        Ok(NewUserMedication {
            medication_id,
            dosage,
            frequency,
            prescribed_by: self.prescribed_by,
            indication: clean_optional(self.indication),
            start_date: self.start_date.unwrap_or_else(Utc::now),
            notes: clean_optional(self.notes),
        })
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateUserMedicationRequest {
    pub dosage: Option<Dosage>,
    pub frequency: Option<Frequency>,
    pub prescribed_by: Option<Prescriber>,
    pub indication: Option<String>,
    pub end_date: Option<DateTime<Utc>>,
    pub adherence_score: Option<i16>,
    pub experienced_side_effects: Option<Vec<ExperiencedSideEffect>>,
    pub notes: Option<String>,
    pub patient_reported: Option<PatientReported>,
}

impl UpdateUserMedicationRequest {
    pub fn apply_to(self, entry: &mut UserMedication) -> Result<()> {
        if let Some(dosage) = self.dosage {
            dosage.validate()?;
            entry.dosage = dosage;
        }
        if let Some(frequency) = self.frequency {
            entry.frequency = frequency.normalize()?;
        }
        if self.prescribed_by.is_some() {
            entry.prescribed_by = self.prescribed_by;
        }
        if let Some(indication) = self.indication {
            entry.indication = clean_optional(Some(indication));
        }
        if let Some(end_date) = self.end_date {
            if end_date < entry.start_date {
                return Err(ChekwasError::InvalidInput(
                    "End date cannot be before start date".to_string(),
                ));
            }
            entry.end_date = Some(end_date);
        }
        if let Some(score) = self.adherence_score {
            if !(0..=100).contains(&score) {
                return Err(ChekwasError::InvalidInput(
                    "Adherence score must be between 0 and 100".to_string(),
                ));
            }
            entry.adherence_score = score;
        }
        if let Some(effects) = self.experienced_side_effects {
            let mut cleaned = Vec::with_capacity(effects.len());
            for mut effect in effects {
                effect.effect = effect.effect.trim().to_string();
                if effect.effect.is_empty() {
                    return Err(ChekwasError::InvalidInput("Side effect cannot be empty".to_string()));
                }
                cleaned.push(effect);
            }
            entry.experienced_side_effects = cleaned;
        }
        if let Some(notes) = self.notes {
            entry.notes = clean_optional(Some(notes));
        }
        if let Some(reported) = self.patient_reported {
            reported.validate()?;
            entry.patient_reported = Some(reported);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MissedDoseRequest {
    pub date: Option<DateTime<Utc>>,
    pub reason: Option<String>,
}

impl MissedDoseRequest {
    pub fn into_missed_dose(self) -> MissedDose {
        MissedDose {
            date: self.date.unwrap_or_else(Utc::now),
            reason: clean_optional(self.reason),
        }
    }
}
