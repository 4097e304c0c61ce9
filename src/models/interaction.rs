//! Interaction check request and report types

use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InteractionSeverity {
    Minor,
    Moderate,
    Major,
}

/// Overall risk of the checked combination
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RiskLevel {
    Low,
    LowModerate,
    Moderate,
    High,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::LowModerate => "low-moderate",
            RiskLevel::Moderate => "moderate",
            RiskLevel::High => "high",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MedicationRef {
    pub id: Uuid,
    pub name: String,
}

/// One interacting pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InteractionFinding {
    pub medication_a: MedicationRef,
    pub medication_b: MedicationRef,
    pub severity: InteractionSeverity,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllergyAlert {
    pub allergy: String,
    pub medication: MedicationRef,
    pub matched_name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WarningKind {
    Food,
    Lifestyle,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MedicationWarning {
    pub medication: MedicationRef,
    pub kind: WarningKind,
    pub warning: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CheckConflictsRequest {
    #[serde(default)]
    pub medication_ids: Vec<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InteractionReport {
    pub medications_checked: usize,
    pub conflicts_found: usize,
    pub interactions: Vec<InteractionFinding>,
    pub allergy_alerts: Vec<AllergyAlert>,
    pub warnings: Vec<MedicationWarning>,
    pub risk_level: RiskLevel,
    pub unresolved_ids: Vec<Uuid>,
}
