//! Medication catalog model

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::utils::errors::{ChekwasError, Result};
use crate::utils::helpers::{clean_list, clean_optional};

text_enum! {
    /// Broad drug classification
    pub enum DrugClass {
        Analgesic => "analgesic",
        Antibiotic => "antibiotic",
        Antidepressant => "antidepressant",
        Antihistamine => "antihistamine",
        Antihypertensive => "antihypertensive",
        Anticoagulant => "anticoagulant",
        DiabetesMedication => "diabetes_medication",
        HeartMedication => "heart_medication",
        PsychiatricMedication => "psychiatric_medication",
        Hormone => "hormone",
        Vitamin => "vitamin",
        Supplement => "supplement",
        Other => "other",
    }
}

text_enum! {
    pub enum RouteOfAdministration {
        Oral => "oral",
        Injection => "injection",
        Topical => "topical",
        Inhalation => "inhalation",
        Other => "other",
    }
}

text_enum! {
    pub enum PregnancyCategory {
        A => "A",
        B => "B",
        C => "C",
        D => "D",
        X => "X",
        Unknown => "unknown",
    }
}

text_enum! {
    /// Controlled substance schedule
    pub enum ControlledSchedule {
        I => "I",
        II => "II",
        III => "III",
        IV => "IV",
        V => "V",
        None => "none",
    }
}

text_enum! {
    pub enum SideEffectFrequency {
        Common => "common",
        Uncommon => "uncommon",
        Rare => "rare",
        VeryRare => "very_rare",
    }
}

impl Default for RouteOfAdministration {
    fn default() -> Self {
        RouteOfAdministration::Oral
    }
}

impl Default for PregnancyCategory {
    fn default() -> Self {
        PregnancyCategory::Unknown
    }
}

impl Default for ControlledSchedule {
    fn default() -> Self {
        ControlledSchedule::None
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActiveIngredient {
    pub name: String,
    pub strength: Option<String>,
    pub unit: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CommonDosage {
    pub strength: Option<String>,
    pub frequency: Option<String>,
    pub indication: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SideEffect {
    pub effect: String,
    pub frequency: Option<SideEffectFrequency>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Medication {
    pub id: Uuid,
    pub generic_name: String,
    pub brand_names: Vec<String>,
    #[sqlx(json)]
    pub active_ingredients: Vec<ActiveIngredient>,
    #[sqlx(try_from = "String")]
    pub drug_class: DrugClass,
    pub sub_class: Option<String>,
    pub therapeutic_area: String,
    #[sqlx(try_from = "String")]
    pub route_of_administration: RouteOfAdministration,
    pub description: Option<String>,
    #[sqlx(json)]
    pub common_dosages: Vec<CommonDosage>,
    pub contraindications: Vec<String>,
    #[sqlx(json)]
    pub side_effects: Vec<SideEffect>,
    #[sqlx(try_from = "String")]
    pub pregnancy_category: PregnancyCategory,
    pub pediatric_use: Option<bool>,
    pub geriatric_considerations: Option<String>,
    pub interactions: Vec<String>,
    pub major_interactions: Vec<Uuid>,
    pub moderate_interactions: Vec<Uuid>,
    pub minor_interactions: Vec<Uuid>,
    pub food_interactions: Vec<String>,
    pub lifestyle_warnings: Vec<String>,
    pub fda_approved: bool,
    pub mhra_approved: bool,
    pub approval_date: Option<NaiveDate>,
    pub prescription_required: bool,
    #[sqlx(try_from = "String")]
    pub controlled_schedule: ControlledSchedule,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Every interaction list of a medication, grouped by kind
#[derive(Debug, Clone, Serialize)]
pub struct InteractionGroups<'a> {
    pub major: &'a [Uuid],
    pub moderate: &'a [Uuid],
    pub minor: &'a [Uuid],
    pub named: &'a [String],
    pub food: &'a [String],
    pub lifestyle: &'a [String],
}

impl Medication {
    pub fn all_interactions(&self) -> InteractionGroups<'_> {
        InteractionGroups {
            major: &self.major_interactions,
            moderate: &self.moderate_interactions,
            minor: &self.minor_interactions,
            named: &self.interactions,
            food: &self.food_interactions,
            lifestyle: &self.lifestyle_warnings,
        }
    }

    /// Generic name followed by brand names
    pub fn names(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.generic_name.as_str()).chain(self.brand_names.iter().map(String::as_str))
    }

    pub fn summary(&self) -> MedicationSummary {
        MedicationSummary {
            id: self.id,
            generic_name: self.generic_name.clone(),
            brand_names: self.brand_names.clone(),
            drug_class: self.drug_class,
            therapeutic_area: self.therapeutic_area.clone(),
        }
    }

    /// Writable fields of this entry, used as the base of a partial update
    pub fn to_draft(&self) -> MedicationDraft {
        MedicationDraft {
            generic_name: self.generic_name.clone(),
            brand_names: self.brand_names.clone(),
            active_ingredients: self.active_ingredients.clone(),
            drug_class: self.drug_class,
            sub_class: self.sub_class.clone(),
            therapeutic_area: self.therapeutic_area.clone(),
            route_of_administration: self.route_of_administration,
            description: self.description.clone(),
            common_dosages: self.common_dosages.clone(),
            contraindications: self.contraindications.clone(),
            side_effects: self.side_effects.clone(),
            pregnancy_category: self.pregnancy_category,
            pediatric_use: self.pediatric_use,
            geriatric_considerations: self.geriatric_considerations.clone(),
            interactions: self.interactions.clone(),
            major_interactions: self.major_interactions.clone(),
            moderate_interactions: self.moderate_interactions.clone(),
            minor_interactions: self.minor_interactions.clone(),
            food_interactions: self.food_interactions.clone(),
            lifestyle_warnings: self.lifestyle_warnings.clone(),
            fda_approved: self.fda_approved,
            mhra_approved: self.mhra_approved,
            approval_date: self.approval_date,
            prescription_required: self.prescription_required,
            controlled_schedule: self.controlled_schedule,
        }
    }
}

/// Compact search result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MedicationSummary {
    pub id: Uuid,
    pub generic_name: String,
    pub brand_names: Vec<String>,
    pub drug_class: DrugClass,
    pub therapeutic_area: String,
}

/// Validated writable fields of a catalog entry
#[derive(Debug, Clone, PartialEq)]
pub struct MedicationDraft {
    pub generic_name: String,
    pub brand_names: Vec<String>,
    pub active_ingredients: Vec<ActiveIngredient>,
    pub drug_class: DrugClass,
    pub sub_class: Option<String>,
    pub therapeutic_area: String,
    pub route_of_administration: RouteOfAdministration,
    pub description: Option<String>,
    pub common_dosages: Vec<CommonDosage>,
    pub contraindications: Vec<String>,
    pub side_effects: Vec<SideEffect>,
    pub pregnancy_category: PregnancyCategory,
    pub pediatric_use: Option<bool>,
    pub geriatric_considerations: Option<String>,
    pub interactions: Vec<String>,
    pub major_interactions: Vec<Uuid>,
    pub moderate_interactions: Vec<Uuid>,
    pub minor_interactions: Vec<Uuid>,
    pub food_interactions: Vec<String>,
    pub lifestyle_warnings: Vec<String>,
    pub fda_approved: bool,
    pub mhra_approved: bool,
    pub approval_date: Option<NaiveDate>,
    pub prescription_required: bool,
    pub controlled_schedule: ControlledSchedule,
}

impl MedicationDraft {
    /// Minimal draft with defaults for everything optional
    pub fn new(generic_name: &str, drug_class: DrugClass, therapeutic_area: &str) -> Self {
        Self {
            generic_name: generic_name.to_string(),
            brand_names: vec![],
            active_ingredients: vec![],
            drug_class,
            sub_class: None,
            therapeutic_area: therapeutic_area.to_string(),
            route_of_administration: RouteOfAdministration::default(),
            description: None,
            common_dosages: vec![],
            contraindications: vec![],
            side_effects: vec![],
            pregnancy_category: PregnancyCategory::default(),
            pediatric_use: None,
            geriatric_considerations: None,
            interactions: vec![],
            major_interactions: vec![],
            moderate_interactions: vec![],
            minor_interactions: vec![],
            food_interactions: vec![],
            lifestyle_warnings: vec![],
            fda_approved: true,
            mhra_approved: true,
            approval_date: None,
            prescription_required: true,
            controlled_schedule: ControlledSchedule::default(),
        }
    }

    /// Trim, lowercase and deduplicate fields, rejecting invalid values
    pub fn normalize(mut self) -> Result<Self> {
        self.generic_name = self.generic_name.trim().to_lowercase();
        if self.generic_name.is_empty() {
            return Err(ChekwasError::InvalidInput("Generic name is required".to_string()));
        }

        self.therapeutic_area = self.therapeutic_area.trim().to_string();
        if self.therapeutic_area.is_empty() {
            return Err(ChekwasError::InvalidInput("Therapeutic area is required".to_string()));
        }

        for ingredient in &mut self.active_ingredients {
            ingredient.name = ingredient.name.trim().to_string();
            if ingredient.name.is_empty() {
                return Err(ChekwasError::InvalidInput(
                    "Active ingredient name is required".to_string(),
                ));
            }
            ingredient.strength = clean_optional(ingredient.strength.take());
            ingredient.unit = clean_optional(ingredient.unit.take());
        }

        for side_effect in &mut self.side_effects {
            side_effect.effect = side_effect.effect.trim().to_string();
            if side_effect.effect.is_empty() {
                return Err(ChekwasError::InvalidInput("Side effect cannot be empty".to_string()));
            }
        }

        self.brand_names = clean_list(self.brand_names);
        self.contraindications = clean_list(self.contraindications);
        self.interactions = clean_list(self.interactions);
        self.food_interactions = clean_list(self.food_interactions);
        self.lifestyle_warnings = clean_list(self.lifestyle_warnings);
        self.sub_class = clean_optional(self.sub_class);
        self.description = clean_optional(self.description);
        self.geriatric_considerations = clean_optional(self.geriatric_considerations);

        dedup_ids(&mut self.major_interactions);
        dedup_ids(&mut self.moderate_interactions);
        dedup_ids(&mut self.minor_interactions);

        Ok(self)
    }

    /// Every catalog id referenced by the interaction lists
    pub fn referenced_ids(&self) -> Vec<Uuid> {
        let mut ids: Vec<Uuid> = self
            .major_interactions
            .iter()
            .chain(&self.moderate_interactions)
            .chain(&self.minor_interactions)
            .copied()
            .collect();
        dedup_ids(&mut ids);
        ids
    }
}

fn dedup_ids(ids: &mut Vec<Uuid>) {
    let mut seen = std::collections::HashSet::new();
    ids.retain(|id| seen.insert(*id));
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateMedicationRequest {
    pub generic_name: Option<String>,
    #[serde(default)]
    pub brand_names: Vec<String>,
    #[serde(default)]
    pub active_ingredients: Vec<ActiveIngredient>,
    pub drug_class: Option<DrugClass>,
    pub sub_class: Option<String>,
    pub therapeutic_area: Option<String>,
    pub route_of_administration: Option<RouteOfAdministration>,
    pub description: Option<String>,
    #[serde(default)]
    pub common_dosages: Vec<CommonDosage>,
    #[serde(default)]
    pub contraindications: Vec<String>,
    #[serde(default)]
    pub side_effects: Vec<SideEffect>,
    pub pregnancy_category: Option<PregnancyCategory>,
    pub pediatric_use: Option<bool>,
    pub geriatric_considerations: Option<String>,
    #[serde(default)]
    pub interactions: Vec<String>,
    #[serde(default)]
    pub major_interactions: Vec<Uuid>,
    #[serde(default)]
    pub moderate_interactions: Vec<Uuid>,
    #[serde(default)]
    pub minor_interactions: Vec<Uuid>,
    #[serde(default)]
    pub food_interactions: Vec<String>,
    #[serde(default)]
    pub lifestyle_warnings: Vec<String>,
    pub fda_approved: Option<bool>,
    pub mhra_approved: Option<bool>,
    pub approval_date: Option<NaiveDate>,
    pub prescription_required: Option<bool>,
    pub controlled_schedule: Option<ControlledSchedule>,
}

impl CreateMedicationRequest {
    pub fn into_draft(self) -> Result<MedicationDraft> {
        let generic_name = clean_optional(self.generic_name);
        let therapeutic_area = clean_optional(self.therapeutic_area);

        let (generic_name, drug_class, therapeutic_area) =
            match (generic_name, self.drug_class, therapeutic_area) {
                (Some(name), Some(class), Some(area)) => (name, class, area),
                (name, class, area) => {
                    let mut missing = Vec::new();
                    if name.is_none() {
                        missing.push("generic_name".to_string());
                    }
                    if class.is_none() {
                        missing.push("drug_class".to_string());
                    }
                    if area.is_none() {
                        missing.push("therapeutic_area".to_string());
                    }
                    return Err(ChekwasError::MissingFields(missing));
                }
            };

        let draft = MedicationDraft {
            generic_name,
            brand_names: self.brand_names,
            active_ingredients: self.active_ingredients,
            drug_class,
            sub_class: self.sub_class,
            therapeutic_area,
            route_of_administration: self.route_of_administration.unwrap_or_default(),
            description: self.description,
            common_dosages: self.common_dosages,
            contraindications: self.contraindications,
            side_effects: self.side_effects,
            pregnancy_category: self.pregnancy_category.unwrap_or_default(),
            pediatric_use: self.pediatric_use,
            geriatric_considerations: self.geriatric_considerations,
            interactions: self.interactions,
            major_interactions: self.major_interactions,
            moderate_interactions: self.moderate_interactions,
            minor_interactions: self.minor_interactions,
            food_interactions: self.food_interactions,
            lifestyle_warnings: self.lifestyle_warnings,
            fda_approved: self.fda_approved.unwrap_or(true),
            mhra_approved: self.mhra_approved.unwrap_or(true),
            approval_date: self.approval_date,
            prescription_required: self.prescription_required.unwrap_or(true),
            controlled_schedule: self.controlled_schedule.unwrap_or_default(),
        };

        draft.normalize()
    }
}

/// Partial update of a catalog entry. Absent fields keep their value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateMedicationRequest {
    pub generic_name: Option<String>,
    pub brand_names: Option<Vec<String>>,
    pub active_ingredients: Option<Vec<ActiveIngredient>>,
    pub drug_class: Option<DrugClass>,
    pub sub_class: Option<String>,
    pub therapeutic_area: Option<String>,
    pub route_of_administration: Option<RouteOfAdministration>,
    pub description: Option<String>,
    pub common_dosages: Option<Vec<CommonDosage>>,
    pub contraindications: Option<Vec<String>>,
    pub side_effects: Option<Vec<SideEffect>>,
    pub pregnancy_category: Option<PregnancyCategory>,
    pub pediatric_use: Option<bool>,
    pub geriatric_considerations: Option<String>,
    pub interactions: Option<Vec<String>>,
    pub major_interactions: Option<Vec<Uuid>>,
    pub moderate_interactions: Option<Vec<Uuid>>,
    pub minor_interactions: Option<Vec<Uuid>>,
    pub food_interactions: Option<Vec<String>>,
    pub lifestyle_warnings: Option<Vec<String>>,
    pub fda_approved: Option<bool>,
    pub mhra_approved: Option<bool>,
    pub approval_date: Option<NaiveDate>,
    pub prescription_required: Option<bool>,
    pub controlled_schedule: Option<ControlledSchedule>,
}

impl UpdateMedicationRequest {
    pub fn apply_to(self, mut draft: MedicationDraft) -> Result<MedicationDraft> {
        macro_rules! patch {
            ($($field:ident),* $(,)?) => {
                $(if let Some(value) = self.$field { draft.$field = value; })*
            };
        }
        macro_rules! patch_optional {
            ($($field:ident),* $(,)?) => {
                $(if self.$field.is_some() { draft.$field = self.$field; })*
            };
        }

        patch!(
            generic_name,
            brand_names,
            active_ingredients,
            drug_class,
            therapeutic_area,
            route_of_administration,
            common_dosages,
            contraindications,
            side_effects,
            pregnancy_category,
            interactions,
            major_interactions,
            moderate_interactions,
            minor_interactions,
            food_interactions,
            lifestyle_warnings,
            fda_approved,
            mhra_approved,
            prescription_required,
            controlled_schedule,
        );
        patch_optional!(
            sub_class,
            description,
            pediatric_use,
            geriatric_considerations,
            approval_date,
        );

        draft.normalize()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListMedicationsQuery {
    pub drug_class: Option<DrugClass>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn create_normalizes_names_and_lists() {
        let request = CreateMedicationRequest {
            generic_name: Some("  Ibuprofen ".into()),
            brand_names: vec!["Advil".into(), " ".into(), " Motrin ".into()],
            drug_class: Some(DrugClass::Analgesic),
            therapeutic_area: Some("Pain & inflammation".into()),
            interactions: vec!["warfarin".into(), "".into()],
            ..Default::default()
        };

        let draft = request.into_draft().unwrap();
        assert_eq!(draft.generic_name, "ibuprofen");
        assert_eq!(draft.brand_names, vec!["Advil", "Motrin"]);
        assert_eq!(draft.interactions, vec!["warfarin"]);
        assert_eq!(draft.route_of_administration, RouteOfAdministration::Oral);
        assert_eq!(draft.controlled_schedule, ControlledSchedule::None);
        assert!(draft.prescription_required);
    }

    #[test]
    fn create_reports_missing_required_fields() {
        let request = CreateMedicationRequest {
            generic_name: Some("ibuprofen".into()),
            ..Default::default()
        };
        assert_matches!(
            request.into_draft(),
            Err(ChekwasError::MissingFields(fields)) if fields == vec!["drug_class", "therapeutic_area"]
        );
    }

    #[test]
    fn create_rejects_blank_ingredient_name() {
        let request = CreateMedicationRequest {
            generic_name: Some("co-codamol".into()),
            drug_class: Some(DrugClass::Analgesic),
            therapeutic_area: Some("Pain".into()),
            active_ingredients: vec![ActiveIngredient {
                name: " ".into(),
                strength: Some("500".into()),
                unit: Some("mg".into()),
            }],
            ..Default::default()
        };
        assert_matches!(request.into_draft(), Err(ChekwasError::InvalidInput(_)));
    }

    #[test]
    fn update_keeps_absent_fields() {
        let base = MedicationDraft::new("metformin", DrugClass::DiabetesMedication, "Diabetes");
        let update = UpdateMedicationRequest {
            brand_names: Some(vec!["Glucophage".into()]),
            description: Some("First-line for type 2 diabetes".into()),
            ..Default::default()
        };

        let draft = update.apply_to(base).unwrap();
        assert_eq!(draft.generic_name, "metformin");
        assert_eq!(draft.brand_names, vec!["Glucophage"]);
        assert_eq!(draft.description.as_deref(), Some("First-line for type 2 diabetes"));
    }

    #[test]
    fn update_rejects_blank_generic_name() {
        let base = MedicationDraft::new("metformin", DrugClass::DiabetesMedication, "Diabetes");
        let update = UpdateMedicationRequest {
            generic_name: Some("   ".into()),
            ..Default::default()
        };
        assert!(update.apply_to(base).is_err());
    }

    #[test]
    fn referenced_ids_are_deduplicated() {
        let id = Uuid::new_v4();
        let mut draft = MedicationDraft::new("warfarin", DrugClass::Anticoagulant, "Clotting");
        draft.major_interactions = vec![id, id];
        draft.minor_interactions = vec![id];
        assert_eq!(draft.referenced_ids(), vec![id]);
    }

    #[test]
    fn drug_class_uses_snake_case() {
        let json = serde_json::to_value(DrugClass::DiabetesMedication).unwrap();
        assert_eq!(json, "diabetes_medication");
        let parsed: DrugClass = serde_json::from_value(serde_json::json!("heart_medication")).unwrap();
        assert_eq!(parsed, DrugClass::HeartMedication);
        assert_eq!(DrugClass::try_from("vitamin".to_string()).unwrap(), DrugClass::Vitamin);
    }
}
