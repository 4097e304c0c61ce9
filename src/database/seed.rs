//! Starter catalog inserted on startup when enabled

use tracing::info;

use crate::database::repositories::MedicationRepository;
use crate::models::medication::{ActiveIngredient, DrugClass, MedicationDraft};
use crate::utils::errors::Result;

fn ingredient(name: &str, strength: &str) -> ActiveIngredient {
    ActiveIngredient {
        name: name.to_string(),
        strength: Some(strength.to_string()),
        unit: Some("mg".to_string()),
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// The starter entries, already normalized
pub fn starter_catalog() -> Result<Vec<MedicationDraft>> {
    let mut acetaminophen = MedicationDraft::new("acetaminophen", DrugClass::Analgesic, "Pain relief");
    acetaminophen.brand_names = strings(&["Tylenol", "Panadol"]);
    acetaminophen.active_ingredients = vec![ingredient("acetaminophen", "500")];
    acetaminophen.prescription_required = false;
    acetaminophen.lifestyle_warnings = strings(&["Avoid alcohol"]);

    let mut ibuprofen = MedicationDraft::new("ibuprofen", DrugClass::Analgesic, "Pain & inflammation");
    ibuprofen.sub_class = Some("NSAID".to_string());
    ibuprofen.brand_names = strings(&["Advil", "Nurofen"]);
    ibuprofen.active_ingredients = vec![ingredient("ibuprofen", "200")];
    ibuprofen.interactions = strings(&["aspirin", "warfarin"]);
    ibuprofen.food_interactions = strings(&["Take with food to reduce stomach upset"]);
    ibuprofen.prescription_required = false;

    let mut amoxicillin = MedicationDraft::new("amoxicillin", DrugClass::Antibiotic, "Infections");
    amoxicillin.brand_names = strings(&["Amoxil"]);
    amoxicillin.active_ingredients = vec![ingredient("amoxicillin", "500")];
    amoxicillin.interactions = strings(&["methotrexate"]);

    let mut metformin = MedicationDraft::new("metformin", DrugClass::DiabetesMedication, "Diabetes");
    metformin.sub_class = Some("Biguanide".to_string());
    metformin.brand_names = strings(&["Glucophage"]);
    metformin.active_ingredients = vec![ingredient("metformin hydrochloride", "500")];
    metformin.lifestyle_warnings = strings(&["Limit alcohol intake"]);

    let mut aspirin = MedicationDraft::new(
        "acetylsalicylic acid",
        DrugClass::Analgesic,
        "Pain & cardiovascular",
    );
    aspirin.sub_class = Some("NSAID".to_string());
    aspirin.brand_names = strings(&["Aspirin"]);
    aspirin.active_ingredients = vec![ingredient("acetylsalicylic acid", "75")];
    aspirin.interactions = strings(&["ibuprofen", "warfarin"]);
    aspirin.prescription_required = false;

    [acetaminophen, ibuprofen, amoxicillin, metformin, aspirin]
        .into_iter()
        .map(MedicationDraft::normalize)
        .collect()
}

/// Insert the starter catalog, skipping names that already exist
pub async fn seed_catalog(medications: &MedicationRepository) -> Result<usize> {
    let mut inserted = 0;
    for draft in starter_catalog()? {
        if medications.insert_if_absent(&draft).await? {
            inserted += 1;
        }
    }

    info!(inserted = inserted, "Catalog seed completed");
    Ok(inserted)
}
