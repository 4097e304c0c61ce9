//! Naive drug interaction checker
//!
//! Pairs are matched by catalog id references and by case-insensitive substring
//! matching between free-text interaction terms and drug names. Nothing here
//! is clinical advice; the report only reflects what the catalog lists.

use std::collections::HashSet;

use uuid::Uuid;

use crate::database::DatabaseService;
use crate::models::interaction::{
    AllergyAlert, CheckConflictsRequest, InteractionFinding, InteractionReport, InteractionSeverity,
    MedicationRef, MedicationWarning, RiskLevel, WarningKind,
};
use crate::models::medication::Medication;
use crate::models::user::User;
use crate::utils::errors::{ChekwasError, Result};
use crate::utils::helpers::names_overlap;
use crate::utils::logging::log_interaction_check;

fn reference(medication: &Medication) -> MedicationRef {
    MedicationRef {
        id: medication.id,
        name: medication.generic_name.clone(),
    }
}

/// Severity from explicit id references, checked in both directions
fn referenced_severity(a: &Medication, b: &Medication) -> Option<InteractionSeverity> {
    let lists = |m: &Medication, other: Uuid| {
        if m.major_interactions.contains(&other) {
            Some(InteractionSeverity::Major)
        } else if m.moderate_interactions.contains(&other) {
            Some(InteractionSeverity::Moderate)
        } else if m.minor_interactions.contains(&other) {
            Some(InteractionSeverity::Minor)
        } else {
            None
        }
    };
    lists(a, b.id).max(lists(b, a.id))
}

/// True when some free-text term of `a` names `b`
fn lists_by_name(a: &Medication, b: &Medication) -> bool {
    a.interactions
        .iter()
        .any(|term| b.names().any(|name| names_overlap(term, name)))
}

/// Strongest interaction between two medications, if any
pub fn pair_severity(a: &Medication, b: &Medication) -> Option<InteractionSeverity> {
    let by_name = (lists_by_name(a, b) || lists_by_name(b, a)).then_some(InteractionSeverity::Moderate);
    referenced_severity(a, b).max(by_name)
}

/// One finding per interacting unordered pair, in selection order
pub fn find_interactions(medications: &[Medication]) -> Vec<InteractionFinding> {
    let mut findings = Vec::new();
    for (i, a) in medications.iter().enumerate() {
        for b in &medications[i + 1..] {
            if let Some(severity) = pair_severity(a, b) {
                findings.push(InteractionFinding {
                    medication_a: reference(a),
                    medication_b: reference(b),
                    severity,
                    description: format!(
                        "{} may interact with {}. Consult your healthcare provider",
                        a.generic_name, b.generic_name
                    ),
                });
            }
        }
    }
    findings
}

/// Alerts for allergies naming a selected medication or one of its ingredients
pub fn allergy_alerts(allergies: &[String], medications: &[Medication]) -> Vec<AllergyAlert> {
    let mut alerts = Vec::new();
    for allergy in allergies.iter().filter(|a| !a.trim().is_empty()) {
        for medication in medications {
            let matched = medication
                .names()
                .chain(medication.active_ingredients.iter().map(|i| i.name.as_str()))
                .find(|name| names_overlap(allergy, name));

            if let Some(name) = matched {
                alerts.push(AllergyAlert {
                    allergy: allergy.trim().to_string(),
                    medication: reference(medication),
                    matched_name: name.to_string(),
                });
            }
        }
    }
    alerts
}

/// Food interactions and lifestyle warnings of every selected medication
pub fn collect_warnings(medications: &[Medication]) -> Vec<MedicationWarning> {
    medications
        .iter()
        .flat_map(|medication| {
            let food = medication
                .food_interactions
                .iter()
                .map(move |w| (medication, WarningKind::Food, w));
            let lifestyle = medication
                .lifestyle_warnings
                .iter()
                .map(move |w| (medication, WarningKind::Lifestyle, w));
            food.chain(lifestyle)
        })
        .map(|(medication, kind, warning)| MedicationWarning {
            medication: reference(medication),
            kind,
            warning: warning.clone(),
        })
        .collect()
}

pub fn risk_level(findings: &[InteractionFinding], alerts: &[AllergyAlert]) -> RiskLevel {
    if !alerts.is_empty() {
        return RiskLevel::High;
    }
    match findings.iter().map(|f| f.severity).max() {
        Some(InteractionSeverity::Major) => RiskLevel::High,
        Some(InteractionSeverity::Moderate) => RiskLevel::Moderate,
        Some(InteractionSeverity::Minor) => RiskLevel::LowModerate,
        None => RiskLevel::Low,
    }
}

/// Full report over an already resolved selection
pub fn build_report(allergies: &[String], medications: &[Medication], unresolved_ids: Vec<Uuid>) -> InteractionReport {
    let interactions = find_interactions(medications);
    let allergy_alerts = allergy_alerts(allergies, medications);
    let warnings = collect_warnings(medications);
    let risk_level = risk_level(&interactions, &allergy_alerts);

    InteractionReport {
        medications_checked: medications.len(),
        conflicts_found: interactions.len(),
        interactions,
        allergy_alerts,
        warnings,
        risk_level,
        unresolved_ids,
    }
}

/// Drop repeated ids, keeping first occurrences in order
pub fn dedup_selection(ids: &[Uuid]) -> Vec<Uuid> {
    let mut seen = HashSet::new();
    ids.iter().copied().filter(|id| seen.insert(*id)).collect()
}

#[derive(Debug, Clone)]
pub struct InteractionService {
    database: DatabaseService,
    max_selection: usize,
}

impl InteractionService {
    pub fn new(database: DatabaseService, max_selection: usize) -> Self {
        Self {
            database,
            max_selection,
        }
    }

    /// Check the given selection, or the user's regimen when none is given
    pub async fn check(&self, user: &User, request: CheckConflictsRequest) -> Result<InteractionReport> {
        let ids = if request.medication_ids.is_empty() {
            let regimen = self.database.user_medications.list_active_by_user(user.id).await?;
            dedup_selection(&regimen.iter().map(|entry| entry.medication_id).collect::<Vec<_>>())
        } else {
            dedup_selection(&request.medication_ids)
        };

        if ids.len() > self.max_selection {
            return Err(ChekwasError::InvalidInput(format!(
                "At most {} medications can be checked at once",
                self.max_selection
            )));
        }

        let mut found = self.database.medications.find_active_by_ids(&ids).await?;
        let mut selected = Vec::with_capacity(found.len());
        let mut unresolved = Vec::new();
        for id in ids {
            match found.iter().position(|m| m.id == id) {
                Some(index) => selected.push(found.swap_remove(index)),
                None => unresolved.push(id),
            }
        }

        let report = build_report(&user.allergies, &selected, unresolved);
        log_interaction_check(
            user.id,
            report.medications_checked,
            report.conflicts_found,
            report.risk_level.as_str(),
        );
        Ok(report)
    }
}
