//! Data models module
//!
//! This module contains all data structures used throughout the application

/// Enum stored as a text column and serialized as the same string.
macro_rules! text_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $($variant:ident => $text:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $text)]
                $variant,
            )+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text,)+
                }
            }
        }

        impl TryFrom<String> for $name {
            type Error = String;

            fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
                match value.as_str() {
                    $($text => Ok($name::$variant),)+
                    other => Err(format!("unknown {}: {}", stringify!($name), other)),
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

pub mod interaction;
pub mod medication;
pub mod user;
pub mod user_medication;

// Re-export commonly used models
pub use interaction::{
    AllergyAlert, CheckConflictsRequest, InteractionFinding, InteractionReport, InteractionSeverity,
    MedicationWarning, RiskLevel,
};
pub use medication::{
    CreateMedicationRequest, DrugClass, ListMedicationsQuery, Medication, MedicationDraft,
    MedicationSummary, SearchQuery, UpdateMedicationRequest,
};
pub use user::{LoginRequest, NewUser, RegisterRequest, Role, UpdateProfileRequest, User, UserProfile};
pub use user_medication::{
    AddUserMedicationRequest, MissedDoseRequest, NewUserMedication, RegimenEntry,
    UpdateUserMedicationRequest, UserMedication,
};
