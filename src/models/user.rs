//! User model

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::utils::errors::{ChekwasError, Result};
use crate::utils::helpers::{age_on, clean_list, clean_optional, is_valid_email, normalize_email};

pub const MIN_PASSWORD_LENGTH: usize = 5;

text_enum! {
    /// Account role
    pub enum Role {
        Patient => "patient",
        Doctor => "doctor",
        Pharmacist => "pharmacist",
    }
}

impl Default for Role {
    fn default() -> Self {
        Role::Patient
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MedicalCondition {
    pub condition: String,
    pub diagnosed_date: Option<NaiveDate>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub date_of_birth: Option<NaiveDate>,
    pub allergies: Vec<String>,
    #[sqlx(json)]
    pub medical_conditions: Vec<MedicalCondition>,
    #[sqlx(try_from = "String")]
    pub role: Role,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Age in whole years, if a date of birth is known
    pub fn age(&self) -> Option<u32> {
        self.date_of_birth
            .and_then(|dob| age_on(dob, Utc::now().date_naive()))
    }

    pub fn profile(&self) -> UserProfile {
        UserProfile {
            id: self.id,
            name: self.name.clone(),
            email: self.email.clone(),
            age: self.age(),
            role: self.role,
            allergies: self.allergies.clone(),
            medical_conditions: self.medical_conditions.clone(),
        }
    }
}

/// User as returned by the API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub age: Option<u32>,
    pub role: Role,
    pub allergies: Vec<String>,
    pub medical_conditions: Vec<MedicalCondition>,
}

/// Registration payload. Fields are optional so that missing ones can be
/// reported together.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
}

/// Registration data after validation
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password: String,
    pub date_of_birth: Option<NaiveDate>,
}

impl RegisterRequest {
    pub fn validate(self) -> Result<NewUser> {
        let name = clean_optional(self.name);
        let email = self
            .email
            .map(|e| normalize_email(&e))
            .filter(|e| !e.is_empty());
        let password = self.password.filter(|p| !p.is_empty());

        let mut missing = Vec::new();
        if name.is_none() {
            missing.push("name".to_string());
        }
        if email.is_none() {
            missing.push("email".to_string());
        }
        if password.is_none() {
            missing.push("password".to_string());
        }

        match (name, email, password) {
            (Some(name), Some(email), Some(password)) => {
                if !is_valid_email(&email) {
                    return Err(ChekwasError::InvalidInput(
                        "Please enter a valid email".to_string(),
                    ));
                }
                if password.chars().count() < MIN_PASSWORD_LENGTH {
                    return Err(ChekwasError::InvalidInput(format!(
                        "Password must be at least {} characters",
                        MIN_PASSWORD_LENGTH
                    )));
                }
                if let Some(dob) = self.date_of_birth {
                    if dob > Utc::now().date_naive() {
                        return Err(ChekwasError::InvalidInput(
                            "Date of birth cannot be in the future".to_string(),
                        ));
                    }
                }
                Ok(NewUser {
                    name,
                    email,
                    password,
                    date_of_birth: self.date_of_birth,
                })
            }
            _ => Err(ChekwasError::MissingFields(missing)),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

impl LoginRequest {
    /// Normalized email and password, or the list of missing fields
    pub fn validate(self) -> Result<(String, String)> {
        let email = self
            .email
            .map(|e| normalize_email(&e))
            .filter(|e| !e.is_empty());
        let password = self.password.filter(|p| !p.is_empty());

        match (email, password) {
            (Some(email), Some(password)) => Ok((email, password)),
            (email, password) => {
                let mut missing = Vec::new();
                if email.is_none() {
                    missing.push("email".to_string());
                }
                if password.is_none() {
                    missing.push("password".to_string());
                }
                Err(ChekwasError::MissingFields(missing))
            }
        }
    }
}

/// Profile update. Email and password cannot be changed here.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub allergies: Option<Vec<String>>,
    pub medical_conditions: Option<Vec<MedicalCondition>>,
}

impl UpdateProfileRequest {
    /// Apply the update on top of `user`, validating the result
    pub fn apply_to(self, user: &mut User) -> Result<()> {
        if let Some(name) = self.name {
            let name = name.trim().to_string();
            if name.is_empty() {
                return Err(ChekwasError::InvalidInput("Name cannot be empty".to_string()));
            }
            user.name = name;
        }

        if let Some(dob) = self.date_of_birth {
            if dob > Utc::now().date_naive() {
                return Err(ChekwasError::InvalidInput(
                    "Date of birth cannot be in the future".to_string(),
                ));
            }
            user.date_of_birth = Some(dob);
        }

        if let Some(allergies) = self.allergies {
            user.allergies = clean_list(allergies);
        }

        if let Some(conditions) = self.medical_conditions {
            let mut cleaned = Vec::with_capacity(conditions.len());
            for mut condition in conditions {
                condition.condition = condition.condition.trim().to_string();
                if condition.condition.is_empty() {
                    return Err(ChekwasError::InvalidInput(
                        "Medical condition name cannot be empty".to_string(),
                    ));
                }
                condition.notes = clean_optional(condition.notes);
                cleaned.push(condition);
            }
            user.medical_conditions = cleaned;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn sample_user() -> User {
        User {
            id: Uuid::new_v4(),
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            password_hash: "hash".to_string(),
            date_of_birth: None,
            allergies: vec![],
            medical_conditions: vec![],
            role: Role::Patient,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn register_normalizes_email() {
        let request = RegisterRequest {
            name: Some("  Ada Lovelace ".into()),
            email: Some(" ADA@Example.com".into()),
            password: Some("secret".into()),
            date_of_birth: None,
        };
        let new_user = request.validate().unwrap();
        assert_eq!(new_user.name, "Ada Lovelace");
        assert_eq!(new_user.email, "ada@example.com");
    }

    #[test]
    fn register_reports_all_missing_fields() {
        let request = RegisterRequest {
            name: Some("   ".into()),
            ..Default::default()
        };
        assert_matches!(
            request.validate(),
            Err(ChekwasError::MissingFields(fields)) if fields == vec!["name", "email", "password"]
        );
    }

    #[test]
    fn register_rejects_short_password() {
        let request = RegisterRequest {
            name: Some("Ada".into()),
            email: Some("ada@example.com".into()),
            password: Some("abcd".into()),
            date_of_birth: None,
        };
        assert_matches!(request.validate(), Err(ChekwasError::InvalidInput(msg)) if msg.contains("at least 5"));
    }

    #[test]
    fn register_rejects_invalid_email() {
        let request = RegisterRequest {
            name: Some("Ada".into()),
            email: Some("not-an-email".into()),
            password: Some("secret".into()),
            date_of_birth: None,
        };
        assert_matches!(request.validate(), Err(ChekwasError::InvalidInput(_)));
    }

    #[test]
    fn login_requires_both_fields() {
        let request = LoginRequest {
            email: Some("ada@example.com".into()),
            password: None,
        };
        assert_matches!(
            request.validate(),
            Err(ChekwasError::MissingFields(fields)) if fields == vec!["password"]
        );
    }

    #[test]
    fn profile_update_cleans_allergies() {
        let mut user = sample_user();
        let update = UpdateProfileRequest {
            allergies: Some(vec![" Penicillin".into(), "".into()]),
            ..Default::default()
        };
        update.apply_to(&mut user).unwrap();
        assert_eq!(user.allergies, vec!["Penicillin"]);
        assert_eq!(user.name, "Ada");
    }

    #[test]
    fn profile_update_rejects_blank_name() {
        let mut user = sample_user();
        let update = UpdateProfileRequest {
            name: Some("  ".into()),
            ..Default::default()
        };
        assert!(update.apply_to(&mut user).is_err());
    }

    #[test]
    fn profile_hides_password_hash() {
        let user = sample_user();
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["role"], "patient");
    }

    #[test]
    fn role_round_trips_through_text() {
        assert_eq!(Role::try_from("pharmacist".to_string()).unwrap(), Role::Pharmacist);
        assert!(Role::try_from("admin".to_string()).is_err());
    }
}
