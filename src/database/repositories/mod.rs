//! Database repositories module
//!
//! This module contains all repository implementations for data access

pub mod medication;
pub mod user;
pub mod user_medication;

// Re-export repositories
pub use medication::MedicationRepository;
pub use user::UserRepository;
pub use user_medication::UserMedicationRepository;
