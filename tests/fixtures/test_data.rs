//! Test data builders

use chekwasmed::models::user::RegisterRequest;
use fake::faker::name::en::Name;
use fake::Fake;
use serde_json::{json, Value};
use uuid::Uuid;

pub const TEST_PASSWORD: &str = "correct-horse";

/// Unique, valid registration
pub fn register_request() -> RegisterRequest {
    let name: String = Name().fake();
    RegisterRequest {
        name: Some(name),
        email: Some(format!("patient-{}@example.com", Uuid::new_v4().simple())),
        password: Some(TEST_PASSWORD.to_string()),
        date_of_birth: None,
    }
}

pub fn register_body() -> Value {
    let request = register_request();
    json!({
        "name": request.name,
        "email": request.email,
        "password": request.password,
    })
}
