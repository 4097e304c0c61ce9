//! End-to-end tests against a real PostgreSQL instance
//!
//! Each test starts its own container unless `TEST_DATABASE_URL` is set.
//! Run with `cargo test -- --ignored` on a machine with Docker.

mod fixtures;
mod helpers;

use axum::http::{header, Method, StatusCode};
use axum::Router;
use chekwasmed::database::seed::seed_catalog;
use chekwasmed::database::MedicationRepository;
use chekwasmed::Settings;
use fixtures::database_helper::TestDatabase;
use fixtures::test_data::{register_body, TEST_PASSWORD};
use helpers::app::send;
use serde_json::{json, Value};
use serial_test::serial;

fn live_settings() -> Settings {
    let mut settings = Settings::default();
    settings.rate_limit.enabled = false;
    settings
}

async fn registered_token(app: &Router) -> (String, Value) {
    let body = register_body();
    let response = send(app, Method::POST, "/api/auth/register", None, Some(body.clone())).await;
    assert_eq!(response.status, StatusCode::CREATED);
    assert_eq!(response.headers[header::CONTENT_TYPE], "application/json");
    let token = response.body["token"].as_str().expect("token").to_string();
    (token, body)
}

async fn create_medication(app: &Router, token: &str, body: Value) -> String {
    let response = send(app, Method::POST, "/api/medications", Some(token), Some(body)).await;
    assert_eq!(response.status, StatusCode::CREATED, "{}", response.body);
    response.body["data"]["id"].as_str().expect("id").to_string()
}

#[tokio::test]
#[serial]
#[ignore = "requires docker"]
async fn test_register_login_and_profile() {
    let db = TestDatabase::new().await;
    let app = db.app(live_settings());

    let (token, body) = registered_token(&app).await;

    let duplicate = send(&app, Method::POST, "/api/auth/register", None, Some(body.clone())).await;
    assert_eq!(duplicate.status, StatusCode::CONFLICT);
    assert_eq!(duplicate.body["message"], "User already exists with this email");

    let login = send(
        &app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({"email": body["email"], "password": TEST_PASSWORD})),
    )
    .await;
    assert_eq!(login.status, StatusCode::OK);
    assert_eq!(login.body["message"], "Login successful");
    assert!(login.body["user"].get("password_hash").is_none());

    let wrong = send(
        &app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({"email": body["email"], "password": "wrong-password"})),
    )
    .await;
    assert_eq!(wrong.status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong.body["message"], "Invalid email or password");

    let updated = send(
        &app,
        Method::PUT,
        "/api/auth/profile",
        Some(&token),
        Some(json!({"allergies": ["Penicillin", " "]})),
    )
    .await;
    assert_eq!(updated.status, StatusCode::OK);
    assert_eq!(updated.body["user"]["allergies"], json!(["Penicillin"]));

    let me = send(&app, Method::GET, "/api/auth/me", Some(&token), None).await;
    assert_eq!(me.status, StatusCode::OK);
    assert_eq!(me.body["user"]["email"], body["email"]);

    let deactivated = send(&app, Method::DELETE, "/api/auth/profile", Some(&token), None).await;
    assert_eq!(deactivated.status, StatusCode::OK);

    let after = send(&app, Method::GET, "/api/auth/me", Some(&token), None).await;
    assert_eq!(after.status, StatusCode::UNAUTHORIZED);
    assert_eq!(
        after.body["message"],
        "Access denied. User not found or inactive."
    );

    let login_after = send(
        &app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({"email": body["email"], "password": TEST_PASSWORD})),
    )
    .await;
    assert_eq!(login_after.status, StatusCode::UNAUTHORIZED);
    assert_eq!(login_after.body["message"], "Account has been deactivated");

    // a deactivated account is reported as such even with the wrong password
    let wrong_after = send(
        &app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({"email": body["email"], "password": "wrong-password"})),
    )
    .await;
    assert_eq!(wrong_after.status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_after.body["message"], "Account has been deactivated");
}

#[tokio::test]
#[serial]
#[ignore = "requires docker"]
async fn test_catalog_lifecycle() {
    let db = TestDatabase::new().await;
    let app = db.app(live_settings());
    let (token, _) = registered_token(&app).await;

    let id = create_medication(
        &app,
        &token,
        json!({
            "generic_name": "  Ibuprofen ",
            "brand_names": ["Advil"],
            "drug_class": "analgesic",
            "therapeutic_area": "Pain",
        }),
    )
    .await;

    let fetched = send(&app, Method::GET, &format!("/api/medications/{}", id), Some(&token), None).await;
    assert_eq!(fetched.status, StatusCode::OK);
    assert_eq!(fetched.body["data"]["generic_name"], "ibuprofen");
    assert_eq!(fetched.body["data"]["route_of_administration"], "oral");

    let duplicate = send(
        &app,
        Method::POST,
        "/api/medications",
        Some(&token),
        Some(json!({"generic_name": "IBUPROFEN", "drug_class": "analgesic", "therapeutic_area": "Pain"})),
    )
    .await;
    assert_eq!(duplicate.status, StatusCode::CONFLICT);

    let by_brand = send(&app, Method::GET, "/api/medications/search?q=adv", Some(&token), None).await;
    assert_eq!(by_brand.status, StatusCode::OK);
    assert_eq!(by_brand.body["count"], 1);
    assert_eq!(by_brand.body["medications"][0]["generic_name"], "ibuprofen");

    let too_short = send(&app, Method::GET, "/api/medications/search?q=a", Some(&token), None).await;
    assert_eq!(too_short.status, StatusCode::BAD_REQUEST);

    let wildcard = send(&app, Method::GET, "/api/medications/search?q=%25%25", Some(&token), None).await;
    assert_eq!(wildcard.status, StatusCode::OK);
    assert_eq!(wildcard.body["count"], 0);

    let filtered = send(
        &app,
        Method::GET,
        "/api/medications?drug_class=antibiotic",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(filtered.status, StatusCode::OK);
    assert_eq!(filtered.body["count"], 0);

    let deleted = send(&app, Method::DELETE, &format!("/api/medications/{}", id), Some(&token), None).await;
    assert_eq!(deleted.status, StatusCode::OK);

    let gone = send(&app, Method::GET, &format!("/api/medications/{}", id), Some(&token), None).await;
    assert_eq!(gone.status, StatusCode::NOT_FOUND);

    let listed = send(&app, Method::GET, "/api/medications", Some(&token), None).await;
    assert_eq!(listed.status, StatusCode::OK);
    assert_eq!(listed.body["count"], 0);

    let searched = send(&app, Method::GET, "/api/medications/search?q=ibu", Some(&token), None).await;
    assert_eq!(searched.status, StatusCode::OK);
    assert_eq!(searched.body["count"], 0);

    // The name is free again once the old entry is inactive
    create_medication(
        &app,
        &token,
        json!({"generic_name": "ibuprofen", "drug_class": "analgesic", "therapeutic_area": "Pain"}),
    )
    .await;
}

#[tokio::test]
#[serial]
#[ignore = "requires docker"]
async fn test_catalog_writes_can_be_restricted() {
    let db = TestDatabase::new().await;
    let mut settings = live_settings();
    settings.catalog.restrict_writes_to_clinicians = true;
    let app = db.app(settings);
    let (token, _) = registered_token(&app).await;

    let response = send(
        &app,
        Method::POST,
        "/api/medications",
        Some(&token),
        Some(json!({"generic_name": "ibuprofen", "drug_class": "analgesic", "therapeutic_area": "Pain"})),
    )
    .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
#[serial]
#[ignore = "requires docker"]
async fn test_regimen_lifecycle() {
    let db = TestDatabase::new().await;
    let app = db.app(live_settings());
    let (token, _) = registered_token(&app).await;

    let medication_id = create_medication(
        &app,
        &token,
        json!({"generic_name": "metformin", "drug_class": "diabetes_medication", "therapeutic_area": "Diabetes"}),
    )
    .await;

    let entry = json!({
        "medication_id": medication_id,
        "dosage": {"amount": 500, "unit": "mg"},
        "frequency": {"times_per_day": 2},
    });

    let missing = send(&app, Method::POST, "/api/user-medications", Some(&token), Some(json!({}))).await;
    assert_eq!(missing.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        missing.body["message"],
        "Missing required fields: medication_id, dosage, frequency"
    );

    let added = send(&app, Method::POST, "/api/user-medications", Some(&token), Some(entry.clone())).await;
    assert_eq!(added.status, StatusCode::CREATED, "{}", added.body);
    assert_eq!(added.body["data"]["medication"]["generic_name"], "metformin");
    assert_eq!(added.body["data"]["adherence_score"], 100);
    let entry_id = added.body["data"]["id"].as_str().unwrap().to_string();

    let again = send(&app, Method::POST, "/api/user-medications", Some(&token), Some(entry.clone())).await;
    assert_eq!(again.status, StatusCode::CONFLICT);

    let missed = send(
        &app,
        Method::POST,
        &format!("/api/user-medications/{}/missed-doses", entry_id),
        Some(&token),
        Some(json!({"reason": "forgot"})),
    )
    .await;
    assert_eq!(missed.status, StatusCode::OK);
    assert_eq!(missed.body["data"]["missed_doses"][0]["reason"], "forgot");

    let bad_score = send(
        &app,
        Method::PUT,
        &format!("/api/user-medications/{}", entry_id),
        Some(&token),
        Some(json!({"adherence_score": 140})),
    )
    .await;
    assert_eq!(bad_score.status, StatusCode::BAD_REQUEST);

    // Another account cannot see the entry
    let (other_token, _) = registered_token(&app).await;
    let foreign = send(
        &app,
        Method::GET,
        &format!("/api/user-medications/{}", entry_id),
        Some(&other_token),
        None,
    )
    .await;
    assert_eq!(foreign.status, StatusCode::NOT_FOUND);

    let removed = send(
        &app,
        Method::DELETE,
        &format!("/api/user-medications/{}", entry_id),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(removed.status, StatusCode::OK);

    let listed = send(&app, Method::GET, "/api/user-medications", Some(&token), None).await;
    assert_eq!(listed.body["count"], 0);

    let re_added = send(&app, Method::POST, "/api/user-medications", Some(&token), Some(entry)).await;
    assert_eq!(re_added.status, StatusCode::CREATED);
}

#[tokio::test]
#[serial]
#[ignore = "requires docker"]
async fn test_check_conflicts_uses_regimen_and_allergies() {
    let db = TestDatabase::new().await;
    let inserted = seed_catalog(&MedicationRepository::new(db.pool.clone()))
        .await
        .expect("seed");
    assert_eq!(inserted, 5);
    assert_eq!(
        seed_catalog(&MedicationRepository::new(db.pool.clone())).await.expect("reseed"),
        0
    );

    let app = db.app(live_settings());
    let (token, _) = registered_token(&app).await;

    let search = |q: &'static str| {
        let app = app.clone();
        let token = token.clone();
        async move {
            let response = send(
                &app,
                Method::GET,
                &format!("/api/medications/search?q={}", q),
                Some(&token),
                None,
            )
            .await;
            response.body["medications"][0]["id"].as_str().unwrap().to_string()
        }
    };
    let ibuprofen = search("ibuprofen").await;
    let aspirin = search("aspirin").await;

    let groups = send(
        &app,
        Method::GET,
        &format!("/api/medications/{}/interactions", ibuprofen),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(groups.status, StatusCode::OK);
    assert_eq!(groups.body["interactions"]["named"], json!(["aspirin", "warfarin"]));
    assert_eq!(groups.body["interactions"]["major"], json!([]));
    assert_eq!(groups.body["interactions"]["food"].as_array().unwrap().len(), 1);

    for id in [&ibuprofen, &aspirin] {
        let response = send(
            &app,
            Method::POST,
            "/api/user-medications",
            Some(&token),
            Some(json!({
                "medication_id": id,
                "dosage": {"amount": 200, "unit": "mg"},
                "frequency": {"times_per_day": 1},
            })),
        )
        .await;
        assert_eq!(response.status, StatusCode::CREATED);
    }

    let report = send(&app, Method::POST, "/api/check-conflicts", Some(&token), None).await;
    assert_eq!(report.status, StatusCode::OK, "{}", report.body);
    assert_eq!(report.body["medications_checked"], 2);
    assert_eq!(report.body["conflicts_found"], 1);
    assert_eq!(report.body["risk_level"], "moderate");

    send(
        &app,
        Method::PUT,
        "/api/auth/profile",
        Some(&token),
        Some(json!({"allergies": ["Ibuprofen"]})),
    )
    .await;

    let unknown = uuid::Uuid::new_v4();
    let explicit = send(
        &app,
        Method::POST,
        "/api/check-conflicts",
        Some(&token),
        Some(json!({"medication_ids": [ibuprofen, unknown]})),
    )
    .await;
    assert_eq!(explicit.status, StatusCode::OK);
    assert_eq!(explicit.body["medications_checked"], 1);
    assert_eq!(explicit.body["conflicts_found"], 0);
    assert_eq!(explicit.body["allergy_alerts"][0]["allergy"], "Ibuprofen");
    assert_eq!(explicit.body["risk_level"], "high");
    assert_eq!(explicit.body["unresolved_ids"], json!([unknown]));
}
