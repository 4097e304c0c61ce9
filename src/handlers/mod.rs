//! HTTP handlers and the router
//!
//! Extractor rejections are converted into the common error envelope so every
//! failure has the same JSON shape.

pub mod auth;
pub mod health;
pub mod interactions;
pub mod medications;
pub mod user_medications;

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query};
use axum::http::{HeaderValue, StatusCode};
use axum::middleware::{from_fn, from_fn_with_state};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tracing::warn;
use uuid::Uuid;

use crate::middleware::{log_requests, rate_limit, require_auth};
use crate::state::AppState;
use crate::utils::errors::{ChekwasError, ErrorBody, Result};

pub(crate) fn json_body<T>(payload: std::result::Result<Json<T>, JsonRejection>) -> Result<T> {
    payload
        .map(|Json(value)| value)
        .map_err(|rejection| ChekwasError::InvalidInput(rejection.body_text()))
}

pub(crate) fn path_id(id: std::result::Result<Path<Uuid>, PathRejection>) -> Result<Uuid> {
    id.map(|Path(id)| id)
        .map_err(|_| ChekwasError::InvalidInput("Invalid id".to_string()))
}

pub(crate) fn query_params<T>(query: std::result::Result<Query<T>, QueryRejection>) -> Result<T> {
    query
        .map(|Query(value)| value)
        .map_err(|rejection| ChekwasError::InvalidInput(rejection.body_text()))
}

async fn not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorBody {
            success: false,
            code: "NOT_FOUND",
            message: "Route not found".to_string(),
        }),
    )
}

/// Any origin when `origins` is empty, otherwise only the listed ones
fn cors_layer(origins: &[String]) -> CorsLayer {
    let base = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if origins.is_empty() {
        return base.allow_origin(Any);
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    base.allow_origin(AllowOrigin::list(allowed))
}

/// Build the application router
pub fn create_router(state: AppState) -> Router {
    let public = Router::new()
        .route("/", get(health::root))
        .route("/api/test", get(health::test))
        .route("/api/health", get(health::health));

    let auth_public = Router::new()
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login))
        .route_layer(from_fn_with_state(state.clone(), rate_limit));

    let protected = Router::new()
        .route("/api/auth/me", get(auth::me))
        .route(
            "/api/auth/profile",
            get(auth::me).put(auth::update_profile).delete(auth::deactivate),
        )
        .route("/api/medications/search", get(medications::search))
        .route("/api/medications", get(medications::list).post(medications::create))
        .route(
            "/api/medications/:id",
            get(medications::get)
                .put(medications::update)
                .delete(medications::delete),
        )
        .route(
            "/api/medications/:id/interactions",
            get(medications::interactions),
        )
        .route(
            "/api/user-medications",
            get(user_medications::list).post(user_medications::add),
        )
        .route(
            "/api/user-medications/:id",
            get(user_medications::get)
                .put(user_medications::update)
                .delete(user_medications::remove),
        )
        .route(
            "/api/user-medications/:id/missed-doses",
            post(user_medications::record_missed_dose),
        )
        .route("/api/check-conflicts", post(interactions::check_conflicts))
        .route_layer(from_fn_with_state(state.clone(), require_auth));

    let cors = cors_layer(&state.settings.server.cors_origins);

    Router::new()
        .merge(public)
        .merge(auth_public)
        .merge(protected)
        .fallback(not_found)
        .layer(from_fn(log_requests))
        .layer(cors)
        .with_state(state)
}

