//! `/api/auth` endpoints: registration, login and the caller's profile

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::{Extension, Json};
use serde::Serialize;
use serde_json::{json, Value};

use super::json_body;
use crate::middleware::CurrentUser;
use crate::models::user::{LoginRequest, RegisterRequest, UpdateProfileRequest, UserProfile};
use crate::state::AppState;
use crate::utils::errors::Result;

#[derive(Serialize)]
pub struct AuthBody {
    pub success: bool,
    pub message: &'static str,
    pub token: String,
    pub user: UserProfile,
}

/// `POST /api/auth/register`
pub async fn register(
    State(state): State<AppState>,
    payload: std::result::Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<AuthBody>)> {
    let auth = state.services.auth_service.register(json_body(payload)?).await?;
    Ok((
        StatusCode::CREATED,
        Json(AuthBody {
            success: true,
            message: "User registered successfully",
            token: auth.token,
            user: auth.user,
        }),
    ))
}

/// `POST /api/auth/login`
pub async fn login(
    State(state): State<AppState>,
    payload: std::result::Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<AuthBody>> {
    let auth = state.services.auth_service.login(json_body(payload)?).await?;
    Ok(Json(AuthBody {
        success: true,
        message: "Login successful",
        token: auth.token,
        user: auth.user,
    }))
}

/// `GET /api/auth/me` and `GET /api/auth/profile`
pub async fn me(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> Json<Value> {
    Json(json!({
        "success": true,
        "user": state.services.user_service.profile(&user),
    }))
}

/// `PUT /api/auth/profile`
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    payload: std::result::Result<Json<UpdateProfileRequest>, JsonRejection>,
) -> Result<Json<Value>> {
    let profile = state
        .services
        .user_service
        .update_profile(&user, json_body(payload)?)
        .await?;
    Ok(Json(json!({
        "success": true,
        "message": "Profile updated successfully",
        "user": profile,
    })))
}

/// `DELETE /api/auth/profile`
pub async fn deactivate(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> Result<Json<Value>> {
    state.services.user_service.deactivate(&user).await?;
    Ok(Json(json!({
        "success": true,
        "message": "Account deactivated",
    })))
}
