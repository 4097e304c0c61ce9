//! `/api/user-medications` regimen endpoints

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use serde_json::{json, Value};
use uuid::Uuid;

use super::{json_body, path_id};
use crate::middleware::CurrentUser;
use crate::models::user_medication::{
    AddUserMedicationRequest, MissedDoseRequest, UpdateUserMedicationRequest,
};
use crate::state::AppState;
use crate::utils::errors::Result;

pub async fn list(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> Result<Json<Value>> {
    let entries = state.services.user_medication_service.list(&user).await?;
    Ok(Json(json!({
        "success": true,
        "count": entries.len(),
        "data": entries,
    })))
}

pub async fn add(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    payload: std::result::Result<Json<AddUserMedicationRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>)> {
    let entry = state
        .services
        .user_medication_service
        .add(&user, json_body(payload)?)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "Medication added successfully",
            "data": entry,
        })),
    ))
}

pub async fn get(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    id: std::result::Result<Path<Uuid>, PathRejection>,
) -> Result<Json<Value>> {
    let entry = state
        .services
        .user_medication_service
        .get(&user, path_id(id)?)
        .await?;
    Ok(Json(json!({ "success": true, "data": entry })))
}

pub async fn update(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    id: std::result::Result<Path<Uuid>, PathRejection>,
    payload: std::result::Result<Json<UpdateUserMedicationRequest>, JsonRejection>,
) -> Result<Json<Value>> {
    let entry = state
        .services
        .user_medication_service
        .update(&user, path_id(id)?, json_body(payload)?)
        .await?;

    Ok(Json(json!({
        "success": true,
        "message": "Medication updated successfully",
        "data": entry,
    })))
}

pub async fn remove(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    id: std::result::Result<Path<Uuid>, PathRejection>,
) -> Result<Json<Value>> {
    state
        .services
        .user_medication_service
        .remove(&user, path_id(id)?)
        .await?;

    Ok(Json(json!({
        "success": true,
        "message": "Medication removed from your list",
    })))
}

/// `POST /api/user-medications/:id/missed-doses`
pub async fn record_missed_dose(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    id: std::result::Result<Path<Uuid>, PathRejection>,
    payload: std::result::Result<Json<MissedDoseRequest>, JsonRejection>,
) -> Result<Json<Value>> {
    let entry = state
        .services
        .user_medication_service
        .record_missed_dose(&user, path_id(id)?, json_body(payload)?)
        .await?;

    Ok(Json(json!({
        "success": true,
        "message": "Missed dose recorded",
        "data": entry,
    })))
}
