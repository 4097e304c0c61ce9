//! `/api/medications` catalog endpoints

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use serde_json::{json, Value};
use uuid::Uuid;

use super::{json_body, path_id, query_params};
use crate::middleware::CurrentUser;
use crate::models::medication::{
    CreateMedicationRequest, ListMedicationsQuery, SearchQuery, UpdateMedicationRequest,
};
use crate::state::AppState;
use crate::utils::errors::Result;

/// `GET /api/medications/search?q=`
pub async fn search(
    State(state): State<AppState>,
    query: std::result::Result<Query<SearchQuery>, QueryRejection>,
) -> Result<Json<Value>> {
    let query = query_params(query)?;
    let medications = state
        .services
        .medication_service
        .search(query.q.as_deref())
        .await?;

    Ok(Json(json!({
        "success": true,
        "count": medications.len(),
        "medications": medications,
    })))
}

/// `GET /api/medications`
pub async fn list(
    State(state): State<AppState>,
    query: std::result::Result<Query<ListMedicationsQuery>, QueryRejection>,
) -> Result<Json<Value>> {
    let medications = state.services.medication_service.list(query_params(query)?).await?;
    Ok(Json(json!({
        "success": true,
        "count": medications.len(),
        "data": medications,
    })))
}

/// `GET /api/medications/:id`
pub async fn get(
    State(state): State<AppState>,
    id: std::result::Result<Path<Uuid>, PathRejection>,
) -> Result<Json<Value>> {
    let medication = state.services.medication_service.get(path_id(id)?).await?;
    Ok(Json(json!({ "success": true, "data": medication })))
}

/// `GET /api/medications/:id/interactions`
pub async fn interactions(
    State(state): State<AppState>,
    id: std::result::Result<Path<Uuid>, PathRejection>,
) -> Result<Json<Value>> {
    let medication = state.services.medication_service.get(path_id(id)?).await?;
    Ok(Json(json!({
        "success": true,
        "medication": medication.summary(),
        "interactions": medication.all_interactions(),
    })))
}

/// `POST /api/medications`
pub async fn create(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    payload: std::result::Result<Json<CreateMedicationRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>)> {
    let medication = state
        .services
        .medication_service
        .create(&user, json_body(payload)?)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "Medication created successfully",
            "data": medication,
        })),
    ))
}

/// `PUT /api/medications/:id`
pub async fn update(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    id: std::result::Result<Path<Uuid>, PathRejection>,
    payload: std::result::Result<Json<UpdateMedicationRequest>, JsonRejection>,
) -> Result<Json<Value>> {
    let medication = state
        .services
        .medication_service
        .update(&user, path_id(id)?, json_body(payload)?)
        .await?;

    Ok(Json(json!({
        "success": true,
        "message": "Medication updated successfully",
        "data": medication,
    })))
}

/// `DELETE /api/medications/:id`
pub async fn delete(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    id: std::result::Result<Path<Uuid>, PathRejection>,
) -> Result<Json<Value>> {
    state
        .services
        .medication_service
        .delete(&user, path_id(id)?)
        .await?;

    Ok(Json(json!({
        "success": true,
        "message": "Medication deleted successfully",
    })))
}
