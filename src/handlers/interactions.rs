//! `POST /api/check-conflicts`

use axum::body::Bytes;
use axum::extract::State;
use axum::{Extension, Json};
use serde::Serialize;

use crate::middleware::CurrentUser;
use crate::models::interaction::{CheckConflictsRequest, InteractionReport};
use crate::state::AppState;
use crate::utils::errors::{ChekwasError, Result};

#[derive(Serialize)]
pub struct CheckConflictsBody {
    pub success: bool,
    #[serde(flatten)]
    pub report: InteractionReport,
}

/// An empty body checks the caller's regimen
fn parse_request(body: &[u8]) -> Result<CheckConflictsRequest> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(CheckConflictsRequest::default());
    }
    serde_json::from_slice(body)
        .map_err(|e| ChekwasError::InvalidInput(format!("Invalid request body: {}", e)))
}

pub async fn check_conflicts(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    body: Bytes,
) -> Result<Json<CheckConflictsBody>> {
    let request = parse_request(&body)?;
    let report = state.services.interaction_service.check(&user, request).await?;
    Ok(Json(CheckConflictsBody {
        success: true,
        report,
    }))
}
