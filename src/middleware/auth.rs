//! Authentication middleware
//!
//! Verifies `Authorization: Bearer <token>` and makes the account available to
//! handlers as a [`CurrentUser`] extension.

use axum::extract::{Request, State};
use axum::http::header::AUTHORIZATION;
use axum::middleware::Next;
use axum::response::Response;
use tracing::debug;

use crate::models::user::User;
use crate::state::AppState;
use crate::utils::errors::{ChekwasError, Result};

pub const NO_VALID_TOKEN: &str = "Access denied. No valid token provided.";

/// The authenticated account of the current request
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

/// Token from an `Authorization` header value
pub fn bearer_token(header: Option<&str>) -> Result<&str> {
    header
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| ChekwasError::Authentication(NO_VALID_TOKEN.to_string()))
}

pub async fn require_auth(State(state): State<AppState>, mut request: Request, next: Next) -> Result<Response> {
    let header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok());
    let token = bearer_token(header)?.to_string();

    let user = state.services.auth_service.authenticate(&token).await?;
    debug!(user_id = %user.id, path = %request.uri().path(), "Request authenticated");

    request.extensions_mut().insert(CurrentUser(user));
    Ok(next.run(request).await)
}
