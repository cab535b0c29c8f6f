//! Login and handle lookups.

use axum::extract::{Json, Query, State};
use serde::{Deserialize, Serialize};

use crate::models::ProfileResponse;
use crate::services::HandleAvailability;
use crate::AppState;
use service_core::error::AppError;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub handle: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct IdentifyRequest {
    pub handle: String,
}

#[derive(Debug, Serialize)]
pub struct IdentifyResponse {
    pub exists: bool,
}

#[derive(Debug, Deserialize)]
pub struct HandleAvailabilityParams {
    pub handle: String,
    #[serde(default)]
    pub member_id: Option<i64>,
}

/// Authenticate a member.
///
/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<ProfileResponse>, AppError> {
    let profile = state.identity.login(&req.handle, &req.password).await?;
    Ok(Json(profile.sanitized()))
}

/// Pre-login probe: does an administrative account with this handle
/// exist.
///
/// POST /api/auth/identify
pub async fn identify(
    State(state): State<AppState>,
    Json(req): Json<IdentifyRequest>,
) -> Result<Json<IdentifyResponse>, AppError> {
    let exists = state.identity.account_handle_exists(&req.handle).await?;
    Ok(Json(IdentifyResponse { exists }))
}

/// Handle uniqueness check across both tiers, with suggestions when the
/// handle is taken.
///
/// GET /api/auth/handle-availability
pub async fn handle_availability(
    State(state): State<AppState>,
    Query(params): Query<HandleAvailabilityParams>,
) -> Result<Json<HandleAvailability>, AppError> {
    // member_id 0 is never allocated, so "no exclusion" excludes nothing.
    let excluding = params.member_id.unwrap_or(0);
    let availability = state
        .identity
        .check_handle_taken(&params.handle, excluding)
        .await?;
    Ok(Json(availability))
}
