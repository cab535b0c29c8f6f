//! Step-up verification: issue and consume one-time PIN codes.

use axum::extract::{Json, State};
use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::handlers::MessageResponse;
use crate::models::ChallengePurpose;
use crate::AppState;
use service_core::error::AppError;

#[derive(Debug, Deserialize)]
pub struct RequestCodeRequest {
    pub email: String,
    pub handle: String,
    /// Congregation number shown in the mail header; when absent the
    /// congregation is resolved through the handle's membership.
    pub congregation_number: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct VerifyCodeRequest {
    pub code: String,
}

#[derive(Debug, Serialize)]
pub struct VerifyCodeResponse {
    pub verified: bool,
}

/// Issue a security-check PIN and mail it out.
///
/// POST /api/auth/pin/request
#[tracing::instrument(skip(state, req), fields(handle = %req.handle))]
pub async fn request_code(
    State(state): State<AppState>,
    Json(req): Json<RequestCodeRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    let congregation_label = resolve_congregation_label(&state, &req).await?;

    let ttl = Duration::minutes(state.config.challenge.ttl_minutes);
    let code = state
        .challenges
        .issue(ChallengePurpose::SecurityCheck, ttl)
        .await?;

    // Delivery is fire-and-forget: a mail failure is logged, never
    // surfaced, and never retried here.
    if let Err(e) = state
        .email
        .send_verification_code(&req.email, &congregation_label, &req.handle, &code)
        .await
    {
        tracing::warn!(error = %e, "Verification code email failed");
    }

    Ok(Json(MessageResponse::new("Verification code sent")))
}

/// Consume a PIN.
///
/// POST /api/auth/pin/verify
pub async fn verify_code(
    State(state): State<AppState>,
    Json(req): Json<VerifyCodeRequest>,
) -> Result<Json<VerifyCodeResponse>, AppError> {
    state.challenges.verify(&req.code).await?;
    Ok(Json(VerifyCodeResponse { verified: true }))
}

async fn resolve_congregation_label(
    state: &AppState,
    req: &RequestCodeRequest,
) -> Result<String, AppError> {
    if let Some(number) = &req.congregation_number {
        if let Some(label) = state.db.find_congregation_label_by_number(number).await? {
            return Ok(label);
        }
    }
    Ok(state
        .db
        .find_congregation_label_by_handle(&req.handle)
        .await?
        .unwrap_or_default())
}
