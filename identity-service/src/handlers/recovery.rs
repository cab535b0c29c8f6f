//! Account recovery for members who lost their handle.

use axum::extract::{Json, Query, State};
use serde::{Deserialize, Serialize};

use crate::handlers::MessageResponse;
use crate::AppState;
use service_core::error::AppError;

/// The two alternate keys a member can recover with.
#[derive(Debug, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum ResolveRequest {
    Membership {
        member_id: i64,
        congregation_number: String,
    },
    PhoneSuffix {
        phone: String,
    },
}

#[derive(Debug, Serialize)]
pub struct ResolveResponse {
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct SendAccessSummaryRequest {
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct RecoverHandleParams {
    pub email: String,
}

#[derive(Debug, Serialize)]
pub struct RecoverHandleResponse {
    pub handle: String,
}

/// Resolve an identity by alternate key and reveal the destination
/// address for the follow-up mail.
///
/// POST /api/recovery/resolve
pub async fn resolve(
    State(state): State<AppState>,
    Json(req): Json<ResolveRequest>,
) -> Result<Json<ResolveResponse>, AppError> {
    let contact = match req {
        ResolveRequest::Membership {
            member_id,
            congregation_number,
        } => {
            state
                .recovery
                .resolve_by_membership(member_id, &congregation_number)
                .await?
        }
        ResolveRequest::PhoneSuffix { phone } => {
            state.recovery.resolve_by_phone_suffix(&phone).await?
        }
    };

    let email = contact
        .email
        .filter(|e| !e.is_empty())
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("No email on file")))?;

    Ok(Json(ResolveResponse { email }))
}

/// Mail the access summary (handle, member id, congregation) to a
/// resolved address.
///
/// POST /api/recovery/send-access-summary
pub async fn send_access_summary(
    State(state): State<AppState>,
    Json(req): Json<SendAccessSummaryRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    let summary = state
        .db
        .find_access_summary_by_email(&req.email)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Member not found")))?;

    if let Err(e) = state.email.send_access_summary(&req.email, &summary).await {
        tracing::warn!(error = %e, "Access summary email failed");
    }

    Ok(Json(MessageResponse::new("Access summary sent")))
}

/// Look up the handle behind an email address, after a verified PIN.
///
/// GET /api/recovery/handle
pub async fn recover_handle(
    State(state): State<AppState>,
    Query(params): Query<RecoverHandleParams>,
) -> Result<Json<RecoverHandleResponse>, AppError> {
    let handle = state
        .db
        .find_handle_by_email(&params.email)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Member not found")))?;

    Ok(Json(RecoverHandleResponse { handle }))
}
