//! Self-service profile management.

use axum::extract::{Json, State};
use serde::Deserialize;
use uuid::Uuid;

use crate::handlers::MessageResponse;
use crate::models::{AccountState, MemberState};
use crate::services::ProfileField;
use crate::AppState;
use service_core::error::AppError;

#[derive(Debug, Deserialize)]
pub struct UpdateFieldRequest {
    pub member_id: i64,
    pub field: ProfileField,
    pub value: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdatePhotoRequest {
    pub member_id: i64,
    pub photo_url: String,
}

#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    pub member_id: i64,
    pub current_password: String,
    pub new_password: String,
}

#[derive(Debug, Deserialize)]
pub struct DeactivateRequest {
    pub member_id: i64,
    /// Administrative account to suspend alongside, when the member has
    /// one.
    pub account_id: Option<Uuid>,
}

/// Update one profile field.
///
/// PATCH /api/profile/field
pub async fn update_field(
    State(state): State<AppState>,
    Json(req): Json<UpdateFieldRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    state
        .identity
        .update_field(req.member_id, req.field, &req.value)
        .await?;
    Ok(Json(MessageResponse::new("Field updated")))
}

/// Store a new profile photo URL.
///
/// POST /api/profile/photo
pub async fn update_photo(
    State(state): State<AppState>,
    Json(req): Json<UpdatePhotoRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    state
        .identity
        .update_field(req.member_id, ProfileField::PhotoUrl, &req.photo_url)
        .await?;
    Ok(Json(MessageResponse::new("Photo updated")))
}

/// Change the password after verifying the current one.
///
/// POST /api/auth/password
pub async fn change_password(
    State(state): State<AppState>,
    Json(req): Json<ChangePasswordRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    state
        .identity
        .change_password(req.member_id, &req.current_password, &req.new_password)
        .await?;
    Ok(Json(MessageResponse::new("Password changed")))
}

/// Deactivate the member; suspend the administrative account too when
/// one was supplied.
///
/// POST /api/profile/deactivate
pub async fn deactivate(
    State(state): State<AppState>,
    Json(req): Json<DeactivateRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    state
        .identity
        .set_member_status(req.member_id, MemberState::Inactive)
        .await?;

    if let Some(account_id) = req.account_id {
        state
            .identity
            .set_account_status(account_id, AccountState::Suspended)
            .await?;
    }

    tracing::info!(member_id = req.member_id, "Account deactivated by member");
    Ok(Json(MessageResponse::new("Account deactivated")))
}
