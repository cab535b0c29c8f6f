//! Security bulletins: latest lookup, new revisions, broadcast.

use axum::extract::{Json, State};
use serde::{Deserialize, Serialize};

use crate::models::SecurityBulletin;
use crate::AppState;
use service_core::error::AppError;

#[derive(Debug, Deserialize)]
pub struct SaveBulletinRequest {
    pub title: String,
    #[serde(default)]
    pub body_text: String,
}

#[derive(Debug, Deserialize)]
pub struct BroadcastRequest {
    pub title: String,
    pub body_text: String,
}

#[derive(Debug, Serialize)]
pub struct BroadcastResponse {
    pub recipients: usize,
    pub delivered: usize,
}

/// The current bulletin (newest revision).
///
/// GET /api/security/bulletin
pub async fn latest_bulletin(
    State(state): State<AppState>,
) -> Result<Json<SecurityBulletin>, AppError> {
    let bulletin = state
        .db
        .find_latest_bulletin()
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("No bulletin available")))?;
    Ok(Json(bulletin))
}

/// Append a bulletin revision. Prior revisions are kept.
///
/// POST /api/security/bulletin
pub async fn save_bulletin(
    State(state): State<AppState>,
    Json(req): Json<SaveBulletinRequest>,
) -> Result<Json<SecurityBulletin>, AppError> {
    let bulletin = state
        .db
        .insert_bulletin(&req.title, &req.body_text, chrono::Utc::now())
        .await?;
    Ok(Json(bulletin))
}

/// Append a bulletin revision, then mail every active member a
/// personalized copy. Each send is best-effort: failures are logged and
/// skipped, the broadcast keeps going.
///
/// POST /api/security/broadcast
#[tracing::instrument(skip(state, req), fields(title = %req.title))]
pub async fn broadcast(
    State(state): State<AppState>,
    Json(req): Json<BroadcastRequest>,
) -> Result<Json<BroadcastResponse>, AppError> {
    state
        .db
        .insert_bulletin(&req.title, &req.body_text, chrono::Utc::now())
        .await?;

    // Mail bodies are HTML; keep the author's line breaks.
    let body_html = req.body_text.replace('\n', "<br/>");

    let recipients = state.db.list_broadcast_recipients().await?;
    let total = recipients.len();
    let mut delivered = 0;

    for recipient in recipients {
        let handle = recipient.handle.as_deref().unwrap_or("-");
        let result = state
            .email
            .send_security_notice(
                &recipient.email,
                &recipient.full_name,
                handle,
                &recipient.congregation_label,
                &req.title,
                &body_html,
            )
            .await;

        match result {
            Ok(()) => delivered += 1,
            Err(e) => {
                tracing::warn!(to = %recipient.email, error = %e, "Broadcast email failed");
            }
        }
    }

    tracing::info!(recipients = total, delivered, "Security broadcast completed");
    Ok(Json(BroadcastResponse {
        recipients: total,
        delivered,
    }))
}
