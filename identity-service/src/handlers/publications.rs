//! Publication catalog listing.

use axum::extract::{Json, State};

use crate::models::Publication;
use crate::AppState;
use service_core::error::AppError;

/// The full catalog.
///
/// GET /api/publications
pub async fn list_publications(
    State(state): State<AppState>,
) -> Result<Json<Vec<Publication>>, AppError> {
    let publications = state.db.list_publications().await?;
    Ok(Json(publications))
}
