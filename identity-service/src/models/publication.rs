//! Publication catalog model.

use serde::Serialize;
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Publication {
    pub publication_id: String,
    pub publication_label: String,
    pub kind: Option<String>,
    pub abbreviation: Option<String>,
    pub cover_url: Option<String>,
}
