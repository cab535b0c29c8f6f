//! Security bulletin model - an append-only notice log.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

/// One bulletin revision. Saving never overwrites: each save appends a
/// row and the newest `published_utc` is the current bulletin.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct SecurityBulletin {
    pub bulletin_id: i64,
    pub title: String,
    pub body_text: String,
    pub published_utc: DateTime<Utc>,
}
