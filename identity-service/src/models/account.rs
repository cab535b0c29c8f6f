//! Account model - the optional administrative tier of a member.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Account state codes. Independent of the member state: suspending an
/// account does not deactivate the member, and vice versa.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountState {
    Active,
    Suspended,
}

impl AccountState {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountState::Active => "active",
            AccountState::Suspended => "suspended",
        }
    }
}

/// Administrative account entity. At most one per member; handle and
/// secret duplicate the member row and are kept in sync by the mutator.
#[derive(Debug, Clone, FromRow)]
pub struct Account {
    pub account_id: Uuid,
    pub member_id: i64,
    pub handle: String,
    pub secret_text: Option<String>,
    pub secret_changed_utc: Option<DateTime<Utc>>,
    pub account_state_code: String,
    pub created_utc: DateTime<Utc>,
}
