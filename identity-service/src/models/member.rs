//! Member model - the canonical person tier.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Member state codes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemberState {
    Active,
    Inactive,
}

impl MemberState {
    pub fn as_str(&self) -> &'static str {
        match self {
            MemberState::Active => "active",
            MemberState::Inactive => "inactive",
        }
    }
}

/// A member joined with its congregation and, when one exists, its
/// administrative account row. This is the shape login and recovery hand
/// back to the request layer.
///
/// `secret_text` comes from the account tier when an account row matched
/// the lookup, otherwise from the member row.
#[derive(Debug, Clone, FromRow)]
pub struct MemberProfile {
    pub member_id: i64,
    pub account_id: Option<Uuid>,
    pub full_name: String,
    pub email: Option<String>,
    pub contact: Option<String>,
    pub photo_url: Option<String>,
    pub handle: String,
    pub secret_text: Option<String>,
    pub member_state_code: String,
    pub secret_changed_utc: Option<DateTime<Utc>>,
    pub congregation_id: i64,
    pub congregation_label: String,
    pub congregation_number: String,
    pub region: Option<String>,
    pub country: Option<String>,
    pub province: Option<String>,
    pub district: Option<String>,
    pub city: Option<String>,
    pub address_line: Option<String>,
}

impl MemberProfile {
    /// Convert to a response safe to hand upstream (no stored secret).
    pub fn sanitized(&self) -> ProfileResponse {
        ProfileResponse::from(self.clone())
    }
}

/// Profile response for the API (without credential fields).
#[derive(Debug, Clone, Serialize)]
pub struct ProfileResponse {
    pub member_id: i64,
    pub account_id: Option<Uuid>,
    pub full_name: String,
    pub email: Option<String>,
    pub contact: Option<String>,
    pub photo_url: Option<String>,
    pub handle: String,
    pub member_state_code: String,
    pub secret_changed_utc: Option<DateTime<Utc>>,
    pub congregation_id: i64,
    pub congregation_label: String,
    pub congregation_number: String,
    pub region: Option<String>,
    pub country: Option<String>,
    pub province: Option<String>,
    pub district: Option<String>,
    pub city: Option<String>,
    pub address_line: Option<String>,
}

impl From<MemberProfile> for ProfileResponse {
    fn from(p: MemberProfile) -> Self {
        Self {
            member_id: p.member_id,
            account_id: p.account_id,
            full_name: p.full_name,
            email: p.email,
            contact: p.contact,
            photo_url: p.photo_url,
            handle: p.handle,
            member_state_code: p.member_state_code,
            secret_changed_utc: p.secret_changed_utc,
            congregation_id: p.congregation_id,
            congregation_label: p.congregation_label,
            congregation_number: p.congregation_number,
            region: p.region,
            country: p.country,
            province: p.province,
            district: p.district,
            city: p.city,
            address_line: p.address_line,
        }
    }
}

/// Minimal projection scanned during phone-suffix recovery.
#[derive(Debug, Clone, FromRow)]
pub struct MemberContact {
    pub member_id: i64,
    pub email: Option<String>,
    pub contact: Option<String>,
}

/// What the access-summary mail needs about a member.
#[derive(Debug, Clone, FromRow)]
pub struct AccessSummary {
    pub member_id: i64,
    pub handle: String,
    pub congregation_label: String,
    pub congregation_number: String,
}

/// Recipient row for the security broadcast.
#[derive(Debug, Clone, FromRow)]
pub struct BroadcastRecipient {
    pub email: String,
    pub full_name: String,
    pub handle: Option<String>,
    pub congregation_label: String,
}
