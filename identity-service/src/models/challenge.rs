//! Challenge model - single-use, time-boxed verification codes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// What a challenge was issued for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChallengePurpose {
    SecurityCheck,
    PasswordReset,
    Recovery,
    BroadcastConfirm,
}

impl ChallengePurpose {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChallengePurpose::SecurityCheck => "security_check",
            ChallengePurpose::PasswordReset => "password_reset",
            ChallengePurpose::Recovery => "recovery",
            ChallengePurpose::BroadcastConfirm => "broadcast_confirm",
        }
    }
}

/// The stored challenge row. There is at most one: issuing a new code
/// overwrites this row, which is what invalidates every prior code.
#[derive(Debug, Clone, FromRow)]
pub struct Challenge {
    pub code_hash_text: String,
    pub purpose_code: String,
    pub expiry_utc: DateTime<Utc>,
    pub consumed_utc: Option<DateTime<Utc>>,
    pub created_utc: DateTime<Utc>,
}

impl Challenge {
    pub fn is_consumed(&self) -> bool {
        self.consumed_utc.is_some()
    }

    /// Expiry is strict: a code is dead at its expiry instant.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expiry_utc
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn challenge(expiry: DateTime<Utc>) -> Challenge {
        Challenge {
            code_hash_text: "abc".to_string(),
            purpose_code: ChallengePurpose::SecurityCheck.as_str().to_string(),
            expiry_utc: expiry,
            consumed_utc: None,
            created_utc: Utc::now(),
        }
    }

    #[test]
    fn live_before_expiry() {
        let now = Utc::now();
        let c = challenge(now + Duration::minutes(15));
        assert!(!c.is_expired_at(now + Duration::minutes(14) + Duration::seconds(59)));
        assert!(!c.is_consumed());
    }

    #[test]
    fn dead_at_and_after_expiry() {
        let now = Utc::now();
        let c = challenge(now);
        assert!(c.is_expired_at(now));
        assert!(c.is_expired_at(now + Duration::seconds(1)));
    }
}
