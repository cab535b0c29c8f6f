//! One-time verification codes for step-up checks.
//!
//! At most one challenge is live at any instant: issuing writes the
//! singleton row and thereby invalidates every previously issued code.
//! Consumption is a compare-and-set, so two concurrent verifies of the
//! same code can never both succeed.

use chrono::{Duration, Utc};
use rand::Rng;
use sha2::{Digest, Sha256};

use crate::models::ChallengePurpose;
use crate::services::{Database, ServiceError};

const CODE_LENGTH: usize = 6;

#[derive(Clone)]
pub struct ChallengeService {
    db: Database,
}

impl ChallengeService {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Issue a fresh code, superseding any prior challenge.
    ///
    /// Returns the cleartext code for delivery; only its hash is stored.
    pub async fn issue(
        &self,
        purpose: ChallengePurpose,
        ttl: Duration,
    ) -> Result<String, ServiceError> {
        let code = generate_code(CODE_LENGTH);
        let now = Utc::now();

        self.db
            .upsert_challenge(&hash_code(&code), purpose.as_str(), now + ttl, now)
            .await?;

        tracing::info!(purpose = purpose.as_str(), "Verification code issued");
        Ok(code)
    }

    /// Consume a code.
    ///
    /// Unknown or already-used codes are `ChallengeNotFound`; a known but
    /// expired code is `ChallengeExpired` and stays unconsumed. Expiry is
    /// compared here against a UTC clock rather than in the store, so a
    /// server/database timezone mismatch cannot skew the window.
    pub async fn verify(&self, code: &str) -> Result<(), ServiceError> {
        let challenge = self
            .db
            .find_live_challenge(&hash_code(code))
            .await?
            .ok_or(ServiceError::ChallengeNotFound)?;

        let now = Utc::now();
        if challenge.is_expired_at(now) {
            return Err(ServiceError::ChallengeExpired);
        }

        // The CAS loses when a concurrent verify consumed the code first;
        // for this caller that is indistinguishable from "already used".
        let consumed = self
            .db
            .consume_challenge(&challenge.code_hash_text, now)
            .await?;
        if consumed == 0 {
            return Err(ServiceError::ChallengeNotFound);
        }

        tracing::info!(purpose = %challenge.purpose_code, "Verification code consumed");
        Ok(())
    }
}

/// Uniform random numeric code of a fixed width.
fn generate_code(length: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..length)
        .map(|_| rng.gen_range(0..10).to_string())
        .collect()
}

/// Codes are stored hashed; lookups compare hashes.
fn hash_code(code: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(code.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn code_has_fixed_width_and_digits_only() {
        for _ in 0..50 {
            let code = generate_code(CODE_LENGTH);
            assert_eq!(code.len(), CODE_LENGTH);
            assert!(code.chars().all(|c| c.is_ascii_digit()));
        }
    }

    #[test]
    fn hash_is_stable_hex() {
        let a = hash_code("123456");
        let b = hash_code("123456");
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
        assert_ne!(a, hash_code("123457"));
    }
}
