//! Identity resolution and mutation.
//!
//! A person is one `members` row; an administrative `accounts` row may
//! shadow it. Handle and secret are logically one value across the two
//! tiers: reads prefer the account row, writes land on the member row
//! first and are mirrored to the account row when one exists.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::models::{AccountState, MemberProfile, MemberState};
use crate::services::{Database, ServiceError};
use crate::utils::{hash_secret, normalize_contact, StoredSecret};

/// Profile fields a member may change about themselves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfileField {
    Handle,
    Email,
    Contact,
    PhotoUrl,
}

/// Result of a handle-availability probe.
#[derive(Debug, Serialize)]
pub struct HandleAvailability {
    pub taken: bool,
    pub suggestions: Vec<String>,
}

#[derive(Clone)]
pub struct IdentityService {
    db: Database,
}

impl IdentityService {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Resolve a login handle to its canonical profile.
    ///
    /// Administrative tier first, member tier second; first match wins.
    /// Both lookups gate on the member being active.
    pub async fn resolve_for_login(
        &self,
        handle: &str,
    ) -> Result<MemberProfile, ServiceError> {
        if let Some(profile) = self.db.find_profile_by_account_handle(handle).await? {
            return Ok(profile);
        }
        self.db
            .find_profile_by_member_handle(handle)
            .await?
            .ok_or(ServiceError::MemberNotFound)
    }

    /// Resolve and verify in one step.
    ///
    /// An unknown handle and a wrong password collapse into the same
    /// outcome so the response never reveals which one failed.
    pub async fn login(
        &self,
        handle: &str,
        password: &str,
    ) -> Result<MemberProfile, ServiceError> {
        let profile = match self.resolve_for_login(handle).await {
            Ok(profile) => profile,
            Err(ServiceError::MemberNotFound) => return Err(ServiceError::InvalidCredentials),
            Err(e) => return Err(e),
        };

        let stored = profile.secret_text.as_deref().unwrap_or_default();
        if !StoredSecret::parse(stored).verify(password) {
            return Err(ServiceError::InvalidCredentials);
        }

        tracing::info!(member_id = profile.member_id, "Member logged in");
        Ok(profile)
    }

    /// Existence probe against the administrative tier only, for the
    /// pre-login identification step.
    pub async fn account_handle_exists(&self, handle: &str) -> Result<bool, ServiceError> {
        self.db.account_handle_exists(handle).await
    }

    /// Check whether a handle is taken by anyone other than the member
    /// themselves, and offer deterministic alternatives when it is.
    pub async fn check_handle_taken(
        &self,
        handle: &str,
        excluding_member_id: i64,
    ) -> Result<HandleAvailability, ServiceError> {
        let collisions = self
            .db
            .count_handle_collisions(handle, excluding_member_id)
            .await?;

        if collisions == 0 {
            return Ok(HandleAvailability {
                taken: false,
                suggestions: Vec::new(),
            });
        }

        let suggestions = match self.db.find_member_full_name(excluding_member_id).await? {
            Some(full_name) => handle_suggestions(&full_name, excluding_member_id),
            None => Vec::new(),
        };

        Ok(HandleAvailability {
            taken: true,
            suggestions,
        })
    }

    /// Apply a single-field profile update.
    ///
    /// Contact values are stored digits-only. A handle change is the one
    /// field that spans both tiers; the member write is not rolled back
    /// if the account mirror fails.
    pub async fn update_field(
        &self,
        member_id: i64,
        field: ProfileField,
        value: &str,
    ) -> Result<(), ServiceError> {
        let updated = match field {
            ProfileField::Handle => {
                if self.db.count_handle_collisions(value, member_id).await? > 0 {
                    return Err(ServiceError::HandleTaken);
                }
                let updated = self.db.update_member_handle(member_id, value).await?;
                if updated > 0 && self.db.find_account_by_member_id(member_id).await?.is_some() {
                    self.db.update_account_handle(member_id, value).await?;
                }
                updated
            }
            ProfileField::Email => self.db.update_member_email(member_id, value).await?,
            ProfileField::Contact => {
                let digits = normalize_contact(value);
                self.db.update_member_contact(member_id, &digits).await?
            }
            ProfileField::PhotoUrl => self.db.update_member_photo_url(member_id, value).await?,
        };

        if updated == 0 {
            return Err(ServiceError::MemberNotFound);
        }

        tracing::info!(member_id, field = ?field, "Profile field updated");
        Ok(())
    }

    /// Change the stored password after re-proving the current one.
    ///
    /// The current secret is read account-tier-first, matching login. On
    /// a mismatch nothing is written.
    pub async fn change_password(
        &self,
        member_id: i64,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), ServiceError> {
        let account = self.db.find_account_by_member_id(member_id).await?;

        let stored = match &account {
            Some(account) => account.secret_text.clone(),
            None => self
                .db
                .find_member_secret(member_id)
                .await?
                .ok_or(ServiceError::MemberNotFound)?,
        };

        let stored = stored.unwrap_or_default();
        if !StoredSecret::parse(&stored).verify(current_password) {
            return Err(ServiceError::InvalidCredentials);
        }

        let encoded = hash_secret(new_password)?;
        let changed_utc = Utc::now();

        let updated = self
            .db
            .update_member_secret(member_id, &encoded, changed_utc)
            .await?;
        if updated == 0 {
            return Err(ServiceError::MemberNotFound);
        }

        if account.is_some() {
            self.db
                .update_account_secret(member_id, &encoded, changed_utc)
                .await?;
        }

        tracing::info!(member_id, "Password changed");
        Ok(())
    }

    /// Idempotent member state transition. Deactivation here is the
    /// primary signal; it does not touch any account row.
    pub async fn set_member_status(
        &self,
        member_id: i64,
        state: MemberState,
    ) -> Result<(), ServiceError> {
        let updated = self.db.set_member_state(member_id, state.as_str()).await?;
        if updated == 0 {
            return Err(ServiceError::MemberNotFound);
        }
        tracing::info!(member_id, state = state.as_str(), "Member state set");
        Ok(())
    }

    /// Idempotent account state transition, independent of the member
    /// state.
    pub async fn set_account_status(
        &self,
        account_id: uuid::Uuid,
        state: AccountState,
    ) -> Result<(), ServiceError> {
        let updated = self.db.set_account_state(account_id, state.as_str()).await?;
        if updated == 0 {
            return Err(ServiceError::MemberNotFound);
        }
        tracing::info!(%account_id, state = state.as_str(), "Account state set");
        Ok(())
    }
}

/// Derive up to three alternative handles from a member's name parts and
/// id. No randomness: the same inputs always produce the same list.
///
/// Names are stored surname-first, so `parts[0]` is the surname.
pub fn handle_suggestions(full_name: &str, member_id: i64) -> Vec<String> {
    let lowered = full_name.to_lowercase();
    let mut parts = lowered.split_whitespace();
    let surname = parts.next().unwrap_or_default();
    let given = parts.next().unwrap_or_default();

    let id = member_id.to_string();
    let candidates = [
        join_non_empty(".", &[given, surname, &id]),
        join_non_empty(".", &[surname, given, &id]),
        join_non_empty("_", &[given, surname, &id]),
    ];

    let mut suggestions = Vec::new();
    for candidate in candidates {
        if !candidate.is_empty() && !suggestions.contains(&candidate) {
            suggestions.push(candidate);
        }
    }
    suggestions
}

fn join_non_empty(sep: &str, parts: &[&str]) -> String {
    parts
        .iter()
        .filter(|p| !p.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join(sep)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suggestions_are_deterministic() {
        let a = handle_suggestions("Garcia Maria", 42);
        let b = handle_suggestions("Garcia Maria", 42);
        assert_eq!(a, b);
        assert_eq!(
            a,
            vec!["maria.garcia.42", "garcia.maria.42", "maria_garcia_42"]
        );
    }

    #[test]
    fn single_name_part_still_yields_suggestions() {
        let suggestions = handle_suggestions("Garcia", 7);
        assert_eq!(suggestions, vec!["garcia.7", "garcia_7"]);
    }

    #[test]
    fn empty_name_yields_id_only() {
        let suggestions = handle_suggestions("", 9);
        assert_eq!(suggestions, vec!["9"]);
    }
}
