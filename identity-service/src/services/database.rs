//! PostgreSQL access layer.
//!
//! One method per logical query; joins and predicates live here so the
//! services above stay free of SQL.

use chrono::{DateTime, Utc};
use sqlx::postgres::PgPool;
use uuid::Uuid;

use crate::models::{
    AccessSummary, Account, BroadcastRecipient, Challenge, MemberContact, MemberProfile,
    Publication, SecurityBulletin,
};
use crate::services::ServiceError;

const PROFILE_BY_ACCOUNT_HANDLE: &str = r#"
    SELECT m.member_id, a.account_id, m.full_name, m.email, m.contact,
           m.photo_url, a.handle, a.secret_text, m.member_state_code,
           a.secret_changed_utc,
           c.congregation_id, c.congregation_label, c.congregation_number,
           c.region, c.country, c.province, c.district, c.city, c.address_line
    FROM accounts a
    JOIN members m ON m.member_id = a.member_id
    JOIN congregations c ON c.congregation_id = m.congregation_id
    WHERE a.handle = $1 AND m.member_state_code = 'active'
"#;

const PROFILE_BY_MEMBER_HANDLE: &str = r#"
    SELECT m.member_id, NULL::uuid AS account_id, m.full_name, m.email,
           m.contact, m.photo_url, m.handle, m.secret_text,
           m.member_state_code, m.secret_changed_utc,
           c.congregation_id, c.congregation_label, c.congregation_number,
           c.region, c.country, c.province, c.district, c.city, c.address_line
    FROM members m
    JOIN congregations c ON c.congregation_id = m.congregation_id
    WHERE m.handle = $1 AND m.member_state_code = 'active'
"#;

/// PostgreSQL database wrapper.
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Create a new database wrapper from a connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Get the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Health check - ping the database.
    pub async fn health_check(&self) -> Result<(), ServiceError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    // ==================== Identity Resolution ====================

    /// Administrative-tier lookup: account joined to its member and
    /// congregation, gated on the member being active.
    pub async fn find_profile_by_account_handle(
        &self,
        handle: &str,
    ) -> Result<Option<MemberProfile>, ServiceError> {
        let profile = sqlx::query_as::<_, MemberProfile>(PROFILE_BY_ACCOUNT_HANDLE)
            .bind(handle)
            .fetch_optional(&self.pool)
            .await?;
        Ok(profile)
    }

    /// Member-tier lookup with the same active gate.
    pub async fn find_profile_by_member_handle(
        &self,
        handle: &str,
    ) -> Result<Option<MemberProfile>, ServiceError> {
        let profile = sqlx::query_as::<_, MemberProfile>(PROFILE_BY_MEMBER_HANDLE)
            .bind(handle)
            .fetch_optional(&self.pool)
            .await?;
        Ok(profile)
    }

    /// Cheap existence probe against the administrative tier only.
    pub async fn account_handle_exists(&self, handle: &str) -> Result<bool, ServiceError> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM accounts WHERE handle = $1")
                .bind(handle)
                .fetch_one(&self.pool)
                .await?;
        Ok(count > 0)
    }

    /// Handle collisions across both tiers, excluding the member itself
    /// in each so nobody collides with their own row.
    pub async fn count_handle_collisions(
        &self,
        handle: &str,
        excluding_member_id: i64,
    ) -> Result<i64, ServiceError> {
        let accounts: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM accounts WHERE handle = $1 AND member_id != $2",
        )
        .bind(handle)
        .bind(excluding_member_id)
        .fetch_one(&self.pool)
        .await?;

        let members: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM members WHERE handle = $1 AND member_id != $2",
        )
        .bind(handle)
        .bind(excluding_member_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(accounts + members)
    }

    /// Name and id used to derive handle suggestions.
    pub async fn find_member_full_name(
        &self,
        member_id: i64,
    ) -> Result<Option<String>, ServiceError> {
        let name: Option<String> =
            sqlx::query_scalar("SELECT full_name FROM members WHERE member_id = $1")
                .bind(member_id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(name)
    }

    // ==================== Member / Account Mutations ====================

    /// The account row for a member, when one exists.
    pub async fn find_account_by_member_id(
        &self,
        member_id: i64,
    ) -> Result<Option<Account>, ServiceError> {
        let account =
            sqlx::query_as::<_, Account>("SELECT * FROM accounts WHERE member_id = $1")
                .bind(member_id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(account)
    }

    /// Stored secret from the member tier.
    pub async fn find_member_secret(
        &self,
        member_id: i64,
    ) -> Result<Option<Option<String>>, ServiceError> {
        let row: Option<Option<String>> =
            sqlx::query_scalar("SELECT secret_text FROM members WHERE member_id = $1")
                .bind(member_id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row)
    }

    pub async fn update_member_handle(
        &self,
        member_id: i64,
        handle: &str,
    ) -> Result<u64, ServiceError> {
        let result = sqlx::query("UPDATE members SET handle = $1 WHERE member_id = $2")
            .bind(handle)
            .bind(member_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    pub async fn update_account_handle(
        &self,
        member_id: i64,
        handle: &str,
    ) -> Result<u64, ServiceError> {
        let result = sqlx::query("UPDATE accounts SET handle = $1 WHERE member_id = $2")
            .bind(handle)
            .bind(member_id)
            .execute(&self.pool)
            .await
            .map_err(ServiceError::MirrorWrite)?;
        Ok(result.rows_affected())
    }

    pub async fn update_member_email(
        &self,
        member_id: i64,
        email: &str,
    ) -> Result<u64, ServiceError> {
        let result = sqlx::query("UPDATE members SET email = $1 WHERE member_id = $2")
            .bind(email)
            .bind(member_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    pub async fn update_member_contact(
        &self,
        member_id: i64,
        contact: &str,
    ) -> Result<u64, ServiceError> {
        let result = sqlx::query("UPDATE members SET contact = $1 WHERE member_id = $2")
            .bind(contact)
            .bind(member_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    pub async fn update_member_photo_url(
        &self,
        member_id: i64,
        photo_url: &str,
    ) -> Result<u64, ServiceError> {
        let result = sqlx::query("UPDATE members SET photo_url = $1 WHERE member_id = $2")
            .bind(photo_url)
            .bind(member_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    pub async fn update_member_secret(
        &self,
        member_id: i64,
        secret_text: &str,
        changed_utc: DateTime<Utc>,
    ) -> Result<u64, ServiceError> {
        let result = sqlx::query(
            "UPDATE members SET secret_text = $1, secret_changed_utc = $2 WHERE member_id = $3",
        )
        .bind(secret_text)
        .bind(changed_utc)
        .bind(member_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    pub async fn update_account_secret(
        &self,
        member_id: i64,
        secret_text: &str,
        changed_utc: DateTime<Utc>,
    ) -> Result<u64, ServiceError> {
        let result = sqlx::query(
            "UPDATE accounts SET secret_text = $1, secret_changed_utc = $2 WHERE member_id = $3",
        )
        .bind(secret_text)
        .bind(changed_utc)
        .bind(member_id)
        .execute(&self.pool)
        .await
        .map_err(ServiceError::MirrorWrite)?;
        Ok(result.rows_affected())
    }

    pub async fn set_member_state(
        &self,
        member_id: i64,
        state_code: &str,
    ) -> Result<u64, ServiceError> {
        let result =
            sqlx::query("UPDATE members SET member_state_code = $1 WHERE member_id = $2")
                .bind(state_code)
                .bind(member_id)
                .execute(&self.pool)
                .await?;
        Ok(result.rows_affected())
    }

    pub async fn set_account_state(
        &self,
        account_id: Uuid,
        state_code: &str,
    ) -> Result<u64, ServiceError> {
        let result =
            sqlx::query("UPDATE accounts SET account_state_code = $1 WHERE account_id = $2")
                .bind(state_code)
                .bind(account_id)
                .execute(&self.pool)
                .await?;
        Ok(result.rows_affected())
    }

    // ==================== Recovery ====================

    /// Exact-match join on member id and congregation number.
    pub async fn find_contact_by_member_and_congregation(
        &self,
        member_id: i64,
        congregation_number: &str,
    ) -> Result<Option<MemberContact>, ServiceError> {
        let contact = sqlx::query_as::<_, MemberContact>(
            r#"
            SELECT m.member_id, m.email, m.contact
            FROM members m
            JOIN congregations c ON c.congregation_id = m.congregation_id
            WHERE m.member_id = $1 AND c.congregation_number = $2
            "#,
        )
        .bind(member_id)
        .bind(congregation_number)
        .fetch_optional(&self.pool)
        .await?;
        Ok(contact)
    }

    /// Every member's contact projection, for the phone-suffix scan.
    pub async fn list_member_contacts(&self) -> Result<Vec<MemberContact>, ServiceError> {
        let rows = sqlx::query_as::<_, MemberContact>(
            "SELECT member_id, email, contact FROM members",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// The access-summary projection for the owner of an email address.
    pub async fn find_access_summary_by_email(
        &self,
        email: &str,
    ) -> Result<Option<AccessSummary>, ServiceError> {
        let summary = sqlx::query_as::<_, AccessSummary>(
            r#"
            SELECT m.member_id, m.handle, c.congregation_label, c.congregation_number
            FROM members m
            JOIN congregations c ON c.congregation_id = m.congregation_id
            WHERE m.email = $1 AND m.handle IS NOT NULL
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(summary)
    }

    pub async fn find_handle_by_email(
        &self,
        email: &str,
    ) -> Result<Option<String>, ServiceError> {
        let handle: Option<String> = sqlx::query_scalar(
            "SELECT handle FROM members WHERE email = $1 AND handle IS NOT NULL",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(handle)
    }

    // ==================== Congregations ====================

    pub async fn find_congregation_label_by_number(
        &self,
        congregation_number: &str,
    ) -> Result<Option<String>, ServiceError> {
        let label: Option<String> = sqlx::query_scalar(
            "SELECT congregation_label FROM congregations WHERE congregation_number = $1",
        )
        .bind(congregation_number)
        .fetch_optional(&self.pool)
        .await?;
        Ok(label)
    }

    /// Congregation display name reached through a member's handle; the
    /// fallback when the caller did not supply a congregation number.
    pub async fn find_congregation_label_by_handle(
        &self,
        handle: &str,
    ) -> Result<Option<String>, ServiceError> {
        let label: Option<String> = sqlx::query_scalar(
            r#"
            SELECT c.congregation_label
            FROM congregations c
            JOIN members m ON m.congregation_id = c.congregation_id
            WHERE m.handle = $1
            "#,
        )
        .bind(handle)
        .fetch_optional(&self.pool)
        .await?;
        Ok(label)
    }

    // ==================== Challenges ====================

    /// Write the singleton challenge row, superseding whatever was there.
    /// One statement, so a concurrent verify either sees the old live
    /// code or the new one, never a gap.
    pub async fn upsert_challenge(
        &self,
        code_hash: &str,
        purpose_code: &str,
        expiry_utc: DateTime<Utc>,
        created_utc: DateTime<Utc>,
    ) -> Result<(), ServiceError> {
        sqlx::query(
            r#"
            INSERT INTO challenges (singleton, code_hash_text, purpose_code, expiry_utc, consumed_utc, created_utc)
            VALUES (TRUE, $1, $2, $3, NULL, $4)
            ON CONFLICT (singleton) DO UPDATE
            SET code_hash_text = EXCLUDED.code_hash_text,
                purpose_code = EXCLUDED.purpose_code,
                expiry_utc = EXCLUDED.expiry_utc,
                consumed_utc = NULL,
                created_utc = EXCLUDED.created_utc
            "#,
        )
        .bind(code_hash)
        .bind(purpose_code)
        .bind(expiry_utc)
        .bind(created_utc)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// The unconsumed challenge matching a code hash, if any.
    pub async fn find_live_challenge(
        &self,
        code_hash: &str,
    ) -> Result<Option<Challenge>, ServiceError> {
        let challenge = sqlx::query_as::<_, Challenge>(
            r#"
            SELECT code_hash_text, purpose_code, expiry_utc, consumed_utc, created_utc
            FROM challenges
            WHERE code_hash_text = $1 AND consumed_utc IS NULL
            "#,
        )
        .bind(code_hash)
        .fetch_optional(&self.pool)
        .await?;
        Ok(challenge)
    }

    /// Compare-and-set consumption. Returns the number of rows flipped:
    /// under concurrent verifies of the same code exactly one caller
    /// observes 1, every other observes 0.
    pub async fn consume_challenge(
        &self,
        code_hash: &str,
        consumed_utc: DateTime<Utc>,
    ) -> Result<u64, ServiceError> {
        let result = sqlx::query(
            r#"
            UPDATE challenges
            SET consumed_utc = $2
            WHERE code_hash_text = $1 AND consumed_utc IS NULL
            "#,
        )
        .bind(code_hash)
        .bind(consumed_utc)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    // ==================== Bulletins ====================

    pub async fn find_latest_bulletin(
        &self,
    ) -> Result<Option<SecurityBulletin>, ServiceError> {
        let bulletin = sqlx::query_as::<_, SecurityBulletin>(
            "SELECT * FROM security_bulletins ORDER BY published_utc DESC LIMIT 1",
        )
        .fetch_optional(&self.pool)
        .await?;
        Ok(bulletin)
    }

    /// Append a bulletin revision. Never updates an existing row; the
    /// full history stays queryable.
    pub async fn insert_bulletin(
        &self,
        title: &str,
        body_text: &str,
        published_utc: DateTime<Utc>,
    ) -> Result<SecurityBulletin, ServiceError> {
        let bulletin = sqlx::query_as::<_, SecurityBulletin>(
            r#"
            INSERT INTO security_bulletins (title, body_text, published_utc)
            VALUES ($1, $2, $3)
            RETURNING bulletin_id, title, body_text, published_utc
            "#,
        )
        .bind(title)
        .bind(body_text)
        .bind(published_utc)
        .fetch_one(&self.pool)
        .await?;
        Ok(bulletin)
    }

    /// Active members with a usable email address, joined to their
    /// congregation for the personalized notice.
    pub async fn list_broadcast_recipients(
        &self,
    ) -> Result<Vec<BroadcastRecipient>, ServiceError> {
        let rows = sqlx::query_as::<_, BroadcastRecipient>(
            r#"
            SELECT m.email, m.full_name, m.handle, c.congregation_label
            FROM members m
            JOIN congregations c ON c.congregation_id = m.congregation_id
            WHERE m.member_state_code = 'active'
              AND m.email IS NOT NULL AND m.email != ''
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    // ==================== Publications ====================

    pub async fn list_publications(&self) -> Result<Vec<Publication>, ServiceError> {
        let rows = sqlx::query_as::<_, Publication>(
            "SELECT * FROM publications ORDER BY publication_label",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
