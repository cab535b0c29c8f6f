//! Mutation and recovery flows against a real store.

mod common;

use common::SeedMember;
use identity_service::services::{ProfileField, ServiceError};
use identity_service::utils::{hash_secret, StoredSecret};

#[tokio::test]
#[ignore] // Requires running PostgreSQL
async fn change_password_updates_both_tiers() {
    let state = common::spawn_state().await;
    let pool = state.db.pool().clone();

    let congregation_id = common::seed_congregation(&pool, "Lakeside", "9738").await;
    let old_hash = hash_secret("old-secret").unwrap();
    let member_id = common::seed_member(
        &pool,
        SeedMember {
            congregation_id,
            full_name: "Perez Ana",
            email: None,
            contact: None,
            handle: Some("ana"),
            secret_text: Some(&old_hash),
            state_code: "active",
        },
    )
    .await;
    common::seed_account(&pool, member_id, "ana", Some(&old_hash)).await;

    // Wrong current password: refused, nothing written.
    let refused = state
        .identity
        .change_password(member_id, "wrong-current", "new-secret")
        .await;
    assert!(matches!(refused, Err(ServiceError::InvalidCredentials)));
    assert_eq!(common::member_secret(&pool, member_id).await, Some(old_hash.clone()));

    state
        .identity
        .change_password(member_id, "old-secret", "new-secret")
        .await
        .expect("change failed");

    for stored in [
        common::member_secret(&pool, member_id).await,
        common::account_secret(&pool, member_id).await,
    ] {
        let stored = stored.expect("secret missing");
        let secret = StoredSecret::parse(&stored);
        assert!(secret.verify("new-secret"));
        assert!(!secret.verify("old-secret"));
    }
}

#[tokio::test]
#[ignore] // Requires running PostgreSQL
async fn handle_change_mirrors_to_account_tier() {
    let state = common::spawn_state().await;
    let pool = state.db.pool().clone();

    let congregation_id = common::seed_congregation(&pool, "Lakeside", "9738").await;
    let member_id = common::seed_member(
        &pool,
        SeedMember {
            congregation_id,
            full_name: "Perez Ana",
            email: None,
            contact: None,
            handle: Some("ana"),
            secret_text: None,
            state_code: "active",
        },
    )
    .await;
    common::seed_account(&pool, member_id, "ana", None).await;

    state
        .identity
        .update_field(member_id, ProfileField::Handle, "ana.perez")
        .await
        .expect("update failed");

    let member_handle: Option<String> =
        sqlx::query_scalar("SELECT handle FROM members WHERE member_id = $1")
            .bind(member_id)
            .fetch_one(&pool)
            .await
            .unwrap();
    let account_handle: String =
        sqlx::query_scalar("SELECT handle FROM accounts WHERE member_id = $1")
            .bind(member_id)
            .fetch_one(&pool)
            .await
            .unwrap();

    assert_eq!(member_handle.as_deref(), Some("ana.perez"));
    assert_eq!(account_handle, "ana.perez");
}

#[tokio::test]
#[ignore] // Requires running PostgreSQL
async fn contact_updates_are_stored_digits_only() {
    let state = common::spawn_state().await;
    let pool = state.db.pool().clone();

    let congregation_id = common::seed_congregation(&pool, "Lakeside", "9738").await;
    let member_id = common::seed_member(
        &pool,
        SeedMember {
            congregation_id,
            full_name: "Perez Ana",
            email: None,
            contact: None,
            handle: Some("ana"),
            secret_text: None,
            state_code: "active",
        },
    )
    .await;

    state
        .identity
        .update_field(member_id, ProfileField::Contact, "+54 9 11 5551-2345")
        .await
        .expect("update failed");

    let contact: Option<String> =
        sqlx::query_scalar("SELECT contact FROM members WHERE member_id = $1")
            .bind(member_id)
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(contact.as_deref(), Some("5491155512345"));
}

#[tokio::test]
#[ignore] // Requires running PostgreSQL
async fn handle_check_never_collides_with_self() {
    let state = common::spawn_state().await;
    let pool = state.db.pool().clone();

    let congregation_id = common::seed_congregation(&pool, "Lakeside", "9738").await;
    let member_id = common::seed_member(
        &pool,
        SeedMember {
            congregation_id,
            full_name: "Garcia Maria",
            email: None,
            contact: None,
            handle: Some("maria"),
            secret_text: None,
            state_code: "active",
        },
    )
    .await;

    let own = state
        .identity
        .check_handle_taken("maria", member_id)
        .await
        .expect("check failed");
    assert!(!own.taken);

    // Someone else asking for the same handle does collide, and gets
    // deterministic alternatives.
    let other = state
        .identity
        .check_handle_taken("maria", member_id + 1)
        .await
        .expect("check failed");
    assert!(other.taken);
}

#[tokio::test]
#[ignore] // Requires running PostgreSQL
async fn recovery_matches_phone_suffix_after_normalization() {
    let state = common::spawn_state().await;
    let pool = state.db.pool().clone();

    let congregation_id = common::seed_congregation(&pool, "Lakeside", "9738").await;
    let member_id = common::seed_member(
        &pool,
        SeedMember {
            congregation_id,
            full_name: "Garcia Maria",
            email: Some("maria@example.com"),
            contact: Some("+54 9 11 5551-2345"),
            handle: Some("maria"),
            secret_text: None,
            state_code: "active",
        },
    )
    .await;

    let found = state
        .recovery
        .resolve_by_phone_suffix("55512345")
        .await
        .expect("no match");
    assert_eq!(found.member_id, member_id);
    assert_eq!(found.email.as_deref(), Some("maria@example.com"));

    let miss = state.recovery.resolve_by_phone_suffix("99999999").await;
    assert!(matches!(miss, Err(ServiceError::MemberNotFound)));
}

#[tokio::test]
#[ignore] // Requires running PostgreSQL
async fn recovery_by_membership_requires_both_keys_to_match() {
    let state = common::spawn_state().await;
    let pool = state.db.pool().clone();

    let congregation_id = common::seed_congregation(&pool, "Lakeside", "9738").await;
    let member_id = common::seed_member(
        &pool,
        SeedMember {
            congregation_id,
            full_name: "Garcia Maria",
            email: Some("maria@example.com"),
            contact: None,
            handle: Some("maria"),
            secret_text: None,
            state_code: "active",
        },
    )
    .await;

    state
        .recovery
        .resolve_by_membership(member_id, "9738")
        .await
        .expect("exact match failed");

    let wrong_congregation = state.recovery.resolve_by_membership(member_id, "1111").await;
    assert!(matches!(
        wrong_congregation,
        Err(ServiceError::MemberNotFound)
    ));
}
