//! Verification-code lifecycle against a real store.

mod common;

use chrono::Duration;
use identity_service::models::ChallengePurpose;
use identity_service::services::ServiceError;

#[tokio::test]
#[ignore] // Requires running PostgreSQL
async fn code_verifies_once_and_never_again() {
    let state = common::spawn_state().await;

    let code = state
        .challenges
        .issue(ChallengePurpose::SecurityCheck, Duration::minutes(15))
        .await
        .expect("issue failed");

    state.challenges.verify(&code).await.expect("first verify");

    let second = state.challenges.verify(&code).await;
    assert!(matches!(second, Err(ServiceError::ChallengeNotFound)));
}

#[tokio::test]
#[ignore] // Requires running PostgreSQL
async fn issuing_supersedes_the_previous_code() {
    let state = common::spawn_state().await;

    let first = state
        .challenges
        .issue(ChallengePurpose::SecurityCheck, Duration::minutes(15))
        .await
        .expect("first issue");
    let second = state
        .challenges
        .issue(ChallengePurpose::PasswordReset, Duration::minutes(15))
        .await
        .expect("second issue");

    // The first code is gone, not expired: it was superseded.
    if first != second {
        let result = state.challenges.verify(&first).await;
        assert!(matches!(result, Err(ServiceError::ChallengeNotFound)));
    }

    state.challenges.verify(&second).await.expect("live code");
}

#[tokio::test]
#[ignore] // Requires running PostgreSQL
async fn expired_code_is_reported_expired_and_stays_unconsumed() {
    let state = common::spawn_state().await;

    let code = state
        .challenges
        .issue(ChallengePurpose::SecurityCheck, Duration::seconds(-1))
        .await
        .expect("issue failed");

    let first = state.challenges.verify(&code).await;
    assert!(matches!(first, Err(ServiceError::ChallengeExpired)));

    // Still expired, not "not found": the row was not consumed.
    let second = state.challenges.verify(&code).await;
    assert!(matches!(second, Err(ServiceError::ChallengeExpired)));
}

#[tokio::test]
#[ignore] // Requires running PostgreSQL
async fn unknown_code_is_not_found() {
    let state = common::spawn_state().await;

    state
        .challenges
        .issue(ChallengePurpose::SecurityCheck, Duration::minutes(15))
        .await
        .expect("issue failed");

    // Seven digits can never collide with a six-digit code.
    let result = state.challenges.verify("0000000").await;
    assert!(matches!(result, Err(ServiceError::ChallengeNotFound)));
}

#[tokio::test]
#[ignore] // Requires running PostgreSQL
async fn concurrent_verifies_cannot_both_succeed() {
    let state = common::spawn_state().await;

    let code = state
        .challenges
        .issue(ChallengePurpose::SecurityCheck, Duration::minutes(15))
        .await
        .expect("issue failed");

    let (a, b) = tokio::join!(
        state.challenges.verify(&code),
        state.challenges.verify(&code)
    );

    let successes = [a.is_ok(), b.is_ok()].iter().filter(|ok| **ok).count();
    assert_eq!(successes, 1, "exactly one verify may win");
}
