//! Login resolution and credential checks through the router.

mod common;

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use common::SeedMember;
use identity_service::build_router;
use identity_service::utils::hash_secret;
use tower::util::ServiceExt;

fn login_request(handle: &str, password: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/auth/login")
        .header("content-type", "application/json")
        .body(Body::from(
            serde_json::json!({ "handle": handle, "password": password }).to_string(),
        ))
        .unwrap()
}

#[tokio::test]
#[ignore] // Requires running PostgreSQL
async fn member_tier_login_with_hashed_secret() {
    let state = common::spawn_state().await;
    let pool = state.db.pool().clone();

    let congregation_id = common::seed_congregation(&pool, "Lakeside", "9738").await;
    let hash = hash_secret("maria-secret").unwrap();
    common::seed_member(
        &pool,
        SeedMember {
            congregation_id,
            full_name: "Garcia Maria",
            email: Some("maria@example.com"),
            contact: None,
            handle: Some("maria"),
            secret_text: Some(&hash),
            state_code: "active",
        },
    )
    .await;

    let app = build_router(state).await.expect("router");

    let response = app
        .clone()
        .oneshot(login_request("maria", "maria-secret"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(login_request("maria", "wrong-secret"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore] // Requires running PostgreSQL
async fn legacy_cleartext_secret_still_logs_in() {
    let state = common::spawn_state().await;
    let pool = state.db.pool().clone();

    let congregation_id = common::seed_congregation(&pool, "Lakeside", "9738").await;
    common::seed_member(
        &pool,
        SeedMember {
            congregation_id,
            full_name: "Lopez Juan",
            email: None,
            contact: None,
            handle: Some("juan"),
            secret_text: Some("summer2019"),
            state_code: "active",
        },
    )
    .await;

    let app = build_router(state).await.expect("router");

    let response = app
        .clone()
        .oneshot(login_request("juan", "summer2019"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(login_request("juan", "Summer2019"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore] // Requires running PostgreSQL
async fn inactive_member_cannot_log_in() {
    let state = common::spawn_state().await;
    let pool = state.db.pool().clone();

    let congregation_id = common::seed_congregation(&pool, "Lakeside", "9738").await;
    common::seed_member(
        &pool,
        SeedMember {
            congregation_id,
            full_name: "Garcia Maria",
            email: None,
            contact: None,
            handle: Some("maria"),
            secret_text: Some("pw"),
            state_code: "inactive",
        },
    )
    .await;

    let app = build_router(state).await.expect("router");

    // Same status as a bad password: the response must not reveal which.
    let response = app.oneshot(login_request("maria", "pw")).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore] // Requires running PostgreSQL
async fn account_tier_wins_over_member_tier() {
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
            secret_text: Some("member-tier-secret"),
            state_code: "active",
        },
    )
    .await;
    common::seed_account(&pool, member_id, "ana", Some("account-tier-secret")).await;

    let app = build_router(state).await.expect("router");

    // The account row's secret is the one that counts.
    let response = app
        .clone()
        .oneshot(login_request("ana", "account-tier-secret"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(login_request("ana", "member-tier-secret"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
