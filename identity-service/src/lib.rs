pub mod config;
pub mod db;
pub mod handlers;
pub mod models;
pub mod services;
pub mod utils;

use axum::{
    middleware::from_fn,
    routing::{get, post},
    Router,
};
use service_core::middleware::{request_id_middleware, security_headers_middleware};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::IdentityConfig;
use crate::services::{
    ChallengeService, Database, EmailProvider, IdentityService, RecoveryService,
};
use service_core::error::AppError;

#[derive(Clone)]
pub struct AppState {
    pub config: IdentityConfig,
    pub db: Database,
    pub identity: IdentityService,
    pub challenges: ChallengeService,
    pub recovery: RecoveryService,
    pub email: Arc<dyn EmailProvider>,
}

impl AppState {
    pub fn new(config: IdentityConfig, db: Database, email: Arc<dyn EmailProvider>) -> Self {
        Self {
            identity: IdentityService::new(db.clone()),
            challenges: ChallengeService::new(db.clone()),
            recovery: RecoveryService::new(db.clone()),
            config,
            db,
            email,
        }
    }
}

pub async fn build_router(state: AppState) -> Result<Router, AppError> {
    let cors = CorsLayer::new()
        .allow_origin(
            state
                .config
                .security
                .allowed_origins
                .iter()
                .map(|o| {
                    o.parse::<axum::http::HeaderValue>().unwrap_or_else(|e| {
                        tracing::error!("Invalid CORS origin '{}': {}. Using fallback.", o, e);
                        axum::http::HeaderValue::from_static("http://localhost:5173")
                    })
                })
                .collect::<Vec<axum::http::HeaderValue>>(),
        )
        .allow_methods([
            axum::http::Method::GET,
            axum::http::Method::POST,
            axum::http::Method::PATCH,
            axum::http::Method::OPTIONS,
        ])
        .allow_headers([
            axum::http::header::CONTENT_TYPE,
            axum::http::header::HeaderName::from_static("x-request-id"),
        ]);

    let app = Router::new()
        .route("/health", get(health_check))
        .route("/api/publications", get(handlers::publications::list_publications))
        .route("/api/auth/identify", post(handlers::auth::identify))
        .route(
            "/api/auth/handle-availability",
            get(handlers::auth::handle_availability),
        )
        .route("/api/auth/login", post(handlers::auth::login))
        .route("/api/auth/pin/request", post(handlers::verification::request_code))
        .route("/api/auth/pin/verify", post(handlers::verification::verify_code))
        .route("/api/auth/password", post(handlers::profile::change_password))
        .route("/api/recovery/resolve", post(handlers::recovery::resolve))
        .route(
            "/api/recovery/send-access-summary",
            post(handlers::recovery::send_access_summary),
        )
        .route("/api/recovery/handle", get(handlers::recovery::recover_handle))
        .route(
            "/api/profile/field",
            axum::routing::patch(handlers::profile::update_field),
        )
        .route("/api/profile/photo", post(handlers::profile::update_photo))
        .route("/api/profile/deactivate", post(handlers::profile::deactivate))
        .route(
            "/api/security/bulletin",
            get(handlers::security::latest_bulletin).post(handlers::security::save_bulletin),
        )
        .route("/api/security/broadcast", post(handlers::security::broadcast))
        .with_state(state)
        .layer(TraceLayer::new_for_http().make_span_with(
            |request: &axum::http::Request<_>| {
                let request_id = request
                    .headers()
                    .get("x-request-id")
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("-");

                tracing::info_span!(
                    "http_request",
                    request_id = %request_id,
                    method = %request.method(),
                    uri = %request.uri(),
                )
            },
        ))
        .layer(from_fn(request_id_middleware))
        .layer(from_fn(security_headers_middleware))
        .layer(cors);

    Ok(app)
}

/// Service health check: storage reachability plus build metadata.
pub async fn health_check(
    axum::extract::State(state): axum::extract::State<AppState>,
) -> Result<axum::Json<serde_json::Value>, AppError> {
    state.db.health_check().await.map_err(|e| {
        tracing::error!(error = %e, "Database health check failed");
        AppError::ServiceUnavailable
    })?;

    Ok(axum::Json(serde_json::json!({
        "status": "healthy",
        "service": state.config.service_name,
        "version": state.config.service_version,
        "environment": format!("{:?}", state.config.environment),
        "checks": {
            "postgres": "up"
        }
    })))
}
