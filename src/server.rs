//!
//! authd HTTP server
//! -----------------
//! Axum routes over the credential core. The transport accepts exactly one
//! canonical JSON shape per operation and rejects everything else as a
//! client error; it carries no verification logic of its own.
//!
//! Responsibilities:
//! - Register/login endpoints backed by the store and verifier modules.
//! - Translation of `AppError` into HTTP status + JSON error body.
//! - Permissive CORS for cross-origin frontends.
//! - Store selection at startup (Postgres when configured, memory otherwise)
//!   and explicit schema migration before serving.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::{routing::{get, post}, Json, Router};
use serde_json::{json, Value};
use tower_http::cors::CorsLayer;
use tracing::{error, info};

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::payload::{LoginPayload, RegisterPayload};
use crate::security;
use crate::store::memory::MemAccountStore;
use crate::store::postgres::PgAccountStore;
use crate::store::{NewAccount, SharedStore};
use crate::verifier::{LoginVerifier, Verification};

/// Shared server state injected into all handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: SharedStore,
    pub verifier: LoginVerifier,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(|| async { "authd ok" }))
        .route("/health", get(health))
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Start the authd HTTP server with the given configuration. Selects the
/// store backend, runs the schema migration when Postgres is configured,
/// then mounts the routes and serves.
pub async fn run_with_config(cfg: Config) -> anyhow::Result<()> {
    let store: SharedStore = match cfg.db_url.as_deref() {
        Some(url) => {
            let pg = PgAccountStore::connect(url, cfg.storage_timeout).await?;
            // Migration is an explicit startup step, not a side effect of
            // constructing the store.
            pg.migrate().await?;
            Arc::new(pg)
        }
        None => {
            tracing::warn!("AUTHD_DB_URL unset; accounts are held in memory and lost on restart");
            Arc::new(MemAccountStore::new())
        }
    };
    let verifier = LoginVerifier::new(store.clone());
    let app = router(AppState { store, verifier });

    let addr: SocketAddr = format!("0.0.0.0:{}", cfg.http_port).parse()?;
    info!("Starting server on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

// Convenience entry using env-derived defaults.
pub async fn run() -> anyhow::Result<()> {
    run_with_config(Config::from_env()).await
}

async fn identifier_taken(store: &SharedStore, username: &str, email: &str) -> AppResult<bool> {
    Ok(store.find_by_identifier(username).await?.is_some()
        || store.find_by_identifier(email).await?.is_some())
}

fn error_response(err: &AppError) -> (StatusCode, Json<Value>) {
    let status = StatusCode::from_u16(err.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(json!({"status": "error", "code": err.code_str(), "message": err.message()})))
}

async fn health() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "endpoints": ["/auth/register", "/auth/login"],
    }))
}

async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterPayload>, JsonRejection>,
) -> (StatusCode, Json<Value>) {
    let Json(payload) = match payload {
        Ok(p) => p,
        Err(_) => {
            return error_response(&AppError::invalid_input(
                "malformed_payload",
                "body must be a JSON object with username, email and password",
            ))
        }
    };
    if let Err(e) = payload.validate_identity() {
        return error_response(&e);
    }
    let username = payload.username.trim().to_string();
    let email = payload.email.trim().to_string();
    // A duplicate identifier is reported as Conflict before the secret is
    // even looked at. This check is advisory; the insert below remains the
    // atomic, authoritative uniqueness check.
    match identifier_taken(&state.store, &username, &email).await {
        Ok(false) => {}
        Ok(true) => {
            return error_response(&AppError::conflict("account_exists", "account already exists"))
        }
        Err(e) => {
            error!("register failed: {e}");
            return error_response(&e);
        }
    }
    if let Err(e) = payload.validate_secret() {
        return error_response(&e);
    }
    let secret_hash = match security::hash_secret(&payload.password) {
        Ok(h) => h,
        Err(e) => {
            error!("secret hashing failed: {e}");
            return error_response(&e);
        }
    };
    let account = NewAccount { username, email, secret_hash };
    match state.store.create(account).await {
        Ok(created) => {
            info!("account created: id={} username={}", created.id, created.username);
            (
                StatusCode::CREATED,
                Json(json!({"status": "ok", "user_id": created.id, "username": created.username})),
            )
        }
        Err(e) => {
            if matches!(e, AppError::Storage { .. } | AppError::Internal { .. }) {
                error!("register failed: {e}");
            }
            error_response(&e)
        }
    }
}

async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginPayload>, JsonRejection>,
) -> (StatusCode, Json<Value>) {
    let Json(payload) = match payload {
        Ok(p) => p,
        Err(_) => {
            return error_response(&AppError::invalid_input(
                "malformed_payload",
                "body must be a JSON object with identifier and password",
            ))
        }
    };
    if let Err(e) = payload.validate() {
        return error_response(&e);
    }
    match state.verifier.verify(payload.identifier.trim(), &payload.password).await {
        Ok(Verification::Authorized { account_id }) => {
            // Token issuance is an external collaborator; the caller only
            // learns which account authorized.
            (StatusCode::OK, Json(json!({"status": "ok", "user_id": account_id})))
        }
        Ok(Verification::Unauthorized) => {
            error_response(&AppError::unauthorized("invalid_credentials", "invalid credentials"))
        }
        Err(e) => {
            error!("login failed: {e}");
            error_response(&e)
        }
    }
}
