//!
//! podium HTTP server
//! ------------------
//! This module defines the Axum-based HTTP API for the account and leaderboard
//! service.
//!
//! Responsibilities:
//! - Signup and login endpoints backed by the `security` module, both
//!   returning a JWT bearer token.
//! - Authenticated score submission and the unauthenticated, paginated
//!   leaderboard read.
//! - Startup logging and server binding.

use std::{collections::HashMap, net::SocketAddr};

use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info};

use crate::error::AppError;
use crate::storage::SharedStore;
use crate::token::TokenKeys;
use crate::{leaderboard, security};

/// Shared server state injected into all handlers.
///
/// Holds the global `SharedStore` handle and the process-wide token keys. The
/// keys are constructed once at startup and read-only afterwards.
#[derive(Clone)]
pub struct AppState {
    pub store: SharedStore,
    pub keys: TokenKeys,
}

/// Decoded signup/login body. Both fields are optional at the edge so the
/// core can report missing fields itself instead of failing JSON extraction.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CredentialsPayload {
    user_handle: Option<String>,
    password: Option<String>,
}

/// Build the service router for the given state.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(|| async { "podium ok" }))
        .route("/signup", post(signup))
        .route("/login", post(login))
        .route("/high-scores", get(get_high_scores).post(post_high_score))
        .with_state(state)
}

/// Start the podium HTTP server bound to the given port.
///
/// The signing secret is injected by the caller; the store starts empty and
/// lives for the lifetime of the process.
pub async fn run_with_port(http_port: u16, secret: &[u8]) -> anyhow::Result<()> {
    let state = AppState { store: SharedStore::new(), keys: TokenKeys::from_secret(secret) };
    let app = router(state);

    let addr: SocketAddr = format!("0.0.0.0:{}", http_port).parse()?;
    info!("Starting server on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Convenience entry point using the default port and signing secret.
pub async fn run() -> anyhow::Result<()> {
    run_with_port(3000, b"mysecret").await
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let raw = headers.get("authorization")?;
    let s = raw.to_str().ok()?;
    let (scheme, value) = s.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let value = value.trim();
    if value.is_empty() { None } else { Some(value.to_string()) }
}

fn error_response(err: &AppError) -> (StatusCode, Json<serde_json::Value>) {
    if matches!(err, AppError::Internal { .. }) {
        error!("request failed: {err}");
    }
    let status = StatusCode::from_u16(err.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(json!({"message": err.message()})))
}

async fn signup(State(state): State<AppState>, Json(payload): Json<CredentialsPayload>) -> impl IntoResponse {
    match security::register(
        &state.store,
        &state.keys,
        payload.user_handle.as_deref(),
        payload.password.as_deref(),
    ) {
        Ok(token) => (StatusCode::CREATED, Json(json!({"jsonWebToken": token}))),
        Err(e) => error_response(&e),
    }
}

async fn login(State(state): State<AppState>, Json(payload): Json<CredentialsPayload>) -> impl IntoResponse {
    match security::login(
        &state.store,
        &state.keys,
        payload.user_handle.as_deref(),
        payload.password.as_deref(),
    ) {
        Ok(token) => (StatusCode::CREATED, Json(json!({"jsonWebToken": token}))),
        Err(e) => error_response(&e),
    }
}

async fn get_high_scores(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> impl IntoResponse {
    let level = params.get("level").map(String::as_str);
    let page = leaderboard::parse_page(params.get("page").map(String::as_str));
    let rows = leaderboard::query(&state.store, level, page);
    (StatusCode::OK, Json(json!(rows)))
}

async fn post_high_score(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<leaderboard::SubmitPayload>,
) -> impl IntoResponse {
    let identity = match security::authenticate(&state.store, &state.keys, bearer_token(&headers).as_deref()) {
        Ok(identity) => identity,
        Err(e) => return error_response(&e),
    };
    match leaderboard::submit(&state.store, &identity, &payload) {
        Ok(()) => (StatusCode::CREATED, Json(json!({"message": "High score added."}))),
        Err(e) => error_response(&e),
    }
}
