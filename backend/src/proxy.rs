//! Transparent relay handlers for `/api/expenses`.
//!
//! No request shaping beyond passing the query string and JSON body
//! through: the client and the upstream script agree on the contract,
//! and this hop only exists to put the ledger behind our origin and
//! session boundary.

use axum::extract::{RawQuery, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::{json, Value};
use tracing::{error, info};

#[derive(Clone)]
pub struct AppState {
    pub http: reqwest::Client,
    pub upstream_url: String,
}

fn upstream_error(context: &str, e: impl std::fmt::Display) -> Response {
    error!("{}: {}", context, e);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": "Internal Server Error" })),
    )
        .into_response()
}

/// `GET /api/expenses[?query]` — forwarded verbatim.
pub async fn relay_get(State(state): State<AppState>, RawQuery(query): RawQuery) -> Response {
    let url = match query.as_deref() {
        Some(query) if !query.is_empty() => format!("{}?{}", state.upstream_url, query),
        _ => state.upstream_url.clone(),
    };
    info!(query = query.as_deref().unwrap_or(""), "relaying ledger fetch");

    let result = async {
        state
            .http
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .json::<Value>()
            .await
    }
    .await;

    match result {
        Ok(body) => (StatusCode::OK, Json(body)).into_response(),
        Err(e) => upstream_error("upstream fetch failed", e),
    }
}

/// `POST /api/expenses` — JSON body forwarded verbatim, response
/// relayed so the client sees the server's success/error report.
pub async fn relay_post(State(state): State<AppState>, Json(body): Json<Value>) -> Response {
    info!(action = body.get("action").and_then(serde_json::Value::as_str).unwrap_or("?"), "relaying ledger mutation");

    let result = async {
        state
            .http
            .post(&state.upstream_url)
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .json::<Value>()
            .await
    }
    .await;

    match result {
        Ok(body) => (StatusCode::OK, Json(body)).into_response(),
        Err(e) => upstream_error("upstream mutation failed", e),
    }
}
