//! Session-marker boundary.
//!
//! Every protected route requires the session cookie. Its absence
//! yields a structured 401 for API calls and a login redirect for
//! pages, so the core never sees an unauthenticated request. Cookie
//! presence is the whole check here — issuing and verifying the
//! marker belongs to the login flow, not this relay.

use axum::extract::Request;
use axum::http::{header, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};
use axum::Json;
use serde_json::json;
use tracing::debug;

pub const SESSION_COOKIE: &str = "kakeibo_session";

fn has_session_cookie(req: &Request) -> bool {
    req.headers()
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .any(|cookie| {
            cookie
                .trim_start()
                .strip_prefix(SESSION_COOKIE)
                .is_some_and(|rest| rest.starts_with('='))
        })
}

/// The login page and plain asset files (favicon, icons, bundles) stay
/// reachable without a session; everything else is protected.
fn is_exempt(path: &str) -> bool {
    if path == "/login" || path.starts_with("/login/") {
        return true;
    }
    // Asset exemption never applies under /api/: the relay must reject
    // an unauthenticated /api/expenses.json just like /api/expenses.
    if path.starts_with("/api/") {
        return false;
    }
    path.rsplit('/').next().is_some_and(|segment| segment.contains('.'))
}

pub async fn require_session(req: Request, next: Next) -> Response {
    let path = req.uri().path();
    if is_exempt(path) || has_session_cookie(&req) {
        return next.run(req).await;
    }

    debug!(path = %path, "request without session marker");
    if path.starts_with("/api/") {
        (StatusCode::UNAUTHORIZED, Json(json!({ "error": "Unauthorized" }))).into_response()
    } else {
        Redirect::to("/login").into_response()
    }
}
