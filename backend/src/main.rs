//! Same-origin relay for the kakeibo client.
//!
//! The spreadsheet script endpoint lives on another origin and knows
//! nothing about our session. This server forwards `/api/expenses`
//! traffic to it verbatim, enforces the session-marker boundary in
//! front of everything, and serves the built web assets.

use std::net::SocketAddr;
use std::path::PathBuf;

use axum::http::{HeaderValue, Method};
use axum::middleware;
use axum::routing::get;
use axum::Router;
use reqwest::header::{HeaderMap, CACHE_CONTROL};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tracing::{info, Level};

mod proxy;
mod session;

use proxy::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .init();

    let upstream_url = std::env::var("KAKEIBO_UPSTREAM_URL")
        .map_err(|_| anyhow::anyhow!("KAKEIBO_UPSTREAM_URL must point at the ledger endpoint"))?;
    let port: u16 = std::env::var("KAKEIBO_PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(3000);

    // Every upstream call must bypass intermediate HTTP caches.
    let mut headers = HeaderMap::new();
    headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-store"));
    let http = reqwest::Client::builder().default_headers(headers).build()?;

    let state = AppState { http, upstream_url };

    let cors = CorsLayer::new()
        .allow_origin("http://localhost:8080".parse::<HeaderValue>()?)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any);

    let api_routes = Router::new()
        .route("/expenses", get(proxy::relay_get).post(proxy::relay_post))
        .with_state(state);

    let mut app = Router::new().nest("/api", api_routes);
    if let Ok(static_dir) = std::env::var("KAKEIBO_STATIC_DIR") {
        app = app.fallback_service(ServeDir::new(PathBuf::from(static_dir)));
    }
    let app = app
        .layer(middleware::from_fn(session::require_session))
        .layer(cors);

    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
