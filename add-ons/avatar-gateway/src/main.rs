//! Avatar Gateway: local HTTP surface over the streaming-avatar session service.
//! Binds to `bind_addr` (default 127.0.0.1:8000).

mod api_error;
mod handlers;

use std::sync::Arc;
use std::time::Instant;

use avatar_core::telemetry::{init_tracing, load_dotenv};
use avatar_core::{AvatarConfig, AvatarSessions, SessionRegistry};
use axum::{
    body::Body,
    http::Request,
    middleware::Next,
    response::Response,
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};

use handlers::avatar::{self, AppState};

#[tokio::main]
async fn main() {
    load_dotenv();
    init_tracing();

    if let Err(e) = run().await {
        tracing::error!(error = %e, "[AVATAR GATEWAY] fatal");
        eprintln!("[avatar-gateway] {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cfg = AvatarConfig::load()?;
    let registry = Arc::new(SessionRegistry::new());
    let sessions: AppState = Arc::new(AvatarSessions::from_config(&cfg, registry)?);

    let app = build_router(sessions);
    let listener = tokio::net::TcpListener::bind(&cfg.bind_addr).await?;
    tracing::info!(
        addr = %cfg.bind_addr,
        version = avatar_core::version(),
        "[AVATAR GATEWAY] listening"
    );
    axum::serve(listener, app).await?;
    Ok(())
}

pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/api/avatar/session", post(avatar::create_session))
        .route("/api/avatar/talk", post(avatar::talk))
        .route("/api/avatar/stop", post(avatar::stop))
        .route("/api/avatar/avatars", get(avatar::list_avatars))
        .with_state(state)
        .layer(cors)
        .layer(axum::middleware::from_fn(log_request))
}

async fn log_request(request: Request<Body>, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let started = Instant::now();
    let response = next.run(request).await;
    tracing::info!(
        %method,
        %path,
        status = response.status().as_u16(),
        latency_ms = started.elapsed().as_millis() as u64,
        "[AVATAR GATEWAY] request"
    );
    response
}

async fn health() -> &'static str {
    "OK"
}
