pub mod handlers;
pub mod types;

use crate::{Result, config::Config, dify::DifyClient};
use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use handlers::AppState;
use std::{net::SocketAddr, sync::Arc};
use tower_http::trace::TraceLayer;
use tracing::info;

/// Room for multipart boundaries and the text fields next to the file.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

/// Routes of the proxy. `/workflow` accepts a document of up to
/// `max_upload_bytes` plus its form framing; other routes keep axum's
/// default limit.
pub fn router(state: AppState) -> Router {
    let workflow_body_limit = state.max_upload_bytes + MULTIPART_OVERHEAD_BYTES;

    Router::new()
        .route("/chat", post(handlers::chat))
        .route(
            "/workflow",
            post(handlers::workflow).layer(DefaultBodyLimit::max(workflow_body_limit)),
        )
        .route("/health", get(handlers::health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn run(config: Config) -> Result<()> {
    let dify = DifyClient::new(&config.dify)?;
    info!("Forwarding to Dify at {}", config.dify.base_url);

    let app_state = AppState::new(Arc::new(dify), &config);
    let app = router(app_state);

    let addr = SocketAddr::new(config.server.host.parse()?, config.server.port);

    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
