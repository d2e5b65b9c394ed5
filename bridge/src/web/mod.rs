//! HTTP API consumed by the schema explorer UI
//!
//! | Route          | Purpose                                |
//! |----------------|----------------------------------------|
//! | `GET /schema`  | live schema JSON (fail-soft)           |
//! | `POST /ddl`    | create/drop tables, add/drop columns   |
//! | `POST /chat`   | question -> SQL -> executed result     |
//! | `POST /query`  | raw SQL execution                      |
//! | `GET /health`  | liveness and configured model          |

pub mod api;
pub mod state;

use anyhow::{Context, Result};
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use state::AppState;

/// Start the web server and run until the listener fails
pub async fn serve(state: AppState) -> Result<()> {
    let addr = format!("{}:{}", state.config.server.host, state.config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    tracing::info!(
        "Starting web server on http://{} (model {})",
        listener.local_addr()?,
        state.generator.model()
    );

    axum::serve(listener, create_router(state)).await?;
    Ok(())
}

/// Create the router with all routes
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/schema", get(api::get_schema))
        .route("/ddl", post(api::apply_ddl))
        .route("/chat", post(api::chat))
        .route("/query", post(api::run_query))
        .route("/health", get(api::health_check))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
