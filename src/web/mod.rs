mod comments;
mod error;
mod routes;

pub use error::{ApiError, COMMENT_NOT_FOUND, POST_NOT_FOUND};

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::http::HeaderValue;
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::config::Config;
use crate::db::Database;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub config: Arc<Config>,
}

/// Start the web server and run until `shutdown` resolves.
///
/// In-flight requests are allowed to finish before this returns; closing the
/// database is left to the caller.
///
/// # Errors
///
/// Returns an error if the server fails to start.
pub async fn serve<F>(config: Config, db: Database, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr: SocketAddr = format!("{}:{}", config.web_host, config.web_port)
        .parse()
        .context("Invalid web server address")?;

    let state = AppState {
        db,
        config: Arc::new(config),
    };

    let app = create_app(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind web server")?;

    info!(addr = %addr, "Server is running");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .context("Web server error")?;

    Ok(())
}

/// Create the main application router.
pub fn create_app(state: AppState) -> Router {
    let cors = cors_layer(state.config.cors_allow_origin.as_deref());

    Router::new()
        .merge(routes::router())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Build the CORS policy: any origin unless a single one is configured.
fn cors_layer(allow_origin: Option<&str>) -> CorsLayer {
    match allow_origin {
        None => CorsLayer::permissive(),
        Some(origin) => match HeaderValue::from_str(origin) {
            Ok(origin) => CorsLayer::new()
                .allow_origin(origin)
                .allow_methods(Any)
                .allow_headers(Any),
            Err(e) => {
                // Config::validate rejects this; deny cross-origin requests if it slips through
                error!(origin, "Invalid CORS origin: {e}");
                CorsLayer::new()
            }
        },
    }
}
