//! Student assignment dashboard backed by the Canvas LMS API.
//!
//! A request to `/api/canvas/assignments` runs one aggregation cycle: the
//! active course list is fetched, then every course's assignments are fetched
//! concurrently, joined with their course and sorted by due date. Nothing is
//! cached between requests.

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderValue, Method};
use axum::routing::get;
use axum_server::Handle;
use axum_server::tls_rustls::RustlsConfig;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::signal::ctrl_c;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

pub mod aggregate;
pub mod canvas;
pub mod config;
pub mod endpoints;
pub mod model;
pub mod view;

#[cfg(test)]
mod testing;

use crate::canvas::CanvasClient;
use crate::config::{Config, ConfigError, TlsConfig};

const SHUTDOWN_GRACE: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum ServerError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Server I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Shared by every handler; built once at start-up.
pub struct AppState {
    pub canvas: CanvasClient,
}

/// Builds the router. An empty `cors_origins` allows any origin.
pub fn app(state: Arc<AppState>, cors_origins: &[String]) -> Router {
    // `get` would also answer HEAD; the JSON routes accept GET only.
    let api = Router::new()
        .route(
            "/api/canvas/assignments",
            get(endpoints::get_assignments)
                .head(endpoints::method_not_allowed)
                .fallback(endpoints::method_not_allowed),
        )
        .route(
            "/api/canvas/courses",
            get(endpoints::get_courses)
                .head(endpoints::method_not_allowed)
                .fallback(endpoints::method_not_allowed),
        )
        .route(
            "/api/canvas/courses/{course_id}",
            get(endpoints::get_course)
                .head(endpoints::method_not_allowed)
                .fallback(endpoints::method_not_allowed),
        )
        .route(
            "/assignments",
            get(endpoints::dashboard).fallback(endpoints::method_not_allowed),
        )
        .route("/health", get(endpoints::health));

    api.layer(cors_layer(cors_origins))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let allow_origin = if origins.is_empty() {
        AllowOrigin::any()
    } else {
        let parsed = origins
            .iter()
            .filter_map(|origin| match HeaderValue::from_str(origin) {
                Ok(value) => Some(value),
                Err(_) => {
                    warn!("Ignoring invalid CORS origin: {origin}");
                    None
                }
            })
            .collect::<Vec<_>>();
        AllowOrigin::list(parsed)
    };

    CorsLayer::new()
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .allow_origin(allow_origin)
        .max_age(Duration::from_secs(60 * 60))
}

/// Builds the LMS client and serves until Ctrl+C or SIGTERM.
pub async fn run(config: Config) -> Result<(), ServerError> {
    let canvas = CanvasClient::new(&config.canvas)?;
    info!("Canvas client configured for {}", config.canvas.api_url);

    let state = Arc::new(AppState { canvas });
    let app = app(state, &config.cors_origins);

    match &config.tls {
        Some(tls) => serve_tls(app, &config, tls).await,
        None => {
            let listener = TcpListener::bind(config.addr).await?;
            info!("Server running on http://{}", config.addr);

            axum::serve(listener, app)
                .with_graceful_shutdown(shutdown_signal())
                .await?;
            info!("Server shut down");
            Ok(())
        }
    }
}

async fn serve_tls(app: Router, config: &Config, tls: &TlsConfig) -> Result<(), ServerError> {
    // Only aws-lc-rs is compiled in; an earlier install is fine too.
    let _ = rustls::crypto::aws_lc_rs::default_provider().install_default();

    let rustls_config = RustlsConfig::from_pem_file(&tls.cert, &tls.key).await?;

    let handle = Handle::new();
    let shutdown = handle.clone();
    tokio::spawn(async move {
        shutdown_signal().await;
        shutdown.graceful_shutdown(Some(SHUTDOWN_GRACE));
    });

    info!("Server running on https://{}", config.addr);
    axum_server::bind_rustls(config.addr, rustls_config)
        .handle(handle)
        .serve(app.into_make_service())
        .await?;
    info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C, shutting down"),
            Err(e) => {
                error!("Failed to install Ctrl+C handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                error!("Failed to install terminate handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
