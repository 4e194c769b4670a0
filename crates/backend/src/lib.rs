//! Agent console backend: session gate, cookie relay and the protected API surface.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    http::{header, Method},
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};

pub mod auth;
pub mod config;
pub mod error;
mod handlers;

use crate::auth::{session_gate, JwtVerifier, RouteTable, SessionGate};
use crate::config::AppConfig;

/// Timeout for calls to the upstream auth backend.
const UPSTREAM_TIMEOUT_SECS: u64 = 10;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub gate: SessionGate,
    pub http: reqwest::Client,
}

impl AppState {
    pub fn new(config: AppConfig) -> anyhow::Result<Self> {
        let verifier = JwtVerifier::new(config.auth.clone());

        Ok(Self {
            gate: SessionGate::new(Arc::new(verifier), RouteTable::default()),
            http: reqwest::Client::builder()
                .timeout(Duration::from_secs(UPSTREAM_TIMEOUT_SECS))
                .build()?,
            config: Arc::new(config),
        })
    }
}

/// Assemble the application router.
///
/// The session gate wraps every route, including the static frontend
/// fallback, so page requests are classified the same way as API calls.
pub fn build_router(state: AppState) -> Router {
    let app = Router::new()
        .route("/health", get(handlers::health_check))
        .route("/auth/login", post(handlers::relay_login))
        .route("/api/v1/session", get(handlers::session_info));

    // Serve static frontend files if the directory exists
    let frontend_dir = &state.config.frontend_dir;
    let app = if std::path::Path::new(frontend_dir).exists() {
        tracing::info!("Serving frontend from {}", frontend_dir);
        let index_path = format!("{}/index.html", frontend_dir);
        let serve_dir = ServeDir::new(frontend_dir).not_found_service(ServeFile::new(&index_path));
        app.fallback_service(serve_dir)
    } else {
        tracing::info!(
            "Frontend directory not found at {}, serving API only",
            frontend_dir
        );
        app
    };

    app.layer(middleware::from_fn_with_state(
        state.gate.clone(),
        session_gate,
    ))
    .layer(TraceLayer::new_for_http())
    .layer(build_cors_layer(state.config.cors_allowed_origins.as_deref()))
    .with_state(state)
}

/// Build CORS layer from the configured origin list.
///
/// If no origins are configured, defaults to permissive CORS (for development only).
fn build_cors_layer(allowed_origins: Option<&str>) -> CorsLayer {
    match allowed_origins {
        Some(origins) => {
            let origins: Vec<_> = origins
                .split(',')
                .filter_map(|s| s.trim().parse().ok())
                .collect();

            if origins.is_empty() {
                tracing::warn!(
                    "CORS_ALLOWED_ORIGINS is set but empty, using permissive CORS (not recommended for production)"
                );
                CorsLayer::permissive()
            } else {
                tracing::info!("CORS configured for origins: {:?}", origins);
                CorsLayer::new()
                    .allow_origin(AllowOrigin::list(origins))
                    .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
                    .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
                    .allow_credentials(true)
            }
        }
        None => {
            tracing::warn!(
                "CORS_ALLOWED_ORIGINS not set, using permissive CORS (not recommended for production)"
            );
            CorsLayer::permissive()
        }
    }
}
