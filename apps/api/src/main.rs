mod auth;
mod config;
mod errors;
mod in_flight;
mod llm_client;
mod models;
mod routes;
mod state;
mod tools;

use anyhow::{Context, Result};
use axum::http::HeaderValue;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::auth::{HostedIdentityVerifier, IdentityVerifier, UnconfiguredVerifier};
use crate::config::Config;
use crate::in_flight::InFlightRegistry;
use crate::llm_client::transport::GeminiTransport;
use crate::llm_client::GenerationClient;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting ContentIQ API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize generation client
    let transport = GeminiTransport::new(config.gemini_api_key.clone(), llm_client::MODEL);
    let llm = GenerationClient::new(Arc::new(transport));
    info!(
        "Generation client initialized (model: {}, {} attempts max)",
        llm_client::MODEL,
        llm.policy().max_attempts
    );

    // Initialize identity verifier
    let identity: Arc<dyn IdentityVerifier> = match &config.identity_api_key {
        Some(key) => {
            info!("Identity verifier initialized");
            Arc::new(HostedIdentityVerifier::new(key.clone()))
        }
        None => {
            warn!("IDENTITY_API_KEY is not set; protected routes will refuse every request");
            Arc::new(UnconfiguredVerifier)
        }
    };

    // Build app state
    let state = AppState {
        llm,
        identity,
        in_flight: Arc::new(InFlightRegistry::new()),
        config: config.clone(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&config)?);

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Restricted to `CORS_ALLOWED_ORIGIN` when set, permissive otherwise.
fn cors_layer(config: &Config) -> Result<CorsLayer> {
    match &config.cors_allowed_origin {
        Some(origin) => {
            let origin: HeaderValue = origin
                .parse()
                .context("CORS_ALLOWED_ORIGIN must be a valid header value")?;
            info!("CORS restricted to {:?}", origin);
            Ok(CorsLayer::new()
                .allow_origin(origin)
                .allow_methods(tower_http::cors::Any)
                .allow_headers(tower_http::cors::Any))
        }
        None => Ok(CorsLayer::permissive()),
    }
}
