mod config;
mod errors;
mod gateway;
mod llm_client;
mod models;
mod routes;
mod session;
mod state;
mod views;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::gateway::{GatewayModels, GeminiGateway};
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::session::{SessionController, SessionStore};
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails only on malformed values)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting JobSuit API v{}", env!("CARGO_PKG_VERSION"));

    if !config.has_credentials() {
        warn!("GEMINI_API_KEY is not set; upload, analysis and rewrite requests will be refused");
    }

    // Initialize LLM client and gateway
    let llm = LlmClient::new(
        config.gemini_api_key.clone(),
        &config.gemini_base_url,
        config.llm_timeout(),
    )?;
    let models = GatewayModels {
        parse: config.parse_model.clone(),
        analysis: config.analysis_model.clone(),
        rewrite: config.rewrite_model.clone(),
    };
    info!(
        "Gemini gateway initialized (parse: {}, analysis: {}, rewrite: {})",
        models.parse, models.analysis, models.rewrite
    );
    let gateway = Arc::new(GeminiGateway::new(
        llm,
        models,
        config.analysis_thinking_budget,
    ));

    let controller = SessionController::new(gateway, config.retain_analysis_on_failure);

    // Idle sessions are reclaimed in the background
    let sessions = SessionStore::default();
    sessions.spawn_evictor(config.session_ttl(), config.session_sweep_interval());
    info!("Session TTL: {}s", config.session_ttl_secs);

    // Build app state
    let state = AppState {
        config: config.clone(),
        sessions,
        controller,
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
