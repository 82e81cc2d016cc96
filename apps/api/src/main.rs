mod calls;
mod compose;
mod config;
mod context;
mod dispatch;
mod errors;
mod hoc;
mod inbound;
mod llm_client;
mod routes;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing or malformed env vars)
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

    info!("Starting HOC call bridge v{}", env!("CARGO_PKG_VERSION"));
    info!(
        "Agent {} via {} ({} mode), API {}",
        config.agent_id,
        config.telephony_provider.as_str(),
        config.outbound_call_mode.as_str(),
        config.elevenlabs_api_url
    );

    match &config.hirings_api_url {
        Some(url) => info!("Questionnaire API: {url}"),
        None => warn!("HIRINGS_API_URL not set, calls will run without questionnaire context"),
    }
    if config.webhook_api_key.is_none() {
        warn!("WEBHOOK_API_KEY not set, /trigger-call and /create-webrtc-link are unauthenticated");
    }
    if config.default_phone_number_id.is_none() {
        warn!("ELEVENLABS_AGENT_PHONE_NUMBER_ID not set, phone calls need agent_phone_number_id per request");
    }
    info!(
        "Inbound routing: {} mapped numbers, default campaign {:?}",
        config.inbound_campaigns.len(),
        config.inbound_campaigns.default_campaign()
    );

    // Build app state (HTTP clients and the soft-attribute extractor)
    let state = AppState::from_config(config.clone());

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
