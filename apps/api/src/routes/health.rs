use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET /health
/// Service identity and the configured upstreams. Never includes secrets.
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "agent_id": state.config.agent_id,
        "hirings_api_url": state.hoc.base_url(),
        "telephony_provider": state.config.telephony_provider.as_str(),
        "outbound_call_mode": state.config.outbound_call_mode.as_str(),
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}
