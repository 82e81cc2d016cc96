pub mod auth;
pub mod health;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use crate::calls::handlers as calls;
use crate::inbound::handlers as inbound;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    // HOC-facing triggers require the webhook key
    let triggers = Router::new()
        .route("/trigger-call", post(calls::handle_trigger_call))
        .route("/create-webrtc-link", post(calls::handle_create_webrtc_link))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_api_key,
        ));

    Router::new()
        .route("/health", get(health::health_handler))
        .route(
            "/test-questionnaire/:campaign_id",
            get(calls::handle_test_questionnaire),
        )
        // Provider callbacks
        .route(
            "/inbound-call-personalization",
            post(inbound::handle_inbound_personalization),
        )
        .route("/telephony-status", post(inbound::handle_telephony_status))
        .merge(triggers)
        .with_state(state)
}
