//! Axum route handlers for provider-facing webhooks.
//!
//! Both endpoints answer 200 whatever happens; the provider does not tolerate errors here.

use std::collections::BTreeMap;

use axum::{body::Bytes, extract::State, Json};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::calls::pipeline::prepare_with;
use crate::compose::{ComposedMessage, Recipient};
use crate::state::AppState;

pub const FALLBACK_PROMPT: &str = "Du bist eine freundliche digitale Recruiting-Assistenz. \
Finde heraus, für welche Stelle sich die anrufende Person interessiert, \
und beantworte ihre Fragen kurz und hilfsbereit.";

pub const FALLBACK_FIRST_MESSAGE: &str =
    "Hallo, hier ist die digitale Recruiting-Assistenz. Wie kann ich Ihnen helfen?";

// ────────────────────────────────────────────────────────────────────────────
// Request types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct InboundCallPayload {
    pub caller_id: Option<String>,
    pub agent_id: Option<String>,
    pub called_number: Option<String>,
    pub call_sid: Option<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /inbound-call-personalization
pub async fn handle_inbound_personalization(
    State(state): State<AppState>,
    body: Bytes,
) -> Json<Value> {
    let payload: InboundCallPayload = match serde_json::from_slice(&body) {
        Ok(payload) => payload,
        Err(e) => {
            warn!("Inbound personalization body not understood, using fallback: {e}");
            return Json(fallback_payload(&state));
        }
    };
    info!(
        "Inbound call {:?} from {:?} to {:?} (agent {:?})",
        payload.call_sid, payload.caller_id, payload.called_number, payload.agent_id
    );

    let Some(campaign_id) = state
        .config
        .inbound_campaigns
        .resolve(payload.called_number.as_deref())
    else {
        info!("No campaign configured for inbound call, using fallback");
        return Json(fallback_payload(&state));
    };

    let budget = state.config.inbound_timeout;
    match tokio::time::timeout(budget, personalize(&state, campaign_id)).await {
        Ok(payload) => Json(payload),
        Err(_) => {
            warn!(
                "Inbound personalization for campaign {campaign_id} exceeded {}ms, using fallback",
                budget.as_millis()
            );
            Json(fallback_payload(&state))
        }
    }
}

async fn personalize(state: &AppState, campaign_id: i64) -> Value {
    let fetched = state.hoc.fetch_questionnaire(campaign_id).await;
    let company_name = fetched
        .as_ref()
        .and_then(|q| q.company_name.clone())
        .unwrap_or_else(|| state.config.inbound_company_name.clone());

    let recipient = Recipient {
        campaign_id: Some(campaign_id),
        company_name: &company_name,
        first_name: "",
        last_name: "",
    };
    let prepared = prepare_with(state, fetched, &recipient, None).await;

    info!(
        "Inbound call personalized with campaign {campaign_id} ({} questions)",
        prepared.questionnaire.questions.len()
    );
    initiation_payload(
        &prepared.variables,
        &prepared.message,
        &state.config.agent_language,
    )
}

/// POST /telephony-status
///
/// Form-encoded status callbacks; logged and acknowledged.
pub async fn handle_telephony_status(body: Bytes) -> Json<Value> {
    let fields: BTreeMap<String, String> = url::form_urlencoded::parse(&body)
        .into_owned()
        .collect();

    match (fields.get("CallSid"), fields.get("CallStatus")) {
        (Some(sid), Some(status)) => info!(
            "Telephony status: call {sid} is {status} (to {:?}, from {:?}, duration {:?})",
            fields.get("To"),
            fields.get("From"),
            fields.get("CallDuration")
        ),
        _ => warn!(
            "Telephony status callback without CallSid/CallStatus ({} bytes), ignored",
            body.len()
        ),
    }

    Json(json!({ "status": "received" }))
}

// ────────────────────────────────────────────────────────────────────────────
// Payloads
// ────────────────────────────────────────────────────────────────────────────

fn initiation_payload(
    variables: &BTreeMap<String, String>,
    message: &ComposedMessage,
    language: &str,
) -> Value {
    json!({
        "type": "conversation_initiation_client_data",
        "dynamic_variables": variables,
        "conversation_config_override": {
            "agent": {
                "prompt": { "prompt": message.system_prompt },
                "first_message": message.first_message,
                "language": language,
            }
        }
    })
}

fn fallback_payload(state: &AppState) -> Value {
    let mut variables = BTreeMap::new();
    variables.insert(
        "companyname".to_string(),
        state.config.inbound_company_name.clone(),
    );
    let message = ComposedMessage {
        system_prompt: FALLBACK_PROMPT.to_string(),
        first_message: FALLBACK_FIRST_MESSAGE.to_string(),
        prompt_overridden: false,
    };
    initiation_payload(&variables, &message, &state.config.agent_language)
}
