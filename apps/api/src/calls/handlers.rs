//! Axum route handlers for HOC-facing call triggers.

use axum::{
    body::Bytes,
    extract::{Path, State},
    Json,
};
use serde_json::{json, Map, Value};
use tracing::{info, warn};

use crate::calls::pipeline::{prepare, Prepared};
use crate::calls::request::CallRequest;
use crate::context::extract_structural;
use crate::dispatch::{dispatch, Channel, DispatchResult};
use crate::errors::AppError;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /trigger-call
///
/// Phone number present → outbound call; absent → browser link.
pub async fn handle_trigger_call(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<Value>, AppError> {
    let request = CallRequest::from_body(&body)?;
    let channel = request.channel(
        state.config.default_phone_number_id.as_deref(),
        state.config.webrtc_signed_url,
    )?;
    run(&state, &request, channel).await
}

/// POST /create-webrtc-link
///
/// Always a browser link; any `to_number` in the body is ignored.
pub async fn handle_create_webrtc_link(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<Value>, AppError> {
    let request = CallRequest::from_body(&body)?;
    if request.to_number.is_some() {
        warn!("create-webrtc-link ignores to_number for campaign {}", request.campaign_id);
    }
    run(&state, &request, Channel::BrowserLink { try_signed_url: true }).await
}

/// GET /test-questionnaire/:campaign_id
///
/// Diagnostics: the normalized questionnaire plus the rule-only extraction.
pub async fn handle_test_questionnaire(
    State(state): State<AppState>,
    Path(campaign_id): Path<i64>,
) -> Result<Json<Value>, AppError> {
    let Some(questionnaire) = state.hoc.fetch_questionnaire(campaign_id).await else {
        return Err(AppError::NotFound(format!(
            "No questionnaire data available for campaign {campaign_id}"
        )));
    };

    let extracted = extract_structural(&questionnaire).summary();
    Ok(Json(json!({
        "status": "success",
        "campaign_id": campaign_id,
        "questions_count": questionnaire.questions.len(),
        "questionnaire": questionnaire,
        "extracted": extracted,
    })))
}

// ────────────────────────────────────────────────────────────────────────────
// Helpers
// ────────────────────────────────────────────────────────────────────────────

async fn run(
    state: &AppState,
    request: &CallRequest,
    channel: Channel,
) -> Result<Json<Value>, AppError> {
    info!(
        "Call trigger: campaign {}, candidate {} {}, company {}, channel {}",
        request.campaign_id,
        request.candidate_first_name,
        request.candidate_last_name,
        request.company_name,
        match &channel {
            Channel::Telephony { .. } => "telephony",
            Channel::BrowserLink { .. } => "browser",
        }
    );

    let recipient = request.recipient();
    let prepared = prepare(state, &recipient, request.override_prompt.as_deref()).await;
    let result = dispatch(
        &state.config,
        &state.voice,
        channel,
        &prepared.variables,
        &prepared.message,
    )
    .await?;

    Ok(Json(success_envelope(request, &prepared, &result)))
}

fn success_envelope(request: &CallRequest, prepared: &Prepared, result: &DispatchResult) -> Value {
    let mut data = Map::new();
    data.insert("campaign_id".to_string(), json!(request.campaign_id));
    data.insert(
        "candidate".to_string(),
        json!(request.recipient().full_name()),
    );
    data.insert("company".to_string(), json!(request.company_name));
    data.insert(
        "questionnaire_loaded".to_string(),
        json!(prepared.questionnaire_loaded()),
    );
    data.insert(
        "questions_count".to_string(),
        json!(prepared.questionnaire.questions.len()),
    );
    data.insert(
        "prompt_chars".to_string(),
        json!(prepared.message.system_prompt.chars().count()),
    );
    data.insert(
        "first_message".to_string(),
        json!(prepared.message.first_message),
    );
    data.insert("context".to_string(), prepared.context.summary());
    data.insert(
        "timestamp".to_string(),
        json!(chrono::Utc::now().to_rfc3339()),
    );
    data.extend(result.fields());

    json!({
        "status": "success",
        "method": result.method(),
        "data": data,
    })
}
