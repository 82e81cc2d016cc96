//! Voice-agent platform client: outbound calls and signed conversation URLs.
//!
//! Single attempt per call. The caller decides whether a failure is fatal.

use std::collections::BTreeMap;
use std::time::Duration;

use reqwest::Client;
use serde::Serialize;
use serde_json::{json, Value};
use thiserror::Error;
use tracing::{debug, info};

use crate::compose::ComposedMessage;
use crate::config::{OutboundCallMode, TelephonyProvider};

#[derive(Debug, Error)]
pub enum VoiceAgentError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("voice agent platform timed out")]
    Timeout,

    /// Carries the provider's own message verbatim.
    #[error("{message}")]
    Provider { status: u16, message: String },

    #[error("unexpected response from voice agent platform: {0}")]
    Parse(String),
}

/// Personalization for one outbound call, in exactly one of the two accepted shapes.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientData {
    DynamicVariables(BTreeMap<String, String>),
    ConfigOverride {
        prompt: String,
        first_message: String,
        language: String,
    },
}

impl ClientData {
    pub fn build(
        mode: OutboundCallMode,
        variables: &BTreeMap<String, String>,
        message: &ComposedMessage,
        language: &str,
    ) -> Self {
        match mode {
            OutboundCallMode::DynamicVariables => {
                let mut variables = variables.clone();
                variables.insert("system_prompt".to_string(), message.system_prompt.clone());
                ClientData::DynamicVariables(variables)
            }
            OutboundCallMode::ConfigOverride => ClientData::ConfigOverride {
                prompt: message.system_prompt.clone(),
                first_message: message.first_message.clone(),
                language: language.to_string(),
            },
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            ClientData::DynamicVariables(variables) => json!({ "dynamic_variables": variables }),
            ClientData::ConfigOverride {
                prompt,
                first_message,
                language,
            } => json!({
                "conversation_config_override": {
                    "agent": {
                        "prompt": { "prompt": prompt },
                        "first_message": first_message,
                        "language": language,
                    }
                }
            }),
        }
    }
}

#[derive(Debug, Clone)]
pub struct OutboundCall<'a> {
    pub agent_id: &'a str,
    pub agent_phone_number_id: &'a str,
    pub to_number: &'a str,
    pub client_data: ClientData,
}

/// What the provider reported for a placed call, unmodified.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CallHandle {
    pub conversation_id: Option<String>,
    pub status: Option<String>,
    pub call_sid: Option<String>,
    pub message: Option<String>,
}

impl CallHandle {
    fn from_response(body: &Value) -> Self {
        let field = |keys: &[&str]| {
            keys.iter()
                .find_map(|k| body.get(*k).and_then(Value::as_str))
                .map(str::to_string)
        };
        CallHandle {
            conversation_id: field(&["conversation_id"]),
            status: field(&["status"]),
            call_sid: field(&["callSid", "sip_call_id", "call_sid"]),
            message: field(&["message"]),
        }
    }
}

#[derive(Clone)]
pub struct VoiceAgentClient {
    client: Client,
    api_url: String,
    api_key: String,
}

impl VoiceAgentClient {
    pub fn new(api_url: String, api_key: String, timeout: Duration) -> Self {
        Self {
            client: Client::builder()
                .timeout(timeout)
                .build()
                .expect("Failed to build HTTP client"),
            api_url: api_url.trim_end_matches('/').to_string(),
            api_key,
        }
    }

    /// `POST /v1/convai/{sip-trunk|twilio}/outbound-call`
    pub async fn outbound_call(
        &self,
        provider: TelephonyProvider,
        call: &OutboundCall<'_>,
    ) -> Result<CallHandle, VoiceAgentError> {
        let operation = match provider {
            TelephonyProvider::SipTrunk => "sip-trunk",
            TelephonyProvider::Twilio => "twilio",
        };
        let url = format!("{}/v1/convai/{operation}/outbound-call", self.api_url);
        let body = json!({
            "agent_id": call.agent_id,
            "agent_phone_number_id": call.agent_phone_number_id,
            "to_number": call.to_number,
            "conversation_initiation_client_data": call.client_data.to_json(),
        });

        info!("Placing {} outbound call to {}", provider.as_str(), call.to_number);
        let response = self
            .client
            .post(&url)
            .header("xi-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(classify)?;

        let status = response.status();
        let text = response.text().await.map_err(classify)?;
        let parsed: Option<Value> = serde_json::from_str(&text).ok();

        let rejected = parsed
            .as_ref()
            .and_then(|v| v.get("success"))
            .and_then(Value::as_bool)
            == Some(false);
        if !status.is_success() || rejected {
            return Err(VoiceAgentError::Provider {
                status: status.as_u16(),
                message: provider_message(parsed.as_ref(), &text),
            });
        }

        let parsed = parsed.ok_or_else(|| VoiceAgentError::Parse(text.clone()))?;
        let handle = CallHandle::from_response(&parsed);
        debug!("Outbound call accepted: {handle:?}");
        Ok(handle)
    }

    /// `GET /v1/convai/conversation/get-signed-url?agent_id=...`
    pub async fn signed_url(&self, agent_id: &str) -> Result<String, VoiceAgentError> {
        let url = format!("{}/v1/convai/conversation/get-signed-url", self.api_url);
        let response = self
            .client
            .get(&url)
            .header("xi-api-key", &self.api_key)
            .query(&[("agent_id", agent_id)])
            .send()
            .await
            .map_err(classify)?;

        let status = response.status();
        let text = response.text().await.map_err(classify)?;
        let parsed: Option<Value> = serde_json::from_str(&text).ok();
        if !status.is_success() {
            return Err(VoiceAgentError::Provider {
                status: status.as_u16(),
                message: provider_message(parsed.as_ref(), &text),
            });
        }

        parsed
            .as_ref()
            .and_then(|v| v.get("signed_url"))
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .ok_or(VoiceAgentError::Parse(text))
    }
}

/// `detail.message`, then `detail` as a string, then `message`, then the raw body.
fn provider_message(parsed: Option<&Value>, raw: &str) -> String {
    let from_json = parsed.and_then(|v| {
        v.pointer("/detail/message")
            .and_then(Value::as_str)
            .or_else(|| v.get("detail").and_then(Value::as_str))
            .or_else(|| v.get("message").and_then(Value::as_str))
    });
    match from_json {
        Some(message) => message.to_string(),
        None if raw.trim().is_empty() => "voice agent platform returned an empty error".to_string(),
        None => raw.trim().to_string(),
    }
}

fn classify(e: reqwest::Error) -> VoiceAgentError {
    if e.is_timeout() {
        VoiceAgentError::Timeout
    } else {
        VoiceAgentError::Http(e)
    }
}
