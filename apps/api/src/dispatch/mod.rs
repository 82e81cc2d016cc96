//! Channel Dispatcher: places a phone call or mints a browser link.
//!
//! The branch is chosen once per request from the presence of a destination
//! number. There is no fallthrough between branches.

use std::collections::BTreeMap;

use serde_json::{json, Map, Value};
use tracing::{error, info, warn};

use crate::compose::ComposedMessage;
use crate::config::Config;
use crate::errors::AppError;

pub mod voice_agent;
pub mod webrtc;

use voice_agent::{CallHandle, ClientData, OutboundCall, VoiceAgentClient, VoiceAgentError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Channel {
    Telephony {
        to_number: String,
        agent_phone_number_id: String,
    },
    BrowserLink {
        /// Whether to ask the platform for a signed join URL first.
        try_signed_url: bool,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum DispatchResult {
    Telephony {
        to_number: String,
        agent_phone_number_id: String,
        handle: CallHandle,
    },
    BrowserLink {
        agent_id: String,
        browser_url: String,
        signed_url: Option<String>,
    },
}

impl DispatchResult {
    pub fn method(&self) -> &'static str {
        match self {
            DispatchResult::Telephony { .. } => "telephony_call",
            DispatchResult::BrowserLink { .. } => "webrtc_browser_link",
        }
    }

    /// Branch-specific keys merged into the success envelope's `data`.
    pub fn fields(&self) -> Map<String, Value> {
        let value = match self {
            DispatchResult::Telephony {
                to_number,
                agent_phone_number_id,
                handle,
            } => json!({
                "to_number": to_number,
                "agent_phone_number_id": agent_phone_number_id,
                "conversation_id": handle.conversation_id,
                "call_status": handle.status,
                "call_sid": handle.call_sid,
                "provider_message": handle.message,
            }),
            DispatchResult::BrowserLink {
                agent_id,
                browser_url,
                signed_url,
            } => {
                let link_type = if signed_url.is_some() {
                    "signed"
                } else {
                    "parameterized"
                };
                let mut fields = json!({
                    "agent_id": agent_id,
                    "browser_url": browser_url,
                    "link_type": link_type,
                });
                if let Some(signed) = signed_url {
                    fields["signed_url"] = json!(signed);
                }
                fields
            }
        };
        match value {
            Value::Object(map) => map,
            _ => Map::new(),
        }
    }
}

pub async fn dispatch(
    config: &Config,
    voice: &VoiceAgentClient,
    channel: Channel,
    variables: &BTreeMap<String, String>,
    message: &ComposedMessage,
) -> Result<DispatchResult, AppError> {
    match channel {
        Channel::Telephony {
            to_number,
            agent_phone_number_id,
        } => {
            let call = OutboundCall {
                agent_id: &config.agent_id,
                agent_phone_number_id: &agent_phone_number_id,
                to_number: &to_number,
                client_data: ClientData::build(
                    config.outbound_call_mode,
                    variables,
                    message,
                    &config.agent_language,
                ),
            };
            let handle = voice
                .outbound_call(config.telephony_provider, &call)
                .await
                .map_err(|e| {
                    match &e {
                        VoiceAgentError::Provider { status, message } => {
                            error!("Outbound call to {to_number} rejected (status {status}): {message}")
                        }
                        other => error!("Outbound call to {to_number} failed: {other}"),
                    }
                    AppError::Dispatch(e.to_string())
                })?;
            info!(
                "Outbound call placed: conversation_id={:?}, status={:?}",
                handle.conversation_id, handle.status
            );
            Ok(DispatchResult::Telephony {
                to_number,
                agent_phone_number_id,
                handle,
            })
        }
        Channel::BrowserLink { try_signed_url } => {
            let browser_url = webrtc::browser_url(&config.talk_url, &config.agent_id, variables)
                .map_err(|e| {
                    AppError::Internal(anyhow::anyhow!(
                        "ELEVENLABS_TALK_URL '{}' is not a valid URL: {e}",
                        config.talk_url
                    ))
                })?;

            let signed_url = if try_signed_url {
                match voice.signed_url(&config.agent_id).await {
                    Ok(url) => Some(url),
                    Err(e) => {
                        warn!("Signed URL unavailable, returning parameterized link: {e}");
                        None
                    }
                }
            } else {
                None
            };

            info!(
                "Browser link created ({} chars, signed: {})",
                browser_url.as_str().len(),
                signed_url.is_some()
            );
            Ok(DispatchResult::BrowserLink {
                agent_id: config.agent_id.clone(),
                browser_url: browser_url.into(),
                signed_url,
            })
        }
    }
}
