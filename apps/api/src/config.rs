use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};

use crate::inbound::directory::CampaignDirectory;

const DEFAULT_ELEVENLABS_API_URL: &str = "https://api.eu.residency.elevenlabs.io";
const DEFAULT_TALK_URL: &str = "https://elevenlabs.io/app/talk-to";
const DEFAULT_LLM_API_URL: &str = "https://api.openai.com/v1/chat/completions";
const DEFAULT_LLM_MODEL: &str = "gpt-4o-mini";
const DEFAULT_TEMPLATE_PATH: &str = "dashboard_prompt.txt";

/// Which outbound-call operation of the voice-agent platform places the call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TelephonyProvider {
    SipTrunk,
    Twilio,
}

impl TelephonyProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            TelephonyProvider::SipTrunk => "sip_trunk",
            TelephonyProvider::Twilio => "twilio",
        }
    }
}

impl FromStr for TelephonyProvider {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sip_trunk" | "sip-trunk" | "sip" => Ok(TelephonyProvider::SipTrunk),
            "twilio" => Ok(TelephonyProvider::Twilio),
            other => Err(anyhow!("unknown telephony provider '{other}'")),
        }
    }
}

/// How personalization travels in the outbound-call payload. Exactly one shape is sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutboundCallMode {
    DynamicVariables,
    ConfigOverride,
}

impl OutboundCallMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutboundCallMode::DynamicVariables => "dynamic_variables",
            OutboundCallMode::ConfigOverride => "config_override",
        }
    }
}

impl FromStr for OutboundCallMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dynamic_variables" | "variables" => Ok(OutboundCallMode::DynamicVariables),
            "config_override" | "conversation_config_override" | "override" => {
                Ok(OutboundCallMode::ConfigOverride)
            }
            other => Err(anyhow!("unknown outbound call mode '{other}'")),
        }
    }
}

/// Header shape for the questionnaire API token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenScheme {
    Bearer,
    Raw,
}

impl FromStr for TokenScheme {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bearer" => Ok(TokenScheme::Bearer),
            "raw" | "token" => Ok(TokenScheme::Raw),
            other => Err(anyhow!("unknown auth scheme '{other}'")),
        }
    }
}

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing or malformed.
#[derive(Clone)]
pub struct Config {
    pub elevenlabs_api_key: String,
    pub agent_id: String,
    pub elevenlabs_api_url: String,
    pub talk_url: String,
    pub default_phone_number_id: Option<String>,
    pub telephony_provider: TelephonyProvider,
    pub outbound_call_mode: OutboundCallMode,
    pub agent_language: String,
    pub webrtc_signed_url: bool,
    pub hirings_api_url: Option<String>,
    pub hirings_api_token: Option<String>,
    pub hirings_auth_scheme: TokenScheme,
    pub webhook_api_key: Option<String>,
    pub prompt_template_path: PathBuf,
    pub llm_api_url: String,
    pub llm_api_key: Option<String>,
    pub llm_model: String,
    pub upstream_timeout: Duration,
    /// Overall budget for personalizing an inbound call.
    pub inbound_timeout: Duration,
    pub inbound_campaigns: CampaignDirectory,
    pub inbound_company_name: String,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let inbound_default = parse_env::<i64>("INBOUND_DEFAULT_CAMPAIGN_ID")?;
        let inbound_campaigns = CampaignDirectory::parse(
            &optional_env("INBOUND_CAMPAIGNS").unwrap_or_default(),
            inbound_default,
        )
        .context("INBOUND_CAMPAIGNS must look like '+49301234=804,+49405678=805'")?;

        Ok(Config {
            elevenlabs_api_key: require_env("ELEVENLABS_API_KEY")?,
            agent_id: require_env("ELEVENLABS_AGENT_ID")?,
            elevenlabs_api_url: optional_env("ELEVENLABS_API_URL")
                .unwrap_or_else(|| DEFAULT_ELEVENLABS_API_URL.to_string()),
            talk_url: optional_env("ELEVENLABS_TALK_URL")
                .unwrap_or_else(|| DEFAULT_TALK_URL.to_string()),
            default_phone_number_id: optional_env("ELEVENLABS_AGENT_PHONE_NUMBER_ID"),
            telephony_provider: parse_env("TELEPHONY_PROVIDER")?
                .unwrap_or(TelephonyProvider::SipTrunk),
            outbound_call_mode: parse_env("OUTBOUND_CALL_MODE")?
                .unwrap_or(OutboundCallMode::DynamicVariables),
            agent_language: optional_env("AGENT_LANGUAGE").unwrap_or_else(|| "de".to_string()),
            webrtc_signed_url: parse_env("WEBRTC_SIGNED_URL")?.unwrap_or(true),
            hirings_api_url: optional_env("HIRINGS_API_URL"),
            hirings_api_token: optional_env("HIRINGS_API_TOKEN"),
            hirings_auth_scheme: parse_env("HIRINGS_AUTH_SCHEME")?.unwrap_or(TokenScheme::Bearer),
            webhook_api_key: optional_env("WEBHOOK_API_KEY"),
            prompt_template_path: optional_env("PROMPT_TEMPLATE_PATH")
                .unwrap_or_else(|| DEFAULT_TEMPLATE_PATH.to_string())
                .into(),
            llm_api_url: optional_env("LLM_API_URL")
                .unwrap_or_else(|| DEFAULT_LLM_API_URL.to_string()),
            llm_api_key: optional_env("LLM_API_KEY"),
            llm_model: optional_env("LLM_MODEL").unwrap_or_else(|| DEFAULT_LLM_MODEL.to_string()),
            upstream_timeout: Duration::from_secs(
                parse_env::<u64>("UPSTREAM_TIMEOUT_SECS")?.unwrap_or(10),
            ),
            inbound_timeout: Duration::from_millis(
                parse_env::<u64>("INBOUND_TIMEOUT_MS")?.unwrap_or(4000),
            ),
            inbound_campaigns,
            inbound_company_name: optional_env("INBOUND_COMPANY_NAME").unwrap_or_default(),
            port: parse_env::<u16>("PORT")?.unwrap_or(5000),
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    optional_env(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

/// Unset and whitespace-only variables are both treated as absent.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_env<T>(key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    optional_env(key)
        .map(|raw| {
            raw.parse::<T>()
                .map_err(|e| anyhow!("{key} has an invalid value '{raw}': {e}"))
        })
        .transpose()
}

#[cfg(test)]
pub fn test_config() -> Config {
    Config {
        elevenlabs_api_key: "xi-test-key".to_string(),
        agent_id: "agent_test_123".to_string(),
        elevenlabs_api_url: "http://127.0.0.1:9".to_string(),
        talk_url: DEFAULT_TALK_URL.to_string(),
        default_phone_number_id: None,
        telephony_provider: TelephonyProvider::SipTrunk,
        outbound_call_mode: OutboundCallMode::DynamicVariables,
        agent_language: "de".to_string(),
        webrtc_signed_url: false,
        hirings_api_url: Some("http://127.0.0.1:9/api/v1".to_string()),
        hirings_api_token: Some("hoc-token".to_string()),
        hirings_auth_scheme: TokenScheme::Bearer,
        webhook_api_key: None,
        prompt_template_path: PathBuf::from("/nonexistent/dashboard_prompt.txt"),
        llm_api_url: DEFAULT_LLM_API_URL.to_string(),
        llm_api_key: None,
        llm_model: DEFAULT_LLM_MODEL.to_string(),
        upstream_timeout: Duration::from_secs(2),
        inbound_timeout: Duration::from_secs(4),
        inbound_campaigns: CampaignDirectory::default(),
        inbound_company_name: String::new(),
        port: 5000,
        rust_log: "info".to_string(),
    }
}
