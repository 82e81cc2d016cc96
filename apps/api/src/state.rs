use std::sync::Arc;

use tracing::info;

use crate::config::Config;
use crate::context::fallback::{DisabledExtractor, LlmAttributeExtractor};
use crate::context::SoftAttributeExtractor;
use crate::dispatch::voice_agent::VoiceAgentClient;
use crate::hoc::HocClient;
use crate::llm_client::LlmClient;

/// Shared application state injected into all route handlers via Axum extractors.
/// Holds clients only; nothing here changes between requests.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub hoc: HocClient,
    pub voice: VoiceAgentClient,
    /// Pluggable soft-attribute fallback. LLM-backed when LLM_API_KEY is set, disabled otherwise.
    pub extractor: Arc<dyn SoftAttributeExtractor>,
}

impl AppState {
    pub fn from_config(config: Config) -> Self {
        let hoc = HocClient::new(
            config.hirings_api_url.clone(),
            config.hirings_api_token.clone(),
            config.hirings_auth_scheme,
            config.upstream_timeout,
        );
        let voice = VoiceAgentClient::new(
            config.elevenlabs_api_url.clone(),
            config.elevenlabs_api_key.clone(),
            config.upstream_timeout,
        );

        let extractor: Arc<dyn SoftAttributeExtractor> = match &config.llm_api_key {
            Some(key) => {
                let llm = LlmClient::new(
                    config.llm_api_url.clone(),
                    key.clone(),
                    config.llm_model.clone(),
                    config.upstream_timeout,
                );
                info!("LLM fallback extractor enabled (model: {})", llm.model());
                Arc::new(LlmAttributeExtractor(llm))
            }
            None => {
                info!("LLM_API_KEY not set, soft attributes use rule-based extraction only");
                Arc::new(DisabledExtractor)
            }
        };

        Self {
            config,
            hoc,
            voice,
            extractor,
        }
    }
}
