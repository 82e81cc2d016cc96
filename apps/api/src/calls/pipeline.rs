//! Per-request pipeline: fetch → extract → compose. Dispatch is left to the caller.

use std::collections::BTreeMap;

use tracing::info;

use crate::compose::{self, template, ComposedMessage, Recipient};
use crate::context::{self, ExtractedContext};
use crate::hoc::Questionnaire;
use crate::state::AppState;

pub struct Prepared {
    pub questionnaire: Questionnaire,
    /// The fetch succeeded, even if the campaign has no questions.
    pub loaded: bool,
    pub context: ExtractedContext,
    pub message: ComposedMessage,
    pub variables: BTreeMap<String, String>,
}

impl Prepared {
    pub fn questionnaire_loaded(&self) -> bool {
        self.loaded
    }
}

/// Never fails: upstream problems only lower the quality of the personalization.
pub async fn prepare(
    state: &AppState,
    recipient: &Recipient<'_>,
    override_prompt: Option<&str>,
) -> Prepared {
    let fetched = match recipient.campaign_id {
        Some(campaign_id) => state.hoc.fetch_questionnaire(campaign_id).await,
        None => None,
    };
    prepare_with(state, fetched, recipient, override_prompt).await
}

/// Same as [`prepare`] for a fetch result the caller already holds.
pub async fn prepare_with(
    state: &AppState,
    fetched: Option<Questionnaire>,
    recipient: &Recipient<'_>,
    override_prompt: Option<&str>,
) -> Prepared {
    let loaded = fetched.is_some();
    let questionnaire = fetched.unwrap_or_default();
    let context = context::extract_context(&questionnaire, state.extractor.as_ref()).await;

    let template = template::load_template(&state.config.prompt_template_path).await;
    let message = compose::compose(&template, recipient, &context, override_prompt);
    let variables = compose::dynamic_variables(recipient, &questionnaire, &context, &message);

    info!(
        "Prompt composed: {} chars{}, first message {} chars",
        message.system_prompt.chars().count(),
        if message.prompt_overridden { " (override)" } else { "" },
        message.first_message.chars().count()
    );

    Prepared {
        questionnaire,
        loaded,
        context,
        message,
        variables,
    }
}
