//! Model-assisted fallback for soft attributes the rule pass could not resolve.
//!
//! `AppState` holds an `Arc<dyn SoftAttributeExtractor>`, chosen at startup:
//! `LlmAttributeExtractor` when a completion key is configured, `DisabledExtractor` otherwise.
//! Implementations never fail; an unanswerable attribute is `None`.

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::context::models::Attribute;
use crate::context::prompts::extraction_prompt;
use crate::hoc::Question;
use crate::llm_client::prompts::{NO_ANSWER_MARKERS, SHORT_ANSWER_SYSTEM};
use crate::llm_client::{CompletionRequest, LlmClient};

const EXTRACTION_TEMPERATURE: f32 = 0.1;
const EXTRACTION_MAX_TOKENS: u32 = 60;
const MAX_ANSWER_CHARS: usize = 200;

#[async_trait]
pub trait SoftAttributeExtractor: Send + Sync {
    fn is_enabled(&self) -> bool {
        true
    }

    async fn extract(&self, attribute: Attribute, questions_text: &str) -> Option<String>;
}

pub struct DisabledExtractor;

#[async_trait]
impl SoftAttributeExtractor for DisabledExtractor {
    fn is_enabled(&self) -> bool {
        false
    }

    async fn extract(&self, _attribute: Attribute, _questions_text: &str) -> Option<String> {
        None
    }
}

pub struct LlmAttributeExtractor(pub LlmClient);

#[async_trait]
impl SoftAttributeExtractor for LlmAttributeExtractor {
    async fn extract(&self, attribute: Attribute, questions_text: &str) -> Option<String> {
        let prompt = extraction_prompt(attribute, questions_text);
        let request = CompletionRequest {
            system: SHORT_ANSWER_SYSTEM,
            prompt: &prompt,
            temperature: EXTRACTION_TEMPERATURE,
            max_tokens: EXTRACTION_MAX_TOKENS,
        };

        match self.0.complete(request).await {
            Ok(answer) => {
                let cleaned = clean_answer(&answer);
                debug!(
                    "LLM fallback for {}: {:?}",
                    attribute.variable_name(),
                    cleaned
                );
                cleaned
            }
            Err(e) => {
                warn!(
                    "LLM fallback for {} failed, leaving it empty: {e}",
                    attribute.variable_name()
                );
                None
            }
        }
    }
}

/// Formats the question list the way the extraction prompt expects it.
pub fn format_questions_for_model(questions: &[Question]) -> String {
    questions
        .iter()
        .enumerate()
        .map(|(i, q)| {
            let mut line = format!("{}. {}", i + 1, q.text);
            for note in [&q.preamble, &q.context, &q.help_text].into_iter().flatten() {
                line.push_str(" | ");
                line.push_str(note);
            }
            if let Some(answer) = &q.answer {
                line.push_str(" | Antwort: ");
                line.push_str(answer);
            }
            line
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// First line, without quotes or a trailing period; "unknown"-style answers become `None`.
fn clean_answer(raw: &str) -> Option<String> {
    let line = raw.lines().map(str::trim).find(|l| !l.is_empty())?;
    let line = line
        .trim_end_matches('.')
        .trim_matches(|c: char| matches!(c, '"' | '\'' | '„' | '“' | '”' | '`'))
        .trim_end_matches('.')
        .trim();

    let lower = line.to_lowercase();
    if line.is_empty() || NO_ANSWER_MARKERS.contains(&lower.as_str()) {
        return None;
    }
    Some(line.chars().take(MAX_ANSWER_CHARS).collect())
}
