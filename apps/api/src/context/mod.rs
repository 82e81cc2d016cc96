//! Context Extractor: turns a [`Questionnaire`] into an [`ExtractedContext`].
//!
//! Soft attributes are resolved per attribute: rule-based pass first, then the
//! model-assisted fallback for whatever is still empty. Text blocks are pure renders.

use tracing::info;

use crate::hoc::Questionnaire;

pub mod fallback;
pub mod models;
pub mod prompts;
pub mod render;
pub mod rules;

pub use fallback::SoftAttributeExtractor;
pub use models::{Attribute, ExtractedContext};

/// Rule-based pass plus text blocks. No network calls.
pub fn extract_structural(questionnaire: &Questionnaire) -> ExtractedContext {
    let mut context = ExtractedContext {
        questionnaire_context: render::render_narrative(questionnaire),
        all_questions: render::render_all_questions(&questionnaire.questions),
        must_questions: render::render_must_questions(&questionnaire.questions),
        optional_questions: render::render_optional_questions(&questionnaire.questions),
        ..Default::default()
    };
    for attribute in Attribute::ALL {
        if let Some(value) = rules::extract_attribute(questionnaire, attribute) {
            context.set(attribute, value);
        }
    }
    context
}

/// Full extraction. Fallback calls run sequentially, one per still-empty attribute,
/// and only when the questionnaire carries a raw question list.
pub async fn extract_context(
    questionnaire: &Questionnaire,
    fallback: &dyn SoftAttributeExtractor,
) -> ExtractedContext {
    let mut context = extract_structural(questionnaire);

    if questionnaire.questions.is_empty() || !fallback.is_enabled() {
        return context;
    }

    let missing: Vec<Attribute> = Attribute::ALL
        .into_iter()
        .filter(|a| context.get(*a).is_empty())
        .collect();
    if missing.is_empty() {
        return context;
    }

    let questions_text = fallback::format_questions_for_model(&questionnaire.questions);
    for attribute in missing {
        if let Some(value) = fallback.extract(attribute, &questions_text).await {
            info!(
                "Resolved {} via LLM fallback: {value}",
                attribute.variable_name()
            );
            context.set(attribute, value);
        }
    }
    context
}
