//! Rule-based pass: well-known fields first, then the nested page/prompt structure.

use crate::context::models::Attribute;
use crate::hoc::{Question, Questionnaire};

const HEADCOUNT_KEYWORDS: &[&str] = &["mitarbeitende", "mitarbeiter", "employees"];
const LOCATION_PREFIXES: &[&str] = &["standort:", "arbeitsort:", "einsatzort:", "location:"];
const LOCATION_KEYWORDS: &[&str] = &["standort"];
const PITCH_KEYWORDS: &[&str] = &["pitch", "warum sollte"];

/// Separator between gating questions when they stand in for company priorities.
const PRIORITY_SEPARATOR: &str = "; ";

/// Returns the attribute value the structural data supports, if any.
pub fn extract_attribute(questionnaire: &Questionnaire, attribute: Attribute) -> Option<String> {
    match attribute {
        Attribute::Location => questionnaire
            .location
            .clone()
            .or_else(|| location_from_prompts(questionnaire)),
        Attribute::CompanySize => questionnaire
            .company_size
            .clone()
            .or_else(|| answer_for(questionnaire, HEADCOUNT_KEYWORDS)),
        Attribute::CompanyPitch => questionnaire
            .company_pitch
            .clone()
            .or_else(|| answer_for(questionnaire, PITCH_KEYWORDS)),
        Attribute::CompanyPriorities => questionnaire
            .company_priorities
            .clone()
            .or_else(|| priorities_from_gating(questionnaire)),
        Attribute::RoleTitle => questionnaire
            .role_title
            .clone()
            .or_else(|| questionnaire.position.clone())
            .or_else(|| questionnaire.title.clone()),
    }
}

/// A prompt like `Standort: Leipzig` carries the location in its own text.
fn location_from_prompts(questionnaire: &Questionnaire) -> Option<String> {
    questionnaire
        .page_prompts()
        .find_map(|prompt| strip_location_prefix(&prompt.text))
        .or_else(|| answer_for(questionnaire, LOCATION_KEYWORDS))
}

fn strip_location_prefix(text: &str) -> Option<String> {
    let lower = text.trim_start().to_lowercase();
    LOCATION_PREFIXES.iter().find_map(|prefix| {
        if !lower.starts_with(prefix) {
            return None;
        }
        // Prefixes are ASCII, so their length is a valid offset into the original text.
        let rest = text.trim_start().get(prefix.len()..)?.trim();
        Some(rest.to_string()).filter(|r| !r.is_empty())
    })
}

/// Answer of the first page prompt whose text mentions one of `keywords`.
fn answer_for(questionnaire: &Questionnaire, keywords: &[&str]) -> Option<String> {
    questionnaire
        .page_prompts()
        .filter(|prompt| mentions(prompt, keywords))
        .find_map(|prompt| prompt.answer.clone())
}

fn mentions(prompt: &Question, keywords: &[&str]) -> bool {
    let text = prompt.text.to_lowercase();
    keywords.iter().any(|k| text.contains(k))
}

fn priorities_from_gating(questionnaire: &Questionnaire) -> Option<String> {
    let joined = questionnaire
        .gating_questions()
        .map(|q| q.text.trim_end_matches('?').trim())
        .collect::<Vec<_>>()
        .join(PRIORITY_SEPARATOR);
    Some(joined).filter(|j| !j.is_empty())
}
