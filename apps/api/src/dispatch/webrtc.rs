//! Browser-link builder. No network calls.

use std::collections::BTreeMap;

use url::Url;

/// Long text blocks are cut to this many characters before encoding.
pub const MAX_BLOCK_CHARS: usize = 800;

const LONG_BLOCKS: [&str; 4] = [
    "questionnaire_context",
    "all_questions",
    "must_questions",
    "optional_questions",
];

/// `{talk_url}?agent_id=<agent>&var_<name>=<value>...`, skipping empty values.
pub fn browser_url(
    talk_url: &str,
    agent_id: &str,
    variables: &BTreeMap<String, String>,
) -> Result<Url, url::ParseError> {
    let mut params: Vec<(String, String)> = vec![("agent_id".to_string(), agent_id.to_string())];
    for (name, value) in variables {
        if value.trim().is_empty() {
            continue;
        }
        let value = if LONG_BLOCKS.contains(&name.as_str()) {
            truncate(value, MAX_BLOCK_CHARS)
        } else {
            value.clone()
        };
        params.push((format!("var_{name}"), value));
    }
    Url::parse_with_params(talk_url, &params)
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(max_chars).collect();
    cut.push_str(" …");
    cut
}
