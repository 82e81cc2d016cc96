//! Recovers the questionnaire object from upstream bodies that are not always pure JSON.
//!
//! Attempts, in order:
//! 1. the body as JSON (an object, or a JSON string holding one)
//! 2. JSON inside `<script>` elements
//! 3. the first balanced `{...}` in the tag-stripped text that carries a `questions` key

use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Value};

static SCRIPT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<script[^>]*>(.*?)</script>").expect("script pattern is valid")
});
static TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<[^>]*>").expect("tag pattern is valid"));

/// Which recovery step produced the object. Logged by the fetcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recovery {
    Json,
    Script,
    Markup,
}

pub fn recover_object(body: &str) -> Option<(Map<String, Value>, Recovery)> {
    if let Some(obj) = parse_object(body) {
        return Some((obj, Recovery::Json));
    }

    for capture in SCRIPT_RE.captures_iter(body) {
        let script = capture.get(1).map_or("", |m| m.as_str());
        if let Some(obj) = parse_object(script).or_else(|| first_balanced_object(script, None)) {
            return Some((obj, Recovery::Script));
        }
    }

    let text = decode_entities(&TAG_RE.replace_all(body, " "));
    first_balanced_object(&text, Some("questions")).map(|obj| (obj, Recovery::Markup))
}

/// Parses `text` as a JSON object, unwrapping one level of string encoding.
fn parse_object(text: &str) -> Option<Map<String, Value>> {
    match serde_json::from_str::<Value>(text.trim()).ok()? {
        Value::Object(obj) => Some(obj),
        Value::String(inner) => match serde_json::from_str::<Value>(&inner).ok()? {
            Value::Object(obj) => Some(obj),
            _ => None,
        },
        _ => None,
    }
}

/// Scans for balanced `{...}` spans and returns the first that parses as an object
/// (and contains `required_key`, when given). Braces inside string literals are ignored.
fn first_balanced_object(text: &str, required_key: Option<&str>) -> Option<Map<String, Value>> {
    let mut search_from = 0;
    while let Some(offset) = text[search_from..].find('{') {
        let start = search_from + offset;
        // Unclosed to the end of the text.
        let len = balanced_end(&text[start..])?;
        let candidate = &text[start..start + len];
        if let Ok(Value::Object(obj)) = serde_json::from_str::<Value>(candidate) {
            if required_key.map_or(true, |k| obj.contains_key(k)) {
                return Some(obj);
            }
        }
        search_from = start + 1;
    }
    None
}

/// Byte length of the balanced object starting at `text[0] == '{'`.
fn balanced_end(text: &str) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, c) in text.char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(i + 1);
                }
            }
            _ => {}
        }
    }
    None
}

fn decode_entities(text: &str) -> String {
    text.replace("&quot;", "\"")
        .replace("&#34;", "\"")
        .replace("&#39;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
}
