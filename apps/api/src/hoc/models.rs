//! Canonical questionnaire shape.
//!
//! Every upstream payload is normalized into [`Questionnaire`] right at the fetch
//! boundary, so nothing downstream has to check field aliases or value types.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::{Map, Value};

const TITLE_KEYS: &[&str] = &["title", "campaign_title", "name"];
const POSITION_KEYS: &[&str] = &["position", "job_title"];
const ROLE_TITLE_KEYS: &[&str] = &["campaignrole_title", "role_title", "job_role"];
const COMPANY_NAME_KEYS: &[&str] = &["company_name", "companyname"];
const DESCRIPTION_KEYS: &[&str] = &["description", "job_description"];
const REQUIREMENTS_KEYS: &[&str] = &["job_requirements", "requirements"];
const BENEFITS_KEYS: &[&str] = &["company_benefits", "benefits"];
const GOALS_KEYS: &[&str] = &["conversation_goals", "goals"];
const COMPANY_SIZE_KEYS: &[&str] = &["companysize", "company_size", "employee_count"];
const COMPANY_PITCH_KEYS: &[&str] = &["companypitch", "company_pitch"];
const COMPANY_PRIORITIES_KEYS: &[&str] = &["companypriorities", "company_priorities"];
const POSTAL_CODE_KEYS: &[&str] = &["work_location_postal_code", "postal_code", "zip"];

/// Location representations, highest priority first.
const LOCATION_KEYS: &[&str] = &[
    "campaignlocation_label",
    "location_label",
    "work_location",
    "office_address",
    "location",
    "city",
];
/// Keys tried when `location` arrives as an object.
const LOCATION_OBJECT_KEYS: &[&str] = &["label", "city", "name", "address"];

const QUESTION_TEXT_KEYS: &[&str] = &["question", "question_text", "text", "label", "prompt"];
const GROUP_KEYS: &[&str] = &["group", "category", "section"];
const POSITION_HINT_KEYS: &[&str] = &["position", "order", "sort"];

/// Keys that identify an object as a questionnaire rather than a wrapper around one.
const MARKER_KEYS: &[&[&str]] = &[
    TITLE_KEYS,
    POSITION_KEYS,
    ROLE_TITLE_KEYS,
    DESCRIPTION_KEYS,
    REQUIREMENTS_KEYS,
    LOCATION_KEYS,
    &["questions", "pages"],
];

/// Metadata keys never copied into `extra`.
const EXTRA_SKIPPED_KEYS: &[&str] = &["id", "created_at", "updated_at"];

/// Question tier. Gating questions end the conversation on a negative answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Gating = 1,
    Preference = 2,
}

impl Priority {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => Some(if n.as_f64() == Some(1.0) {
                Priority::Gating
            } else {
                Priority::Preference
            }),
            Value::String(s) => match s.trim().to_lowercase().as_str() {
                "" => None,
                "1" | "must" | "mandatory" | "required" | "pflicht" => Some(Priority::Gating),
                _ => Some(Priority::Preference),
            },
            Value::Bool(true) => Some(Priority::Gating),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Question {
    pub text: String,
    pub priority: Priority,
    pub group: Option<String>,
    pub position: Option<i64>,
    pub context: Option<String>,
    pub preamble: Option<String>,
    pub help_text: Option<String>,
    /// Filled in on page prompts that carry a recorded answer.
    pub answer: Option<String>,
}

impl Question {
    pub fn new(text: impl Into<String>, priority: Priority) -> Self {
        Self {
            text: text.into(),
            priority,
            group: None,
            position: None,
            context: None,
            preamble: None,
            help_text: None,
            answer: None,
        }
    }

    pub fn is_gating(&self) -> bool {
        self.priority == Priority::Gating
    }

    /// Returns `None` for entries that carry no question text.
    fn from_value(value: &Value) -> Option<Self> {
        let obj = match value {
            Value::Object(obj) => obj,
            other => return scalar(other).map(|text| Question::new(text, Priority::Preference)),
        };

        let text = first_of(obj, QUESTION_TEXT_KEYS)?;
        let priority = obj
            .get("priority")
            .and_then(Priority::from_value)
            .or_else(|| {
                ["required", "mandatory", "is_required"]
                    .iter()
                    .find_map(|k| obj.get(*k).and_then(Value::as_bool))
                    .filter(|required| *required)
                    .map(|_| Priority::Gating)
            })
            .unwrap_or(Priority::Preference);

        Some(Question {
            text,
            priority,
            group: first_of(obj, GROUP_KEYS),
            position: POSITION_HINT_KEYS
                .iter()
                .find_map(|k| obj.get(*k).and_then(integer)),
            context: first_of(obj, &["context"]),
            preamble: first_of(obj, &["preamble"]),
            help_text: first_of(obj, &["help_text", "helpText"]),
            answer: first_of(obj, &["answer", "value"]),
        })
    }
}

/// A page of the nested onboarding structure.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page {
    pub name: Option<String>,
    pub prompts: Vec<Question>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Questionnaire {
    pub id: Option<String>,
    pub title: Option<String>,
    pub position: Option<String>,
    pub role_title: Option<String>,
    pub department: Option<String>,
    pub company_name: Option<String>,
    pub description: Option<String>,
    pub requirements: Option<String>,
    pub key_qualifications: Option<String>,
    pub benefits: Option<String>,
    pub goals: Option<String>,
    pub company_size: Option<String>,
    pub company_pitch: Option<String>,
    pub company_priorities: Option<String>,
    pub location: Option<String>,
    pub postal_code: Option<String>,
    pub questions: Vec<Question>,
    pub pages: Vec<Page>,
    pub extra: BTreeMap<String, String>,
}

impl Questionnaire {
    /// Normalizes a recovered upstream object. Unknown keys are ignored.
    pub fn from_object(obj: &Map<String, Value>) -> Self {
        let obj = unwrap_envelope(obj);

        let questions = obj
            .get("questions")
            .and_then(Value::as_array)
            .map(|items| items.iter().filter_map(Question::from_value).collect())
            .unwrap_or_default();

        let pages = obj
            .get("pages")
            .and_then(Value::as_array)
            .map(|pages| pages.iter().filter_map(page_from_value).collect())
            .unwrap_or_default();

        let extra = obj
            .get("data")
            .and_then(Value::as_object)
            .map(|data| {
                data.iter()
                    .filter(|(k, _)| !EXTRA_SKIPPED_KEYS.contains(&k.as_str()))
                    .filter_map(|(k, v)| display_value(v).map(|v| (k.clone(), v)))
                    .collect()
            })
            .unwrap_or_default();

        Questionnaire {
            id: first_of(obj, &["id", "campaign_id"]),
            title: first_of(obj, TITLE_KEYS),
            position: first_of(obj, POSITION_KEYS),
            role_title: first_of(obj, ROLE_TITLE_KEYS),
            department: first_of(obj, &["department"]),
            company_name: first_of(obj, COMPANY_NAME_KEYS),
            description: first_of(obj, DESCRIPTION_KEYS),
            requirements: first_of(obj, REQUIREMENTS_KEYS),
            key_qualifications: first_of(obj, &["key_qualifications"]),
            benefits: first_of(obj, BENEFITS_KEYS),
            goals: first_of(obj, GOALS_KEYS),
            company_size: first_of(obj, COMPANY_SIZE_KEYS),
            company_pitch: first_of(obj, COMPANY_PITCH_KEYS),
            company_priorities: first_of(obj, COMPANY_PRIORITIES_KEYS),
            location: resolve_location(obj),
            postal_code: first_of(obj, POSTAL_CODE_KEYS),
            questions,
            pages,
            extra,
        }
    }

    /// True when the questionnaire carries no usable data.
    pub fn is_empty(&self) -> bool {
        *self == Questionnaire::default()
    }

    pub fn gating_questions(&self) -> impl Iterator<Item = &Question> {
        self.questions.iter().filter(|q| q.is_gating())
    }

    /// Page prompts in document order.
    pub fn page_prompts(&self) -> impl Iterator<Item = &Question> {
        self.pages.iter().flat_map(|p| p.prompts.iter())
    }
}

/// Descends into `data` / `questionnaire` when the top level is only a wrapper.
fn unwrap_envelope(obj: &Map<String, Value>) -> &Map<String, Value> {
    if has_marker_keys(obj) {
        return obj;
    }
    ["data", "questionnaire"]
        .iter()
        .filter_map(|k| obj.get(*k).and_then(Value::as_object))
        .find(|inner| has_marker_keys(inner))
        .unwrap_or(obj)
}

fn has_marker_keys(obj: &Map<String, Value>) -> bool {
    MARKER_KEYS
        .iter()
        .flat_map(|keys| keys.iter())
        .any(|k| obj.contains_key(*k))
}

fn page_from_value(value: &Value) -> Option<Page> {
    let obj = value.as_object()?;
    let prompts: Vec<Question> = obj
        .get("prompts")
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(Question::from_value).collect())
        .unwrap_or_default();
    Some(Page {
        name: first_of(obj, &["name", "title"]),
        prompts,
    })
}

fn resolve_location(obj: &Map<String, Value>) -> Option<String> {
    LOCATION_KEYS.iter().find_map(|key| match obj.get(*key)? {
        Value::Object(inner) => first_of(inner, LOCATION_OBJECT_KEYS),
        other => scalar(other),
    })
}

/// First non-empty scalar among `keys`, in order.
fn first_of(obj: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|k| obj.get(*k).and_then(scalar))
}

/// Strings are trimmed; numbers and booleans are stringified; everything else is absent.
fn scalar(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.trim().to_string()).filter(|s| !s.is_empty()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Like [`scalar`], but nested values are rendered as compact JSON.
fn display_value(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::Array(a) if a.is_empty() => None,
        Value::Object(o) if o.is_empty() => None,
        Value::Array(_) | Value::Object(_) => Some(value.to_string()),
        other => scalar(other),
    }
}

fn integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
