use serde::Serialize;
use serde_json::{json, Value};

/// A soft attribute: extracted independently, rule-based first, model-assisted second.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attribute {
    Location,
    CompanySize,
    CompanyPitch,
    CompanyPriorities,
    RoleTitle,
}

impl Attribute {
    pub const ALL: [Attribute; 5] = [
        Attribute::Location,
        Attribute::CompanySize,
        Attribute::CompanyPitch,
        Attribute::CompanyPriorities,
        Attribute::RoleTitle,
    ];

    /// Dynamic-variable name used by the voice agent.
    pub fn variable_name(&self) -> &'static str {
        match self {
            Attribute::Location => "campaignlocation_label",
            Attribute::CompanySize => "companysize",
            Attribute::CompanyPitch => "companypitch",
            Attribute::CompanyPriorities => "companypriorities",
            Attribute::RoleTitle => "campaignrole_title",
        }
    }
}

/// Everything derived from one questionnaire. Every field defaults to empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ExtractedContext {
    pub location_label: String,
    pub company_size: String,
    pub company_pitch: String,
    pub company_priorities: String,
    pub role_title: String,
    /// Narrative block: descriptive fields followed by the all-questions listing.
    pub questionnaire_context: String,
    pub all_questions: String,
    pub must_questions: String,
    pub optional_questions: String,
}

impl ExtractedContext {
    pub fn get(&self, attribute: Attribute) -> &str {
        match attribute {
            Attribute::Location => &self.location_label,
            Attribute::CompanySize => &self.company_size,
            Attribute::CompanyPitch => &self.company_pitch,
            Attribute::CompanyPriorities => &self.company_priorities,
            Attribute::RoleTitle => &self.role_title,
        }
    }

    pub fn set(&mut self, attribute: Attribute, value: String) {
        let slot = match attribute {
            Attribute::Location => &mut self.location_label,
            Attribute::CompanySize => &mut self.company_size,
            Attribute::CompanyPitch => &mut self.company_pitch,
            Attribute::CompanyPriorities => &mut self.company_priorities,
            Attribute::RoleTitle => &mut self.role_title,
        };
        *slot = value;
    }

    /// The short attributes, keyed by variable name, for API responses.
    pub fn summary(&self) -> Value {
        let mut map = serde_json::Map::new();
        for attribute in Attribute::ALL {
            map.insert(
                attribute.variable_name().to_string(),
                json!(self.get(attribute)),
            );
        }
        Value::Object(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_and_get_address_the_same_slot() {
        let mut context = ExtractedContext::default();
        for (i, attribute) in Attribute::ALL.into_iter().enumerate() {
            context.set(attribute, format!("value-{i}"));
        }
        assert_eq!(context.location_label, "value-0");
        assert_eq!(context.role_title, "value-4");
        assert_eq!(context.get(Attribute::CompanyPitch), "value-2");
    }

    #[test]
    fn test_summary_uses_variable_names() {
        let context = ExtractedContext {
            location_label: "Berlin".to_string(),
            ..Default::default()
        };
        let summary = context.summary();
        assert_eq!(summary["campaignlocation_label"], "Berlin");
        assert_eq!(summary["companysize"], "");
        assert_eq!(summary.as_object().unwrap().len(), 5);
    }
}
