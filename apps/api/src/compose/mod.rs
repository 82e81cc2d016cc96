//! Prompt/Message Composer.
//!
//! Both outputs are deterministic functions of (template, recipient, extracted context).

use std::collections::BTreeMap;

use serde::Serialize;

use crate::context::{Attribute, ExtractedContext};
use crate::hoc::Questionnaire;

pub mod template;

const RULE: &str = "===================================";

/// Who the conversation is with and on whose behalf.
#[derive(Debug, Clone, Copy)]
pub struct Recipient<'a> {
    pub campaign_id: Option<i64>,
    pub company_name: &'a str,
    pub first_name: &'a str,
    pub last_name: &'a str,
}

impl Recipient<'_> {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name.trim(), self.last_name.trim())
            .trim()
            .to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComposedMessage {
    pub system_prompt: String,
    pub first_message: String,
    /// True when the request's override replaced the composed prompt.
    pub prompt_overridden: bool,
}

/// Builds the system prompt and greeting. A supplied override replaces the prompt as-is.
pub fn compose(
    template: &str,
    recipient: &Recipient<'_>,
    context: &ExtractedContext,
    override_prompt: Option<&str>,
) -> ComposedMessage {
    let first_message = greeting(recipient, &context.location_label);

    if let Some(prompt) = override_prompt {
        return ComposedMessage {
            system_prompt: prompt.to_string(),
            first_message,
            prompt_overridden: true,
        };
    }

    let mut system_prompt = template::fill_template(
        template,
        recipient.first_name,
        recipient.last_name,
        recipient.company_name,
    );
    system_prompt.push_str(&context_block(recipient, context));

    ComposedMessage {
        system_prompt,
        first_message,
        prompt_overridden: false,
    }
}

/// The spoken opening line. Clauses for missing values are dropped, never left dangling.
pub fn greeting(recipient: &Recipient<'_>, location: &str) -> String {
    let name = recipient.full_name();
    let salutation = if name.is_empty() {
        "Hallo".to_string()
    } else {
        format!("Hallo {name}")
    };

    let company = recipient.company_name.trim();
    let assistant = if company.is_empty() {
        "hier ist die digitale Recruiting-Assistenz".to_string()
    } else {
        format!("hier ist die digitale Recruiting-Assistenz von {company}")
    };

    let location = location.trim();
    let location_clause = if location.is_empty() {
        String::new()
    } else {
        format!(" in {location}")
    };

    format!(
        "{salutation}, {assistant}. Es geht um Ihr Interesse an einer Stelle bei uns{location_clause}. \
         Haben Sie gerade ein paar Minuten Zeit?"
    )
}

fn context_block(recipient: &Recipient<'_>, context: &ExtractedContext) -> String {
    let campaign = recipient
        .campaign_id
        .map_or_else(|| "N/A".to_string(), |id| id.to_string());
    format!(
        "\n\n{RULE}\nKONTEXT AUS QUESTIONNAIRE (Campaign-ID: {campaign}):\n{RULE}\n\n\
         Kandidat: {}\nFirma: {}\n\n{}\n{RULE}\n",
        recipient.full_name(),
        recipient.company_name,
        context.questionnaire_context,
    )
}

/// Named values for the voice agent's templated prompt. Every key is always present.
pub fn dynamic_variables(
    recipient: &Recipient<'_>,
    questionnaire: &Questionnaire,
    context: &ExtractedContext,
    message: &ComposedMessage,
) -> BTreeMap<String, String> {
    let mut vars = BTreeMap::new();
    let mut put = |key: &str, value: &str| {
        vars.insert(key.to_string(), value.to_string());
    };

    put("companyname", recipient.company_name);
    put("candidatefirst_name", recipient.first_name);
    put("candidatelast_name", recipient.last_name);
    put(
        "campaign_id",
        &recipient
            .campaign_id
            .map(|id| id.to_string())
            .unwrap_or_default(),
    );
    for attribute in Attribute::ALL {
        put(attribute.variable_name(), context.get(attribute));
    }
    put("position", questionnaire.position.as_deref().unwrap_or(""));
    put("department", questionnaire.department.as_deref().unwrap_or(""));
    put("campaign_title", questionnaire.title.as_deref().unwrap_or(""));
    put("questionnaire_context", &context.questionnaire_context);
    put("all_questions", &context.all_questions);
    put("must_questions", &context.must_questions);
    put("optional_questions", &context.optional_questions);
    put("first_message", &message.first_message);
    vars
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::extract_structural;

    fn recipient() -> Recipient<'static> {
        Recipient {
            campaign_id: Some(804),
            company_name: "Urban Kita gGmbH",
            first_name: "Max",
            last_name: "Mustermann",
        }
    }

    #[test]
    fn test_greeting_with_location() {
        assert_eq!(
            greeting(&recipient(), "Berlin-Mitte"),
            "Hallo Max Mustermann, hier ist die digitale Recruiting-Assistenz von Urban Kita gGmbH. \
             Es geht um Ihr Interesse an einer Stelle bei uns in Berlin-Mitte. \
             Haben Sie gerade ein paar Minuten Zeit?"
        );
    }

    #[test]
    fn test_greeting_without_location_has_no_dangling_clause() {
        let text = greeting(&recipient(), "  ");
        assert!(text.contains("an einer Stelle bei uns. Haben Sie"));
        assert!(!text.contains(" in ."));
        assert!(!text.contains("  "));
    }

    #[test]
    fn test_greeting_for_unknown_candidate_and_company() {
        let anonymous = Recipient {
            campaign_id: None,
            company_name: "",
            first_name: "",
            last_name: "",
        };
        assert!(greeting(&anonymous, "")
            .starts_with("Hallo, hier ist die digitale Recruiting-Assistenz. Es geht"));
    }

    #[test]
    fn test_compose_fills_template_and_appends_context_block() {
        let context = extract_structural(&Questionnaire::default());
        let message = compose(
            "Prompt für {{candidatefirst_name}} {{candidatelast_name}} bei {{companyname}}.",
            &recipient(),
            &context,
            None,
        );

        assert!(!message.prompt_overridden);
        assert!(message
            .system_prompt
            .starts_with("Prompt für Max Mustermann bei Urban Kita gGmbH.\n\n"));
        assert!(message
            .system_prompt
            .contains("KONTEXT AUS QUESTIONNAIRE (Campaign-ID: 804):"));
        assert!(message.system_prompt.contains("Kandidat: Max Mustermann\nFirma: Urban Kita gGmbH"));
        assert!(message.system_prompt.contains(&context.questionnaire_context));
    }

    #[test]
    fn test_override_replaces_prompt_exactly() {
        let context = extract_structural(&Questionnaire::default());
        let message = compose(
            template::DEFAULT_TEMPLATE,
            &recipient(),
            &context,
            Some("Nur dieser Prompt."),
        );
        assert_eq!(message.system_prompt, "Nur dieser Prompt.");
        assert!(message.prompt_overridden);
        assert!(message.first_message.starts_with("Hallo Max Mustermann"));
    }

    #[test]
    fn test_compose_is_deterministic() {
        let questionnaire = Questionnaire {
            location: Some("Leipzig".to_string()),
            ..Default::default()
        };
        let context = extract_structural(&questionnaire);
        let a = compose(template::DEFAULT_TEMPLATE, &recipient(), &context, None);
        let b = compose(template::DEFAULT_TEMPLATE, &recipient(), &context, None);
        assert_eq!(a, b);
        assert!(a.first_message.contains("bei uns in Leipzig."));
    }

    #[test]
    fn test_dynamic_variables_carry_every_key() {
        let questionnaire = Questionnaire {
            title: Some("Herbstkampagne".to_string()),
            location: Some("Leipzig".to_string()),
            ..Default::default()
        };
        let context = extract_structural(&questionnaire);
        let message = compose(template::DEFAULT_TEMPLATE, &recipient(), &context, None);
        let vars = dynamic_variables(&recipient(), &questionnaire, &context, &message);

        assert_eq!(vars["companyname"], "Urban Kita gGmbH");
        assert_eq!(vars["candidatefirst_name"], "Max");
        assert_eq!(vars["campaign_id"], "804");
        assert_eq!(vars["campaignlocation_label"], "Leipzig");
        assert_eq!(vars["campaign_title"], "Herbstkampagne");
        assert_eq!(vars["companysize"], "");
        assert_eq!(vars["first_message"], message.first_message);
        assert_eq!(vars.len(), 17);
    }
}
