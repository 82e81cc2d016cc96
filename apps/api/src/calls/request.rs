//! Request Validator for call triggers.

use serde_json::{Map, Value};

use crate::compose::Recipient;
use crate::dispatch::Channel;
use crate::errors::AppError;

const REQUIRED_FIELDS: [&str; 4] = [
    "campaign_id",
    "company_name",
    "candidate_first_name",
    "candidate_last_name",
];

/// A validated trigger. Lives for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallRequest {
    pub campaign_id: i64,
    pub company_name: String,
    pub candidate_first_name: String,
    pub candidate_last_name: String,
    pub to_number: Option<String>,
    pub agent_phone_number_id: Option<String>,
    pub override_prompt: Option<String>,
}

impl CallRequest {
    /// Parses a raw body. A JSON string holding an object is unwrapped once.
    pub fn from_body(body: &[u8]) -> Result<Self, AppError> {
        let object = parse_object(body)?;

        let missing: Vec<String> = REQUIRED_FIELDS
            .iter()
            .filter(|field| text_field(&object, field).is_none())
            .map(|field| field.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(AppError::MissingFields(missing));
        }

        let campaign_id = text_field(&object, "campaign_id")
            .and_then(|raw| raw.parse::<i64>().ok())
            .ok_or_else(|| AppError::Validation("campaign_id must be an integer".to_string()))?;

        let required = |key: &str| text_field(&object, key).unwrap_or_default();
        Ok(CallRequest {
            campaign_id,
            company_name: required("company_name"),
            candidate_first_name: required("candidate_first_name"),
            candidate_last_name: required("candidate_last_name"),
            to_number: text_field(&object, "to_number"),
            agent_phone_number_id: text_field(&object, "agent_phone_number_id"),
            // Kept as sent; an override replaces the prompt verbatim.
            override_prompt: object
                .get("override_prompt")
                .and_then(Value::as_str)
                .filter(|s| !s.trim().is_empty())
                .map(str::to_string),
        })
    }

    pub fn recipient(&self) -> Recipient<'_> {
        Recipient {
            campaign_id: Some(self.campaign_id),
            company_name: &self.company_name,
            first_name: &self.candidate_first_name,
            last_name: &self.candidate_last_name,
        }
    }

    /// Phone number present → telephony, which then needs a routing identifier.
    pub fn channel(
        &self,
        default_phone_number_id: Option<&str>,
        try_signed_url: bool,
    ) -> Result<Channel, AppError> {
        let Some(to_number) = &self.to_number else {
            return Ok(Channel::BrowserLink { try_signed_url });
        };
        let agent_phone_number_id = self
            .agent_phone_number_id
            .as_deref()
            .or(default_phone_number_id)
            .ok_or_else(|| {
                AppError::Configuration(
                    "to_number given but no agent_phone_number_id in the request \
                     and ELEVENLABS_AGENT_PHONE_NUMBER_ID is not configured"
                        .to_string(),
                )
            })?;
        Ok(Channel::Telephony {
            to_number: to_number.clone(),
            agent_phone_number_id: agent_phone_number_id.to_string(),
        })
    }
}

fn parse_object(body: &[u8]) -> Result<Map<String, Value>, AppError> {
    let value: Value = serde_json::from_slice(body)
        .map_err(|e| AppError::Format(format!("Request body is not valid JSON: {e}")))?;

    let value = match value {
        Value::String(inner) => serde_json::from_str(&inner).map_err(|e| {
            AppError::Format(format!("Request body is a string but not encoded JSON: {e}"))
        })?,
        other => other,
    };

    match value {
        Value::Object(object) => Ok(object),
        _ => Err(AppError::Format(
            "Request body must be a JSON object".to_string(),
        )),
    }
}

/// Strings are trimmed; numbers are stringified; blanks count as absent.
fn text_field(object: &Map<String, Value>, key: &str) -> Option<String> {
    match object.get(key)? {
        Value::String(s) => Some(s.trim().to_string()).filter(|s| !s.is_empty()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn valid() -> Value {
        json!({
            "campaign_id": 804,
            "company_name": "Urban Kita gGmbH",
            "candidate_first_name": "Max",
            "candidate_last_name": "Mustermann",
        })
    }

    fn parse(value: &Value) -> Result<CallRequest, AppError> {
        CallRequest::from_body(value.to_string().as_bytes())
    }

    #[test]
    fn test_valid_request_without_phone() {
        let request = parse(&valid()).unwrap();
        assert_eq!(request.campaign_id, 804);
        assert_eq!(request.company_name, "Urban Kita gGmbH");
        assert_eq!(request.to_number, None);
        assert_eq!(
            request.channel(None, true).unwrap(),
            Channel::BrowserLink { try_signed_url: true }
        );
    }

    #[test]
    fn test_campaign_id_as_numeric_string() {
        let mut body = valid();
        body["campaign_id"] = json!(" 805 ");
        assert_eq!(parse(&body).unwrap().campaign_id, 805);
    }

    #[test]
    fn test_non_integer_campaign_id_is_validation_error() {
        let mut body = valid();
        body["campaign_id"] = json!("abc");
        assert!(matches!(parse(&body), Err(AppError::Validation(_))));

        body["campaign_id"] = json!(8.5);
        assert!(matches!(parse(&body), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_missing_fields_are_all_named() {
        let body = json!({"campaign_id": 804, "candidate_first_name": "  "});
        match parse(&body) {
            Err(AppError::MissingFields(fields)) => assert_eq!(
                fields,
                vec!["company_name", "candidate_first_name", "candidate_last_name"]
            ),
            other => panic!("expected missing fields, got {other:?}"),
        }
    }

    #[test]
    fn test_double_encoded_body_is_unwrapped_once() {
        let encoded = Value::String(valid().to_string()).to_string();
        let request = CallRequest::from_body(encoded.as_bytes()).unwrap();
        assert_eq!(request.candidate_last_name, "Mustermann");

        let triple = Value::String(encoded).to_string();
        assert!(matches!(
            CallRequest::from_body(triple.as_bytes()),
            Err(AppError::Format(_))
        ));
    }

    #[test]
    fn test_non_object_bodies_are_format_errors() {
        for body in ["[1,2]", "42", "not json", ""] {
            assert!(
                matches!(CallRequest::from_body(body.as_bytes()), Err(AppError::Format(_))),
                "{body}"
            );
        }
    }

    #[test]
    fn test_phone_without_routing_id_is_configuration_error() {
        let mut body = valid();
        body["to_number"] = json!("+491234567890");
        let request = parse(&body).unwrap();

        assert!(matches!(
            request.channel(None, false),
            Err(AppError::Configuration(_))
        ));
        assert_eq!(
            request.channel(Some("phnum_default"), false).unwrap(),
            Channel::Telephony {
                to_number: "+491234567890".to_string(),
                agent_phone_number_id: "phnum_default".to_string(),
            }
        );
    }

    #[test]
    fn test_request_routing_id_wins_over_default() {
        let mut body = valid();
        body["to_number"] = json!("+491234567890");
        body["agent_phone_number_id"] = json!("phnum_request");
        let channel = parse(&body).unwrap().channel(Some("phnum_default"), false).unwrap();
        assert!(matches!(
            channel,
            Channel::Telephony { agent_phone_number_id, .. } if agent_phone_number_id == "phnum_request"
        ));
    }

    #[test]
    fn test_override_prompt_is_kept_verbatim() {
        let mut body = valid();
        body["override_prompt"] = json!("  Eigener Prompt\n");
        assert_eq!(
            parse(&body).unwrap().override_prompt.as_deref(),
            Some("  Eigener Prompt\n")
        );
    }
}
