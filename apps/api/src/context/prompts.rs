// Extraction instructions for the model-assisted fallback.
// Each instruction asks for one attribute; the question list replaces `{questions}`.

use crate::context::models::Attribute;

pub const EXTRACTION_PROMPT_TEMPLATE: &str = r#"{instruction}

FRAGEN AUS DEM QUESTIONNAIRE DER KAMPAGNE:
{questions}

Antworte nur mit dem Wert."#;

pub fn instruction(attribute: Attribute) -> &'static str {
    match attribute {
        Attribute::Location => {
            "Nenne den Arbeitsort (Stadt oder Stadtteil) der ausgeschriebenen Stelle, \
             z.B. 'Berlin-Mitte'. Maximal fünf Wörter."
        }
        Attribute::CompanySize => {
            "Nenne die Unternehmensgröße als Anzahl der Mitarbeitenden, \
             z.B. '50-100 Mitarbeitende'. Maximal fünf Wörter."
        }
        Attribute::CompanyPitch => {
            "Fasse in einem kurzen Satz zusammen, was das Unternehmen für Bewerber attraktiv macht."
        }
        Attribute::CompanyPriorities => {
            "Nenne die zwei bis drei wichtigsten Anforderungen an Bewerber als kommagetrennte Stichworte."
        }
        Attribute::RoleTitle => {
            "Nenne die Berufsbezeichnung der ausgeschriebenen Stelle, z.B. 'Erzieher (m/w/d)'. \
             Maximal fünf Wörter."
        }
    }
}

pub fn extraction_prompt(attribute: Attribute, questions: &str) -> String {
    EXTRACTION_PROMPT_TEMPLATE
        .replace("{instruction}", instruction(attribute))
        .replace("{questions}", questions)
}
