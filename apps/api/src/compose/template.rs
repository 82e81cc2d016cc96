//! Base prompt template resource.

use std::path::Path;
use std::sync::LazyLock;

use regex::{Captures, Regex};
use tracing::{info, warn};

pub const FIRST_NAME_PLACEHOLDER: &str = "{{candidatefirst_name}}";
pub const LAST_NAME_PLACEHOLDER: &str = "{{candidatelast_name}}";
pub const COMPANY_PLACEHOLDER: &str = "{{companyname}}";

static PLACEHOLDER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{(candidatefirst_name|candidatelast_name|companyname)\}\}")
        .expect("placeholder pattern is valid")
});

/// Used when the template resource is missing or unreadable.
pub const DEFAULT_TEMPLATE: &str = "Du bist ein professioneller Recruiting-Assistent für {{companyname}}.
Du führst ein Gespräch mit {{candidatefirst_name}} {{candidatelast_name}}.";

/// Reads the template on every call so edits apply without a restart.
pub async fn load_template(path: &Path) -> String {
    match tokio::fs::read_to_string(path).await {
        Ok(template) if !template.trim().is_empty() => {
            info!("Prompt template loaded from {}", path.display());
            template
        }
        Ok(_) => {
            warn!("Prompt template {} is empty, using built-in default", path.display());
            DEFAULT_TEMPLATE.to_string()
        }
        Err(e) => {
            warn!(
                "Prompt template {} not readable ({e}), using built-in default",
                path.display()
            );
            DEFAULT_TEMPLATE.to_string()
        }
    }
}

/// Literal placeholder replacement in a single pass; substituted values are never
/// rescanned and unknown placeholders are left untouched.
pub fn fill_template(template: &str, first_name: &str, last_name: &str, company: &str) -> String {
    PLACEHOLDER_RE
        .replace_all(template, |caps: &Captures| match &caps[0] {
            FIRST_NAME_PLACEHOLDER => first_name.to_string(),
            LAST_NAME_PLACEHOLDER => last_name.to_string(),
            _ => company.to_string(),
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn test_load_template_reads_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "Hallo {{{{candidatefirst_name}}}}!").unwrap();

        let template = load_template(file.path()).await;
        assert_eq!(template, "Hallo {{candidatefirst_name}}!");
    }

    #[tokio::test]
    async fn test_missing_template_falls_back_to_default() {
        let dir = tempfile::tempdir().unwrap();
        let template = load_template(&dir.path().join("missing.txt")).await;
        assert_eq!(template, DEFAULT_TEMPLATE);
    }

    #[tokio::test]
    async fn test_blank_template_falls_back_to_default() {
        let file = tempfile::NamedTempFile::new().unwrap();
        assert_eq!(load_template(file.path()).await, DEFAULT_TEMPLATE);
    }

    #[test]
    fn test_default_template_names_candidate_and_company() {
        let filled = fill_template(DEFAULT_TEMPLATE, "Max", "Mustermann", "Urban Kita gGmbH");
        assert!(filled.contains("Urban Kita gGmbH"));
        assert!(filled.contains("Max Mustermann"));
        assert!(!filled.contains("{{"));
    }

    #[test]
    fn test_fill_template_replaces_every_occurrence() {
        let filled = fill_template(
            "{{candidatefirst_name}} / {{candidatefirst_name}} / {{other}}",
            "Erika",
            "Muster",
            "Kita",
        );
        assert_eq!(filled, "Erika / Erika / {{other}}");
    }

    #[test]
    fn test_values_containing_placeholders_are_kept_literally() {
        let filled = fill_template(
            "{{candidatefirst_name}} {{candidatelast_name}} bei {{companyname}}",
            "{{candidatelast_name}}",
            "{{companyname}}",
            "Kita",
        );
        assert_eq!(filled, "{{candidatelast_name}} {{companyname}} bei Kita");
    }
}
