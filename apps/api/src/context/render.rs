//! Pure text-block renderers. Identical input always renders identical text, and an
//! empty question list still renders its header so templates never see a hole.

use std::fmt::Write as _;

use crate::hoc::{Priority, Question, Questionnaire};

pub const ALL_QUESTIONS_HEADER: &str = "=== ALLE FRAGEN ===";
pub const MUST_QUESTIONS_HEADER: &str = "=== PFLICHTFRAGEN (K.O.-KRITERIEN) ===";
pub const OPTIONAL_QUESTIONS_HEADER: &str = "=== OPTIONALE FRAGEN (PRÄFERENZEN) ===";
pub const NO_QUESTIONS_MARKER: &str = "(keine Fragen hinterlegt)";
pub const NO_QUESTIONNAIRE_MARKER: &str = "Keine Questionnaire-Daten verfügbar.";

const DEFAULT_GROUP: &str = "Allgemein";

pub fn render_all_questions(questions: &[Question]) -> String {
    render_listing(ALL_QUESTIONS_HEADER, questions.iter())
}

pub fn render_must_questions(questions: &[Question]) -> String {
    render_listing(
        MUST_QUESTIONS_HEADER,
        questions.iter().filter(|q| q.is_gating()),
    )
}

pub fn render_optional_questions(questions: &[Question]) -> String {
    render_listing(
        OPTIONAL_QUESTIONS_HEADER,
        questions.iter().filter(|q| !q.is_gating()),
    )
}

/// Descriptive fields, extra data and the full question listing.
pub fn render_narrative(questionnaire: &Questionnaire) -> String {
    let mut out = String::new();

    if questionnaire.is_empty() {
        out.push_str(NO_QUESTIONNAIRE_MARKER);
        out.push_str("\n\n");
    } else {
        let lines = [
            ("Kampagne", &questionnaire.title),
            ("Position", &questionnaire.position),
            ("Rolle", &questionnaire.role_title),
            ("Abteilung", &questionnaire.department),
            ("Arbeitsplatz-Standort", &questionnaire.location),
            ("Postleitzahl des Arbeitsplatzes", &questionnaire.postal_code),
            ("Unternehmensgröße", &questionnaire.company_size),
        ];
        for (label, value) in lines {
            if let Some(value) = value {
                let _ = writeln!(out, "{label}: {value}");
            }
        }

        let paragraphs = [
            ("Beschreibung", &questionnaire.description),
            ("Anforderungen", &questionnaire.requirements),
            ("Schlüssel-Qualifikationen", &questionnaire.key_qualifications),
            ("Unternehmensvorteile", &questionnaire.benefits),
            ("Gesprächsziele", &questionnaire.goals),
            ("Prioritäten", &questionnaire.company_priorities),
            ("Pitch", &questionnaire.company_pitch),
        ];
        for (label, value) in paragraphs {
            if let Some(value) = value {
                let _ = write!(out, "\n{label}:\n{value}\n");
            }
        }

        if !questionnaire.extra.is_empty() {
            out.push('\n');
            for (key, value) in &questionnaire.extra {
                let _ = writeln!(out, "{key}: {value}");
            }
        }
        out.push('\n');
    }

    out.push_str(&render_all_questions(&questionnaire.questions));
    out
}

/// Sorts by (priority, position), then groups by (priority, group label) in order of
/// first appearance, so gating questions always precede preference questions.
fn render_listing<'a>(header: &str, questions: impl Iterator<Item = &'a Question>) -> String {
    let mut sorted: Vec<&Question> = questions.collect();
    sorted.sort_by_key(|q| (q.priority, q.position.unwrap_or(i64::MAX)));

    let mut out = String::from(header);
    if sorted.is_empty() {
        out.push('\n');
        out.push_str(NO_QUESTIONS_MARKER);
        return out;
    }

    let mut groups: Vec<((Priority, &str), Vec<&Question>)> = Vec::new();
    for question in sorted {
        let key = (
            question.priority,
            question.group.as_deref().unwrap_or(DEFAULT_GROUP),
        );
        match groups.iter_mut().find(|(k, _)| *k == key) {
            Some((_, items)) => items.push(question),
            None => groups.push((key, vec![question])),
        }
    }

    let mut number = 0;
    for ((_, label), items) in groups {
        let _ = write!(out, "\n\n[{label}]");
        for question in items {
            number += 1;
            render_item(&mut out, number, question);
        }
    }
    out
}

fn render_item(out: &mut String, number: usize, question: &Question) {
    let tier = match question.priority {
        Priority::Gating => "[PFLICHT]",
        Priority::Preference => "[OPTIONAL]",
    };
    let _ = write!(out, "\n{number}. {tier} {}", question.text);

    let annotations = [
        ("Einleitung", &question.preamble),
        ("Kontext", &question.context),
        ("Hinweis", &question.help_text),
    ];
    for (label, value) in annotations {
        if let Some(value) = value {
            let _ = write!(out, "\n   {label}: {value}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(text: &str, priority: Priority, group: Option<&str>, position: Option<i64>) -> Question {
        Question {
            group: group.map(str::to_string),
            position,
            ..Question::new(text, priority)
        }
    }

    fn sample() -> Vec<Question> {
        vec![
            question("Teilzeit gewünscht?", Priority::Preference, Some("Rahmen"), Some(1)),
            question("Staatlich anerkannt?", Priority::Gating, Some("Qualifikation"), Some(2)),
            question("Führungszeugnis vorhanden?", Priority::Gating, Some("Qualifikation"), Some(1)),
            question("Wann verfügbar?", Priority::Preference, None, None),
        ]
    }

    #[test]
    fn test_empty_listings_keep_their_headers() {
        for (rendered, header) in [
            (render_all_questions(&[]), ALL_QUESTIONS_HEADER),
            (render_must_questions(&[]), MUST_QUESTIONS_HEADER),
            (render_optional_questions(&[]), OPTIONAL_QUESTIONS_HEADER),
        ] {
            assert!(rendered.starts_with(header));
            assert!(rendered.contains(NO_QUESTIONS_MARKER));
        }
    }

    #[test]
    fn test_all_questions_orders_gating_first_and_groups() {
        let rendered = render_all_questions(&sample());
        let expected = "=== ALLE FRAGEN ===\n\n\
            [Qualifikation]\n\
            1. [PFLICHT] Führungszeugnis vorhanden?\n\
            2. [PFLICHT] Staatlich anerkannt?\n\n\
            [Rahmen]\n\
            3. [OPTIONAL] Teilzeit gewünscht?\n\n\
            [Allgemein]\n\
            4. [OPTIONAL] Wann verfügbar?";
        assert_eq!(rendered, expected);
    }

    #[test]
    fn test_must_and_optional_split_by_tier() {
        let questions = sample();
        let must = render_must_questions(&questions);
        let optional = render_optional_questions(&questions);

        assert!(must.contains("Staatlich anerkannt?"));
        assert!(!must.contains("Teilzeit gewünscht?"));
        assert!(optional.contains("Teilzeit gewünscht?"));
        assert!(!optional.contains("Führungszeugnis"));
        assert!(optional.contains("1. [OPTIONAL] Teilzeit gewünscht?"));
    }

    #[test]
    fn test_annotations_are_indented_under_item() {
        let q = Question {
            preamble: Some("Kurz zur Qualifikation:".to_string()),
            help_text: Some("Nur Ja/Nein".to_string()),
            ..Question::new("Staatlich anerkannt?", Priority::Gating)
        };
        let rendered = render_must_questions(&[q]);
        assert!(rendered.ends_with(
            "1. [PFLICHT] Staatlich anerkannt?\n   Einleitung: Kurz zur Qualifikation:\n   Hinweis: Nur Ja/Nein"
        ));
    }

    #[test]
    fn test_rendering_is_stable() {
        let questions = sample();
        assert_eq!(render_all_questions(&questions), render_all_questions(&questions));
    }

    #[test]
    fn test_narrative_for_empty_questionnaire() {
        let rendered = render_narrative(&Questionnaire::default());
        assert!(rendered.starts_with(NO_QUESTIONNAIRE_MARKER));
        assert!(rendered.contains(ALL_QUESTIONS_HEADER));
        assert!(rendered.contains(NO_QUESTIONS_MARKER));
    }

    #[test]
    fn test_narrative_lists_fields_and_extra_data() {
        let mut questionnaire = Questionnaire {
            title: Some("Erzieher:innen 2025".to_string()),
            location: Some("Berlin".to_string()),
            description: Some("Bilinguale Kita".to_string()),
            questions: sample(),
            ..Default::default()
        };
        questionnaire
            .extra
            .insert("schichtsystem".to_string(), "Früh/Spät".to_string());

        let rendered = render_narrative(&questionnaire);
        assert!(rendered.starts_with("Kampagne: Erzieher:innen 2025\nArbeitsplatz-Standort: Berlin\n"));
        assert!(rendered.contains("\nBeschreibung:\nBilinguale Kita\n"));
        assert!(rendered.contains("schichtsystem: Früh/Spät"));
        assert!(rendered.ends_with("4. [OPTIONAL] Wann verfügbar?"));
    }
}
