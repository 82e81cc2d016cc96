// Shared prompt fragments.
// Each module that needs LLM calls defines its own prompts.rs alongside it.

/// System prompt that forces a short literal answer instead of an explanation.
pub const SHORT_ANSWER_SYSTEM: &str = "Du bist ein präziser Datenextraktor für Recruiting-Kampagnen. \
    Antworte ausschließlich mit dem gesuchten Wert, ohne Erklärung, ohne Einleitung, \
    ohne Anführungszeichen und ohne Markdown. \
    Wenn der Wert nicht eindeutig aus den Daten hervorgeht, antworte exakt mit: unbekannt";

/// Answers the model gives when it has nothing to extract.
pub const NO_ANSWER_MARKERS: &[&str] = &[
    "unbekannt",
    "keine angabe",
    "keine angaben",
    "nicht angegeben",
    "n/a",
    "none",
    "unknown",
    "-",
];
