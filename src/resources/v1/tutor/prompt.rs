use once_cell::sync::Lazy;
use std::collections::HashMap;

const FALLBACK_INTRO: &str = "You are a helpful AI tutor.";

static SUBJECT_INTROS: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("math", "You are a friendly Math tutor."),
        ("science", "You explain science with clarity and excitement."),
        ("sst", "You teach Social Studies using relatable examples."),
        (
            "english",
            "You help students learn English using simple grammar tips and vocabulary.",
        ),
        ("biology", "You explain biology concepts visually and clearly."),
        ("chemistry", "You explain chemistry using everyday examples."),
        ("coding", "You teach programming with clear code samples."),
        ("history", "You explain history as engaging stories."),
    ])
});

/// Subjects with a dedicated tutor persona, sorted.
pub fn known_subjects() -> Vec<&'static str> {
    let mut subjects: Vec<_> = SUBJECT_INTROS.keys().copied().collect();
    subjects.sort_unstable();
    subjects
}

/// Persona line for a subject. Matching is case-insensitive.
pub fn subject_intro(subject: &str) -> &'static str {
    SUBJECT_INTROS
        .get(subject.to_lowercase().as_str())
        .copied()
        .unwrap_or(FALLBACK_INTRO)
}

pub fn build_prompt(subject: &str, level: &str, question: &str) -> String {
    let intro = subject_intro(subject);
    format!(
        "{intro} The student is at a {level} level.\n\
         They asked: \"{question}\"\n\
         Please explain in a clear, friendly tone with examples to help them understand."
    )
}
