//! Script-based language detection for job descriptions and generated offers.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    English,
    Russian,
    Unknown,
}

impl Language {
    pub fn opposite(self) -> Option<Language> {
        match self {
            Language::English => Some(Language::Russian),
            Language::Russian => Some(Language::English),
            Language::Unknown => None,
        }
    }
}

const ENGLISH_FRAGMENTS: &[&str] = &["I'm Vladimir", "Open to chat?"];
const RUSSIAN_FRAGMENTS: &[&str] = &["это Владимир", "Буду рад пообщаться"];

/// Fixed greeting and call-to-action phrases of each language's template.
pub fn fragments(language: Language) -> &'static [&'static str] {
    match language {
        Language::English => ENGLISH_FRAGMENTS,
        Language::Russian => RUSSIAN_FRAGMENTS,
        Language::Unknown => &[],
    }
}

fn is_cyrillic(c: char) -> bool {
    matches!(c, '\u{0400}'..='\u{04FF}' | '\u{0500}'..='\u{052F}')
}

/// Majority script among alphabetic characters. Tech stacks are written in
/// Latin everywhere, so a Russian text only needs more Cyrillic than Latin letters.
pub fn detect_language(text: &str) -> Language {
    let (mut cyrillic, mut latin) = (0usize, 0usize);
    for c in text.chars().filter(|c| c.is_alphabetic()) {
        if is_cyrillic(c) {
            cyrillic += 1;
        } else if c.is_ascii_alphabetic() {
            latin += 1;
        }
    }

    match (cyrillic, latin) {
        (0, 0) => Language::Unknown,
        (c, l) if c > l => Language::Russian,
        _ => Language::English,
    }
}

/// Template phrases of the *other* language that leaked into `message`.
pub fn foreign_fragments(message: &str, expected: Language) -> Vec<&'static str> {
    let Some(other) = expected.opposite() else {
        return Vec::new();
    };
    fragments(other)
        .iter()
        .copied()
        .filter(|f| message.contains(f))
        .collect()
}
