//! Language detection and per-language label templates.

use serde::Serialize;

/// Unicode script blocks and the language code each one implies.
const SCRIPT_RANGES: &[(char, char, &str)] = &[
    ('\u{0900}', '\u{097F}', "hi"), // Devanagari
    ('\u{0980}', '\u{09FF}', "bn"), // Bengali
    ('\u{0A80}', '\u{0AFF}', "gu"), // Gujarati
    ('\u{0B80}', '\u{0BFF}', "ta"), // Tamil
    ('\u{0C00}', '\u{0C7F}', "te"), // Telugu
    ('\u{0C80}', '\u{0CFF}', "kn"), // Kannada
    ('\u{0D00}', '\u{0D7F}', "ml"), // Malayalam
];

/// Detects the language of `text` from the first character in a known Indic script.
///
/// Single pass over the input, no allocation. Returns `default` when no
/// script-specific character is present.
pub fn detect_language<'a>(text: &str, default: &'a str) -> &'a str {
    text.chars()
        .find_map(|c| {
            SCRIPT_RANGES
                .iter()
                .find(|(lo, hi, _)| (*lo..=*hi).contains(&c))
                .map(|(_, _, code)| *code)
        })
        .unwrap_or(default)
}

/// Case-insensitive membership check against the supported language codes.
pub fn validate_language_support<S: AsRef<str>>(code: &str, supported: &[S]) -> bool {
    let code = code.trim();
    supported
        .iter()
        .any(|s| s.as_ref().trim().eq_ignore_ascii_case(code))
}

/// Language names (English and native script) mentioned in teacher requests.
pub(crate) const LANGUAGE_HINTS: &[(&str, &str)] = &[
    ("hindi", "hi"),
    ("हिंदी", "hi"),
    ("हिन्दी", "hi"),
    ("telugu", "te"),
    ("తెలుగు", "te"),
    ("tamil", "ta"),
    ("தமிழ்", "ta"),
    ("bengali", "bn"),
    ("marathi", "mr"),
    ("gujarati", "gu"),
    ("kannada", "kn"),
    ("malayalam", "ml"),
    ("english", "en"),
];

/// Human readable details for a language code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct LanguageInfo {
    pub name: &'static str,
    pub script: &'static str,
}

pub fn language_info(code: &str) -> Option<LanguageInfo> {
    let (name, script) = match code.to_lowercase().as_str() {
        "en" => ("English", "Latin"),
        "hi" => ("Hindi", "Devanagari"),
        "te" => ("Telugu", "Telugu"),
        "ta" => ("Tamil", "Tamil"),
        "bn" => ("Bengali", "Bengali"),
        "mr" => ("Marathi", "Devanagari"),
        "gu" => ("Gujarati", "Gujarati"),
        "kn" => ("Kannada", "Kannada"),
        "ml" => ("Malayalam", "Malayalam"),
        _ => return None,
    };
    Some(LanguageInfo { name, script })
}

/// Section labels used when formatting generated material.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LanguageTemplate {
    pub greeting: &'static str,
    pub instructions: &'static str,
    pub questions: &'static str,
    pub answer: &'static str,
    pub level: &'static str,
}

const ENGLISH_TEMPLATE: LanguageTemplate = LanguageTemplate {
    greeting: "Hello! I am Sahayak.",
    instructions: "Instructions:",
    questions: "Questions:",
    answer: "Answer:",
    level: "Level:",
};

/// Returns the label template for `code`, falling back to English.
pub fn language_template(code: &str) -> LanguageTemplate {
    match code.to_lowercase().as_str() {
        "hi" => LanguageTemplate {
            greeting: "नमस्ते! मैं सहायक हूँ।",
            instructions: "निर्देश:",
            questions: "प्रश्न:",
            answer: "उत्तर:",
            level: "स्तर:",
        },
        "te" => LanguageTemplate {
            greeting: "నమస్కారం! నేను సహాయక్‌ని।",
            instructions: "సూచనలు:",
            questions: "ప్రశ్నలు:",
            answer: "సమాధానం:",
            level: "స్థాయి:",
        },
        _ => ENGLISH_TEMPLATE,
    }
}
