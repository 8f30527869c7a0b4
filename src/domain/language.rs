use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A language the dashboard offers for featured content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Language {
    pub code: &'static str,
    pub label: &'static str,
}

pub const AVAILABLE_LANGUAGES: &[Language] = &[
    Language { code: "bs", label: "Bosnian" },
    Language { code: "da", label: "Danish" },
    Language { code: "de", label: "German" },
    Language { code: "el", label: "Greek" },
    Language { code: "en", label: "English" },
    Language { code: "es", label: "Spanish" },
    Language { code: "fi", label: "Finnish" },
    Language { code: "fr", label: "French" },
    Language { code: "he", label: "Hebrew" },
    Language { code: "ko", label: "Korean" },
    Language { code: "no", label: "Norwegian (Bokmål)" },
    Language { code: "pl", label: "Polish" },
    Language { code: "pt", label: "Portuguese" },
    Language { code: "ru", label: "Russian" },
    Language { code: "sco", label: "Scots" },
    Language { code: "sv", label: "Swedish" },
    Language { code: "vi", label: "Vietnamese" },
];

pub fn find_language(code: &str) -> Option<&'static Language> {
    AVAILABLE_LANGUAGES.iter().find(|l| l.code == code)
}

/// Wiki language codes are short ASCII tags such as `en`, `sco` or `zh-yue`.
pub fn is_valid_language_code(code: &str) -> bool {
    !code.is_empty()
        && code.len() <= 16
        && code
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}

/// Translation provider codes may carry script or region parts in mixed
/// case, e.g. `zh-Hans` or `pt-BR`.
pub fn is_valid_translation_code(code: &str) -> bool {
    !code.is_empty()
        && code.len() <= 16
        && code.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
}

/// Entry of the translation provider's language list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationLanguage {
    pub code: String,
    pub name: String,
}

/// Reads a `[{code, name}, ...]` list, skipping entries without both fields.
pub fn parse_translation_languages(data: &Value) -> Vec<TranslationLanguage> {
    data.as_array()
        .map(|entries| {
            entries
                .iter()
                .filter_map(|e| serde_json::from_value(e.clone()).ok())
                .collect()
        })
        .unwrap_or_default()
}
