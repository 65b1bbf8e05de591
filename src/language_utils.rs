//! Language utilities for the labels passed to the translator
//!
//! Source and target languages are free-form labels ("English", "Brazilian
//! Portuguese"), but ISO 639-1 and ISO 639-2 codes are accepted as a
//! shorthand and expanded to their English names before they reach a prompt.

use anyhow::{anyhow, Result};
use isolang::Language;

// ISO 639-2/B codes that differ from their 639-2/T counterpart
const BIBLIOGRAPHIC_CODES: [(&str, &str); 18] = [
    ("fre", "fra"),
    ("ger", "deu"),
    ("dut", "nld"),
    ("gre", "ell"),
    ("chi", "zho"),
    ("cze", "ces"),
    ("ice", "isl"),
    ("alb", "sqi"),
    ("arm", "hye"),
    ("baq", "eus"),
    ("bur", "mya"),
    ("per", "fas"),
    ("geo", "kat"),
    ("may", "msa"),
    ("mac", "mkd"),
    ("rum", "ron"),
    ("slo", "slk"),
    ("wel", "cym"),
];

/// Resolve an ISO 639-1 or ISO 639-2 (T or B) code
pub fn language_from_code(code: &str) -> Option<Language> {
    let normalized_code = code.trim().to_lowercase();

    match normalized_code.len() {
        2 => Language::from_639_1(&normalized_code),
        3 => {
            let part2t = BIBLIOGRAPHIC_CODES
                .iter()
                .find(|(bibliographic, _)| *bibliographic == normalized_code)
                .map(|(_, terminologic)| *terminologic)
                .unwrap_or(normalized_code.as_str());
            Language::from_639_3(part2t)
        }
        _ => None,
    }
}

/// Get the English language name from a code
pub fn get_language_name(code: &str) -> Result<String> {
    language_from_code(code)
        .map(|lang| lang.to_name().to_string())
        .ok_or_else(|| anyhow!("Invalid language code: {}", code))
}

/// Label to put in a prompt: codes become English names, anything else is
/// passed through trimmed
pub fn display_language(label: &str) -> String {
    get_language_name(label).unwrap_or_else(|_| label.trim().to_string())
}

/// Short tag for output file names (`movie.<tag>.srt`)
///
/// Codes normalize to ISO 639-1 where one exists, free-form labels are
/// lowercased with runs of non-alphanumerics collapsed to `-`.
pub fn file_tag(label: &str) -> String {
    if let Some(lang) = language_from_code(label) {
        return lang
            .to_639_1()
            .map(str::to_string)
            .unwrap_or_else(|| lang.to_639_3().to_string());
    }

    let mut tag = String::new();
    for c in label.trim().chars() {
        if c.is_alphanumeric() {
            tag.extend(c.to_lowercase());
        } else if !tag.is_empty() && !tag.ends_with('-') {
            tag.push('-');
        }
    }
    tag.trim_end_matches('-').to_string()
}

/// Check if two labels name the same language
pub fn languages_match(first: &str, second: &str) -> bool {
    match (language_from_code(first), language_from_code(second)) {
        (Some(a), Some(b)) => a == b,
        _ => display_language(first).eq_ignore_ascii_case(&display_language(second)),
    }
}
