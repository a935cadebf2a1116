use anyhow::{Result, anyhow};
use isolang::Language;

/// Language utilities for caption language codes
///
/// Caption documents carry codes such as `en`, `fra` or `pt-br`: an ISO 639-1
/// or ISO 639-2 primary code, optionally followed by region or variant
/// subtags. Only the primary code is checked against the ISO tables.
/// Language code type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LanguageCodeType {
    /// ISO 639-1 (2-letter) code
    Part1,
    /// ISO 639-2/T (3-letter) code
    Part2T,
    /// ISO 639-2/B (3-letter) code
    Part2B,
}

// @const: ISO 639-2/B codes that differ from their 639-2/T form
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

fn terminology_code(bibliographic: &str) -> Option<&'static str> {
    BIBLIOGRAPHIC_CODES
        .iter()
        .find(|(b, _)| *b == bibliographic)
        .map(|(_, t)| *t)
}

/// Split a code into its lowercase primary code and the remaining subtags
fn split_code(code: &str) -> Result<(String, Vec<String>)> {
    let normalized = code.trim().to_lowercase().replace('_', "-");
    let mut parts = normalized.split('-');
    let primary = parts.next().unwrap_or_default().to_string();
    let subtags: Vec<String> = parts.map(str::to_string).collect();
    let valid_subtags = subtags
        .iter()
        .all(|tag| (2..=8).contains(&tag.len()) && tag.chars().all(|c| c.is_ascii_alphanumeric()));
    if !valid_subtags {
        return Err(anyhow!("Invalid language code: {}", code));
    }
    Ok((primary, subtags))
}

/// Validate a language code, returning the kind of its primary code
pub fn validate_language_code(code: &str) -> Result<LanguageCodeType> {
    let (primary, _) = split_code(code)?;

    match primary.len() {
        2 if Language::from_639_1(&primary).is_some() => Ok(LanguageCodeType::Part1),
        3 if Language::from_639_3(&primary).is_some() => Ok(LanguageCodeType::Part2T),
        3 if terminology_code(&primary).is_some() => Ok(LanguageCodeType::Part2B),
        _ => Err(anyhow!("Invalid language code: {}", code)),
    }
}

/// Normalize the primary code to ISO 639-2/T (3-letter) format; subtags are dropped
pub fn normalize_to_part2t(code: &str) -> Result<String> {
    let (primary, _) = split_code(code)?;

    match primary.len() {
        2 => Language::from_639_1(&primary).map(|lang| lang.to_639_3().to_string()),
        3 if Language::from_639_3(&primary).is_some() => Some(primary),
        3 => terminology_code(&primary).map(str::to_string),
        _ => None,
    }
    .ok_or_else(|| anyhow!("Cannot normalize invalid language code: {}", code))
}

/// Normalize a code to ISO 639-1 where one exists, ISO 639-2/T otherwise.
///
/// Region subtags are kept, so `POR-BR` becomes `pt-br`.
pub fn normalize_to_part1_or_part2t(code: &str) -> Result<String> {
    let (_, subtags) = split_code(code)?;
    let part2t = normalize_to_part2t(code)?;
    let lang = Language::from_639_3(&part2t)
        .ok_or_else(|| anyhow!("Cannot normalize invalid language code: {}", code))?;

    let mut normalized = lang.to_639_1().unwrap_or(part2t.as_str()).to_string();
    for subtag in subtags {
        normalized.push('-');
        normalized.push_str(&subtag);
    }
    Ok(normalized)
}

/// Check if two language codes have the same primary language
pub fn language_codes_match(code1: &str, code2: &str) -> bool {
    match (normalize_to_part2t(code1), normalize_to_part2t(code2)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// Get the English language name from a code
pub fn get_language_name(code: &str) -> Result<String> {
    let normalized = normalize_to_part2t(code)?;
    let lang = Language::from_639_3(&normalized)
        .ok_or_else(|| anyhow!("Failed to get language from code: {}", normalized))?;

    Ok(lang.to_name().to_string())
}
