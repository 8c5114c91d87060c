//! Answer text normalization.
//!
//! Submitted answers and stored answer variants pass through the same rule so
//! stray punctuation, double spaces and capitalisation never decide a mark.

/// Separator between accepted variants in stored texts.
pub const VARIANT_SEPARATOR: char = '/';

/// Normalize a text for answer comparison.
///
/// Lower-cases, drops every character that is not a letter, digit, whitespace
/// or `-`, collapses whitespace runs to a single space and trims.
pub fn normalize_answer(text: &str) -> String {
    let kept: String = text
        .to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace() || *c == '-')
        .collect();
    kept.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// The raw `/`-separated variants of a stored text, trimmed, empties dropped.
pub fn variants(text: &str) -> impl Iterator<Item = &str> {
    text.split(VARIANT_SEPARATOR)
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

/// The normalized answers accepted for a stored text, without duplicates.
pub fn accepted_answers(text: &str) -> Vec<String> {
    let mut answers: Vec<String> = Vec::new();
    for variant in variants(text) {
        let normalized = normalize_answer(variant);
        if !normalized.is_empty() && !answers.contains(&normalized) {
            answers.push(normalized);
        }
    }
    answers
}
