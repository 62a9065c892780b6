//! Pulls workflow parameters out of free text.

use crate::config::ActivityConfig;

/// First whitespace-delimited token ending in `suffix` (case-insensitive),
/// returned exactly as written in the prompt.
pub fn find_document_token(prompt: &str, suffix: &str) -> Option<String> {
    let suffix = suffix.to_lowercase();
    prompt
        .split_whitespace()
        .find(|token| token.to_lowercase().ends_with(&suffix))
        .map(str::to_string)
}

/// The first token after the last occurrence of `phrase`.
///
/// Matching is case-insensitive and the token comes back lower-cased.
/// The token is not validated as an address.
pub fn find_recipient(prompt: &str, phrase: &str) -> Option<String> {
    let phrase = phrase.trim().to_lowercase();
    if phrase.is_empty() {
        return None;
    }

    let lowered = prompt.to_lowercase();
    let start = lowered.rfind(&phrase)? + phrase.len();
    lowered[start..].split_whitespace().next().map(str::to_string)
}

/// Labels of every topic keyword found in `text`, in configured order.
pub fn matched_topics<'a>(text: &str, config: &'a ActivityConfig) -> Vec<&'a str> {
    let text = text.to_lowercase();
    let mut labels: Vec<&str> = config
        .topics
        .iter()
        .filter(|topic| text.contains(&topic.keyword.to_lowercase()))
        .map(|topic| topic.label.as_str())
        .collect();

    if labels.is_empty() {
        labels.push(config.fallback_topic.as_str());
    }
    labels
}

/// "Summary of X's recent posts:\n- Discussed a, b."
pub fn topic_summary(display_name: &str, text: &str, config: &ActivityConfig) -> String {
    format!(
        "Summary of {}'s recent posts:\n- Discussed {}.",
        display_name,
        matched_topics(text, config).join(", ")
    )
}

/// "PDF" for ".pdf".
pub fn suffix_label(suffix: &str) -> String {
    suffix.trim().trim_start_matches('.').to_uppercase()
}
