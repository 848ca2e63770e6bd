/// Normalize a free-text label for comparison.
///
/// Normalization rules:
/// - Convert to lowercase
/// - Replace everything that is not alphanumeric with a space
/// - Collapse runs of whitespace and trim
pub fn normalize_label(text: &str) -> String {
    text.to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Split a label into normalized word tokens
pub fn label_tokens(text: &str) -> Vec<String> {
    normalize_label(text)
        .split_whitespace()
        .map(str::to_string)
        .collect()
}
