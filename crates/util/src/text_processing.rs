//! # Text Processing Utilities
//!
//! Redaction of credential-looking values and summary truncation for log lines
//! and user-facing error messages.

use once_cell::sync::Lazy;
use regex::Regex;

const REDACTED: &str = "[REDACTED]";

/// Redacts values that look like secrets in a string.
///
/// Key names are preserved so redacted lines stay useful for debugging.
///
/// # Example
/// ```rust
/// use atladmin_util::redact_sensitive;
///
/// let redacted = redact_sensitive("ATLASSIAN_API_TOKEN=abc123 other=1");
/// assert_eq!(redacted, "ATLASSIAN_API_TOKEN=[REDACTED] other=1");
///
/// let redacted = redact_sensitive("Authorization: Basic dXNlcjpzZWNyZXQ=");
/// assert_eq!(redacted, "Authorization: [REDACTED]");
/// ```
pub fn redact_sensitive(input: &str) -> String {
    let mut redacted = input.to_string();

    for pattern in get_redact_patterns().iter() {
        redacted = pattern
            .replace_all(&redacted, |captures: &regex::Captures| {
                let prefix = captures.get(1).map(|m| m.as_str()).unwrap_or("");
                let suffix = captures.get(3).map(|m| m.as_str()).unwrap_or("");
                format!("{prefix}{REDACTED}{suffix}")
            })
            .to_string();
    }

    redacted
}

/// Returns compiled regex patterns for detecting sensitive information.
///
/// Each pattern captures an optional prefix (group 1), the secret value
/// (group 2) and an optional suffix (group 3). Patterns run in order.
pub fn get_redact_patterns() -> &'static Vec<Regex> {
    static REDACT_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(build_redact_patterns);

    &REDACT_PATTERNS
}

fn build_redact_patterns() -> Vec<Regex> {
    [
        // Authorization headers, any scheme.
        r"(?i)(authorization:\s+)([^\r\n]+)()",
        r"(?i)((?:^|\b)Bearer\s+)([A-Za-z0-9\-._~+/]+=*)()",
        r"(?i)((?:^|\b)Basic\s+)([A-Za-z0-9+/]+=*)()",
        // Atlassian API tokens.
        r"()(ATATT[A-Za-z0-9_\-=]{20,})()",
        // Shell-style assignments.
        r"(?i)((?:export\s+)?[A-Z0-9_]*(?:TOKEN|SECRET|PASSWORD|API_KEY)[A-Z0-9_]*\s*=\s*)([^\s]+)()",
        // JSON-style assignments.
        r#"(?i)("[A-Za-z0-9_]*(?:token|secret|password)[A-Za-z0-9_]*"\s*:\s*")([^"]+)(")"#,
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).expect("redaction patterns are valid"))
    .collect()
}

/// Trim and truncate text to `max_len` characters, appending `...` when cut.
pub fn truncate_for_summary(text: &str, max_len: usize) -> String {
    let trimmed = text.trim();
    if trimmed.chars().count() <= max_len {
        return trimmed.to_string();
    }

    // Reserve space for the trailing ellipsis.
    let target_len = max_len.saturating_sub(3);
    let truncated: String = trimmed.chars().take(target_len).collect();
    format!("{}...", truncated.trim_end())
}
