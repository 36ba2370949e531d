//! North American phone number validation and formatting.

use std::sync::LazyLock;

use regex::Regex;

/// Accepted layouts, each anchored so that exactly ten significant digits
/// (plus an optional leading `1`) are present.
static PHONE_PATTERNS: LazyLock<[Regex; 3]> = LazyLock::new(|| {
    [
        // +1 (514) 555-1234, 1-514-555-1234
        Regex::new(r"(?:^|[^\d])\+?1[-.\s]?\(?[2-9]\d{2}\)?[-.\s]?\d{3}[-.\s]?\d{4}(?:[^\d]|$)")
            .expect("valid regex"),
        // (514) 555-1234, 514.555.1234
        Regex::new(r"(?:^|[^\d])\(?[2-9]\d{2}\)?[-.\s]?\d{3}[-.\s]?\d{4}(?:[^\d]|$)")
            .expect("valid regex"),
        // 5145551234
        Regex::new(r"(?:^|[^\d])[2-9]\d{2}\d{3}\d{4}(?:[^\d]|$)").expect("valid regex"),
    ]
});

static PHONE_IN_TEXT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|[^\d])(?:\+?1[-.\s]?)?\(?([2-9]\d{2})\)?[-.\s]?(\d{3})[-.\s]?(\d{4})(?:[^\d]|$)")
        .expect("valid regex")
});

/// Returns `true` when `text` contains a ten-digit North American number.
#[must_use]
pub fn is_valid_phone(text: &str) -> bool {
    PHONE_PATTERNS.iter().any(|re| re.is_match(text))
}

/// Format a phone number as `(AAA) EEE-NNNN`.
///
/// A leading country code `1` on an eleven-digit number is dropped. Anything
/// that does not reduce to exactly ten digits is returned trimmed but
/// otherwise unchanged, which keeps the function idempotent.
#[must_use]
pub fn normalize_phone(text: &str) -> String {
    let digits: String = text.chars().filter(char::is_ascii_digit).collect();
    let digits = match digits.len() {
        10 => digits.as_str(),
        11 if digits.starts_with('1') => &digits[1..],
        _ => return text.trim().to_string(),
    };
    format_digits(&digits[..3], &digits[3..6], &digits[6..])
}

/// First phone number appearing anywhere in `text`, normalized.
#[must_use]
pub fn find_phone_in_text(text: &str) -> Option<String> {
    let caps = PHONE_IN_TEXT.captures(text)?;
    Some(format_digits(&caps[1], &caps[2], &caps[3]))
}

fn format_digits(area: &str, exchange: &str, line: &str) -> String {
    format!("({area}) {exchange}-{line}")
}

#[cfg(test)]
#[path = "phone_test.rs"]
mod tests;
