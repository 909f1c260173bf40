use validator::ValidateEmail;

/// Validates that the input looks like a valid email address
pub fn is_valid_email(email: &str) -> bool {
    let email = email.trim();
    !email.is_empty() && email.validate_email()
}

/// Canonical form used for every comparison and write: trimmed and lower-cased.
pub fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Parses an optional numeric query value and clamps it to `[min, max]`.
/// Missing, empty or non-numeric input yields `default` instead of an error.
pub fn parse_clamped(raw: Option<&str>, default: i64, min: i64, max: i64) -> i64 {
    raw.map(str::trim)
        .and_then(|v| v.parse::<i64>().ok())
        .map(|v| v.clamp(min, max))
        .unwrap_or(default)
}
