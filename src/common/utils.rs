use chrono::{DateTime, Utc};

/// Whole seconds elapsed between `since` and `now`, floored at zero.
pub fn elapsed_secs(since: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    now.signed_duration_since(since).num_seconds().max(0)
}

/// Strips surrounding whitespace, mapping blank input to `None`.
pub fn non_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Case folding shared by discovery and readiness matching.
pub fn fold_case(value: &str) -> String {
    value.to_lowercase()
}
