//! Shared utility functions used across multiple modules.

use std::sync::OnceLock;

use chrono::{DateTime, Local, SubsecRound, Utc};
use regex::Regex;

/// Normalize optional text by trimming whitespace and removing empties.
///
/// Returns `None` when the input is `None` or the trimmed value is empty.
pub fn normalize_text_option(value: Option<String>) -> Option<String> {
    let value = value?;
    let value = value.trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Current time truncated to millisecond precision, so timestamps survive the
/// ISO-8601 round trip through storage unchanged.
pub fn now_millis() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

fn tag_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"<[^>]*>").expect("Invalid regex"))
}

/// Remove markup tags and decode the handful of entities editors emit.
pub fn strip_html(html: &str) -> String {
    tag_pattern()
        .replace_all(html, "")
        .replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
        .trim()
        .to_string()
}

/// Truncate to `max_len` characters, appending `...` when shortened.
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() <= max_len {
        return text.to_string();
    }
    let mut truncated = text.chars().take(max_len).collect::<String>();
    truncated.truncate(truncated.trim_end().len());
    truncated.push_str("...");
    truncated
}

/// Human-friendly age of a timestamp relative to `now`.
pub fn format_relative_date(value: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let diff = now.signed_duration_since(value);
    let days = diff.num_days();

    if days <= 0 {
        let hours = diff.num_hours();
        if hours <= 0 {
            let minutes = diff.num_minutes();
            if minutes <= 0 {
                "Just now".to_string()
            } else {
                format!("{minutes}m ago")
            }
        } else {
            format!("{hours}h ago")
        }
    } else if days == 1 {
        "Yesterday".to_string()
    } else if days < 7 {
        format!("{days} days ago")
    } else {
        value.with_timezone(&Local).format("%Y-%m-%d").to_string()
    }
}
