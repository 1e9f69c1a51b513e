//! Output formatting helpers shared by the commands.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::AccessAidError;

/// Generic JSON formatter for any serializable type
///
/// # Errors
///
/// Returns `AccessAidError::Parse` if JSON serialization fails.
pub fn to_json<T: Serialize>(value: &T) -> Result<String, AccessAidError> {
    Ok(serde_json::to_string_pretty(value)?)
}

/// Human-friendly age of a timestamp relative to `now`.
#[must_use]
pub fn format_age(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let age = now.signed_duration_since(then);
    if age.num_days() > 0 {
        format!("{} days ago", age.num_days())
    } else if age.num_hours() > 0 {
        format!("{} hours ago", age.num_hours())
    } else if age.num_minutes() > 0 {
        format!("{} minutes ago", age.num_minutes())
    } else {
        "just now".to_string()
    }
}

/// Shorten `text` to at most `max` characters, marking the cut with `...`.
#[must_use]
pub fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let kept: String = text.chars().take(max.saturating_sub(3)).collect();
    format!("{kept}...")
}
