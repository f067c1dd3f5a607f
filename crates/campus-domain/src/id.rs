//! Identifier helpers.

use uuid::Uuid;

/// Generate a time-ordered identifier for a new row key.
pub fn new_id() -> String {
    Uuid::now_v7().to_string()
}

/// Whether `key` may be used as a partition or row key.
///
/// Keys must be non-empty and must not contain `/`, `\`, `#`, `?` or control characters.
pub fn is_valid_key(key: &str) -> bool {
    !key.is_empty()
        && !key
            .chars()
            .any(|c| matches!(c, '/' | '\\' | '#' | '?') || c.is_control())
}
