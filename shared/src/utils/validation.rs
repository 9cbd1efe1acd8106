//! Common validation utilities

use once_cell::sync::Lazy;
use regex::Regex;

/// RFC 6749 `scope-token`: one or more printable ASCII characters excluding
/// space, double quote and backslash.
static SCOPE_TOKEN_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"^[\x21\x23-\x5B\x5D-\x7E]+$"#).expect("valid scope regex"));

/// Common validation functions
pub mod validators {
    use super::SCOPE_TOKEN_PATTERN;

    /// Check if a string is not empty
    pub fn not_empty(value: &str) -> bool {
        !value.trim().is_empty()
    }

    /// Check if a string length is within bounds
    pub fn length_between(value: &str, min: usize, max: usize) -> bool {
        let len = value.len();
        len >= min && len <= max
    }

    /// Check if a string is a valid OAuth scope token
    pub fn is_valid_scope(value: &str) -> bool {
        SCOPE_TOKEN_PATTERN.is_match(value)
    }
}
