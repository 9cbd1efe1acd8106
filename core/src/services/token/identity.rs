//! Identity key derivation
//!
//! An identity key names "the token for this consumer, auth type and scope
//! set". It is pure: equal inputs (scopes compared as a set) give equal
//! keys, and any difference in consumer, auth type or scope membership gives
//! a different key.

use sha2::{Digest, Sha256};

use crate::domain::value_objects::ScopeSet;

/// Canonical identity of a token request
///
/// Layout: `<len>:<consumer_id>:<len>:<auth_type>:<scopes>` where both
/// lengths are byte counts and scopes are joined by a single space. The
/// length prefixes keep the encoding injective even when the consumer id or
/// auth type contain `:`; scope tokens can never contain a space.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IdentityKey(String);

impl IdentityKey {
    /// Derive the identity key for a request
    pub fn derive(consumer_id: &str, auth_type: &str, scopes: &ScopeSet) -> Self {
        Self(format!(
            "{}:{}:{}:{}:{}",
            consumer_id.len(),
            consumer_id,
            auth_type.len(),
            auth_type,
            scopes.canonical()
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Fixed-length digest used to build store keys, so consumer ids never
    /// appear in the key space
    pub fn digest(&self) -> String {
        hex::encode(Sha256::digest(self.0.as_bytes()))
    }
}

impl std::fmt::Display for IdentityKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::TOKEN_DELIMITER;

    fn scopes(list: &[&str]) -> ScopeSet {
        ScopeSet::new(list.iter().copied()).unwrap()
    }

    #[test]
    fn test_layout() {
        let key = IdentityKey::derive("1234", "oauth", &scopes(&["b", "a"]));
        assert_eq!(key.as_str(), "4:1234:5:oauth:a b");

        let key = IdentityKey::derive("1234", "oauth", &ScopeSet::empty());
        assert_eq!(key.as_str(), "4:1234:5:oauth:");
    }

    #[test]
    fn test_scope_order_and_duplicates_do_not_matter() {
        let a = IdentityKey::derive("1234", "oauth", &scopes(&["scope1", "scope2", "scope3"]));
        let b = IdentityKey::derive("1234", "oauth", &scopes(&["scope3", "scope2", "scope1"]));
        let c = IdentityKey::derive("1234", "oauth", &scopes(&["scope2", "scope1", "scope3", "scope1"]));
        assert_eq!(a, b);
        assert_eq!(a, c);
        assert_eq!(a.digest(), c.digest());
    }

    #[test]
    fn test_any_field_difference_changes_key() {
        let base = IdentityKey::derive("1234", "oauth", &scopes(&["read"]));

        assert_ne!(base, IdentityKey::derive("1235", "oauth", &scopes(&["read"])));
        assert_ne!(base, IdentityKey::derive("1234", "basic", &scopes(&["read"])));
        assert_ne!(base, IdentityKey::derive("1234", "oauth", &scopes(&["read", "write"])));
        assert_ne!(base, IdentityKey::derive("1234", "oauth", &ScopeSet::empty()));
    }

    #[test]
    fn test_separator_inside_fields_cannot_collide() {
        // Without length prefixes both would render as "a:b:c:..."
        let a = IdentityKey::derive("a:b", "c", &ScopeSet::empty());
        let b = IdentityKey::derive("a", "b:c", &ScopeSet::empty());
        assert_ne!(a, b);
        assert_ne!(a.digest(), b.digest());
    }

    #[test]
    fn test_key_never_uses_token_delimiter_as_separator() {
        let key = IdentityKey::derive("1234", "oauth", &scopes(&["x", "y"]));
        assert!(!key.as_str().contains(TOKEN_DELIMITER));
        assert_eq!(key.digest().len(), 64);
    }
}
