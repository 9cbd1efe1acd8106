//! Canonical, order-independent set of OAuth scopes.

use gk_shared::validation::validators;
use serde::{Deserialize, Serialize};

use crate::errors::{DomainResult, ValidationError};

/// Separator placed between scopes in canonical form. Valid scope tokens
/// never contain it.
pub const SCOPE_SEPARATOR: &str = " ";

/// Deduplicated, lexicographically sorted scopes
///
/// Two sets built from the same scopes in any order, with or without
/// duplicates, compare equal and render identically.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScopeSet(Vec<String>);

impl ScopeSet {
    /// Canonicalize and validate a list of scopes
    ///
    /// # Errors
    ///
    /// Returns a validation error if any scope is empty or contains a
    /// character outside the OAuth scope-token alphabet.
    pub fn new<I, S>(scopes: I) -> DomainResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut scopes: Vec<String> = scopes.into_iter().map(Into::into).collect();

        if let Some(bad) = scopes.iter().find(|scope| !validators::is_valid_scope(scope)) {
            return Err(ValidationError::invalid_format(format!("scopes[{:?}]", bad)).into());
        }

        scopes.sort();
        scopes.dedup();
        Ok(Self(scopes))
    }

    /// An empty scope set
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn contains(&self, scope: &str) -> bool {
        self.0.binary_search_by(|probe| probe.as_str().cmp(scope)).is_ok()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    /// Canonical single-string rendering (`"a b c"`)
    pub fn canonical(&self) -> String {
        self.0.join(SCOPE_SEPARATOR)
    }

    pub fn into_vec(self) -> Vec<String> {
        self.0
    }
}

impl std::fmt::Display for ScopeSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.canonical())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_order_and_dedup() {
        let scopes = ScopeSet::new(["scope3", "scope1", "scope2", "scope1"]).unwrap();
        assert_eq!(scopes.as_slice(), &["scope1", "scope2", "scope3"]);
        assert_eq!(scopes.canonical(), "scope1 scope2 scope3");
        assert_eq!(scopes.len(), 3);
    }

    #[test]
    fn test_permutations_are_equal() {
        let a = ScopeSet::new(["read", "write", "admin"]).unwrap();
        let b = ScopeSet::new(["admin", "read", "write", "read"]).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.to_string(), b.to_string());
    }

    #[test]
    fn test_contains() {
        let scopes = ScopeSet::new(["b", "a"]).unwrap();
        assert!(scopes.contains("a"));
        assert!(!scopes.contains("c"));
    }

    #[test]
    fn test_rejects_separator_and_empty_scopes() {
        assert!(ScopeSet::new(["read write"]).unwrap_err().is_validation());
        assert!(ScopeSet::new([""]).unwrap_err().is_validation());
    }

    #[test]
    fn test_empty_set() {
        let scopes = ScopeSet::new(Vec::<String>::new()).unwrap();
        assert!(scopes.is_empty());
        assert_eq!(scopes, ScopeSet::empty());
        assert_eq!(scopes.canonical(), "");
    }

    #[test]
    fn test_serializes_as_plain_list() {
        let scopes = ScopeSet::new(["b", "a"]).unwrap();
        assert_eq!(serde_json::to_string(&scopes).unwrap(), r#"["a","b"]"#);
    }
}
