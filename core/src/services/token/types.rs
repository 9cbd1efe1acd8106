//! Result types for token service operations

/// Outcome of exclusive get-or-create issuance
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IssueOutcome {
    /// A live token already existed for the identity
    Found(String),
    /// A new token was issued
    Created(String),
    /// Another caller holds the identity lock; nothing was issued
    LockContended,
}

impl IssueOutcome {
    /// The composite token, unless the lock was contended
    pub fn token(&self) -> Option<&str> {
        match self {
            IssueOutcome::Found(token) | IssueOutcome::Created(token) => Some(token),
            IssueOutcome::LockContended => None,
        }
    }

    pub fn into_token(self) -> Option<String> {
        match self {
            IssueOutcome::Found(token) | IssueOutcome::Created(token) => Some(token),
            IssueOutcome::LockContended => None,
        }
    }

    pub fn is_created(&self) -> bool {
        matches!(self, IssueOutcome::Created(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_accessors() {
        let found = IssueOutcome::Found("a|b".to_string());
        assert_eq!(found.token(), Some("a|b"));
        assert!(!found.is_created());

        let created = IssueOutcome::Created("c|d".to_string());
        assert!(created.is_created());
        assert_eq!(created.into_token(), Some("c|d".to_string()));

        assert_eq!(IssueOutcome::LockContended.token(), None);
    }
}
