//! Access token entities: the issuance request, the persisted record and
//! the projection handed back to callers.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::value_objects::ScopeSet;

/// Delimiter joining record id and secret in the external token string
pub const TOKEN_DELIMITER: char = '|';

/// Bytes of randomness behind every token id and every token secret
pub const TOKEN_RANDOM_BYTES: usize = 16;

/// Composite tokens are always longer than this many characters
pub const MIN_COMPOSITE_TOKEN_LENGTH: usize = 15;

/// Logical token request: who the token is for and what it grants
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenRequest {
    /// Owner of the token
    pub consumer_id: String,

    /// Authentication mechanism the token is issued for (e.g. `oauth`)
    pub auth_type: String,

    /// Requested scopes, in any order
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scopes: Option<Vec<String>>,
}

impl TokenRequest {
    /// Creates a scope-less request
    pub fn new(consumer_id: impl Into<String>, auth_type: impl Into<String>) -> Self {
        Self {
            consumer_id: consumer_id.into(),
            auth_type: auth_type.into(),
            scopes: None,
        }
    }

    /// Attaches scopes to the request
    pub fn with_scopes<I, S>(mut self, scopes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.scopes = Some(scopes.into_iter().map(Into::into).collect());
        self
    }
}

/// Token record persisted under its id
///
/// Records are immutable once written. `scopes` is `None` when the
/// issuing request carried no scope list at all.
#[derive(Clone, PartialEq, Eq)]
pub struct TokenRecord {
    pub id: String,
    pub secret: String,
    pub consumer_id: String,
    pub auth_type: String,
    pub scopes: Option<ScopeSet>,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl TokenRecord {
    /// Creates a record issued at `created_at` that lives for `time_to_expiry`
    ///
    /// A zero `time_to_expiry` yields a record that is already expired.
    pub fn new(
        id: String,
        secret: String,
        consumer_id: String,
        auth_type: String,
        scopes: Option<ScopeSet>,
        created_at: DateTime<Utc>,
        time_to_expiry: Duration,
    ) -> Self {
        Self {
            id,
            secret,
            consumer_id,
            auth_type,
            scopes,
            created_at,
            expires_at: created_at + time_to_expiry,
        }
    }

    /// Checks expiry against an explicit instant
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }

    /// Projection returned to callers of `get`
    pub fn to_view(&self) -> TokenView {
        TokenView {
            id: self.id.clone(),
            token_decrypted: self.secret.clone(),
            consumer_id: self.consumer_id.clone(),
            auth_type: self.auth_type.clone(),
            created_at: self.created_at,
            expires_at: self.expires_at,
            scopes: self.scopes.as_ref().map(|scopes| scopes.as_slice().to_vec()),
        }
    }
}

// Keep the secret out of logs and panic messages
impl std::fmt::Debug for TokenRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenRecord")
            .field("id", &self.id)
            .field("secret", &"<redacted>")
            .field("consumer_id", &self.consumer_id)
            .field("auth_type", &self.auth_type)
            .field("scopes", &self.scopes)
            .field("created_at", &self.created_at)
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Caller-facing view of a live token
///
/// `scopes` is omitted entirely for tokens issued without a scope list.
/// When present it is in canonical (sorted, deduplicated) order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenView {
    pub id: String,
    pub token_decrypted: String,
    pub consumer_id: String,
    pub auth_type: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scopes: Option<Vec<String>>,
}
