//! Main token service implementation

use constant_time_eq::constant_time_eq;
use gk_shared::utils::validation::validators;
use gk_shared::AccessTokenConfig;
use std::sync::Arc;

use crate::domain::entities::token::{TokenRecord, TokenRequest, TokenView, TOKEN_DELIMITER};
use crate::domain::value_objects::ScopeSet;
use crate::errors::{DomainError, DomainResult, ValidationError};
use crate::repositories::TokenStore;

use super::clock::{Clock, SystemClock};
use super::codec::TokenCodec;
use super::config::TokenServiceConfig;
use super::identity::IdentityKey;
use super::types::IssueOutcome;

const RECORD_KEY_PREFIX: &str = "token:record:";
const IDENTITY_KEY_PREFIX: &str = "token:identity:";
const LOCK_KEY_PREFIX: &str = "token:lock:";

/// A request that passed validation, with its identity already derived
struct ValidatedRequest<'a> {
    consumer_id: &'a str,
    auth_type: &'a str,
    /// `None` when the request carried no scope list
    scopes: Option<ScopeSet>,
    identity: IdentityKey,
}

/// Access token lifecycle service
///
/// Records live under `token:record:<id>`; a secondary index under
/// `token:identity:<digest>` maps each identity to the id of its current
/// token. The record is always written before the index entry, so readers
/// may see a record without an index entry but never the reverse.
pub struct TokenService<S: TokenStore> {
    /// Backing key-value store
    store: Arc<S>,
    /// Blob and external token codec
    codec: TokenCodec,
    /// Service configuration
    config: TokenServiceConfig,
    clock: Arc<dyn Clock>,
}

impl<S: TokenStore> TokenService<S> {
    /// Create a new token service
    ///
    /// # Arguments
    ///
    /// * `store` - Store implementation holding records and index entries
    /// * `codec` - Codec carrying the encryption key
    /// * `config` - Service configuration
    pub fn new(store: Arc<S>, codec: TokenCodec, config: TokenServiceConfig) -> Self {
        Self {
            store,
            codec,
            config,
            clock: Arc::new(SystemClock),
        }
    }

    /// Create a service from access token configuration
    ///
    /// # Errors
    ///
    /// A validation error if a configured encryption key is malformed.
    pub fn from_config(store: Arc<S>, config: &AccessTokenConfig) -> DomainResult<Self> {
        let codec = TokenCodec::from_config(config)?;
        Ok(Self::new(store, codec, TokenServiceConfig::from(config)))
    }

    /// Replace the time source
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub fn config(&self) -> &TokenServiceConfig {
        &self.config
    }

    /// Issue a new token for the request
    ///
    /// Always mints a fresh record, even if a live token already exists for
    /// the same identity; the identity index then points at the new one.
    ///
    /// # Returns
    ///
    /// * `Ok(String)` - The composite token `<id>|<secret>`
    /// * `Err(DomainError)` - Validation, encoding or storage failure; no
    ///   usable token was issued
    pub async fn save(&self, request: &TokenRequest) -> DomainResult<String> {
        let request = Self::validate(request)?;
        self.issue(&request).await
    }

    /// Look up the live token for the request's identity
    ///
    /// Scope order and duplicates in the request are irrelevant. Expired or
    /// dangling entries found on the way are cleaned up and reported as a
    /// miss.
    pub async fn find(&self, request: &TokenRequest) -> DomainResult<Option<String>> {
        let request = Self::validate(request)?;
        self.find_validated(&request).await
    }

    /// Load a token by id or by composite token string
    ///
    /// Only the id part of a composite token is used; the secret is not
    /// checked here (see [`TokenService::authenticate`]).
    pub async fn get(&self, id_or_token: &str) -> DomainResult<Option<TokenView>> {
        let id = Self::resolve_id(id_or_token)?;

        let Some(record) = self.load_record(id).await? else {
            tracing::debug!(token_id = %mask_id(id), event = "token_miss", "No token stored under id");
            return Ok(None);
        };

        if record.is_expired_at(self.clock.now()) {
            self.discard_expired(&record).await?;
            return Ok(None);
        }

        Ok(Some(record.to_view()))
    }

    /// Return the live token for the request, issuing one if none exists
    ///
    /// This is a plain check-then-act sequence: two concurrent callers for
    /// the same identity can both miss and both issue. The later index
    /// write wins and the earlier record is orphaned until its TTL runs
    /// out. Use [`TokenService::find_or_save_exclusive`] to serialise
    /// issuance per identity.
    pub async fn find_or_save(&self, request: &TokenRequest) -> DomainResult<String> {
        let request = Self::validate(request)?;

        if let Some(token) = self.find_validated(&request).await? {
            return Ok(token);
        }

        self.issue(&request).await
    }

    /// Get-or-create guarded by a per-identity lock
    ///
    /// The lock is a conditional write on `token:lock:<digest>` with a short
    /// TTL, so a crashed holder cannot wedge the identity. Callers that lose
    /// the race get [`IssueOutcome::LockContended`] and may retry or fall
    /// back to [`TokenService::find`].
    pub async fn find_or_save_exclusive(&self, request: &TokenRequest) -> DomainResult<IssueOutcome> {
        let request = Self::validate(request)?;

        if let Some(token) = self.find_validated(&request).await? {
            return Ok(IssueOutcome::Found(token));
        }

        let lock_key = lock_key(&request.identity);
        let owner = TokenCodec::generate_id();

        if !self.store.set_if_absent(&lock_key, &owner, self.config.lock_ttl()).await? {
            tracing::warn!(event = "issue_lock_contended", "Identity lock held by another caller");
            return Ok(IssueOutcome::LockContended);
        }

        // Another holder may have issued between the first lookup and the lock
        let outcome = match self.find_validated(&request).await {
            Ok(Some(token)) => Ok(IssueOutcome::Found(token)),
            Ok(None) => self.issue(&request).await.map(IssueOutcome::Created),
            Err(e) => Err(e),
        };

        self.release_lock(&lock_key, &owner).await;
        outcome
    }

    /// Check a presented composite token and return its view if valid
    ///
    /// The secret is compared in constant time. A wrong secret, an unknown
    /// id and an expired token all resolve to `None`.
    pub async fn authenticate(&self, token: &str) -> DomainResult<Option<TokenView>> {
        let (id, secret) = TokenCodec::parse_external(token)?;

        let Some(record) = self.load_record(id).await? else {
            return Ok(None);
        };

        if record.is_expired_at(self.clock.now()) {
            self.discard_expired(&record).await?;
            return Ok(None);
        }

        if !constant_time_eq(secret.as_bytes(), record.secret.as_bytes()) {
            tracing::warn!(
                token_id = %mask_id(id),
                event = "token_secret_mismatch",
                "Presented token secret does not match"
            );
            return Ok(None);
        }

        Ok(Some(record.to_view()))
    }

    fn validate(request: &TokenRequest) -> DomainResult<ValidatedRequest<'_>> {
        if !validators::not_empty(&request.consumer_id) {
            return Err(ValidationError::required("consumer_id").into());
        }
        if !validators::not_empty(&request.auth_type) {
            return Err(ValidationError::required("auth_type").into());
        }

        let scopes = match &request.scopes {
            Some(list) => Some(ScopeSet::new(list.iter().cloned())?),
            None => None,
        };

        let identity = IdentityKey::derive(
            &request.consumer_id,
            &request.auth_type,
            scopes.as_ref().unwrap_or(&ScopeSet::empty()),
        );

        Ok(ValidatedRequest {
            consumer_id: &request.consumer_id,
            auth_type: &request.auth_type,
            scopes,
            identity,
        })
    }

    fn resolve_id(id_or_token: &str) -> DomainResult<&str> {
        if id_or_token.contains(TOKEN_DELIMITER) {
            let (id, _) = TokenCodec::parse_external(id_or_token)?;
            return Ok(id);
        }

        if !validators::not_empty(id_or_token) {
            return Err(ValidationError::required("id").into());
        }

        Ok(id_or_token)
    }

    async fn issue(&self, request: &ValidatedRequest<'_>) -> DomainResult<String> {
        let record = TokenRecord::new(
            TokenCodec::generate_id(),
            TokenCodec::generate_secret(),
            request.consumer_id.to_string(),
            request.auth_type.to_string(),
            request.scopes.clone(),
            self.clock.now(),
            self.config.time_to_expiry(),
        );

        let blob = self.codec.encode(&record)?;
        let ttl = self.config.store_ttl_seconds();

        self.store
            .set(&record_key(&record.id), &blob, ttl)
            .await
            .map_err(|e| storage_failure("write_record", e))?;

        if let Err(e) = self
            .store
            .set(&index_key(&request.identity), &record.id, ttl)
            .await
        {
            tracing::warn!(
                token_id = %mask_id(&record.id),
                event = "token_orphaned",
                error = %e,
                "Index write failed; record is reachable by id only"
            );
            return Err(e);
        }

        tracing::info!(
            token_id = %mask_id(&record.id),
            auth_type = %record.auth_type,
            expires_at = %record.expires_at,
            event = "token_issued",
            "Issued access token"
        );

        Ok(TokenCodec::format_external(&record.id, &record.secret))
    }

    async fn find_validated(&self, request: &ValidatedRequest<'_>) -> DomainResult<Option<String>> {
        let index_key = index_key(&request.identity);

        let Some(id) = self.store.get(&index_key).await? else {
            tracing::debug!(event = "identity_miss", "No token indexed for identity");
            return Ok(None);
        };

        match self.load_record(&id).await? {
            Some(record) if !record.is_expired_at(self.clock.now()) => {
                tracing::debug!(token_id = %mask_id(&id), event = "identity_hit", "Reusing live token");
                Ok(Some(TokenCodec::format_external(&record.id, &record.secret)))
            }
            Some(record) => {
                self.discard_expired(&record).await?;
                Ok(None)
            }
            None => {
                tracing::debug!(token_id = %mask_id(&id), event = "index_stale", "Index points at a missing record");
                self.unlink_index(&index_key, &id).await;
                Ok(None)
            }
        }
    }

    /// Load and decode the record stored under `id`
    ///
    /// Store failures propagate. A blob that cannot be decoded, or that
    /// decodes to a different id, is reported as absent and left in place
    /// for its TTL to remove.
    async fn load_record(&self, id: &str) -> DomainResult<Option<TokenRecord>> {
        let Some(blob) = self.store.get(&record_key(id)).await? else {
            return Ok(None);
        };

        match self.codec.decode(&blob) {
            Ok(record) if record.id == id => Ok(Some(record)),
            Ok(_) => {
                tracing::warn!(token_id = %mask_id(id), event = "token_id_mismatch", "Stored record carries another id");
                Ok(None)
            }
            Err(e) if e.is_decode() => {
                tracing::warn!(
                    token_id = %mask_id(id),
                    event = "token_undecodable",
                    error = %e,
                    "Stored token record could not be decoded"
                );
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Lazy expiry: delete the record and, if it still points here, its
    /// index entry
    async fn discard_expired(&self, record: &TokenRecord) -> DomainResult<()> {
        self.store
            .delete(&record_key(&record.id))
            .await
            .map_err(|e| storage_failure("delete_record", e))?;

        let identity = IdentityKey::derive(
            &record.consumer_id,
            &record.auth_type,
            record.scopes.as_ref().unwrap_or(&ScopeSet::empty()),
        );
        self.unlink_index(&index_key(&identity), &record.id).await;

        tracing::info!(
            token_id = %mask_id(&record.id),
            expired_at = %record.expires_at,
            event = "token_expired",
            "Removed expired access token"
        );
        Ok(())
    }

    /// Best-effort removal of an index entry, skipped when the entry has
    /// since been repointed at a newer token
    async fn unlink_index(&self, index_key: &str, id: &str) {
        if let Err(e) = self.store.delete_if_equals(index_key, id).await {
            tracing::warn!(
                token_id = %mask_id(id),
                event = "index_cleanup_failed",
                error = %e,
                "Failed to remove identity index entry"
            );
        }
    }

    /// Drop the identity lock unless it expired and was taken by another
    /// caller in the meantime
    async fn release_lock(&self, lock_key: &str, owner: &str) {
        match self.store.delete_if_equals(lock_key, owner).await {
            Ok(true) => {}
            Ok(false) => {
                tracing::warn!(event = "issue_lock_lost", "Identity lock expired before release");
            }
            Err(e) => {
                tracing::warn!(event = "issue_lock_release_failed", error = %e, "Identity lock left to expire");
            }
        }
    }
}

pub(crate) fn record_key(id: &str) -> String {
    format!("{}{}", RECORD_KEY_PREFIX, id)
}

pub(crate) fn index_key(identity: &IdentityKey) -> String {
    format!("{}{}", IDENTITY_KEY_PREFIX, identity.digest())
}

pub(crate) fn lock_key(identity: &IdentityKey) -> String {
    format!("{}{}", LOCK_KEY_PREFIX, identity.digest())
}

fn storage_failure(operation: &'static str, error: DomainError) -> DomainError {
    tracing::error!(operation, error = %error, "Token store operation failed");
    error
}

/// Short prefix of a token id, safe for logs
pub(crate) fn mask_id(id: &str) -> String {
    let prefix: String = id.chars().take(8).collect();
    format!("{}***", prefix)
}
