//! Token codec: persisted blob format and the external composite string.

use chrono::{DateTime, Utc};
use gk_shared::AccessTokenConfig;
use rand::{rngs::OsRng, RngCore};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::domain::entities::token::{TokenRecord, TOKEN_DELIMITER, TOKEN_RANDOM_BYTES};
use crate::domain::value_objects::ScopeSet;
use crate::errors::{DomainError, DomainResult, ValidationError};
use crate::services::encryption::{AesGcmTokenEncryption, EncryptedField, TokenEncryption};

/// Version tag written into every blob
const BLOB_VERSION: u8 = 1;

/// On-store representation of a [`TokenRecord`]
///
/// `secret` and `consumer_id` are sealed; every other field is bound into
/// their associated data, so editing any of them, or moving the blob under
/// a different id, makes decryption fail.
#[derive(Debug, Serialize, Deserialize)]
struct PersistedToken {
    v: u8,
    id: String,
    key_id: String,
    secret: EncryptedField,
    consumer_id: EncryptedField,
    auth_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    scopes: Option<ScopeSet>,
    created_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
}

/// Plaintext fields authenticated alongside the sealed ones
#[derive(Serialize)]
struct BoundFields<'a> {
    v: u8,
    id: &'a str,
    key_id: &'a str,
    auth_type: &'a str,
    scopes: Option<&'a ScopeSet>,
    created_at: &'a DateTime<Utc>,
    expires_at: &'a DateTime<Utc>,
}

impl BoundFields<'_> {
    fn associated_data(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }
}

/// Encodes token records for the store and formats external tokens
#[derive(Clone)]
pub struct TokenCodec {
    encryption: Option<Arc<dyn TokenEncryption>>,
}

impl TokenCodec {
    /// Create a codec sealing blobs with `encryption`
    pub fn new(encryption: Arc<dyn TokenEncryption>) -> Self {
        Self {
            encryption: Some(encryption),
        }
    }

    /// Create a codec with no key material; every encode and decode fails
    pub fn without_key() -> Self {
        Self { encryption: None }
    }

    /// Build from access token configuration
    ///
    /// A missing key is not an error here: the codec is created and every
    /// `encode` reports it instead. A key that is present but malformed is
    /// rejected immediately.
    pub fn from_config(config: &AccessTokenConfig) -> DomainResult<Self> {
        match config.encryption_key.as_deref() {
            Some(encoded) => Ok(Self::new(Arc::new(AesGcmTokenEncryption::from_base64(encoded)?))),
            None => Ok(Self::without_key()),
        }
    }

    pub fn has_key(&self) -> bool {
        self.encryption.is_some()
    }

    /// Serialize and encrypt a record
    ///
    /// # Errors
    ///
    /// `DomainError::Encode` when no key material is configured or
    /// encryption fails.
    pub fn encode(&self, record: &TokenRecord) -> DomainResult<String> {
        let encryption = self.encryption.as_ref().ok_or_else(|| DomainError::Encode {
            message: "Token encryption key is not configured".to_string(),
        })?;

        let aad = BoundFields {
            v: BLOB_VERSION,
            id: &record.id,
            key_id: encryption.key_id(),
            auth_type: &record.auth_type,
            scopes: record.scopes.as_ref(),
            created_at: &record.created_at,
            expires_at: &record.expires_at,
        }
        .associated_data()
        .map_err(|e| DomainError::Encode {
            message: format!("Failed to bind token fields: {}", e),
        })?;

        let persisted = PersistedToken {
            v: BLOB_VERSION,
            id: record.id.clone(),
            key_id: encryption.key_id().to_string(),
            secret: encryption.encrypt_field(&record.secret, &aad)?,
            consumer_id: encryption.encrypt_field(&record.consumer_id, &aad)?,
            auth_type: record.auth_type.clone(),
            scopes: record.scopes.clone(),
            created_at: record.created_at,
            expires_at: record.expires_at,
        };

        serde_json::to_string(&persisted).map_err(|e| DomainError::Encode {
            message: format!("Failed to serialize token record: {}", e),
        })
    }

    /// Decrypt and deserialize a blob produced by [`TokenCodec::encode`]
    ///
    /// Never returns a partially decoded record: any malformed field or
    /// failed authentication check is a `DomainError::Decode`.
    pub fn decode(&self, blob: &str) -> DomainResult<TokenRecord> {
        let encryption = self.encryption.as_ref().ok_or_else(|| DomainError::Decode {
            message: "Token encryption key is not configured".to_string(),
        })?;

        let persisted: PersistedToken = serde_json::from_str(blob).map_err(|e| DomainError::Decode {
            message: format!("Malformed token blob: {}", e),
        })?;

        if persisted.v != BLOB_VERSION {
            return Err(DomainError::Decode {
                message: format!("Unsupported token blob version {}", persisted.v),
            });
        }

        if persisted.key_id != encryption.key_id() {
            return Err(DomainError::Decode {
                message: format!("Token blob sealed with unknown key {}", persisted.key_id),
            });
        }

        let aad = BoundFields {
            v: persisted.v,
            id: &persisted.id,
            key_id: &persisted.key_id,
            auth_type: &persisted.auth_type,
            scopes: persisted.scopes.as_ref(),
            created_at: &persisted.created_at,
            expires_at: &persisted.expires_at,
        }
        .associated_data()
        .map_err(|e| DomainError::Decode {
            message: format!("Failed to bind token fields: {}", e),
        })?;

        let secret = encryption.decrypt_field(&persisted.secret, &aad)?;
        let consumer_id = encryption.decrypt_field(&persisted.consumer_id, &aad)?;

        Ok(TokenRecord {
            id: persisted.id,
            secret,
            consumer_id,
            auth_type: persisted.auth_type,
            scopes: persisted.scopes,
            created_at: persisted.created_at,
            expires_at: persisted.expires_at,
        })
    }

    /// `<id>|<secret>`
    pub fn format_external(id: &str, secret: &str) -> String {
        format!("{}{}{}", id, TOKEN_DELIMITER, secret)
    }

    /// Split an external token on the first delimiter
    ///
    /// # Errors
    ///
    /// A validation error when the delimiter is missing or either side is
    /// empty.
    pub fn parse_external(token: &str) -> DomainResult<(&str, &str)> {
        let (id, secret) = token
            .split_once(TOKEN_DELIMITER)
            .ok_or_else(|| ValidationError::malformed_token("missing delimiter"))?;

        if id.is_empty() {
            return Err(ValidationError::malformed_token("empty id").into());
        }
        if secret.is_empty() {
            return Err(ValidationError::malformed_token("empty secret").into());
        }

        Ok((id, secret))
    }

    /// Fresh random record id (lowercase hex)
    pub fn generate_id() -> String {
        Self::random_hex()
    }

    /// Fresh random token secret (lowercase hex)
    pub fn generate_secret() -> String {
        Self::random_hex()
    }

    fn random_hex() -> String {
        let mut bytes = [0u8; TOKEN_RANDOM_BYTES];
        OsRng.fill_bytes(&mut bytes);
        hex::encode(bytes)
    }
}

impl std::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCodec")
            .field("key_id", &self.encryption.as_ref().map(|e| e.key_id().to_string()))
            .finish()
    }
}
