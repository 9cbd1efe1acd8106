//! Key material for token secret encryption

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use rand::{rngs::OsRng, RngCore};
use sha2::{Digest, Sha256};

use crate::errors::{DomainError, DomainResult};

/// Size of an AES-256 key in bytes
pub const KEY_SIZE: usize = 32;

/// A single 256-bit symmetric key with a stable fingerprint
///
/// The fingerprint is persisted next to every ciphertext so a record
/// written under a different key is rejected before decryption is tried.
#[derive(Clone)]
pub struct EncryptionKey {
    key: Vec<u8>,
    id: String,
}

impl EncryptionKey {
    /// Create a key from raw bytes
    pub fn from_bytes(key: Vec<u8>) -> DomainResult<Self> {
        if key.len() != KEY_SIZE {
            return Err(DomainError::Validation {
                message: format!(
                    "Encryption key must be {} bytes (256 bits), got {}",
                    KEY_SIZE,
                    key.len()
                ),
            });
        }

        let id = Self::fingerprint(&key);
        Ok(Self { key, id })
    }

    /// Create a key from its base64 configuration form
    pub fn from_base64(encoded: &str) -> DomainResult<Self> {
        let key = BASE64
            .decode(encoded.trim())
            .map_err(|e| DomainError::Validation {
                message: format!("Encryption key is not valid base64: {}", e),
            })?;
        Self::from_bytes(key)
    }

    /// Generate a new random 256-bit key
    pub fn generate() -> Self {
        let mut key = vec![0u8; KEY_SIZE];
        OsRng.fill_bytes(&mut key);
        let id = Self::fingerprint(&key);
        Self { key, id }
    }

    /// Base64 form suitable for `ACCESS_TOKEN_ENCRYPTION_KEY`
    pub fn to_base64(&self) -> String {
        BASE64.encode(&self.key)
    }

    /// Key identifier (first 8 bytes of the SHA-256 of the key, hex)
    pub fn id(&self) -> &str {
        &self.id
    }

    pub(crate) fn as_bytes(&self) -> &[u8] {
        &self.key
    }

    fn fingerprint(key: &[u8]) -> String {
        let digest = Sha256::digest(key);
        hex::encode(&digest[..8])
    }
}

impl std::fmt::Debug for EncryptionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EncryptionKey")
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}
