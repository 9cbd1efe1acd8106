//! Token secret encryption using AES-256-GCM

use aes_gcm::{
    aead::{Aead, KeyInit, Payload},
    Aes256Gcm, Key, Nonce,
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use rand::{rngs::OsRng, RngCore};
use serde::{Deserialize, Serialize};

use crate::errors::{DomainError, DomainResult};

use super::key_material::EncryptionKey;

/// AES-GCM nonce size in bytes
const NONCE_SIZE: usize = 12;

/// One encrypted field with the nonce it was sealed under
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedField {
    /// Ciphertext including the authentication tag (base64 encoded)
    pub ciphertext: String,
    /// Nonce used for encryption (base64 encoded)
    pub nonce: String,
}

/// Trait defining token field encryption operations
///
/// `aad` is authenticated but not encrypted; decryption fails unless the
/// same associated data is supplied again.
pub trait TokenEncryption: Send + Sync {
    /// Identifier of the key new ciphertexts are sealed with
    fn key_id(&self) -> &str;

    /// Encrypt a UTF-8 field
    fn encrypt_field(&self, plaintext: &str, aad: &[u8]) -> DomainResult<EncryptedField>;

    /// Decrypt a field produced by [`TokenEncryption::encrypt_field`]
    fn decrypt_field(&self, field: &EncryptedField, aad: &[u8]) -> DomainResult<String>;
}

/// AES-GCM based token encryption implementation
pub struct AesGcmTokenEncryption {
    key: EncryptionKey,
    cipher: Aes256Gcm,
}

impl AesGcmTokenEncryption {
    /// Create an encryption service bound to `key`
    pub fn new(key: EncryptionKey) -> Self {
        let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key.as_bytes()));
        Self { key, cipher }
    }

    /// Create from the base64 configuration form of the key
    pub fn from_base64(encoded: &str) -> DomainResult<Self> {
        Ok(Self::new(EncryptionKey::from_base64(encoded)?))
    }

    /// Generate a random nonce for AES-GCM
    fn generate_nonce() -> [u8; NONCE_SIZE] {
        let mut nonce = [0u8; NONCE_SIZE];
        OsRng.fill_bytes(&mut nonce);
        nonce
    }
}

impl TokenEncryption for AesGcmTokenEncryption {
    fn key_id(&self) -> &str {
        self.key.id()
    }

    fn encrypt_field(&self, plaintext: &str, aad: &[u8]) -> DomainResult<EncryptedField> {
        let nonce = Self::generate_nonce();

        let ciphertext = self
            .cipher
            .encrypt(
                Nonce::from_slice(&nonce),
                Payload { msg: plaintext.as_bytes(), aad },
            )
            .map_err(|e| DomainError::Encode {
                message: format!("Encryption failed: {}", e),
            })?;

        Ok(EncryptedField {
            ciphertext: BASE64.encode(ciphertext),
            nonce: BASE64.encode(nonce),
        })
    }

    fn decrypt_field(&self, field: &EncryptedField, aad: &[u8]) -> DomainResult<String> {
        let ciphertext = BASE64
            .decode(&field.ciphertext)
            .map_err(|e| DomainError::Decode {
                message: format!("Failed to decode ciphertext: {}", e),
            })?;

        let nonce = BASE64
            .decode(&field.nonce)
            .map_err(|e| DomainError::Decode {
                message: format!("Failed to decode nonce: {}", e),
            })?;

        if nonce.len() != NONCE_SIZE {
            return Err(DomainError::Decode {
                message: "Invalid nonce size for AES-GCM".to_string(),
            });
        }

        let plaintext = self
            .cipher
            .decrypt(
                Nonce::from_slice(&nonce),
                Payload { msg: &ciphertext, aad },
            )
            .map_err(|_| DomainError::Decode {
                message: "Ciphertext failed authentication".to_string(),
            })?;

        String::from_utf8(plaintext).map_err(|e| DomainError::Decode {
            message: format!("Decrypted field is not valid UTF-8: {}", e),
        })
    }
}
