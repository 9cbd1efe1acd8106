//! Encryption of token secrets at rest

pub mod key_material;
pub mod token_encryption;

// Re-export main types
pub use key_material::{EncryptionKey, KEY_SIZE};
pub use token_encryption::{AesGcmTokenEncryption, EncryptedField, TokenEncryption};
