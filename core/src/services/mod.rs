//! Business services: token encryption and the token lifecycle.

pub mod encryption;
pub mod token;

// Re-export commonly used types
pub use encryption::{AesGcmTokenEncryption, EncryptionKey, TokenEncryption};
pub use token::{
    Clock, IdentityKey, IssueOutcome, SystemClock, TokenCodec, TokenService, TokenServiceConfig,
};
