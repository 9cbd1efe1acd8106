//! # Gatekeep Core
//!
//! Token lifecycle engine for opaque bearer access tokens.
//! This crate contains the domain entities, the error taxonomy, the store
//! interface with an in-memory implementation, token encryption, and the
//! `TokenService` that issues, finds and expires tokens.

pub mod domain;
pub mod errors;
pub mod repositories;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::*;
pub use errors::*;
pub use repositories::{MemoryTokenStore, TokenStore};
pub use services::{
    AesGcmTokenEncryption, EncryptionKey, IdentityKey, IssueOutcome, TokenCodec, TokenEncryption,
    TokenService, TokenServiceConfig,
};
