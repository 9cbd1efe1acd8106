//! Access token lifecycle
//!
//! This module provides:
//! - Identity key derivation from consumer, auth type and scope set
//! - The token codec (encrypted store blobs, composite external tokens)
//! - `TokenService` with save, find, get and get-or-create operations
//! - Lazy expiry with guarded index cleanup

mod clock;
mod codec;
mod config;
mod identity;
mod service;
mod types;

#[cfg(test)]
mod tests;

pub use clock::{Clock, SystemClock};
pub use codec::TokenCodec;
pub use config::{TokenServiceConfig, MAX_TIME_TO_EXPIRY_SECONDS};
pub use identity::IdentityKey;
pub use service::TokenService;
pub use types::IssueOutcome;
