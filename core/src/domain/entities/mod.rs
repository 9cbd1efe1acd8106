//! Domain entities representing core business objects.

pub mod token;

#[cfg(test)]
mod tests;

// Re-export commonly used types
pub use token::{
    TokenRecord, TokenRequest, TokenView,
    MIN_COMPOSITE_TOKEN_LENGTH, TOKEN_DELIMITER, TOKEN_RANDOM_BYTES,
};
