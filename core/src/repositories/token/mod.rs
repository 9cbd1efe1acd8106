//! Key-value store seam used by the token service.

mod memory;
mod store;

pub use memory::MemoryTokenStore;
pub use store::TokenStore;
