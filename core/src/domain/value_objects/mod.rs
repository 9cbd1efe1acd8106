//! Value objects shared by token entities.

pub mod scope_set;

pub use scope_set::{ScopeSet, SCOPE_SEPARATOR};
