//! Persisted configuration entities consumed by the stores.

mod chain;
pub use chain::*;

mod node;
pub use node::*;
