//! # Store Module
//!
//! Chain and node configuration stores in the repository pattern: an
//! async trait per entity with an in-memory, thread-safe implementation.
//! The SQL schema behind the original entities stays out of scope; these
//! stores carry the same operation surface over process memory.

use thiserror::Error;

mod chain_store;
pub use chain_store::*;

mod node_store;
pub use node_store::*;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Entity not found: {0}")]
    NotFound(String),

    #[error("Constraint violated: {0}")]
    ConstraintViolation(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),
}

/// One page of a listing plus the total number of entities in the store.
#[derive(Debug, Clone, PartialEq)]
pub struct PaginatedResult<T> {
    pub items: Vec<T>,
    pub total: u64,
}
