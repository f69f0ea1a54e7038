//! Database errors.

use thiserror::Error;

/// Errors surfaced by the in-memory database.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DatabaseError {
    /// A live row already exists under this key.
    #[error("duplicate key: {0}")]
    DuplicateKey(String),

    /// No live row exists under this key.
    #[error("record not found: {0}")]
    NotFound(String),

    /// Every pooled connection is checked out.
    #[error("connection pool exhausted (max connections: {max})")]
    PoolExhausted {
        /// The pool's connection limit.
        max: usize,
    },
}
