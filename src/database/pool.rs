//! Connection pool simulation.
//!
//! Hands out counted guards so callers exercise an acquire/release
//! discipline. Purely illustrative: nothing is exclusive and nothing
//! blocks; an exhausted pool is just a typed error.

use std::cell::Cell;

use crate::database::errors::DatabaseError;

/// Default maximum number of pooled connections.
pub const POOL_LIMIT: usize = 20;

/// A counter-based pool of pretend connections.
#[derive(Debug)]
pub struct ConnectionPool {
    max: usize,
    active: Cell<usize>,
}

/// Point-in-time pool usage numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolStats {
    pub max: usize,
    pub active: usize,
    pub available: usize,
}

impl ConnectionPool {
    /// Create a pool with the given connection limit.
    #[must_use]
    pub fn new(max: usize) -> Self {
        Self {
            max,
            active: Cell::new(0),
        }
    }

    /// Check a connection out of the pool.
    ///
    /// # Errors
    ///
    /// Returns [`DatabaseError::PoolExhausted`] when every connection is
    /// already checked out.
    pub fn acquire(&self) -> Result<PooledConnection<'_>, DatabaseError> {
        if self.active.get() >= self.max {
            return Err(DatabaseError::PoolExhausted { max: self.max });
        }

        self.active.set(self.active.get() + 1);

        Ok(PooledConnection { pool: self })
    }

    /// Current usage numbers.
    #[must_use]
    pub fn stats(&self) -> PoolStats {
        let active = self.active.get();

        PoolStats {
            max: self.max,
            active,
            available: self.max.saturating_sub(active),
        }
    }
}

impl Default for ConnectionPool {
    fn default() -> Self {
        Self::new(POOL_LIMIT)
    }
}

/// A checked-out connection. Returns itself to the pool on drop.
#[derive(Debug)]
pub struct PooledConnection<'a> {
    pool: &'a ConnectionPool,
}

impl Drop for PooledConnection<'_> {
    fn drop(&mut self) {
        let active = self.pool.active.get();
        self.pool.active.set(active.saturating_sub(1));
    }
}
