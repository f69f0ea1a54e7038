//! In-memory tables with soft deletion.
//!
//! Rows are kept in insertion order so listings and pagination are
//! deterministic. Deletion tombstones a row rather than removing it; a
//! maintenance purge drops tombstones older than the retention window.

use std::{fmt::Display, hash::Hash};

use indexmap::IndexMap;
use jiff::{SignedDuration, Timestamp};
use rustc_hash::FxBuildHasher;

use crate::database::{
    errors::DatabaseError,
    query::{Page, Paged},
};

/// How long tombstoned rows survive before a maintenance purge removes
/// them for good.
pub const TOMBSTONE_RETENTION: SignedDuration = SignedDuration::from_hours(90 * 24);

/// A stored row: the record plus its lifecycle timestamps.
#[derive(Debug, Clone)]
pub struct Stored<T> {
    pub record: T,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub deleted_at: Option<Timestamp>,
}

impl<T> Stored<T> {
    fn is_live(&self) -> bool {
        self.deleted_at.is_none()
    }
}

/// An insertion-ordered table of soft-deletable rows.
#[derive(Debug)]
pub struct Table<K, T> {
    name: &'static str,
    rows: IndexMap<K, Stored<T>, FxBuildHasher>,
}

impl<K, T> Table<K, T>
where
    K: Hash + Eq + Clone + Display,
{
    /// Create an empty table. The name only shows up in error messages.
    #[must_use]
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            rows: IndexMap::default(),
        }
    }

    /// Insert a new row.
    ///
    /// A tombstoned row under the same key is silently replaced.
    ///
    /// # Errors
    ///
    /// Returns [`DatabaseError::DuplicateKey`] if a live row already holds
    /// the key.
    pub fn insert(&mut self, key: K, record: T) -> Result<(), DatabaseError> {
        if self.rows.get(&key).is_some_and(Stored::is_live) {
            return Err(DatabaseError::DuplicateKey(format!("{}/{key}", self.name)));
        }

        let now = Timestamp::now();

        self.rows.insert(
            key,
            Stored {
                record,
                created_at: now,
                updated_at: now,
                deleted_at: None,
            },
        );

        Ok(())
    }

    /// Apply a mutation to a live row and bump its update timestamp.
    ///
    /// # Errors
    ///
    /// Returns [`DatabaseError::NotFound`] if the key is absent or
    /// tombstoned.
    pub fn update(&mut self, key: &K, apply: impl FnOnce(&mut T)) -> Result<(), DatabaseError> {
        let row = self
            .rows
            .get_mut(key)
            .filter(|row| row.is_live())
            .ok_or_else(|| DatabaseError::NotFound(format!("{}/{key}", self.name)))?;

        apply(&mut row.record);
        row.updated_at = Timestamp::now();

        Ok(())
    }

    /// Tombstone a live row.
    ///
    /// # Errors
    ///
    /// Returns [`DatabaseError::NotFound`] if the key is absent or already
    /// tombstoned.
    pub fn soft_delete(&mut self, key: &K) -> Result<(), DatabaseError> {
        let row = self
            .rows
            .get_mut(key)
            .filter(|row| row.is_live())
            .ok_or_else(|| DatabaseError::NotFound(format!("{}/{key}", self.name)))?;

        row.deleted_at = Some(Timestamp::now());

        Ok(())
    }

    /// Remove a row immediately, tombstoned or not.
    ///
    /// # Errors
    ///
    /// Returns [`DatabaseError::NotFound`] if the key is absent.
    pub fn hard_delete(&mut self, key: &K) -> Result<(), DatabaseError> {
        self.rows
            .shift_remove(key)
            .map(|_| ())
            .ok_or_else(|| DatabaseError::NotFound(format!("{}/{key}", self.name)))
    }

    /// A live row's record.
    #[must_use]
    pub fn get(&self, key: &K) -> Option<&T> {
        self.get_stored(key).map(|row| &row.record)
    }

    /// A live row with its timestamps.
    #[must_use]
    pub fn get_stored(&self, key: &K) -> Option<&Stored<T>> {
        self.rows.get(key).filter(|row| row.is_live())
    }

    /// Iterate live rows in insertion order.
    pub fn iter_live(&self) -> impl Iterator<Item = (&K, &T)> {
        self.rows
            .iter()
            .filter(|(_, row)| row.is_live())
            .map(|(key, row)| (key, &row.record))
    }

    /// Live rows matching a predicate, one page at a time.
    pub fn find(&self, mut predicate: impl FnMut(&T) -> bool, page: Page) -> Paged<T>
    where
        T: Clone,
    {
        Paged::collect(
            self.iter_live()
                .filter(move |&(_, record)| predicate(record))
                .map(|(_, record)| record.clone()),
            page,
        )
    }

    /// Number of live rows.
    #[must_use]
    pub fn live_len(&self) -> usize {
        self.iter_live().count()
    }

    /// Drop tombstones older than [`TOMBSTONE_RETENTION`], returning how
    /// many rows were purged.
    pub fn purge_tombstones(&mut self, now: Timestamp) -> usize {
        let cutoff = now.checked_sub(TOMBSTONE_RETENTION).unwrap_or(Timestamp::MIN);
        let before = self.rows.len();

        self.rows
            .retain(|_, row| row.deleted_at.is_none_or(|deleted| deleted >= cutoff));

        before - self.rows.len()
    }

    /// The table name used in error messages.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }
}
