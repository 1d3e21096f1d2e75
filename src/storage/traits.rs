//! Storage traits and error types
//!
//! This module defines the trait interface for durable listing stores and
//! associated error types.

use crate::crawler::ListingRecord;
use std::collections::HashSet;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Delimited file error: {0}")]
    Csv(#[from] csv::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Malformed row {row} in {path}: {message}")]
    MalformedRow {
        path: String,
        row: u64,
        message: String,
    },
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// A durable, append-only set of listing rows keyed by seller
///
/// Implementations never rewrite or remove rows. Keeping sellers unique is
/// the caller's job (see [`merge_new`](crate::storage::merge_new)); a store
/// only has to load what it holds and append what it is given.
pub trait ListingStore: Send {
    /// Loads every stored row, in insertion order
    ///
    /// A store that does not exist yet loads as empty.
    fn load(&self) -> StorageResult<Vec<ListingRecord>>;

    /// Appends rows in one write, creating the store if needed
    fn append(&mut self, rows: &[ListingRecord]) -> StorageResult<()>;

    /// Human-readable location for logs
    fn describe(&self) -> String;

    /// Sellers already present in the store
    fn known_sellers(&self) -> StorageResult<HashSet<String>> {
        Ok(self.load()?.into_iter().map(|row| row.seller).collect())
    }
}
