//! Storage module for the durable seller set
//!
//! This module handles persisting listings across runs, including:
//! - The `ListingStore` trait and its delimited-file, SQLite and in-memory backends
//! - Merging a run's deduplicated listings into the store by seller

mod delimited;
mod schema;
mod sqlite;
mod traits;

pub use delimited::{DelimitedFileStore, DELIMITER, HEADER};
pub use sqlite::SqliteStore;
pub use traits::{ListingStore, StorageError, StorageResult};

use crate::config::{StoreBackend, StoreConfig};
use crate::crawler::ListingRecord;
use std::collections::HashSet;
use std::path::Path;

/// Result of merging one run's listings into the store
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeOutcome {
    /// Rows written, one per seller not seen in earlier runs
    pub appended: Vec<ListingRecord>,
    /// Records whose seller was already stored
    pub skipped: usize,
}

/// Opens the store the configuration names
///
/// # Returns
///
/// * `Ok(Box<dyn ListingStore>)` - Store ready for merging
/// * `Err(StorageError)` - The SQLite database could not be opened
pub fn open_store(config: &StoreConfig) -> StorageResult<Box<dyn ListingStore>> {
    let path = Path::new(&config.path);
    match config.backend {
        StoreBackend::Delimited => Ok(Box::new(DelimitedFileStore::new(path))),
        StoreBackend::Sqlite => Ok(Box::new(SqliteStore::new(path)?)),
    }
}

/// Appends the records whose seller the store has not seen yet
///
/// The store is read in full to collect known sellers. When nothing is
/// new the store is left untouched; otherwise all new rows go out in a
/// single append. A seller repeated within `records` is written once.
///
/// Not safe against a concurrent merge into the same store.
pub fn merge_new(
    store: &mut dyn ListingStore,
    records: &[ListingRecord],
) -> StorageResult<MergeOutcome> {
    let mut known: HashSet<String> = store.known_sellers()?;

    let mut appended = Vec::new();
    let mut skipped = 0;
    for record in records {
        if known.insert(record.seller.clone()) {
            appended.push(record.clone());
        } else {
            skipped += 1;
        }
    }

    if appended.is_empty() {
        tracing::info!("No new sellers to record in {}", store.describe());
        return Ok(MergeOutcome { appended, skipped });
    }

    store.append(&appended)?;
    tracing::info!(
        "Recorded {} new sellers in {} ({} already known)",
        appended.len(),
        store.describe(),
        skipped
    );

    Ok(MergeOutcome { appended, skipped })
}

/// In-memory store, mainly for tests and dry runs
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    rows: Vec<ListingRecord>,
    appends: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of append calls that wrote at least one row
    pub fn append_count(&self) -> usize {
        self.appends
    }

    pub fn rows(&self) -> &[ListingRecord] {
        &self.rows
    }
}

impl ListingStore for MemoryStore {
    fn load(&self) -> StorageResult<Vec<ListingRecord>> {
        Ok(self.rows.clone())
    }

    fn append(&mut self, rows: &[ListingRecord]) -> StorageResult<()> {
        if !rows.is_empty() {
            self.appends += 1;
            self.rows.extend_from_slice(rows);
        }
        Ok(())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}
