//! First-occurrence deduplication by seller
//!
//! [`first_per_seller`] is the pure form used on arbitrary record sequences.
//! [`CrawlAccumulator`] keeps the same view incrementally during a pagination
//! walk so the stop check does not rescan everything seen so far.

use crate::crawler::records::SellerKeyed;
use std::collections::HashSet;

/// Keeps the first record seen for each seller, in original relative order
pub fn first_per_seller<T: SellerKeyed + Clone>(records: &[T]) -> Vec<T> {
    let mut seen: HashSet<&str> = HashSet::with_capacity(records.len());
    records
        .iter()
        .filter(|record| seen.insert(record.seller_key()))
        .cloned()
        .collect()
}

/// Append-only record log with a running first-per-seller index
#[derive(Debug)]
pub struct CrawlAccumulator<T> {
    records: Vec<T>,
    seen: HashSet<String>,
    unique: Vec<usize>,
}

impl<T> Default for CrawlAccumulator<T> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            seen: HashSet::new(),
            unique: Vec::new(),
        }
    }
}

impl<T: SellerKeyed + Clone> CrawlAccumulator<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a record; returns true if its seller was not seen before
    pub fn push(&mut self, record: T) -> bool {
        let is_new = self.seen.insert(record.seller_key().to_string());
        if is_new {
            self.unique.push(self.records.len());
        }
        self.records.push(record);
        is_new
    }

    /// Number of records appended, duplicates included
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of distinct sellers
    pub fn unique_len(&self) -> usize {
        self.unique.len()
    }

    /// The deduplicated view, first occurrence per seller
    pub fn unique_records(&self) -> Vec<T> {
        self.unique
            .iter()
            .map(|&index| self.records[index].clone())
            .collect()
    }

    /// Every appended record, in append order
    pub fn records(&self) -> &[T] {
        &self.records
    }
}
