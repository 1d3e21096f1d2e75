//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the ListingStore trait.

use crate::crawler::ListingRecord;
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{ListingStore, StorageResult};
use chrono::Utc;
use rusqlite::{params, Connection};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// SQLite storage backend
pub struct SqliteStore {
    conn: Connection,
    path: Option<PathBuf>,
}

impl SqliteStore {
    /// Opens or creates the database at `path`
    pub fn new(path: &Path) -> StorageResult<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;
        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
        ",
        )?;
        initialize_schema(&conn)?;

        Ok(Self {
            conn,
            path: Some(path.to_path_buf()),
        })
    }

    /// Creates an in-memory database (for testing)
    pub fn new_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;
        Ok(Self { conn, path: None })
    }
}

impl ListingStore for SqliteStore {
    fn load(&self) -> StorageResult<Vec<ListingRecord>> {
        let mut stmt = self
            .conn
            .prepare("SELECT title, price, seller, link FROM listings ORDER BY rowid")?;

        let rows = stmt
            .query_map([], |row| {
                Ok(ListingRecord {
                    title: row.get(0)?,
                    price: row.get(1)?,
                    seller: row.get(2)?,
                    link: row.get(3)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(rows)
    }

    fn append(&mut self, rows: &[ListingRecord]) -> StorageResult<()> {
        if rows.is_empty() {
            return Ok(());
        }

        let now = Utc::now().to_rfc3339();
        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT OR IGNORE INTO listings (seller, title, price, link, recorded_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
            )?;
            for row in rows {
                stmt.execute(params![row.seller, row.title, row.price, row.link, now])?;
            }
        }
        tx.commit()?;

        Ok(())
    }

    fn describe(&self) -> String {
        match &self.path {
            Some(path) => format!("sqlite:{}", path.display()),
            None => "sqlite::memory:".to_string(),
        }
    }

    fn known_sellers(&self) -> StorageResult<HashSet<String>> {
        let mut stmt = self.conn.prepare("SELECT seller FROM listings")?;
        let sellers = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<HashSet<_>, _>>()?;
        Ok(sellers)
    }
}
