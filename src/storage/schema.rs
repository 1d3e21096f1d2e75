//! Database schema definitions
//!
//! This module contains the SQL schema for the SQLite listing store.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- One row per seller, in the order sellers were first recorded
CREATE TABLE IF NOT EXISTS listings (
    seller TEXT PRIMARY KEY,
    title TEXT NOT NULL,
    price TEXT NOT NULL,
    link TEXT,
    recorded_at TEXT NOT NULL
);
"#;

/// Initializes the database schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> rusqlite::Result<()> {
    conn.execute_batch(SCHEMA_SQL)
}
