//! SQLite schema for annotation storage
//!
//! Codebook values live in a JSON object column, so codes can be added to
//! or removed from the codebook without migrating existing rows. Codes a
//! row has never stored read back as empty.

/// Schema version for migrations
pub const SCHEMA_VERSION: u32 = 1;

/// SQLite schema definition
pub struct Schema;

impl Schema {
    /// Get the complete schema SQL
    pub fn create_tables() -> &'static str {
        r#"
-- Schema version tracking
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER NOT NULL,
    applied_at TEXT NOT NULL DEFAULT (datetime('now'))
);

-- One row per coded (article, experiment)
CREATE TABLE IF NOT EXISTS annotations (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    article_index TEXT NOT NULL,
    experiment_number INTEGER NOT NULL,
    authors TEXT NOT NULL DEFAULT '',
    year TEXT NOT NULL DEFAULT '',
    title TEXT NOT NULL DEFAULT '',
    journal TEXT NOT NULL DEFAULT '',
    url TEXT NOT NULL DEFAULT '',
    searchterms TEXT NOT NULL DEFAULT '',
    fields TEXT NOT NULL DEFAULT '{}',
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    UNIQUE (article_index, experiment_number)
);

CREATE INDEX IF NOT EXISTS idx_annotations_article ON annotations(article_index);
"#
    }

    /// Get migration SQL for a specific version
    pub fn migration(from_version: u32, to_version: u32) -> Option<&'static str> {
        match (from_version, to_version) {
            // (1, 2) => Some("ALTER TABLE ..."),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_sql_valid() {
        let conn = rusqlite::Connection::open_in_memory().unwrap();
        conn.execute_batch(Schema::create_tables()).unwrap();
        // Idempotent
        conn.execute_batch(Schema::create_tables()).unwrap();
    }

    #[test]
    fn test_composite_key_is_unique() {
        let conn = rusqlite::Connection::open_in_memory().unwrap();
        conn.execute_batch(Schema::create_tables()).unwrap();
        let insert = "INSERT INTO annotations (article_index, experiment_number, created_at, updated_at)
                      VALUES (?1, ?2, 'now', 'now')";
        conn.execute(insert, rusqlite::params!["a", 1]).unwrap();
        conn.execute(insert, rusqlite::params!["a", 2]).unwrap();
        assert!(conn.execute(insert, rusqlite::params!["a", 1]).is_err());
    }
}
