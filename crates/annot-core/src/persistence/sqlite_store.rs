//! SQLite-backed annotation store

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use std::time::SystemTime;

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};

use super::schema::{Schema, SCHEMA_VERSION};
use super::store::AnnotationStore;
use crate::annotation::{AnnotationKey, AnnotationRecord, ArticleMetadata};
use crate::error::StoreError;

const SELECT_COLUMNS: &str = "article_index, experiment_number, authors, year, title, journal, url, searchterms, fields";

/// SQLite-backed implementation of the AnnotationStore trait.
pub struct SqliteAnnotationStore {
    conn: Mutex<Connection>,
    path: Option<PathBuf>,
}

impl SqliteAnnotationStore {
    /// Open (or create) a database at the given path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let conn =
            Connection::open(path).map_err(|e| StoreError::Storage(format!("open: {}", e)))?;
        let store = Self::init_with_connection(conn, Some(path.to_path_buf()))?;
        tracing::info!("Opened annotation store at {:?}", path);
        Ok(store)
    }

    /// Create an in-memory database (for testing).
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()
            .map_err(|e| StoreError::Storage(format!("open_in_memory: {}", e)))?;
        Self::init_with_connection(conn, None)
    }

    fn init_with_connection(conn: Connection, path: Option<PathBuf>) -> Result<Self, StoreError> {
        Self::init_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
            path,
        })
    }

    fn init_schema(conn: &Connection) -> Result<(), StoreError> {
        let current_version: u32 = conn
            .query_row(
                "SELECT version FROM schema_version ORDER BY rowid DESC LIMIT 1",
                [],
                |row| row.get(0),
            )
            .unwrap_or(0);

        if current_version == 0 {
            conn.execute_batch(Schema::create_tables())
                .map_err(|e| StoreError::Storage(format!("init_schema: {}", e)))?;
            Self::set_schema_version(conn, SCHEMA_VERSION)?;
        } else if current_version < SCHEMA_VERSION {
            for version in current_version..SCHEMA_VERSION {
                if let Some(migration) = Schema::migration(version, version + 1) {
                    conn.execute_batch(migration)
                        .map_err(|e| StoreError::Storage(format!("migrate: {}", e)))?;
                }
            }
            Self::set_schema_version(conn, SCHEMA_VERSION)?;
        }
        Ok(())
    }

    fn set_schema_version(conn: &Connection, version: u32) -> Result<(), StoreError> {
        conn.execute("INSERT INTO schema_version (version) VALUES (?1)", [version])
            .map_err(|e| StoreError::Storage(format!("schema_version: {}", e)))?;
        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn
            .lock()
            .map_err(|e| StoreError::Storage(e.to_string()))
    }

    fn row_to_record(row: &rusqlite::Row<'_>) -> rusqlite::Result<(AnnotationRecord, String)> {
        let metadata = ArticleMetadata {
            article_index: row.get(0)?,
            authors: row.get(2)?,
            year: row.get(3)?,
            title: row.get(4)?,
            journal: row.get(5)?,
            url: row.get(6)?,
            searchterms: row.get(7)?,
        };
        let experiment_number: u32 = row.get(1)?;
        let fields_json: String = row.get(8)?;
        Ok((AnnotationRecord::new(metadata, experiment_number), fields_json))
    }

    fn with_values(
        (mut record, fields_json): (AnnotationRecord, String),
    ) -> Result<AnnotationRecord, StoreError> {
        record.values = serde_json::from_str(&fields_json)
            .map_err(|e| StoreError::Storage(format!("parse fields: {}", e)))?;
        Ok(record)
    }

    fn get_with(
        conn: &Connection,
        key: &AnnotationKey,
    ) -> Result<Option<AnnotationRecord>, StoreError> {
        let sql = format!(
            "SELECT {} FROM annotations WHERE article_index = ?1 AND experiment_number = ?2",
            SELECT_COLUMNS
        );
        conn.query_row(
            &sql,
            params![key.article_index, key.experiment_number],
            Self::row_to_record,
        )
        .optional()
        .map_err(|e| StoreError::Storage(format!("query get: {}", e)))?
        .map(Self::with_values)
        .transpose()
    }
}

impl AnnotationStore for SqliteAnnotationStore {
    fn get_all(&self) -> Result<Vec<AnnotationRecord>, StoreError> {
        let conn = self.lock()?;
        let sql = format!("SELECT {} FROM annotations ORDER BY id", SELECT_COLUMNS);
        let mut stmt = conn
            .prepare(&sql)
            .map_err(|e| StoreError::Storage(format!("prepare get_all: {}", e)))?;
        let rows = stmt
            .query_map([], Self::row_to_record)
            .map_err(|e| StoreError::Storage(format!("query get_all: {}", e)))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| StoreError::Storage(format!("collect get_all: {}", e)))?;

        rows.into_iter().map(Self::with_values).collect()
    }

    fn get(&self, key: &AnnotationKey) -> Result<Option<AnnotationRecord>, StoreError> {
        let conn = self.lock()?;
        Self::get_with(&conn, key)
    }

    fn insert(&self, record: &AnnotationRecord) -> Result<(), StoreError> {
        let key = record.key();
        let fields_json = serde_json::to_string(&record.values)?;
        let now = Utc::now().to_rfc3339();

        let mut conn = self.lock()?;
        let tx = conn
            .transaction()
            .map_err(|e| StoreError::Storage(format!("begin tx: {}", e)))?;
        let meta = &record.metadata;
        tx.execute(
            "INSERT INTO annotations
             (article_index, experiment_number, authors, year, title, journal, url, searchterms, fields, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?10)",
            params![
                meta.article_index,
                record.experiment_number,
                meta.authors,
                meta.year,
                meta.title,
                meta.journal,
                meta.url,
                meta.searchterms,
                fields_json,
                now,
            ],
        )
        .map_err(|e| {
            if let rusqlite::Error::SqliteFailure(ref err, _) = e {
                if err.code == rusqlite::ErrorCode::ConstraintViolation {
                    return StoreError::AlreadyExists(key.clone());
                }
            }
            StoreError::Storage(format!("insert: {}", e))
        })?;
        tx.commit()
            .map_err(|e| StoreError::Storage(format!("commit: {}", e)))?;

        tracing::info!("Inserted annotation {}", key);
        Ok(())
    }

    fn update(&self, key: &AnnotationKey, record: &AnnotationRecord) -> Result<(), StoreError> {
        let mut conn = self.lock()?;
        let tx = conn
            .transaction()
            .map_err(|e| StoreError::Storage(format!("begin tx: {}", e)))?;

        let existing =
            Self::get_with(&tx, key)?.ok_or_else(|| StoreError::NotFound(key.clone()))?;

        let mut values: BTreeMap<String, String> = existing.values.clone();
        values.extend(record.values.iter().map(|(k, v)| (k.clone(), v.clone())));

        // The key itself is never rewritten
        let mut metadata = record.metadata.clone();
        metadata.article_index = key.article_index.clone();

        if values == existing.values && metadata == existing.metadata {
            tracing::debug!("Annotation {} unchanged, skipping write", key);
            return Ok(());
        }

        let fields_json = serde_json::to_string(&values)?;
        tx.execute(
            "UPDATE annotations
             SET authors = ?1, year = ?2, title = ?3, journal = ?4, url = ?5, searchterms = ?6,
                 fields = ?7, updated_at = ?8
             WHERE article_index = ?9 AND experiment_number = ?10",
            params![
                metadata.authors,
                metadata.year,
                metadata.title,
                metadata.journal,
                metadata.url,
                metadata.searchterms,
                fields_json,
                Utc::now().to_rfc3339(),
                key.article_index,
                key.experiment_number,
            ],
        )
        .map_err(|e| StoreError::Storage(format!("update: {}", e)))?;
        tx.commit()
            .map_err(|e| StoreError::Storage(format!("commit: {}", e)))?;

        tracing::info!("Updated annotation {}", key);
        Ok(())
    }

    fn coded_keys(&self) -> Result<BTreeSet<AnnotationKey>, StoreError> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare("SELECT article_index, experiment_number FROM annotations")
            .map_err(|e| StoreError::Storage(format!("prepare keys: {}", e)))?;
        let keys = stmt
            .query_map([], |row| Ok(AnnotationKey::new(row.get::<_, String>(0)?, row.get(1)?)))
            .map_err(|e| StoreError::Storage(format!("query keys: {}", e)))?
            .collect::<Result<BTreeSet<_>, _>>()
            .map_err(|e| StoreError::Storage(format!("collect keys: {}", e)))?;
        Ok(keys)
    }

    fn modified_at(&self) -> Option<SystemTime> {
        let path = self.path.as_ref()?;
        let mut wal = path.clone().into_os_string();
        wal.push("-wal");
        [path.clone(), PathBuf::from(wal)]
            .iter()
            .filter_map(|p| std::fs::metadata(p).and_then(|m| m.modified()).ok())
            .max()
    }
}
