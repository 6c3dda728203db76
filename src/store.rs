//! SQLite-backed article store.
//!
//! The store is the only component with write access to durable storage.
//! Deduplication leans on the schema rather than application logic: `url`
//! carries a UNIQUE constraint, and a uniqueness violation on insert is the
//! duplicate signal. That keeps insert-if-absent correct even if two runs
//! ever raced, with no separate exists-then-insert step.
//!
//! All inserts for one run happen inside a single transaction. If any record
//! fails for a reason other than a duplicate URL, the transaction is rolled
//! back and the store retains none of the batch.

use crate::models::CanonicalRecord;
use rusqlite::{Connection, params};
use std::error::Error;
use std::path::Path;
use tracing::{debug, info, instrument};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS articles (
    id       INTEGER PRIMARY KEY AUTOINCREMENT,
    title    TEXT NOT NULL CHECK (length(title) > 0),
    url      TEXT NOT NULL UNIQUE CHECK (length(url) > 0),
    source   TEXT NOT NULL,
    found_at TEXT NOT NULL
);
"#;

/// Counts for one persisted batch.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BatchOutcome {
    /// Records newly inserted.
    pub inserted: usize,
    /// Records skipped because their URL was already present.
    pub duplicates: usize,
}

/// Handle to the articles database.
///
/// Opening the store initializes the schema (idempotent create-if-absent);
/// a failure here is fatal and happens before any network fetch.
pub struct ArticleStore {
    conn: Connection,
}

impl ArticleStore {
    /// Open (or create) the database file at `path`.
    #[instrument(level = "info", skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>) -> Result<Self, Box<dyn Error>> {
        let conn = Connection::open(path)?;
        let store = Self { conn };
        store.init_schema()?;
        Ok(store)
    }

    /// Open an in-memory database. Used by tests.
    pub fn open_in_memory() -> Result<Self, Box<dyn Error>> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> Result<(), Box<dyn Error>> {
        self.conn.execute_batch(SCHEMA)?;
        info!("Article schema ready");
        Ok(())
    }

    /// Insert a batch of records inside one transaction.
    ///
    /// Records whose URL is already present are skipped and counted as
    /// duplicates, not errors. Any other failure aborts the whole batch:
    /// the transaction rolls back and no record from this call is retained.
    #[instrument(level = "info", skip_all, fields(batch = records.len()))]
    pub fn insert_batch(
        &mut self,
        records: &[CanonicalRecord],
    ) -> Result<BatchOutcome, Box<dyn Error>> {
        let mut outcome = BatchOutcome::default();
        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO articles (title, url, source, found_at) VALUES (?1, ?2, ?3, ?4)",
            )?;
            for record in records {
                let result = stmt.execute(params![
                    record.title,
                    record.url,
                    record.source,
                    record.found_at.to_rfc3339(),
                ]);
                match result {
                    Ok(_) => outcome.inserted += 1,
                    Err(e) if is_unique_violation(&e) => {
                        debug!(url = %record.url, "URL already stored, skipping");
                        outcome.duplicates += 1;
                    }
                    Err(e) => return Err(e.into()),
                }
            }
        }
        tx.commit()?;
        info!(
            inserted = outcome.inserted,
            duplicates = outcome.duplicates,
            "Committed article batch"
        );
        Ok(outcome)
    }

    /// Whether a record with this URL is already stored.
    pub fn contains_url(&self, url: &str) -> Result<bool, Box<dyn Error>> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM articles WHERE url = ?1",
            params![url],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// Total number of stored records.
    pub fn count(&self) -> Result<usize, Box<dyn Error>> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM articles", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

/// True when the error is the UNIQUE constraint on `articles.url` firing.
fn is_unique_violation(e: &rusqlite::Error) -> bool {
    matches!(
        e,
        rusqlite::Error::SqliteFailure(inner, _)
            if inner.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}
