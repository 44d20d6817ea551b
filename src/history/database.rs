//! SQLite database implementation for clipboard history

use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

use super::{ClipboardEntry, HistoryError};

const SCHEMA_VERSION: u32 = 1;

/// Upper bound on rows in the pinned section of a listing
pub const PINNED_LIST_LIMIT: usize = 1000;

const ENTRY_COLUMNS: &str = "id, buffer_id, is_pinned, content, preview, created_at";

/// SQLite database wrapper for clipboard history storage
///
/// Holds exactly one connection; every statement goes through the mutex, so
/// access is serialized within the process and `busy_timeout` queues other
/// invocations at the SQLite level.
pub struct HistoryDatabase {
    conn: Mutex<Connection>,
    path: PathBuf,
}

impl HistoryDatabase {
    /// Open (creating if needed) the database at `path`
    pub async fn new(path: &Path) -> Result<Self, HistoryError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;

        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;
             PRAGMA busy_timeout = 5000;",
        )?;

        let db = Self {
            conn: Mutex::new(conn),
            path: path.to_path_buf(),
        };

        db.initialize().await?;
        Ok(db)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn initialize(&self) -> Result<(), HistoryError> {
        let conn = self.conn.lock().await;

        let version = Self::get_schema_version(&conn)?;
        if version < SCHEMA_VERSION {
            Self::create_schema(&conn)?;
        }

        // Repair the cursor table: exactly one row, id 1
        conn.execute_batch(
            "DELETE FROM current_buffer WHERE id != 1;
             INSERT OR IGNORE INTO current_buffer (id, buffer_id) VALUES (1, 1);",
        )?;

        Ok(())
    }

    fn get_schema_version(conn: &Connection) -> Result<u32, HistoryError> {
        let table_exists: bool = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version')",
            [],
            |row| row.get(0),
        )?;

        if !table_exists {
            return Ok(0);
        }

        let version: Option<u32> = conn
            .query_row(
                "SELECT version FROM schema_version ORDER BY version DESC LIMIT 1",
                [],
                |row| row.get(0),
            )
            .optional()?;

        Ok(version.unwrap_or(0))
    }

    fn create_schema(conn: &Connection) -> Result<(), HistoryError> {
        // IF NOT EXISTS throughout: databases written before schema_version
        // existed already have these tables
        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS schema_version (
                version INTEGER PRIMARY KEY,
                applied_at INTEGER DEFAULT (strftime('%s', 'now'))
            );

            CREATE TABLE IF NOT EXISTS clipboard (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                buffer_id INTEGER NOT NULL CHECK(buffer_id IN (1, 2, 3, 4, 5)),
                is_pinned INTEGER DEFAULT 0,
                preview TEXT NOT NULL DEFAULT '',
                content BLOB NOT NULL,
                created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
            );

            CREATE TABLE IF NOT EXISTS current_buffer (
                id INTEGER PRIMARY KEY CHECK(id = 1),
                buffer_id INTEGER DEFAULT 1
            );

            CREATE INDEX IF NOT EXISTS idx_buffer_pinned ON clipboard(buffer_id, is_pinned DESC);
            CREATE INDEX IF NOT EXISTS idx_buffer_id ON clipboard(buffer_id);
            CREATE INDEX IF NOT EXISTS idx_pinned ON clipboard(is_pinned);
            CREATE INDEX IF NOT EXISTS idx_content ON clipboard(content);
            ",
        )?;

        conn.execute(
            "INSERT OR IGNORE INTO schema_version (version) VALUES (?1)",
            params![SCHEMA_VERSION],
        )?;

        Ok(())
    }

    /// Active buffer from the cursor row
    pub async fn current_buffer(&self) -> Result<u8, HistoryError> {
        let conn = self.conn.lock().await;
        let buffer: u8 = conn.query_row(
            "SELECT buffer_id FROM current_buffer WHERE id = 1",
            [],
            |row| row.get(0),
        )?;
        Ok(buffer)
    }

    /// Replace the cursor row
    pub async fn set_current_buffer(&self, buffer: u8) -> Result<(), HistoryError> {
        let conn = self.conn.lock().await;
        conn.execute(
            "INSERT INTO current_buffer (id, buffer_id) VALUES (1, ?1)
             ON CONFLICT(id) DO UPDATE SET buffer_id = excluded.buffer_id",
            params![buffer],
        )?;
        Ok(())
    }

    /// Remove exact duplicates of `content` among the `window` most recent
    /// unpinned entries of `buffer`, then insert `content` as a new row.
    ///
    /// Returns the new id and the ids that were removed.
    pub async fn insert_deduplicated(
        &self,
        buffer: u8,
        content: &[u8],
        window: usize,
    ) -> Result<(i64, Vec<i64>), HistoryError> {
        let mut conn = self.conn.lock().await;
        let tx = conn.transaction()?;

        let duplicates = {
            let mut stmt = tx.prepare(
                "SELECT id FROM (
                     SELECT id, content FROM clipboard
                     WHERE buffer_id = ?1 AND is_pinned = 0
                     ORDER BY id DESC
                     LIMIT ?2
                 )
                 WHERE content = ?3",
            )?;
            let ids = stmt
                .query_map(params![buffer, window as i64, content], |row| row.get(0))?
                .collect::<Result<Vec<i64>, _>>()?;
            ids
        };

        delete_ids(&tx, &duplicates)?;

        tx.execute(
            "INSERT INTO clipboard (buffer_id, content, preview) VALUES (?1, ?2, '')",
            params![buffer, content],
        )?;
        let id = tx.last_insert_rowid();

        tx.commit()?;
        Ok((id, duplicates))
    }

    /// Delete unpinned entries of `buffer` beyond the newest `keep`
    pub async fn evict_unpinned(&self, buffer: u8, keep: usize) -> Result<Vec<i64>, HistoryError> {
        let mut conn = self.conn.lock().await;
        let tx = conn.transaction()?;

        let excess = {
            let mut stmt = tx.prepare(
                "SELECT id FROM clipboard
                 WHERE buffer_id = ?1 AND is_pinned = 0
                 ORDER BY id DESC
                 LIMIT -1 OFFSET ?2",
            )?;
            let ids = stmt
                .query_map(params![buffer, keep as i64], |row| row.get(0))?
                .collect::<Result<Vec<i64>, _>>()?;
            ids
        };

        delete_ids(&tx, &excess)?;

        tx.commit()?;
        Ok(excess)
    }

    /// Persist a recomputed preview
    pub async fn set_preview(&self, id: i64, preview: &str) -> Result<(), HistoryError> {
        let conn = self.conn.lock().await;
        let changed = conn.execute(
            "UPDATE clipboard SET preview = ?1 WHERE id = ?2",
            params![preview, id],
        )?;
        if changed == 0 {
            return Err(HistoryError::NotFound(id));
        }
        Ok(())
    }

    /// Persist a pin state together with its preview
    pub async fn set_pinned(&self, id: i64, pinned: bool, preview: &str) -> Result<(), HistoryError> {
        let conn = self.conn.lock().await;
        let changed = conn.execute(
            "UPDATE clipboard SET is_pinned = ?1, preview = ?2 WHERE id = ?3",
            params![pinned, preview, id],
        )?;
        if changed == 0 {
            return Err(HistoryError::NotFound(id));
        }
        Ok(())
    }

    /// Store many previews in one transaction
    pub async fn set_previews(&self, previews: &[(i64, String)]) -> Result<(), HistoryError> {
        let mut conn = self.conn.lock().await;
        let tx = conn.transaction()?;
        {
            let mut stmt = tx.prepare("UPDATE clipboard SET preview = ?1 WHERE id = ?2")?;
            for (id, preview) in previews {
                stmt.execute(params![preview, id])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    /// Fetch a single entry
    pub async fn get(&self, id: i64) -> Result<Option<ClipboardEntry>, HistoryError> {
        let conn = self.conn.lock().await;
        let entry = conn
            .query_row(
                &format!("SELECT {} FROM clipboard WHERE id = ?1", ENTRY_COLUMNS),
                params![id],
                row_to_entry,
            )
            .optional()?;
        Ok(entry)
    }

    /// Raw content of a single entry
    pub async fn content(&self, id: i64) -> Result<Option<Vec<u8>>, HistoryError> {
        let conn = self.conn.lock().await;
        let content = conn
            .query_row(
                "SELECT content FROM clipboard WHERE id = ?1",
                params![id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(content)
    }

    /// Delete an entry; `false` if it did not exist
    pub async fn delete(&self, id: i64) -> Result<bool, HistoryError> {
        let conn = self.conn.lock().await;
        let changed = conn.execute("DELETE FROM clipboard WHERE id = ?1", params![id])?;
        Ok(changed > 0)
    }

    /// Entries newest first, restricted to `buffer` when given
    pub async fn entries(&self, buffer: Option<u8>) -> Result<Vec<ClipboardEntry>, HistoryError> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM clipboard
             WHERE ?1 IS NULL OR buffer_id = ?1
             ORDER BY id DESC",
            ENTRY_COLUMNS
        ))?;

        let entries = stmt
            .query_map(params![buffer], row_to_entry)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(entries)
    }

    /// Cached preview lines of `buffer`, newest first
    pub async fn previews(
        &self,
        buffer: u8,
        limit: usize,
        pinned_only: bool,
    ) -> Result<Vec<String>, HistoryError> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare(
            "SELECT preview FROM clipboard
             WHERE buffer_id = ?1 AND (?2 = 0 OR is_pinned = 1)
             ORDER BY id DESC
             LIMIT ?3",
        )?;

        let previews = stmt
            .query_map(params![buffer, pinned_only, limit as i64], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;
        Ok(previews)
    }

    /// Rebuild the database file and truncate the WAL
    pub async fn vacuum(&self) -> Result<(), HistoryError> {
        let conn = self.conn.lock().await;
        conn.execute_batch("VACUUM;")?;
        // Returns a status row, so it can't go through execute_batch
        conn.query_row("PRAGMA wal_checkpoint(TRUNCATE)", [], |_| Ok(()))?;
        Ok(())
    }
}

fn delete_ids(conn: &Connection, ids: &[i64]) -> Result<(), HistoryError> {
    let mut stmt = conn.prepare("DELETE FROM clipboard WHERE id = ?1")?;
    for id in ids {
        stmt.execute(params![id])?;
    }
    Ok(())
}

fn row_to_entry(row: &Row) -> rusqlite::Result<ClipboardEntry> {
    Ok(ClipboardEntry {
        id: row.get(0)?,
        buffer_id: row.get(1)?,
        is_pinned: row.get::<_, Option<i64>>(2)?.unwrap_or(0) != 0,
        content: row.get(3)?,
        preview: row.get(4)?,
        created_at: row.get(5)?,
    })
}
