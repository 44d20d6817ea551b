//! Clipboard history management and persistence
//!
//! `ClipboardHistory` owns the retention rules: exact-duplicate removal,
//! the per-buffer cap on unpinned entries, pin protection, and the
//! cascade from deleted rows to their icon files.

pub mod database;
mod maintenance;

use chrono::NaiveDateTime;
use std::path::Path;
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt};
use tracing::{debug, warn};

use crate::config::Settings;
use crate::icon::{self, IconStore};
use crate::preview::{self, PreviewInput};
use crate::{BUFFER_COUNT, MAX_CONTENT_SIZE};

pub use database::{HistoryDatabase, PINNED_LIST_LIMIT};
pub use maintenance::VacuumReport;

/// History store errors
#[derive(Debug, Error)]
pub enum HistoryError {
    /// No entry with this id
    #[error("entry with id {0} not found")]
    NotFound(i64),

    /// Ids are positive
    #[error("invalid id: {0}")]
    InvalidId(i64),

    /// Buffers are numbered 1-5
    #[error("buffer_id must be between 1 and {max}, got {0}", max = BUFFER_COUNT)]
    BufferOutOfRange(i64),

    /// SQLite error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// One stored clip
#[derive(Debug, Clone, PartialEq)]
pub struct ClipboardEntry {
    /// Assigned on insert, never reused
    pub id: i64,
    /// Buffer (1-5) the entry belongs to
    pub buffer_id: u8,
    pub is_pinned: bool,
    /// Raw bytes as copied
    pub content: Vec<u8>,
    /// Cached rofi line
    pub preview: String,
    pub created_at: NaiveDateTime,
}

/// Main interface for clipboard history management
pub struct ClipboardHistory {
    db: HistoryDatabase,
    icons: IconStore,
    settings: Settings,
}

impl ClipboardHistory {
    /// Open the history at `db_path`; icons go to `icons/` next to it
    pub async fn new(db_path: &Path, settings: Settings) -> Result<Self, HistoryError> {
        let db = HistoryDatabase::new(db_path).await?;
        let icons = IconStore::new(Settings::icons_dir_for(db_path));

        Ok(Self {
            db,
            icons,
            settings,
        })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn icons(&self) -> &IconStore {
        &self.icons
    }

    /// Read one clip from `reader` (bounded to just over the size limit)
    /// and store it in the current buffer
    pub async fn store_from_reader<R>(&self, reader: R) -> Result<Option<ClipboardEntry>, HistoryError>
    where
        R: AsyncRead + Unpin,
    {
        let mut content = Vec::new();
        reader
            .take(MAX_CONTENT_SIZE as u64 + 1)
            .read_to_end(&mut content)
            .await?;
        self.store(&content).await
    }

    /// Store `content` in the current buffer
    pub async fn store(&self, content: &[u8]) -> Result<Option<ClipboardEntry>, HistoryError> {
        let buffer = self.current_buffer().await;
        self.put(buffer, content).await
    }

    /// Store `content` in `buffer`
    ///
    /// Oversized, blank and too-short content is ignored (`Ok(None)`).
    /// Exact copies among the recent unpinned entries are replaced by the
    /// new row, and the buffer is trimmed to `max_items` unpinned entries.
    pub async fn put(&self, buffer: u8, content: &[u8]) -> Result<Option<ClipboardEntry>, HistoryError> {
        check_buffer(i64::from(buffer))?;

        if content.len() > MAX_CONTENT_SIZE {
            debug!(size = content.len(), "Ignoring oversized clip");
            return Ok(None);
        }

        let length = trimmed_length(content);
        if length == 0 {
            debug!("Ignoring blank clip");
            return Ok(None);
        }
        if self.settings.min_store_length > 0 && length < self.settings.min_store_length {
            debug!(length, min = self.settings.min_store_length, "Ignoring short clip");
            return Ok(None);
        }

        let (id, duplicates) = self
            .db
            .insert_deduplicated(buffer, content, self.settings.max_dedupe_search)
            .await?;
        if !duplicates.is_empty() {
            debug!(?duplicates, "Removed duplicate entries");
            self.discard_icons(&duplicates);
        }

        let icon = if self.settings.show_image_icons {
            self.generate_icon(id, content)
        } else {
            None
        };

        let preview = self.render(id, content, false, icon.as_deref());
        self.db.set_preview(id, &preview).await?;
        debug!(id, buffer, size = content.len(), "Stored clip");

        if self.settings.max_items > 0 {
            let evicted = self.db.evict_unpinned(buffer, self.settings.max_items).await?;
            if !evicted.is_empty() {
                debug!(count = evicted.len(), "Evicted entries over max_items");
                self.discard_icons(&evicted);
            }
        }

        self.get(id).await.map(Some)
    }

    /// Flip the pin state of an entry and refresh its preview
    pub async fn toggle_pin(&self, id: i64) -> Result<ClipboardEntry, HistoryError> {
        let entry = self.get(id).await?;
        let pinned = !entry.is_pinned;

        let icon = self.existing_icon(id);
        let preview = self.render(id, &entry.content, pinned, icon.as_deref());
        self.db.set_pinned(id, pinned, &preview).await?;
        debug!(id, pinned, "Toggled pin");

        Ok(ClipboardEntry {
            is_pinned: pinned,
            preview,
            ..entry
        })
    }

    /// Delete an entry and its icon
    pub async fn delete(&self, id: i64) -> Result<(), HistoryError> {
        check_id(id)?;
        if !self.db.delete(id).await? {
            return Err(HistoryError::NotFound(id));
        }

        self.discard_icons(&[id]);
        debug!(id, "Deleted entry");
        Ok(())
    }

    /// Fetch an entry
    pub async fn get(&self, id: i64) -> Result<ClipboardEntry, HistoryError> {
        check_id(id)?;
        self.db.get(id).await?.ok_or(HistoryError::NotFound(id))
    }

    /// Raw content of an entry, for copying back to the clipboard
    pub async fn get_content(&self, id: i64) -> Result<Vec<u8>, HistoryError> {
        check_id(id)?;
        self.db.content(id).await?.ok_or(HistoryError::NotFound(id))
    }

    /// Entries of `buffer`, newest first
    pub async fn entries(&self, buffer: u8) -> Result<Vec<ClipboardEntry>, HistoryError> {
        self.db.entries(Some(buffer)).await
    }

    /// Cached preview lines of `buffer`, newest first
    pub async fn previews(&self, buffer: u8, limit: usize) -> Result<Vec<String>, HistoryError> {
        self.db.previews(buffer, limit, false).await
    }

    /// Cached preview lines of the pinned entries of `buffer`, newest first
    pub async fn pinned_previews(&self, buffer: u8) -> Result<Vec<String>, HistoryError> {
        self.db.previews(buffer, PINNED_LIST_LIMIT, true).await
    }

    /// Active buffer; 1 if the cursor can't be read
    pub async fn current_buffer(&self) -> u8 {
        match self.db.current_buffer().await {
            Ok(buffer) if (1..=BUFFER_COUNT).contains(&buffer) => buffer,
            Ok(buffer) => {
                warn!(buffer, "Stored buffer out of range, using buffer 1");
                1
            }
            Err(e) => {
                warn!(error = %e, "Failed to read current buffer, using buffer 1");
                1
            }
        }
    }

    /// Make `target` the active buffer
    pub async fn switch_buffer(&self, target: i64) -> Result<(), HistoryError> {
        let buffer = check_buffer(target)?;
        self.db.set_current_buffer(buffer).await?;
        debug!(buffer, "Switched buffer");
        Ok(())
    }

    /// Step to the next buffer, wrapping 5 -> 1
    pub async fn next_buffer(&self) -> Result<u8, HistoryError> {
        let next = self.current_buffer().await % BUFFER_COUNT + 1;
        self.switch_buffer(i64::from(next)).await?;
        Ok(next)
    }

    /// Step to the previous buffer, wrapping 1 -> 5
    pub async fn previous_buffer(&self) -> Result<u8, HistoryError> {
        let current = self.current_buffer().await;
        let previous = if current <= 1 { BUFFER_COUNT } else { current - 1 };
        self.switch_buffer(i64::from(previous)).await?;
        Ok(previous)
    }

    fn render(&self, id: i64, content: &[u8], is_pinned: bool, icon: Option<&Path>) -> String {
        preview::render(
            PreviewInput {
                id,
                content,
                is_pinned,
                icon,
            },
            &self.settings,
        )
    }

    /// Icon path to show for `id`, honouring `show_image_icons`
    fn existing_icon(&self, id: i64) -> Option<std::path::PathBuf> {
        if !self.settings.show_image_icons {
            return None;
        }
        self.icons.icon_path(id)
    }

    /// Generate an icon when `content` is an image; failures only warn
    fn generate_icon(&self, id: i64, content: &[u8]) -> Option<std::path::PathBuf> {
        icon::detect_format(content)?;

        match self.icons.generate(id, content) {
            Ok(path) => Some(path),
            Err(e) => {
                warn!(id, error = %e, "Failed to process image icon");
                None
            }
        }
    }

    fn discard_icons(&self, ids: &[i64]) {
        for &id in ids {
            if let Err(e) = self.icons.delete(id) {
                debug!(id, error = %e, "Failed to delete icon file");
            }
        }
    }
}

fn check_id(id: i64) -> Result<(), HistoryError> {
    if id <= 0 {
        return Err(HistoryError::InvalidId(id));
    }
    Ok(())
}

fn check_buffer(buffer: i64) -> Result<u8, HistoryError> {
    u8::try_from(buffer)
        .ok()
        .filter(|b| (1..=BUFFER_COUNT).contains(b))
        .ok_or(HistoryError::BufferOutOfRange(buffer))
}

/// Byte length used for the blank and minimum-length checks, after
/// trimming surrounding whitespace
fn trimmed_length(content: &[u8]) -> usize {
    match std::str::from_utf8(content) {
        Ok(text) => text.trim().len(),
        Err(_) => content.trim_ascii().len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn setup(settings: Settings) -> (ClipboardHistory, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let history = ClipboardHistory::new(&temp_dir.path().join("test.db"), settings)
            .await
            .unwrap();
        (history, temp_dir)
    }

    #[test]
    fn test_trimmed_length() {
        assert_eq!(trimmed_length(b"  abc \n"), 3);
        assert_eq!(trimmed_length("  ключ ".as_bytes()), 8);
        assert_eq!(trimmed_length("\u{3000}abc\u{a0}".as_bytes()), 3);
        assert_eq!(trimmed_length(b" \t\n"), 0);
        assert_eq!(trimmed_length(&[b' ', 0xff, 0xfe, b'\n']), 2);
    }

    #[test]
    fn test_check_buffer() {
        assert_eq!(check_buffer(1).unwrap(), 1);
        assert_eq!(check_buffer(5).unwrap(), 5);
        for bad in [0, 6, -1, 300] {
            assert!(matches!(check_buffer(bad), Err(HistoryError::BufferOutOfRange(b)) if b == bad));
        }
    }

    #[tokio::test]
    async fn test_ignored_content() {
        let settings = Settings {
            min_store_length: 4,
            ..Settings::default()
        };
        let (history, _temp_dir) = setup(settings).await;

        assert!(history.store(b"").await.unwrap().is_none());
        assert!(history.store(b"  \n\t ").await.unwrap().is_none());
        assert!(history.store(b"  abc  ").await.unwrap().is_none());
        assert!(history.store(&vec![b'x'; MAX_CONTENT_SIZE + 1]).await.unwrap().is_none());
        assert!(history.entries(1).await.unwrap().is_empty());

        assert!(history.store(b"abcd").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_min_store_length_counts_bytes() {
        let settings = Settings {
            min_store_length: 8,
            ..Settings::default()
        };
        let (history, _temp_dir) = setup(settings).await;

        // 6 characters, 12 bytes
        let entry = history.store(" привет\n".as_bytes()).await.unwrap();
        assert!(entry.is_some());
        assert!(history.store(b"  short ").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_content_at_size_limit_is_stored() {
        let (history, _temp_dir) = setup(Settings::default()).await;
        let entry = history.store(&vec![b'x'; MAX_CONTENT_SIZE]).await.unwrap();
        assert!(entry.is_some());
    }

    #[tokio::test]
    async fn test_store_from_reader_drops_oversize() {
        let (history, _temp_dir) = setup(Settings::default()).await;
        let oversized = vec![b'y'; MAX_CONTENT_SIZE + 10];
        assert!(history.store_from_reader(&oversized[..]).await.unwrap().is_none());

        let entry = history.store_from_reader(&b"from stdin"[..]).await.unwrap().unwrap();
        assert_eq!(entry.content, b"from stdin");
    }

    #[tokio::test]
    async fn test_invalid_ids() {
        let (history, _temp_dir) = setup(Settings::default()).await;
        assert!(matches!(history.get(0).await, Err(HistoryError::InvalidId(0))));
        assert!(matches!(history.delete(-3).await, Err(HistoryError::InvalidId(-3))));
        assert!(matches!(history.get_content(5).await, Err(HistoryError::NotFound(5))));
        assert!(matches!(history.toggle_pin(5).await, Err(HistoryError::NotFound(5))));
        assert!(matches!(history.delete(5).await, Err(HistoryError::NotFound(5))));
    }

    #[tokio::test]
    async fn test_corrupt_cursor_falls_back_to_first_buffer() {
        let (history, _temp_dir) = setup(Settings::default()).await;
        {
            let conn = rusqlite::Connection::open(history.db.path()).unwrap();
            conn.execute("UPDATE current_buffer SET buffer_id = 9 WHERE id = 1", [])
                .unwrap();
        }
        assert_eq!(history.current_buffer().await, 1);
        assert_eq!(history.next_buffer().await.unwrap(), 2);
    }
}
