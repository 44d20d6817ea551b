//! # Clipshelf
//!
//! Multi-buffer clipboard history driven by rofi's script mode.
//!
//! Copied content is persisted in SQLite, deduplicated, evicted past a
//! retention cap, classified (passwords, URLs, paths, ...) and rendered as a
//! single markup line per entry that rofi shows as a selectable menu.

pub mod cli;
pub mod clipboard;
pub mod config;
pub mod detect;
pub mod hidden_id;
pub mod history;
pub mod icon;
pub mod preview;
pub mod protocol;

pub use config::Settings;
pub use history::{ClipboardEntry, ClipboardHistory};

/// Result type alias for Clipshelf operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for Clipshelf operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// History store error
    #[error(transparent)]
    History(#[from] history::HistoryError),

    /// Icon pipeline error
    #[error("Icon error: {0}")]
    Icon(#[from] icon::IconError),

    /// Clipboard operation error
    #[error("Clipboard error: {0}")]
    Clipboard(#[from] clipboard::ClipboardError),

    /// Selection did not resolve to an entry
    #[error(transparent)]
    Selection(#[from] hidden_id::SelectionError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Library version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Largest clipboard payload that is stored (12MB); anything above is dropped
pub const MAX_CONTENT_SIZE: usize = 12_000_000;

/// Number of independent clipboard buffers
pub const BUFFER_COUNT: u8 = 5;
