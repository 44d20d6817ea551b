//! Thumbnail icons for image clips
//!
//! Icons live in a directory next to the database, one `<id>.png` per entry.
//! They are derived data: regenerable from the stored content at any time,
//! and the history store deletes them whenever their entry goes away.

use image::imageops::FilterType;
use image::{ImageFormat, ImageReader};
use std::fs;
use std::io::Cursor;
use std::path::PathBuf;
use thiserror::Error;
use tracing::debug;

/// Largest edge of a generated icon, in pixels
pub const MAX_ICON_SIZE: u32 = 64;

/// Only this much of the content is inspected when probing headers
const PROBE_LIMIT: usize = 1024 * 1024;

/// Icon pipeline errors
#[derive(Debug, Error)]
pub enum IconError {
    /// Decoding or encoding failed
    #[error("Image codec error: {0}")]
    Image(#[from] image::ImageError),

    /// Icon directory or file could not be written
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Header information of a recognised raster image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageInfo {
    pub format: ImageFormat,
    pub width: u32,
    pub height: u32,
}

impl ImageInfo {
    /// Codec name, e.g. "png", "jpeg", "gif"
    pub fn format_name(&self) -> &'static str {
        match self.format {
            ImageFormat::Jpeg => "jpeg",
            other => other.extensions_str().first().copied().unwrap_or("image"),
        }
    }
}

/// Decode just enough of `data` to learn its format and dimensions
pub fn probe(data: &[u8]) -> Option<ImageInfo> {
    let head = &data[..data.len().min(PROBE_LIMIT)];
    let reader = ImageReader::new(Cursor::new(head)).with_guessed_format().ok()?;
    let format = reader.format()?;
    let (width, height) = reader.into_dimensions().ok()?;

    Some(ImageInfo {
        format,
        width,
        height,
    })
}

/// Short format name if `data` is a decodable image (jpg, png, gif, ...)
pub fn detect_format(data: &[u8]) -> Option<&'static str> {
    probe(data).map(|info| match info.format_name() {
        "jpeg" => "jpg",
        other => other,
    })
}

/// Dimensions that fit within `MAX_ICON_SIZE` keeping the aspect ratio.
/// Smaller images keep their size.
pub fn icon_dimensions(width: u32, height: u32) -> (u32, u32) {
    let (width, height) = (u64::from(width), u64::from(height));
    let max = u64::from(MAX_ICON_SIZE);

    let (w, h) = if width > height {
        if width > max {
            (max, height * max / width)
        } else {
            (width, height)
        }
    } else if height > max {
        (width * max / height, max)
    } else {
        (width, height)
    };

    // Clamped above by MAX_ICON_SIZE, so the narrowing cannot truncate
    (w.max(1) as u32, h.max(1) as u32)
}

/// Directory of `<id>.png` icons
#[derive(Debug, Clone)]
pub struct IconStore {
    dir: PathBuf,
}

impl IconStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn file_for(&self, id: i64) -> PathBuf {
        self.dir.join(format!("{}.png", id))
    }

    /// Absolute path of the icon for `id`, if it exists
    pub fn icon_path(&self, id: i64) -> Option<PathBuf> {
        let path = self.file_for(id);
        if !path.is_file() {
            return None;
        }
        path.canonicalize().ok()
    }

    /// Decode `data`, shrink it to at most 64px and write it as PNG
    pub fn generate(&self, id: i64, data: &[u8]) -> Result<PathBuf, IconError> {
        fs::create_dir_all(&self.dir)?;

        let source = image::load_from_memory(data)?.to_rgba8();
        let (width, height) = icon_dimensions(source.width(), source.height());
        let icon = if (width, height) == source.dimensions() {
            source
        } else {
            // Triangle is bilinear with clamped edges
            image::imageops::resize(&source, width, height, FilterType::Triangle)
        };

        let path = self.file_for(id);
        icon.save_with_format(&path, ImageFormat::Png)?;
        debug!(id, width, height, path = %path.display(), "Generated icon");

        Ok(path.canonicalize().unwrap_or(path))
    }

    /// Remove the icon for `id`; a missing file is not an error
    pub fn delete(&self, id: i64) -> std::io::Result<()> {
        match fs::remove_file(self.file_for(id)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e),
        }
    }
}
