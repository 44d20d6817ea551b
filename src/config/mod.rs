//! Configuration management for Clipshelf
//!
//! Settings come from a flat `key = value` file. Loading is permissive: a
//! missing file, an unreadable file or a malformed value all fall back to the
//! built-in defaults, and the fallback is logged rather than surfaced.

use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

use crate::BUFFER_COUNT;

/// Application directory name under the XDG config/cache roots
const APP_DIR: &str = "clipshelf";
const CONFIG_FILE: &str = "config.conf";
const DB_FILE: &str = "clipshelf.db";
const ICONS_DIR: &str = "icons";

/// Environment variable overriding the config file location
pub const CONFIG_ENV: &str = "CLIPSHELF_CONFIG";

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// IO error reading or writing the config file
    #[error("Failed to access config file: {0}")]
    Io(#[from] std::io::Error),

    /// No XDG directory could be resolved
    #[error("Could not determine the {0} directory")]
    NoDirectory(&'static str),

    /// Refusing to clobber an existing file
    #[error("Config file already exists at {0}. Use --force to overwrite.")]
    AlreadyExists(PathBuf),
}

/// How password-shaped content is displayed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MaskMode {
    /// Shown verbatim
    #[default]
    Off,
    /// First two and last four characters visible, the rest masked
    Partial,
    /// Replaced by a fixed placeholder
    Full,
}

impl MaskMode {
    fn from_level(level: i64) -> Option<Self> {
        match level {
            0 => Some(Self::Off),
            1 => Some(Self::Partial),
            2 => Some(Self::Full),
            _ => None,
        }
    }

    fn level(self) -> u8 {
        match self {
            Self::Off => 0,
            Self::Partial => 1,
            Self::Full => 2,
        }
    }

    /// Whether any masking is applied
    pub fn is_enabled(self) -> bool {
        self != Self::Off
    }
}

/// Effective settings for one invocation
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    /// Default number of rows listed
    pub limit: usize,
    /// Marker prepended to pinned entries
    pub pinned_marker: String,
    /// Marker prepended to unpinned entries
    pub unpinned_marker: String,
    /// Display names for buffers 1-5 (empty = "Buffer N")
    pub buffer_names: [String; BUFFER_COUNT as usize],
    /// Width of the rule between regular and pinned rows
    pub separator_length: usize,
    /// Recent unpinned entries scanned for exact duplicates
    pub max_dedupe_search: usize,
    /// Unpinned entries kept per buffer (0 = unlimited)
    pub max_items: usize,
    /// Minimum content length worth storing (0 = disabled)
    pub min_store_length: usize,
    /// Explicit database location
    pub db_path: Option<PathBuf>,
    /// Maximum number of characters in a preview
    pub preview_width: usize,
    /// Generate thumbnail icons for images
    pub show_image_icons: bool,
    /// Password masking mode
    pub mask_passwords: MaskMode,
    /// Markup color of masked characters
    pub password_mask_color: String,
    /// Character used for masking
    pub password_mask_char: char,
    /// Regexes excluding content from password detection
    pub password_ignore_patterns: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            limit: 500,
            pinned_marker: String::new(),
            unpinned_marker: String::new(),
            buffer_names: Default::default(),
            separator_length: 66,
            max_dedupe_search: 100,
            max_items: 500,
            min_store_length: 0,
            db_path: None,
            preview_width: 65,
            show_image_icons: false,
            mask_passwords: MaskMode::Off,
            password_mask_color: "#DC2626".to_string(),
            password_mask_char: '*',
            password_ignore_patterns: Vec::new(),
        }
    }
}

impl Settings {
    /// Load settings from the default location
    ///
    /// Checks in order:
    /// 1. Path from CLIPSHELF_CONFIG environment variable
    /// 2. ~/.config/clipshelf/config.conf
    ///
    /// Never fails; every problem degrades to defaults.
    pub fn load() -> Self {
        match Self::find_config_path() {
            Some(path) => Self::load_or_default(&path),
            None => Self::default(),
        }
    }

    /// Load settings from an explicit path, falling back to defaults
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load_from_path(path) {
            Ok(settings) => settings,
            Err(ConfigError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "No config file, using defaults");
                Self::default()
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to load config, using defaults");
                Self::default()
            }
        }
    }

    /// Load settings from a specific path
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Ok(Self::from_conf_str(&contents))
    }

    /// Parse settings from `key = value` lines
    pub fn from_conf_str(contents: &str) -> Self {
        let mut settings = Self::default();

        for line in contents.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            settings.apply(key.trim(), value.trim());
        }

        settings
    }

    fn apply(&mut self, key: &str, value: &str) {
        match key {
            "limit" => set_positive(&mut self.limit, key, value),
            "pinned_marker" => self.pinned_marker = value.to_string(),
            "unpinned_marker" => self.unpinned_marker = value.to_string(),
            "separator_length" => set_positive(&mut self.separator_length, key, value),
            "max_dedupe_search" => set_positive(&mut self.max_dedupe_search, key, value),
            "max_items" => set_non_negative(&mut self.max_items, key, value),
            "min_store_length" => set_non_negative(&mut self.min_store_length, key, value),
            "db_path" => self.db_path = Some(expand_path(value)),
            "preview_width" => set_positive(&mut self.preview_width, key, value),
            "show_image_icons" => match value {
                "true" | "1" | "yes" => self.show_image_icons = true,
                "false" | "0" | "no" => self.show_image_icons = false,
                _ => ignored(key, value),
            },
            "mask_passwords" => match value.parse().ok().and_then(MaskMode::from_level) {
                Some(mode) => self.mask_passwords = mode,
                None => ignored(key, value),
            },
            "password_mask_color" if !value.is_empty() => {
                self.password_mask_color = value.to_string();
            }
            "password_mask_char" => {
                if let Some(c) = value.chars().next() {
                    self.password_mask_char = c;
                }
            }
            "password_ignore_pattern" if !value.is_empty() => {
                self.password_ignore_patterns.push(value.to_string());
            }
            _ => {
                if let Some(index) = buffer_name_index(key) {
                    self.buffer_names[index] = value.to_string();
                }
            }
        }
    }

    /// Display name of a buffer, falling back to "Buffer N"
    pub fn buffer_name(&self, buffer: u8) -> String {
        let configured = (1..=BUFFER_COUNT)
            .contains(&buffer)
            .then(|| self.buffer_names[usize::from(buffer) - 1].as_str())
            .filter(|name| !name.is_empty());

        match configured {
            Some(name) => name.to_string(),
            None => format!("Buffer {}", buffer),
        }
    }

    /// Resolved database path
    pub fn database_path(&self) -> Result<PathBuf, ConfigError> {
        if let Some(path) = &self.db_path {
            return Ok(path.clone());
        }

        dirs::cache_dir()
            .map(|dir| dir.join(APP_DIR).join(DB_FILE))
            .ok_or(ConfigError::NoDirectory("cache"))
    }

    /// Directory next to the database that holds thumbnail icons
    pub fn icons_dir_for(db_path: &Path) -> PathBuf {
        db_path
            .parent()
            .unwrap_or_else(|| Path::new("."))
            .join(ICONS_DIR)
    }

    /// Find configuration file path
    fn find_config_path() -> Option<PathBuf> {
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            let path = PathBuf::from(path);
            if path.exists() {
                return Some(path);
            }
        }

        Self::default_config_path()
    }

    /// ~/.config/clipshelf/config.conf
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join(APP_DIR).join(CONFIG_FILE))
    }

    /// Write the example configuration to `path`
    pub fn write_example(path: &Path, force: bool) -> Result<(), ConfigError> {
        if !force && path.exists() {
            return Err(ConfigError::AlreadyExists(path.to_path_buf()));
        }

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, Self::generate_example())?;
        Ok(())
    }

    /// Generate example configuration file
    pub fn generate_example() -> String {
        let config = Settings::default();

        format!(
            r#"# Clipshelf Configuration File
# Location: ~/.config/clipshelf/config.conf

# Rows shown by --list when no explicit limit is given
limit = {}

# Markers prepended to each row
pinned_marker = {}
unpinned_marker = {}

# Buffer names shown in the rofi prompt (empty = "Buffer N")
buffer_1_name =
buffer_2_name =
buffer_3_name =
buffer_4_name =
buffer_5_name =

# Width of the rule separating pinned rows
separator_length = {}

# Recent entries checked for duplicates on store
max_dedupe_search = {}
# Unpinned entries kept per buffer (0 = unlimited)
max_items = {}
# Shortest content worth storing (0 = store everything)
min_store_length = {}

# Database location (default: ~/.cache/clipshelf/clipshelf.db)
# db_path = $HOME/.cache/clipshelf/clipshelf.db

# Characters shown per preview
preview_width = {}
# Thumbnail icons for copied images
show_image_icons = {}

# Password masking: 0 = off, 1 = partial, 2 = full
mask_passwords = {}
password_mask_color = {}
password_mask_char = {}
# Regexes excluded from password detection (repeatable)
# password_ignore_pattern = ^ghp_
"#,
            config.limit,
            config.pinned_marker,
            config.unpinned_marker,
            config.separator_length,
            config.max_dedupe_search,
            config.max_items,
            config.min_store_length,
            config.preview_width,
            config.show_image_icons,
            config.mask_passwords.level(),
            config.password_mask_color,
            config.password_mask_char,
        )
    }
}

fn buffer_name_index(key: &str) -> Option<usize> {
    let n: u8 = key
        .strip_prefix("buffer_")?
        .strip_suffix("_name")?
        .parse()
        .ok()?;
    (1..=BUFFER_COUNT)
        .contains(&n)
        .then(|| usize::from(n) - 1)
}

fn set_positive(field: &mut usize, key: &str, value: &str) {
    match value.parse::<usize>() {
        Ok(n) if n > 0 => *field = n,
        _ => ignored(key, value),
    }
}

fn set_non_negative(field: &mut usize, key: &str, value: &str) {
    match value.parse::<usize>() {
        Ok(n) => *field = n,
        Err(_) => ignored(key, value),
    }
}

fn ignored(key: &str, value: &str) {
    warn!(key, value, "Ignoring invalid config value");
}

/// Expand environment variables and tilde in path
fn expand_path(value: &str) -> PathBuf {
    match shellexpand::full(value) {
        Ok(expanded) => PathBuf::from(expanded.into_owned()),
        Err(e) => {
            warn!(value, error = %e, "Failed to expand db_path");
            PathBuf::from(value)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.limit, 500);
        assert_eq!(settings.separator_length, 66);
        assert_eq!(settings.max_dedupe_search, 100);
        assert_eq!(settings.max_items, 500);
        assert_eq!(settings.preview_width, 65);
        assert_eq!(settings.mask_passwords, MaskMode::Off);
        assert_eq!(settings.password_mask_char, '*');
        assert!(!settings.show_image_icons);
    }

    #[test]
    fn test_parse_conf() {
        let conf = r#"
            # comment
            limit = 20
            pinned_marker = P
            buffer_2_name = Work
            max_items = 0
            mask_passwords = 2
            password_mask_char = #x
            show_image_icons = yes
            password_ignore_pattern = ^ghp_
            password_ignore_pattern = ^sk-
            not a setting
        "#;

        let settings = Settings::from_conf_str(conf);
        assert_eq!(settings.limit, 20);
        assert_eq!(settings.pinned_marker, "P");
        assert_eq!(settings.buffer_names[1], "Work");
        assert_eq!(settings.max_items, 0);
        assert_eq!(settings.mask_passwords, MaskMode::Full);
        assert_eq!(settings.password_mask_char, '#');
        assert!(settings.show_image_icons);
        assert_eq!(settings.password_ignore_patterns, vec!["^ghp_", "^sk-"]);
    }

    #[test]
    fn test_invalid_values_keep_defaults() {
        let conf = "limit = 0\npreview_width = wide\nmask_passwords = 3\nmax_dedupe_search = -1\nbuffer_6_name = nope";
        assert_eq!(Settings::from_conf_str(conf), Settings::default());
    }

    #[test]
    fn test_buffer_name_fallback() {
        let settings = Settings::from_conf_str("buffer_1_name = Main");
        assert_eq!(settings.buffer_name(1), "Main");
        assert_eq!(settings.buffer_name(3), "Buffer 3");
    }

    #[test]
    fn test_icons_dir_next_to_db() {
        let dir = Settings::icons_dir_for(Path::new("/tmp/clips/clipshelf.db"));
        assert_eq!(dir, PathBuf::from("/tmp/clips/icons"));
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let settings = Settings::load_or_default(&temp_dir.path().join("absent.conf"));
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_write_example_roundtrips_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("clipshelf").join("config.conf");

        Settings::write_example(&path, false).unwrap();
        assert_eq!(Settings::load_from_path(&path).unwrap(), Settings::default());

        let again = Settings::write_example(&path, false);
        assert!(matches!(again, Err(ConfigError::AlreadyExists(_))));
        Settings::write_example(&path, true).unwrap();
    }
}
