//! Display line rendering
//!
//! Every entry carries a cached preview: the exact line written to rofi,
//! including the marker, the markup-safe text and the trailing `\0info`
//! (and optionally `\0icon`) metadata fields.

pub mod format;

use std::path::Path;

use crate::config::{MaskMode, Settings};
use crate::detect;
use crate::hidden_id::encode_hidden;
use crate::icon;

pub use format::{collapse_whitespace, escape_markup, format_size, truncate};

/// Shown instead of the password under full masking
pub const PASSWORD_PLACEHOLDER: &str = "[[ PASSWORD ]]";

/// Passwords shorter than this stay visible under partial masking
const MIN_MASKED_LENGTH: usize = 6;
const VISIBLE_PREFIX: usize = 2;
const VISIBLE_SUFFIX: usize = 4;

/// Inputs for rendering one entry
#[derive(Debug, Clone, Copy)]
pub struct PreviewInput<'a> {
    pub id: i64,
    pub content: &'a [u8],
    pub is_pinned: bool,
    /// Absolute icon path when the entry has a thumbnail
    pub icon: Option<&'a Path>,
}

/// Render the complete rofi line for an entry
pub fn render(input: PreviewInput<'_>, settings: &Settings) -> String {
    let marker = if input.is_pinned {
        &settings.pinned_marker
    } else {
        &settings.unpinned_marker
    };

    let mut line = format!("{} {}", marker, render_text(input.content, settings));

    if let Some(icon) = input.icon {
        line.push_str(&encode_hidden(input.id));
        line.push_str(&format!("\0icon\x1f{}", icon.display()));
    }

    line.push_str(&format!("\0info\x1f{}", input.id));
    line
}

/// Visible text of an entry, without marker or metadata
pub fn render_text(content: &[u8], settings: &Settings) -> String {
    if let Some(info) = icon::probe(content) {
        return format!(
            "[[ {}: {}x{} • {} ]]",
            info.format_name().to_uppercase(),
            info.width,
            info.height,
            format_size(content.len() as u64)
        );
    }

    let Ok(text) = std::str::from_utf8(content) else {
        return format!("[[ BIN: {} ]]", format_size(content.len() as u64));
    };
    let text = text.trim();

    if settings.mask_passwords.is_enabled()
        && detect::is_password(content, &settings.password_ignore_patterns)
    {
        let truncated = truncate(text, settings.preview_width);
        return mask_password(&truncated, settings);
    }

    let collapsed = collapse_whitespace(text);
    escape_markup(&truncate(&collapsed, settings.preview_width))
}

/// Apply the configured masking mode to an already truncated password
pub fn mask_password(password: &str, settings: &Settings) -> String {
    match settings.mask_passwords {
        MaskMode::Off => escape_markup(password),
        MaskMode::Full => PASSWORD_PLACEHOLDER.to_string(),
        MaskMode::Partial => mask_partial(
            password,
            settings.password_mask_char,
            &settings.password_mask_color,
        ),
    }
}

/// First two and last four characters stay visible; the middle becomes a
/// colored run of `mask_char`.
fn mask_partial(password: &str, mask_char: char, color: &str) -> String {
    let chars: Vec<char> = password.chars().collect();
    if chars.len() < MIN_MASKED_LENGTH {
        return escape_markup(password);
    }

    let head: String = chars[..VISIBLE_PREFIX].iter().collect();
    let tail: String = chars[chars.len() - VISIBLE_SUFFIX..].iter().collect();
    let hidden = mask_char
        .to_string()
        .repeat(chars.len() - VISIBLE_PREFIX - VISIBLE_SUFFIX);

    format!(
        "{}<span color='{}'>{}</span>{}",
        escape_markup(&head),
        escape_markup(color),
        escape_markup(&hidden),
        escape_markup(&tail)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgba, RgbaImage};
    use pretty_assertions::assert_eq;
    use std::io::Cursor;
    use std::path::PathBuf;

    fn text_input(id: i64, content: &[u8]) -> PreviewInput<'_> {
        PreviewInput {
            id,
            content,
            is_pinned: false,
            icon: None,
        }
    }

    fn masking(mode: MaskMode) -> Settings {
        Settings {
            mask_passwords: mode,
            ..Settings::default()
        }
    }

    #[test]
    fn test_plain_text_line() {
        let settings = Settings::default();
        let line = render(text_input(3, b"  hello \n  world  "), &settings);
        assert_eq!(line, " hello world\0info\x1f3");
    }

    #[test]
    fn test_markers() {
        let settings = Settings {
            pinned_marker: "P".into(),
            unpinned_marker: "-".into(),
            ..Settings::default()
        };
        let pinned = PreviewInput {
            is_pinned: true,
            ..text_input(9, b"note")
        };
        assert_eq!(render(pinned, &settings), "P note\0info\x1f9");
        assert_eq!(render(text_input(9, b"note"), &settings), "- note\0info\x1f9");
    }

    #[test]
    fn test_truncates_then_escapes() {
        let settings = Settings {
            preview_width: 5,
            ..Settings::default()
        };
        assert_eq!(render_text(b"<a&b> tail", &settings), "&lt;a&amp;b&gt;…");
    }

    #[test]
    fn test_binary_content() {
        let data = [0u8, 159, 146, 150, 255, 1, 2];
        assert_eq!(render_text(&data, &Settings::default()), "[[ BIN: 7.00 B ]]");
    }

    #[test]
    fn test_image_content() {
        let img = RgbaImage::from_pixel(20, 10, Rgba([0, 0, 255, 255]));
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, ImageFormat::Png).unwrap();
        let data = out.into_inner();

        let text = render_text(&data, &Settings::default());
        assert_eq!(
            text,
            format!("[[ PNG: 20x10 • {} ]]", format_size(data.len() as u64))
        );
    }

    #[test]
    fn test_icon_metadata() {
        let icon = PathBuf::from("/cache/icons/12.png");
        let input = PreviewInput {
            icon: Some(&icon),
            ..text_input(12, b"picture")
        };
        assert_eq!(
            render(input, &Settings::default()),
            format!(" picture{}\0icon\x1f/cache/icons/12.png\0info\x1f12", encode_hidden(12))
        );
    }

    #[test]
    fn test_partial_mask() {
        let settings = masking(MaskMode::Partial);
        assert_eq!(
            render_text(b"Sw7!kP2@aZ", &settings),
            "Sw<span color='#DC2626'>****</span>2@aZ"
        );
    }

    #[test]
    fn test_partial_mask_escapes_visible_parts() {
        let settings = Settings {
            password_mask_color: "<red>".into(),
            password_mask_char: '&',
            ..masking(MaskMode::Partial)
        };
        assert_eq!(
            render_text(b"<b7!kP2@a>", &settings),
            "&lt;b<span color='&lt;red&gt;'>&amp;&amp;&amp;&amp;</span>2@a&gt;"
        );
    }

    #[test]
    fn test_full_mask() {
        let settings = masking(MaskMode::Full);
        for password in ["Sw7!kP2@aZ", "hunter2Hunter", "Tr0ub4dor&3"] {
            assert_eq!(render_text(password.as_bytes(), &settings), PASSWORD_PLACEHOLDER);
        }
    }

    #[test]
    fn test_masking_disabled_shows_password() {
        assert_eq!(render_text(b"Sw7!kP2@aZ", &Settings::default()), "Sw7!kP2@aZ");
    }

    #[test]
    fn test_non_password_not_masked() {
        let settings = masking(MaskMode::Full);
        assert_eq!(render_text(b"https://Ex4mple.com", &settings), "https://Ex4mple.com");
    }

    #[test]
    fn test_short_partial_input_stays_visible() {
        assert_eq!(mask_partial("a<b", '*', "red"), "a&lt;b");
        assert_eq!(
            mask_partial("abcdef", '*', "red"),
            "ab<span color='red'></span>cdef"
        );
    }

    #[test]
    fn test_ignore_patterns_disable_masking() {
        let settings = Settings {
            password_ignore_patterns: vec!["^Sw7".into()],
            ..masking(MaskMode::Full)
        };
        assert_eq!(render_text(b"Sw7!kP2@aZ", &settings), "Sw7!kP2@aZ");
    }
}
