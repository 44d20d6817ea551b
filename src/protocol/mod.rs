//! Rofi script-mode output
//!
//! Control lines are `\0<key>\x1f<value>\n`. Each row is the entry's cached
//! preview, which already ends in its `\0info\x1f<id>` field. Rows that
//! must not trigger an action carry info `0`.

use crate::history::{ClipboardHistory, HistoryError};

/// Character repeated to draw the separator before pinned rows
pub const SEPARATOR_CHAR: char = '─';

/// Append a `\0key\x1fvalue` control line
fn control_line(out: &mut String, key: &str, value: &str) {
    out.push_str(&format!("\0{}\x1f{}\n", key, value));
}

/// Append a row rofi shows but that carries no entry id
fn inert_row(out: &mut String, text: &str) {
    out.push_str(&format!("{}\0info\x1f0\n", text));
}

/// Renders the current buffer as a rofi menu
pub struct ListWriter<'a> {
    history: &'a ClipboardHistory,
}

impl<'a> ListWriter<'a> {
    pub fn new(history: &'a ClipboardHistory) -> Self {
        Self { history }
    }

    /// Full script-mode output for the current buffer
    ///
    /// `limit` overrides the configured row limit when given. Pinned
    /// entries are repeated after the regular rows, behind a separator.
    pub async fn render(&self, limit: Option<usize>) -> Result<String, HistoryError> {
        let settings = self.history.settings();
        let buffer = self.history.current_buffer().await;
        let limit = limit.filter(|n| *n > 0).unwrap_or(settings.limit);

        let mut out = String::new();
        control_line(&mut out, "use-hot-keys", "true");
        control_line(&mut out, "keep-selection", "true");
        control_line(&mut out, "markup-rows", "true");
        control_line(&mut out, "prompt", &settings.buffer_name(buffer));

        let rows = self.history.previews(buffer, limit).await?;
        for row in &rows {
            out.push_str(row);
            out.push('\n');
        }

        let pinned = self.history.pinned_previews(buffer).await?;
        if !pinned.is_empty() && !rows.is_empty() {
            let rule = SEPARATOR_CHAR.to_string().repeat(settings.separator_length);
            inert_row(&mut out, &rule);
        }
        for row in &pinned {
            out.push_str(row);
            out.push('\n');
        }

        if rows.is_empty() && pinned.is_empty() {
            inert_row(&mut out, &format!(" (No entries in buffer {})", buffer));
        }

        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_control_line_format() {
        let mut out = String::new();
        control_line(&mut out, "prompt", "Buffer 1");
        assert_eq!(out, "\0prompt\x1fBuffer 1\n");
    }

    #[test]
    fn test_inert_row_format() {
        let mut out = String::new();
        inert_row(&mut out, "──");
        assert_eq!(out, "──\0info\x1f0\n");
    }
}
