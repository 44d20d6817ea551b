//! Text helpers shared by preview rendering and maintenance output

/// Appended to truncated previews
pub const ELLIPSIS: &str = "…";

const SIZE_UNITS: [&str; 4] = ["B", "KiB", "MiB", "GiB"];

/// Escape the characters Pango markup treats specially
pub fn escape_markup(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            other => escaped.push(other),
        }
    }
    escaped
}

/// Keep at most `max` characters, appending `…` when something was cut
pub fn truncate(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((end, _)) => format!("{}{}", &text[..end], ELLIPSIS),
        None => text.to_string(),
    }
}

/// Collapse every whitespace run into a single space
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Human readable size with binary units, e.g. "1.50 KiB"
pub fn format_size(bytes: u64) -> String {
    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < SIZE_UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    format!("{:.2} {}", size, SIZE_UNITS[unit])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_markup() {
        assert_eq!(escape_markup("a < b && c > d"), "a &lt; b &amp;&amp; c &gt; d");
        assert_eq!(escape_markup("&lt;"), "&amp;lt;");
    }

    #[test]
    fn test_truncate_counts_characters() {
        assert_eq!(truncate("hello", 5), "hello");
        assert_eq!(truncate("hello world", 5), "hello…");
        assert_eq!(truncate("привет мир", 6), "привет…");
        assert_eq!(truncate("abc", 0), "…");
    }

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(collapse_whitespace("a \n\t b   c"), "a b c");
    }

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(0), "0.00 B");
        assert_eq!(format_size(1023), "1023.00 B");
        assert_eq!(format_size(1536), "1.50 KiB");
        assert_eq!(format_size(5 * 1024 * 1024), "5.00 MiB");
        assert_eq!(format_size(3 * 1024 * 1024 * 1024 * 1024), "3072.00 GiB");
    }
}
