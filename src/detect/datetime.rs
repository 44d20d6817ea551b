use once_cell::sync::Lazy;
use regex::Regex;

use super::normalized;

/// Date and time shapes; any single match classifies the text.
/// Compiled with ASCII-only `\d` and `\s`.
static DATE_TIME_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        // 2024-01-15T10:30:00Z, 2024-01-15T10:30:00+05:00
        r"^\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}(Z|[+-]\d{2}:\d{2})$",
        // 2024-01-15
        r"^\d{4}-\d{2}-\d{2}$",
        // 01/15/2024, 15-01-2024
        r"^\d{1,2}[/-]\d{1,2}[/-]\d{4}$",
        // 01/15/2024 10:30, 01-15-2024 10:30:00
        r"^\d{1,2}[/-]\d{1,2}[/-]\d{4}\s+\d{1,2}:\d{2}(:\d{2})?$",
        // 03/07/2025 09:15 AM
        r"^\d{1,2}[/-]\d{1,2}[/-]\d{4}\s+\d{1,2}:\d{2}(:\d{2})?\s+(AM|PM|am|pm)$",
        // 10:30:00, 10:30
        r"^\d{1,2}:\d{2}(:\d{2})?$",
        // 09:15 AM
        r"^\d{1,2}:\d{2}(:\d{2})?\s+(AM|PM|am|pm)$",
        // 2024-01-15 10:30:00
        r"^\d{4}-\d{2}-\d{2}\s+\d{1,2}:\d{2}:\d{2}$",
        // 2024-01-15 10:30:00 AM
        r"^\d{4}-\d{2}-\d{2}\s+\d{1,2}:\d{2}:\d{2}\s+(AM|PM|am|pm)$",
        // 15.01.2024, 15.01.2024 10:30
        r"^\d{1,2}\.\d{1,2}\.\d{4}(\s+\d{1,2}:\d{2}(:\d{2})?)?$",
        // 15.01.2024 10:30 AM
        r"^\d{1,2}\.\d{1,2}\.\d{4}\s+\d{1,2}:\d{2}(:\d{2})?\s+(AM|PM|am|pm)$",
        // 15 Jan 2024, 15 January 2024
        r"^\d{1,2}\s+[A-Za-z]{3,9}\s+\d{4}$",
        // 15 Jan 2024 10:30
        r"^\d{1,2}\s+[A-Za-z]{3,9}\s+\d{4}\s+\d{1,2}:\d{2}(:\d{2})?$",
        // 15 Jan 2024 10:30 AM
        r"^\d{1,2}\s+[A-Za-z]{3,9}\s+\d{4}\s+\d{1,2}:\d{2}(:\d{2})?\s+(AM|PM|am|pm)$",
        // Unix epoch in seconds or milliseconds
        r"^\d{10}$|^\d{13}$",
    ]
    .iter()
    .map(|pattern| Regex::new(&format!("(?-u){}", pattern)).unwrap())
    .collect()
});

/// Looks like a date, a time or an epoch timestamp
pub fn is_date_time(content: &[u8]) -> bool {
    normalized(content)
        .is_some_and(|text| DATE_TIME_PATTERNS.iter().any(|re| re.is_match(text)))
}
