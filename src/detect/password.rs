use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use super::{is_date_time, is_email, is_file_path, is_ip, is_url, is_uuid, normalized};

const MIN_PASSWORD_LENGTH: usize = 8;
const MAX_PASSWORD_LENGTH: usize = 50;
const MIN_CHAR_CLASSES: usize = 3;

/// Letters, marks, numbers, punctuation, symbols and the ASCII space
static PRINTABLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[\p{L}\p{M}\p{N}\p{P}\p{S} ]*$").unwrap());

static CHAR_CLASSES: Lazy<[Regex; 4]> = Lazy::new(|| {
    [
        Regex::new(r"\p{Ll}").unwrap(),
        Regex::new(r"\p{Lu}").unwrap(),
        Regex::new(r"\p{Nd}").unwrap(),
        Regex::new(r"[\p{P}\p{S}]").unwrap(),
    ]
});

/// Content shapes that are never treated as passwords
const NOT_PASSWORD_SHAPES: &[fn(&[u8]) -> bool] =
    &[is_date_time, is_email, is_url, is_ip, is_uuid, is_file_path];

/// Heuristic: a single token of 8-50 printable characters, mixing at least
/// three of lowercase, uppercase, digits and symbols, that isn't some other
/// recognisable kind of content and isn't excluded by the user.
pub fn is_password(content: &[u8], ignore_patterns: &[String]) -> bool {
    let Some(text) = normalized(content) else {
        return false;
    };

    let length = text.chars().count();
    (MIN_PASSWORD_LENGTH..=MAX_PASSWORD_LENGTH).contains(&length)
        && !NOT_PASSWORD_SHAPES.iter().any(|shape| shape(content))
        && !text.contains([' ', '\n', '\r'])
        && PRINTABLE.is_match(text)
        && !matches_ignore_pattern(text, ignore_patterns)
        && char_class_count(text) >= MIN_CHAR_CLASSES
}

fn char_class_count(text: &str) -> usize {
    CHAR_CLASSES.iter().filter(|class| class.is_match(text)).count()
}

/// Malformed patterns are skipped
fn matches_ignore_pattern(text: &str, patterns: &[String]) -> bool {
    patterns.iter().any(|pattern| match Regex::new(pattern) {
        Ok(re) => re.is_match(text),
        Err(e) => {
            debug!(pattern = %pattern, error = %e, "Skipping invalid ignore pattern");
            false
        }
    })
}
