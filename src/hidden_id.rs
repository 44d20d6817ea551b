//! Invisible entry ids embedded in display text
//!
//! Rofi hands the selected row's visible text back to the script. Rows with
//! an icon carry their id as zero-width characters so the selection can be
//! mapped back to a database row: a ZERO WIDTH SPACE, one variation selector
//! per decimal digit (U+FE00 + digit), and a closing ZERO WIDTH SPACE.
//!
//! The code points are part of the interface with rows rofi may still have
//! cached, so they must never change.

use thiserror::Error;

const DELIMITER: char = '\u{200B}';
const DIGIT_BASE: u32 = 0xFE00;
const DIGIT_LAST: u32 = DIGIT_BASE + 9;

/// Selection could not be resolved to an entry id
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SelectionError {
    #[error("selection carries no entry id and ROFI_INFO is not set")]
    MissingId,
}

/// Encode `id` as an invisible character sequence
pub fn encode_hidden(id: i64) -> String {
    let mut encoded = String::new();
    encoded.push(DELIMITER);
    encoded.extend(
        id.to_string()
            .chars()
            .filter_map(|c| c.to_digit(10))
            .filter_map(|digit| char::from_u32(DIGIT_BASE + digit)),
    );
    encoded.push(DELIMITER);
    encoded
}

/// Recover an id from the first delimited sequence in `text`
pub fn decode_hidden(text: &str) -> Option<i64> {
    let (_, rest) = text.split_once(DELIMITER)?;
    let (encoded, _) = rest.split_once(DELIMITER)?;

    let digits: String = encoded
        .chars()
        .map(u32::from)
        .filter(|code| (DIGIT_BASE..=DIGIT_LAST).contains(code))
        .filter_map(|code| char::from_digit(code - DIGIT_BASE, 10))
        .collect();

    digits.parse::<i64>().ok().filter(|id| *id > 0)
}

/// Resolve the entry id of a launcher selection
///
/// A positive id passed out-of-band (rofi's `ROFI_INFO`) wins over the
/// hidden encoding in the selected text.
pub fn extract_id(selection: &str, side_channel: Option<&str>) -> Result<i64, SelectionError> {
    side_channel
        .and_then(|info| info.trim().parse::<i64>().ok())
        .filter(|id| *id > 0)
        .or_else(|| decode_hidden(selection))
        .ok_or(SelectionError::MissingId)
}
