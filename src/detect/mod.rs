//! Content classification
//!
//! Each detector is an independent predicate over raw clipboard bytes. The
//! bytes must be valid UTF-8 and non-blank after trimming, otherwise every
//! detector answers `false`.

mod datetime;
mod filepath;
mod password;

use once_cell::sync::Lazy;
use regex::Regex;
use std::net::IpAddr;

pub use datetime::is_date_time;
pub use filepath::is_file_path;
pub use password::is_password;

static EMAIL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z0-9._%+\-]+@[a-zA-Z0-9.\-]+\.[a-zA-Z]{2,}$").unwrap());

static UUID: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}$")
        .unwrap()
});

const URL_SCHEMES: &[&str] = &[
    "http://", "https://", "ftp://", "ftps://", "ws://", "wss://", "file://", "mailto:", "tel:",
];

/// Trimmed text of `content`, or `None` for invalid UTF-8 and blank input
pub(crate) fn normalized(content: &[u8]) -> Option<&str> {
    let text = std::str::from_utf8(content).ok()?.trim();
    (!text.is_empty()).then_some(text)
}

/// Local part, `@`, domain with a TLD
pub fn is_email(content: &[u8]) -> bool {
    normalized(content).is_some_and(|text| EMAIL.is_match(text))
}

/// Starts with a known scheme (case-insensitive)
pub fn is_url(content: &[u8]) -> bool {
    normalized(content).is_some_and(|text| {
        let lower = text.to_lowercase();
        URL_SCHEMES.iter().any(|scheme| lower.starts_with(scheme))
    })
}

/// Valid IPv4 or IPv6 literal
pub fn is_ip(content: &[u8]) -> bool {
    normalized(content).is_some_and(|text| text.parse::<IpAddr>().is_ok())
}

/// Canonical 8-4-4-4-12 hex UUID
pub fn is_uuid(content: &[u8]) -> bool {
    normalized(content).is_some_and(|text| UUID.is_match(text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_rejects_invalid_and_blank() {
        let invalid = [0xffu8, 0xfe, b'a', b'@', b'b', b'.', b'c', b'o'];
        for detector in [is_email, is_url, is_ip, is_uuid, is_date_time, is_file_path] {
            assert!(!detector(&invalid));
            assert!(!detector(b"   \n\t "));
        }
    }

    #[rstest]
    #[case("user@example.com", true)]
    #[case("  first.last+tag@sub.domain.org\n", true)]
    #[case("user@localhost", false)]
    #[case("not an email", false)]
    fn test_email(#[case] input: &str, #[case] expected: bool) {
        assert_eq!(is_email(input.as_bytes()), expected);
    }

    #[rstest]
    #[case("https://example.com", true)]
    #[case("HTTP://EXAMPLE.COM", true)]
    #[case("mailto:someone@example.com", true)]
    #[case("tel:+123456", true)]
    #[case("wss://socket", true)]
    #[case("gopher://old", false)]
    #[case("example.com", false)]
    fn test_url(#[case] input: &str, #[case] expected: bool) {
        assert_eq!(is_url(input.as_bytes()), expected);
    }

    #[rstest]
    #[case("192.168.1.1", true)]
    #[case("::1", true)]
    #[case("2001:db8::ff00:42:8329", true)]
    #[case("256.1.1.1", false)]
    #[case("1.2.3", false)]
    fn test_ip(#[case] input: &str, #[case] expected: bool) {
        assert_eq!(is_ip(input.as_bytes()), expected);
    }

    #[rstest]
    #[case("550e8400-e29b-41d4-a716-446655440000", true)]
    #[case("550E8400-E29B-41D4-A716-446655440000", true)]
    #[case("550e8400e29b41d4a716446655440000", false)]
    #[case("550e8400-e29b-41d4-a716-44665544000g", false)]
    fn test_uuid(#[case] input: &str, #[case] expected: bool) {
        assert_eq!(is_uuid(input.as_bytes()), expected);
    }
}
