use super::normalized;

const MIN_PATH_COMPONENTS: usize = 2;

/// Looks like a Unix or Windows file system path
pub fn is_file_path(content: &[u8]) -> bool {
    let Some(text) = normalized(content) else {
        return false;
    };

    if matches!(lexical_clean(text).as_str(), "." | "..") {
        return false;
    }

    text.starts_with('/')
        || text.starts_with("./")
        || text.starts_with(".\\")
        || text.starts_with("../")
        || text.starts_with("..\\")
        || is_windows_drive(text)
        || text.starts_with("\\\\")
        || has_path_separators(text)
}

/// `C:` alone or followed by a separator
fn is_windows_drive(text: &str) -> bool {
    let bytes = text.as_bytes();
    if bytes.len() < 2 || bytes[1] != b':' || !bytes[0].is_ascii_alphabetic() {
        return false;
    }

    bytes.len() == 2 || bytes[2] == b'/' || bytes[2] == b'\\'
}

fn has_path_separators(text: &str) -> bool {
    let has_unix = text.contains('/');
    let has_windows = text.contains('\\');
    if !has_unix && !has_windows {
        return false;
    }

    let components = text
        .split(['/', '\\'])
        .filter(|part| !part.is_empty())
        .count();
    if components >= MIN_PATH_COMPONENTS {
        return true;
    }

    (has_unix && text.starts_with('/')) || (has_windows && text.starts_with('\\'))
}

/// Resolve `.`, `..` and repeated slashes without touching the file system
fn lexical_clean(path: &str) -> String {
    let rooted = path.starts_with('/');
    let mut parts: Vec<&str> = Vec::new();

    for part in path.split('/') {
        match part {
            "" | "." => {}
            ".." => match parts.last() {
                Some(&last) if last != ".." => {
                    parts.pop();
                }
                _ if !rooted => parts.push(".."),
                _ => {}
            },
            other => parts.push(other),
        }
    }

    let joined = parts.join("/");
    match (rooted, joined.is_empty()) {
        (true, _) => format!("/{}", joined),
        (false, true) => ".".to_string(),
        (false, false) => joined,
    }
}
