//! Filename sanitization and archive entry naming

use std::collections::HashSet;

/// Placeholder used when a name sanitizes from empty input
pub const UNTITLED: &str = "untitled";

/// Maximum length of a sanitized name before truncation, in characters
const MAX_NAME_CHARS: usize = 100;

/// Characters stripped from filenames entirely
const ILLEGAL_CHARS: &[char] = &['\\', '/', '*', '?', ':', '"', '<', '>', '|'];

/// Sanitize an arbitrary string into a safe filename component.
///
/// Runs of whitespace (including newlines) collapse to a single underscore,
/// the characters `\ / * ? : " < > |` are stripped, and names longer than 100
/// characters are truncated to 100 plus a `..` marker. Empty input yields
/// [`UNTITLED`].
pub fn sanitize_filename(name: &str) -> String {
    if name.is_empty() {
        return UNTITLED.to_string();
    }

    let mut sanitized = String::with_capacity(name.len());
    let mut chars = name.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch.is_whitespace() {
            sanitized.push('_');
            while chars.peek().is_some_and(|c| c.is_whitespace()) {
                chars.next();
            }
        } else if !ILLEGAL_CHARS.contains(&ch) {
            sanitized.push(ch);
        }
    }

    if sanitized.chars().count() > MAX_NAME_CHARS {
        let mut truncated: String = sanitized.chars().take(MAX_NAME_CHARS).collect();
        truncated.push_str("..");
        truncated
    } else {
        sanitized
    }
}

/// Build the suggested filename for one fetched item:
/// `<sanitized-owner>_<sanitized-title>.<ext>`.
pub fn entry_filename(owner: &str, title: &str, extension: &str) -> String {
    format!(
        "{}_{}.{}",
        sanitize_filename(owner),
        sanitize_filename(title),
        extension.trim_start_matches('.')
    )
}

/// Resolve an archive entry name against the names already written.
///
/// Returns the candidate unchanged when free; otherwise appends ` (N)` before
/// the extension, trying N = 1, 2, … until an unused name is found.
pub fn unique_entry_name(taken: &HashSet<String>, candidate: &str) -> String {
    if !taken.contains(candidate) {
        return candidate.to_string();
    }

    let (stem, extension) = match candidate.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => (stem, Some(ext)),
        _ => (candidate, None),
    };

    let mut attempt = 1u32;
    loop {
        let renamed = match extension {
            Some(ext) => format!("{} ({}).{}", stem, attempt, ext),
            None => format!("{} ({})", stem, attempt),
        };
        if !taken.contains(&renamed) {
            return renamed;
        }
        attempt += 1;
    }
}
