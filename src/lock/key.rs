//! Composite lock keys
//!
//! Parts are trimmed and escaped before joining, so that `["a", "b|c"]` and
//! `["a", "b", "c"]` produce different strings. Only the hash may collide.

/// Separator between key parts
pub const KEY_SEPARATOR: char = '|';

const KEY_ESCAPE: char = '\\';

/// Trim a key part and backslash-escape the separator and the escape character
pub fn escape_part(part: &str) -> String {
    let part = part.trim();
    let mut escaped = String::with_capacity(part.len());

    for c in part.chars() {
        if c == KEY_SEPARATOR || c == KEY_ESCAPE {
            escaped.push(KEY_ESCAPE);
        }
        escaped.push(c);
    }

    escaped
}

/// Join escaped parts with [`KEY_SEPARATOR`]
pub fn composite_key<I, S>(parts: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut key = String::new();

    for (i, part) in parts.into_iter().enumerate() {
        if i > 0 {
            key.push(KEY_SEPARATOR);
        }
        key.push_str(&escape_part(part.as_ref()));
    }

    key
}
