//! Line-level lexing shared by the manifest and dependency parsers.

use std::borrow::Cow;

/// Split a scalar from its trailing comment.
///
/// A quote only opens a quoted region when it is the first character of
/// the scalar. Otherwise a comment starts at a `#` that opens the value or
/// follows whitespace. The returned value is right-trimmed.
pub(crate) fn split_comment(text: &str) -> (&str, Option<&str>) {
    let body_start = quoted_len(text).unwrap_or(0);
    let mut prev_ws = body_start == 0;
    for (idx, c) in text[body_start..].char_indices() {
        if c == '#' && prev_ws {
            let at = body_start + idx;
            return (text[..at].trim_end(), Some(&text[at + 1..]));
        }
        prev_ws = c.is_whitespace();
    }
    (text.trim_end(), None)
}

/// Byte length of a leading quoted scalar, closing quote included.
fn quoted_len(text: &str) -> Option<usize> {
    let quote = text.chars().next().filter(|c| *c == '"' || *c == '\'')?;
    let mut chars = text.char_indices().skip(1).peekable();
    while let Some((idx, c)) = chars.next() {
        match c {
            '\\' if quote == '"' => {
                chars.next();
            }
            '\'' if quote == '\'' && chars.peek().is_some_and(|(_, n)| *n == '\'') => {
                chars.next();
            }
            c if c == quote => return Some(idx + 1),
            _ => {}
        }
    }
    None
}

/// Strip one level of quoting from a scalar that is entirely quoted.
///
/// Single-quoted scalars unescape `''`; double-quoted scalars unescape
/// `\"` and `\\`.
pub(crate) fn unquote(text: &str) -> Cow<'_, str> {
    if quoted_len(text) != Some(text.len()) {
        return Cow::Borrowed(text);
    }
    let inner = &text[1..text.len() - 1];
    if text.starts_with('\'') {
        if inner.contains("''") {
            return Cow::Owned(inner.replace("''", "'"));
        }
    } else if inner.contains('\\') {
        return Cow::Owned(inner.replace("\\\"", "\"").replace("\\\\", "\\"));
    }
    Cow::Borrowed(inner)
}

/// Normalize comment text: trimmed, `None` when blank.
pub(crate) fn comment_text(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_owned)
}

/// Quote a scalar for output when it would not survive re-reading bare.
///
/// Quoted output is always single-quoted, so the only escape is `''`.
pub(crate) fn quote_if_needed(value: &str) -> String {
    let needs_quotes = value.is_empty()
        || value != value.trim()
        || value.contains(": ")
        || value.ends_with(':')
        || has_comment_marker(value)
        || value.starts_with(['#', '"', '\'', '-', '[', '{', '&', '*', '!', '|', '>', '%', '@', '`']);
    if needs_quotes {
        format!("'{}'", value.replace('\'', "''"))
    } else {
        value.to_owned()
    }
}

fn has_comment_marker(value: &str) -> bool {
    let mut prev_ws = false;
    value.chars().any(|c| {
        let hit = c == '#' && prev_ws;
        prev_ws = c.is_whitespace();
        hit
    })
}
