//! Contains functions for escaping attribute values and character data.

use std::borrow::Cow;

use crate::chars::is_in_character_range;

const REPLACEMENT: &str = "\u{FFFD}";

/// Printable ASCII bytes which never need escaping in either mode.
///
/// Used to skip the per-char scan for the common all-ASCII case.
static ASCII_SAFE: [bool; 256] = {
    let mut table = [false; 256];
    let mut b = 0x20;
    while b < 0x7F {
        table[b] = !matches!(b as u8, b'"' | b'\'' | b'&' | b'<' | b'>');
        b += 1;
    }
    table
};

/// Escaping rules for a single character.
pub(crate) type Escaper = fn(char) -> Option<&'static str>;

/// Replacement for `c` inside an attribute value, if any.
pub(crate) fn attribute_escape(c: char) -> Option<&'static str> {
    match c {
        '\t' => Some("&#x9;"),
        '\n' => Some("&#xA;"),
        '\r' => Some("&#xD;"),
        _ => text_escape(c),
    }
}

/// Replacement for `c` inside character data, if any.
pub(crate) fn text_escape(c: char) -> Option<&'static str> {
    match c {
        '"' => Some("&#34;"),
        '\'' => Some("&#39;"),
        '&' => Some("&amp;"),
        '<' => Some("&lt;"),
        '>' => Some("&gt;"),
        '\t' | '\n' | '\r' => None,
        c if !is_in_character_range(c) => Some(REPLACEMENT),
        _ => None,
    }
}

/// Feeds `s` to `emit` in chunks, substituting every character that `escaper`
/// maps to a replacement.
///
/// Unescaped runs are passed through as borrowed slices of `s`, so nothing is
/// allocated here.
pub(crate) fn escape_with<E, F>(s: &str, escaper: Escaper, mut emit: F) -> Result<(), E>
where
    F: FnMut(&str) -> Result<(), E>,
{
    let start = s.bytes().position(|b| !ASCII_SAFE[b as usize]).unwrap_or(s.len());
    if start == s.len() {
        return emit(s);
    }

    let mut last = 0;
    for (i, c) in s[start..].char_indices() {
        if let Some(replacement) = escaper(c) {
            let i = start + i;
            if last < i {
                emit(&s[last..i])?;
            }
            emit(replacement)?;
            last = i + c.len_utf8();
        }
    }
    if last < s.len() {
        emit(&s[last..])?;
    }
    Ok(())
}

fn escape_str(s: &str, escaper: Escaper) -> Cow<'_, str> {
    let needs_escaping = s.bytes().any(|b| !ASCII_SAFE[b as usize]) && s.chars().any(|c| escaper(c).is_some());
    if !needs_escaping {
        return Cow::Borrowed(s);
    }
    let mut result = String::with_capacity(s.len() + s.len() / 4);
    let _ = escape_with::<(), _>(s, escaper, |chunk| {
        result.push_str(chunk);
        Ok(())
    });
    Cow::Owned(result)
}

/// Performs escaping of a string intended for an attribute value.
///
/// * `"` → `&#34;`
/// * `'` → `&#39;`
/// * `&` → `&amp;`
/// * `<` → `&lt;`
/// * `>` → `&gt;`
/// * tab, LF and CR → `&#x9;`, `&#xA;`, `&#xD;`
///
/// Characters outside of the XML character range are replaced with U+FFFD.
///
/// Does not perform allocations if the given string does not contain escapable characters.
pub fn escape_attribute(s: &str) -> Cow<'_, str> {
    escape_str(s, attribute_escape)
}

/// Performs escaping of a string intended for character data.
///
/// Same as [`escape_attribute`], but tab, LF and CR are left as is.
pub fn escape_text(s: &str) -> Cow<'_, str> {
    escape_str(s, text_escape)
}
