//! Character classes used to validate names, content and identifiers.

use crate::writer::error::ContentError;

/// Checks whether the given character is a name start character (`NameStartChar`)
/// as is defined by XML 1.0 specification, [section 2.3][1].
///
/// [1]: https://www.w3.org/TR/xml/#NT-NameStartChar
pub fn is_name_start_char(c: char) -> bool {
    matches!(c,
        ':'
        | 'A'..='Z'
        | '_'
        | 'a'..='z'
        | '\u{C0}'..='\u{D6}'
        | '\u{D8}'..='\u{F6}'
        | '\u{F8}'..='\u{2FF}'
        | '\u{370}'..='\u{37D}'
        | '\u{37F}'..='\u{1FFF}'
        | '\u{200C}'..='\u{200D}'
        | '\u{2070}'..='\u{218F}'
        | '\u{2C00}'..='\u{2FEF}'
        | '\u{3001}'..='\u{D7FF}'
        | '\u{F900}'..='\u{FDCF}'
        | '\u{FDF0}'..='\u{FFFD}'
        | '\u{10000}'..='\u{EFFFF}')
}

/// Checks whether the given character is a name character (`NameChar`)
/// as is defined by XML 1.0 specification, [section 2.3][1].
///
/// [1]: https://www.w3.org/TR/xml/#NT-NameChar
pub fn is_name_char(c: char) -> bool {
    match c {
        _ if is_name_start_char(c) => true,
        '-' | '.' | '0'..='9' | '\u{B7}' | '\u{300}'..='\u{36F}' | '\u{203F}'..='\u{2040}' => true,
        _ => false,
    }
}

/// Checks whether the given character matches the `Char` production of
/// [section 2.2][1].
///
/// [1]: https://www.w3.org/TR/xml/#NT-Char
#[inline]
pub fn is_in_character_range(c: char) -> bool {
    matches!(c,
        '\u{9}'
        | '\u{A}'
        | '\u{D}'
        | '\u{20}'..='\u{D7FF}'
        | '\u{E000}'..='\u{FFFD}'
        | '\u{10000}'..='\u{10FFFF}')
}

/// Checks whether the given character is one of the control characters or
/// permanently undefined code points that section 2.2 asks document authors
/// to avoid.
pub fn is_discouraged_char(c: char) -> bool {
    let cp = c as u32;
    matches!(cp, 0x7F..=0x84 | 0x86..=0x9F | 0xFDD0..=0xFDEF)
        // U+xFFFE and U+xFFFF in every supplementary plane
        || (cp >= 0x1_0000 && cp & 0xFFFE == 0xFFFE)
}

/// Ensures a string satisfies the `Name` production.
///
/// An empty string is accepted; callers which require a name check for
/// emptiness separately.
pub fn check_name(name: &str) -> Result<(), ContentError> {
    let mut chars = name.char_indices();
    if let Some((_, first)) = chars.next() {
        if !is_name_start_char(first) {
            return Err(ContentError::InvalidName { position: 0, found: first });
        }
    }
    for (position, c) in chars {
        if !is_name_char(c) {
            return Err(ContentError::InvalidName { position, found: c });
        }
    }
    Ok(())
}

/// Ensures `prefix:name` satisfies the `Name` production, reporting positions
/// relative to the joined form. With an empty prefix only `name` is checked.
pub fn check_qualified_name(prefix: &str, name: &str) -> Result<(), ContentError> {
    if prefix.is_empty() {
        return check_name(name);
    }
    check_name(prefix)?;
    for (position, c) in name.char_indices() {
        if !is_name_char(c) {
            return Err(ContentError::InvalidName { position: prefix.len() + 1 + position, found: c });
        }
    }
    Ok(())
}

/// Ensures a string only contains characters which may appear in character
/// data. With `strict` set, the discouraged ranges are rejected too.
pub fn check_chars(chars: &str, strict: bool) -> Result<(), ContentError> {
    for (position, c) in chars.char_indices() {
        if !is_in_character_range(c) || (strict && is_discouraged_char(c)) {
            return Err(ContentError::InvalidChars { position, found: c });
        }
    }
    Ok(())
}

/// Validates a string according to the `PubidLiteral` production.
pub fn check_pub_id(pub_id: &str) -> Result<(), ContentError> {
    for (position, c) in pub_id.char_indices() {
        let valid = matches!(c,
            ' ' | '\r' | '\n' | '\''
            | '-' | '(' | ')' | '+' | ',' | '.' | '/' | ':' | '=' | '?' | ';' | '!'
            | '*' | '#' | '@' | '$' | '_' | '%'
            | 'A'..='Z' | 'a'..='z' | '0'..='9');
        if !valid {
            return Err(ContentError::InvalidPubId { position, found: c });
        }
    }
    Ok(())
}

/// Validates an encoding name against `[A-Za-z] ([A-Za-z0-9._] | '-')*`.
pub fn check_encoding(encoding: &str) -> Result<(), ContentError> {
    for (position, c) in encoding.char_indices() {
        let valid = c.is_ascii_alphabetic()
            || (position > 0 && (c.is_ascii_digit() || matches!(c, '-' | '.' | '_')));
        if !valid {
            return Err(ContentError::InvalidEncoding { position, found: c });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_name() {
        let cases = [
            ("", true),
            ("a", true),
            ("-", false),
            ("a-", true),
            ("a-a", true),
            ("the-quick-brown-fox-jumped-over-the-lazy-dog", true),
            (":", true),
            ("!", false),
            ("\u{00df}", true),
            ("1abc", false),
            ("a\u{10000}", true),
        ];
        for (name, valid) in cases.iter() {
            assert_eq!(check_name(name).is_ok(), *valid, "{:?}", name);
        }
    }

    #[test]
    fn test_check_name_reports_position() {
        assert_eq!(
            check_name("ab$c"),
            Err(ContentError::InvalidName { position: 2, found: '$' })
        );
    }

    #[test]
    fn test_check_qualified_name() {
        assert!(check_qualified_name("", "foo").is_ok());
        assert!(check_qualified_name("yep", "1foo").is_ok());
        assert!(check_qualified_name("", "1foo").is_err());
        assert_eq!(
            check_qualified_name("1yep", "foo"),
            Err(ContentError::InvalidName { position: 0, found: '1' })
        );
        assert_eq!(
            check_qualified_name("ns", "a b"),
            Err(ContentError::InvalidName { position: 4, found: ' ' })
        );
    }

    #[test]
    fn test_character_range() {
        for &c in &['\u{0}', '\u{8}', '\u{B}', '\u{1F}', '\u{FFFE}', '\u{FFFF}'] {
            assert!(!is_in_character_range(c), "{:?}", c);
        }
        for &c in &['\t', '\n', '\r', ' ', '\u{D7FF}', '\u{E000}', '\u{10FFFF}'] {
            assert!(is_in_character_range(c), "{:?}", c);
        }
    }

    #[test]
    fn test_check_chars_strict() {
        assert!(check_chars("plain text\twith tabs\n", true).is_ok());
        assert!(check_chars("a\u{0}b", false).is_err());

        for &c in &['\u{7F}', '\u{86}', '\u{FDD0}', '\u{1FFFE}', '\u{10FFFF}'] {
            let s = c.to_string();
            assert!(check_chars(&s, false).is_ok(), "{:?}", c);
            assert_eq!(
                check_chars(&s, true),
                Err(ContentError::InvalidChars { position: 0, found: c })
            );
        }
        assert!(check_chars("\u{85}", true).is_ok());
    }

    #[test]
    fn test_check_pub_id() {
        assert!(check_pub_id("-//W3C//DTD XHTML 1.0 Strict//EN").is_ok());
        assert_eq!(
            check_pub_id("a\"b"),
            Err(ContentError::InvalidPubId { position: 1, found: '"' })
        );
    }

    #[test]
    fn test_check_encoding() {
        assert!(check_encoding("UTF-8").is_ok());
        assert!(check_encoding("windows-1252").is_ok());
        assert!(check_encoding("ISO_8859.1").is_ok());
        assert!(check_encoding("8bit").is_err());
        assert!(check_encoding("utf 8").is_err());
    }
}
