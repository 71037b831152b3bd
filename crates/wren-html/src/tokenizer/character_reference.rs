//! Character reference decoding.
//!
//! [§ 13.2.5.72 Character reference state](https://html.spec.whatwg.org/multipage/parsing.html#character-reference-state)
//!
//! The matcher works on a lookahead slice that starts right after the `&`.
//! It never consumes anything itself: it reports how many bytes belong to
//! the reference, or that the slice ended before a decision could be made.
//!
//! Named references follow the legacy probing rule:
//! - at most [`MAX_ENTITY_LENGTH`] alphanumeric characters are examined;
//! - outside attribute values, every prefix of that run that names an
//!   entity below U+0100 is remembered, so `&notit;` yields `¬it;`;
//! - the whole run is accepted outside attribute values, or when its code
//!   point is below U+0100, or when a `;` follows;
//! - anything else leaves the `&` as literal text.

use super::named_character_references::lookup_entity;

/// Size of the probing buffer, including the `#` of numeric references.
pub const MAX_ENTITY_LENGTH: usize = 9;

/// Result of matching a character reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityMatch {
    /// The slice ended before the reference could be decided.
    Incomplete,
    /// Not a reference; the `&` is literal text.
    NotAnEntity,
    /// A decoded character and the number of bytes after the `&` that
    /// belong to it (including a consumed `;`).
    Decoded {
        /// The decoded scalar.
        ch: char,
        /// Bytes of input covered by the reference.
        len: usize,
    },
}

/// Match the character reference at the start of `input` (the text after
/// the `&`).
///
/// `in_attribute` selects the stricter attribute-value rules. `at_end`
/// states that no more input will arrive, so an unterminated reference is
/// decided with what is available.
#[must_use]
pub fn match_entity(input: &str, in_attribute: bool, at_end: bool) -> EntityMatch {
    match input.as_bytes().first() {
        None if at_end => EntityMatch::NotAnEntity,
        None => EntityMatch::Incomplete,
        Some(b'#') => match_numeric(input, at_end),
        Some(b) if b.is_ascii_alphanumeric() => match_named(input, in_attribute, at_end),
        Some(_) => EntityMatch::NotAnEntity,
    }
}

/// `&#DDD;` and `&#xHHH;`.
fn match_numeric(input: &str, at_end: bool) -> EntityMatch {
    let bytes = input.as_bytes();
    let (radix, start, max_digits) = match bytes.get(1) {
        None if at_end => return EntityMatch::NotAnEntity,
        None => return EntityMatch::Incomplete,
        Some(b'x' | b'X') => (16, 2, 8),
        Some(_) => (10, 1, MAX_ENTITY_LENGTH - 1),
    };

    let digits = bytes
        .get(start..)
        .unwrap_or_default()
        .iter()
        .take(max_digits)
        .take_while(|b| char::from(**b).is_digit(radix))
        .count();
    let end = start + digits;

    // The character after the digits decides whether a `;` is consumed.
    if end >= bytes.len() && !at_end {
        return EntityMatch::Incomplete;
    }
    if digits == 0 {
        return EntityMatch::NotAnEntity;
    }

    let value = u32::from_str_radix(&input[start..end], radix).unwrap_or(0);
    let ch = legal_char(windows_1252(value));
    let len = if bytes.get(end) == Some(&b';') {
        end + 1
    } else {
        end
    };
    EntityMatch::Decoded { ch, len }
}

/// `&name;` with the probing rules described in the module docs.
fn match_named(input: &str, in_attribute: bool, at_end: bool) -> EntityMatch {
    let bytes = input.as_bytes();
    let run = bytes
        .iter()
        .take(MAX_ENTITY_LENGTH)
        .take_while(|b| b.is_ascii_alphanumeric())
        .count();
    if run >= bytes.len() && !at_end {
        return EntityMatch::Incomplete;
    }
    let name = &input[..run];

    let followed_by_semicolon = bytes.get(run) == Some(&b';');
    if run > 1
        && let Some(ch) = lookup_entity(name)
        && (!in_attribute || u32::from(ch) < 0x100 || followed_by_semicolon)
    {
        let len = if followed_by_semicolon { run + 1 } else { run };
        return EntityMatch::Decoded { ch, len };
    }

    if !in_attribute {
        // Longest legacy prefix wins.
        for len in (1..run).rev() {
            if let Some(ch) = lookup_entity(&name[..len])
                && u32::from(ch) < 0x100
            {
                return EntityMatch::Decoded { ch, len };
            }
        }
    }

    EntityMatch::NotAnEntity
}

/// Decode every reference in a complete string, using the rules for
/// character data. Used for `<textarea>` and `<title>` content.
#[must_use]
pub fn decode_entities(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        rest = &rest[amp + 1..];
        match match_entity(rest, false, true) {
            EntityMatch::Decoded { ch, len } => {
                out.push(ch);
                rest = &rest[len..];
            }
            EntityMatch::NotAnEntity | EntityMatch::Incomplete => out.push('&'),
        }
    }
    out.push_str(rest);
    out
}

/// [§ 13.2.5.80 Numeric character reference end state](https://html.spec.whatwg.org/multipage/parsing.html#numeric-character-reference-end-state)
///
/// "If the number is one of the numbers in the first column of the following
/// table, then find the row with that number in the first column, and set the
/// character reference code to the number in the second column of that row."
///
/// Values 0x80-0x9F are read as Windows-1252 bytes.
#[must_use]
pub const fn windows_1252(value: u32) -> u32 {
    match value {
        0x80 => 0x20AC,
        0x82 => 0x201A,
        0x83 => 0x0192,
        0x84 => 0x201E,
        0x85 => 0x2026,
        0x86 => 0x2020,
        0x87 => 0x2021,
        0x88 => 0x02C6,
        0x89 => 0x2030,
        0x8A => 0x0160,
        0x8B => 0x2039,
        0x8C => 0x0152,
        0x8E => 0x017D,
        0x91 => 0x2018,
        0x92 => 0x2019,
        0x93 => 0x201C,
        0x94 => 0x201D,
        0x95 => 0x2022,
        0x96 => 0x2013,
        0x97 => 0x2014,
        0x98 => 0x02DC,
        0x99 => 0x2122,
        0x9A => 0x0161,
        0x9B => 0x203A,
        0x9C => 0x0153,
        0x9E => 0x017E,
        0x9F => 0x0178,
        other => other,
    }
}

/// NUL, surrogates and values beyond U+10FFFF become U+FFFD.
#[must_use]
pub fn legal_char(value: u32) -> char {
    if value == 0 {
        return char::REPLACEMENT_CHARACTER;
    }
    char::from_u32(value).unwrap_or(char::REPLACEMENT_CHARACTER)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_references() {
        assert_eq!(
            match_entity("#65;x", false, false),
            EntityMatch::Decoded { ch: 'A', len: 4 }
        );
        assert_eq!(
            match_entity("#x41 ", false, false),
            EntityMatch::Decoded { ch: 'A', len: 4 }
        );
        assert_eq!(
            match_entity("#150;", false, true),
            EntityMatch::Decoded {
                ch: '\u{2013}',
                len: 5
            }
        );
        assert_eq!(
            match_entity("#xD800;", false, true),
            EntityMatch::Decoded {
                ch: char::REPLACEMENT_CHARACTER,
                len: 7
            }
        );
        assert_eq!(
            match_entity("#0;", false, true),
            EntityMatch::Decoded {
                ch: char::REPLACEMENT_CHARACTER,
                len: 3
            }
        );
        assert_eq!(match_entity("#x;", false, true), EntityMatch::NotAnEntity);
        assert_eq!(match_entity("#12", false, false), EntityMatch::Incomplete);
    }

    #[test]
    fn test_named_prefix_probing() {
        assert_eq!(
            match_entity("notit;", false, true),
            EntityMatch::Decoded { ch: '¬', len: 3 }
        );
        assert_eq!(
            match_entity("notin;", false, true),
            EntityMatch::Decoded { ch: '∉', len: 6 }
        );
        assert_eq!(match_entity("foo;", false, true), EntityMatch::NotAnEntity);
        assert_eq!(match_entity("am", false, false), EntityMatch::Incomplete);
    }

    #[test]
    fn test_attribute_rules() {
        // Above U+00FF without `;` stays literal inside attributes.
        assert_eq!(match_entity("hellip ", true, true), EntityMatch::NotAnEntity);
        assert_eq!(
            match_entity("hellip ", false, true),
            EntityMatch::Decoded {
                ch: '\u{2026}',
                len: 6
            }
        );
        assert_eq!(
            match_entity("copy=2", true, true),
            EntityMatch::Decoded { ch: '©', len: 4 }
        );
        // No prefix probing inside attributes.
        assert_eq!(match_entity("ampx=1", true, true), EntityMatch::NotAnEntity);
    }

    #[test]
    fn test_decode_entities() {
        assert_eq!(decode_entities("a &lt; b &amp c &bogus;"), "a < b & c &bogus;");
        assert_eq!(decode_entities("&#169;&"), "©&");
    }
}
