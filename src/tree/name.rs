//! XML 1.0 `Name` production (§2.3).
//!
//! The checks are `const` so that tag and attribute names written as literals
//! can be rejected at compile time.

/// Returns `true` if `c` is a `NameStartChar` per XML 1.0 §2.3 `[4]`.
#[must_use]
pub const fn is_name_start_char(c: char) -> bool {
    matches!(c,
        ':' | 'A'..='Z' | '_' | 'a'..='z' |
        '\u{C0}'..='\u{D6}' | '\u{D8}'..='\u{F6}' | '\u{F8}'..='\u{2FF}' |
        '\u{370}'..='\u{37D}' | '\u{37F}'..='\u{1FFF}' |
        '\u{200C}'..='\u{200D}' | '\u{2070}'..='\u{218F}' |
        '\u{2C00}'..='\u{2FEF}' | '\u{3001}'..='\u{D7FF}' |
        '\u{F900}'..='\u{FDCF}' | '\u{FDF0}'..='\u{FFFD}' |
        '\u{10000}'..='\u{EFFFF}'
    )
}

/// Returns `true` if `c` is a `NameChar` per XML 1.0 §2.3 `[4a]`.
#[must_use]
pub const fn is_name_char(c: char) -> bool {
    is_name_start_char(c)
        || matches!(c,
            '-' | '.' | '0'..='9' | '\u{B7}' |
            '\u{300}'..='\u{36F}' | '\u{203F}'..='\u{2040}'
        )
}

/// Returns `true` if `name` matches the XML `Name` production.
///
/// ```
/// use lazy_xml_model::tree::is_valid_name;
///
/// assert!(is_valid_name("foundingyear"));
/// assert!(is_valid_name("xml:lang"));
/// assert!(!is_valid_name("founding year"));
/// assert!(!is_valid_name("1st"));
/// ```
#[must_use]
pub const fn is_valid_name(name: &str) -> bool {
    let bytes = name.as_bytes();
    if bytes.is_empty() {
        return false;
    }
    let mut i = 0;
    while i < bytes.len() {
        let (c, width) = decode_char(bytes, i);
        let ok = if i == 0 {
            is_name_start_char(c)
        } else {
            is_name_char(c)
        };
        if !ok {
            return false;
        }
        i += width;
    }
    true
}

/// Decodes the UTF-8 sequence starting at `i`. `bytes` comes from a `&str`,
/// so the sequence is complete and well-formed.
#[allow(clippy::cast_lossless)]
const fn decode_char(bytes: &[u8], i: usize) -> (char, usize) {
    let b0 = bytes[i] as u32;
    let (code, width) = if b0 < 0x80 {
        (b0, 1)
    } else if b0 < 0xE0 {
        (((b0 & 0x1F) << 6) | (bytes[i + 1] as u32 & 0x3F), 2)
    } else if b0 < 0xF0 {
        (
            ((b0 & 0x0F) << 12) | ((bytes[i + 1] as u32 & 0x3F) << 6) | (bytes[i + 2] as u32 & 0x3F),
            3,
        )
    } else {
        (
            ((b0 & 0x07) << 18)
                | ((bytes[i + 1] as u32 & 0x3F) << 12)
                | ((bytes[i + 2] as u32 & 0x3F) << 6)
                | (bytes[i + 3] as u32 & 0x3F),
            4,
        )
    };
    match char::from_u32(code) {
        Some(c) => (c, width),
        None => ('\u{FFFD}', width),
    }
}
