//! Byte-level input decoding.
//!
//! Documents handed over as raw bytes are decoded to UTF-8 before they reach
//! the parser. The encoding is taken from the byte order mark when there is
//! one, otherwise from the `encoding=` pseudo-attribute of the XML
//! declaration, otherwise UTF-8 is assumed. Conversion goes through
//! `encoding_rs`.

use thiserror::Error as ThisError;

/// Decoding failure for a byte input.
#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
#[error("encoding error: {message}")]
pub struct EncodingError {
    /// A human-readable description of the failure.
    pub message: String,
}

impl EncodingError {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Inspects the byte order mark.
///
/// Returns the IANA name of the encoding it announces and the number of BOM
/// bytes to skip; without a BOM the result is `("UTF-8", 0)`.
///
/// ```
/// use lazy_xml_model::encoding::detect_bom;
///
/// assert_eq!(detect_bom(b"\xEF\xBB\xBF<a/>"), ("UTF-8", 3));
/// assert_eq!(detect_bom(b"\xFF\xFE<\x00"), ("UTF-16LE", 2));
/// assert_eq!(detect_bom(b"<a/>"), ("UTF-8", 0));
/// ```
#[must_use]
pub fn detect_bom(bytes: &[u8]) -> (&'static str, usize) {
    match bytes {
        [0xEF, 0xBB, 0xBF, ..] => ("UTF-8", 3),
        [0xFE, 0xFF, ..] => ("UTF-16BE", 2),
        [0xFF, 0xFE, ..] => ("UTF-16LE", 2),
        _ => ("UTF-8", 0),
    }
}

/// Converts `bytes` from the encoding labelled `label` into a `String`.
///
/// # Errors
///
/// Returns `EncodingError` for an unknown label or malformed input.
pub fn transcode(bytes: &[u8], label: &str) -> Result<String, EncodingError> {
    let encoding = encoding_rs::Encoding::for_label(label.as_bytes())
        .ok_or_else(|| EncodingError::new(format!("unsupported encoding: {label}")))?;
    let (text, had_errors) = encoding.decode_without_bom_handling(bytes);
    if had_errors {
        return Err(EncodingError::new(format!(
            "malformed byte sequence for encoding {label}"
        )));
    }
    Ok(text.into_owned())
}

/// Decodes an XML byte stream to UTF-8.
///
/// # Errors
///
/// Returns `EncodingError` when the detected or declared encoding is unknown
/// or the bytes are not valid in it.
///
/// ```
/// use lazy_xml_model::encoding::decode_to_utf8;
///
/// let latin1 = b"<?xml version=\"1.0\" encoding=\"ISO-8859-1\"?><a n=\"\xE9\"/>";
/// assert!(decode_to_utf8(latin1).unwrap().contains("n=\"\u{e9}\""));
/// ```
pub fn decode_to_utf8(bytes: &[u8]) -> Result<String, EncodingError> {
    let (bom_encoding, skip) = detect_bom(bytes);
    let content = &bytes[skip..];

    if skip > 0 && bom_encoding != "UTF-8" {
        // The BOM wins over whatever the declaration claims.
        return transcode(content, bom_encoding);
    }

    match declared_encoding(content) {
        Some(label) if !is_utf8_label(&label) => transcode(content, &label),
        _ => std::str::from_utf8(content)
            .map(str::to_owned)
            .map_err(|e| EncodingError::new(format!("input is not valid UTF-8: {e}"))),
    }
}

/// Reads the `encoding` pseudo-attribute of a leading XML declaration.
///
/// The declaration is ASCII in every ASCII-compatible encoding, so the raw
/// bytes are scanned directly.
fn declared_encoding(bytes: &[u8]) -> Option<String> {
    let scan = &bytes[..bytes.len().min(256)];
    if !scan.starts_with(b"<?xml") {
        return None;
    }
    let end = scan.windows(2).position(|w| w == b"?>")?;
    let decl = &scan[..end];
    let pos = decl.windows(8).position(|w| w == b"encoding")?;
    let rest = skip_ascii_whitespace(&decl[pos + 8..]);
    let rest = skip_ascii_whitespace(rest.strip_prefix(b"=")?);
    let (&quote, rest) = rest.split_first()?;
    if quote != b'"' && quote != b'\'' {
        return None;
    }
    let len = rest.iter().position(|&b| b == quote)?;
    let label = &rest[..len];
    label
        .is_ascii()
        .then(|| String::from_utf8_lossy(label).into_owned())
}

fn skip_ascii_whitespace(bytes: &[u8]) -> &[u8] {
    let skip = bytes
        .iter()
        .take_while(|b| b.is_ascii_whitespace())
        .count();
    &bytes[skip..]
}

fn is_utf8_label(label: &str) -> bool {
    label.eq_ignore_ascii_case("utf-8") || label.eq_ignore_ascii_case("utf8")
}
