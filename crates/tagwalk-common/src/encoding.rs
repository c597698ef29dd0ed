//! Input encoding detection and transcoding.
//!
//! Markup arrives as bytes. Before tokenizing, the bytes are turned into a
//! UTF-8 `String` using the first encoding found by, in order:
//!
//! 1. A byte order mark (UTF-8, UTF-16LE, UTF-16BE). The BOM is skipped.
//! 2. The caller's declared encoding label, if any.
//! 3. A `<meta charset=...>` or `<meta http-equiv content="...; charset=...">`
//!    found by prescanning the first [`PRESCAN_LIMIT`] bytes.
//! 4. UTF-8.
//!
//! Transcoding goes through `encoding_rs`. Malformed byte sequences are
//! replaced with U+FFFD rather than rejected.

use encoding_rs::{Encoding, UTF_8, UTF_16BE, UTF_16LE};
use thiserror::Error;

/// How many leading bytes the `<meta>` prescan looks at.
pub const PRESCAN_LIMIT: usize = 1024;

/// An error that occurs while choosing an input encoding.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodingError {
    /// The caller declared an encoding label `encoding_rs` does not know.
    #[error("unsupported encoding: {label}")]
    UnknownLabel {
        /// The label as given.
        label: String,
    },
}

/// Where the chosen encoding came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodingSource {
    /// A byte order mark at the start of the input.
    ByteOrderMark,
    /// The label passed in by the caller.
    Declared,
    /// A `<meta>` element found during prescan.
    Meta,
    /// Nothing was found; UTF-8 was assumed.
    Default,
}

/// Input bytes decoded to UTF-8.
#[derive(Debug, Clone)]
pub struct Decoded {
    /// The decoded text, without any BOM.
    pub text: String,
    /// Canonical name of the encoding used (e.g. `"UTF-8"`, `"windows-1252"`).
    pub encoding: &'static str,
    /// How the encoding was chosen.
    pub source: EncodingSource,
    /// True if malformed sequences were replaced with U+FFFD.
    pub had_errors: bool,
}

/// Sniff a byte order mark.
///
/// Returns the encoding and the number of BOM bytes to skip.
///
/// # Examples
///
/// ```
/// use tagwalk_common::encoding::sniff_bom;
///
/// let (enc, skip) = sniff_bom(b"\xEF\xBB\xBF<p>").unwrap();
/// assert_eq!(enc.name(), "UTF-8");
/// assert_eq!(skip, 3);
/// assert!(sniff_bom(b"<p>").is_none());
/// ```
#[must_use]
pub fn sniff_bom(bytes: &[u8]) -> Option<(&'static Encoding, usize)> {
    match bytes {
        [0xEF, 0xBB, 0xBF, ..] => Some((UTF_8, 3)),
        [0xFE, 0xFF, ..] => Some((UTF_16BE, 2)),
        [0xFF, 0xFE, ..] => Some((UTF_16LE, 2)),
        _ => None,
    }
}

/// Prescan the start of the input for a charset declared by a `<meta>` tag.
///
/// Handles both `<meta charset="x">` and
/// `<meta http-equiv="Content-Type" content="text/html; charset=x">`.
/// Returns the raw label; it is not validated here.
#[must_use]
pub fn prescan_meta_charset(bytes: &[u8]) -> Option<String> {
    let head = &bytes[..bytes.len().min(PRESCAN_LIMIT)];
    let lower: Vec<u8> = head.iter().map(u8::to_ascii_lowercase).collect();

    let mut from = 0;
    while let Some(found) = find(&lower[from..], b"<meta") {
        let tag_start = from + found + b"<meta".len();
        let tag_end = find(&lower[tag_start..], b">").map_or(lower.len(), |e| tag_start + e);
        let tag = &lower[tag_start..tag_end];

        if let Some(label) = charset_in_tag(tag) {
            return Some(label);
        }
        from = tag_end;
    }
    None
}

/// Extract `charset=value` from the inside of a single `<meta ...>` tag.
fn charset_in_tag(tag: &[u8]) -> Option<String> {
    let pos = find(tag, b"charset")?;
    let mut rest = &tag[pos + b"charset".len()..];

    rest = trim_ascii_start(rest);
    rest = rest.strip_prefix(b"=")?;
    rest = trim_ascii_start(rest);

    let value: Vec<u8> = match rest.first() {
        Some(&q @ (b'"' | b'\'')) => rest[1..].iter().take_while(|&&b| b != q).copied().collect(),
        _ => rest
            .iter()
            .take_while(|&&b| !b.is_ascii_whitespace() && !matches!(b, b';' | b'"' | b'\'' | b'/'))
            .copied()
            .collect(),
    };

    let label = String::from_utf8(value).ok()?;
    let label = label.trim();
    (!label.is_empty()).then(|| label.to_string())
}

fn trim_ascii_start(bytes: &[u8]) -> &[u8] {
    let skip = bytes.iter().take_while(|b| b.is_ascii_whitespace()).count();
    &bytes[skip..]
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

/// Resolve an encoding label the way HTML does.
///
/// A `<meta>` that claims UTF-16 is lying (the prescan could read it as
/// ASCII), so it is treated as UTF-8.
fn resolve_label(label: &str, from_meta: bool) -> Option<&'static Encoding> {
    let encoding = Encoding::for_label(label.trim().as_bytes())?;
    if from_meta && (encoding == UTF_16LE || encoding == UTF_16BE) {
        return Some(UTF_8);
    }
    Some(encoding)
}

/// Decode raw markup bytes to UTF-8.
///
/// `declared` is an optional encoding label supplied by the caller (for
/// instance from an HTTP header). A BOM always wins over it.
///
/// # Errors
///
/// Returns [`EncodingError::UnknownLabel`] if `declared` is not a label
/// `encoding_rs` recognizes. Unknown labels found by the `<meta>` prescan
/// are ignored instead.
///
/// # Examples
///
/// ```
/// use tagwalk_common::encoding::{decode, EncodingSource};
///
/// let decoded = decode(b"<p>caf\xE9</p>", Some("latin1")).unwrap();
/// assert_eq!(decoded.text, "<p>caf\u{e9}</p>");
/// assert_eq!(decoded.source, EncodingSource::Declared);
/// ```
pub fn decode(bytes: &[u8], declared: Option<&str>) -> Result<Decoded, EncodingError> {
    let (encoding, skip, source) = if let Some((encoding, skip)) = sniff_bom(bytes) {
        (encoding, skip, EncodingSource::ByteOrderMark)
    } else if let Some(label) = declared {
        let encoding = resolve_label(label, false).ok_or_else(|| EncodingError::UnknownLabel {
            label: label.to_string(),
        })?;
        (encoding, 0, EncodingSource::Declared)
    } else if let Some(encoding) =
        prescan_meta_charset(bytes).and_then(|label| resolve_label(&label, true))
    {
        (encoding, 0, EncodingSource::Meta)
    } else {
        (UTF_8, 0, EncodingSource::Default)
    };

    let (text, had_errors) = encoding.decode_without_bom_handling(&bytes[skip..]);
    Ok(Decoded {
        text: text.into_owned(),
        encoding: encoding.name(),
        source,
        had_errors,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn meta_charset_attribute() {
        let html = br#"<html><head><meta charset="ISO-8859-1"></head></html>"#;
        assert_eq!(prescan_meta_charset(html).as_deref(), Some("iso-8859-1"));
    }

    #[test]
    fn meta_http_equiv_content() {
        let html =
            br#"<meta http-equiv="Content-Type" content="text/html; charset=windows-1251">"#;
        assert_eq!(prescan_meta_charset(html).as_deref(), Some("windows-1251"));
    }

    #[test]
    fn meta_without_charset_is_skipped() {
        let html = br#"<meta name="viewport" content="width=device-width"><meta charset=utf-8>"#;
        assert_eq!(prescan_meta_charset(html).as_deref(), Some("utf-8"));
    }

    #[test]
    fn meta_claiming_utf16_means_utf8() {
        let decoded = decode(br#"<meta charset="utf-16"><p>x</p>"#, None).unwrap();
        assert_eq!(decoded.encoding, "UTF-8");
        assert_eq!(decoded.source, EncodingSource::Meta);
    }

    #[test]
    fn bom_is_stripped() {
        let decoded = decode(b"\xEF\xBB\xBF<a/>", Some("latin1")).unwrap();
        assert_eq!(decoded.text, "<a/>");
        assert_eq!(decoded.source, EncodingSource::ByteOrderMark);
    }

    #[test]
    fn utf16le_with_bom() {
        let decoded = decode(b"\xFF\xFE<\x00p\x00>\x00", None).unwrap();
        assert_eq!(decoded.text, "<p>");
        assert_eq!(decoded.encoding, "UTF-16LE");
    }

    #[test]
    fn unknown_declared_label_is_an_error() {
        let err = decode(b"<p>", Some("no-such-charset")).unwrap_err();
        assert_eq!(
            err,
            EncodingError::UnknownLabel {
                label: "no-such-charset".to_string()
            }
        );
    }

    #[test]
    fn malformed_utf8_is_replaced() {
        let decoded = decode(b"<p>\xFF</p>", None).unwrap();
        assert!(decoded.had_errors);
        assert_eq!(decoded.text, "<p>\u{FFFD}</p>");
        assert_eq!(decoded.source, EncodingSource::Default);
    }
}
