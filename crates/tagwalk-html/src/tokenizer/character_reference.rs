//! Character reference decoding for text and attribute values.
//!
//! Handles `&name;`, the legacy semicolon-less forms of the markup
//! entities, `&#NN;` and `&#xHH;`. Anything that does not resolve is
//! copied through literally.

use super::core::HTMLTokenizer;
use super::named_character_references::{LEGACY_ENTITIES, lookup_entity};

const REPLACEMENT_CHARACTER: char = '\u{FFFD}';

impl HTMLTokenizer<'_> {
    /// Resolve every character reference in `raw`.
    ///
    /// `start` is the byte offset of `raw` in the input, for diagnostics.
    /// Inside attribute values a legacy reference followed by `=` or an
    /// alphanumeric is left alone, so query strings like `?a=1&copy=2`
    /// survive.
    pub(super) fn decode_character_references(
        &mut self,
        raw: &str,
        start: usize,
        in_attribute: bool,
    ) -> String {
        if !raw.contains('&') {
            return raw.to_string();
        }

        let mut out = String::with_capacity(raw.len());
        let mut rest = raw;
        while let Some(amp) = rest.find('&') {
            out.push_str(&rest[..amp]);
            let offset = start + (raw.len() - rest.len()) + amp;
            let after = &rest[amp + 1..];
            match self.character_reference(after, offset, in_attribute, &mut out) {
                Some(consumed) => rest = &after[consumed..],
                None => {
                    out.push('&');
                    rest = after;
                }
            }
        }
        out.push_str(rest);
        out
    }

    /// Decode one reference whose text (after `&`) starts `after`.
    ///
    /// Pushes the replacement to `out` and returns how many bytes of
    /// `after` it used, or returns None if the `&` is literal.
    fn character_reference(
        &mut self,
        after: &str,
        offset: usize,
        in_attribute: bool,
        out: &mut String,
    ) -> Option<usize> {
        if let Some(body) = after.strip_prefix('#') {
            return self.numeric_reference(body, offset, out).map(|used| used + 1);
        }

        let name_len = after.bytes().take_while(u8::is_ascii_alphanumeric).count();
        if name_len == 0 {
            return None;
        }
        let name = &after[..name_len];

        if after[name_len..].starts_with(';')
            && let Some(value) = lookup_entity(name)
        {
            out.push_str(value);
            return Some(name_len + 1);
        }

        if let Some(legacy) = LEGACY_ENTITIES.iter().find(|l| name.starts_with(**l)) {
            let next = after[legacy.len()..].chars().next();
            let ambiguous = in_attribute && next.is_some_and(|c| c == '=' || c.is_ascii_alphanumeric());
            if ambiguous {
                return None;
            }
            let value = lookup_entity(legacy)?;
            self.issues
                .warn(format!("missing semicolon after &{legacy}"), offset);
            out.push_str(value);
            return Some(legacy.len());
        }

        self.issues
            .warn(format!("unknown character reference &{name}; left as text"), offset);
        None
    }

    /// `body` is the text after `&#`.
    fn numeric_reference(&mut self, body: &str, offset: usize, out: &mut String) -> Option<usize> {
        let (radix, prefix) = match body.as_bytes().first() {
            Some(b'x' | b'X') => (16, 1),
            _ => (10, 0),
        };
        let digits = &body[prefix..];
        let len = digits
            .bytes()
            .take_while(|b| {
                if radix == 16 {
                    b.is_ascii_hexdigit()
                } else {
                    b.is_ascii_digit()
                }
            })
            .count();
        if len == 0 {
            self.issues
                .warn("numeric character reference without digits", offset);
            return None;
        }

        let mut used = prefix + len;
        if digits[len..].starts_with(';') {
            used += 1;
        } else {
            self.issues
                .warn("missing semicolon after numeric character reference", offset);
        }

        // Overflow, NUL, surrogates and values past U+10FFFF all become U+FFFD.
        let c = u32::from_str_radix(&digits[..len], radix)
            .ok()
            .filter(|&v| v != 0)
            .and_then(char::from_u32);
        if let Some(c) = c {
            out.push(c);
        } else {
            self.issues
                .warn("character reference outside Unicode range", offset);
            out.push(REPLACEMENT_CHARACTER);
        }
        Some(used)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(raw: &str, in_attribute: bool) -> String {
        let mut tokenizer = HTMLTokenizer::new("");
        tokenizer.decode_character_references(raw, 0, in_attribute)
    }

    #[test]
    fn named_with_semicolon() {
        assert_eq!(decode("a &amp; b &lt;c&gt;", false), "a & b <c>");
        assert_eq!(decode("caf&eacute;", false), "caf\u{e9}");
    }

    #[test]
    fn numeric_forms() {
        assert_eq!(decode("&#65;&#x42;&#X43;", false), "ABC");
        assert_eq!(decode("&#0;", false), "\u{FFFD}");
        assert_eq!(decode("&#xD800;", false), "\u{FFFD}");
        assert_eq!(decode("&#99999999999;", false), "\u{FFFD}");
        assert_eq!(decode("&#;", false), "&#;");
    }

    #[test]
    fn unknown_passes_through() {
        assert_eq!(decode("&bogus; & &;", false), "&bogus; & &;");
    }

    #[test]
    fn legacy_without_semicolon() {
        assert_eq!(decode("fish &amp chips", false), "fish & chips");
        assert_eq!(decode("&lt3", false), "<3");
    }

    #[test]
    fn legacy_in_attribute_before_equals_is_literal() {
        assert_eq!(decode("?x=1&amp=2", true), "?x=1&amp=2");
        assert_eq!(decode("?x=1&amp;y=2", true), "?x=1&y=2");
    }
}
