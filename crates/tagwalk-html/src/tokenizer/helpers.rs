//! Helper functions for the HTML tokenizer.
//!
//! This module contains the input handling used throughout the tokenizer:
//! - Cursor movement ("consume the next input character")
//! - Lookahead ("if the next few characters are")
//! - Whitespace skipping
//! - Scanning ahead for the next tag or a raw text end tag

use super::core::HTMLTokenizer;

// =============================================================================
// Input/Character Helpers
// =============================================================================

impl HTMLTokenizer<'_> {
    /// Returns the character at the current position and advances past it.
    /// Returns None at the end of input.
    pub(super) fn consume(&mut self) -> Option<char> {
        let c = self.input[self.current_pos..].chars().next()?;
        self.current_pos += c.len_utf8();
        Some(c)
    }

    /// Peek at the character `offset` characters ahead without consuming it.
    #[must_use]
    pub fn peek_codepoint(&self, offset: usize) -> Option<char> {
        self.input[self.current_pos..].chars().nth(offset)
    }

    /// True if the input at the current position starts with `target`.
    #[must_use]
    pub fn next_few_characters_are(&self, target: &str) -> bool {
        self.input[self.current_pos..].starts_with(target)
    }

    /// Like [`next_few_characters_are`](Self::next_few_characters_are) but
    /// ASCII case-insensitive. Used for `DOCTYPE`.
    #[must_use]
    pub fn next_few_characters_are_case_insensitive(&self, target: &str) -> bool {
        self.input.as_bytes()[self.current_pos..]
            .get(..target.len())
            .is_some_and(|head| head.eq_ignore_ascii_case(target.as_bytes()))
    }

    /// Advance past `target`. Caller must have checked it is next.
    pub(super) const fn consume_string(&mut self, target: &str) {
        self.current_pos += target.len();
    }

    /// TAB, LF, FF, CR and SPACE.
    pub(super) const fn is_whitespace_char(c: char) -> bool {
        matches!(c, ' ' | '\t' | '\n' | '\x0C' | '\r')
    }

    pub(super) fn skip_whitespace(&mut self) {
        while self.peek_codepoint(0).is_some_and(Self::is_whitespace_char) {
            let _ = self.consume();
        }
    }
}

// =============================================================================
// Scanning Helpers
// =============================================================================

impl HTMLTokenizer<'_> {
    /// True if the `<` at byte `at` opens markup: a tag name start, `/`, `!` or `?`.
    pub(super) fn starts_markup(&self, at: usize) -> bool {
        self.input[at + 1..]
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic() || matches!(c, '/' | '!' | '?'))
    }

    /// Byte offset of the next `<` after the cursor that opens markup.
    pub(super) fn next_markup_start(&self) -> Option<usize> {
        let mut from = self.current_pos;
        while let Some(i) = self.input[from..].find('<') {
            let at = from + i;
            if self.starts_markup(at) {
                return Some(at);
            }
            from = at + 1;
        }
        None
    }

    /// Byte offset of `</name` (any case) followed by whitespace, `/`, `>`
    /// or end of input. Used to find where raw text content stops.
    pub(super) fn find_end_tag(&self, name: &str) -> Option<usize> {
        let bytes = self.input.as_bytes();
        let mut from = self.current_pos;
        while let Some(i) = self.input[from..].find("</") {
            let at = from + i;
            let name_end = at + 2 + name.len();
            let name_matches = bytes
                .get(at + 2..name_end)
                .is_some_and(|n| n.eq_ignore_ascii_case(name.as_bytes()));
            let boundary = bytes
                .get(name_end)
                .is_none_or(|&b| b == b'>' || b == b'/' || b.is_ascii_whitespace());
            if name_matches && boundary {
                return Some(at);
            }
            from = at + 2;
        }
        None
    }
}
