use strum_macros::Display;
use tagwalk_common::{Diagnostic, Diagnostics};
use tagwalk_dom::Attribute;

use super::token::Token;
use crate::tags::{ContentModel, content_model};

/// What the tokenizer does with the input at the cursor.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum TokenizerMode {
    /// Regular markup: tags, comments and text.
    Data,
    /// Inside `<script>`, `<style>` and friends. Holds the element name
    /// whose end tag finishes the content.
    RawText(String),
    /// Inside `<title>` or `<textarea>`: raw text with character
    /// references decoded.
    RcData(String),
}

/// Result of looking at a `<`.
enum Markup {
    /// A complete token was read.
    Emit(Token),
    /// The markup was consumed but produces nothing (`</>`).
    Skipped,
    /// The `<` does not start markup and is plain text.
    Literal,
}

/// A single-pass, permissive HTML tokenizer.
///
/// The tokenizer is an [`Iterator`] over [`Token`]s borrowed from one input
/// string. It never fails: malformed markup is turned into text or comments
/// and noted as a [`Diagnostic`].
///
/// # Examples
///
/// ```
/// use tagwalk_html::{HTMLTokenizer, Token};
///
/// let tokens: Vec<Token> = HTMLTokenizer::new("<p class=x>hi</p>").collect();
/// assert_eq!(tokens.len(), 3);
/// assert_eq!(tokens[1], Token::text("hi"));
/// ```
#[derive(Debug)]
pub struct HTMLTokenizer<'a> {
    pub(super) input: &'a str,
    pub(super) current_pos: usize,
    token_start: usize,
    mode: TokenizerMode,
    /// A token read past the end of a text run, with its start offset.
    pending: Option<(Token, usize)>,
    pub(super) issues: Diagnostics,
}

impl<'a> HTMLTokenizer<'a> {
    /// Create a tokenizer that records diagnostics.
    #[must_use]
    pub fn new(input: &'a str) -> Self {
        Self::with_diagnostics(input, Diagnostics::new())
    }

    /// Create a tokenizer that records diagnostics into `issues`.
    ///
    /// Pass [`Diagnostics::suppressed`] to discard them.
    #[must_use]
    pub const fn with_diagnostics(input: &'a str, issues: Diagnostics) -> Self {
        Self {
            input,
            current_pos: 0,
            token_start: 0,
            mode: TokenizerMode::Data,
            pending: None,
            issues,
        }
    }

    /// Byte offset where the most recently returned token starts.
    #[must_use]
    pub const fn token_start(&self) -> usize {
        self.token_start
    }

    /// Byte offset of the cursor.
    #[must_use]
    pub const fn position(&self) -> usize {
        self.current_pos
    }

    /// The current mode.
    #[must_use]
    pub const fn mode(&self) -> &TokenizerMode {
        &self.mode
    }

    /// Take the diagnostics recorded so far.
    pub fn take_diagnostics(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.issues).into_vec()
    }

    // =========================================================================
    // Markup
    // =========================================================================

    /// The cursor is on a `<`.
    fn markup(&mut self) -> Markup {
        match self.peek_codepoint(1) {
            Some('!') => Markup::Emit(self.markup_declaration()),
            Some('?') => {
                // "<?xml ...>" keeps the question mark in the comment data.
                self.consume_string("<");
                Markup::Emit(self.bogus_comment())
            }
            Some('/') => self.end_tag(),
            Some(c) if c.is_ascii_alphabetic() => Markup::Emit(self.start_tag()),
            _ => Markup::Literal,
        }
    }

    /// `<!--...-->`, `<!DOCTYPE ...>` or some other `<!...>`.
    fn markup_declaration(&mut self) -> Token {
        if self.next_few_characters_are("<!--") {
            self.consume_string("<!--");
            return self.comment();
        }
        if self.next_few_characters_are_case_insensitive("<!doctype") {
            self.consume_string("<!doctype");
            return self.doctype();
        }
        self.consume_string("<!");
        self.bogus_comment()
    }

    /// After `<!--`.
    fn comment(&mut self) -> Token {
        // "<!-->" and "<!--->" are empty comments.
        for abrupt in [">", "->"] {
            if self.next_few_characters_are(abrupt) {
                self.consume_string(abrupt);
                self.issues
                    .warn("abrupt closing of empty comment", self.token_start);
                return Token::comment("");
            }
        }

        let start = self.current_pos;
        if let Some(end) = self.input[start..].find("-->") {
            self.current_pos = start + end + "-->".len();
            Token::comment(&self.input[start..start + end])
        } else {
            self.issues.error(
                "unterminated comment runs to end of input",
                self.token_start,
            );
            self.current_pos = self.input.len();
            Token::comment(&self.input[start..])
        }
    }

    /// After `<!DOCTYPE`. Only the name is kept.
    fn doctype(&mut self) -> Token {
        self.skip_whitespace();
        let mut name = String::new();
        while let Some(c) = self.peek_codepoint(0) {
            if Self::is_whitespace_char(c) || c == '>' {
                break;
            }
            name.push(c.to_ascii_lowercase());
            let _ = self.consume();
        }

        match self.input[self.current_pos..].find('>') {
            Some(end) => self.current_pos += end + 1,
            None => {
                self.issues.error("unterminated DOCTYPE", self.token_start);
                self.current_pos = self.input.len();
            }
        }

        if name.is_empty() {
            self.issues.warn("DOCTYPE without a name", self.token_start);
        }
        Token::Doctype {
            name: (!name.is_empty()).then_some(name),
        }
    }

    /// Everything up to the next `>` becomes a comment.
    fn bogus_comment(&mut self) -> Token {
        self.issues.warn(
            "markup declaration treated as a comment",
            self.token_start,
        );
        let start = self.current_pos;
        let end = self.input[start..]
            .find('>')
            .map_or(self.input.len(), |e| start + e);
        self.current_pos = (end + 1).min(self.input.len());
        Token::comment(&self.input[start..end])
    }

    /// The cursor is on `<` followed by an ASCII letter.
    fn start_tag(&mut self) -> Token {
        self.consume_string("<");
        let name = self.tag_name();
        let Some((attributes, self_closing)) = self.attributes() else {
            return self.unterminated_tag();
        };

        if !self_closing {
            match content_model(&name) {
                ContentModel::Normal => {}
                ContentModel::RawText => self.mode = TokenizerMode::RawText(name.clone()),
                ContentModel::EscapableRawText => {
                    self.mode = TokenizerMode::RcData(name.clone());
                }
            }
        }

        Token::StartTag {
            name,
            attributes,
            self_closing,
        }
    }

    /// The cursor is on `</`.
    fn end_tag(&mut self) -> Markup {
        self.consume_string("</");
        match self.peek_codepoint(0) {
            Some('>') => {
                let _ = self.consume();
                self.issues.warn("empty end tag </> ignored", self.token_start);
                Markup::Skipped
            }
            Some(c) if c.is_ascii_alphabetic() => {
                let name = self.tag_name();
                match self.attributes() {
                    Some((attributes, _)) => {
                        if !attributes.is_empty() {
                            self.issues.warn(
                                format!("attributes on end tag </{name}> ignored"),
                                self.token_start,
                            );
                        }
                        Markup::Emit(Token::EndTag { name })
                    }
                    None => Markup::Emit(self.unterminated_tag()),
                }
            }
            Some(_) => Markup::Emit(self.bogus_comment()),
            None => Markup::Emit(self.unterminated_tag()),
        }
    }

    /// Consume a tag name, lowercased.
    fn tag_name(&mut self) -> String {
        let mut name = String::new();
        while let Some(c) = self.peek_codepoint(0) {
            if Self::is_whitespace_char(c) || c == '/' || c == '>' {
                break;
            }
            name.push(c.to_ascii_lowercase());
            let _ = self.consume();
        }
        name
    }

    /// Consume attributes up to and including the closing `>` or `/>`.
    ///
    /// Returns None if the input ends first. Duplicate names keep the first
    /// value.
    fn attributes(&mut self) -> Option<(Vec<Attribute>, bool)> {
        let mut attributes: Vec<Attribute> = Vec::new();
        loop {
            self.skip_whitespace();
            let attribute_start = self.current_pos;
            match self.peek_codepoint(0)? {
                '>' => {
                    let _ = self.consume();
                    return Some((attributes, false));
                }
                '/' => {
                    let _ = self.consume();
                    if self.peek_codepoint(0) == Some('>') {
                        let _ = self.consume();
                        return Some((attributes, true));
                    }
                    continue;
                }
                _ => {}
            }

            let name = self.attribute_name();
            self.skip_whitespace();
            let value = if self.peek_codepoint(0) == Some('=') {
                let _ = self.consume();
                self.skip_whitespace();
                self.attribute_value()?
            } else {
                String::new()
            };

            if attributes.iter().any(|a| a.name == name) {
                self.issues.warn(
                    format!("duplicate attribute {name} dropped"),
                    attribute_start,
                );
            } else {
                attributes.push(Attribute::new(name, value));
            }
        }
    }

    /// Consume an attribute name, lowercased. A leading `=` is part of it.
    fn attribute_name(&mut self) -> String {
        let mut name = String::new();
        if let Some(first) = self.consume() {
            name.push(first.to_ascii_lowercase());
        }
        while let Some(c) = self.peek_codepoint(0) {
            if Self::is_whitespace_char(c) || matches!(c, '/' | '>' | '=') {
                break;
            }
            name.push(c.to_ascii_lowercase());
            let _ = self.consume();
        }
        name
    }

    /// Consume a quoted or unquoted value after `=`.
    fn attribute_value(&mut self) -> Option<String> {
        let input = self.input;
        match self.peek_codepoint(0)? {
            quote @ ('"' | '\'') => {
                let _ = self.consume();
                let start = self.current_pos;
                let end = start + input[start..].find(quote)?;
                self.current_pos = end + 1;
                Some(self.decode_character_references(&input[start..end], start, true))
            }
            '>' => {
                self.issues.warn("missing attribute value", self.current_pos);
                Some(String::new())
            }
            _ => {
                let start = self.current_pos;
                while let Some(c) = self.peek_codepoint(0) {
                    if Self::is_whitespace_char(c) || c == '>' {
                        break;
                    }
                    let _ = self.consume();
                }
                let end = self.current_pos;
                Some(self.decode_character_references(&input[start..end], start, true))
            }
        }
    }

    /// The input ended inside a tag: the whole tag becomes text.
    fn unterminated_tag(&mut self) -> Token {
        self.issues
            .error("unterminated tag treated as text", self.token_start);
        self.current_pos = self.input.len();
        Token::text(&self.input[self.token_start..])
    }

    // =========================================================================
    // Text
    // =========================================================================

    /// Text up to the next markup. The first character is always taken, so
    /// a literal `<` at the cursor is included.
    fn text_run(&mut self) -> Token {
        let input = self.input;
        let start = self.current_pos;
        let _ = self.consume();
        let end = self.next_markup_start().unwrap_or(input.len());
        self.current_pos = end;
        Token::Text {
            data: self.decode_character_references(&input[start..end], start, false),
        }
    }

    /// Content of a raw text element, if the previous token opened one.
    fn raw_text_content(&mut self) -> Option<Token> {
        let (name, escapable) = match std::mem::replace(&mut self.mode, TokenizerMode::Data) {
            TokenizerMode::Data => return None,
            TokenizerMode::RawText(name) => (name, false),
            TokenizerMode::RcData(name) => (name, true),
        };

        let input = self.input;
        let start = self.current_pos;
        let end = self.find_end_tag(&name).unwrap_or_else(|| {
            self.issues.error(
                format!("<{name}> content runs to end of input"),
                start,
            );
            input.len()
        });
        self.current_pos = end;
        if end == start {
            return None;
        }

        let raw = &input[start..end];
        let data = if escapable {
            self.decode_character_references(raw, start, false)
        } else {
            raw.to_string()
        };
        Some(Token::Text { data })
    }

    /// Read the next token without joining text runs.
    fn scan(&mut self) -> Option<Token> {
        loop {
            self.token_start = self.current_pos;
            if let Some(text) = self.raw_text_content() {
                return Some(text);
            }

            if self.peek_codepoint(0)? != '<' {
                return Some(self.text_run());
            }
            match self.markup() {
                Markup::Emit(token) => return Some(token),
                Markup::Skipped => {}
                Markup::Literal => {
                    self.issues
                        .warn("'<' not starting a tag treated as text", self.current_pos);
                    return Some(self.text_run());
                }
            }
        }
    }
}

impl Iterator for HTMLTokenizer<'_> {
    type Item = Token;

    /// Text followed by more text (an unterminated tag at the end of the
    /// input) comes out as one `Text` token.
    fn next(&mut self) -> Option<Token> {
        let (token, start) = match self.pending.take() {
            Some(pending) => pending,
            None => (self.scan()?, self.token_start),
        };
        let Token::Text { mut data } = token else {
            self.token_start = start;
            return Some(token);
        };

        while let Some(following) = self.scan() {
            match following {
                Token::Text { data: more } => data.push_str(&more),
                other => {
                    self.pending = Some((other, self.token_start));
                    break;
                }
            }
        }
        self.token_start = start;
        Some(Token::Text { data })
    }
}
