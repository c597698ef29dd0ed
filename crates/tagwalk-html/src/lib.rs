//! Permissive HTML tokenizer and tree builder.
//!
//! # Scope
//!
//! This crate implements:
//! - **Tokenizer** ([`HTMLTokenizer`])
//!   - Start and end tags, quoted, unquoted and bare attributes
//!   - Comments, bogus comments and `<!DOCTYPE>`
//!   - Named and numeric character references
//!   - Raw text (`script`, `style`) and escapable raw text (`title`, `textarea`)
//!
//! - **Tree builder** ([`HTMLParser`])
//!   - Stack of open elements with void elements and optional end tags
//!   - End tags that close intervening elements; stray end tags ignored
//!   - Blank text stripping and text compaction
//!   - A configurable nesting limit
//!
//! - **Input handling** ([`Engine`])
//!   - Byte input with BOM, declared and `<meta>` encoding detection
//!
//! Malformed markup never fails a parse. Only an empty result and runaway
//! nesting are errors; everything else becomes a diagnostic on the
//! resulting [`Document`].
//!
//! # Not Implemented
//!
//! - The full HTML5 insertion-mode state machine
//! - Foster parenting and the adoption agency algorithm
//! - Implied `<html>`, `<head>` and `<body>` elements

mod engine;
mod error;
mod options;
/// Tree construction.
pub mod parser;
/// Per-element parsing rules.
pub mod tags;
/// Tokenizer for converting input into tokens.
pub mod tokenizer;

pub use engine::Engine;
pub use error::ParseError;
pub use options::{DEFAULT_MAX_DEPTH, ParseOptions};
pub use parser::{HTMLParser, TokenSource, TokenStream};
pub use tagwalk_dom::Document;
pub use tokenizer::named_character_references::{entity_name_for, lookup_entity};
pub use tokenizer::{HTMLTokenizer, Token, tokenize};

/// Parse `input` with default options.
///
/// ```
/// let doc = tagwalk_html::parse("<a><b>x</b></a>").unwrap();
/// let a = doc.root();
/// let b = doc.children(a).unwrap();
/// assert_eq!(doc.name(b), "b");
/// assert_eq!(doc.text(doc.children(b).unwrap()), "x");
/// ```
///
/// # Errors
///
/// Returns [`ParseError::EmptyDocument`] if the input produces no nodes and
/// [`ParseError::NestingTooDeep`] past the default nesting limit.
pub fn parse(input: &str) -> Result<Document, ParseError> {
    Engine::default().parse_str(input)
}

/// Parse `input` with the given options.
///
/// # Errors
///
/// See [`parse`].
pub fn parse_with(input: &str, options: &ParseOptions) -> Result<Document, ParseError> {
    HTMLParser::new(input, options).run()
}

/// Build a document from tokens produced elsewhere.
///
/// Diagnostic offsets count tokens rather than bytes.
///
/// ```
/// use tagwalk_html::{ParseOptions, Token, build};
///
/// let tokens = [
///     Token::start_tag("div", vec![], false),
///     Token::start_tag("span", vec![], false),
///     Token::end_tag("div"),
/// ];
/// let doc = build(tokens, &ParseOptions::new()).unwrap();
/// let div = doc.root();
/// assert_eq!(doc.name(doc.children(div).unwrap()), "span");
/// ```
///
/// # Errors
///
/// See [`parse`].
pub fn build(
    tokens: impl IntoIterator<Item = Token>,
    options: &ParseOptions,
) -> Result<Document, ParseError> {
    HTMLParser::from_tokens(tokens, options).run()
}
