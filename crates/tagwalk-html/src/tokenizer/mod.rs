//! HTML tokenizer module.
//!
//! Turns markup text into a lazy stream of [`Token`]s: start and end tags,
//! text runs, comments and a doctype.

/// Character reference decoding.
pub mod character_reference;
/// Cursor and lookahead helpers.
pub mod helpers;
/// Named character reference lookup table.
pub mod named_character_references;
/// Token types produced by the tokenizer.
pub mod token;
/// The tokenizer itself.
pub mod core;

pub use self::core::{HTMLTokenizer, TokenizerMode};
pub use token::Token;

/// Tokenize `input` lazily. The returned iterator makes a single forward pass.
#[must_use]
pub fn tokenize(input: &str) -> HTMLTokenizer<'_> {
    HTMLTokenizer::new(input)
}
