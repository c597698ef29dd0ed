use std::path::Path;

use tagwalk_common::Diagnostic;
use tagwalk_common::encoding;
use tagwalk_dom::Document;

use crate::error::ParseError;
use crate::options::ParseOptions;
use crate::parser::HTMLParser;

/// A parsing context that owns its configuration.
///
/// There is no process-wide parser state: create an `Engine`, parse as many
/// inputs as needed, and drop it. Engines are cheap and can be shared
/// between threads.
///
/// ```
/// use tagwalk_html::{Engine, ParseOptions};
///
/// let engine = Engine::new(ParseOptions::new().with_strip_blank_text_nodes(true));
/// let doc = engine.parse_str("<ul>\n  <li>one</li>\n</ul>").unwrap();
/// let ul = doc.root();
/// assert_eq!(doc.child_nodes(ul).count(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Engine {
    options: ParseOptions,
}

impl Engine {
    /// Create an engine that parses with `options`.
    #[must_use]
    pub const fn new(options: ParseOptions) -> Self {
        Self { options }
    }

    /// The options this engine parses with.
    #[must_use]
    pub const fn options(&self) -> &ParseOptions {
        &self.options
    }

    /// Parse markup that is already text.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::EmptyDocument`] or [`ParseError::NestingTooDeep`].
    pub fn parse_str(&self, input: &str) -> Result<Document, ParseError> {
        HTMLParser::new(input, &self.options).run()
    }

    /// Detect the encoding of `bytes`, decode them and parse the result.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::Encoding`] if the configured encoding label is
    /// unknown, otherwise as [`parse_str`](Self::parse_str).
    pub fn parse_bytes(&self, bytes: &[u8]) -> Result<Document, ParseError> {
        let decoded = encoding::decode(bytes, self.options.encoding.as_deref())?;
        let mut parser =
            HTMLParser::new(&decoded.text, &self.options).with_encoding(decoded.encoding);
        if decoded.had_errors {
            parser.push_diagnostic(Diagnostic::warning(
                format!("malformed {} input replaced with U+FFFD", decoded.encoding),
                0,
            ));
        }
        parser.run()
    }

    /// Read a whole file and parse it as bytes.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::Io`] if the file cannot be read, otherwise as
    /// [`parse_bytes`](Self::parse_bytes).
    pub fn parse_file(&self, path: impl AsRef<Path>) -> Result<Document, ParseError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|source| ParseError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        self.parse_bytes(&bytes)
    }
}
