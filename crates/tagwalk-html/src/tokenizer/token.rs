use core::fmt;

use tagwalk_dom::Attribute;

/// A markup token produced by [`HTMLTokenizer`](super::HTMLTokenizer).
///
/// Character data is emitted in runs rather than one character at a time and
/// adjacent runs are joined, so text between two tags is a single `Text` token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// `<!DOCTYPE name ...>`. The name is lowercased; `None` if missing.
    Doctype {
        /// The document type name.
        name: Option<String>,
    },

    /// `<name attr="value" ...>` or `<name ... />`.
    StartTag {
        /// Lowercased tag name.
        name: String,
        /// Attributes in source order with duplicates already removed.
        attributes: Vec<Attribute>,
        /// True for the `/>` form.
        self_closing: bool,
    },

    /// `</name>`. Attributes on end tags are dropped.
    EndTag {
        /// Lowercased tag name.
        name: String,
    },

    /// A run of character data with references resolved.
    Text {
        /// The decoded text.
        data: String,
    },

    /// `<!-- data -->`, or a bogus comment such as `<?xml ...>`.
    Comment {
        /// Everything between the delimiters.
        data: String,
    },
}

impl Token {
    /// Create a start tag token.
    #[must_use]
    pub fn start_tag(name: &str, attributes: Vec<Attribute>, self_closing: bool) -> Self {
        Self::StartTag {
            name: name.to_string(),
            attributes,
            self_closing,
        }
    }

    /// Create an end tag token.
    #[must_use]
    pub fn end_tag(name: &str) -> Self {
        Self::EndTag {
            name: name.to_string(),
        }
    }

    /// Create a text token.
    #[must_use]
    pub fn text(data: &str) -> Self {
        Self::Text {
            data: data.to_string(),
        }
    }

    /// Create a comment token.
    #[must_use]
    pub fn comment(data: &str) -> Self {
        Self::Comment {
            data: data.to_string(),
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Doctype { name } => {
                write!(f, "<!DOCTYPE {}>", name.as_deref().unwrap_or(""))
            }
            Self::StartTag {
                name,
                attributes,
                self_closing,
            } => {
                write!(f, "<{name}")?;
                for attr in attributes {
                    write!(f, " {}=\"{}\"", attr.name, attr.value)?;
                }
                if *self_closing {
                    write!(f, " />")
                } else {
                    write!(f, ">")
                }
            }
            Self::EndTag { name } => write!(f, "</{name}>"),
            Self::Text { data } => write!(f, "{data:?}"),
            Self::Comment { data } => write!(f, "<!--{data}-->"),
        }
    }
}
