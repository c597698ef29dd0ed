use std::num::NonZeroUsize;

/// Nesting limit used when none is configured.
pub const DEFAULT_MAX_DEPTH: NonZeroUsize = match NonZeroUsize::new(256) {
    Some(depth) => depth,
    None => NonZeroUsize::MIN,
};

/// Settings for one parse.
///
/// ```
/// use std::num::NonZeroUsize;
/// use tagwalk_html::ParseOptions;
///
/// let options = ParseOptions::new()
///     .with_strip_blank_text_nodes(true)
///     .with_compact_text(true)
///     .with_max_depth(NonZeroUsize::new(64).unwrap());
/// assert!(options.strip_blank_text_nodes);
/// assert_eq!(options.max_depth.get(), 64);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseOptions {
    /// Drop Text nodes that contain only whitespace.
    pub strip_blank_text_nodes: bool,
    /// Merge adjacent Text siblings into one node.
    pub compact_text: bool,
    /// Discard diagnostics instead of attaching them to the document.
    pub suppress_diagnostics: bool,
    /// Maximum number of simultaneously open elements.
    pub max_depth: NonZeroUsize,
    /// Encoding label to use for byte input when there is no BOM.
    pub encoding: Option<String>,
}

impl ParseOptions {
    /// Default options: keep everything, report diagnostics, depth 256.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            strip_blank_text_nodes: false,
            compact_text: false,
            suppress_diagnostics: false,
            max_depth: DEFAULT_MAX_DEPTH,
            encoding: None,
        }
    }

    /// Set [`strip_blank_text_nodes`](Self::strip_blank_text_nodes).
    #[must_use]
    pub const fn with_strip_blank_text_nodes(mut self, strip: bool) -> Self {
        self.strip_blank_text_nodes = strip;
        self
    }

    /// Set [`compact_text`](Self::compact_text).
    #[must_use]
    pub const fn with_compact_text(mut self, compact: bool) -> Self {
        self.compact_text = compact;
        self
    }

    /// Set [`suppress_diagnostics`](Self::suppress_diagnostics).
    #[must_use]
    pub const fn with_suppress_diagnostics(mut self, suppress: bool) -> Self {
        self.suppress_diagnostics = suppress;
        self
    }

    /// Set [`max_depth`](Self::max_depth).
    #[must_use]
    pub const fn with_max_depth(mut self, max_depth: NonZeroUsize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Declare the encoding of byte input.
    #[must_use]
    pub fn with_encoding(mut self, label: impl Into<String>) -> Self {
        self.encoding = Some(label.into());
        self
    }
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self::new()
    }
}
