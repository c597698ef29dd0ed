use tagwalk_common::{Diagnostic, Diagnostics};
use tagwalk_dom::{Attribute, Document, DocumentBuilder, ElementData, NodeId, NodeKind};

use crate::error::ParseError;
use crate::options::ParseOptions;
use crate::tags::{self, EndTag};
use crate::tokenizer::{HTMLTokenizer, Token};

/// Where the tree builder gets its tokens.
pub trait TokenSource {
    /// The next token, or `None` at end of input.
    fn next_token(&mut self) -> Option<Token>;

    /// Offset of the token last returned, used in diagnostics.
    fn token_start(&self) -> usize;

    /// Offset just past everything consumed so far.
    fn position(&self) -> usize;

    /// Diagnostics recorded while producing tokens.
    fn take_diagnostics(&mut self) -> Vec<Diagnostic>;
}

impl TokenSource for HTMLTokenizer<'_> {
    fn next_token(&mut self) -> Option<Token> {
        self.next()
    }

    fn token_start(&self) -> usize {
        Self::token_start(self)
    }

    fn position(&self) -> usize {
        Self::position(self)
    }

    fn take_diagnostics(&mut self) -> Vec<Diagnostic> {
        Self::take_diagnostics(self)
    }
}

/// Tokens produced somewhere else. Offsets are token indices.
#[derive(Debug)]
pub struct TokenStream<I> {
    tokens: I,
    consumed: usize,
}

impl<I: Iterator<Item = Token>> TokenSource for TokenStream<I> {
    fn next_token(&mut self) -> Option<Token> {
        let token = self.tokens.next()?;
        self.consumed += 1;
        Some(token)
    }

    fn token_start(&self) -> usize {
        self.consumed.saturating_sub(1)
    }

    fn position(&self) -> usize {
        self.consumed
    }

    fn take_diagnostics(&mut self) -> Vec<Diagnostic> {
        Vec::new()
    }
}

/// Builds a [`Document`] from a stream of tokens.
///
/// The parser keeps a stack of open elements. Start tags append a new
/// element under the current node and push it (unless it is void or
/// written self-closing). End tags pop until the matching element,
/// closing anything left open inside it. End tags with no matching open
/// element are ignored.
pub struct HTMLParser<S> {
    tokens: S,

    builder: DocumentBuilder,

    /// Element ids, innermost last. Empty means the Document node is current.
    stack_of_open_elements: Vec<NodeId>,

    options: ParseOptions,

    issues: Diagnostics,
}

fn collector(options: &ParseOptions) -> Diagnostics {
    if options.suppress_diagnostics {
        Diagnostics::suppressed()
    } else {
        Diagnostics::new()
    }
}

impl<'a> HTMLParser<HTMLTokenizer<'a>> {
    /// Create a parser that tokenizes `input`.
    #[must_use]
    pub fn new(input: &'a str, options: &ParseOptions) -> Self {
        Self::with_source(
            HTMLTokenizer::with_diagnostics(input, collector(options)),
            options,
        )
    }
}

impl<I: Iterator<Item = Token>> HTMLParser<TokenStream<I>> {
    /// Create a parser over tokens that were already produced.
    #[must_use]
    pub fn from_tokens(
        tokens: impl IntoIterator<Item = Token, IntoIter = I>,
        options: &ParseOptions,
    ) -> Self {
        let stream = TokenStream {
            tokens: tokens.into_iter(),
            consumed: 0,
        };
        Self::with_source(stream, options)
    }
}

impl<S: TokenSource> HTMLParser<S> {
    /// Create a parser over any token source.
    #[must_use]
    pub fn with_source(tokens: S, options: &ParseOptions) -> Self {
        Self {
            tokens,
            builder: DocumentBuilder::new(),
            stack_of_open_elements: Vec::new(),
            options: options.clone(),
            issues: collector(options),
        }
    }

    /// Record the encoding the input was decoded from.
    #[must_use]
    pub fn with_encoding(mut self, encoding: &'static str) -> Self {
        self.builder.set_encoding(encoding);
        self
    }

    /// Record a diagnostic found before parsing started (e.g. while decoding).
    pub fn push_diagnostic(&mut self, diagnostic: Diagnostic) {
        self.issues.push(diagnostic);
    }

    /// Run the parser to the end of input.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::NestingTooDeep`] if more than `max_depth`
    /// elements are open at once, and [`ParseError::EmptyDocument`] if the
    /// input produced no nodes.
    pub fn run(mut self) -> Result<Document, ParseError> {
        while let Some(token) = self.tokens.next_token() {
            self.process_token(token)?;
        }
        self.close_open_elements_at_eof();

        if !self.builder.has_children(NodeId::DOCUMENT) {
            return Err(ParseError::EmptyDocument);
        }

        self.issues.absorb(self.tokens.take_diagnostics());
        let mut diagnostics = self.issues.into_vec();
        diagnostics.sort_by_key(|d| d.offset);
        self.builder.set_diagnostics(diagnostics);
        Ok(self.builder.finish())
    }

    fn process_token(&mut self, token: Token) -> Result<(), ParseError> {
        match token {
            Token::Doctype { name } => {
                self.insert_doctype(name);
                Ok(())
            }
            Token::StartTag {
                name,
                attributes,
                self_closing,
            } => self.insert_html_element(name, attributes, self_closing),
            Token::EndTag { name } => {
                self.close_element(&name);
                Ok(())
            }
            Token::Text { data } => {
                self.insert_text(&data);
                Ok(())
            }
            Token::Comment { data } => {
                self.insert_comment(data);
                Ok(())
            }
        }
    }

    /// The innermost open element, or the Document node.
    fn current_node(&self) -> NodeId {
        self.stack_of_open_elements
            .last()
            .copied()
            .unwrap_or(NodeId::DOCUMENT)
    }

    fn offset(&self) -> usize {
        self.tokens.token_start()
    }

    fn insert_doctype(&mut self, name: Option<String>) {
        if self.builder.has_children(NodeId::DOCUMENT) || !self.stack_of_open_elements.is_empty() {
            let offset = self.offset();
            self.issues.warn("misplaced DOCTYPE ignored", offset);
            return;
        }
        if let Some(name) = name {
            self.builder.set_doctype(name);
        }
    }

    /// Append text under the current node.
    ///
    /// Blank runs are dropped when stripping, unless they extend an
    /// existing Text node that compacting would merge them into.
    fn insert_text(&mut self, data: &str) {
        let parent = self.current_node();
        let merges = self.options.compact_text && self.last_child_is_text(parent);
        let blank = data.chars().all(char::is_whitespace);

        if self.options.strip_blank_text_nodes && blank && !merges {
            return;
        }
        let _ = self
            .builder
            .append_text(parent, data, self.options.compact_text);
    }

    fn last_child_is_text(&self, parent: NodeId) -> bool {
        self.builder
            .get(parent)
            .and_then(|node| node.last_child)
            .and_then(|child| self.builder.get(child))
            .is_some_and(|child| child.kind() == NodeKind::Text)
    }

    /// Comments are never merged.
    fn insert_comment(&mut self, data: String) {
        let parent = self.current_node();
        let _ = self.builder.append_comment(parent, data);
    }

    /// Handle a start tag: auto-close, check depth, append, push.
    fn insert_html_element(
        &mut self,
        name: String,
        attributes: Vec<Attribute>,
        self_closing: bool,
    ) -> Result<(), ParseError> {
        self.close_auto_closed(&name);

        let void = tags::is_void(&name);
        let opens = !void && !self_closing;
        if opens && self.stack_of_open_elements.len() >= self.options.max_depth.get() {
            return Err(ParseError::NestingTooDeep {
                limit: self.options.max_depth.get(),
                offset: self.offset(),
            });
        }

        let parent = self.current_node();
        let element = ElementData::new(name, attributes.into_iter().collect());
        let id = self.builder.append_element(parent, element);
        if opens {
            self.stack_of_open_elements.push(id);
        }
        Ok(())
    }

    /// Pop elements whose end tag is implied by a `<tag>` start tag.
    fn close_auto_closed(&mut self, tag: &str) {
        while let Some(&top) = self.stack_of_open_elements.last() {
            let closes = self
                .builder
                .tag_name(top)
                .is_some_and(|open| tags::auto_closes(open, tag));
            if !closes {
                break;
            }
            let _ = self.stack_of_open_elements.pop();
        }
    }

    /// Handle an end tag.
    fn close_element(&mut self, name: &str) {
        let offset = self.offset();
        if tags::is_void(name) {
            self.issues
                .warn(format!("end tag for void element </{name}> ignored"), offset);
            return;
        }

        let Some(index) = self
            .stack_of_open_elements
            .iter()
            .rposition(|&id| self.builder.tag_name(id) == Some(name))
        else {
            self.issues
                .warn(format!("stray end tag </{name}> ignored"), offset);
            return;
        };

        for &id in &self.stack_of_open_elements[index + 1..] {
            let open = self.builder.tag_name(id).unwrap_or_default();
            if !has_optional_end_tag(open) {
                self.issues.warn(
                    format!("implicitly closing <{open}> before </{name}>"),
                    offset,
                );
            }
        }
        self.stack_of_open_elements.truncate(index);
    }

    fn close_open_elements_at_eof(&mut self) {
        let offset = self.tokens.position();
        while let Some(id) = self.stack_of_open_elements.pop() {
            let open = self.builder.tag_name(id).unwrap_or_default();
            if !has_optional_end_tag(open) {
                self.issues
                    .warn(format!("unclosed <{open}> at end of input"), offset);
            }
        }
    }
}

fn has_optional_end_tag(name: &str) -> bool {
    tags::tag_info(name).is_some_and(|info| info.end_tag == EndTag::Optional)
}
