//! Node types stored in the document arena.

use std::collections::HashMap;
use std::fmt;

use strum_macros::{Display, EnumString, IntoStaticStr};

/// A type-safe index into a [`Document`](crate::Document) arena.
///
/// Ids are stable for the lifetime of the document. Use
/// [`Document::document_position`](crate::Document::document_position)
/// rather than comparing ids when document order matters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub usize);

impl NodeId {
    /// The Document node is always at index 0.
    pub const DOCUMENT: Self = Self(0);

    /// The raw arena index.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// What kind of node a [`Node`] is.
///
/// The numeric [`code`](NodeKind::code) values follow the DOM `nodeType`
/// constants, which is also what libxml2 reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, IntoStaticStr)]
#[strum(serialize_all = "lowercase")]
pub enum NodeKind {
    /// An element with a tag name and attributes.
    Element,
    /// A run of character data.
    Text,
    /// A `<!-- ... -->` comment.
    Comment,
    /// The document node that owns the top-level nodes.
    Document,
}

impl NodeKind {
    /// The DOM `nodeType` number for this kind.
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Self::Element => 1,
            Self::Text => 3,
            Self::Comment => 8,
            Self::Document => 9,
        }
    }
}

/// A single `name="value"` pair on an element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    /// Attribute name, lowercased by the HTML tokenizer.
    pub name: String,
    /// Attribute value with character references resolved.
    pub value: String,
}

impl Attribute {
    /// Create a new attribute with the given name and value.
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Insertion-ordered attribute map with unique names.
///
/// The name index is built when the map is built, so lookups are O(1) and
/// a finished document can be read from many threads without locking.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attributes {
    entries: Vec<Attribute>,
    index: HashMap<String, usize>,
}

impl Attributes {
    /// An empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an attribute unless one with the same name exists.
    ///
    /// Returns `false` (and keeps the first value) on a duplicate name.
    pub fn insert(&mut self, attribute: Attribute) -> bool {
        if self.index.contains_key(&attribute.name) {
            return false;
        }
        let _ = self
            .index
            .insert(attribute.name.clone(), self.entries.len());
        self.entries.push(attribute);
        true
    }

    /// Value of the attribute called `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.index
            .get(name)
            .map(|&i| self.entries[i].value.as_str())
    }

    /// True if an attribute called `name` exists.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// The attribute at `position` in source order.
    #[must_use]
    pub fn get_index(&self, position: usize) -> Option<&Attribute> {
        self.entries.get(position)
    }

    /// Number of attributes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if there are no attributes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate attributes in source order.
    pub fn iter(&self) -> std::slice::Iter<'_, Attribute> {
        self.entries.iter()
    }
}

impl FromIterator<Attribute> for Attributes {
    fn from_iter<I: IntoIterator<Item = Attribute>>(iter: I) -> Self {
        let mut attributes = Self::new();
        for attribute in iter {
            let _ = attributes.insert(attribute);
        }
        attributes
    }
}

impl<'a> IntoIterator for &'a Attributes {
    type Item = &'a Attribute;
    type IntoIter = std::slice::Iter<'a, Attribute>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl fmt::Display for Attributes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, attr) in self.entries.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}: {:?}", attr.name, attr.value)?;
        }
        f.write_str("}")
    }
}

/// Element-specific data.
#[derive(Debug, Clone)]
pub struct ElementData {
    /// Lowercased tag name.
    pub tag_name: String,
    /// Attributes in source order.
    pub attrs: Attributes,
}

impl ElementData {
    /// Create element data from a tag name and attributes.
    #[must_use]
    pub fn new(tag_name: impl Into<String>, attrs: Attributes) -> Self {
        Self {
            tag_name: tag_name.into(),
            attrs,
        }
    }
}

/// Payload of a node, tagged by kind.
#[derive(Debug, Clone)]
pub enum NodeData {
    /// The document node.
    Document,
    /// An element.
    Element(ElementData),
    /// Character data.
    Text(String),
    /// Comment data, without the `<!--` and `-->` delimiters.
    Comment(String),
}

impl NodeData {
    /// The kind tag of this payload.
    #[must_use]
    pub const fn kind(&self) -> NodeKind {
        match self {
            Self::Document => NodeKind::Document,
            Self::Element(_) => NodeKind::Element,
            Self::Text(_) => NodeKind::Text,
            Self::Comment(_) => NodeKind::Comment,
        }
    }
}

/// One node in the arena together with its tree links.
///
/// Every link is an index; a node is owned by exactly one parent (or, for
/// the Document node, by the arena itself).
#[derive(Debug, Clone)]
pub struct Node {
    /// Kind-specific payload.
    pub data: NodeData,
    /// Parent node, `None` only for the Document node.
    pub parent: Option<NodeId>,
    /// First child, if any.
    pub first_child: Option<NodeId>,
    /// Last child, if any.
    pub last_child: Option<NodeId>,
    /// Next sibling in insertion order.
    pub next_sibling: Option<NodeId>,
    /// Previous sibling in insertion order.
    pub prev_sibling: Option<NodeId>,
}

impl Node {
    pub(crate) const fn detached(data: NodeData) -> Self {
        Self {
            data,
            parent: None,
            first_child: None,
            last_child: None,
            next_sibling: None,
            prev_sibling: None,
        }
    }

    /// The kind of this node.
    #[must_use]
    pub const fn kind(&self) -> NodeKind {
        self.data.kind()
    }
}
