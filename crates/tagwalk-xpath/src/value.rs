//! Query results and the `XPath` type conversions.

use strum_macros::{Display, IntoStaticStr};
use tagwalk_dom::{Document, NodeData, NodeId};

use crate::error::XPathError;

/// One member of a node-set.
///
/// Attributes are not arena nodes, so they are addressed through the
/// element that owns them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum XPathNode {
    /// A node in the document arena.
    Node(NodeId),
    /// The attribute at `index` (in source order) on element `owner`.
    Attribute {
        /// The element carrying the attribute.
        owner: NodeId,
        /// Position in the element's attribute list.
        index: usize,
    },
}

impl XPathNode {
    /// The arena node, or the owning element for an attribute.
    #[must_use]
    pub const fn id(self) -> NodeId {
        match self {
            Self::Node(id) | Self::Attribute { owner: id, .. } => id,
        }
    }

    /// True for attribute members.
    #[must_use]
    pub const fn is_attribute(self) -> bool {
        matches!(self, Self::Attribute { .. })
    }

    /// Element tag name or attribute name; empty for other nodes.
    #[must_use]
    pub fn name(self, doc: &Document) -> &str {
        match self {
            Self::Node(id) => doc.name(id),
            Self::Attribute { owner, index } => doc
                .attributes(owner)
                .get_index(index)
                .map_or("", |a| a.name.as_str()),
        }
    }

    /// The `XPath` string-value: descendant text for elements and the
    /// document, the data of text and comment nodes, an attribute's value.
    #[must_use]
    pub fn string_value(self, doc: &Document) -> String {
        match self {
            Self::Node(id) => doc.text_content(id),
            Self::Attribute { owner, index } => doc
                .attributes(owner)
                .get_index(index)
                .map(|a| a.value.clone())
                .unwrap_or_default(),
        }
    }

    /// Sort key for document order. Attributes follow their owner and
    /// precede its children.
    pub(crate) fn order_key(self, doc: &Document) -> (usize, usize) {
        match self {
            Self::Node(id) => (doc.document_position(id), 0),
            Self::Attribute { owner, index } => (doc.document_position(owner), index + 1),
        }
    }
}

/// Put a node-set in document order and drop duplicates.
pub(crate) fn sort_document_order(doc: &Document, nodes: &mut Vec<XPathNode>) {
    nodes.sort_by_key(|n| n.order_key(doc));
    nodes.dedup();
}

/// The variant tag of a [`QueryResult`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, IntoStaticStr)]
#[strum(serialize_all = "kebab-case")]
pub enum ResultKind {
    /// A node-set.
    NodeSet,
    /// A boolean.
    Boolean,
    /// A number.
    Number,
    /// A string.
    String,
}

/// The value of an evaluated expression.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryResult {
    /// Nodes in document order, without duplicates.
    NodeSet(Vec<XPathNode>),
    /// A boolean.
    Boolean(bool),
    /// An IEEE 754 double.
    Number(f64),
    /// A string.
    String(String),
}

impl QueryResult {
    /// Which variant this is.
    #[must_use]
    pub const fn kind(&self) -> ResultKind {
        match self {
            Self::NodeSet(_) => ResultKind::NodeSet,
            Self::Boolean(_) => ResultKind::Boolean,
            Self::Number(_) => ResultKind::Number,
            Self::String(_) => ResultKind::String,
        }
    }

    const fn mismatch(&self, expected: ResultKind) -> XPathError {
        XPathError::TypeMismatch {
            expected,
            found: self.kind(),
        }
    }

    /// The node-set.
    ///
    /// # Errors
    ///
    /// [`XPathError::TypeMismatch`] if this is not a node-set.
    pub fn nodes(&self) -> Result<&[XPathNode], XPathError> {
        match self {
            Self::NodeSet(nodes) => Ok(nodes),
            _ => Err(self.mismatch(ResultKind::NodeSet)),
        }
    }

    /// The boolean.
    ///
    /// # Errors
    ///
    /// [`XPathError::TypeMismatch`] if this is not a boolean.
    pub const fn boolean(&self) -> Result<bool, XPathError> {
        match self {
            Self::Boolean(b) => Ok(*b),
            _ => Err(self.mismatch(ResultKind::Boolean)),
        }
    }

    /// The number.
    ///
    /// # Errors
    ///
    /// [`XPathError::TypeMismatch`] if this is not a number.
    pub const fn number(&self) -> Result<f64, XPathError> {
        match self {
            Self::Number(n) => Ok(*n),
            _ => Err(self.mismatch(ResultKind::Number)),
        }
    }

    /// The string.
    ///
    /// # Errors
    ///
    /// [`XPathError::TypeMismatch`] if this is not a string.
    pub fn string(&self) -> Result<&str, XPathError> {
        match self {
            Self::String(s) => Ok(s),
            _ => Err(self.mismatch(ResultKind::String)),
        }
    }

    /// Convert to a string the way `string()` does. An empty node-set
    /// gives `""`; otherwise the first node's string-value is used.
    #[must_use]
    pub fn to_string_value(&self, doc: &Document) -> String {
        match self {
            Self::NodeSet(nodes) => nodes
                .first()
                .map(|n| n.string_value(doc))
                .unwrap_or_default(),
            Self::Boolean(b) => b.to_string(),
            Self::Number(n) => format_number(*n),
            Self::String(s) => s.clone(),
        }
    }

    /// Convert to a number the way `number()` does.
    #[must_use]
    pub fn to_number(&self, doc: &Document) -> f64 {
        match self {
            Self::NodeSet(_) => parse_number(&self.to_string_value(doc)),
            Self::Boolean(b) => f64::from(u8::from(*b)),
            Self::Number(n) => *n,
            Self::String(s) => parse_number(s),
        }
    }

    /// Convert to a boolean the way `boolean()` does.
    #[must_use]
    pub fn to_boolean(&self) -> bool {
        match self {
            Self::NodeSet(nodes) => !nodes.is_empty(),
            Self::Boolean(b) => *b,
            Self::Number(n) => *n != 0.0 && !n.is_nan(),
            Self::String(s) => !s.is_empty(),
        }
    }
}

/// Format a number as `XPath` does: integers without a fraction,
/// `NaN`, `Infinity` and `-Infinity` spelled out, and no exponent.
///
/// ```
/// use tagwalk_xpath::format_number;
///
/// assert_eq!(format_number(2.0), "2");
/// assert_eq!(format_number(-1.5), "-1.5");
/// assert_eq!(format_number(f64::NAN), "NaN");
/// assert_eq!(format_number(-0.0), "0");
/// ```
#[must_use]
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        String::from(if n > 0.0 { "Infinity" } else { "-Infinity" })
    } else if n == 0.0 {
        "0".to_string()
    } else {
        n.to_string()
    }
}

/// Parse a string as an `XPath` number: optional surrounding whitespace,
/// an optional minus, digits with an optional fraction. Anything else is
/// `NaN`.
#[must_use]
pub fn parse_number(s: &str) -> f64 {
    let trimmed = s.trim_matches(|c: char| matches!(c, ' ' | '\t' | '\n' | '\r'));
    let digits = trimmed.strip_prefix('-').unwrap_or(trimmed);
    let valid = !digits.is_empty()
        && digits != "."
        && digits.chars().all(|c| c.is_ascii_digit() || c == '.')
        && digits.chars().filter(|&c| c == '.').count() <= 1;
    if valid {
        trimmed.parse().unwrap_or(f64::NAN)
    } else {
        f64::NAN
    }
}

/// Look up the node data behind a node-set member, if it is an arena node.
pub(crate) fn node_data(doc: &Document, node: XPathNode) -> Option<&NodeData> {
    match node {
        XPathNode::Node(id) => doc.get(id).map(|n| &n.data),
        XPathNode::Attribute { .. } => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_parse_like_xpath() {
        assert!((parse_number(" 42 ") - 42.0).abs() < f64::EPSILON);
        assert!((parse_number("-1.5") + 1.5).abs() < f64::EPSILON);
        assert!((parse_number(".5") - 0.5).abs() < f64::EPSILON);
        assert!(parse_number("1e3").is_nan());
        assert!(parse_number("+1").is_nan());
        assert!(parse_number("").is_nan());
        assert!(parse_number(".").is_nan());
        assert!(parse_number("1.2.3").is_nan());
    }

    #[test]
    fn numbers_format_like_xpath() {
        assert_eq!(format_number(1.0), "1");
        assert_eq!(format_number(0.25), "0.25");
        assert_eq!(format_number(1e21), "1000000000000000000000");
        assert_eq!(format_number(f64::INFINITY), "Infinity");
        assert_eq!(format_number(f64::NEG_INFINITY), "-Infinity");
    }

    #[test]
    fn accessors_check_the_variant() {
        let result = QueryResult::Number(2.0);
        assert_eq!(result.number(), Ok(2.0));
        assert_eq!(
            result.boolean(),
            Err(XPathError::TypeMismatch {
                expected: ResultKind::Boolean,
                found: ResultKind::Number,
            })
        );
        assert!(result.nodes().is_err());
        assert!(result.string().is_err());
    }

    #[test]
    fn booleans() {
        assert!(!QueryResult::Number(f64::NAN).to_boolean());
        assert!(!QueryResult::NodeSet(vec![]).to_boolean());
        assert!(QueryResult::String("false".to_string()).to_boolean());
        assert!(!QueryResult::String(String::new()).to_boolean());
    }
}
