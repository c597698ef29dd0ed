//! The immutable, read-only document surface.

use std::sync::LazyLock;

use tagwalk_common::Diagnostic;

use crate::node::{Attributes, ElementData, Node, NodeData, NodeId, NodeKind};

/// Returned by [`Document::attributes`] for nodes that are not elements.
static NO_ATTRIBUTES: LazyLock<Attributes> = LazyLock::new(Attributes::new);

/// A parsed document: an arena of nodes rooted at the Document node.
///
/// A `Document` is only produced by [`DocumentBuilder::finish`](crate::DocumentBuilder::finish)
/// and never changes afterwards. Everything it holds is plain owned data,
/// so it is `Send + Sync` and can be queried from several threads at once.
/// Dropping the `Document` releases every node.
#[derive(Debug, Clone)]
pub struct Document {
    pub(crate) nodes: Vec<Node>,
    /// Pre-order position of each node, indexed by `NodeId`.
    pub(crate) positions: Vec<usize>,
    pub(crate) doctype: Option<String>,
    pub(crate) encoding: &'static str,
    pub(crate) diagnostics: Vec<Diagnostic>,
}

impl Document {
    /// The Document node that owns all top-level nodes.
    #[must_use]
    pub const fn document_node(&self) -> NodeId {
        NodeId::DOCUMENT
    }

    /// The root node: the first top-level element, or the first top-level
    /// node of any kind when the input had no elements.
    ///
    /// A finished document always has at least one top-level node.
    #[must_use]
    pub fn root(&self) -> NodeId {
        let mut first = None;
        for id in self.child_nodes(NodeId::DOCUMENT) {
            if self.kind(id) == NodeKind::Element {
                return id;
            }
            first = first.or(Some(id));
        }
        first.unwrap_or(NodeId::DOCUMENT)
    }

    /// Get a node by its id.
    #[must_use]
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    /// Number of nodes, including the Document node.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True if the arena holds only the Document node.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    /// The next sibling of `id`, or `None` if it is the last child.
    #[must_use]
    pub fn next(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.next_sibling)
    }

    /// The previous sibling of `id`.
    #[must_use]
    pub fn prev(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.prev_sibling)
    }

    /// The first child of `id`, or `None` if it has no children.
    ///
    /// Walk the remaining children with [`next`](Self::next).
    #[must_use]
    pub fn children(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.first_child)
    }

    /// The last child of `id`.
    #[must_use]
    pub fn last_child(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.last_child)
    }

    /// The parent of `id`; `None` for the Document node.
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.parent)
    }

    /// The kind of `id`. Unknown ids report [`NodeKind::Document`].
    #[must_use]
    pub fn kind(&self, id: NodeId) -> NodeKind {
        self.get(id).map_or(NodeKind::Document, Node::kind)
    }

    /// The tag name of an element; empty for every other kind.
    #[must_use]
    pub fn name(&self, id: NodeId) -> &str {
        self.as_element(id).map_or("", |e| e.tag_name.as_str())
    }

    /// The content of a Text node; empty for every other kind.
    #[must_use]
    pub fn text(&self, id: NodeId) -> &str {
        match self.get(id).map(|n| &n.data) {
            Some(NodeData::Text(s)) => s,
            _ => "",
        }
    }

    /// The content of a Comment node.
    #[must_use]
    pub fn comment(&self, id: NodeId) -> Option<&str> {
        match self.get(id).map(|n| &n.data) {
            Some(NodeData::Comment(s)) => Some(s),
            _ => None,
        }
    }

    /// Element data if `id` is an element.
    #[must_use]
    pub fn as_element(&self, id: NodeId) -> Option<&ElementData> {
        match self.get(id).map(|n| &n.data) {
            Some(NodeData::Element(data)) => Some(data),
            _ => None,
        }
    }

    /// Value of attribute `name` on element `id`.
    #[must_use]
    pub fn attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        self.as_element(id).and_then(|e| e.attrs.get(name))
    }

    /// All attributes of `id` in source order; empty for non-elements.
    #[must_use]
    pub fn attributes(&self, id: NodeId) -> &Attributes {
        match self.as_element(id) {
            Some(element) => &element.attrs,
            None => &NO_ATTRIBUTES,
        }
    }

    /// Concatenated text of every Text node under `id` (or of `id` itself).
    ///
    /// Comments contribute their data only when `id` is the comment.
    #[must_use]
    pub fn text_content(&self, id: NodeId) -> String {
        match self.get(id).map(|n| &n.data) {
            Some(NodeData::Text(s) | NodeData::Comment(s)) => s.clone(),
            Some(_) => self
                .descendants(id)
                .filter_map(|d| match &self.nodes[d.0].data {
                    NodeData::Text(s) => Some(s.as_str()),
                    _ => None,
                })
                .collect(),
            None => String::new(),
        }
    }

    /// Position of `id` in a depth-first, pre-order walk (the Document is 0).
    #[must_use]
    pub fn document_position(&self, id: NodeId) -> usize {
        self.positions.get(id.0).copied().unwrap_or(usize::MAX)
    }

    /// The name from a `<!DOCTYPE name>` declaration, if there was one.
    #[must_use]
    pub fn doctype(&self) -> Option<&str> {
        self.doctype.as_deref()
    }

    /// The encoding the input bytes were decoded with.
    #[must_use]
    pub const fn encoding(&self) -> &'static str {
        self.encoding
    }

    /// The charset declared by the first `<meta>` element that declares one.
    ///
    /// Looks at `<meta charset>` and at the `charset=` parameter of
    /// `<meta http-equiv="Content-Type" content="...">`.
    #[must_use]
    pub fn meta_encoding(&self) -> Option<&str> {
        self.descendants(NodeId::DOCUMENT)
            .filter_map(|id| self.as_element(id))
            .filter(|e| e.tag_name == "meta")
            .find_map(|e| {
                if let Some(charset) = e.attrs.get("charset") {
                    return Some(charset.trim());
                }
                let equiv = e.attrs.get("http-equiv")?;
                if !equiv.eq_ignore_ascii_case("content-type") {
                    return None;
                }
                let content = e.attrs.get("content")?;
                let lower = content.to_ascii_lowercase();
                let start = lower.find("charset=")? + "charset=".len();
                let value = content[start..]
                    .split(';')
                    .next()?
                    .trim()
                    .trim_matches(['"', '\'']);
                (!value.is_empty()).then_some(value)
            })
    }

    /// Recoverable issues found while parsing, unless they were suppressed.
    #[must_use]
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Iterate the children of `id` in order.
    #[must_use]
    pub const fn child_nodes(&self, id: NodeId) -> ChildIterator<'_> {
        ChildIterator {
            doc: self,
            next: None,
            parent: Some(id),
        }
    }

    /// Iterate every node strictly below `id` in document order.
    #[must_use]
    pub fn descendants(&self, id: NodeId) -> DescendantIterator<'_> {
        DescendantIterator {
            doc: self,
            root: id,
            next: self.children(id),
        }
    }

    /// Iterate the ancestors of `id`, from its parent up to the Document node.
    #[must_use]
    pub fn ancestors(&self, id: NodeId) -> AncestorIterator<'_> {
        AncestorIterator {
            doc: self,
            current: self.parent(id),
        }
    }
}

/// Iterator over the children of a node.
pub struct ChildIterator<'a> {
    doc: &'a Document,
    next: Option<NodeId>,
    /// Set until the first call, which starts at the parent's first child.
    parent: Option<NodeId>,
}

impl Iterator for ChildIterator<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(parent) = self.parent.take() {
            self.next = self.doc.children(parent);
        }
        let id = self.next?;
        self.next = self.doc.next(id);
        Some(id)
    }
}

/// Pre-order iterator over the descendants of a node.
pub struct DescendantIterator<'a> {
    doc: &'a Document,
    root: NodeId,
    next: Option<NodeId>,
}

impl Iterator for DescendantIterator<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.next?;

        self.next = self.doc.children(id).or_else(|| {
            // Climb until some ancestor below the root has a next sibling.
            let mut current = id;
            loop {
                if current == self.root {
                    return None;
                }
                if let Some(sibling) = self.doc.next(current) {
                    return Some(sibling);
                }
                current = self.doc.parent(current)?;
            }
        });
        Some(id)
    }
}

/// Iterator over ancestors of a node.
pub struct AncestorIterator<'a> {
    doc: &'a Document,
    current: Option<NodeId>,
}

impl Iterator for AncestorIterator<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.current?;
        self.current = self.doc.parent(id);
        Some(id)
    }
}
