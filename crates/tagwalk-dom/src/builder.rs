//! Mutable construction of a [`Document`].

use tagwalk_common::Diagnostic;

use crate::document::Document;
use crate::node::{ElementData, Node, NodeData, NodeId};

/// Builds a document tree by appending nodes under existing parents.
///
/// Nodes can only be created already attached as the last child of an
/// existing node, which keeps the tree acyclic and gives every node
/// exactly one parent. Call [`finish`](Self::finish) to freeze it.
#[derive(Debug)]
pub struct DocumentBuilder {
    nodes: Vec<Node>,
    doctype: Option<String>,
    encoding: &'static str,
    diagnostics: Vec<Diagnostic>,
}

impl DocumentBuilder {
    /// Create a builder holding just the Document node.
    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::detached(NodeData::Document)],
            doctype: None,
            encoding: "UTF-8",
            diagnostics: Vec::new(),
        }
    }

    /// Get a node by its id.
    #[must_use]
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    /// Tag name of `id` if it is an element.
    #[must_use]
    pub fn tag_name(&self, id: NodeId) -> Option<&str> {
        match self.get(id).map(|n| &n.data) {
            Some(NodeData::Element(data)) => Some(&data.tag_name),
            _ => None,
        }
    }

    /// True if `id` has at least one child.
    #[must_use]
    pub fn has_children(&self, id: NodeId) -> bool {
        self.get(id).is_some_and(|n| n.first_child.is_some())
    }

    /// Number of nodes allocated so far, including the Document node.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True if only the Document node exists.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    /// Append a new element as the last child of `parent`.
    pub fn append_element(&mut self, parent: NodeId, element: ElementData) -> NodeId {
        self.append(parent, NodeData::Element(element))
    }

    /// Append a comment as the last child of `parent`. Comments are never merged.
    pub fn append_comment(&mut self, parent: NodeId, data: String) -> NodeId {
        self.append(parent, NodeData::Comment(data))
    }

    /// Append text under `parent`.
    ///
    /// With `merge` set and a Text node as `parent`'s last child, the data
    /// is appended to that node instead and its id is returned.
    pub fn append_text(&mut self, parent: NodeId, data: &str, merge: bool) -> NodeId {
        if merge
            && let Some(last) = self.nodes[parent.0].last_child
            && let NodeData::Text(existing) = &mut self.nodes[last.0].data
        {
            existing.push_str(data);
            return last;
        }
        self.append(parent, NodeData::Text(data.to_string()))
    }

    /// Record the `<!DOCTYPE>` name.
    pub fn set_doctype(&mut self, name: String) {
        self.doctype = Some(name);
    }

    /// Record the encoding the input was decoded with.
    pub const fn set_encoding(&mut self, encoding: &'static str) {
        self.encoding = encoding;
    }

    /// Attach the diagnostics gathered while building.
    pub fn set_diagnostics(&mut self, diagnostics: Vec<Diagnostic>) {
        self.diagnostics = diagnostics;
    }

    /// [§ 4.2.2 Append](https://dom.spec.whatwg.org/#concept-node-append)
    ///
    /// "To append a node to a parent, pre-insert node into parent before null."
    fn append(&mut self, parent: NodeId, data: NodeData) -> NodeId {
        let id = NodeId(self.nodes.len());
        let prev_last_child = self.nodes[parent.0].last_child;

        let mut node = Node::detached(data);
        node.parent = Some(parent);
        node.prev_sibling = prev_last_child;
        self.nodes.push(node);

        if let Some(prev) = prev_last_child {
            self.nodes[prev.0].next_sibling = Some(id);
        } else {
            self.nodes[parent.0].first_child = Some(id);
        }
        self.nodes[parent.0].last_child = Some(id);
        id
    }

    /// Freeze the tree into a read-only [`Document`].
    ///
    /// Document positions are computed here, once, so readers never write.
    #[must_use]
    pub fn finish(self) -> Document {
        let mut positions = vec![usize::MAX; self.nodes.len()];
        let mut stack = vec![NodeId::DOCUMENT];
        let mut position = 0;

        while let Some(id) = stack.pop() {
            positions[id.0] = position;
            position += 1;

            // Push children last-to-first so the first child is visited next.
            let mut child = self.nodes[id.0].last_child;
            while let Some(c) = child {
                stack.push(c);
                child = self.nodes[c.0].prev_sibling;
            }
        }

        Document {
            nodes: self.nodes,
            positions,
            doctype: self.doctype,
            encoding: self.encoding,
            diagnostics: self.diagnostics,
        }
    }
}

impl Default for DocumentBuilder {
    fn default() -> Self {
        Self::new()
    }
}
