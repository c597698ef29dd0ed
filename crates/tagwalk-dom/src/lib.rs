//! Document tree for the tagwalk parser.
//!
//! This crate provides an arena-based node tree. Nodes live in a single
//! vector and refer to each other through [`NodeId`] indices, giving O(1)
//! navigation in every direction without reference counting or raw
//! pointers.
//!
//! # Design
//!
//! - [`DocumentBuilder`] is the only way to create nodes. It appends each
//!   new node as the last child of an existing one, so the tree is always
//!   acyclic and single-parented.
//! - [`Document`] is the frozen result. Its traversal surface (`root`,
//!   `next`, `children`, `name`, `kind`, `text`, `attribute`,
//!   `attributes`) only reads.
//! - Attribute name indexes and document positions are computed during
//!   building, so a `Document` can be shared across threads without locks.

mod builder;
mod document;
mod node;

pub use builder::DocumentBuilder;
pub use document::{AncestorIterator, ChildIterator, DescendantIterator, Document};
pub use node::{Attribute, Attributes, ElementData, Node, NodeData, NodeId, NodeKind};
pub use tagwalk_common::Diagnostic;
