//! `XPath` 1.0 queries over `tagwalk` documents.
//!
//! Expressions compile once into a [`Query`] and can then run against any
//! number of documents and context nodes.
//!
//! ```
//! use tagwalk_xpath::{Query, XPathExt};
//!
//! let doc = tagwalk_html::parse("<div>hey<span>txt</span></div><div></div>")?;
//!
//! let count = Query::compile("count(//div)")?;
//! assert_eq!(count.evaluate(&doc)?.number()?, 2.0);
//!
//! let text = doc.xpath("string(//div/*)")?;
//! assert_eq!(text.string()?, "txt");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Scope
//!
//! Location paths over the child, descendant, parent, ancestor, sibling,
//! following, preceding, self and attribute axes, with predicates,
//! unions, arithmetic, comparisons and the core function library for
//! node-sets, strings, booleans and numbers.
//!
//! Expressions nested deeper than [`MAX_EXPRESSION_DEPTH`] are rejected
//! at compile time with [`XPathError::Syntax`].
//!
//! # Not Implemented
//!
//! Variables, namespaces, the `namespace` axis, `processing-instruction()`
//! and the `id`, `lang`, `substring*` and `translate` functions.

mod ast;
mod error;
mod eval;
mod lexer;
mod parser;
mod value;

use std::fmt;
use std::str::FromStr;

use tagwalk_dom::{Document, NodeId};

pub use ast::{Axis, BinaryOp, Expr, NodeTest, PathStart, Step};
pub use error::XPathError;
pub use parser::MAX_EXPRESSION_DEPTH;
pub use value::{QueryResult, ResultKind, XPathNode, format_number, parse_number};

use eval::Evaluator;

/// A compiled `XPath` expression.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    source: String,
    expr: Expr,
}

impl Query {
    /// Compile an expression.
    ///
    /// # Errors
    ///
    /// [`XPathError::Syntax`] if the expression is malformed.
    pub fn compile(expr: &str) -> Result<Self, XPathError> {
        Ok(Self {
            source: expr.to_string(),
            expr: parser::parse(expr)?,
        })
    }

    /// The expression text this query was compiled from.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// The compiled expression tree.
    #[must_use]
    pub const fn expr(&self) -> &Expr {
        &self.expr
    }

    /// Evaluate with the Document node as the context node.
    ///
    /// # Errors
    ///
    /// [`XPathError::Evaluation`] if the expression cannot be evaluated.
    pub fn evaluate(&self, doc: &Document) -> Result<QueryResult, XPathError> {
        self.evaluate_at(doc, doc.document_node())
    }

    /// Evaluate with `node` as the context node.
    ///
    /// # Errors
    ///
    /// [`XPathError::Evaluation`] if the expression cannot be evaluated.
    pub fn evaluate_at(&self, doc: &Document, node: NodeId) -> Result<QueryResult, XPathError> {
        Evaluator::new(doc).evaluate(&self.expr, node)
    }
}

impl FromStr for Query {
    type Err = XPathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::compile(s)
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

/// Compile and evaluate `expr` against `doc` in one call.
///
/// # Errors
///
/// Any [`XPathError`] from compiling or evaluating.
pub fn evaluate(doc: &Document, expr: &str) -> Result<QueryResult, XPathError> {
    Query::compile(expr)?.evaluate(doc)
}

/// Compile and evaluate `expr` with `node` as the context node.
///
/// # Errors
///
/// Any [`XPathError`] from compiling or evaluating.
pub fn evaluate_at(doc: &Document, node: NodeId, expr: &str) -> Result<QueryResult, XPathError> {
    Query::compile(expr)?.evaluate_at(doc, node)
}

/// `XPath` queries as a method on [`Document`].
pub trait XPathExt {
    /// Compile and evaluate `expr` with the Document node as context.
    ///
    /// # Errors
    ///
    /// Any [`XPathError`] from compiling or evaluating.
    fn xpath(&self, expr: &str) -> Result<QueryResult, XPathError>;
}

impl XPathExt for Document {
    fn xpath(&self, expr: &str) -> Result<QueryResult, XPathError> {
        evaluate(self, expr)
    }
}
