//! Compiled form of an `XPath` expression.

use strum_macros::{Display, EnumString, IntoStaticStr};

/// An expression node.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// A number literal.
    Number(f64),
    /// A string literal.
    Literal(String),
    /// A binary operation.
    Binary {
        /// The operator.
        op: BinaryOp,
        /// Left operand.
        left: Box<Expr>,
        /// Right operand.
        right: Box<Expr>,
    },
    /// Unary minus.
    Negate(Box<Expr>),
    /// `left | right`.
    Union(Box<Expr>, Box<Expr>),
    /// A function call.
    Function {
        /// The function name.
        name: String,
        /// Arguments in order.
        args: Vec<Expr>,
    },
    /// A primary expression with predicates, e.g. `(//a)[1]`.
    Filter {
        /// The filtered expression.
        primary: Box<Expr>,
        /// Predicates applied in order.
        predicates: Vec<Expr>,
    },
    /// A location path.
    Path {
        /// Where the path starts.
        start: PathStart,
        /// The steps, applied left to right.
        steps: Vec<Step>,
    },
}

/// Starting point of a location path.
#[derive(Debug, Clone, PartialEq)]
pub enum PathStart {
    /// A relative path starts at the context node.
    Context,
    /// An absolute path starts at the Document node.
    Root,
    /// A filter expression followed by `/` or `//`.
    Expr(Box<Expr>),
}

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum BinaryOp {
    /// `or`
    #[strum(serialize = "or")]
    Or,
    /// `and`
    #[strum(serialize = "and")]
    And,
    /// `=`
    #[strum(serialize = "=")]
    Eq,
    /// `!=`
    #[strum(serialize = "!=")]
    Neq,
    /// `<`
    #[strum(serialize = "<")]
    Lt,
    /// `<=`
    #[strum(serialize = "<=")]
    Lte,
    /// `>`
    #[strum(serialize = ">")]
    Gt,
    /// `>=`
    #[strum(serialize = ">=")]
    Gte,
    /// `+`
    #[strum(serialize = "+")]
    Add,
    /// `-`
    #[strum(serialize = "-")]
    Sub,
    /// `*`
    #[strum(serialize = "*")]
    Mul,
    /// `div`
    #[strum(serialize = "div")]
    Div,
    /// `mod`
    #[strum(serialize = "mod")]
    Mod,
}

/// One location step: `axis::test[predicate]...`.
#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    /// Direction of travel.
    pub axis: Axis,
    /// Which nodes on the axis are kept.
    pub test: NodeTest,
    /// Predicates applied in order.
    pub predicates: Vec<Expr>,
}

impl Step {
    /// The step `//` abbreviates: `descendant-or-self::node()`.
    #[must_use]
    pub const fn descendant_or_self() -> Self {
        Self {
            axis: Axis::DescendantOrSelf,
            test: NodeTest::Node,
            predicates: Vec::new(),
        }
    }
}

/// The supported axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, IntoStaticStr)]
#[strum(serialize_all = "kebab-case")]
pub enum Axis {
    /// Children of the context node.
    Child,
    /// All nodes below the context node.
    Descendant,
    /// The context node and everything below it.
    DescendantOrSelf,
    /// The context node.
    #[strum(serialize = "self")]
    SelfNode,
    /// The parent.
    Parent,
    /// Every node above the context node.
    Ancestor,
    /// The context node and every node above it.
    AncestorOrSelf,
    /// Later siblings.
    FollowingSibling,
    /// Earlier siblings.
    PrecedingSibling,
    /// Nodes after the context node in document order, minus descendants.
    Following,
    /// Nodes before the context node in document order, minus ancestors.
    Preceding,
    /// Attributes of an element.
    Attribute,
}

impl Axis {
    /// Reverse axes number their nodes nearest-first for predicates.
    #[must_use]
    pub const fn is_reverse(self) -> bool {
        matches!(
            self,
            Self::Ancestor | Self::AncestorOrSelf | Self::PrecedingSibling | Self::Preceding
        )
    }
}

/// Node tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeTest {
    /// Elements (or attributes on the attribute axis) with this name.
    Name(String),
    /// `*`: any element, or any attribute on the attribute axis.
    Wildcard,
    /// `text()`
    Text,
    /// `comment()`
    Comment,
    /// `node()`: anything.
    Node,
}
