//! Tree-walking evaluator for compiled expressions.

use tagwalk_dom::{Document, NodeData, NodeId};

use crate::ast::{Axis, BinaryOp, Expr, NodeTest, PathStart, Step};
use crate::error::XPathError;
use crate::value::{QueryResult, XPathNode, node_data, parse_number, sort_document_order};

/// The evaluation context: a node plus its position in the current
/// node-set (1-based) and that set's size.
#[derive(Debug, Clone, Copy)]
struct Context {
    node: XPathNode,
    position: usize,
    size: usize,
}

/// Evaluates expressions against one document.
pub(crate) struct Evaluator<'d> {
    doc: &'d Document,
}

impl<'d> Evaluator<'d> {
    pub(crate) const fn new(doc: &'d Document) -> Self {
        Self { doc }
    }

    /// Evaluate `expr` with `node` as the context node.
    pub(crate) fn evaluate(&self, expr: &Expr, node: NodeId) -> Result<QueryResult, XPathError> {
        let context = Context {
            node: XPathNode::Node(node),
            position: 1,
            size: 1,
        };
        self.eval(expr, context)
    }

    fn eval(&self, expr: &Expr, ctx: Context) -> Result<QueryResult, XPathError> {
        match expr {
            Expr::Number(n) => Ok(QueryResult::Number(*n)),
            Expr::Literal(s) => Ok(QueryResult::String(s.clone())),
            Expr::Negate(inner) => {
                let value = self.eval(inner, ctx)?;
                Ok(QueryResult::Number(-value.to_number(self.doc)))
            }
            Expr::Binary { op, left, right } => self.binary(*op, left, right, ctx),
            Expr::Union(left, right) => {
                let mut nodes = self.node_set(left, ctx, "|")?;
                nodes.extend(self.node_set(right, ctx, "|")?);
                sort_document_order(self.doc, &mut nodes);
                Ok(QueryResult::NodeSet(nodes))
            }
            Expr::Function { name, args } => self.function(name, args, ctx),
            Expr::Filter {
                primary,
                predicates,
            } => {
                let mut nodes = self.node_set(primary, ctx, "a predicate")?;
                for predicate in predicates {
                    nodes = self.filter(nodes, predicate)?;
                }
                Ok(QueryResult::NodeSet(nodes))
            }
            Expr::Path { start, steps } => {
                let mut nodes = match start {
                    PathStart::Context => vec![ctx.node],
                    PathStart::Root => vec![XPathNode::Node(self.doc.document_node())],
                    PathStart::Expr(inner) => self.node_set(inner, ctx, "a path step")?,
                };
                for step in steps {
                    nodes = self.step(&nodes, step)?;
                }
                Ok(QueryResult::NodeSet(nodes))
            }
        }
    }

    /// Evaluate `expr` and require a node-set, naming `used_by` otherwise.
    fn node_set(
        &self,
        expr: &Expr,
        ctx: Context,
        used_by: &str,
    ) -> Result<Vec<XPathNode>, XPathError> {
        match self.eval(expr, ctx)? {
            QueryResult::NodeSet(nodes) => Ok(nodes),
            other => Err(XPathError::evaluation(format!(
                "{used_by} needs a node-set, not a {}",
                other.kind()
            ))),
        }
    }

    // ========== Location steps ==========

    fn step(&self, input: &[XPathNode], step: &Step) -> Result<Vec<XPathNode>, XPathError> {
        let mut out = Vec::new();
        for &node in input {
            let mut candidates: Vec<XPathNode> = self
                .axis(node, step.axis)
                .into_iter()
                .filter(|&n| self.matches(n, step.axis, &step.test))
                .collect();
            if step.axis.is_reverse() {
                candidates.reverse();
            }
            for predicate in &step.predicates {
                candidates = self.filter(candidates, predicate)?;
            }
            out.extend(candidates);
        }
        sort_document_order(self.doc, &mut out);
        Ok(out)
    }

    /// Keep the nodes for which `predicate` holds. A numeric predicate
    /// holds when it equals the node's position.
    fn filter(
        &self,
        nodes: Vec<XPathNode>,
        predicate: &Expr,
    ) -> Result<Vec<XPathNode>, XPathError> {
        let size = nodes.len();
        let mut kept = Vec::with_capacity(size);
        for (index, node) in nodes.into_iter().enumerate() {
            let ctx = Context {
                node,
                position: index + 1,
                size,
            };
            let keep = match self.eval(predicate, ctx)? {
                #[allow(clippy::cast_precision_loss)]
                QueryResult::Number(n) => (n - ctx.position as f64).abs() < f64::EPSILON,
                other => other.to_boolean(),
            };
            if keep {
                kept.push(node);
            }
        }
        Ok(kept)
    }

    /// Nodes on `axis` from `node`, in document order.
    fn axis(&self, node: XPathNode, axis: Axis) -> Vec<XPathNode> {
        let doc = self.doc;
        let id = match node {
            XPathNode::Node(id) => id,
            XPathNode::Attribute { owner, .. } => {
                return match axis {
                    Axis::SelfNode | Axis::DescendantOrSelf => vec![node],
                    Axis::Parent => vec![XPathNode::Node(owner)],
                    Axis::Ancestor => self.ancestors_or_self(owner),
                    Axis::AncestorOrSelf => {
                        let mut nodes = self.ancestors_or_self(owner);
                        nodes.push(node);
                        nodes
                    }
                    Axis::Following => {
                        let mut nodes: Vec<_> =
                            doc.descendants(owner).map(XPathNode::Node).collect();
                        nodes.extend(self.axis(XPathNode::Node(owner), Axis::Following));
                        nodes
                    }
                    Axis::Preceding => self.axis(XPathNode::Node(owner), Axis::Preceding),
                    _ => Vec::new(),
                };
            }
        };

        match axis {
            Axis::Child => doc.child_nodes(id).map(XPathNode::Node).collect(),
            Axis::Descendant => doc.descendants(id).map(XPathNode::Node).collect(),
            Axis::DescendantOrSelf => std::iter::once(id)
                .chain(doc.descendants(id))
                .map(XPathNode::Node)
                .collect(),
            Axis::SelfNode => vec![node],
            Axis::Parent => doc.parent(id).map(XPathNode::Node).into_iter().collect(),
            Axis::Ancestor => doc.parent(id).map_or_else(Vec::new, |parent| {
                self.ancestors_or_self(parent)
            }),
            Axis::AncestorOrSelf => self.ancestors_or_self(id),
            Axis::FollowingSibling => {
                std::iter::successors(doc.next(id), |&n| doc.next(n))
                    .map(XPathNode::Node)
                    .collect()
            }
            Axis::PrecedingSibling => {
                let mut nodes: Vec<_> = std::iter::successors(doc.prev(id), |&n| doc.prev(n))
                    .map(XPathNode::Node)
                    .collect();
                nodes.reverse();
                nodes
            }
            Axis::Following | Axis::Preceding => {
                let sibling_of = if axis == Axis::Following {
                    Document::next
                } else {
                    Document::prev
                };
                let mut nodes = Vec::new();
                for start in std::iter::once(id).chain(doc.ancestors(id)) {
                    let siblings = std::iter::successors(sibling_of(doc, start), |&n| {
                        sibling_of(doc, n)
                    });
                    for sibling in siblings {
                        nodes.push(XPathNode::Node(sibling));
                        nodes.extend(doc.descendants(sibling).map(XPathNode::Node));
                    }
                }
                sort_document_order(doc, &mut nodes);
                nodes
            }
            Axis::Attribute => (0..doc.attributes(id).len())
                .map(|index| XPathNode::Attribute { owner: id, index })
                .collect(),
        }
    }

    /// `id` and its ancestors, root first.
    fn ancestors_or_self(&self, id: NodeId) -> Vec<XPathNode> {
        let mut nodes: Vec<_> = std::iter::once(id)
            .chain(self.doc.ancestors(id))
            .map(XPathNode::Node)
            .collect();
        nodes.reverse();
        nodes
    }

    /// Apply a node test. Names and `*` match the axis' principal node
    /// type: attributes on the attribute axis, elements elsewhere.
    fn matches(&self, node: XPathNode, axis: Axis, test: &NodeTest) -> bool {
        let data = node_data(self.doc, node);
        match test {
            NodeTest::Node => true,
            NodeTest::Text => matches!(data, Some(NodeData::Text(_))),
            NodeTest::Comment => matches!(data, Some(NodeData::Comment(_))),
            NodeTest::Wildcard if axis == Axis::Attribute => node.is_attribute(),
            NodeTest::Wildcard => matches!(data, Some(NodeData::Element(_))),
            NodeTest::Name(name) if axis == Axis::Attribute => {
                node.is_attribute() && node.name(self.doc) == name
            }
            NodeTest::Name(name) => {
                matches!(data, Some(NodeData::Element(e)) if e.tag_name == *name)
            }
        }
    }

    // ========== Operators ==========

    fn binary(
        &self,
        op: BinaryOp,
        left: &Expr,
        right: &Expr,
        ctx: Context,
    ) -> Result<QueryResult, XPathError> {
        match op {
            BinaryOp::Or => {
                let value = self.eval(left, ctx)?.to_boolean() || self.eval(right, ctx)?.to_boolean();
                Ok(QueryResult::Boolean(value))
            }
            BinaryOp::And => {
                let value = self.eval(left, ctx)?.to_boolean() && self.eval(right, ctx)?.to_boolean();
                Ok(QueryResult::Boolean(value))
            }
            BinaryOp::Eq
            | BinaryOp::Neq
            | BinaryOp::Lt
            | BinaryOp::Lte
            | BinaryOp::Gt
            | BinaryOp::Gte => {
                let l = self.eval(left, ctx)?;
                let r = self.eval(right, ctx)?;
                Ok(QueryResult::Boolean(self.compare(op, &l, &r)))
            }
            BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div | BinaryOp::Mod => {
                let l = self.eval(left, ctx)?.to_number(self.doc);
                let r = self.eval(right, ctx)?.to_number(self.doc);
                let value = match op {
                    BinaryOp::Add => l + r,
                    BinaryOp::Sub => l - r,
                    BinaryOp::Mul => l * r,
                    BinaryOp::Div => l / r,
                    _ => l % r,
                };
                Ok(QueryResult::Number(value))
            }
        }
    }

    /// `XPath` 1.0 comparison. Node-sets compare true when any member
    /// satisfies the comparison.
    fn compare(&self, op: BinaryOp, left: &QueryResult, right: &QueryResult) -> bool {
        let doc = self.doc;
        match (left, right) {
            (QueryResult::NodeSet(l), QueryResult::NodeSet(r)) => {
                let rights: Vec<String> = r.iter().map(|n| n.string_value(doc)).collect();
                l.iter().any(|a| {
                    let a = a.string_value(doc);
                    rights.iter().any(|b| compare_strings(op, &a, b))
                })
            }
            (QueryResult::NodeSet(nodes), other) => self.compare_set(op, nodes, other, false),
            (other, QueryResult::NodeSet(nodes)) => self.compare_set(op, nodes, other, true),
            _ if matches!(op, BinaryOp::Eq | BinaryOp::Neq) => {
                let equal = if matches!(left, QueryResult::Boolean(_))
                    || matches!(right, QueryResult::Boolean(_))
                {
                    left.to_boolean() == right.to_boolean()
                } else if matches!(left, QueryResult::Number(_))
                    || matches!(right, QueryResult::Number(_))
                {
                    compare_numbers(BinaryOp::Eq, left.to_number(doc), right.to_number(doc))
                } else {
                    left.to_string_value(doc) == right.to_string_value(doc)
                };
                equal == (op == BinaryOp::Eq)
            }
            _ => compare_numbers(op, left.to_number(doc), right.to_number(doc)),
        }
    }

    /// Compare each member of `nodes` with a scalar. `flipped` means the
    /// node-set was the right operand.
    fn compare_set(
        &self,
        op: BinaryOp,
        nodes: &[XPathNode],
        other: &QueryResult,
        flipped: bool,
    ) -> bool {
        let doc = self.doc;
        let op = if flipped { mirror(op) } else { op };
        match other {
            QueryResult::Boolean(b) => {
                let set = QueryResult::Boolean(!nodes.is_empty());
                self.compare(op, &set, &QueryResult::Boolean(*b))
            }
            QueryResult::Number(n) => nodes.iter().any(|node| {
                let value = parse_number(&node.string_value(doc));
                compare_numbers(op, value, *n)
            }),
            QueryResult::String(s) => nodes
                .iter()
                .any(|node| compare_strings(op, &node.string_value(doc), s)),
            QueryResult::NodeSet(_) => false,
        }
    }

    // ========== Functions ==========

    fn function(
        &self,
        name: &str,
        args: &[Expr],
        ctx: Context,
    ) -> Result<QueryResult, XPathError> {
        let doc = self.doc;
        let arity = |min: usize, max: usize| -> Result<(), XPathError> {
            if (min..=max).contains(&args.len()) {
                Ok(())
            } else {
                let expected = if min == max {
                    min.to_string()
                } else if max == usize::MAX {
                    format!("at least {min}")
                } else {
                    format!("{min} to {max}")
                };
                Err(XPathError::evaluation(format!(
                    "{name}() takes {expected} argument(s), got {}",
                    args.len()
                )))
            }
        };
        let string_arg = |index: usize| -> Result<String, XPathError> {
            match args.get(index) {
                Some(arg) => Ok(self.eval(arg, ctx)?.to_string_value(doc)),
                None => Ok(ctx.node.string_value(doc)),
            }
        };
        let number_arg = |index: usize| -> Result<f64, XPathError> {
            match args.get(index) {
                Some(arg) => Ok(self.eval(arg, ctx)?.to_number(doc)),
                None => Ok(parse_number(&ctx.node.string_value(doc))),
            }
        };

        #[allow(clippy::cast_precision_loss)]
        let value = match name {
            "last" => {
                arity(0, 0)?;
                QueryResult::Number(ctx.size as f64)
            }
            "position" => {
                arity(0, 0)?;
                QueryResult::Number(ctx.position as f64)
            }
            "count" => {
                arity(1, 1)?;
                QueryResult::Number(self.node_set(&args[0], ctx, "count()")?.len() as f64)
            }
            "name" | "local-name" => {
                arity(0, 1)?;
                let first = match args.first() {
                    Some(arg) => self.node_set(arg, ctx, "name()")?.first().copied(),
                    None => Some(ctx.node),
                };
                QueryResult::String(first.map(|n| n.name(doc).to_string()).unwrap_or_default())
            }
            "string" => {
                arity(0, 1)?;
                QueryResult::String(string_arg(0)?)
            }
            "concat" => {
                arity(2, usize::MAX)?;
                let mut out = String::new();
                for index in 0..args.len() {
                    out.push_str(&string_arg(index)?);
                }
                QueryResult::String(out)
            }
            "starts-with" => {
                arity(2, 2)?;
                QueryResult::Boolean(string_arg(0)?.starts_with(&string_arg(1)?))
            }
            "contains" => {
                arity(2, 2)?;
                QueryResult::Boolean(string_arg(0)?.contains(&string_arg(1)?))
            }
            "string-length" => {
                arity(0, 1)?;
                QueryResult::Number(string_arg(0)?.chars().count() as f64)
            }
            "normalize-space" => {
                arity(0, 1)?;
                let s = string_arg(0)?;
                QueryResult::String(s.split_ascii_whitespace().collect::<Vec<_>>().join(" "))
            }
            "boolean" => {
                arity(1, 1)?;
                QueryResult::Boolean(self.eval(&args[0], ctx)?.to_boolean())
            }
            "not" => {
                arity(1, 1)?;
                QueryResult::Boolean(!self.eval(&args[0], ctx)?.to_boolean())
            }
            "true" => {
                arity(0, 0)?;
                QueryResult::Boolean(true)
            }
            "false" => {
                arity(0, 0)?;
                QueryResult::Boolean(false)
            }
            "number" => {
                arity(0, 1)?;
                QueryResult::Number(number_arg(0)?)
            }
            "sum" => {
                arity(1, 1)?;
                let total = self
                    .node_set(&args[0], ctx, "sum()")?
                    .iter()
                    .map(|n| parse_number(&n.string_value(doc)))
                    .sum();
                QueryResult::Number(total)
            }
            "floor" => {
                arity(1, 1)?;
                QueryResult::Number(number_arg(0)?.floor())
            }
            "ceiling" => {
                arity(1, 1)?;
                QueryResult::Number(number_arg(0)?.ceil())
            }
            "round" => {
                arity(1, 1)?;
                QueryResult::Number(round(number_arg(0)?))
            }
            _ => {
                return Err(XPathError::evaluation(format!(
                    "unknown function {name}()"
                )));
            }
        };
        Ok(value)
    }
}

/// Swap the sides of a relational operator.
const fn mirror(op: BinaryOp) -> BinaryOp {
    match op {
        BinaryOp::Lt => BinaryOp::Gt,
        BinaryOp::Lte => BinaryOp::Gte,
        BinaryOp::Gt => BinaryOp::Lt,
        BinaryOp::Gte => BinaryOp::Lte,
        other => other,
    }
}

fn compare_strings(op: BinaryOp, a: &str, b: &str) -> bool {
    match op {
        BinaryOp::Eq => a == b,
        BinaryOp::Neq => a != b,
        _ => compare_numbers(
            op,
            parse_number(a),
            parse_number(b),
        ),
    }
}

#[allow(clippy::float_cmp)]
fn compare_numbers(op: BinaryOp, a: f64, b: f64) -> bool {
    match op {
        BinaryOp::Eq => a == b,
        BinaryOp::Neq => a != b,
        BinaryOp::Lt => a < b,
        BinaryOp::Lte => a <= b,
        BinaryOp::Gt => a > b,
        BinaryOp::Gte => a >= b,
        _ => false,
    }
}

/// `round()`: halves go towards positive infinity.
fn round(n: f64) -> f64 {
    if n.is_nan() || n.is_infinite() {
        n
    } else if (-0.5..0.0).contains(&n) {
        -0.0
    } else {
        (n + 0.5).floor()
    }
}
