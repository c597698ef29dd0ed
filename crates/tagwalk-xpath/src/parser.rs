//! Recursive-descent parser from tokens to [`Expr`].
//!
//! One method per grammar level, lowest precedence first:
//! `or`, `and`, equality, relational, additive, multiplicative, unary,
//! union, then path and filter expressions.

use std::str::FromStr;

use crate::ast::{Axis, BinaryOp, Expr, NodeTest, PathStart, Step};
use crate::error::XPathError;
use crate::lexer::{Spanned, Token, tokenize};

/// Deepest nesting an expression may have. Parentheses, predicates,
/// function arguments, unary minus and each operator in a chain all add
/// a level.
pub const MAX_EXPRESSION_DEPTH: usize = 128;

/// Parse an `XPath` expression.
///
/// # Errors
///
/// [`XPathError::Syntax`] with the byte offset of the offending token,
/// including for expressions nested deeper than [`MAX_EXPRESSION_DEPTH`].
pub fn parse(input: &str) -> Result<Expr, XPathError> {
    let tokens = tokenize(input)?;
    let mut parser = Parser {
        tokens,
        pos: 0,
        end: input.len(),
        depth: 0,
    };
    if parser.tokens.is_empty() {
        return Err(XPathError::syntax(0, "empty expression"));
    }
    let expr = parser.or_expr()?;
    match parser.peek() {
        None => Ok(expr),
        Some(token) => Err(parser.error(format!("unexpected {}", describe(token)))),
    }
}

struct Parser {
    tokens: Vec<Spanned>,
    pos: usize,
    end: usize,
    depth: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|s| &s.token)
    }

    fn position(&self) -> usize {
        self.tokens.get(self.pos).map_or(self.end, |s| s.position)
    }

    fn error(&self, message: impl Into<String>) -> XPathError {
        XPathError::syntax(self.position(), message)
    }

    fn bump(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).map(|s| s.token.clone());
        self.pos += 1;
        token
    }

    fn eat(&mut self, expected: &Token) -> bool {
        if self.peek() == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, expected: &Token, what: &str) -> Result<(), XPathError> {
        if self.eat(expected) {
            Ok(())
        } else {
            let found = self.peek().map_or("end of expression", describe);
            Err(self.error(format!("expected {what}, found {found}")))
        }
    }

    /// Enter one nesting level. The caller restores `depth` on success.
    fn descend(&mut self) -> Result<(), XPathError> {
        if self.depth >= MAX_EXPRESSION_DEPTH {
            return Err(self.error("expression nested too deeply"));
        }
        self.depth += 1;
        Ok(())
    }

    /// Parse a left-associative chain of `next` separated by the operators
    /// `op_for` recognises.
    fn binary_level(
        &mut self,
        next: fn(&mut Self) -> Result<Expr, XPathError>,
        op_for: fn(&Token) -> Option<BinaryOp>,
    ) -> Result<Expr, XPathError> {
        let depth = self.depth;
        let mut left = next(self)?;
        while let Some(op) = self.peek().and_then(op_for) {
            self.pos += 1;
            self.descend()?;
            let right = next(self)?;
            left = Expr::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        self.depth = depth;
        Ok(left)
    }

    fn or_expr(&mut self) -> Result<Expr, XPathError> {
        self.binary_level(Self::and_expr, |t| {
            (*t == Token::Or).then_some(BinaryOp::Or)
        })
    }

    fn and_expr(&mut self) -> Result<Expr, XPathError> {
        self.binary_level(Self::equality_expr, |t| {
            (*t == Token::And).then_some(BinaryOp::And)
        })
    }

    fn equality_expr(&mut self) -> Result<Expr, XPathError> {
        self.binary_level(Self::relational_expr, |t| match t {
            Token::Equal => Some(BinaryOp::Eq),
            Token::NotEqual => Some(BinaryOp::Neq),
            _ => None,
        })
    }

    fn relational_expr(&mut self) -> Result<Expr, XPathError> {
        self.binary_level(Self::additive_expr, |t| match t {
            Token::Less => Some(BinaryOp::Lt),
            Token::LessEqual => Some(BinaryOp::Lte),
            Token::Greater => Some(BinaryOp::Gt),
            Token::GreaterEqual => Some(BinaryOp::Gte),
            _ => None,
        })
    }

    fn additive_expr(&mut self) -> Result<Expr, XPathError> {
        self.binary_level(Self::multiplicative_expr, |t| match t {
            Token::Plus => Some(BinaryOp::Add),
            Token::Minus => Some(BinaryOp::Sub),
            _ => None,
        })
    }

    fn multiplicative_expr(&mut self) -> Result<Expr, XPathError> {
        self.binary_level(Self::unary_expr, |t| match t {
            Token::Star => Some(BinaryOp::Mul),
            Token::Div => Some(BinaryOp::Div),
            Token::Mod => Some(BinaryOp::Mod),
            _ => None,
        })
    }

    fn unary_expr(&mut self) -> Result<Expr, XPathError> {
        let depth = self.depth;
        let mut negations = 0_usize;
        while self.eat(&Token::Minus) {
            self.descend()?;
            negations += 1;
        }
        let mut expr = self.union_expr()?;
        for _ in 0..negations {
            expr = Expr::Negate(Box::new(expr));
        }
        self.depth = depth;
        Ok(expr)
    }

    fn union_expr(&mut self) -> Result<Expr, XPathError> {
        let depth = self.depth;
        let mut left = self.path_expr()?;
        while self.eat(&Token::Pipe) {
            self.descend()?;
            let right = self.path_expr()?;
            left = Expr::Union(Box::new(left), Box::new(right));
        }
        self.depth = depth;
        Ok(left)
    }

    fn starts_step(&self) -> bool {
        matches!(
            self.peek(),
            Some(
                Token::Name(_)
                    | Token::NodeType(_)
                    | Token::AxisName(_)
                    | Token::At
                    | Token::Dot
                    | Token::DotDot
            )
        )
    }

    fn path_expr(&mut self) -> Result<Expr, XPathError> {
        match self.peek() {
            Some(Token::Slash) => {
                self.pos += 1;
                let steps = if self.starts_step() {
                    self.relative_steps()?
                } else {
                    Vec::new()
                };
                Ok(Expr::Path {
                    start: PathStart::Root,
                    steps,
                })
            }
            Some(Token::DoubleSlash) => {
                self.pos += 1;
                let mut steps = vec![Step::descendant_or_self()];
                steps.extend(self.relative_steps()?);
                Ok(Expr::Path {
                    start: PathStart::Root,
                    steps,
                })
            }
            _ if self.starts_step() => Ok(Expr::Path {
                start: PathStart::Context,
                steps: self.relative_steps()?,
            }),
            _ => self.filter_path(),
        }
    }

    /// A filter expression, optionally continued by `/` or `//` steps.
    fn filter_path(&mut self) -> Result<Expr, XPathError> {
        let primary = self.primary_expr()?;
        let predicates = self.predicates()?;
        let filtered = if predicates.is_empty() {
            primary
        } else {
            Expr::Filter {
                primary: Box::new(primary),
                predicates,
            }
        };

        let mut steps = Vec::new();
        match self.peek() {
            Some(Token::Slash) => self.pos += 1,
            Some(Token::DoubleSlash) => {
                self.pos += 1;
                steps.push(Step::descendant_or_self());
            }
            _ => return Ok(filtered),
        }
        steps.extend(self.relative_steps()?);
        Ok(Expr::Path {
            start: PathStart::Expr(Box::new(filtered)),
            steps,
        })
    }

    fn relative_steps(&mut self) -> Result<Vec<Step>, XPathError> {
        let mut steps = vec![self.step()?];
        loop {
            match self.peek() {
                Some(Token::Slash) => self.pos += 1,
                Some(Token::DoubleSlash) => {
                    self.pos += 1;
                    steps.push(Step::descendant_or_self());
                }
                _ => return Ok(steps),
            }
            steps.push(self.step()?);
        }
    }

    fn step(&mut self) -> Result<Step, XPathError> {
        if self.eat(&Token::Dot) {
            return Ok(Step {
                axis: Axis::SelfNode,
                test: NodeTest::Node,
                predicates: Vec::new(),
            });
        }
        if self.eat(&Token::DotDot) {
            return Ok(Step {
                axis: Axis::Parent,
                test: NodeTest::Node,
                predicates: Vec::new(),
            });
        }

        let axis = match self.peek() {
            Some(Token::At) => {
                self.pos += 1;
                Axis::Attribute
            }
            Some(Token::AxisName(name)) => {
                let axis = Axis::from_str(name)
                    .map_err(|_| self.error(format!("unsupported axis {name}")))?;
                self.pos += 1;
                self.expect(&Token::ColonColon, "'::'")?;
                axis
            }
            _ => Axis::Child,
        };
        let test = self.node_test()?;
        let predicates = self.predicates()?;
        Ok(Step {
            axis,
            test,
            predicates,
        })
    }

    fn node_test(&mut self) -> Result<NodeTest, XPathError> {
        let position = self.position();
        match self.bump() {
            Some(Token::Name(name)) if name == "*" => Ok(NodeTest::Wildcard),
            Some(Token::Name(name)) => Ok(NodeTest::Name(name)),
            Some(Token::NodeType(kind)) => {
                let test = match kind.as_str() {
                    "text" => NodeTest::Text,
                    "comment" => NodeTest::Comment,
                    "node" => NodeTest::Node,
                    _ => {
                        return Err(XPathError::syntax(
                            position,
                            format!("{kind}() is not supported"),
                        ));
                    }
                };
                self.expect(&Token::LeftParen, "'('")?;
                self.expect(&Token::RightParen, "')'")?;
                Ok(test)
            }
            Some(other) => Err(XPathError::syntax(
                position,
                format!("expected a node test, found {}", describe(&other)),
            )),
            None => Err(XPathError::syntax(
                position,
                "expected a node test, found end of expression",
            )),
        }
    }

    fn predicates(&mut self) -> Result<Vec<Expr>, XPathError> {
        let mut predicates = Vec::new();
        while self.eat(&Token::LeftBracket) {
            self.descend()?;
            predicates.push(self.or_expr()?);
            self.depth -= 1;
            self.expect(&Token::RightBracket, "']'")?;
        }
        Ok(predicates)
    }

    fn primary_expr(&mut self) -> Result<Expr, XPathError> {
        let position = self.position();
        match self.bump() {
            Some(Token::Number(n)) => Ok(Expr::Number(n)),
            Some(Token::Literal(s)) => Ok(Expr::Literal(s)),
            Some(Token::LeftParen) => {
                self.descend()?;
                let inner = self.or_expr()?;
                self.depth -= 1;
                self.expect(&Token::RightParen, "')'")?;
                Ok(inner)
            }
            Some(Token::FunctionName(name)) => {
                self.expect(&Token::LeftParen, "'('")?;
                let mut args = Vec::new();
                if !self.eat(&Token::RightParen) {
                    self.descend()?;
                    loop {
                        args.push(self.or_expr()?);
                        if self.eat(&Token::Comma) {
                            continue;
                        }
                        self.expect(&Token::RightParen, "',' or ')'")?;
                        break;
                    }
                    self.depth -= 1;
                }
                Ok(Expr::Function { name, args })
            }
            Some(Token::Variable(name)) => Err(XPathError::syntax(
                position,
                format!("variable ${name} is not supported"),
            )),
            Some(other) => Err(XPathError::syntax(
                position,
                format!("unexpected {}", describe(&other)),
            )),
            None => Err(XPathError::syntax(position, "unexpected end of expression")),
        }
    }
}

fn describe(token: &Token) -> &'static str {
    match token {
        Token::LeftParen => "'('",
        Token::RightParen => "')'",
        Token::LeftBracket => "'['",
        Token::RightBracket => "']'",
        Token::Dot => "'.'",
        Token::DotDot => "'..'",
        Token::At => "'@'",
        Token::Comma => "','",
        Token::ColonColon => "'::'",
        Token::Slash => "'/'",
        Token::DoubleSlash => "'//'",
        Token::Pipe => "'|'",
        Token::Plus => "'+'",
        Token::Minus => "'-'",
        Token::Star => "'*'",
        Token::Equal => "'='",
        Token::NotEqual => "'!='",
        Token::Less => "'<'",
        Token::LessEqual => "'<='",
        Token::Greater => "'>'",
        Token::GreaterEqual => "'>='",
        Token::And => "'and'",
        Token::Or => "'or'",
        Token::Mod => "'mod'",
        Token::Div => "'div'",
        Token::Number(_) => "number",
        Token::Literal(_) => "string literal",
        Token::Name(_) => "name",
        Token::FunctionName(_) => "function name",
        Token::NodeType(_) => "node type",
        Token::AxisName(_) => "axis name",
        Token::Variable(_) => "variable",
    }
}
