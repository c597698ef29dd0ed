//! `XPath` 1.0 lexer.
//!
//! Tokenizing happens in two passes. The first splits the input into raw
//! tokens. The second applies the lexical disambiguation rules: `*` and
//! the names `and`, `or`, `mod`, `div` are operators only after a token
//! that ends an operand, a name before `(` is a function or node type,
//! and a name before `::` is an axis.

use crate::error::XPathError;

/// A lexical token.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// `(`
    LeftParen,
    /// `)`
    RightParen,
    /// `[`
    LeftBracket,
    /// `]`
    RightBracket,
    /// `.`
    Dot,
    /// `..`
    DotDot,
    /// `@`
    At,
    /// `,`
    Comma,
    /// `::`
    ColonColon,
    /// `/`
    Slash,
    /// `//`
    DoubleSlash,
    /// `|`
    Pipe,
    /// `+`
    Plus,
    /// `-`
    Minus,
    /// `*` as the multiplication operator.
    Star,
    /// `=`
    Equal,
    /// `!=`
    NotEqual,
    /// `<`
    Less,
    /// `<=`
    LessEqual,
    /// `>`
    Greater,
    /// `>=`
    GreaterEqual,
    /// The operator `and`.
    And,
    /// The operator `or`.
    Or,
    /// The operator `mod`.
    Mod,
    /// The operator `div`.
    Div,
    /// A number literal.
    Number(f64),
    /// A quoted string, without its quotes.
    Literal(String),
    /// A name test; `*` when it is a wildcard.
    Name(String),
    /// A name followed by `(` that is not a node type.
    FunctionName(String),
    /// `node`, `text`, `comment` or `processing-instruction` before `(`.
    NodeType(String),
    /// A name followed by `::`.
    AxisName(String),
    /// `$name`. Parsed so it can be rejected with a clear message.
    Variable(String),
}

impl Token {
    /// Whether this token is an operator for the disambiguation rules.
    const fn is_operator(&self) -> bool {
        matches!(
            self,
            Self::And
                | Self::Or
                | Self::Mod
                | Self::Div
                | Self::Star
                | Self::Slash
                | Self::DoubleSlash
                | Self::Pipe
                | Self::Plus
                | Self::Minus
                | Self::Equal
                | Self::NotEqual
                | Self::Less
                | Self::LessEqual
                | Self::Greater
                | Self::GreaterEqual
        )
    }

    /// Whether a following `*` or operator name should be read as an
    /// operator.
    const fn ends_operand(&self) -> bool {
        !(self.is_operator()
            || matches!(
                self,
                Self::At | Self::ColonColon | Self::LeftParen | Self::LeftBracket | Self::Comma
            ))
    }
}

/// A token and the byte offset where it starts.
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned {
    /// The token.
    pub token: Token,
    /// Byte offset in the expression.
    pub position: usize,
}

const NODE_TYPES: [&str; 4] = ["comment", "text", "processing-instruction", "node"];

/// Tokenize an `XPath` expression.
///
/// # Errors
///
/// [`XPathError::Syntax`] for an unterminated string, a lone `!` or `:`,
/// or a character that cannot start a token.
pub fn tokenize(input: &str) -> Result<Vec<Spanned>, XPathError> {
    let raw = Lexer::new(input).raw_tokens()?;
    Ok(disambiguate(raw))
}

struct Lexer<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Lexer<'a> {
    const fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn peek_second(&self) -> Option<char> {
        self.input[self.pos..].chars().nth(1)
    }

    fn advance_while(&mut self, mut pred: impl FnMut(char) -> bool) -> &'a str {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if !pred(c) {
                break;
            }
            self.pos += c.len_utf8();
        }
        &self.input[start..self.pos]
    }

    fn raw_tokens(mut self) -> Result<Vec<Spanned>, XPathError> {
        let mut tokens = Vec::new();
        loop {
            let _ = self.advance_while(is_xpath_whitespace);
            let Some(c) = self.peek() else {
                return Ok(tokens);
            };
            let position = self.pos;
            let token = self.next_token(c)?;
            tokens.push(Spanned { token, position });
        }
    }

    fn next_token(&mut self, c: char) -> Result<Token, XPathError> {
        let start = self.pos;
        let next = self.peek_second();

        let (token, width) = match (c, next) {
            ('(', _) => (Token::LeftParen, 1),
            (')', _) => (Token::RightParen, 1),
            ('[', _) => (Token::LeftBracket, 1),
            (']', _) => (Token::RightBracket, 1),
            ('@', _) => (Token::At, 1),
            (',', _) => (Token::Comma, 1),
            ('|', _) => (Token::Pipe, 1),
            ('+', _) => (Token::Plus, 1),
            ('-', _) => (Token::Minus, 1),
            ('*', _) => (Token::Star, 1),
            ('=', _) => (Token::Equal, 1),
            (':', Some(':')) => (Token::ColonColon, 2),
            ('/', Some('/')) => (Token::DoubleSlash, 2),
            ('/', _) => (Token::Slash, 1),
            ('!', Some('=')) => (Token::NotEqual, 2),
            ('<', Some('=')) => (Token::LessEqual, 2),
            ('<', _) => (Token::Less, 1),
            ('>', Some('=')) => (Token::GreaterEqual, 2),
            ('>', _) => (Token::Greater, 1),
            ('.', Some('.')) => (Token::DotDot, 2),
            ('.', Some(d)) if d.is_ascii_digit() => return Ok(self.number()),
            ('.', _) => (Token::Dot, 1),
            (d, _) if d.is_ascii_digit() => return Ok(self.number()),
            ('"' | '\'', _) => return self.literal(c),
            ('$', _) => {
                self.pos += 1;
                let name = self.advance_while(is_name_char);
                if name.is_empty() {
                    return Err(XPathError::syntax(start, "expected a variable name after '$'"));
                }
                return Ok(Token::Variable(name.to_string()));
            }
            (c, _) if is_name_start_char(c) => {
                let name = self.advance_while(is_name_char);
                return Ok(Token::Name(name.to_string()));
            }
            ('!', _) => return Err(XPathError::syntax(start, "expected '=' after '!'")),
            (':', _) => return Err(XPathError::syntax(start, "unexpected ':'")),
            (other, _) => {
                return Err(XPathError::syntax(
                    start,
                    format!("unexpected character {other:?}"),
                ));
            }
        };
        self.pos += width;
        Ok(token)
    }

    fn number(&mut self) -> Token {
        let mut seen_dot = false;
        let text = self.advance_while(|c| {
            if c == '.' && !seen_dot {
                seen_dot = true;
                true
            } else {
                c.is_ascii_digit()
            }
        });
        Token::Number(text.parse().unwrap_or(f64::NAN))
    }

    fn literal(&mut self, quote: char) -> Result<Token, XPathError> {
        let start = self.pos;
        self.pos += 1;
        let body = self.advance_while(|c| c != quote);
        if self.peek().is_none() {
            return Err(XPathError::syntax(start, "unterminated string literal"));
        }
        self.pos += 1;
        Ok(Token::Literal(body.to_string()))
    }
}

fn disambiguate(raw: Vec<Spanned>) -> Vec<Spanned> {
    let mut out: Vec<Spanned> = Vec::with_capacity(raw.len());
    let mut iter = raw.into_iter().peekable();

    while let Some(Spanned { token, position }) = iter.next() {
        let after_operand = out.last().is_some_and(|prev| prev.token.ends_operand());
        let following = iter.peek().map(|s| &s.token);

        let token = match token {
            Token::Star if !after_operand => Token::Name("*".to_string()),
            Token::Name(name) if after_operand => {
                operator_named(&name).unwrap_or(Token::Name(name))
            }
            Token::Name(name) if following == Some(&Token::LeftParen) => {
                if NODE_TYPES.contains(&name.as_str()) {
                    Token::NodeType(name)
                } else {
                    Token::FunctionName(name)
                }
            }
            Token::Name(name) if following == Some(&Token::ColonColon) => Token::AxisName(name),
            other => other,
        };
        out.push(Spanned { token, position });
    }
    out
}

fn operator_named(name: &str) -> Option<Token> {
    match name {
        "and" => Some(Token::And),
        "or" => Some(Token::Or),
        "mod" => Some(Token::Mod),
        "div" => Some(Token::Div),
        _ => None,
    }
}

const fn is_xpath_whitespace(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\r')
}

fn is_name_start_char(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

fn is_name_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '_' | '-' | '.')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<Token> {
        tokenize(input)
            .expect("tokenize")
            .into_iter()
            .map(|s| s.token)
            .collect()
    }

    #[test]
    fn star_is_wildcard_at_start_and_operator_after_operand() {
        assert_eq!(
            kinds("* * 2"),
            [
                Token::Name("*".to_string()),
                Token::Star,
                Token::Number(2.0)
            ]
        );
        assert_eq!(
            kinds("div/*"),
            [
                Token::Name("div".to_string()),
                Token::Slash,
                Token::Name("*".to_string())
            ]
        );
    }

    #[test]
    fn operator_names_depend_on_context() {
        assert_eq!(
            kinds("div div div"),
            [
                Token::Name("div".to_string()),
                Token::Div,
                Token::Name("div".to_string())
            ]
        );
        assert_eq!(
            kinds("a and b"),
            [
                Token::Name("a".to_string()),
                Token::And,
                Token::Name("b".to_string())
            ]
        );
    }

    #[test]
    fn names_before_paren_and_axis_separator() {
        assert_eq!(
            kinds("count (text())"),
            [
                Token::FunctionName("count".to_string()),
                Token::LeftParen,
                Token::NodeType("text".to_string()),
                Token::LeftParen,
                Token::RightParen,
                Token::RightParen,
            ]
        );
        assert_eq!(
            kinds("following-sibling::p"),
            [
                Token::AxisName("following-sibling".to_string()),
                Token::ColonColon,
                Token::Name("p".to_string()),
            ]
        );
    }

    #[test]
    fn numbers_and_literals() {
        assert_eq!(
            kinds(r#".5 3.25 'a"b' "c""#),
            [
                Token::Number(0.5),
                Token::Number(3.25),
                Token::Literal("a\"b".to_string()),
                Token::Literal("c".to_string()),
            ]
        );
    }

    #[test]
    fn positions_are_byte_offsets() {
        let tokens = tokenize("a  != 'é'").expect("tokenize");
        let positions: Vec<_> = tokens.iter().map(|s| s.position).collect();
        assert_eq!(positions, [0, 3, 6]);
    }

    #[test]
    fn errors() {
        assert_eq!(
            tokenize("'open"),
            Err(XPathError::syntax(0, "unterminated string literal"))
        );
        assert_eq!(
            tokenize("a ! b"),
            Err(XPathError::syntax(2, "expected '=' after '!'"))
        );
        assert!(tokenize("#").is_err());
    }
}
