use thiserror::Error;

use crate::value::ResultKind;

/// An error from compiling or evaluating an `XPath` expression.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum XPathError {
    /// The expression is malformed.
    #[error("syntax error at position {position}: {message}")]
    Syntax {
        /// Byte offset in the expression.
        position: usize,
        /// What was wrong.
        message: String,
    },

    /// The expression is well-formed but cannot be evaluated, e.g. a path
    /// step applied to a number or an unknown function.
    #[error("evaluation error: {message}")]
    Evaluation {
        /// What went wrong.
        message: String,
    },

    /// A [`QueryResult`](crate::QueryResult) was read through the accessor
    /// for a different variant.
    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch {
        /// The variant the accessor reads.
        expected: ResultKind,
        /// The variant the result holds.
        found: ResultKind,
    },
}

impl XPathError {
    pub(crate) fn syntax(position: usize, message: impl Into<String>) -> Self {
        Self::Syntax {
            position,
            message: message.into(),
        }
    }

    pub(crate) fn evaluation(message: impl Into<String>) -> Self {
        Self::Evaluation {
            message: message.into(),
        }
    }
}
