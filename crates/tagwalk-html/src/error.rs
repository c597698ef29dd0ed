use std::path::PathBuf;

use tagwalk_common::EncodingError;
use thiserror::Error;

/// Structural failures that stop a parse.
///
/// Malformed markup is never one of these; it is recovered and reported
/// through [`Document::diagnostics`](tagwalk_dom::Document::diagnostics).
#[derive(Debug, Error)]
pub enum ParseError {
    /// The input produced no top-level nodes.
    #[error("document is empty")]
    EmptyDocument,

    /// More elements were open at once than the configured limit allows.
    #[error("elements nested deeper than {limit} levels at byte {offset}")]
    NestingTooDeep {
        /// The `max_depth` that was exceeded.
        limit: usize,
        /// Byte offset of the start tag that tripped the limit.
        offset: usize,
    },

    /// The input bytes could not be decoded.
    #[error(transparent)]
    Encoding(#[from] EncodingError),

    /// The input file could not be read.
    #[error("failed to read {}", .path.display())]
    Io {
        /// The file that was being read.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}
