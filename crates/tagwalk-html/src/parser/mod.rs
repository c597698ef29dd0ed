//! Tree construction from the token stream.

/// The tree builder.
pub mod core;

pub use self::core::{HTMLParser, TokenSource, TokenStream};
