//! Common utilities for the tagwalk parser.
//!
//! This crate provides shared infrastructure used by the other tagwalk crates:
//! - **Diagnostics** - recoverable parse issues and colored terminal reporting
//! - **Encoding** - BOM sniffing, `<meta charset>` prescan and transcoding to UTF-8

pub mod diagnostics;
pub mod encoding;

pub use diagnostics::{Diagnostic, Diagnostics, Severity};
pub use encoding::EncodingError;
