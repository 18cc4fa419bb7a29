//! Matching engine and parse state
//!
//! A parse context walks the shared grammar table over a token source,
//! running pattern actions that build the project model.

pub mod context;
pub mod error;
pub mod extension;
mod matcher;
mod parser;

pub use context::{ExtendTarget, ParseContext};
pub use error::{ParseError, ParseResult};
pub use extension::{AttributeExtension, ExtensionLayer};
pub use parser::TjpParser;
