//! Shared primitive types for the TJP lexer and parser.

pub mod span;

pub use span::{Position, SourceLocation, SourceMap, Span, Spanned};
