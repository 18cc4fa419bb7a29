//! Token model for TJP sources
//!
//! - [`Token`] and [`TokenClass`]: what the lexer produces and what `$CLASS`
//!   grammar symbols match against
//! - [`TokenStream`]: one file's tokens, comments kept but skipped
//! - [`TokenSource`]: the stack of streams the parser reads from, with
//!   file inclusion

pub mod source;
pub mod token;
pub mod token_stream;

pub use source::{TokenSource, TokenSourceError};
pub use token::{Punctuation, Token, TokenClass};
pub use token_stream::{SpannedToken, TokenStream, TokenStreamBuilder};
