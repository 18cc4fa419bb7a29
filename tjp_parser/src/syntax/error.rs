//! Fatal parse diagnostics
//!
//! Every variant carries the file, line and column it refers to. There is
//! no recovery: the first error ends the parse.

use crate::grammar::GrammarError;
use crate::lexical::LexerError;
use crate::logging::{codes, Code};
use crate::tokens::{TokenClass, TokenSourceError};
use crate::utils::SourceLocation;

pub type ParseResult<T> = Result<T, ParseError>;

#[derive(Debug, Clone, thiserror::Error)]
pub enum ParseError {
    #[error("{location}: {message}")]
    Semantic {
        message: String,
        location: SourceLocation,
    },

    #[error("{location}: {expected} expected but found '{found}'")]
    UnexpectedToken {
        expected: String,
        found: String,
        location: SourceLocation,
    },

    #[error("{location}: Unknown attribute '{keyword}' in {rule}")]
    UnknownAttribute {
        keyword: String,
        rule: String,
        location: SourceLocation,
    },

    #[error("{location}: {rule} expected but found '{found}'")]
    RuleExpected {
        rule: String,
        found: String,
        location: SourceLocation,
    },

    #[error("{location}: Expected {} but found '{found}'", expected.description())]
    TokenMismatch {
        expected: TokenClass,
        found: String,
        location: SourceLocation,
    },

    #[error("{location}: {error}")]
    Lexical {
        error: LexerError,
        location: SourceLocation,
    },

    #[error("{location}: {message}")]
    Include {
        message: String,
        location: SourceLocation,
    },

    #[error("{location}: {error}")]
    Grammar {
        error: GrammarError,
        location: SourceLocation,
    },

    #[error("{location}: Maximum parse depth of {depth} exceeded")]
    MaxParseDepth {
        depth: usize,
        location: SourceLocation,
    },
}

impl ParseError {
    pub fn semantic(message: impl Into<String>, location: SourceLocation) -> Self {
        Self::Semantic {
            message: message.into(),
            location,
        }
    }

    /// Wrap a failed include push; lexical failures keep their own variant
    pub fn from_include(error: TokenSourceError, location: SourceLocation) -> Self {
        match error {
            TokenSourceError::Lexical(error) => Self::Lexical { error, location },
            other => Self::Include {
                message: other.to_string(),
                location,
            },
        }
    }

    pub fn location(&self) -> &SourceLocation {
        match self {
            Self::Semantic { location, .. }
            | Self::UnexpectedToken { location, .. }
            | Self::UnknownAttribute { location, .. }
            | Self::RuleExpected { location, .. }
            | Self::TokenMismatch { location, .. }
            | Self::Lexical { location, .. }
            | Self::Include { location, .. }
            | Self::Grammar { location, .. }
            | Self::MaxParseDepth { location, .. } => location,
        }
    }

    /// The diagnostic text without the location prefix
    pub fn message(&self) -> String {
        let full = self.to_string();
        let prefix = format!("{}: ", self.location());
        match full.strip_prefix(&prefix) {
            Some(message) => message.to_string(),
            None => full,
        }
    }

    pub fn error_code(&self) -> Code {
        match self {
            Self::Semantic { .. } => codes::semantic::SEMANTIC_ERROR,
            Self::UnexpectedToken { .. } => codes::syntax::UNEXPECTED_TOKEN,
            Self::UnknownAttribute { .. } => codes::syntax::UNKNOWN_ATTRIBUTE,
            Self::RuleExpected { .. } => codes::syntax::RULE_EXPECTED,
            Self::TokenMismatch { .. } => codes::syntax::TOKEN_CLASS_MISMATCH,
            Self::Lexical { error, .. } => error.error_code(),
            Self::Include { .. } => codes::syntax::INCLUDE_FAILED,
            Self::Grammar { error, .. } => error.error_code(),
            Self::MaxParseDepth { .. } => codes::syntax::MAX_PARSE_DEPTH,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::Position;
    use std::sync::Arc;

    fn location() -> SourceLocation {
        SourceLocation::new(Arc::from("plan.tjp"), Position::new(10, 3, 5))
    }

    #[test]
    fn test_display_is_location_prefixed() {
        let error = ParseError::semantic("Unknown scenario foo", location());
        assert_eq!(error.to_string(), "plan.tjp:3:5: Unknown scenario foo");
        assert_eq!(error.message(), "Unknown scenario foo");
        assert_eq!(error.location().line, 3);
    }

    #[test]
    fn test_token_mismatch_names_class() {
        let error = ParseError::TokenMismatch {
            expected: TokenClass::Date,
            found: "foo".into(),
            location: location(),
        };
        assert_eq!(error.message(), "Expected a date but found 'foo'");
        assert_eq!(error.error_code(), codes::syntax::TOKEN_CLASS_MISMATCH);
    }

    #[test]
    fn test_include_errors_keep_lexical_variant() {
        let lexical = LexerError::UnterminatedString { line: 1, column: 1 };
        let error = ParseError::from_include(TokenSourceError::Lexical(lexical), location());
        assert!(matches!(error, ParseError::Lexical { .. }));

        let error = ParseError::from_include(
            TokenSourceError::RecursiveInclude { path: "a.tji".into() },
            location(),
        );
        assert_eq!(error.error_code(), codes::syntax::INCLUDE_FAILED);
    }
}
