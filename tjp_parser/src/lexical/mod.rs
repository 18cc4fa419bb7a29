//! Lexical analysis for TJP sources

pub mod analyzer;

use crate::config::runtime::LexicalPreferences;
use crate::file_processor::FileProcessingResult;
use crate::tokens::TokenStream;

pub use analyzer::{LexerError, LexicalAnalyzer, LexicalMetrics};

pub fn tokenize_file_result(file_result: &FileProcessingResult) -> Result<TokenStream, LexerError> {
    LexicalAnalyzer::new().tokenize_file_result(file_result)
}

/// Tokenize in-memory source; `name` shows up in diagnostics
pub fn tokenize_str(name: &str, source: &str) -> Result<TokenStream, LexerError> {
    LexicalAnalyzer::new().tokenize_str(name, source)
}

pub fn create_analyzer_with_preferences(preferences: LexicalPreferences) -> LexicalAnalyzer {
    LexicalAnalyzer::with_preferences(preferences)
}

/// Check that every lexical error code is registered
pub fn init_lexical_analysis_logging() -> Result<(), String> {
    use crate::logging::codes::{self, lexical};

    for code in [
        lexical::INVALID_CHARACTER,
        lexical::UNTERMINATED_STRING,
        lexical::INVALID_NUMBER,
        lexical::IDENTIFIER_TOO_LONG,
        lexical::STRING_TOO_LARGE,
        lexical::INVALID_DATE,
        lexical::COMMENT_TOO_LONG,
        lexical::TOO_MANY_TOKENS,
        lexical::UNTERMINATED_COMMENT,
    ] {
        if codes::get_error_metadata(code.as_str()).is_none() {
            return Err(format!(
                "Lexical error code {} not found in metadata registry",
                code.as_str()
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lexical_codes_registered() {
        assert!(init_lexical_analysis_logging().is_ok());
    }

    #[test]
    fn test_tokenize_str_ends_with_eof() {
        let stream = tokenize_str("x.tjp", "task").unwrap();
        assert!(stream.has_eof());
        assert_eq!(stream.source_map().map(|m| m.name.as_str()), Some("x.tjp"));
    }
}
