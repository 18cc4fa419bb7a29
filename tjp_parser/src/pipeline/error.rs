use crate::file_processor::FileProcessorError;
use crate::grammar::GrammarError;
use crate::lexical::LexerError;
use crate::logging::{codes, Code};
use crate::syntax::ParseError;
use crate::tokens::TokenSourceError;
use crate::utils::SourceLocation;

/// Pipeline processing errors
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("File processing failed: {0}")]
    FileProcessing(#[from] FileProcessorError),

    #[error("Lexical analysis failed: {0}")]
    LexicalAnalysis(#[from] LexerError),

    #[error("Token source failed: {0}")]
    TokenSource(#[from] TokenSourceError),

    #[error("Grammar construction failed: {0}")]
    Grammar(#[from] GrammarError),

    #[error("{0}")]
    Parse(#[from] ParseError),

    #[error("Pipeline error: {message}")]
    Pipeline { message: String },
}

impl PipelineError {
    pub fn pipeline_error(message: &str) -> Self {
        Self::Pipeline {
            message: message.to_string(),
        }
    }

    pub fn error_code(&self) -> Code {
        match self {
            Self::FileProcessing(e) => e.error_code(),
            Self::LexicalAnalysis(e) => e.error_code(),
            Self::TokenSource(e) => e.error_code(),
            Self::Grammar(e) => e.error_code(),
            Self::Parse(e) => e.error_code(),
            Self::Pipeline { .. } => codes::system::INTERNAL_ERROR,
        }
    }

    /// Source position for parse errors, used for caret rendering
    pub fn location(&self) -> Option<&SourceLocation> {
        match self {
            Self::Parse(e) => Some(e.location()),
            _ => None,
        }
    }
}
