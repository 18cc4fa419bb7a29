//! Include-aware token source
//!
//! A stack of token streams. `include` pushes a new file; an exhausted
//! include is popped automatically, so the parser only ever sees `Eof`
//! once the main file is done.

use crate::config::compile_time::syntax::MAX_INCLUDE_DEPTH;
use crate::config::runtime::ParserPreferences;
use crate::file_processor::{self, FileProcessorError};
use crate::lexical::{LexerError, LexicalAnalyzer};
use crate::logging::{self, codes};
use crate::tokens::{SpannedToken, Token, TokenStream};
use crate::utils::{SourceLocation, SourceMap};
use crate::{log_error, log_info, log_success};
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Debug, Clone, thiserror::Error)]
pub enum TokenSourceError {
    #[error("Too many nested include files: {depth} (max {max})")]
    IncludeTooDeep { depth: usize, max: usize },

    #[error("Recursive inclusion of {path}")]
    RecursiveInclude { path: String },

    #[error(transparent)]
    File(#[from] FileProcessorError),

    #[error(transparent)]
    Lexical(#[from] LexerError),
}

impl TokenSourceError {
    pub fn error_code(&self) -> logging::Code {
        match self {
            TokenSourceError::IncludeTooDeep { .. } | TokenSourceError::RecursiveInclude { .. } => {
                codes::syntax::INCLUDE_FAILED
            }
            TokenSourceError::File(e) => e.error_code(),
            TokenSourceError::Lexical(e) => e.error_code(),
        }
    }
}

#[derive(Debug)]
struct Frame {
    stream: TokenStream,
    file: Arc<str>,
    /// Canonical path; `None` for in-memory sources
    path: Option<PathBuf>,
}

#[derive(Debug)]
pub struct TokenSource {
    frames: Vec<Frame>,
    consumed: usize,
    last_location: SourceLocation,
    included_files: Vec<PathBuf>,
    log_includes: bool,
}

impl TokenSource {
    /// Wrap an already tokenized main stream
    pub fn from_stream(stream: TokenStream, file: &str, path: Option<PathBuf>) -> Self {
        let file: Arc<str> = Arc::from(file);
        Self {
            last_location: SourceLocation::start_of(file.clone()),
            frames: vec![Frame { stream, file, path }],
            consumed: 0,
            included_files: Vec::new(),
            log_includes: ParserPreferences::default().log_includes,
        }
    }

    pub fn from_str(name: &str, source: &str) -> Result<Self, TokenSourceError> {
        let stream = LexicalAnalyzer::new().tokenize_str(name, source)?;
        Ok(Self::from_stream(stream, name, None))
    }

    pub fn from_file(path: &Path) -> Result<Self, TokenSourceError> {
        let file_result = file_processor::process_file(path)?;
        let stream = LexicalAnalyzer::new().tokenize_file_result(&file_result)?;
        let name = path.display().to_string();
        Ok(Self::from_stream(stream, &name, Some(file_result.metadata.path)))
    }

    fn top(&self) -> &Frame {
        // The main frame is never popped
        &self.frames[self.frames.len() - 1]
    }

    pub fn peek_spanned(&self) -> Option<&SpannedToken> {
        self.top().stream.current()
    }

    pub fn peek(&self) -> &Token {
        self.peek_spanned().map(|t| &t.value).unwrap_or(&Token::Eof)
    }

    /// Consume the next token; `None` at the end of the main file
    pub fn advance(&mut self) -> Option<SpannedToken> {
        if self.peek().is_eof() {
            return None;
        }
        let location = self.location();
        let frame = self.frames.last_mut()?;
        let token = frame.stream.advance()?;
        self.consumed += 1;
        self.last_location = location;
        self.pop_exhausted();
        Some(token)
    }

    /// Number of tokens consumed so far, across all files
    pub fn consumed(&self) -> usize {
        self.consumed
    }

    /// Location of the next token
    pub fn location(&self) -> SourceLocation {
        let frame = self.top();
        match frame.stream.current() {
            Some(token) => SourceLocation::new(frame.file.clone(), token.span.start),
            None => self.last_location.clone(),
        }
    }

    /// Location of the most recently consumed token
    pub fn last_location(&self) -> SourceLocation {
        self.last_location.clone()
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn current_file(&self) -> Arc<str> {
        self.top().file.clone()
    }

    /// Source map of the file the next token comes from
    pub fn source_map(&self) -> Option<&SourceMap> {
        self.top().stream.source_map()
    }

    pub fn included_files(&self) -> &[PathBuf] {
        &self.included_files
    }

    /// Resolve `path` against the including file's directory
    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            return path.to_path_buf();
        }
        match self.top().path.as_ref().and_then(|p| p.parent()) {
            Some(dir) => dir.join(path),
            None => path.to_path_buf(),
        }
    }

    /// Push an included file on top of the stack
    pub fn push_include(&mut self, path: &Path) -> Result<(), TokenSourceError> {
        if self.frames.len() > MAX_INCLUDE_DEPTH {
            let error = TokenSourceError::IncludeTooDeep {
                depth: self.frames.len(),
                max: MAX_INCLUDE_DEPTH,
            };
            log_error!(error.error_code(), "Include depth exceeded",
                "file" => path.display(),
                "depth" => self.frames.len()
            );
            return Err(error);
        }

        let resolved = self.resolve(path);
        let file_result = file_processor::process_include(&resolved)?;
        let canonical = file_result.metadata.path.clone();

        if self.frames.iter().any(|f| f.path.as_ref() == Some(&canonical)) {
            let error = TokenSourceError::RecursiveInclude {
                path: canonical.display().to_string(),
            };
            log_error!(error.error_code(), "Recursive include", "file" => canonical.display());
            return Err(error);
        }

        let stream = LexicalAnalyzer::new().tokenize_file_result(&file_result)?;
        let name = resolved.display().to_string();

        if self.log_includes {
            log_info!("Include pushed", "file" => name, "depth" => self.frames.len() + 1);
        }
        logging::set_file_context(canonical.clone(), self.frames.len());

        self.included_files.push(canonical.clone());
        self.frames.push(Frame {
            stream,
            file: Arc::from(name.as_str()),
            path: Some(canonical),
        });
        self.pop_exhausted();
        Ok(())
    }

    fn pop_exhausted(&mut self) {
        while self.frames.len() > 1 && self.top().stream.is_at_end() {
            if let Some(frame) = self.frames.pop() {
                if self.log_includes {
                    log_success!(codes::success::INCLUDE_PROCESSED, "Include processed",
                        "file" => frame.file,
                        "depth" => self.frames.len()
                    );
                }
            }
            let top = self.top();
            if let Some(path) = top.path.clone() {
                logging::set_file_context(path, self.frames.len() - 1);
            }
        }
    }
}
