//! End-to-end processing: file -> lexical -> token source -> grammar-driven parse

mod error;
mod result;

pub use error::PipelineError;
pub use result::PipelineResult;

use crate::config::runtime::{LexicalPreferences, ParserPreferences};
use crate::file_processor::FileMetadata;
use crate::lexical::LexicalAnalyzer;
use crate::logging;
use crate::syntax::TjpParser;
use crate::tokens::{TokenSource, TokenStream};
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Process a project file with preferences from the environment
pub fn process_file(file_path: &Path) -> Result<PipelineResult, PipelineError> {
    process_file_with_preferences(file_path, ParserPreferences::default())
}

pub fn process_file_with_preferences(
    file_path: &Path,
    preferences: ParserPreferences,
) -> Result<PipelineResult, PipelineError> {
    let start_time = Instant::now();
    let display = file_path.display().to_string();

    logging::with_file_context(file_path.to_path_buf(), 0, || {
        crate::log_info!("Starting TJP processing pipeline", "file" => &display);

        let file_result = crate::file_processor::process_file(file_path)?;

        let mut analyzer = LexicalAnalyzer::with_preferences(LexicalPreferences::default());
        let stream = analyzer.tokenize_file_result(&file_result)?;
        let lexical_metrics = analyzer.metrics().clone();

        let tokens = TokenSource::from_stream(stream, &display, Some(file_result.metadata.path.clone()));
        let result = run_parser(
            tokens,
            Some(file_result.metadata),
            lexical_metrics,
            preferences,
            start_time,
        )?;

        result.log_success(&display);
        Ok(result)
    })
}

/// Process in-memory source; `name` shows up in locations
pub fn process_str(name: &str, source: &str) -> Result<PipelineResult, PipelineError> {
    let start_time = Instant::now();

    logging::with_file_context(PathBuf::from(name), 0, || {
        let mut analyzer = LexicalAnalyzer::with_preferences(LexicalPreferences::default());
        let stream: TokenStream = analyzer.tokenize_str(name, source)?;
        let lexical_metrics = analyzer.metrics().clone();

        let tokens = TokenSource::from_stream(stream, name, None);
        let result = run_parser(
            tokens,
            None,
            lexical_metrics,
            ParserPreferences::default(),
            start_time,
        )?;

        result.log_success(name);
        Ok(result)
    })
}

fn run_parser(
    tokens: TokenSource,
    file_metadata: Option<FileMetadata>,
    lexical_metrics: crate::lexical::LexicalMetrics,
    preferences: ParserPreferences,
    start_time: Instant,
) -> Result<PipelineResult, PipelineError> {
    let parser = TjpParser::new()?.with_preferences(preferences);
    let mut ctx = parser.context(tokens);
    let project = TjpParser::parse_project(&mut ctx)?;

    Ok(PipelineResult::new(
        project,
        file_metadata,
        lexical_metrics,
        ctx.tokens().consumed(),
        ctx.tokens().included_files().to_vec(),
        start_time.elapsed(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::file_processor::FileProcessorError;
    use assert_matches::assert_matches;
    use std::io::Write;

    const SOURCE: &str = r#"project demo "Demo" "1.0" 2024-01-01 - 2024-06-30
task build "Build" {
  effort 2d
}
"#;

    #[test]
    fn test_process_str() {
        let result = process_str("demo.tjp", SOURCE).unwrap();
        assert_eq!(result.project.id, "demo");
        assert_eq!(result.project.tasks.len(), 1);
        assert!(result.file_metadata.is_none());
        assert!(result.token_count > 10);
        assert!(result.lexical_metrics.total_tokens > 0);
    }

    #[test]
    fn test_process_file_with_include() {
        let dir = tempfile::tempdir().unwrap();
        let include = dir.path().join("tasks.tji");
        std::fs::write(&include, "task extra \"Extra\"\n").unwrap();

        let main = dir.path().join("main.tjp");
        let mut file = std::fs::File::create(&main).unwrap();
        write!(file, "{}include \"tasks.tji\"\n", SOURCE).unwrap();

        let result = process_file(&main).unwrap();
        assert_eq!(result.project.tasks.len(), 2);
        assert!(result.project.task("extra").is_some());
        assert_eq!(result.included_files.len(), 1);
        assert!(result.file_metadata.unwrap().size > 0);
    }

    #[test]
    fn test_stage_errors_are_wrapped() {
        let missing = process_file(Path::new("/nonexistent/plan.tjp"));
        assert_matches!(
            missing,
            Err(PipelineError::FileProcessing(FileProcessorError::FileNotFound { .. }))
        );

        let err = process_str("bad.tjp", "project p \"P\" \"1\" 2024-01-01 - 2024-02-01\nbogus 1\n")
            .unwrap_err();
        assert_matches!(err, PipelineError::Parse(_));
        assert_eq!(err.location().unwrap().line, 2);
    }

    #[test]
    fn test_pipeline_error_creation() {
        let error = PipelineError::pipeline_error("Test error");
        assert_matches!(error, PipelineError::Pipeline { message } if message == "Test error");
    }
}
