//! File processor: path validation, size limits and UTF-8 reading for TJP sources

mod processor;

use std::path::Path;

pub use processor::{
    FileMetadata, FileProcessingResult, FileProcessor, FileProcessorError, TJP_EXTENSIONS,
};

/// Process a project file with preferences from the environment
pub fn process_file(file_path: &Path) -> Result<FileProcessingResult, FileProcessorError> {
    FileProcessor::new().process_file(file_path)
}

/// Process an include file; empty includes are allowed
pub fn process_include(file_path: &Path) -> Result<FileProcessingResult, FileProcessorError> {
    FileProcessor::new()
        .with_empty_allowed(true)
        .process_file(file_path)
}

pub fn get_max_file_size() -> u64 {
    crate::config::compile_time::file_processing::MAX_FILE_SIZE
}
