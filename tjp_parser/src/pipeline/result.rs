use crate::file_processor::FileMetadata;
use crate::lexical::LexicalMetrics;
use crate::model::Project;
use std::path::PathBuf;
use std::time::Duration;

/// Parsed project plus the metrics gathered along the way
#[derive(Debug)]
pub struct PipelineResult {
    pub project: Project,
    /// `None` for in-memory sources
    pub file_metadata: Option<FileMetadata>,
    pub lexical_metrics: LexicalMetrics,
    /// Tokens consumed by the parser, includes counted
    pub token_count: usize,
    pub included_files: Vec<PathBuf>,
    pub processing_duration: Duration,
}

impl PipelineResult {
    pub fn new(
        project: Project,
        file_metadata: Option<FileMetadata>,
        lexical_metrics: LexicalMetrics,
        token_count: usize,
        included_files: Vec<PathBuf>,
        processing_duration: Duration,
    ) -> Self {
        Self {
            project,
            file_metadata,
            lexical_metrics,
            token_count,
            included_files,
            processing_duration,
        }
    }

    pub fn log_success(&self, file_path: &str) {
        let seconds = self.processing_duration.as_secs_f64().max(f64::EPSILON);
        crate::log_success!(
            crate::logging::codes::success::PARSE_COMPLETE,
            "TJP project parsed",
            "file" => file_path,
            "project" => self.project.id.as_str(),
            "tasks" => self.project.tasks.len(),
            "resources" => self.project.resources.len(),
            "reports" => self.project.reports.len(),
            "includes" => self.included_files.len(),
            "duration_ms" => format!("{:.2}", self.processing_duration.as_secs_f64() * 1000.0),
            "processing_rate_tokens_per_sec" => format!("{:.0}", self.token_count as f64 / seconds)
        );
    }
}
