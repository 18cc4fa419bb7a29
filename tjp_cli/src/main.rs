//! # TJP CLI
//!
//! Front end for the TJP grammar engine: syntax checks, JSON dumps and
//! grammar listings.

use clap::{ArgAction, Parser, Subcommand};
use log::{debug, error, info, LevelFilter};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tjp_parser::config::runtime::{LogLevel as RuntimeLogLevel, LoggingPreferences};
use tjp_parser::grammar::tjp_grammar;
use tjp_parser::pipeline::{self, PipelineError, PipelineResult};
use tjp_parser::utils::SourceMap;

#[derive(Debug, Parser)]
#[command(name = "tjp", version, about = "TaskJuggler project file checker")]
struct Cli {
    /// Raise log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Parse project files and print a summary for each
    Check {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Parse a project file and print it as JSON
    Dump {
        file: PathBuf,
        #[arg(long)]
        pretty: bool,
    },
    /// List the grammar rules with their flags and alternative counts
    Grammar,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = init_library_logging(cli.verbose) {
        error!("Library logging unavailable: {}", e);
    }

    let ok = match cli.command {
        Commands::Check { files } => check(&files),
        Commands::Dump { file, pretty } => dump(&file, pretty),
        Commands::Grammar => grammar(),
    };

    if ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    };
    env_logger::Builder::from_default_env()
        .filter_level(level)
        .format_timestamp(None)
        .init();
}

/// The library's own console output is only switched on at `-vv`
fn init_library_logging(verbose: u8) -> Result<(), String> {
    let mut preferences = LoggingPreferences::default();
    if verbose >= 2 {
        preferences.enable_console_logging = true;
        preferences.min_log_level = RuntimeLogLevel::Debug;
    }
    tjp_parser::logging::config::init_runtime_preferences(preferences)?;
    tjp_parser::logging::init_global_logging()
}

fn check(files: &[PathBuf]) -> bool {
    let mut failures = 0;
    for file in files {
        debug!("Checking {}", file.display());
        match pipeline::process_file(file) {
            Ok(result) => print_summary(file, &result),
            Err(e) => {
                failures += 1;
                report_error(file, &e);
            }
        }
    }

    println!(
        "\n{} file(s) checked, {} passed, {} failed",
        files.len(),
        files.len() - failures,
        failures
    );
    failures == 0
}

fn print_summary(file: &Path, result: &PipelineResult) {
    let project = &result.project;
    println!("ok     {}", file.display());
    println!("    project:   {} \"{}\" {}", project.id, project.name, project.version);
    println!("    timeframe: {} - {}", project.start, project.end);
    println!(
        "    scenarios: {}  tasks: {}  resources: {}  reports: {}",
        project.scenarios.len(),
        project.tasks.len(),
        project.resources.len(),
        project.reports.len()
    );
    if !result.included_files.is_empty() {
        println!("    includes:  {}", result.included_files.len());
    }
    println!(
        "    tokens:    {} in {:.2} ms",
        result.token_count,
        result.processing_duration.as_secs_f64() * 1000.0
    );
}

fn dump(file: &Path, pretty: bool) -> bool {
    let result = match pipeline::process_file(file) {
        Ok(result) => result,
        Err(e) => {
            report_error(file, &e);
            return false;
        }
    };

    let json = if pretty {
        serde_json::to_string_pretty(&result.project)
    } else {
        serde_json::to_string(&result.project)
    };
    match json {
        Ok(text) => {
            println!("{}", text);
            true
        }
        Err(e) => {
            error!("Failed to serialize {}: {}", file.display(), e);
            false
        }
    }
}

fn grammar() -> bool {
    let table = match tjp_grammar() {
        Ok(table) => table,
        Err(e) => {
            eprintln!("Grammar defect [{}]: {}", e.error_code(), e);
            return false;
        }
    };

    let width = table.rules().map(|r| r.name.len()).max().unwrap_or(0);
    for rule in table.rules() {
        println!(
            "{:<width$}  {:>2} alt  {}",
            rule.name,
            rule.patterns.len(),
            rule.flags(),
            width = width
        );
    }
    info!("{} rules", table.len());
    true
}

/// Prints the error, with an excerpt of the offending line when the
/// location points into a readable file
fn report_error(file: &Path, error: &PipelineError) {
    let Some(location) = error.location() else {
        eprintln!("FAILED {}: [{}] {}", file.display(), error.error_code(), error);
        return;
    };

    let message = match error {
        PipelineError::Parse(parse) => parse.message(),
        other => other.to_string(),
    };
    match std::fs::read_to_string(&*location.file) {
        Ok(source) => {
            let map = SourceMap::new(location.file.to_string(), source);
            eprint!("{}", map.format_error(location.line, location.column, &message));
        }
        Err(_) => eprintln!("Error: {}\n  --> {}", message, location),
    }
    eprintln!("FAILED {} [{}]", file.display(), error.error_code());
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    const PROJECT: &str = r#"project demo "Demo" "1.0" 2024-01-01 - 2024-06-30
task build "Build" {
  effort 2d
}
"#;

    fn write_project(dir: &tempfile::TempDir, name: &str, source: &str) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, source).unwrap();
        path
    }

    #[test]
    fn test_parse_check_with_files() {
        let cli = Cli::try_parse_from(["tjp", "check", "a.tjp", "b.tjp"]).unwrap();
        assert_eq!(cli.verbose, 0);
        assert_matches!(cli.command, Commands::Check { files } if files.len() == 2);
    }

    #[test]
    fn test_check_requires_files() {
        assert!(Cli::try_parse_from(["tjp", "check"]).is_err());
    }

    #[test]
    fn test_parse_dump_pretty() {
        let cli = Cli::try_parse_from(["tjp", "dump", "x.tjp", "--pretty"]).unwrap();
        assert_matches!(
            cli.command,
            Commands::Dump { file, pretty: true } if file == PathBuf::from("x.tjp")
        );

        let cli = Cli::try_parse_from(["tjp", "dump", "x.tjp"]).unwrap();
        assert_matches!(cli.command, Commands::Dump { pretty: false, .. });
    }

    #[test]
    fn test_verbose_count_is_global() {
        let cli = Cli::try_parse_from(["tjp", "-vv", "grammar"]).unwrap();
        assert_eq!(cli.verbose, 2);
        assert_matches!(cli.command, Commands::Grammar);

        let cli = Cli::try_parse_from(["tjp", "grammar", "-v"]).unwrap();
        assert_eq!(cli.verbose, 1);
    }

    #[test]
    fn test_check_missing_file_fails() {
        assert!(!check(&[PathBuf::from("/nonexistent/plan.tjp")]));
    }

    #[test]
    fn test_check_and_dump_valid_project() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_project(&dir, "plan.tjp", PROJECT);

        assert!(check(&[path.clone()]));
        assert!(dump(&path, true));
        assert!(dump(&path, false));
    }

    #[test]
    fn test_check_counts_any_failure() {
        let dir = tempfile::tempdir().unwrap();
        let good = write_project(&dir, "good.tjp", PROJECT);
        let bad = write_project(
            &dir,
            "bad.tjp",
            "project demo \"Demo\" \"1.0\" 2024-01-01 - 2024-06-30\nbogus 1\n",
        );

        assert!(!check(&[good, bad.clone()]));
        assert!(!dump(&bad, false));
    }

    #[test]
    fn test_grammar_listing() {
        assert!(grammar());
    }
}
