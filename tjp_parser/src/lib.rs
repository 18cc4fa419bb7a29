//! Grammar engine for the TaskJuggler project description language
//!
//! Source files run through the file processor and lexer into a
//! [`tokens::TokenSource`], which the table-driven parser in [`syntax`]
//! consumes using the rules declared in [`rules`]. The result is a
//! [`model::Project`].

pub mod config;
pub mod file_processor;
pub mod grammar;
pub mod lexical;
#[macro_use]
pub mod logging;
pub mod model;
pub mod pipeline;
pub mod rules;
pub mod syntax;
pub mod tokens;
pub mod units;
pub mod utils;

pub use model::Project;
pub use pipeline::{PipelineError, PipelineResult};
pub use syntax::{ParseError, TjpParser};

use std::path::Path;

/// Parse TJP source held in memory; `name` is used in error locations
pub fn parse_str(source: &str, name: &str) -> Result<Project, PipelineError> {
    Ok(pipeline::process_str(name, source)?.project)
}

/// Parse a `.tjp` file, following its includes
pub fn parse_file(path: &Path) -> Result<Project, PipelineError> {
    Ok(pipeline::process_file(path)?.project)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_str_facade() {
        let project = parse_str(
            "project acme \"Acme\" \"2.0\" 2024-01-01 - 2024-03-31\nresource dev \"Developer\"",
            "acme.tjp",
        )
        .unwrap();
        assert_eq!(project.id, "acme");
        assert!(project.resource("dev").is_some());
    }

    #[test]
    fn test_parse_error_carries_file_name() {
        let err = parse_str("project acme", "acme.tjp").unwrap_err();
        assert_eq!(&*err.location().unwrap().file, "acme.tjp");
    }
}
