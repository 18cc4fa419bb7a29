//! TJP rule declarations
//!
//! Each module declares one area of the language. The registration list
//! fixes the order; rule references are resolved once everything is
//! declared, so modules may refer to each other freely.

mod calendar;
mod durations;
mod extend;
mod logical;
mod project;
mod properties;
mod report;
mod resource;
mod scenario;
mod task;

use crate::grammar::{GrammarBuilder, GrammarError, GrammarTable, Value};
use crate::model::{Interval, PropertyKind};
use crate::syntax::{ParseContext, ParseError};

type Declare = fn(&mut GrammarBuilder);

const REGISTRATION_ORDER: &[(&str, Declare)] = &[
    ("project", project::declare),
    ("properties", properties::declare),
    ("scenario", scenario::declare),
    ("task", task::declare),
    ("resource", resource::declare),
    ("extend", extend::declare),
    ("report", report::declare),
    ("logical", logical::declare),
    ("calendar", calendar::declare),
    ("durations", durations::declare),
];

pub fn build_grammar() -> Result<GrammarTable, GrammarError> {
    let mut builder = GrammarBuilder::new();
    for (area, declare) in REGISTRATION_ORDER {
        crate::log_debug!("Declaring rules", "area" => area);
        declare(&mut builder);
    }
    builder.build()
}

fn strings(items: Vec<Value>) -> Vec<String> {
    items
        .into_iter()
        .filter_map(|v| match v {
            Value::Str(s) => Some(s),
            _ => None,
        })
        .collect()
}

fn intervals(items: Vec<Value>) -> Vec<Interval> {
    items
        .into_iter()
        .filter_map(|v| match v {
            Value::Interval(i) => Some(i),
            _ => None,
        })
        .collect()
}

fn scenario_index(ctx: &ParseContext, id: &str) -> Result<usize, ParseError> {
    ctx.project()?
        .scenario_idx(id)
        .ok_or_else(|| ctx.error(format!("Unknown scenario {}", id)))
}

/// Create a task or resource below the current one and make it current
fn open_property(
    ctx: &mut ParseContext,
    kind: PropertyKind,
    id: &str,
    name: &str,
) -> Result<(), ParseError> {
    let parent = match ctx.property {
        Some((current, idx)) if current == kind => Some(idx),
        _ => None,
    };
    let location = ctx.tokens().last_location();
    let set = ctx.project_mut()?.property_set_mut(kind);
    let idx = set
        .add(id, name, parent)
        .map_err(|message| ParseError::semantic(message, location))?;
    set.inherit_attributes(idx);
    ctx.property = Some((kind, idx));
    Ok(())
}

/// Return to the parent of the current property
fn close_property(ctx: &mut ParseContext) {
    if let Some((kind, idx)) = ctx.property {
        let parent = ctx
            .project
            .as_ref()
            .and_then(|p| p.property_set(kind).get(idx))
            .and_then(|p| p.parent);
        ctx.property = parent.map(|p| (kind, p));
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::model::Project;
    use crate::syntax::{ParseContext, ParseError, TjpParser};
    use crate::tokens::TokenSource;

    pub const HEADER: &str = "project p \"Project\" \"1.0\" 2024-01-01 - 2024-12-31";

    pub fn parse(source: &str) -> Result<Project, ParseError> {
        let tokens = TokenSource::from_str("test.tjp", source).unwrap();
        TjpParser::new().unwrap().parse(tokens)
    }

    /// Parse `body` after the standard header
    pub fn parse_with_header(body: &str) -> Result<Project, ParseError> {
        parse(&format!("{}\n{}", HEADER, body))
    }

    /// Context positioned after the standard header and `prelude`
    pub fn context_after(prelude: &str, source: &str) -> ParseContext {
        let project = parse_with_header(prelude).unwrap();
        let tokens = TokenSource::from_str("rule.tjp", source).unwrap();
        TjpParser::new().unwrap().context(tokens).with_project(project)
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;
    use crate::grammar::tjp_grammar;

    #[test]
    fn test_grammar_builds() {
        let grammar = tjp_grammar().unwrap();
        assert!(grammar.len() > 80);
        for name in ["project", "taskAttributes", "operand", "sortCriterium", "moreTaskList"] {
            assert!(grammar.rule_by_name(name).is_some(), "missing rule {}", name);
        }
        let properties = grammar.rule_by_name("properties").unwrap();
        assert!(properties.optional && properties.repeatable);
    }

    #[test]
    fn test_minimal_project() {
        let project = parse(HEADER).unwrap();
        assert_eq!(project.id, "p");
        assert_eq!(project.name, "Project");
        assert_eq!(project.version, "1.0");
        assert_eq!(project.scenarios.len(), 1);
    }

    #[test]
    fn test_trailing_input_is_rejected() {
        assert!(parse(&format!("{} 42", HEADER)).is_err());
    }
}
