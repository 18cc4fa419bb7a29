//! Per-parse state the rule actions read and write

use crate::config::runtime::ParserPreferences;
use crate::grammar::{GrammarError, GrammarTable, Pattern, RuleId, Symbol};
use crate::model::{
    AttributeValue, ColumnDefinition, Project, Property, PropertyKind, ReportElement,
};
use crate::syntax::{ExtensionLayer, ParseError};
use crate::tokens::{Token, TokenSource};
use crate::utils::SourceLocation;
use std::path::Path;
use std::sync::Arc;

/// Rules that `extend` appends attribute patterns to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtendTarget {
    pub kind: PropertyKind,
    pub rule: RuleId,
    pub scenario_rule: RuleId,
}

/// Where an optional or repeatable rule last gave up
#[derive(Debug, Clone, Copy)]
pub(crate) struct StopMark {
    pub consumed: usize,
    pub rule: RuleId,
}

pub struct ParseContext {
    pub(crate) tokens: TokenSource,
    pub(crate) grammar: Arc<GrammarTable>,
    pub(crate) extensions: ExtensionLayer,
    pub(crate) preferences: ParserPreferences,

    pub(crate) project: Option<Project>,
    /// Task or resource whose body is being parsed
    pub(crate) property: Option<(PropertyKind, usize)>,
    pub(crate) scenario_idx: usize,
    /// Scenario whose body is being parsed
    pub(crate) scenario: Option<usize>,
    pub(crate) scenarios_replaced: bool,
    /// Index into `project.reports`
    pub(crate) report: Option<usize>,
    pub(crate) column: Option<ColumnDefinition>,
    pub(crate) extend_target: Option<ExtendTarget>,

    pub(crate) depth: usize,
    pub(crate) stop: Option<StopMark>,
}

impl ParseContext {
    pub fn new(tokens: TokenSource, grammar: Arc<GrammarTable>) -> Self {
        Self {
            tokens,
            grammar,
            extensions: ExtensionLayer::default(),
            preferences: ParserPreferences::default(),
            project: None,
            property: None,
            scenario_idx: 0,
            scenario: None,
            scenarios_replaced: false,
            report: None,
            column: None,
            extend_target: None,
            depth: 0,
            stop: None,
        }
    }

    pub fn with_preferences(mut self, preferences: ParserPreferences) -> Self {
        self.preferences = preferences;
        self
    }

    /// Start from an existing project, for parsing rules below `project`
    pub fn with_project(mut self, project: Project) -> Self {
        self.project = Some(project);
        self
    }

    pub fn grammar(&self) -> &Arc<GrammarTable> {
        &self.grammar
    }

    pub fn tokens(&self) -> &TokenSource {
        &self.tokens
    }

    pub fn extensions(&self) -> &ExtensionLayer {
        &self.extensions
    }

    pub fn scenario_idx(&self) -> usize {
        self.scenario_idx
    }

    pub fn take_project(&mut self) -> Option<Project> {
        self.project.take()
    }

    /// Semantic error at the most recently consumed token
    pub fn error(&self, message: impl Into<String>) -> ParseError {
        ParseError::semantic(message, self.tokens.last_location())
    }

    pub fn location(&self) -> SourceLocation {
        self.tokens.location()
    }

    pub(crate) fn grammar_error(&self, error: GrammarError) -> ParseError {
        ParseError::Grammar {
            error,
            location: self.tokens.location(),
        }
    }

    pub(crate) fn rule_id(&self, name: &str) -> Result<RuleId, ParseError> {
        self.grammar
            .rule_id(name)
            .ok_or_else(|| self.grammar_error(GrammarError::undefined_rule("<runtime>", name)))
    }

    pub fn project(&self) -> Result<&Project, ParseError> {
        self.project
            .as_ref()
            .ok_or_else(|| self.error("Project header expected"))
    }

    pub fn project_mut(&mut self) -> Result<&mut Project, ParseError> {
        match self.project.as_mut() {
            Some(project) => Ok(project),
            None => Err(ParseError::semantic(
                "Project header expected",
                self.tokens.last_location(),
            )),
        }
    }

    pub fn current_property(&self) -> Result<&Property, ParseError> {
        let (kind, idx) = self
            .property
            .ok_or_else(|| self.error("No task or resource in this context"))?;
        self.project()?
            .property_set(kind)
            .get(idx)
            .ok_or_else(|| self.error("No task or resource in this context"))
    }

    pub fn current_property_mut(&mut self) -> Result<&mut Property, ParseError> {
        let location = self.tokens.last_location();
        let missing = || ParseError::semantic("No task or resource in this context", location.clone());
        let (kind, idx) = self.property.ok_or_else(missing)?;
        let project = self.project.as_mut().ok_or_else(missing)?;
        project.property_set_mut(kind).get_mut(idx).ok_or_else(missing)
    }

    /// Value of a scenario attribute of the current property in the current scenario
    pub fn scenario_attribute(&self, attribute: &str) -> Option<AttributeValue> {
        self.current_property()
            .ok()
            .and_then(|p| p.get_scenario(self.scenario_idx, attribute).cloned())
    }

    pub fn set_scenario_attribute(
        &mut self,
        attribute: &str,
        value: AttributeValue,
    ) -> Result<(), ParseError> {
        let scenario_idx = self.scenario_idx;
        self.current_property_mut()?
            .set_scenario(scenario_idx, attribute, value);
        Ok(())
    }

    pub fn report_element_mut(&mut self) -> Result<&mut ReportElement, ParseError> {
        let location = self.tokens.last_location();
        let missing = || ParseError::semantic("No report in this context", location.clone());
        let idx = self.report.ok_or_else(missing)?;
        let project = self.project.as_mut().ok_or_else(missing)?;
        project
            .reports
            .get_mut(idx)
            .map(|r| &mut r.element)
            .ok_or_else(missing)
    }

    /// Continue reading from `path` until it is exhausted
    pub fn include(&mut self, path: &str) -> Result<(), ParseError> {
        let location = self.tokens.last_location();
        self.tokens
            .push_include(Path::new(path))
            .map_err(|e| ParseError::from_include(e, location))
    }

    /// Base alternatives followed by the ones appended during this parse
    pub fn live_patterns(&self, rule: RuleId) -> Vec<Arc<Pattern>> {
        let mut patterns = self.grammar.rule(rule).patterns.clone();
        patterns.extend(self.extensions.appended(rule).iter().cloned());
        patterns
    }

    /// Whether some live alternative of `rule` can start with `token`
    pub fn rule_accepts(&self, rule: RuleId, token: &Token) -> Result<bool, ParseError> {
        self.rule_accepts_at(rule, token, 0)
    }

    pub(crate) fn rule_accepts_at(
        &self,
        rule: RuleId,
        token: &Token,
        depth: usize,
    ) -> Result<bool, ParseError> {
        for pattern in self.live_patterns(rule) {
            if self.pattern_accepts(&pattern, token, depth)? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    pub(crate) fn pattern_accepts(
        &self,
        pattern: &Pattern,
        token: &Token,
        depth: usize,
    ) -> Result<bool, ParseError> {
        use crate::config::compile_time::syntax::MAX_FIRST_SET_DEPTH;

        let Some(first) = pattern.first() else {
            return Ok(false);
        };
        match first {
            Symbol::Rule(id) => {
                if depth >= MAX_FIRST_SET_DEPTH {
                    return Err(self.grammar_error(GrammarError::LeftRecursion {
                        rule: self.grammar.rule(*id).name.clone(),
                    }));
                }
                self.rule_accepts_at(*id, token, depth + 1)
            }
            terminal => Ok(terminal.accepts_terminal(token).unwrap_or(false)),
        }
    }
}
