use crate::config::runtime::ParserPreferences;
use crate::grammar::{tjp_grammar, GrammarError, GrammarTable};
use crate::model::Project;
use crate::syntax::{ParseContext, ParseError};
use crate::tokens::TokenSource;
use std::sync::Arc;

/// Parses TJP token sources against the shared grammar table
#[derive(Debug, Clone)]
pub struct TjpParser {
    grammar: Arc<GrammarTable>,
    preferences: ParserPreferences,
}

impl TjpParser {
    pub fn new() -> Result<Self, GrammarError> {
        Ok(Self::with_grammar(tjp_grammar()?))
    }

    pub fn with_grammar(grammar: Arc<GrammarTable>) -> Self {
        Self {
            grammar,
            preferences: ParserPreferences::default(),
        }
    }

    pub fn with_preferences(mut self, preferences: ParserPreferences) -> Self {
        self.preferences = preferences;
        self
    }

    pub fn grammar(&self) -> &Arc<GrammarTable> {
        &self.grammar
    }

    /// Fresh parse state around `tokens`
    pub fn context(&self, tokens: TokenSource) -> ParseContext {
        ParseContext::new(tokens, self.grammar.clone()).with_preferences(self.preferences.clone())
    }

    /// Parse a complete project; all input must be consumed
    pub fn parse(&self, tokens: TokenSource) -> Result<Project, ParseError> {
        let mut ctx = self.context(tokens);
        Self::parse_project(&mut ctx)
    }

    /// Runs the `project` rule on a prepared context. The context stays
    /// available afterwards for include and extension inspection.
    pub fn parse_project(ctx: &mut ParseContext) -> Result<Project, ParseError> {
        ctx.parse_rule("project")?;
        ctx.expect_end()?;
        match ctx.take_project() {
            Some(project) => Ok(project),
            None => Err(ctx.error("Project header expected")),
        }
    }
}
