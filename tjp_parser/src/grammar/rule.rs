use crate::grammar::{RuleId, Symbol, Value, Values};
use crate::syntax::{ParseContext, ParseError};
use std::fmt;
use std::sync::Arc;

/// Semantic action run after a pattern matched
pub type Action =
    Arc<dyn Fn(&mut ParseContext, &Values) -> Result<Option<Value>, ParseError> + Send + Sync>;

pub struct Pattern {
    pub symbols: Vec<Symbol>,
    pub action: Option<Action>,
}

impl Pattern {
    pub fn new(symbols: Vec<Symbol>, action: Option<Action>) -> Self {
        Self { symbols, action }
    }

    /// Patterns are never empty once validated
    pub fn first(&self) -> Option<&Symbol> {
        self.symbols.first()
    }

    /// The leading keyword, if the pattern starts with a literal
    pub fn keyword(&self) -> Option<&str> {
        match self.first() {
            Some(Symbol::Literal(text)) => Some(text),
            _ => None,
        }
    }
}

impl fmt::Debug for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pattern")
            .field("symbols", &self.symbols)
            .field("action", &self.action.is_some())
            .finish()
    }
}

#[derive(Debug)]
pub struct Rule {
    pub id: RuleId,
    pub name: String,
    pub patterns: Vec<Arc<Pattern>>,
    pub optional: bool,
    pub repeatable: bool,
}

impl Rule {
    /// Flags as shown by grammar listings, e.g. `optional repeatable`
    pub fn flags(&self) -> String {
        let mut flags = Vec::new();
        if self.optional {
            flags.push("optional");
        }
        if self.repeatable {
            flags.push("repeatable");
        }
        flags.join(" ")
    }
}
