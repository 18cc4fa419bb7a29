//! Grammar defects
//!
//! These are programming errors in the rule table, not user errors. A correct
//! build never produces them for the shipped grammar.

use crate::logging::{codes, Code};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GrammarError {
    #[error("Rule '{name}' is declared more than once")]
    DuplicateRule { name: String },

    #[error("Rule '{rule}' has an invalid symbol '{symbol}'")]
    InvalidSymbol { rule: String, symbol: String },

    #[error("Rule '{rule}' has an empty pattern")]
    EmptyPattern { rule: String },

    #[error("Rule '{rule}' references undefined rule '{name}'")]
    UndefinedRule { rule: String, name: String },

    #[error("Rule '{rule}' has alternatives {first} and {second} that both start with {terminal}")]
    AmbiguousAlternatives {
        rule: String,
        first: usize,
        second: usize,
        terminal: String,
    },

    #[error("Rule '{rule}' is left recursive")]
    LeftRecursion { rule: String },

    #[error("Repeatable rule '{rule}' matched without consuming input")]
    NoProgress { rule: String },

    #[error("Pattern value {index} is not {expected}")]
    ValueMismatch { index: usize, expected: &'static str },
}

impl GrammarError {
    pub fn duplicate_rule(name: &str) -> Self {
        Self::DuplicateRule {
            name: name.to_string(),
        }
    }

    pub fn invalid_symbol(rule: &str, symbol: &str) -> Self {
        Self::InvalidSymbol {
            rule: rule.to_string(),
            symbol: symbol.to_string(),
        }
    }

    pub fn undefined_rule(rule: &str, name: &str) -> Self {
        Self::UndefinedRule {
            rule: rule.to_string(),
            name: name.to_string(),
        }
    }

    pub fn value_mismatch(index: usize, expected: &'static str) -> Self {
        Self::ValueMismatch { index, expected }
    }

    pub fn error_code(&self) -> Code {
        match self {
            Self::DuplicateRule { .. } => codes::grammar::DUPLICATE_RULE,
            Self::InvalidSymbol { .. } => codes::grammar::INVALID_SYMBOL,
            Self::EmptyPattern { .. } => codes::grammar::EMPTY_PATTERN,
            Self::UndefinedRule { .. } => codes::grammar::UNDEFINED_RULE,
            Self::AmbiguousAlternatives { .. } => codes::grammar::AMBIGUOUS_ALTERNATIVES,
            Self::LeftRecursion { .. } => codes::grammar::LEFT_RECURSION,
            Self::NoProgress { .. } => codes::grammar::NO_PROGRESS,
            Self::ValueMismatch { .. } => codes::grammar::VALUE_MISMATCH,
        }
    }
}
