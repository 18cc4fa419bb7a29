//! Grammar symbols and their textual spec syntax
//!
//! - `_text` is a literal keyword or punctuation (`_task`, `_{`, `_>=`)
//! - `$CLASS` is a token class (`$ID`, `$DATE`)
//! - `!name` is a reference to another rule

use crate::tokens::{Token, TokenClass};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RuleId(pub(crate) usize);

impl RuleId {
    pub fn index(&self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Symbol {
    Literal(String),
    Class(TokenClass),
    Rule(RuleId),
}

impl Symbol {
    /// Whether a terminal accepts `token`; `None` for rule references
    pub fn accepts_terminal(&self, token: &Token) -> Option<bool> {
        match self {
            Symbol::Literal(text) => Some(token.matches_literal(text)),
            Symbol::Class(class) => Some(token.class() == Some(*class)),
            Symbol::Rule(_) => None,
        }
    }
}

/// Parsed symbol spec with the rule reference still unresolved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SymbolSpec<'a> {
    Literal(&'a str),
    Class(TokenClass),
    Rule(&'a str),
}

pub(crate) fn parse_spec(spec: &str) -> Option<SymbolSpec<'_>> {
    let mut chars = spec.chars();
    let sigil = chars.next()?;
    let rest = chars.as_str();
    if rest.is_empty() {
        return None;
    }
    match sigil {
        '_' => Some(SymbolSpec::Literal(rest)),
        '$' => TokenClass::from_name(rest).map(SymbolSpec::Class),
        '!' => Some(SymbolSpec::Rule(rest)),
        _ => None,
    }
}

/// A first-symbol terminal, used for disambiguation checks
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Terminal {
    Literal(String),
    Class(TokenClass),
}

impl Terminal {
    fn is_word(text: &str) -> bool {
        text.chars()
            .next()
            .map(|c| c.is_ascii_alphabetic() || c == '_')
            .unwrap_or(false)
    }

    /// Whether some token could match both terminals
    pub fn overlaps(&self, other: &Terminal) -> bool {
        match (self, other) {
            (Terminal::Literal(a), Terminal::Literal(b)) => a == b,
            (Terminal::Class(a), Terminal::Class(b)) => a == b,
            (Terminal::Literal(word), Terminal::Class(TokenClass::Id))
            | (Terminal::Class(TokenClass::Id), Terminal::Literal(word)) => Self::is_word(word),
            _ => false,
        }
    }
}

impl fmt::Display for Terminal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Terminal::Literal(text) => write!(f, "'{}'", text),
            Terminal::Class(class) => write!(f, "${}", class),
        }
    }
}
