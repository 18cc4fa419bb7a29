//! Single-token lookahead matcher
//!
//! An alternative is chosen by the next token only. Once chosen it must
//! match to the end; there is no backtracking.

use crate::config::compile_time::syntax::MAX_PARSE_DEPTH;
use crate::grammar::{GrammarError, MatchedValue, Pattern, RuleId, Symbol, Value, Values};
use crate::logging::codes;
use crate::syntax::context::StopMark;
use crate::syntax::{ParseContext, ParseError};
use crate::tokens::Token;
use crate::{log_debug, log_warning};
use std::sync::Arc;

impl ParseContext {
    /// Match the named rule at the current position
    pub fn parse_rule(&mut self, name: &str) -> Result<Option<Value>, ParseError> {
        let id = self.rule_id(name)?;
        self.match_rule(id)
    }

    pub fn match_rule(&mut self, rule: RuleId) -> Result<Option<Value>, ParseError> {
        if self.depth >= MAX_PARSE_DEPTH {
            return Err(ParseError::MaxParseDepth {
                depth: MAX_PARSE_DEPTH,
                location: self.tokens.location(),
            });
        }
        self.depth += 1;
        let result = self.match_alternatives(rule);
        self.depth -= 1;
        result
    }

    /// Require that the whole input has been consumed
    pub fn expect_end(&self) -> Result<(), ParseError> {
        if self.tokens.peek().is_eof() {
            Ok(())
        } else {
            Err(self.mismatch("End of input".to_string(), None))
        }
    }

    fn match_alternatives(&mut self, rule: RuleId) -> Result<Option<Value>, ParseError> {
        let grammar = self.grammar.clone();
        let definition = grammar.rule(rule);
        let mut results = Vec::new();
        let mut matched = false;

        loop {
            let Some(pattern) = self.select(rule)? else {
                if definition.optional || matched {
                    if definition.repeatable {
                        self.stop = Some(StopMark {
                            consumed: self.tokens.consumed(),
                            rule,
                        });
                    }
                    break;
                }
                let found = self.tokens.peek().as_tjp_string();
                return Err(self.mismatch(definition.name.clone(), Some(found)));
            };

            let before = self.tokens.consumed();
            let value = self.execute(&pattern)?;
            matched = true;

            if !definition.repeatable {
                return Ok(value);
            }
            self.ensure_progress(rule, before)?;
            results.extend(value);
        }

        if definition.repeatable && !results.is_empty() {
            Ok(Some(Value::List(results)))
        } else {
            Ok(None)
        }
    }

    /// A repeatable rule must consume input on every iteration
    fn ensure_progress(&self, rule: RuleId, before: usize) -> Result<(), ParseError> {
        if self.tokens.consumed() == before {
            return Err(self.grammar_error(GrammarError::NoProgress {
                rule: self.grammar.rule(rule).name.clone(),
            }));
        }
        Ok(())
    }

    /// Pick the alternative whose first symbol accepts the next token
    fn select(&self, rule: RuleId) -> Result<Option<Arc<Pattern>>, ParseError> {
        let token = self.tokens.peek();
        let mut candidates = Vec::new();
        for pattern in self.live_patterns(rule) {
            if self.pattern_accepts(&pattern, token, 0)? {
                candidates.push(pattern);
            }
        }

        if candidates.len() > 1 && self.preferences.warn_on_ambiguity {
            log_warning!(code = codes::warnings::AMBIGUOUS_MATCH,
                "Several alternatives match; using the first",
                "rule" => self.grammar.rule(rule).name,
                "token" => token,
                "candidates" => candidates.len()
            );
        }
        Ok(candidates.into_iter().next())
    }

    fn execute(&mut self, pattern: &Pattern) -> Result<Option<Value>, ParseError> {
        let location = self.tokens.location();
        let mut items = Vec::with_capacity(pattern.symbols.len());

        for symbol in &pattern.symbols {
            let item = match symbol {
                Symbol::Literal(text) => {
                    if !self.tokens.peek().matches_literal(text) {
                        return Err(self.mismatch(format!("'{}'", text), None));
                    }
                    self.consume()?;
                    MatchedValue::Literal(text.clone())
                }
                Symbol::Class(class) => {
                    if self.tokens.peek().class() != Some(*class) {
                        let found = self.tokens.peek().as_tjp_string();
                        return Err(self.unknown_attribute().unwrap_or(ParseError::TokenMismatch {
                            expected: *class,
                            found,
                            location: self.tokens.location(),
                        }));
                    }
                    MatchedValue::Token(self.consume()?)
                }
                Symbol::Rule(id) => MatchedValue::Rule(self.match_rule(*id)?),
            };
            items.push(item);
        }

        match &pattern.action {
            Some(action) => {
                let values = Values::new(items, location);
                log_debug!("Running pattern action", "symbols" => values.len());
                action(self, &values)
            }
            None => Ok(None),
        }
    }

    fn consume(&mut self) -> Result<Token, ParseError> {
        match self.tokens.advance() {
            Some(token) => Ok(token.value),
            None => Err(self.mismatch("A token".to_string(), None)),
        }
    }

    /// An identifier where a repeatable attribute rule just gave up. Only
    /// consulted for literal and token class mismatches.
    fn unknown_attribute(&self) -> Option<ParseError> {
        let Token::Id(keyword) = self.tokens.peek() else {
            return None;
        };
        let stop = self.stop?;
        if stop.consumed != self.tokens.consumed() {
            return None;
        }
        Some(ParseError::UnknownAttribute {
            keyword: keyword.clone(),
            rule: self.grammar.rule(stop.rule).name.clone(),
            location: self.tokens.location(),
        })
    }

    /// `found` is only given for rules; literals report the next token
    fn mismatch(&self, expected: String, rule_found: Option<String>) -> ParseError {
        let location = self.tokens.location();
        match rule_found {
            Some(found) => ParseError::RuleExpected {
                rule: expected,
                found,
                location,
            },
            None => self.unknown_attribute().unwrap_or_else(|| ParseError::UnexpectedToken {
                expected,
                found: self.tokens.peek().as_tjp_string(),
                location,
            }),
        }
    }
}
