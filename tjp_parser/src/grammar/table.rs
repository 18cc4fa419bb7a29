//! Grammar table and its declaration API
//!
//! Rules are declared by name with symbol specs; `build()` resolves the
//! names to `RuleId`s and validates the whole table before it is shared.

use crate::config::compile_time::syntax::MAX_FIRST_SET_DEPTH;
use crate::grammar::symbol::{parse_spec, SymbolSpec};
use crate::grammar::{Action, GrammarError, Pattern, Rule, RuleId, Symbol, Terminal, Value, Values};
use crate::logging::codes;
use crate::syntax::{ParseContext, ParseError};
use crate::{log_error, log_success};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

#[derive(Debug)]
pub struct GrammarTable {
    rules: Vec<Rule>,
    by_name: HashMap<String, RuleId>,
}

impl GrammarTable {
    /// Ids only come from this table, so the index is always valid
    pub fn rule(&self, id: RuleId) -> &Rule {
        &self.rules[id.0]
    }

    pub fn rule_id(&self, name: &str) -> Option<RuleId> {
        self.by_name.get(name).copied()
    }

    pub fn rule_by_name(&self, name: &str) -> Option<&Rule> {
        self.rule_id(name).map(|id| self.rule(id))
    }

    pub fn rules(&self) -> impl Iterator<Item = &Rule> {
        self.rules.iter()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Resolve a symbol spec against this table
    pub fn symbol(&self, spec: &str) -> Result<Symbol, GrammarError> {
        resolve_symbol("<runtime>", spec, &self.by_name)
    }

    /// First terminals of a pattern over the base alternatives
    pub fn first_terminals(&self, pattern: &Pattern) -> Vec<Terminal> {
        let mut terminals = Vec::new();
        if let Some(first) = pattern.first() {
            self.collect_first(first, 0, &mut terminals);
        }
        terminals
    }

    fn collect_first(&self, symbol: &Symbol, depth: usize, out: &mut Vec<Terminal>) {
        match symbol {
            Symbol::Literal(text) => out.push(Terminal::Literal(text.clone())),
            Symbol::Class(class) => out.push(Terminal::Class(*class)),
            Symbol::Rule(id) => {
                if depth >= MAX_FIRST_SET_DEPTH {
                    return;
                }
                for pattern in &self.rule(*id).patterns {
                    if let Some(first) = pattern.first() {
                        self.collect_first(first, depth + 1, out);
                    }
                }
            }
        }
    }

    fn check_left_recursion(&self) -> Result<(), GrammarError> {
        for rule in &self.rules {
            let mut pending: Vec<(RuleId, usize)> =
                first_rule_refs(rule).map(|id| (id, 1)).collect();
            let mut seen = HashSet::new();

            while let Some((id, depth)) = pending.pop() {
                if id == rule.id || depth > MAX_FIRST_SET_DEPTH {
                    return Err(GrammarError::LeftRecursion {
                        rule: rule.name.clone(),
                    });
                }
                if seen.insert(id) {
                    pending.extend(first_rule_refs(self.rule(id)).map(|next| (next, depth + 1)));
                }
            }
        }
        Ok(())
    }

    fn check_ambiguity(&self) -> Result<(), GrammarError> {
        for rule in &self.rules {
            let firsts: Vec<Vec<Terminal>> = rule
                .patterns
                .iter()
                .map(|p| self.first_terminals(p))
                .collect();

            for (i, a) in firsts.iter().enumerate() {
                for (j, b) in firsts.iter().enumerate().skip(i + 1) {
                    if let Some(terminal) = a.iter().find(|t| b.iter().any(|u| t.overlaps(u))) {
                        return Err(GrammarError::AmbiguousAlternatives {
                            rule: rule.name.clone(),
                            first: i,
                            second: j,
                            terminal: terminal.to_string(),
                        });
                    }
                }
            }
        }
        Ok(())
    }
}

fn first_rule_refs(rule: &Rule) -> impl Iterator<Item = RuleId> + '_ {
    rule.patterns.iter().filter_map(|p| match p.first() {
        Some(Symbol::Rule(id)) => Some(*id),
        _ => None,
    })
}

fn resolve_symbol(
    rule: &str,
    spec: &str,
    by_name: &HashMap<String, RuleId>,
) -> Result<Symbol, GrammarError> {
    match parse_spec(spec) {
        Some(SymbolSpec::Literal(text)) => Ok(Symbol::Literal(text.to_string())),
        Some(SymbolSpec::Class(class)) => Ok(Symbol::Class(class)),
        Some(SymbolSpec::Rule(name)) => by_name
            .get(name)
            .copied()
            .map(Symbol::Rule)
            .ok_or_else(|| GrammarError::undefined_rule(rule, name)),
        None => Err(GrammarError::invalid_symbol(rule, spec)),
    }
}

struct PatternDecl {
    symbols: Vec<String>,
    action: Option<Action>,
}

struct RuleDecl {
    name: String,
    patterns: Vec<PatternDecl>,
    optional: bool,
    repeatable: bool,
}

/// Handle for adding patterns and flags to one declared rule
pub struct RuleBuilder<'a> {
    decl: &'a mut RuleDecl,
}

impl<'a> RuleBuilder<'a> {
    pub fn optional(self) -> Self {
        self.decl.optional = true;
        self
    }

    pub fn repeatable(self) -> Self {
        self.decl.repeatable = true;
        self
    }

    pub fn pattern<F>(self, symbols: &[&str], action: F) -> Self
    where
        F: Fn(&mut ParseContext, &Values) -> Result<Option<Value>, ParseError>
            + Send
            + Sync
            + 'static,
    {
        self.push(symbols, Some(Arc::new(action)))
    }

    /// Pattern without an action; it produces no value
    pub fn sequence(self, symbols: &[&str]) -> Self {
        self.push(symbols, None)
    }

    /// One-symbol pattern producing the symbol's own value
    pub fn single(self, symbol: &str) -> Self {
        self.pattern(&[symbol], |_, values| Ok(values.value(0)))
    }

    fn push(self, symbols: &[&str], action: Option<Action>) -> Self {
        self.decl.patterns.push(PatternDecl {
            symbols: symbols.iter().map(|s| s.to_string()).collect(),
            action,
        });
        self
    }
}

#[derive(Default)]
pub struct GrammarBuilder {
    decls: Vec<RuleDecl>,
}

impl GrammarBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn declare(&mut self, name: &str) -> RuleBuilder<'_> {
        self.decls.push(RuleDecl {
            name: name.to_string(),
            patterns: Vec::new(),
            optional: false,
            repeatable: false,
        });
        let last = self.decls.len() - 1;
        RuleBuilder {
            decl: &mut self.decls[last],
        }
    }

    /// Rule whose alternatives are single symbols, e.g. keyword choices
    pub fn declare_single(&mut self, name: &str, symbols: &[&str]) -> RuleBuilder<'_> {
        let mut rule = self.declare(name);
        for symbol in symbols {
            rule = rule.single(symbol);
        }
        rule
    }

    /// `name = element more<Name>` with an optional repeatable tail
    pub fn declare_list(&mut self, name: &str, element: &str) {
        self.list(name, &[element], 0);
    }

    /// Like `declare_list`, but continuations are `, element`
    pub fn declare_comma_list(&mut self, name: &str, element: &str) {
        self.list(name, &["_,", element], 1);
    }

    fn list(&mut self, name: &str, continuation: &[&str], element_index: usize) {
        let tail = more_rule_name(name);
        let element = continuation[element_index];

        self.declare(&tail)
            .optional()
            .repeatable()
            .pattern(continuation, move |_, values| Ok(values.value(element_index)));

        let tail_ref = format!("!{}", tail);
        self.declare(name)
            .pattern(&[element, tail_ref.as_str()], |_, values| {
                let mut items: Vec<Value> = values.value(0).into_iter().collect();
                items.extend(values.list(1));
                Ok(Some(Value::List(items)))
            });
    }

    /// Optional rule `op operand` for each operator, yielding `(op, operand)`
    pub fn declare_operand_chain(&mut self, name: &str, operators: &[&str], operand: &str) {
        let mut rule = self.declare(name).optional();
        for op in operators {
            let literal = format!("_{}", op);
            rule = rule.pattern(&[literal.as_str(), operand], |_, values| {
                Ok(Some(Value::pair(values.required(0)?, values.required(1)?)))
            });
        }
    }

    pub fn build(self) -> Result<GrammarTable, GrammarError> {
        let table = self.resolve().and_then(|table| {
            table.check_left_recursion()?;
            table.check_ambiguity()?;
            Ok(table)
        });

        match table {
            Ok(table) => {
                log_success!(codes::success::GRAMMAR_BUILT, "Grammar table built",
                    "rules" => table.len(),
                    "patterns" => table.rules().map(|r| r.patterns.len()).sum::<usize>()
                );
                Ok(table)
            }
            Err(error) => {
                log_error!(error.error_code(), "Grammar validation failed", "error" => error);
                Err(error)
            }
        }
    }

    fn resolve(self) -> Result<GrammarTable, GrammarError> {
        let mut by_name = HashMap::new();
        for (idx, decl) in self.decls.iter().enumerate() {
            if by_name.insert(decl.name.clone(), RuleId(idx)).is_some() {
                return Err(GrammarError::duplicate_rule(&decl.name));
            }
        }

        let mut rules = Vec::with_capacity(self.decls.len());
        for (idx, decl) in self.decls.into_iter().enumerate() {
            if decl.patterns.is_empty() {
                return Err(GrammarError::EmptyPattern { rule: decl.name });
            }

            let mut patterns = Vec::with_capacity(decl.patterns.len());
            for pattern in decl.patterns {
                if pattern.symbols.is_empty() {
                    return Err(GrammarError::EmptyPattern { rule: decl.name });
                }
                let symbols = pattern
                    .symbols
                    .iter()
                    .map(|spec| resolve_symbol(&decl.name, spec, &by_name))
                    .collect::<Result<Vec<_>, _>>()?;
                patterns.push(Arc::new(Pattern::new(symbols, pattern.action)));
            }

            rules.push(Rule {
                id: RuleId(idx),
                name: decl.name,
                patterns,
                optional: decl.optional,
                repeatable: decl.repeatable,
            });
        }

        Ok(GrammarTable { rules, by_name })
    }
}

/// `taskList` -> `moreTaskList`
fn more_rule_name(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => format!("more{}{}", first.to_ascii_uppercase(), chars.as_str()),
        None => "more".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokens::TokenClass;
    use assert_matches::assert_matches;

    #[test]
    fn test_build_resolves_references() {
        let mut g = GrammarBuilder::new();
        g.declare("top").sequence(&["_begin", "!item", "_end"]);
        g.declare_single("item", &["$ID", "$INTEGER"]);
        let table = g.build().unwrap();

        let top = table.rule_by_name("top").unwrap();
        let item = table.rule_id("item").unwrap();
        assert_eq!(top.patterns[0].symbols[1], Symbol::Rule(item));
        assert_eq!(top.patterns[0].keyword(), Some("begin"));
        assert_eq!(table.rule(item).patterns.len(), 2);
        assert!(table.rule(item).patterns[0].action.is_some());
        assert!(top.patterns[0].action.is_none());
    }

    #[test]
    fn test_duplicate_rule() {
        let mut g = GrammarBuilder::new();
        g.declare("a").sequence(&["_x"]);
        g.declare("a").sequence(&["_y"]);
        assert_matches!(g.build(), Err(GrammarError::DuplicateRule { name }) if name == "a");
    }

    #[test]
    fn test_undefined_rule_and_invalid_symbol() {
        let mut g = GrammarBuilder::new();
        g.declare("a").sequence(&["!missing"]);
        assert_matches!(g.build(), Err(GrammarError::UndefinedRule { name, .. }) if name == "missing");

        let mut g = GrammarBuilder::new();
        g.declare("a").sequence(&["$NUMBER"]);
        assert_matches!(g.build(), Err(GrammarError::InvalidSymbol { .. }));
    }

    #[test]
    fn test_empty_patterns() {
        let mut g = GrammarBuilder::new();
        g.declare("a").sequence(&[]);
        assert_matches!(g.build(), Err(GrammarError::EmptyPattern { .. }));

        let mut g = GrammarBuilder::new();
        g.declare("a");
        assert_matches!(g.build(), Err(GrammarError::EmptyPattern { .. }));
    }

    #[test]
    fn test_left_recursion() {
        let mut g = GrammarBuilder::new();
        g.declare("expr").sequence(&["!term", "_+", "$INTEGER"]);
        g.declare("term").sequence(&["!expr"]).sequence(&["$ID"]);
        assert_matches!(g.build(), Err(GrammarError::LeftRecursion { .. }));
    }

    #[test]
    fn test_ambiguous_alternatives() {
        let mut g = GrammarBuilder::new();
        g.declare("attr").sequence(&["_start", "$DATE"]).sequence(&["!other"]);
        g.declare("other").sequence(&["_start", "$INTEGER"]);
        assert_matches!(
            g.build(),
            Err(GrammarError::AmbiguousAlternatives { first: 0, second: 1, .. })
        );

        let mut g = GrammarBuilder::new();
        g.declare("operand").sequence(&["_start"]).sequence(&["$ID"]);
        assert_matches!(g.build(), Err(GrammarError::AmbiguousAlternatives { .. }));
    }

    #[test]
    fn test_list_sugar() {
        let mut g = GrammarBuilder::new();
        g.declare_comma_list("idList", "$ID");
        g.declare_list("dates", "$DATE");
        g.declare_operand_chain("tail", &["|", "&"], "$INTEGER");
        let table = g.build().unwrap();

        let more = table.rule_by_name("moreIdList").unwrap();
        assert!(more.optional && more.repeatable);
        assert_eq!(more.patterns[0].symbols[0], Symbol::Literal(",".into()));
        assert_eq!(more.patterns[0].symbols[1], Symbol::Class(TokenClass::Id));
        assert!(table.rule_by_name("moreDates").is_some());

        let tail = table.rule_by_name("tail").unwrap();
        assert!(tail.optional);
        assert_eq!(tail.patterns.len(), 2);
        assert_eq!(tail.patterns[1].keyword(), Some("&"));
    }

    #[test]
    fn test_runtime_symbol_resolution() {
        let mut g = GrammarBuilder::new();
        g.declare("body").sequence(&["_{", "_}"]);
        let table = g.build().unwrap();
        assert_eq!(table.symbol("_cost").unwrap(), Symbol::Literal("cost".into()));
        assert_eq!(table.symbol("$STRING").unwrap(), Symbol::Class(TokenClass::String));
        assert!(table.symbol("!body").is_ok());
        assert_matches!(table.symbol("!nothing"), Err(GrammarError::UndefinedRule { .. }));
    }

    #[test]
    fn test_more_rule_name() {
        assert_eq!(more_rule_name("taskList"), "moreTaskList");
        assert_eq!(more_rule_name("x"), "moreX");
    }
}
