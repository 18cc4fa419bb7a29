//! Attribute patterns appended by `extend` during a parse
//!
//! The shared grammar table is never touched. Appends live in the parse
//! context and are consulted after the base alternatives of a rule.

use crate::grammar::{Pattern, RuleId, Symbol, Value, Values};
use crate::logging::codes;
use crate::model::{AttributeDefinition, AttributeKind, AttributeValue};
use crate::syntax::{ParseContext, ParseError};
use crate::tokens::Token;
use crate::{log_error, log_success};
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Debug, Default)]
pub struct ExtensionLayer {
    appended: HashMap<RuleId, Vec<Arc<Pattern>>>,
}

impl ExtensionLayer {
    pub fn append(&mut self, rule: RuleId, pattern: Pattern) {
        self.appended.entry(rule).or_default().push(Arc::new(pattern));
    }

    pub fn appended(&self, rule: RuleId) -> &[Arc<Pattern>] {
        self.appended.get(&rule).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Total number of appended patterns
    pub fn len(&self) -> usize {
        self.appended.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// One attribute declared inside an `extend` block
#[derive(Debug, Clone)]
pub struct AttributeExtension {
    pub id: String,
    pub name: String,
    pub kind: AttributeKind,
    pub inherit: bool,
    pub scenario_specific: bool,
}

impl AttributeExtension {
    pub fn keyword(&self) -> String {
        self.id.to_ascii_lowercase()
    }

    fn symbol_specs(&self, keyword: &str) -> Vec<String> {
        let mut specs = vec![format!("_{}", keyword)];
        match self.kind {
            AttributeKind::Date => specs.push("$DATE".to_string()),
            AttributeKind::Reference => {
                specs.push("$STRING".to_string());
                specs.push("!referenceBody".to_string());
            }
            _ => specs.push("$STRING".to_string()),
        }
        specs
    }
}

fn extension_value(kind: AttributeKind, values: &Values) -> Result<AttributeValue, ParseError> {
    Ok(match kind {
        AttributeKind::Date => AttributeValue::Date(values.date(1)?),
        AttributeKind::Reference => AttributeValue::Reference {
            url: values.string(1)?,
            label: values.list(2).into_iter().find_map(|v| match v {
                Value::Str(label) => Some(label),
                _ => None,
            }),
        },
        _ => AttributeValue::Text(values.string(1)?),
    })
}

impl ParseContext {
    /// Register a user defined attribute and make its keyword parseable
    pub fn apply_extension(&mut self, extension: AttributeExtension) -> Result<(), ParseError> {
        let target = self
            .extend_target
            .ok_or_else(|| self.error("Extendable property expected: task or resource"))?;
        let keyword = extension.keyword();

        if self.rule_accepts(target.rule, &Token::Id(keyword.clone()))? {
            let error = self.error(format!(
                "The attribute keyword '{}' is already used by a {} attribute",
                keyword,
                target.kind.as_str()
            ));
            log_error!(codes::semantic::EXTENSION_ERROR, "Extension keyword collision",
                "keyword" => keyword
            );
            return Err(error);
        }

        let definition = AttributeDefinition {
            id: extension.id.clone(),
            name: extension.name.clone(),
            kind: extension.kind,
            inherit: extension.inherit,
            scenario_specific: extension.scenario_specific,
            user_defined: true,
        };
        let location = self.tokens.last_location();
        self.project_mut()?
            .property_set_mut(target.kind)
            .define(definition)
            .map_err(|message| ParseError::semantic(message, location))?;

        let symbols = extension
            .symbol_specs(&keyword)
            .iter()
            .map(|spec| self.grammar.symbol(spec))
            .collect::<Result<Vec<Symbol>, _>>()
            .map_err(|e| self.grammar_error(e))?;

        let attribute = extension.id.clone();
        let kind = extension.kind;
        let scenario_specific = extension.scenario_specific;
        let action = move |ctx: &mut ParseContext,
                           values: &Values|
              -> Result<Option<Value>, ParseError> {
            let value = extension_value(kind, values)?;
            if scenario_specific {
                ctx.set_scenario_attribute(&attribute, value)?;
            } else {
                ctx.current_property_mut()?.set(&attribute, value);
            }
            Ok(None)
        };

        let rule = if scenario_specific {
            target.scenario_rule
        } else {
            target.rule
        };
        self.extensions
            .append(rule, Pattern::new(symbols, Some(Arc::new(action))));

        if self.preferences.log_extensions {
            log_success!(codes::success::EXTENSION_APPLIED, "Attribute pattern appended",
                "attribute" => extension.id,
                "property" => target.kind.as_str(),
                "rule" => self.grammar.rule(rule).name
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::GrammarBuilder;

    #[test]
    fn test_layer_appends_in_order() {
        let mut g = GrammarBuilder::new();
        g.declare("attrs").sequence(&["_start", "$DATE"]);
        let table = g.build().unwrap();
        let rule = table.rule_id("attrs").unwrap();

        let mut layer = ExtensionLayer::default();
        assert!(layer.is_empty());
        layer.append(rule, Pattern::new(vec![table.symbol("_cost").unwrap()], None));
        layer.append(rule, Pattern::new(vec![table.symbol("_owner").unwrap()], None));

        let keywords: Vec<_> = layer.appended(rule).iter().filter_map(|p| p.keyword()).collect();
        assert_eq!(keywords, vec!["cost", "owner"]);
        assert_eq!(layer.len(), 2);
    }

    #[test]
    fn test_symbol_specs_per_kind() {
        let ext = AttributeExtension {
            id: "Website".into(),
            name: "Web site".into(),
            kind: AttributeKind::Reference,
            inherit: false,
            scenario_specific: false,
        };
        assert_eq!(ext.keyword(), "website");
        assert_eq!(
            ext.symbol_specs("website"),
            vec!["_website", "$STRING", "!referenceBody"]
        );
    }
}
