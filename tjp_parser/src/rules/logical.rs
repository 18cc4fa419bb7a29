//! Logical expressions for report filters
//!
//! An operation is one operand with at most one trailing operator and
//! operand. Longer chains need parentheses.

use crate::grammar::{GrammarBuilder, Value};
use crate::log_warning;
use crate::logging::codes;
use crate::model::{LogicalExpression, Operand, Operation, Operator};
use crate::syntax::{ParseContext, ParseError};

pub(super) fn declare(g: &mut GrammarBuilder) {
    g.declare("logicalExpression").pattern(&["!operation"], |_, v| {
        let location = v.location();
        let expression =
            LogicalExpression::new(v.operation(0)?, location.file.to_string(), location.line);
        Ok(Some(Value::Expression(expression)))
    });

    g.declare("operation")
        .pattern(&["!operand", "!operatorAndOperand"], |ctx, v| {
            let operand1 = v.operand(0)?;
            let operation = match v.value(1) {
                Some(Value::Pair(operator, operand2)) => {
                    let operator = operator_of(ctx, *operator)?;
                    match *operand2 {
                        Value::Operand(operand2) => Operation::binary(operand1, operator, operand2),
                        other => {
                            return Err(ctx.error(format!(
                                "Operand expected but found {}",
                                other.type_name()
                            )))
                        }
                    }
                }
                _ => Operation::new(operand1),
            };
            Ok(Some(Value::Operation(operation)))
        });

    g.declare_operand_chain(
        "operatorAndOperand",
        &["|", "&", ">", "<", "=", ">=", "<="],
        "!operand",
    );

    g.declare("operand")
        .pattern(&["_(", "!operation", "_)"], |_, v| {
            let operation = v.operation(1)?;
            Ok(Some(Value::Operand(Operand::Operation(Box::new(operation)))))
        })
        .pattern(&["_~", "!operand"], |_, v| {
            let negation = Operation::negation(v.operand(1)?);
            Ok(Some(Value::Operand(Operand::Operation(Box::new(negation)))))
        })
        .pattern(&["$ABSOLUTE_ID"], |ctx, v| {
            let operand = attribute_operand(ctx, &v.string(0)?)?;
            Ok(Some(Value::Operand(operand)))
        })
        .pattern(&["$DATE"], |_, v| Ok(Some(Value::Operand(Operand::Date(v.date(0)?)))))
        .pattern(&["$ID", "!argumentList"], |ctx, v| {
            let id = v.string(0)?;
            let operand = if v.is_present(1) {
                let arguments = v.list(1).len();
                log_warning!(code = codes::warnings::UNSUPPORTED_FUNCTION,
                    "Function calls in logical expressions are not evaluated",
                    "function" => id,
                    "arguments" => arguments,
                    "location" => v.location()
                );
                Operand::Unsupported {
                    function: id,
                    arguments,
                }
            } else {
                declared_flag(ctx, id)?
            };
            Ok(Some(Value::Operand(operand)))
        })
        .pattern(&["$INTEGER"], |_, v| Ok(Some(Value::Operand(Operand::Integer(v.int(0)?)))))
        .pattern(&["$STRING"], |_, v| {
            Ok(Some(Value::Operand(Operand::String(v.string(0)?))))
        });

    g.declare("argumentList")
        .optional()
        .pattern(&["_(", "!arguments", "_)"], |_, v| Ok(Some(Value::List(v.list(1)))));

    g.declare_comma_list("arguments", "!operation");

    g.declare("flag").pattern(&["$ID"], |ctx, v| {
        let id = v.string(0)?;
        declared_flag(ctx, id.clone())?;
        Ok(Some(Value::Str(id)))
    });

    g.declare_comma_list("flagList", "!flag");
}

fn operator_of(ctx: &ParseContext, value: Value) -> Result<Operator, ParseError> {
    match value {
        Value::Str(symbol) => Operator::from_symbol(&symbol)
            .ok_or_else(|| ctx.error(format!("Unknown operator {}", symbol))),
        other => Err(ctx.error(format!("Operator expected but found {}", other.type_name()))),
    }
}

/// `<scenario>.<attribute>`
fn attribute_operand(ctx: &ParseContext, text: &str) -> Result<Operand, ParseError> {
    let Some((scenario, attribute)) = text.split_once('.') else {
        return Err(ctx.error("Attributes must be specified as <scenarioID>.<attribute>"));
    };
    if attribute.contains('.') {
        return Err(ctx.error("Attributes must be specified as <scenarioID>.<attribute>"));
    }
    let scenario_idx = ctx
        .project()?
        .scenario_idx(scenario)
        .ok_or_else(|| ctx.error(format!("Unknown scenario ID {}", scenario)))?;
    Ok(Operand::Attribute {
        name: attribute.to_string(),
        scenario_idx,
    })
}

fn declared_flag(ctx: &ParseContext, id: String) -> Result<Operand, ParseError> {
    if !ctx.project()?.has_flag(&id) {
        return Err(ctx.error(format!("Undeclared flag {}", id)));
    }
    Ok(Operand::Flag(id))
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use crate::model::{Operand, Operation, Operator};
    use crate::syntax::ParseError;
    use assert_matches::assert_matches;

    fn parse_expression(prelude: &str, source: &str) -> Result<Operation, ParseError> {
        let mut ctx = context_after(prelude, source);
        let value = ctx.parse_rule("logicalExpression")?;
        ctx.expect_end()?;
        match value {
            Some(crate::grammar::Value::Expression(expression)) => Ok(expression.operation),
            other => panic!("expected an expression, got {:?}", other),
        }
    }

    const SCENARIOS: &str = r#"{ scenario plan "Plan" { scenario scenario1 "S1" } }
        flags important, hidden"#;

    #[test]
    fn test_attribute_comparison() {
        let operation = parse_expression(SCENARIOS, "scenario1.priority > 500").unwrap();
        assert_eq!(
            operation,
            Operation::binary(
                Operand::Attribute {
                    name: "priority".into(),
                    scenario_idx: 1
                },
                Operator::Greater,
                Operand::Integer(500)
            )
        );
    }

    #[test]
    fn test_attribute_must_have_one_dot() {
        let err = parse_expression(SCENARIOS, "scenario1.plan.status").unwrap_err();
        assert_eq!(err.message(), "Attributes must be specified as <scenarioID>.<attribute>");

        let err = parse_expression(SCENARIOS, "nope.priority").unwrap_err();
        assert_eq!(err.message(), "Unknown scenario ID nope");
    }

    #[test]
    fn test_flags_negation_and_grouping() {
        let operation = parse_expression(SCENARIOS, "~important | (hidden & important)").unwrap();
        assert_eq!(operation.operator, Some(Operator::Or));
        assert_matches!(
            &operation.operand1,
            Operand::Operation(inner) if inner.operator == Some(Operator::Not)
        );
        assert_matches!(
            &operation.operand2,
            Some(Operand::Operation(inner)) if inner.operator == Some(Operator::And)
        );

        let err = parse_expression(SCENARIOS, "urgent").unwrap_err();
        assert_eq!(err.message(), "Undeclared flag urgent");
    }

    #[test]
    fn test_function_calls_are_accepted() {
        let operation = parse_expression(SCENARIOS, "isleaf(important, 3) = 1").unwrap();
        assert_eq!(
            operation.operand1,
            Operand::Unsupported {
                function: "isleaf".into(),
                arguments: 2
            }
        );
        assert_eq!(operation.operator, Some(Operator::Equal));
    }

    #[test]
    fn test_comparison_operators() {
        for (text, operator) in [
            ("1 >= 2", Operator::GreaterOrEqual),
            ("1 <= 2", Operator::LessOrEqual),
            ("1 < 2", Operator::Less),
            ("\"a\" = \"b\"", Operator::Equal),
        ] {
            let operation = parse_expression(SCENARIOS, text).unwrap();
            assert_eq!(operation.operator, Some(operator), "{}", text);
        }
    }

    #[test]
    fn test_hidetask_in_report() {
        let project = parse_with_header(
            "flags internal\nhtmltaskreport \"R\" { hidetask ~internal }",
        )
        .unwrap();
        let hide = project.reports[0].element.hide_task.as_ref().unwrap();
        assert_eq!(hide.line, 3);
        assert_eq!(hide.file, "test.tjp");
    }
}
