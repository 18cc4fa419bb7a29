use super::strings;
use crate::grammar::{GrammarBuilder, Value, Values};
use crate::model::{AttributeKind, PropertyKind};
use crate::syntax::{AttributeExtension, ExtendTarget, ParseContext, ParseError};

pub(super) fn declare(g: &mut GrammarBuilder) {
    g.declare("extendProperty").pattern(&["$ID"], |ctx, v| {
        let (kind, rule, scenario_rule) = match v.string(0)?.as_str() {
            "task" => (PropertyKind::Task, "taskAttributes", "taskScenarioAttributes"),
            "resource" => (
                PropertyKind::Resource,
                "resourceAttributes",
                "resourceScenarioAttributes",
            ),
            _ => return Err(ctx.error("Extendable property expected: task or resource")),
        };
        ctx.extend_target = Some(ExtendTarget {
            kind,
            rule: ctx.rule_id(rule)?,
            scenario_rule: ctx.rule_id(scenario_rule)?,
        });
        Ok(None)
    });

    g.declare("extendBody")
        .optional()
        .sequence(&["_{", "!extendAttributes", "_}"]);

    g.declare("extendAttributes")
        .optional()
        .repeatable()
        .pattern(
            &["_date", "!extendId", "$STRING", "!extendOptionsBody"],
            |ctx, v| extend(ctx, v, AttributeKind::Date),
        )
        .pattern(
            &["_reference", "!extendId", "$STRING", "!extendOptionsBody"],
            |ctx, v| extend(ctx, v, AttributeKind::Reference),
        )
        .pattern(
            &["_text", "!extendId", "$STRING", "!extendOptionsBody"],
            |ctx, v| extend(ctx, v, AttributeKind::Text),
        );

    g.declare("extendId").pattern(&["$ID"], |ctx, v| {
        let id = v.string(0)?;
        if !id.starts_with(|c: char| c.is_ascii_uppercase()) {
            return Err(ctx.error("User defined attribute IDs must start with a capital letter"));
        }
        Ok(Some(Value::Str(id)))
    });

    g.declare("extendOptionsBody")
        .optional()
        .pattern(&["_{", "!extendOptions", "_}"], |_, v| Ok(v.value(1)));

    g.declare("extendOptions")
        .optional()
        .repeatable()
        .single("_inherit")
        .single("_scenariospecific");

    g.declare("referenceBody")
        .optional()
        .pattern(&["_{", "!referenceAttributes", "_}"], |_, v| Ok(v.value(1)));

    g.declare("referenceAttributes")
        .optional()
        .repeatable()
        .pattern(&["_label", "$STRING"], |_, v| Ok(v.value(1)));
}

fn extend(
    ctx: &mut ParseContext,
    v: &Values,
    kind: AttributeKind,
) -> Result<Option<Value>, ParseError> {
    let options = strings(v.list(3));
    ctx.apply_extension(AttributeExtension {
        id: v.string(1)?,
        name: v.string(2)?,
        kind,
        inherit: options.iter().any(|o| o == "inherit"),
        scenario_specific: options.iter().any(|o| o == "scenariospecific"),
    })?;
    Ok(None)
}
