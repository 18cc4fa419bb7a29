use super::scenario_index;
use crate::grammar::{GrammarBuilder, Value};
use crate::model::Scenario;
use crate::syntax::{ParseContext, ParseError};

pub(super) fn declare(g: &mut GrammarBuilder) {
    g.declare("scenario")
        .pattern(&["!scenarioHeader", "!scenarioBody"], |ctx, _| {
            let parent = ctx
                .scenario
                .and_then(|idx| ctx.project.as_ref()?.scenario(idx))
                .and_then(|s| s.parent);
            ctx.scenario = parent;
            Ok(None)
        });

    g.declare("scenarioHeader")
        .pattern(&["_scenario", "$ID", "$STRING"], |ctx, v| {
            let parent = ctx.scenario;
            let replace_default = parent.is_none() && !ctx.scenarios_replaced;
            let location = ctx.tokens().last_location();
            let project = ctx.project_mut()?;
            // The first top-level scenario takes the place of the default one
            if replace_default {
                project.clear_scenarios();
            }
            let idx = project
                .add_scenario(Scenario::new(v.string(1)?, v.string(2)?, parent))
                .map_err(|message| ParseError::semantic(message, location))?;
            ctx.scenarios_replaced = true;
            ctx.scenario = Some(idx);
            Ok(None)
        });

    g.declare("scenarioBody")
        .optional()
        .sequence(&["_{", "!scenarioAttributes", "_}"]);

    g.declare("scenarioAttributes")
        .optional()
        .repeatable()
        .sequence(&["!scenario"])
        .pattern(&["_disabled"], |ctx, _| set_enabled(ctx, false))
        .pattern(&["_enabled"], |ctx, _| set_enabled(ctx, true));

    g.declare("scenarioId")
        .pattern(&["$ID_WITH_COLON"], |ctx, v| {
            ctx.scenario_idx = scenario_index(ctx, &v.string(0)?)?;
            Ok(None)
        });

    g.declare("scenarioIdx").pattern(&["$ID"], |ctx, v| {
        let idx = scenario_index(ctx, &v.string(0)?)?;
        Ok(Some(Value::Int(idx as i64)))
    });

    g.declare_comma_list("scenarioIdList", "!scenarioIdx");
}

fn set_enabled(ctx: &mut ParseContext, enabled: bool) -> Result<Option<Value>, ParseError> {
    let location = ctx.tokens().last_location();
    let scenario = match (ctx.scenario, ctx.project.as_mut()) {
        (Some(idx), Some(project)) => project.scenarios.get_mut(idx),
        _ => None,
    };
    match scenario {
        Some(scenario) => {
            scenario.enabled = enabled;
            Ok(None)
        }
        None => Err(ParseError::semantic("No scenario in this context", location)),
    }
}
