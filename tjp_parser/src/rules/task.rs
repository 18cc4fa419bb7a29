use super::{close_property, open_property, strings};
use crate::grammar::{GrammarBuilder, Value};
use crate::model::{AttributeValue, PropertyKind, TaskDependency};
use crate::syntax::{ParseContext, ParseError};

pub(super) fn declare(g: &mut GrammarBuilder) {
    g.declare("task")
        .pattern(&["!taskHeader", "!taskBody"], |ctx, _| {
            close_property(ctx);
            Ok(None)
        });

    g.declare("taskHeader")
        .pattern(&["_task", "$ID", "$STRING"], |ctx, v| {
            open_property(ctx, PropertyKind::Task, &v.string(1)?, &v.string(2)?)?;
            ctx.scenario_idx = 0;
            Ok(None)
        });

    g.declare("taskBody")
        .optional()
        .sequence(&["_{", "!taskAttributes", "_}"]);

    g.declare("taskAttributes")
        .optional()
        .repeatable()
        .sequence(&["!task"])
        .sequence(&["!taskScenarioAttributes"])
        .pattern(&["!scenarioId", "!taskScenarioAttributes"], |ctx, _| {
            ctx.scenario_idx = 0;
            Ok(None)
        });

    g.declare("taskScenarioAttributes")
        .pattern(&["_allocate", "!resourceAllocations"], |ctx, v| {
            let mut allocations = match ctx.scenario_attribute("allocate") {
                Some(AttributeValue::Allocations(existing)) => existing,
                _ => Vec::new(),
            };
            allocations.extend(v.list(1).into_iter().filter_map(|item| match item {
                Value::Allocation(allocation) => Some(allocation),
                _ => None,
            }));
            ctx.set_scenario_attribute("allocate", AttributeValue::Allocations(allocations))?;
            Ok(None)
        })
        .pattern(&["_depends", "!taskList"], |ctx, v| {
            let dependencies = strings(v.list(1))
                .into_iter()
                .map(TaskDependency::new)
                .collect();
            ctx.set_scenario_attribute("depends", AttributeValue::Dependencies(dependencies))?;
            Ok(None)
        })
        .pattern(&["_duration", "!calendarDuration"], |ctx, v| {
            ctx.set_scenario_attribute("duration", AttributeValue::Duration(v.int(1)?))?;
            Ok(None)
        })
        .pattern(&["_effort", "!workingDuration"], |ctx, v| {
            ctx.set_scenario_attribute("effort", AttributeValue::Duration(v.int(1)?))?;
            Ok(None)
        })
        .pattern(&["_end", "!valDate"], |ctx, v| {
            ctx.set_scenario_attribute("end", AttributeValue::Date(v.date(1)?))?;
            ctx.set_scenario_attribute("forward", AttributeValue::Boolean(false))?;
            Ok(None)
        })
        .pattern(&["_flags", "!flagList"], |ctx, v| {
            append_flags(ctx, strings(v.list(1)))?;
            Ok(None)
        })
        .pattern(&["_length", "!workingDuration"], |ctx, v| {
            ctx.set_scenario_attribute("length", AttributeValue::Duration(v.int(1)?))?;
            Ok(None)
        })
        .pattern(&["_priority", "$INTEGER"], |ctx, v| {
            let priority = v.int(1)?;
            if !(0..=1000).contains(&priority) {
                return Err(ctx.error("Priority must have a value between 0 and 1000"));
            }
            ctx.set_scenario_attribute("priority", AttributeValue::Integer(priority))?;
            Ok(None)
        })
        .pattern(&["_start", "!valDate"], |ctx, v| {
            ctx.set_scenario_attribute("start", AttributeValue::Date(v.date(1)?))?;
            ctx.set_scenario_attribute("forward", AttributeValue::Boolean(true))?;
            Ok(None)
        });

    g.declare_single("taskId", &["$ABSOLUTE_ID", "$ID"])
        .pattern(&["$RELATIVE_ID"], |ctx, v| {
            let id = resolve_relative(ctx, &v.string(0)?)?;
            Ok(Some(Value::Str(id)))
        });

    g.declare_comma_list("taskList", "!taskId");

    g.declare_single("taskRootId", &["$ABSOLUTE_ID", "$ID"]);
}

/// Flags accumulate per scenario; the same flag is stored once
pub(super) fn append_flags(ctx: &mut ParseContext, flags: Vec<String>) -> Result<(), ParseError> {
    let mut current = match ctx.scenario_attribute("flags") {
        Some(AttributeValue::Flags(existing)) => existing,
        _ => Vec::new(),
    };
    for flag in flags {
        if !current.contains(&flag) {
            current.push(flag);
        }
    }
    ctx.set_scenario_attribute("flags", AttributeValue::Flags(current))
}

/// Each leading `!` moves one level up from the task being defined
fn resolve_relative(ctx: &ParseContext, relative: &str) -> Result<String, ParseError> {
    let mut id = relative;
    let mut task = match ctx.property {
        Some((PropertyKind::Task, idx)) => Some(idx),
        _ => None,
    };
    let tasks = &ctx.project()?.tasks;

    while let (Some(idx), Some(rest)) = (task, id.strip_prefix('!')) {
        id = rest;
        task = tasks.get(idx).and_then(|t| t.parent);
    }
    if id.starts_with('!') {
        return Err(ctx.error("Too many '!' for relative task in this context"));
    }

    Ok(match task.and_then(|idx| tasks.get(idx)) {
        Some(base) => format!("{}.{}", base.id, id),
        None => id.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use crate::model::{AttributeValue, TaskDependency};
    use chrono::NaiveDate;

    #[test]
    fn test_task_tree_and_attributes() {
        let project = parse_with_header(
            r#"flags important
            task build "Build" {
                priority 700
                task compile "Compile" {
                    effort 1d
                    start 2024-02-01
                }
                task link "Link" {
                    depends !compile
                    duration 2w
                    flags important
                }
            }"#,
        )
        .unwrap();

        let compile = project.task("build.compile").unwrap();
        assert_eq!(compile.get_scenario(0, "effort"), Some(&AttributeValue::Duration(8)));
        assert_eq!(compile.get_scenario(0, "forward"), Some(&AttributeValue::Boolean(true)));
        assert_eq!(
            compile.get_scenario(0, "start"),
            Some(&AttributeValue::Date(
                NaiveDate::from_ymd_opt(2024, 2, 1).unwrap().and_hms_opt(0, 0, 0).unwrap()
            ))
        );
        // inherited from the parent
        assert_eq!(compile.get_scenario(0, "priority"), Some(&AttributeValue::Integer(700)));

        let link = project.task("build.link").unwrap();
        assert_eq!(
            link.get_scenario(0, "depends"),
            Some(&AttributeValue::Dependencies(vec![TaskDependency::new("build.compile")]))
        );
        assert_eq!(link.get_scenario(0, "duration"), Some(&AttributeValue::Duration(336)));
    }

    #[test]
    fn test_priority_range() {
        let err = parse_with_header("task t \"T\" { priority 1001 }").unwrap_err();
        assert_eq!(err.message(), "Priority must have a value between 0 and 1000");
        assert_eq!(err.location().line, 2);
    }

    #[test]
    fn test_relative_ids() {
        let project = parse_with_header(
            r#"task a "A" {
                task b "B" {
                    task c "C" { depends !d, !!e, a.b.d }
                    task d "D"
                }
            }"#,
        )
        .unwrap();
        let c = project.task("a.b.c").unwrap();
        assert_eq!(
            c.get_scenario(0, "depends"),
            Some(&AttributeValue::Dependencies(vec![
                TaskDependency::new("a.b.d"),
                TaskDependency::new("a.e"),
                TaskDependency::new("a.b.d"),
            ]))
        );

        let err = parse_with_header("task a \"A\" { depends !!!x }").unwrap_err();
        assert_eq!(err.message(), "Too many '!' for relative task in this context");
    }

    #[test]
    fn test_scenario_specific_values() {
        let project = parse_with_header(
            r#"{ scenario plan "Plan" { scenario delayed "Delayed" } }
            task t "T" {
                start 2024-03-01
                delayed:start 2024-04-01
                priority 100
            }"#,
        )
        .unwrap();
        let t = project.task("t").unwrap();
        assert_ne!(t.get_scenario(0, "start"), t.get_scenario(1, "start"));
        assert!(t.get_scenario(1, "start").is_some());
        // the scenario prefix applies to one attribute only
        assert!(t.get_scenario(0, "priority").is_some());
        assert!(t.get_scenario(1, "priority").is_none());
    }

    #[test]
    fn test_duplicate_task() {
        let err = parse_with_header("task t \"T\"\ntask t \"Again\"").unwrap_err();
        assert_eq!(err.message(), "Task t has already been defined");
    }
}
