use super::task::append_flags;
use super::{close_property, intervals, open_property, strings};
use crate::grammar::{GrammarBuilder, Value};
use crate::model::{Allocation, AttributeValue, PropertyKind, SelectionMode};

pub(super) fn declare(g: &mut GrammarBuilder) {
    g.declare("resource")
        .pattern(&["!resourceHeader", "!resourceBody"], |ctx, _| {
            close_property(ctx);
            Ok(None)
        });

    g.declare("resourceHeader")
        .pattern(&["_resource", "$ID", "$STRING"], |ctx, v| {
            open_property(ctx, PropertyKind::Resource, &v.string(1)?, &v.string(2)?)?;
            ctx.scenario_idx = 0;
            Ok(None)
        });

    g.declare("resourceBody")
        .optional()
        .sequence(&["_{", "!resourceAttributes", "_}"]);

    g.declare("resourceAttributes")
        .optional()
        .repeatable()
        .sequence(&["!resource"])
        .sequence(&["!resourceScenarioAttributes"])
        .pattern(&["!scenarioId", "!resourceScenarioAttributes"], |ctx, _| {
            ctx.scenario_idx = 0;
            Ok(None)
        })
        .sequence(&["!workinghours"]);

    g.declare("resourceScenarioAttributes")
        .pattern(&["_flags", "!flagList"], |ctx, v| {
            append_flags(ctx, strings(v.list(1)))?;
            Ok(None)
        })
        .pattern(&["_vacation", "!vacationName", "!intervals"], |ctx, v| {
            let mut vacations = match ctx.scenario_attribute("vacations") {
                Some(AttributeValue::Intervals(existing)) => existing,
                _ => Vec::new(),
            };
            vacations.extend(intervals(v.list(2)));
            ctx.set_scenario_attribute("vacations", AttributeValue::Intervals(vacations))?;
            Ok(None)
        });

    g.declare("resourceId").pattern(&["$ID"], |ctx, v| {
        let id = v.string(0)?;
        if ctx.project()?.resource(&id).is_none() {
            return Err(ctx.error(format!("Resource ID expected: unknown resource {}", id)));
        }
        Ok(Some(Value::Str(id)))
    });

    g.declare_comma_list("resourceIds", "!resourceId");

    g.declare("resourceAllocation")
        .pattern(&["!resourceId", "!allocationAttributes"], |_, v| {
            let mut candidates = vec![v.string(0)?];
            let mut selection_mode = SelectionMode::default();
            let mut persistent = false;
            let mut mandatory = false;

            for attribute in v.list(1) {
                match attribute {
                    Value::Pair(key, value) => match (*key, *value) {
                        (Value::Str(key), Value::List(alternatives)) if key == "alternative" => {
                            candidates.extend(strings(alternatives));
                        }
                        (Value::Str(key), Value::Str(mode)) if key == "select" => {
                            selection_mode = SelectionMode::from_keyword(&mode).unwrap_or_default();
                        }
                        _ => {}
                    },
                    Value::Str(flag) if flag == "persistent" => persistent = true,
                    Value::Str(flag) if flag == "mandatory" => mandatory = true,
                    _ => {}
                }
            }

            Ok(Some(Value::Allocation(Allocation::new(
                candidates,
                selection_mode,
                persistent,
                mandatory,
            ))))
        });

    g.declare_comma_list("resourceAllocations", "!resourceAllocation");

    g.declare("allocationAttributes")
        .optional()
        .pattern(&["_{", "!allocationAttribute", "_}"], |_, v| Ok(v.value(1)));

    g.declare("allocationAttribute")
        .optional()
        .repeatable()
        .pattern(&["_alternative", "!resourceIds"], |_, v| {
            Ok(Some(Value::pair(Value::Str("alternative".into()), Value::List(v.list(1)))))
        })
        .pattern(&["_select", "$ID"], |ctx, v| {
            let mode = v.string(1)?;
            if SelectionMode::from_keyword(&mode).is_none() {
                let modes: Vec<_> = SelectionMode::ALL.iter().map(SelectionMode::as_str).collect();
                return Err(ctx.error(format!(
                    "Selection mode must be one of {}",
                    modes.join(", ")
                )));
            }
            Ok(Some(Value::pair(Value::Str("select".into()), Value::Str(mode))))
        })
        .single("_persistent")
        .single("_mandatory");
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use crate::model::{Allocation, AttributeValue, SelectionMode};
    use crate::syntax::ParseError;
    use assert_matches::assert_matches;

    const RESOURCES: &str = r#"
        resource team "Team" {
            resource dev1 "Developer 1"
            resource dev2 "Developer 2" {
                vacation "Leave" 2024-08-01 - 2024-08-15
            }
        }
        resource tester "Tester"
    "#;

    #[test]
    fn test_resource_tree() {
        let project = parse_with_header(RESOURCES).unwrap();
        assert_eq!(project.resources.len(), 4);
        let dev2 = project.resource("dev2").unwrap();
        assert_eq!(dev2.parent, project.resources.index_of("team"));
        assert_matches!(
            dev2.get_scenario(0, "vacations"),
            Some(AttributeValue::Intervals(v)) if v.len() == 1
        );
    }

    #[test]
    fn test_allocations_honour_attributes() {
        let body = format!(
            r#"{}
            task t "T" {{
                allocate dev1 {{ alternative dev2, tester select order mandatory }}, tester
                allocate team
            }}"#,
            RESOURCES
        );
        let project = parse_with_header(&body).unwrap();
        let t = project.task("t").unwrap();
        assert_eq!(
            t.get_scenario(0, "allocate"),
            Some(&AttributeValue::Allocations(vec![
                Allocation::new(
                    vec!["dev1".into(), "dev2".into(), "tester".into()],
                    SelectionMode::Order,
                    false,
                    true
                ),
                Allocation::new(vec!["tester".into()], SelectionMode::MinLoaded, false, false),
                Allocation::new(vec!["team".into()], SelectionMode::MinLoaded, false, false),
            ]))
        );
    }

    #[test]
    fn test_unknown_resource() {
        let err = parse_with_header("task t \"T\" { allocate nobody }").unwrap_err();
        assert_eq!(err.message(), "Resource ID expected: unknown resource nobody");
    }

    #[test]
    fn test_invalid_selection_mode() {
        let body = format!("{}\ntask t \"T\" {{ allocate dev1 {{ select best }} }}", RESOURCES);
        let err = parse_with_header(&body).unwrap_err();
        assert_eq!(
            err.message(),
            "Selection mode must be one of maxloaded, minloaded, minallocated, order, random"
        );
        assert_matches!(err, ParseError::Semantic { .. });
    }

    #[test]
    fn test_vacation_without_interval_names_intervals() {
        let err = parse_with_header("resource r \"R\" { vacation foo }").unwrap_err();
        assert_matches!(
            &err,
            ParseError::RuleExpected { rule, found, .. } if rule == "intervals" && found == "foo"
        );
        assert_eq!(err.message(), "intervals expected but found 'foo'");
    }
}
