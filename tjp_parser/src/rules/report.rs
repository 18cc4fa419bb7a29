use crate::grammar::{GrammarBuilder, Value};
use crate::model::{ColumnDefinition, Report, ReportElement, ReportKind, SortCriterion};
use crate::syntax::{ParseContext, ParseError};

const SORT_CRITERIUM_EXPECTED: &str =
    "Sorting criterium expected (e.g. tree, start.up or plan.end.down)";

pub(super) fn declare(g: &mut GrammarBuilder) {
    g.declare("report")
        .pattern(&["!reportHeader", "!reportBody"], |ctx, _| {
            ctx.report = None;
            ctx.column = None;
            Ok(None)
        });

    g.declare("reportHeader")
        .pattern(&["!reportType", "$STRING"], |ctx, v| {
            let keyword = v.string(0)?;
            let kind = ReportKind::from_keyword(&keyword)
                .ok_or_else(|| ctx.error(format!("Unknown report type {}", keyword)))?;
            let name = v.string(1)?;
            let project = ctx.project_mut()?;
            let element = ReportElement::new(project.start, project.end);
            let idx = project.reports.len();
            project.reports.push(Report::new(kind, name, element));
            ctx.report = Some(idx);
            Ok(None)
        });

    g.declare_single("reportType", &["_export", "_htmltaskreport", "_htmlresourcereport"]);

    g.declare("reportBody")
        .optional()
        .sequence(&["_{", "!reportAttributes", "_}"]);

    g.declare("reportAttributes")
        .optional()
        .repeatable()
        .pattern(&["_columns", "!columnDefs"], |ctx, v| {
            let columns = v
                .list(1)
                .into_iter()
                .filter_map(|item| match item {
                    Value::Column(column) => Some(column),
                    _ => None,
                })
                .collect();
            ctx.report_element_mut()?.columns = columns;
            Ok(None)
        })
        .pattern(&["_end", "!valDate"], |ctx, v| {
            ctx.report_element_mut()?.end = v.date(1)?;
            Ok(None)
        })
        .pattern(&["_headline", "$STRING"], |ctx, v| {
            ctx.report_element_mut()?.headline = Some(v.string(1)?);
            Ok(None)
        })
        .pattern(&["_hideresource", "!logicalExpression"], |ctx, v| {
            ctx.report_element_mut()?.hide_resource = Some(v.expression(1)?);
            Ok(None)
        })
        .pattern(&["_hidetask", "!logicalExpression"], |ctx, v| {
            ctx.report_element_mut()?.hide_task = Some(v.expression(1)?);
            Ok(None)
        })
        .pattern(&["_period", "!valInterval"], |ctx, v| {
            let period = v.interval(1)?;
            let element = ctx.report_element_mut()?;
            element.start = period.start;
            element.end = period.end;
            Ok(None)
        })
        .pattern(&["_rolluptask", "!logicalExpression"], |ctx, v| {
            ctx.report_element_mut()?.rollup_task = Some(v.expression(1)?);
            Ok(None)
        })
        .pattern(&["_scenarios", "!scenarioIdList"], |ctx, v| {
            let project = ctx.project()?;
            // Disabled scenarios are left out of reports
            let scenarios: Vec<usize> = v
                .list(1)
                .into_iter()
                .filter_map(|item| match item {
                    Value::Int(idx) => usize::try_from(idx).ok(),
                    _ => None,
                })
                .filter(|idx| project.scenario(*idx).map_or(false, |s| s.enabled))
                .collect();
            ctx.report_element_mut()?.scenarios = scenarios;
            Ok(None)
        })
        .pattern(&["_sortresources", "!sortCriteria"], |ctx, v| {
            ctx.report_element_mut()?.sort_resources = sort_criteria(v.list(1));
            Ok(None)
        })
        .pattern(&["_sorttasks", "!sortCriteria"], |ctx, v| {
            ctx.report_element_mut()?.sort_tasks = sort_criteria(v.list(1));
            Ok(None)
        })
        .pattern(&["_start", "!valDate"], |ctx, v| {
            ctx.report_element_mut()?.start = v.date(1)?;
            Ok(None)
        })
        .pattern(&["_taskroot", "!taskRootId"], |ctx, v| {
            let id = v.string(1)?;
            if ctx.project()?.task(&id).is_none() {
                return Err(ctx.error(format!("Unknown task {}", id)));
            }
            ctx.report_element_mut()?.task_root = Some(id);
            Ok(None)
        })
        .pattern(&["_timeformat", "$STRING"], |ctx, v| {
            ctx.report_element_mut()?.time_format = Some(v.string(1)?);
            Ok(None)
        });

    g.declare_comma_list("columnDefs", "!columnDef");

    g.declare("columnDef")
        .pattern(&["!columnId", "!columnBody"], |ctx, _| {
            Ok(ctx.column.take().map(Value::Column))
        });

    g.declare("columnId").pattern(&["$ID"], |ctx, v| {
        let id = v.string(0)?;
        let title = ctx
            .report_element_mut()?
            .default_column_title(&id)
            .ok_or_else(|| ctx.error(format!("Unknown column {}", id)))?;
        ctx.column = Some(ColumnDefinition::new(id, title));
        Ok(None)
    });

    g.declare("columnBody")
        .optional()
        .sequence(&["_{", "!columnOptions", "_}"]);

    g.declare("columnOptions")
        .optional()
        .repeatable()
        .pattern(&["_title", "$STRING"], |ctx, v| {
            let title = v.string(1)?;
            match ctx.column.as_mut() {
                Some(column) => column.title = title,
                None => return Err(ctx.error("No column in this context")),
            }
            Ok(None)
        });

    g.declare_comma_list("sortCriteria", "!sortCriterium");

    g.declare("sortCriterium")
        .pattern(&["$ABSOLUTE_ID"], |ctx, v| {
            let criterion = parse_sort_criterium(ctx, &v.string(0)?)?;
            Ok(Some(Value::SortCriterion(criterion)))
        })
        .pattern(&["$ID"], |ctx, v| {
            if v.string(0)? != "tree" {
                return Err(ctx.error(SORT_CRITERIUM_EXPECTED));
            }
            Ok(Some(Value::SortCriterion(SortCriterion::tree())))
        });
}

fn sort_criteria(items: Vec<Value>) -> Vec<SortCriterion> {
    items
        .into_iter()
        .filter_map(|item| match item {
            Value::SortCriterion(criterion) => Some(criterion),
            _ => None,
        })
        .collect()
}

/// `attribute.direction` or `scenario.attribute.direction`
fn parse_sort_criterium(ctx: &ParseContext, text: &str) -> Result<SortCriterion, ParseError> {
    let parts: Vec<&str> = text.split('.').collect();
    let (scenario_idx, attribute, direction) = match parts.as_slice() {
        [attribute, direction] => (None, *attribute, *direction),
        [scenario, attribute, direction] => {
            let idx = ctx.project()?.scenario_idx(scenario).ok_or_else(|| {
                ctx.error(format!("Unknown scenario {} in sorting criterium", scenario))
            })?;
            (Some(idx), *attribute, *direction)
        }
        _ => return Err(ctx.error(SORT_CRITERIUM_EXPECTED)),
    };

    let ascending = match direction {
        "up" => true,
        "down" => false,
        _ => return Err(ctx.error("Sorting direction must be 'up' or 'down'")),
    };
    Ok(SortCriterion::new(attribute, ascending, scenario_idx))
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use crate::model::{ReportKind, SortCriterion};
    use chrono::NaiveDate;

    #[test]
    fn test_report_attributes() {
        let project = parse_with_header(
            r#"{ scenario plan "Plan" { scenario delayed "Delayed" scenario dropped "Dropped" { disabled } } }
            task t "T"
            htmltaskreport "Tasks" {
                columns name { title "Task" }, start, end
                headline "Overview"
                period 2024-02-01 - 2024-03-01
                scenarios plan, delayed, dropped
                sorttasks plan.end.down, start.up, tree
                taskroot t
            }
            export "Export""#,
        )
        .unwrap();

        assert_eq!(project.reports.len(), 2);
        let report = &project.reports[0];
        assert_eq!(report.kind, ReportKind::HtmlTaskReport);
        let element = &report.element;

        let columns: Vec<_> = element.columns.iter().map(|c| (c.id.as_str(), c.title.as_str())).collect();
        assert_eq!(columns, vec![("name", "Task"), ("start", "Start"), ("end", "End")]);
        assert_eq!(element.headline.as_deref(), Some("Overview"));
        assert_eq!(
            element.start,
            NaiveDate::from_ymd_opt(2024, 2, 1).unwrap().and_hms_opt(0, 0, 0).unwrap()
        );
        assert_eq!(element.scenarios, vec![0, 1]);
        assert_eq!(
            element.sort_tasks,
            vec![
                SortCriterion::new("end", false, Some(0)),
                SortCriterion::new("start", true, None),
                SortCriterion::tree(),
            ]
        );
        assert_eq!(element.task_root.as_deref(), Some("t"));

        let export = &project.reports[1];
        assert_eq!(export.kind, ReportKind::Export);
        assert_eq!(export.element.scenarios, vec![0]);
    }

    #[test]
    fn test_report_dates_within_project() {
        let err = parse_with_header("htmltaskreport \"R\" { start 2023-06-01 }").unwrap_err();
        assert_eq!(
            err.message(),
            "Date must be within the project time frame 2024-01-01-00:00 - 2024-12-31-00:00"
        );
    }

    #[test]
    fn test_sort_criterium_errors() {
        let err = parse_with_header("htmltaskreport \"R\" { sorttasks start.sideways }").unwrap_err();
        assert_eq!(err.message(), "Sorting direction must be 'up' or 'down'");

        let err = parse_with_header("htmltaskreport \"R\" { sorttasks name }").unwrap_err();
        assert_eq!(
            err.message(),
            "Sorting criterium expected (e.g. tree, start.up or plan.end.down)"
        );

        let err = parse_with_header("htmltaskreport \"R\" { sorttasks nope.end.up }").unwrap_err();
        assert_eq!(err.message(), "Unknown scenario nope in sorting criterium");
    }

    #[test]
    fn test_unknown_column_and_task_root() {
        let err = parse_with_header("htmltaskreport \"R\" { columns name, bogus }").unwrap_err();
        assert_eq!(err.message(), "Unknown column bogus");

        let err = parse_with_header("htmltaskreport \"R\" { taskroot missing }").unwrap_err();
        assert_eq!(err.message(), "Unknown task missing");
    }
}
