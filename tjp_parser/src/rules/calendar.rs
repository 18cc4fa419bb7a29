use crate::grammar::{GrammarBuilder, IntervalEnd, Value};
use crate::model::{
    weekday_index, weekday_range, AttributeValue, Interval, TimeInterval, WorkingHours, WEEKDAY_NAMES,
};
use crate::syntax::{ParseContext, ParseError};
use chrono::NaiveDateTime;

const DATE_FORMAT: &str = "%Y-%m-%d-%H:%M";

fn format_date(date: NaiveDateTime) -> String {
    date.format(DATE_FORMAT).to_string()
}

pub(super) fn declare(g: &mut GrammarBuilder) {
    g.declare("interval").pattern(&["$DATE", "!intervalEnd"], |ctx, v| {
        let interval = build_interval(ctx, v.date(0)?, v.required(1)?)?;
        Ok(Some(Value::Interval(interval)))
    });

    g.declare("intervalEnd")
        .pattern(&["_-", "$DATE"], |_, v| {
            Ok(Some(Value::IntervalEnd(IntervalEnd::Date(v.date(1)?))))
        })
        .pattern(&["_+", "!intervalDuration"], |_, v| {
            Ok(Some(Value::IntervalEnd(IntervalEnd::Seconds(v.int(1)?))))
        });

    g.declare_list("intervals", "!interval");

    g.declare("valDate").pattern(&["$DATE"], |ctx, v| {
        let date = v.date(0)?;
        let project = ctx.project()?;
        if date < project.start || date > project.end {
            return Err(ctx.error(format!(
                "Date must be within the project time frame {} - {}",
                format_date(project.start),
                format_date(project.end)
            )));
        }
        Ok(Some(Value::Date(date)))
    });

    g.declare("valInterval")
        .pattern(&["$DATE", "!intervalEnd"], |ctx, v| {
            let interval = build_interval(ctx, v.date(0)?, v.required(1)?)?;
            let project = ctx.project()?;
            if interval.start < project.start || interval.start >= project.end {
                return Err(ctx.error(format!(
                    "Start date {} must be within the project time frame",
                    format_date(interval.start)
                )));
            }
            if interval.end <= project.start || interval.end > project.end {
                return Err(ctx.error(format!(
                    "End date {} must be within the project time frame",
                    format_date(interval.end)
                )));
            }
            Ok(Some(Value::Interval(interval)))
        });

    g.declare("workinghours")
        .pattern(&["_workinghours", "!listOfDays", "!listOfTimes"], |ctx, v| {
            let days = match v.required(1)? {
                Value::WeekDays(days) => days,
                other => {
                    return Err(ctx.error(format!("Weekdays expected but found {}", other.type_name())))
                }
            };
            let times: Vec<_> = v
                .list(2)
                .into_iter()
                .filter_map(|item| match item {
                    Value::TimeInterval(interval) => Some(interval),
                    _ => None,
                })
                .collect();
            set_working_hours(ctx, days, times)?;
            Ok(None)
        });

    g.declare_comma_list("weekDayIntervals", "!weekDayInterval");

    g.declare("listOfDays").pattern(&["!weekDayIntervals"], |_, v| {
        let mut days = [false; 7];
        for item in v.list(0) {
            if let Value::WeekDays(range) = item {
                for (selected, day) in days.iter_mut().zip(range) {
                    *selected |= day;
                }
            }
        }
        Ok(Some(Value::WeekDays(days)))
    });

    g.declare("weekDayInterval")
        .pattern(&["$ID", "!weekDayIntervalEnd"], |ctx, v| {
            let first = weekday(ctx, &v.string(0)?)?;
            let last = match v.value(1) {
                Some(Value::Str(name)) => weekday(ctx, &name)?,
                _ => first,
            };
            Ok(Some(Value::WeekDays(weekday_range(first, last))))
        });

    g.declare("weekDayIntervalEnd")
        .optional()
        .pattern(&["_-", "$ID"], |_, v| Ok(v.value(1)));

    g.declare("listOfTimes")
        .pattern(&["_off"], |_, _| Ok(Some(Value::List(Vec::new()))))
        .single("!timeIntervals");

    g.declare_comma_list("timeIntervals", "!timeInterval");

    g.declare("timeInterval")
        .pattern(&["$TIME", "_-", "$TIME"], |ctx, v| {
            let (start, end) = (v.time(0)?, v.time(2)?);
            if start >= end {
                return Err(ctx.error("End time of interval must be larger than start time"));
            }
            Ok(Some(Value::TimeInterval((start, end))))
        });
}

fn build_interval(
    ctx: &ParseContext,
    start: NaiveDateTime,
    end: Value,
) -> Result<Interval, ParseError> {
    let end = match end {
        Value::IntervalEnd(IntervalEnd::Date(date)) => date,
        Value::IntervalEnd(IntervalEnd::Seconds(seconds)) => chrono::Duration::try_seconds(seconds)
            .and_then(|duration| start.checked_add_signed(duration))
            .ok_or_else(|| ctx.error("Interval end is out of range"))?,
        other => {
            return Err(ctx.error(format!("Interval end expected but found {}", other.type_name())))
        }
    };
    if end <= start {
        return Err(ctx.error(format!(
            "End date {} must be after start date {}",
            format_date(end),
            format_date(start)
        )));
    }
    Ok(Interval::new(start, end))
}

fn weekday(ctx: &ParseContext, name: &str) -> Result<usize, ParseError> {
    weekday_index(name).ok_or_else(|| {
        ctx.error(format!(
            "Weekday expected ({}) but found '{}'",
            WEEKDAY_NAMES.join(", "),
            name
        ))
    })
}

/// Applies to the resource being defined, or to the project outside of one
fn set_working_hours(
    ctx: &mut ParseContext,
    days: [bool; 7],
    times: Vec<TimeInterval>,
) -> Result<(), ParseError> {
    let apply = |working_hours: &mut WorkingHours| {
        for (day, selected) in days.iter().enumerate() {
            if *selected {
                working_hours.set_working_hours(day, times.clone());
            }
        }
    };

    if ctx.property.is_none() {
        apply(&mut ctx.project_mut()?.settings.working_hours);
        return Ok(());
    }

    let mut working_hours = match ctx.current_property()?.get("workinghours") {
        Some(AttributeValue::WorkingHours(existing)) => existing.clone(),
        _ => ctx.project()?.settings.working_hours.clone(),
    };
    apply(&mut working_hours);
    ctx.current_property_mut()?
        .set("workinghours", AttributeValue::WorkingHours(working_hours));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use crate::grammar::Value;
    use crate::model::AttributeValue;
    use crate::syntax::ParseError;
    use assert_matches::assert_matches;

    #[test]
    fn test_interval_forms() {
        let mut ctx = context_after("", "2024-03-01 + 2w");
        let interval = match ctx.parse_rule("interval").unwrap() {
            Some(Value::Interval(interval)) => interval,
            other => panic!("unexpected {:?}", other),
        };
        assert_eq!(interval.duration_seconds(), 14 * 86400);

        let mut ctx = context_after("", "2024-03-01 - 2024-02-01");
        let err = ctx.parse_rule("interval").unwrap_err();
        assert_eq!(
            err.message(),
            "End date 2024-02-01-00:00 must be after start date 2024-03-01-00:00"
        );
    }

    #[test]
    fn test_val_interval_range() {
        let mut ctx = context_after("", "2023-12-01 - 2024-02-01");
        let err = ctx.parse_rule("valInterval").unwrap_err();
        assert_eq!(
            err.message(),
            "Start date 2023-12-01-00:00 must be within the project time frame"
        );

        let mut ctx = context_after("", "2024-12-01 + 8w");
        let err = ctx.parse_rule("valInterval").unwrap_err();
        assert_eq!(
            err.message(),
            "End date 2025-01-26-00:00 must be within the project time frame"
        );
    }

    #[test]
    fn test_project_working_hours() {
        let project = parse_with_header(
            "workinghours sat - sun 10:00 - 14:00\nworkinghours fri off\nworkinghours mon, wed 8:00 - 12:00, 13:00 - 17:30",
        )
        .unwrap();
        let wh = &project.settings.working_hours;
        assert_eq!(wh.working_hours(6), &[(36000, 50400)]);
        assert_eq!(wh.working_hours(0), &[(36000, 50400)]);
        assert!(!wh.is_working_day(5));
        assert_eq!(wh.working_hours(1), &[(28800, 43200), (46800, 63000)]);
        assert_eq!(wh.working_hours(3), wh.working_hours(1));
        // untouched days keep the defaults
        assert_eq!(wh.working_hours(2).len(), 2);
    }

    #[test]
    fn test_resource_working_hours() {
        let project = parse_with_header(
            "resource r \"R\" { workinghours mon - fri 9:00 - 13:00 }",
        )
        .unwrap();
        let r = project.resource("r").unwrap();
        assert_matches!(
            r.get("workinghours"),
            Some(AttributeValue::WorkingHours(wh)) if wh.working_hours(4) == [(32400, 46800)]
        );
        assert_eq!(project.settings.working_hours.working_hours(4).len(), 2);
    }

    #[test]
    fn test_time_and_weekday_errors() {
        let err = parse_with_header("workinghours mon 12:00 - 9:00").unwrap_err();
        assert_eq!(err.message(), "End time of interval must be larger than start time");

        let err = parse_with_header("workinghours monday 9:00 - 12:00").unwrap_err();
        assert_eq!(
            err.message(),
            "Weekday expected (sun, mon, tue, wed, thu, fri, sat) but found 'monday'"
        );
    }

    #[test]
    fn test_missing_times_names_list_of_times() {
        let err = parse_with_header("workinghours mon foo").unwrap_err();
        assert_matches!(
            &err,
            ParseError::RuleExpected { rule, found, .. } if rule == "listOfTimes" && found == "foo"
        );

        let err = parse_with_header("workinghours mon, tue foo").unwrap_err();
        assert_eq!(err.message(), "listOfTimes expected but found 'foo'");
    }

    #[test]
    fn test_val_date_message_names_both_bounds() {
        let mut ctx = context_after("", "2025-02-01");
        let err = ctx.parse_rule("valDate").unwrap_err();
        assert_eq!(
            err.message(),
            "Date must be within the project time frame 2024-01-01-00:00 - 2024-12-31-00:00"
        );
    }
}
