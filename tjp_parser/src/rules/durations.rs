use crate::grammar::{GrammarBuilder, Value};
use crate::units::{calendar_ticks, interval_seconds, working_ticks, DurationUnit};

pub(super) fn declare(g: &mut GrammarBuilder) {
    g.declare_single("number", &["$INTEGER", "$FLOAT"]);

    g.declare("durationUnit").pattern(&["$ID"], |ctx, v| {
        let keyword = v.string(0)?;
        let unit = DurationUnit::from_keyword(&keyword).ok_or_else(|| {
            ctx.error(format!("Unit must be one of {}", DurationUnit::keyword_list()))
        })?;
        Ok(Some(Value::Unit(unit)))
    });

    g.declare("calendarDuration")
        .pattern(&["!number", "!durationUnit"], |ctx, v| {
            let granularity = ctx.project()?.settings.schedule_granularity;
            let ticks = calendar_ticks(v.number(0)?, v.unit(1)?, granularity);
            Ok(Some(Value::Int(ticks)))
        });

    g.declare("workingDuration")
        .pattern(&["!number", "!durationUnit"], |ctx, v| {
            let settings = &ctx.project()?.settings;
            let ticks = working_ticks(
                v.number(0)?,
                v.unit(1)?,
                settings.daily_working_hours,
                settings.yearly_working_days,
                settings.schedule_granularity,
            );
            Ok(Some(Value::Int(ticks)))
        });

    g.declare("intervalDuration")
        .pattern(&["$INTEGER", "!durationUnit"], |_, v| {
            Ok(Some(Value::Int(interval_seconds(v.int(0)?, v.unit(1)?))))
        });
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use crate::grammar::Value;

    fn duration(prelude: &str, rule: &str, source: &str) -> i64 {
        let mut ctx = context_after(prelude, source);
        match ctx.parse_rule(rule).unwrap() {
            Some(Value::Int(ticks)) => ticks,
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_calendar_duration() {
        assert_eq!(duration("", "calendarDuration", "2w"), 336);
        assert_eq!(duration("", "calendarDuration", "1.5d"), 36);
        assert_eq!(duration("{ timingresolution 15min }", "calendarDuration", "1h"), 4);
    }

    #[test]
    fn test_working_duration() {
        assert_eq!(duration("", "workingDuration", "1d"), 8);
        assert_eq!(duration("{ dailyworkinghours 6 }", "workingDuration", "2d"), 12);
        assert_eq!(duration("", "workingDuration", "1w"), 40);
    }

    #[test]
    fn test_interval_duration_is_seconds() {
        assert_eq!(duration("", "intervalDuration", "5min"), 300);
    }

    #[test]
    fn test_unknown_unit() {
        let mut ctx = context_after("", "3 weeks");
        let err = ctx.parse_rule("calendarDuration").unwrap_err();
        assert_eq!(err.message(), "Unit must be one of min, h, d, w, m, y");
    }
}
