use crate::grammar::{GrammarBuilder, Values};
use crate::model::{Project, RealFormat};
use crate::syntax::{ParseContext, ParseError};

pub(super) fn declare(g: &mut GrammarBuilder) {
    g.declare("project")
        .sequence(&["!projectHeader", "!projectBody", "!properties"]);

    g.declare("projectHeader").pattern(
        &["_project", "$ID", "$STRING", "$STRING", "!interval"],
        |ctx, v| {
            let project = Project::new(&v.string(1)?, &v.string(2)?, &v.string(3)?, v.interval(4)?);
            ctx.project = Some(project);
            ctx.property = None;
            ctx.scenario = None;
            ctx.scenario_idx = 0;
            Ok(None)
        },
    );

    g.declare("projectBody")
        .optional()
        .sequence(&["_{", "!projectBodyAttributes", "_}"]);

    g.declare("projectBodyAttributes")
        .optional()
        .repeatable()
        .pattern(
            &["_currencyformat", "$STRING", "$STRING", "$STRING", "$STRING", "$STRING"],
            |ctx, v| {
                let format = real_format(ctx, v)?;
                ctx.project_mut()?.settings.currency_format = Some(format);
                Ok(None)
            },
        )
        .pattern(&["_currency", "$STRING"], |ctx, v| {
            ctx.project_mut()?.settings.currency = Some(v.string(1)?);
            Ok(None)
        })
        .pattern(&["_dailyworkinghours", "!number"], |ctx, v| {
            ctx.project_mut()?.settings.daily_working_hours = v.number(1)?;
            Ok(None)
        })
        .pattern(&["_extend", "!extendProperty", "!extendBody"], |ctx, _| {
            ctx.extend_target = None;
            Ok(None)
        })
        .single("!include")
        .pattern(&["_now", "$DATE"], |ctx, v| {
            ctx.project_mut()?.settings.now = Some(v.date(1)?);
            Ok(None)
        })
        .pattern(
            &["_numberformat", "$STRING", "$STRING", "$STRING", "$STRING", "$STRING"],
            |ctx, v| {
                let format = real_format(ctx, v)?;
                ctx.project_mut()?.settings.number_format = Some(format);
                Ok(None)
            },
        )
        .sequence(&["!scenario"])
        .pattern(&["_shorttimeformat", "$STRING"], |ctx, v| {
            ctx.project_mut()?.settings.short_time_format = Some(v.string(1)?);
            Ok(None)
        })
        .pattern(&["_timeformat", "$STRING"], |ctx, v| {
            ctx.project_mut()?.settings.time_format = Some(v.string(1)?);
            Ok(None)
        })
        .pattern(&["!timezone"], |ctx, v| {
            ctx.project_mut()?.settings.timezone = Some(v.string(0)?);
            Ok(None)
        })
        .pattern(&["_timingresolution", "!intervalDuration"], |ctx, v| {
            let seconds = v.int(1)?;
            if seconds < 5 * 60 {
                return Err(ctx.error("Timing resolution must be at least 5 min"));
            }
            if seconds > 60 * 60 {
                return Err(ctx.error("Timing resolution must be 1 hour or less"));
            }
            ctx.project_mut()?.settings.schedule_granularity = seconds;
            Ok(None)
        })
        .pattern(&["_weekstartsmonday"], |ctx, _| {
            ctx.project_mut()?.settings.week_starts_monday = true;
            Ok(None)
        })
        .pattern(&["_weekstartssunday"], |ctx, _| {
            ctx.project_mut()?.settings.week_starts_monday = false;
            Ok(None)
        })
        .pattern(&["_yearlyworkingdays", "!number"], |ctx, v| {
            ctx.project_mut()?.settings.yearly_working_days = v.number(1)?;
            Ok(None)
        });

    g.declare("include").pattern(&["_include", "$STRING"], |ctx, v| {
        ctx.include(&v.string(1)?)?;
        Ok(None)
    });

    g.declare("timezone")
        .pattern(&["_timezone", "$STRING"], |_, v| Ok(v.value(1)));
}

/// Sign prefix, sign suffix, thousands separator, fraction separator, digits
fn real_format(ctx: &ParseContext, v: &Values) -> Result<RealFormat, ParseError> {
    let digits = v.string(5)?;
    let fraction_digits = digits
        .trim()
        .parse::<u32>()
        .map_err(|_| ctx.error(format!("Number of fraction digits expected, got '{}'", digits)))?;
    Ok(RealFormat {
        sign_prefix: v.string(1)?,
        sign_suffix: v.string(2)?,
        thousands_separator: v.string(3)?,
        fraction_separator: v.string(4)?,
        fraction_digits,
    })
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use crate::syntax::ParseError;
    use assert_matches::assert_matches;
    use std::io::Write;

    #[test]
    fn test_project_body_settings() {
        let project = parse_with_header(
            r#"{
                currency "EUR"
                currencyformat "(" ")" "." "," "2"
                dailyworkinghours 7.5
                yearlyworkingdays 250
                timeformat "%Y-%m-%d"
                timezone "Europe/Berlin"
                timingresolution 30min
                weekstartssunday
            }"#,
        )
        .unwrap();

        let settings = &project.settings;
        assert_eq!(settings.currency.as_deref(), Some("EUR"));
        assert_eq!(settings.currency_format.as_ref().unwrap().fraction_digits, 2);
        assert_eq!(settings.daily_working_hours, 7.5);
        assert_eq!(settings.yearly_working_days, 250.0);
        assert_eq!(settings.timezone.as_deref(), Some("Europe/Berlin"));
        assert_eq!(settings.schedule_granularity, 1800);
        assert!(!settings.week_starts_monday);
    }

    #[test]
    fn test_timing_resolution_limits() {
        let err = parse_with_header("{ timingresolution 2min }").unwrap_err();
        assert_eq!(err.message(), "Timing resolution must be at least 5 min");

        let err = parse_with_header("{ timingresolution 2h }").unwrap_err();
        assert_eq!(err.message(), "Timing resolution must be 1 hour or less");
    }

    #[test]
    fn test_unknown_body_attribute() {
        assert_matches!(
            parse_with_header("{ colour \"red\" }"),
            Err(ParseError::UnknownAttribute { keyword, .. }) if keyword == "colour"
        );
    }

    #[test]
    fn test_include_continues_in_other_file() {
        let mut file = tempfile::Builder::new().suffix(".tji").tempfile().unwrap();
        writeln!(file, "task included \"From include\"").unwrap();

        let body = format!(
            "include \"{}\"\ntask after \"After\"",
            file.path().display()
        );
        let project = parse_with_header(&body).unwrap();
        assert!(project.task("included").is_some());
        assert!(project.task("after").is_some());
    }
}
