use super::{intervals, strings};
use crate::grammar::GrammarBuilder;

pub(super) fn declare(g: &mut GrammarBuilder) {
    g.declare("properties")
        .optional()
        .repeatable()
        .pattern(&["_copyright", "$STRING"], |ctx, v| {
            ctx.project_mut()?.settings.copyright = Some(v.string(1)?);
            Ok(None)
        })
        .single("!include")
        .pattern(&["_flags", "!declareFlagList"], |ctx, v| {
            let settings = &mut ctx.project_mut()?.settings;
            for flag in strings(v.list(1)) {
                if !settings.flags.contains(&flag) {
                    settings.flags.push(flag);
                }
            }
            Ok(None)
        })
        .sequence(&["!report"])
        .sequence(&["!resource"])
        .sequence(&["!task"])
        .pattern(&["_vacation", "!vacationName", "!intervals"], |ctx, v| {
            ctx.project_mut()?
                .settings
                .vacations
                .extend(intervals(v.list(2)));
            Ok(None)
        })
        .sequence(&["!workinghours"]);

    g.declare_comma_list("declareFlagList", "$ID");

    g.declare("vacationName").optional().single("$STRING");
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;

    #[test]
    fn test_flags_are_declared_once() {
        let project = parse_with_header("flags important, hidden\nflags important").unwrap();
        assert_eq!(project.settings.flags, vec!["important", "hidden"]);
    }

    #[test]
    fn test_global_vacations() {
        let project = parse_with_header(
            "vacation \"Holidays\" 2024-12-24 - 2024-12-27 2024-12-31 + 1d\nvacation 2024-05-01 - 2024-05-02",
        )
        .unwrap();
        let vacations = &project.settings.vacations;
        assert_eq!(vacations.len(), 3);
        assert_eq!(vacations[1].duration_seconds(), 86400);
    }

    #[test]
    fn test_copyright() {
        let project = parse_with_header("copyright \"ACME\"").unwrap();
        assert_eq!(project.settings.copyright.as_deref(), Some("ACME"));
    }
}
