use crate::model::{Interval, PropertyKind, PropertySet, Property, Report, WorkingHours};
use crate::units::{
    DEFAULT_DAILY_WORKING_HOURS, DEFAULT_SCHEDULE_GRANULARITY, DEFAULT_YEARLY_WORKING_DAYS,
};
use chrono::NaiveDateTime;
use serde::Serialize;

/// Number formatting as given by `currencyformat` / `numberformat`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RealFormat {
    pub sign_prefix: String,
    pub sign_suffix: String,
    pub thousands_separator: String,
    pub fraction_separator: String,
    pub fraction_digits: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectSettings {
    pub copyright: Option<String>,
    pub currency: Option<String>,
    pub currency_format: Option<RealFormat>,
    pub number_format: Option<RealFormat>,
    pub daily_working_hours: f64,
    pub yearly_working_days: f64,
    /// Seconds per scheduling tick
    pub schedule_granularity: i64,
    pub now: Option<NaiveDateTime>,
    pub time_format: Option<String>,
    pub short_time_format: Option<String>,
    pub timezone: Option<String>,
    pub week_starts_monday: bool,
    pub flags: Vec<String>,
    pub vacations: Vec<Interval>,
    pub working_hours: WorkingHours,
}

impl Default for ProjectSettings {
    fn default() -> Self {
        Self {
            copyright: None,
            currency: None,
            currency_format: None,
            number_format: None,
            daily_working_hours: DEFAULT_DAILY_WORKING_HOURS,
            yearly_working_days: DEFAULT_YEARLY_WORKING_DAYS,
            schedule_granularity: DEFAULT_SCHEDULE_GRANULARITY,
            now: None,
            time_format: None,
            short_time_format: None,
            timezone: None,
            week_starts_monday: true,
            flags: Vec::new(),
            vacations: Vec::new(),
            working_hours: WorkingHours::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Scenario {
    pub id: String,
    pub name: String,
    pub parent: Option<usize>,
    pub enabled: bool,
}

impl Scenario {
    pub fn new(id: impl Into<String>, name: impl Into<String>, parent: Option<usize>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            parent,
            enabled: true,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Project {
    pub id: String,
    pub name: String,
    pub version: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub settings: ProjectSettings,
    pub scenarios: Vec<Scenario>,
    pub tasks: PropertySet,
    pub resources: PropertySet,
    pub reports: Vec<Report>,
}

impl Project {
    /// New project with the default `plan` scenario
    pub fn new(id: &str, name: &str, version: &str, interval: Interval) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            version: version.to_string(),
            start: interval.start,
            end: interval.end,
            settings: ProjectSettings::default(),
            scenarios: vec![Scenario::new("plan", "Plan Scenario", None)],
            tasks: PropertySet::new(PropertyKind::Task),
            resources: PropertySet::new(PropertyKind::Resource),
            reports: Vec::new(),
        }
    }

    pub fn interval(&self) -> Interval {
        Interval::new(self.start, self.end)
    }

    pub fn scenario_idx(&self, id: &str) -> Option<usize> {
        self.scenarios.iter().position(|s| s.id == id)
    }

    pub fn scenario(&self, idx: usize) -> Option<&Scenario> {
        self.scenarios.get(idx)
    }

    pub fn add_scenario(&mut self, scenario: Scenario) -> Result<usize, String> {
        if self.scenario_idx(&scenario.id).is_some() {
            return Err(format!("Scenario {} has already been defined", scenario.id));
        }
        self.scenarios.push(scenario);
        Ok(self.scenarios.len() - 1)
    }

    pub fn clear_scenarios(&mut self) {
        self.scenarios.clear();
    }

    pub fn task(&self, id: &str) -> Option<&Property> {
        self.tasks.by_id(id)
    }

    pub fn resource(&self, id: &str) -> Option<&Property> {
        self.resources.by_id(id)
    }

    pub fn property_set(&self, kind: PropertyKind) -> &PropertySet {
        match kind {
            PropertyKind::Task => &self.tasks,
            PropertyKind::Resource => &self.resources,
        }
    }

    pub fn property_set_mut(&mut self, kind: PropertyKind) -> &mut PropertySet {
        match kind {
            PropertyKind::Task => &mut self.tasks,
            PropertyKind::Resource => &mut self.resources,
        }
    }

    pub fn has_flag(&self, flag: &str) -> bool {
        self.settings.flags.iter().any(|f| f == flag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn project() -> Project {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 12, 31).unwrap().and_hms_opt(0, 0, 0).unwrap();
        Project::new("p", "Project", "1.0", Interval::new(start, end))
    }

    #[test]
    fn test_default_scenario_and_settings() {
        let p = project();
        assert_eq!(p.scenario_idx("plan"), Some(0));
        assert_eq!(p.settings.schedule_granularity, 3600);
        assert_eq!(p.settings.daily_working_hours, 8.0);
        assert_eq!(p.settings.yearly_working_days, 260.714);
    }

    #[test]
    fn test_scenarios_are_unique() {
        let mut p = project();
        assert_eq!(p.add_scenario(Scenario::new("delayed", "Delayed", Some(0))), Ok(1));
        assert!(p.add_scenario(Scenario::new("delayed", "Again", None)).is_err());
        p.clear_scenarios();
        assert_eq!(p.scenario_idx("plan"), None);
    }

    #[test]
    fn test_property_lookup() {
        let mut p = project();
        p.tasks.add("t1", "Task 1", None).unwrap();
        p.resources.add("r1", "Resource 1", None).unwrap();
        assert!(p.task("t1").is_some());
        assert!(p.resource("r1").is_some());
        assert!(p.resource("t1").is_none());
    }
}
