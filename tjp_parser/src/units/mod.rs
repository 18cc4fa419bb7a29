//! Duration units and their conversion into scheduling ticks
//!
//! Calendar durations count wall-clock time and truncate; working durations
//! count working time derived from the project's daily hours and yearly
//! working days, and round.

use serde::Serialize;
use std::fmt;

pub const DEFAULT_SCHEDULE_GRANULARITY: i64 = 3600;
pub const DEFAULT_DAILY_WORKING_HOURS: f64 = 8.0;
pub const DEFAULT_YEARLY_WORKING_DAYS: f64 = 260.714;

const WEEKS_PER_YEAR: f64 = 52.1429;
const DAYS_PER_MONTH: f64 = 30.4167;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DurationUnit {
    Minute,
    Hour,
    Day,
    Week,
    Month,
    Year,
}

impl DurationUnit {
    pub const ALL: [DurationUnit; 6] = [
        DurationUnit::Minute,
        DurationUnit::Hour,
        DurationUnit::Day,
        DurationUnit::Week,
        DurationUnit::Month,
        DurationUnit::Year,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DurationUnit::Minute => "min",
            DurationUnit::Hour => "h",
            DurationUnit::Day => "d",
            DurationUnit::Week => "w",
            DurationUnit::Month => "m",
            DurationUnit::Year => "y",
        }
    }

    pub fn from_keyword(keyword: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|u| u.as_str() == keyword)
    }

    /// "min, h, d, w, m, y"
    pub fn keyword_list() -> String {
        Self::ALL
            .iter()
            .map(DurationUnit::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Seconds of wall-clock time per unit
    pub fn calendar_factor(&self) -> f64 {
        match self {
            DurationUnit::Minute => 60.0,
            DurationUnit::Hour => 3600.0,
            DurationUnit::Day => 86400.0,
            DurationUnit::Week => 86400.0 * 7.0,
            DurationUnit::Month => 86400.0 * DAYS_PER_MONTH,
            DurationUnit::Year => 86400.0 * 365.0,
        }
    }

    /// Seconds of working time per unit
    pub fn working_factor(&self, daily_working_hours: f64, yearly_working_days: f64) -> f64 {
        let day = 3600.0 * daily_working_hours;
        match self {
            DurationUnit::Minute => 60.0,
            DurationUnit::Hour => 3600.0,
            DurationUnit::Day => day,
            DurationUnit::Week => day * (yearly_working_days / WEEKS_PER_YEAR),
            DurationUnit::Month => day * (yearly_working_days / 12.0),
            DurationUnit::Year => day * yearly_working_days,
        }
    }
}

impl fmt::Display for DurationUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Calendar duration in ticks of `granularity` seconds, truncated toward zero
pub fn calendar_ticks(value: f64, unit: DurationUnit, granularity: i64) -> i64 {
    (value * unit.calendar_factor() / granularity as f64).trunc() as i64
}

/// Working duration in ticks of `granularity` seconds, rounded half away from zero
pub fn working_ticks(
    value: f64,
    unit: DurationUnit,
    daily_working_hours: f64,
    yearly_working_days: f64,
    granularity: i64,
) -> i64 {
    (value * unit.working_factor(daily_working_hours, yearly_working_days) / granularity as f64)
        .round() as i64
}

/// Interval length in seconds (`2024-01-01 + 2w`)
pub fn interval_seconds(value: i64, unit: DurationUnit) -> i64 {
    (value as f64 * unit.calendar_factor()).trunc() as i64
}
