use chrono::NaiveDateTime;
use serde::Serialize;

/// Weekday names, indexed from Sunday
pub const WEEKDAY_NAMES: [&str; 7] = ["sun", "mon", "tue", "wed", "thu", "fri", "sat"];

pub fn weekday_index(name: &str) -> Option<usize> {
    WEEKDAY_NAMES.iter().position(|d| *d == name)
}

/// Days from `first` to `last` inclusive, wrapping past Saturday
pub fn weekday_range(first: usize, last: usize) -> [bool; 7] {
    let mut days = [false; 7];
    let mut day = first % 7;
    loop {
        days[day] = true;
        if day == last % 7 {
            break;
        }
        day = (day + 1) % 7;
    }
    days
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Interval {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl Interval {
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, date: NaiveDateTime) -> bool {
        date >= self.start && date <= self.end
    }

    pub fn duration_seconds(&self) -> i64 {
        (self.end - self.start).num_seconds()
    }
}

/// A time-of-day range in seconds after midnight
pub type TimeInterval = (u32, u32);

/// Working time per weekday
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkingHours {
    pub days: [Vec<TimeInterval>; 7],
}

impl WorkingHours {
    pub fn set_working_hours(&mut self, day: usize, intervals: Vec<TimeInterval>) {
        if let Some(slot) = self.days.get_mut(day) {
            *slot = intervals;
        }
    }

    pub fn working_hours(&self, day: usize) -> &[TimeInterval] {
        self.days.get(day).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_working_day(&self, day: usize) -> bool {
        !self.working_hours(day).is_empty()
    }
}

impl Default for WorkingHours {
    /// Monday to Friday, 9:00 - 12:00 and 13:00 - 18:00
    fn default() -> Self {
        let office = vec![(9 * 3600, 12 * 3600), (13 * 3600, 18 * 3600)];
        Self {
            days: [
                Vec::new(),
                office.clone(),
                office.clone(),
                office.clone(),
                office.clone(),
                office,
                Vec::new(),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weekday_range_wraps() {
        let mon_fri = weekday_range(1, 5);
        assert_eq!(mon_fri, [false, true, true, true, true, true, false]);

        let fri_mon = weekday_range(5, 1);
        assert_eq!(fri_mon, [true, true, false, false, false, true, true]);

        let single = weekday_range(3, 3);
        assert_eq!(single.iter().filter(|d| **d).count(), 1);
    }

    #[test]
    fn test_default_working_hours() {
        let wh = WorkingHours::default();
        assert!(!wh.is_working_day(0));
        assert!(wh.is_working_day(3));
        assert_eq!(wh.working_hours(1)[0], (32400, 43200));
    }
}
