pub mod datemath;
pub mod event;
pub mod sets;
pub mod store;

use serde::Serialize;

pub use datemath::{advance_day, resolve_month, retreat_day, set_date, step_days, weekday_of};
pub use event::{DayRule, Event};
pub use store::CalendarStore;

/// Longest month a calendar may hold.
pub const MAX_MONTH_DAYS: u32 = 1000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Month {
    pub name: String,
    days: u32,
    pub season: String,
    pub color: String,
}

impl Month {
    pub fn new(name: &str, days: u32, season: &str, color: &str) -> Self {
        Month {
            name: name.to_owned(),
            days: days.clamp(1, MAX_MONTH_DAYS),
            season: season.to_owned(),
            color: color.to_owned(),
        }
    }

    /// Length of the month, between 1 and `MAX_MONTH_DAYS`.
    pub fn days(&self) -> u32 {
        self.days
    }
}

/// The calendar cursor.
///
/// Fields are only written through `place`, which derives
/// `day_of_the_week` from `day_of_the_month`, so the weekday can never drift.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CurrentDate {
    month: usize,
    day_of_the_month: u32,
    day_of_the_week: usize,
    year: i64,
}

impl CurrentDate {
    /// 0-based month index.
    pub fn month(&self) -> usize {
        self.month
    }

    pub fn day_of_the_month(&self) -> u32 {
        self.day_of_the_month
    }

    /// 0-based index into the weekday cycle.
    pub fn day_of_the_week(&self) -> usize {
        self.day_of_the_week
    }

    pub fn year(&self) -> i64 {
        self.year
    }

    fn place(&mut self, month: usize, day_of_the_month: u32, year: i64, cycle_length: usize) {
        self.month = month;
        self.day_of_the_month = day_of_the_month;
        self.year = year;
        self.day_of_the_week = weekday_of(i64::from(day_of_the_month), cycle_length);
    }
}

/// A month of a particular year.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthIndex {
    /// 0-based month index.
    pub index: usize,
    pub year: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Calendar {
    current: CurrentDate,
    weekdays: Vec<String>,
    months: Vec<Month>,
    events: Vec<Event>,
}

impl Calendar {
    /// Builds a calendar positioned on day 1 of the first month of `year`.
    ///
    /// Returns `None` when there are no weekdays or no months.
    pub fn new(
        weekdays: Vec<String>,
        months: Vec<Month>,
        events: Vec<Event>,
        year: i64,
    ) -> Option<Self> {
        if weekdays.is_empty() || months.is_empty() {
            return None;
        }

        let mut cal = Calendar {
            current: CurrentDate {
                month: 0,
                day_of_the_month: 1,
                day_of_the_week: 0,
                year,
            },
            weekdays,
            months,
            events,
        };
        event::sort_events(&mut cal.events);
        cal.relocate(0, 1, year);
        Some(cal)
    }

    pub fn current(&self) -> &CurrentDate {
        &self.current
    }

    pub fn weekdays(&self) -> &[String] {
        &self.weekdays
    }

    pub fn months(&self) -> &[Month] {
        &self.months
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Number of weekdays in one cycle.
    pub fn cycle_length(&self) -> usize {
        self.weekdays.len()
    }

    pub fn current_month(&self) -> &Month {
        &self.months[self.current.month]
    }

    pub fn current_weekday(&self) -> &str {
        &self.weekdays[self.current.day_of_the_week]
    }

    pub fn current_month_index(&self) -> MonthIndex {
        MonthIndex {
            index: self.current.month,
            year: self.current.year,
        }
    }

    pub fn next_month(&self, m: MonthIndex) -> MonthIndex {
        if m.index + 1 < self.months.len() {
            MonthIndex {
                index: m.index + 1,
                year: m.year,
            }
        } else {
            MonthIndex {
                index: 0,
                year: m.year.saturating_add(1),
            }
        }
    }

    /// The month before `m`. Like `retreat_day`, never goes below year 0.
    pub fn prev_month(&self, m: MonthIndex) -> MonthIndex {
        match m.index.checked_sub(1) {
            Some(index) => MonthIndex {
                index: index.min(self.months.len() - 1),
                year: m.year,
            },
            None => MonthIndex {
                index: self.months.len() - 1,
                year: m.year.saturating_sub(1).max(0),
            },
        }
    }

    /// Moves the cursor, clamping month and day into range.
    fn relocate(&mut self, month: usize, day_of_the_month: u32, year: i64) {
        let month = month.min(self.months.len() - 1);
        let day = day_of_the_month.clamp(1, self.months[month].days());
        let cycle = self.cycle_length();
        self.current.place(month, day, year, cycle);
    }

    pub fn to_value(&self) -> serde_json::Value {
        // Only strings, integers, sequences and maps are involved.
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}
