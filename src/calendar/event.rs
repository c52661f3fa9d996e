use nom::{
    branch::alt,
    character::complete::{char, digit1, space0},
    combinator::{all_consuming, map, map_res, verify},
    sequence::{delimited, separated_pair},
    IResult,
};
use serde::{Serialize, Serializer};
use serde_json::Value;
use std::cmp::Ordering;
use std::convert::TryFrom;
use std::fmt;
use std::str::FromStr;

use super::Calendar;

/// Which days of its month an event falls on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DayRule {
    Single(u32),
    /// Inclusive, `lo <= hi`.
    Range(u32, u32),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseDayRuleError {
    input: String,
}

impl fmt::Display for ParseDayRuleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid day '{}', expected N or A-B", self.input)
    }
}

impl std::error::Error for ParseDayRuleError {}

fn day_number(input: &str) -> IResult<&str, u32> {
    verify(map_res(digit1, u32::from_str), |n: &u32| *n >= 1)(input)
}

fn day_rule(input: &str) -> IResult<&str, DayRule> {
    alt((
        map(
            separated_pair(day_number, delimited(space0, char('-'), space0), day_number),
            |(lo, hi)| DayRule::range(lo, hi),
        ),
        map(day_number, DayRule::Single),
    ))(input)
}

impl DayRule {
    /// Builds a range, swapping reversed bounds.
    pub fn range(a: u32, b: u32) -> Self {
        if a <= b {
            DayRule::Range(a, b)
        } else {
            DayRule::Range(b, a)
        }
    }

    pub fn contains(&self, day: u32) -> bool {
        match *self {
            DayRule::Single(n) => n == day,
            DayRule::Range(lo, hi) => lo <= day && day <= hi,
        }
    }

    pub fn first(&self) -> u32 {
        match *self {
            DayRule::Single(n) | DayRule::Range(n, _) => n,
        }
    }

    /// Clamps the rule into a month of `max_days` days.
    pub fn clamped(self, max_days: u32) -> Self {
        let max_days = max_days.max(1);
        match self {
            DayRule::Single(n) => DayRule::Single(n.clamp(1, max_days)),
            DayRule::Range(lo, hi) => {
                DayRule::range(lo.clamp(1, max_days), hi.clamp(1, max_days))
            }
        }
    }

    /// Reads a persisted day field: a JSON number or an `"N"`/`"A-B"` string.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => n
                .as_u64()
                .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0 && *f >= 0.0).map(|f| f as u64))
                .and_then(|n| u32::try_from(n).ok())
                .filter(|n| *n >= 1)
                .map(DayRule::Single),
            Value::String(s) => s.parse().ok(),
            _ => None,
        }
    }
}

impl FromStr for DayRule {
    type Err = ParseDayRuleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        all_consuming(delimited(space0, day_rule, space0))(s)
            .map(|(_, rule)| rule)
            .map_err(|_| ParseDayRuleError { input: s.to_owned() })
    }
}

impl fmt::Display for DayRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DayRule::Single(n) => write!(f, "{}", n),
            DayRule::Range(lo, hi) => write!(f, "{}-{}", lo, hi),
        }
    }
}

impl Serialize for DayRule {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            DayRule::Single(n) => serializer.serialize_u32(*n),
            DayRule::Range(_, _) => serializer.collect_str(self),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Event {
    pub name: String,
    /// 1-based month index.
    pub month: usize,
    pub day: DayRule,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl Event {
    pub fn new(name: &str, month: usize, day: DayRule) -> Self {
        Event {
            name: name.to_owned(),
            month,
            day,
            color: None,
        }
    }

    pub fn with_color(mut self, color: &str) -> Self {
        self.color = Some(color.to_owned());
        self
    }

    pub fn falls_on(&self, month0: usize, day: u32) -> bool {
        self.month.checked_sub(1) == Some(month0) && self.day.contains(day)
    }

    fn key(&self) -> (usize, DayRule, String) {
        (self.month, self.day, self.name.trim().to_lowercase())
    }

    /// Reads a persisted event. Months are clamped into `[1, month_count]`;
    /// events without a name, month or usable day are rejected.
    pub fn from_value(value: &Value, month_count: usize) -> Option<Self> {
        let name = value.get("name")?.as_str()?.trim();
        if name.is_empty() {
            return None;
        }

        let month = match value.get("month")? {
            Value::Number(n) => n.as_i64()?,
            Value::String(s) => super::datemath::parse_leading_int(s)?,
            _ => return None,
        };
        let month = month.clamp(1, month_count.max(1) as i64) as usize;
        let day = DayRule::from_value(value.get("day")?)?;
        let color = value
            .get("color")
            .and_then(Value::as_str)
            .map(str::to_owned);

        Some(Event {
            name: name.to_owned(),
            month,
            day,
            color,
        })
    }
}

/// True iff any event falls on `day` of the 0-based month `month0`.
pub fn matches(events: &[Event], month0: usize, day: u32) -> bool {
    events.iter().any(|e| e.falls_on(month0, day))
}

pub fn events_on(events: &[Event], month0: usize, day: u32) -> impl Iterator<Item = &Event> {
    events.iter().filter(move |e| e.falls_on(month0, day))
}

/// Events of the 0-based month `month0`, by first day then name.
pub fn events_in_month(events: &[Event], month0: usize) -> Vec<&Event> {
    let mut found: Vec<&Event> = events
        .iter()
        .filter(|e| e.month.checked_sub(1) == Some(month0))
        .collect();
    found.sort_by(|a, b| compare_in_month(a, b));
    found
}

fn compare_in_month(a: &Event, b: &Event) -> Ordering {
    a.day
        .first()
        .cmp(&b.day.first())
        .then_with(|| a.name.cmp(&b.name))
}

pub(super) fn sort_events(events: &mut [Event]) {
    events.sort_by(|a, b| a.month.cmp(&b.month).then_with(|| compare_in_month(a, b)));
}

/// Adds an annual event, clamping it into the calendar. Returns `false` when
/// an event with the same month, days and name already exists.
pub fn add_event(cal: &mut Calendar, mut event: Event) -> bool {
    event.month = event.month.clamp(1, cal.months.len());
    event.day = event.day.clamped(cal.months[event.month - 1].days());

    let key = event.key();
    if cal.events.iter().any(|e| e.key() == key) {
        return false;
    }

    log::info!("Adding event '{}' on {} of month {}", event.name, event.day, event.month);
    cal.events.push(event);
    sort_events(&mut cal.events);
    true
}

/// Removes every event whose name equals `name`, ignoring case and
/// surrounding whitespace. Returns how many were removed.
pub fn remove_events(cal: &mut Calendar, name: &str) -> usize {
    let needle = name.trim().to_lowercase();
    let before = cal.events.len();
    cal.events.retain(|e| e.name.trim().to_lowercase() != needle);
    let removed = before - cal.events.len();

    if removed > 0 {
        log::info!("Removed {} event(s) named '{}'", removed, name.trim());
    }
    removed
}
