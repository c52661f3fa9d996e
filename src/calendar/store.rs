use serde_json::Value;
use std::convert::TryFrom;

use super::sets::{default_calendar, default_month, DEFAULT_MONTH_DAYS};
use super::{event, Calendar, CurrentDate, Event, Month, MAX_MONTH_DAYS};
use crate::provider::{Result, StateProvider, STATE_KEY};

/// Owns the live calendar and the provider it is persisted to.
pub struct CalendarStore<P: StateProvider> {
    provider: P,
    calendar: Calendar,
}

impl<P: StateProvider> CalendarStore<P> {
    /// Loads the calendar from `provider`, repairing whatever is missing.
    pub fn open(provider: P) -> Self {
        let calendar = ensure_initialized(provider.get(STATE_KEY));
        CalendarStore { provider, calendar }
    }

    pub fn get(&self) -> &Calendar {
        &self.calendar
    }

    pub fn get_mut(&mut self) -> &mut Calendar {
        &mut self.calendar
    }

    /// Replaces the calendar with the built-in defaults.
    pub fn reset(&mut self) {
        log::info!("Resetting calendar to defaults");
        self.calendar = default_calendar();
    }

    /// Writes the calendar back under its key and flushes the provider.
    pub fn flush(&mut self) -> Result<()> {
        self.provider.set(STATE_KEY, self.calendar.to_value());
        self.provider.flush()
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }
}

/// Turns whatever was persisted into a valid calendar.
///
/// Without an object holding `weekdays` and `months` arrays the defaults are
/// used wholesale. Otherwise each top-level field is checked on its own and
/// replaced by its default when missing or malformed.
pub fn ensure_initialized(raw: Option<&Value>) -> Calendar {
    let raw = match raw {
        Some(raw)
            if raw.get("weekdays").map_or(false, Value::is_array)
                && raw.get("months").map_or(false, Value::is_array) =>
        {
            raw
        }
        Some(_) => {
            log::warn!("Persisted calendar is unusable, installing defaults");
            return default_calendar();
        }
        None => {
            log::info!("No persisted calendar, installing defaults");
            return default_calendar();
        }
    };

    let defaults = default_calendar();

    let weekdays = reconcile_weekdays(raw.get("weekdays")).unwrap_or_else(|| {
        log::warn!("Repairing calendar weekdays from defaults");
        defaults.weekdays.clone()
    });

    let months = reconcile_months(raw.get("months")).unwrap_or_else(|| {
        log::warn!("Repairing calendar months from defaults");
        defaults.months.clone()
    });

    let mut events = reconcile_events(raw.get("events"), months.len()).unwrap_or_else(|| {
        log::warn!("Repairing calendar events from defaults");
        defaults
            .events
            .iter()
            .cloned()
            .map(|mut e| {
                e.month = e.month.min(months.len());
                e
            })
            .collect()
    });
    event::sort_events(&mut events);

    let current = reconcile_current(raw.get("current")).unwrap_or_else(|| {
        log::warn!("Repairing current date from defaults");
        defaults.current
    });

    let mut cal = Calendar {
        current,
        weekdays,
        months,
        events,
    };
    // Clamps a cursor that no longer fits the months and rederives the weekday.
    cal.relocate(current.month, current.day_of_the_month, current.year);
    cal
}

fn reconcile_weekdays(value: Option<&Value>) -> Option<Vec<String>> {
    let weekdays: Vec<String> = serde_json::from_value(value?.clone()).ok()?;
    if weekdays.is_empty() {
        None
    } else {
        Some(weekdays)
    }
}

fn reconcile_months(value: Option<&Value>) -> Option<Vec<Month>> {
    let entries = value?.as_array()?;
    if entries.is_empty() {
        return None;
    }

    let months = entries
        .iter()
        .enumerate()
        .map(|(i, entry)| reconcile_month(i, entry))
        .collect();
    Some(months)
}

fn reconcile_month(index: usize, entry: &Value) -> Month {
    let fallback = default_month(index);

    // A bare number is a days-only month.
    if let Some(days) = entry.as_u64() {
        return Month::new(&fallback.name, days_or_default(days), &fallback.season, &fallback.color);
    }

    let text = |key: &str, default: &str| {
        entry
            .get(key)
            .and_then(Value::as_str)
            .unwrap_or(default)
            .to_owned()
    };

    let days = entry
        .get("days")
        .and_then(Value::as_u64)
        .map_or(DEFAULT_MONTH_DAYS, days_or_default);

    Month::new(
        &text("name", &fallback.name),
        days,
        &text("season", &fallback.season),
        &text("color", &fallback.color),
    )
}

fn days_or_default(days: u64) -> u32 {
    match days {
        0 => DEFAULT_MONTH_DAYS,
        d if d > u64::from(MAX_MONTH_DAYS) => {
            log::warn!("Month of {} days capped at {}", d, MAX_MONTH_DAYS);
            MAX_MONTH_DAYS
        }
        d => u32::try_from(d).unwrap_or(MAX_MONTH_DAYS),
    }
}

fn reconcile_events(value: Option<&Value>, month_count: usize) -> Option<Vec<Event>> {
    let entries = value?.as_array()?;
    let events = entries
        .iter()
        .filter_map(|entry| {
            let parsed = Event::from_value(entry, month_count);
            if parsed.is_none() {
                log::warn!("Dropping malformed event {}", entry);
            }
            parsed
        })
        .collect();
    Some(events)
}

fn reconcile_current(value: Option<&Value>) -> Option<CurrentDate> {
    let value = value?;
    let month = value.get("month")?.as_u64()?;
    let day = value.get("day_of_the_month")?.as_u64()?;
    let year = value.get("year")?.as_i64()?;

    Some(CurrentDate {
        month: usize::try_from(month).unwrap_or(usize::MAX),
        day_of_the_month: u32::try_from(day).unwrap_or(u32::MAX),
        day_of_the_week: 0,
        year,
    })
}
