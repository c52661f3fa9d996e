//! Built-in name sets, colour themes and the default calendar.

use once_cell::sync::Lazy;
use phf::phf_map;
use std::fmt;

use super::{Calendar, DayRule, Event, Month};

pub const DEFAULT_YEAR: i64 = 998;
pub const DEFAULT_MONTH_DAYS: u32 = 28;
pub const FALLBACK_MONTH_COLOR: &str = "#EEEEEE";

pub static MONTH_NAME_SETS: phf::Map<&'static str, &'static [&'static str]> = phf_map! {
    "eberron" => &[
        "Zarantyr", "Olarune", "Therendor", "Eyre", "Dravago", "Nymm",
        "Lharvion", "Barrakas", "Rhaan", "Sypheros", "Aryth", "Vult",
    ],
    "druidic" => &[
        "Frostmantle", "Thornrise", "Treeborn", "Rainsong", "Arrowfar", "Sunstride",
        "Glitterstream", "Havenwild", "Stormborn", "Harrowfall", "Silvermoon", "Windwhisper",
    ],
    "dwarven" => &[
        "Aruk", "Lurn", "Ulbar", "Kharn", "Ziir", "Dwarhuun",
        "Jond", "Sylar", "Razagul", "Thazm", "Drakhadur", "Uarth",
    ],
    "halfling" => &[
        "Fang", "Wind", "Ash", "Hunt", "Song", "Dust",
        "Claw", "Blood", "Horn", "Heart", "Spirit", "Smoke",
    ],
    "gregorian" => &[
        "January", "February", "March", "April", "May", "June",
        "July", "August", "September", "October", "November", "December",
    ],
};

pub static WEEKDAY_NAME_SETS: phf::Map<&'static str, &'static [&'static str]> = phf_map! {
    "eberron" => &["Sul", "Mol", "Zol", "Wir", "Zor", "Far", "Sar"],
    "gregorian" => &["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"],
};

pub static SEASON_SETS: phf::Map<&'static str, &'static [&'static str]> = phf_map! {
    "northern" => &[
        "Mid-winter", "Late winter", "Early spring", "Mid-spring", "Late spring", "Early summer",
        "Mid-summer", "Late summer", "Early autumn", "Mid-autumn", "Late autumn", "Early winter",
    ],
    "southern" => &[
        "Mid-summer", "Late summer", "Early autumn", "Mid-autumn", "Late autumn", "Early winter",
        "Mid-winter", "Late winter", "Early spring", "Mid-spring", "Late spring", "Early summer",
    ],
    "tropic" => &[
        "Dry", "Dry", "Dry", "Dry", "Rainy", "Rainy",
        "Rainy", "Rainy", "Rainy", "Rainy", "Dry", "Dry",
    ],
};

pub static COLOR_THEMES: phf::Map<&'static str, &'static [&'static str]> = phf_map! {
    // Moons of Eberron
    "lunar" => &[
        "#F5F5FA", "#FFC68A", "#D3D3D3", "#C0C0C0", "#E6E6FA", "#FFD96B",
        "#F5F5F5", "#DCDCDC", "#9AC0FF", "#696969", "#FF4500", "#A9A9A9",
    ],
    "seasons" => &[
        "#FFFFFF", "#CBD5E1", "#D8F3DC", "#FFB7C5", "#E6E6FA", "#FFC54D",
        "#50C878", "#64B5F6", "#B38E3C", "#FF7518", "#8B5A2B", "#475569",
    ],
    "druidic" => &[
        "#F2F7FF", "#C9D6C3", "#D8F3DC", "#D8CFEA", "#9EC5E8", "#FFC54D",
        "#63D2FF", "#50C878", "#2E3A8C", "#FF7518", "#E6E6FA", "#E8EDF2",
    ],
    "dwarven" => &[
        "#E6F7FF", "#E5E4E2", "#50C878", "#F7CAC9", "#9966CC", "#FFD700",
        "#149174", "#0F52BA", "#FF6A00", "#CD7F32", "#C0C0C0", "#DDEAF7",
    ],
    "halfling" => &[
        "#E8EEF3", "#BDE0FE", "#C7CBD1", "#2F855A", "#F48FB1", "#BF946A",
        "#D6C151", "#8B0000", "#F3ECDB", "#8E3B46", "#C7C3E3", "#6B7280",
    ],
    "birthstones" => &[
        "#7A1E2C", "#8E5AC8", "#66E5D9", "#F2FBFF", "#00A86B", "#F7F3EE",
        "#D0002A", "#A8E100", "#0A4AA6", "#E83E8C", "#FFA726", "#00B8D4",
    ],
};

/// Theme applied along with a month name set.
pub static MONTH_SET_THEMES: phf::Map<&'static str, &'static str> = phf_map! {
    "eberron" => "lunar",
    "druidic" => "druidic",
    "dwarven" => "dwarven",
    "halfling" => "halfling",
    "gregorian" => "birthstones",
};

// (name, month, first day, last day, color)
const DEFAULT_EVENTS: &[(&str, usize, u32, u32, &str)] = &[
    // Sharn
    ("Crystalfall", 2, 9, 9, "#D7F3FF"),
    ("Day of Ashes", 5, 3, 3, "#B0BEC5"),
    ("The Race of Eight Winds", 7, 23, 23, "#004225"),
    // Khorvaire
    ("Day of Mourning", 2, 20, 20, "#9E9E9E"),
    ("Galifar's Throne", 6, 5, 5, "#D4AF37"),
    ("Thronehold", 11, 11, 11, "#E80001"),
    // Sovereign Host
    ("Onatar's Flame", 1, 7, 7, "#FF6F00"),
    ("Turrant's Gift", 2, 14, 14, "#FBC02D"),
    ("Olladra's Feast", 2, 28, 28, "#8BC34A"),
    ("Sun's Blessing", 3, 15, 15, "#FFC107"),
    ("Aureon's Crown", 5, 26, 26, "#283593"),
    ("Brightblade", 6, 12, 12, "#B71C1C"),
    ("Bounty's Blessing", 7, 14, 14, "#388E3C"),
    ("The Hunt", 8, 4, 4, "#1B5E20"),
    ("Boldrei's Feast", 9, 9, 9, "#F57C00"),
    ("Market Day", 11, 20, 20, "#FFD54F"),
    // Dark Six
    ("Shargon's Bargain", 4, 13, 13, "#006064"),
    ("Second Skin", 6, 11, 11, "#AEEA00"),
    ("Wildnight", 10, 18, 19, "#AD1457"),
    ("Long Shadows", 12, 26, 28, "#0D0D0D"),
    // Silver Flame
    ("Rebirth Eve", 1, 14, 14, "#EAF2FF"),
    ("Bright Souls' Day", 2, 18, 18, "#FFF2C6"),
    ("Tirasday", 3, 5, 5, "#DCEBFF"),
    ("Initiation Day", 4, 11, 11, "#C7E3FF"),
    ("Baker's Night", 5, 6, 6, "#D8B98F"),
    ("Promisetide", 5, 28, 28, "#BDE3FF"),
    ("First Dawn", 6, 21, 21, "#FFD1A6"),
    ("Silvertide", 7, 14, 14, "#F2F7FF"),
    ("Victory Day", 8, 9, 9, "#B3E5FC"),
    ("Fathen's Fall", 8, 25, 25, "#E7ECF5"),
    ("The Ascension", 10, 1, 1, "#E6F0FF"),
    ("Saint Valtros's Day", 10, 25, 25, "#E8ECFF"),
    ("Rampartide", 11, 24, 24, "#D6F5D6"),
    ("Khybersef", 12, 27, 27, "#111827"),
];

static DEFAULT_CALENDAR: Lazy<Calendar> = Lazy::new(|| {
    let names = MONTH_NAME_SETS["eberron"];
    let seasons = SEASON_SETS["northern"];
    let colors = COLOR_THEMES["lunar"];

    let months = (0..names.len())
        .map(|i| Month::new(names[i], DEFAULT_MONTH_DAYS, seasons[i], colors[i]))
        .collect();

    let events = DEFAULT_EVENTS
        .iter()
        .map(|&(name, month, lo, hi, color)| {
            let day = if lo == hi {
                DayRule::Single(lo)
            } else {
                DayRule::range(lo, hi)
            };
            Event::new(name, month, day).with_color(color)
        })
        .collect();

    let weekdays = WEEKDAY_NAME_SETS["eberron"]
        .iter()
        .map(|&w| w.to_owned())
        .collect();

    Calendar::new(weekdays, months, events, DEFAULT_YEAR)
        .unwrap_or_else(|| unreachable!("built-in calendar has months and weekdays"))
});

/// A fresh copy of the built-in calendar: 1 Zarantyr 998.
pub fn default_calendar() -> Calendar {
    DEFAULT_CALENDAR.clone()
}

/// Month `index` of the built-in calendar, or a plain 28-day month past its end.
pub fn default_month(index: usize) -> Month {
    DEFAULT_CALENDAR
        .months()
        .get(index)
        .cloned()
        .unwrap_or_else(|| {
            Month::new(
                &format!("Month {}", index + 1),
                DEFAULT_MONTH_DAYS,
                "",
                FALLBACK_MONTH_COLOR,
            )
        })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetKind {
    Months,
    Weekdays,
    Seasons,
    Theme,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SetError {
    Unknown(String),
    WrongLength { expected: usize, found: usize },
}

impl fmt::Display for SetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SetError::Unknown(name) => write!(f, "unknown set '{}'", name),
            SetError::WrongLength { expected, found } => write!(
                f,
                "set has {} entries but this calendar needs {}",
                found, expected
            ),
        }
    }
}

impl std::error::Error for SetError {}

impl SetKind {
    fn table(&self) -> &'static phf::Map<&'static str, &'static [&'static str]> {
        match self {
            SetKind::Months => &MONTH_NAME_SETS,
            SetKind::Weekdays => &WEEKDAY_NAME_SETS,
            SetKind::Seasons => &SEASON_SETS,
            SetKind::Theme => &COLOR_THEMES,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SetKind::Months => "Month names",
            SetKind::Weekdays => "Weekday names",
            SetKind::Seasons => "Seasons",
            SetKind::Theme => "Color theme",
        }
    }

    /// Names of the available sets, sorted.
    pub fn available(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = self.table().keys().copied().collect();
        names.sort_unstable();
        names
    }

    /// Applies the named set. Month name sets also apply their matching
    /// theme, which is returned.
    pub fn apply(&self, cal: &mut Calendar, name: &str) -> Result<Option<&'static str>, SetError> {
        let key = name.trim().to_lowercase();
        let entries = self
            .table()
            .get(key.as_str())
            .ok_or_else(|| SetError::Unknown(key.clone()))?;

        if *self != SetKind::Weekdays && entries.len() != cal.months.len() {
            return Err(SetError::WrongLength {
                expected: cal.months.len(),
                found: entries.len(),
            });
        }

        let mut theme = None;
        match self {
            SetKind::Months => {
                for (month, name) in cal.months.iter_mut().zip(entries.iter()) {
                    month.name = (*name).to_owned();
                }
                if let Some(&linked) = MONTH_SET_THEMES.get(key.as_str()) {
                    SetKind::Theme.apply(cal, linked)?;
                    theme = Some(linked);
                }
            }
            SetKind::Seasons => {
                for (month, season) in cal.months.iter_mut().zip(entries.iter()) {
                    month.season = (*season).to_owned();
                }
            }
            SetKind::Theme => {
                for (month, color) in cal.months.iter_mut().zip(entries.iter()) {
                    month.color = (*color).to_owned();
                }
            }
            SetKind::Weekdays => {
                cal.weekdays = entries.iter().map(|&w| w.to_owned()).collect();
                // The cycle length may have changed.
                let cur = cal.current;
                cal.relocate(cur.month, cur.day_of_the_month, cur.year);
            }
        }

        log::info!("{} set to '{}'", self.label(), key);
        Ok(theme)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::tests::small_calendar;

    #[test]
    fn default_calendar_shape() {
        let cal = default_calendar();
        assert_eq!(cal.months().len(), 12);
        assert!(cal.months().iter().all(|m| m.days() == 28));
        assert_eq!(cal.weekdays().len(), 7);
        assert_eq!(cal.current_month().name, "Zarantyr");
        assert_eq!(cal.current_month().season, "Mid-winter");
        assert_eq!(cal.current().year(), 998);
        assert_eq!(cal.events().len(), DEFAULT_EVENTS.len());
        assert!(cal
            .events()
            .iter()
            .any(|e| e.name == "Wildnight" && e.day == DayRule::Range(18, 19)));
    }

    #[test]
    fn every_table_entry_fits_twelve_months() {
        for table in &[&MONTH_NAME_SETS, &SEASON_SETS, &COLOR_THEMES] {
            assert!(table.values().all(|set| set.len() == 12));
        }
    }

    #[test]
    fn month_set_brings_its_theme() {
        let mut cal = default_calendar();
        let theme = SetKind::Months.apply(&mut cal, "Gregorian").unwrap();
        assert_eq!(theme, Some("birthstones"));
        assert_eq!(cal.months()[0].name, "January");
        assert_eq!(cal.months()[0].color, "#7A1E2C");
    }

    #[test]
    fn weekday_set_keeps_weekday_derived() {
        let mut cal = default_calendar();
        crate::calendar::set_date(&mut cal, "10", "1", None);
        SetKind::Weekdays.apply(&mut cal, "gregorian").unwrap();
        assert_eq!(cal.current_weekday(), "Tue");
    }

    #[test]
    fn rejects_unknown_and_mismatched_sets() {
        let mut cal = small_calendar();
        assert_eq!(
            SetKind::Seasons.apply(&mut cal, "arctic"),
            Err(SetError::Unknown("arctic".to_owned()))
        );
        assert_eq!(
            SetKind::Seasons.apply(&mut cal, "northern"),
            Err(SetError::WrongLength {
                expected: 2,
                found: 12
            })
        );
        assert_eq!(cal.months()[0].season, "Cold");
    }

    #[test]
    fn available_is_sorted() {
        assert_eq!(SetKind::Weekdays.available(), vec!["eberron", "gregorian"]);
        assert_eq!(
            SetKind::Seasons.available(),
            vec!["northern", "southern", "tropic"]
        );
    }
}
