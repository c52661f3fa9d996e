use nom::{
    character::complete::{digit1, one_of, space0},
    combinator::{opt, recognize},
    sequence::{pair, preceded},
    IResult,
};

use super::{Calendar, MonthIndex};

/// Weekday index of a day of the month, assuming every month starts the
/// cycle anew.
pub fn weekday_of(day_of_month: i64, cycle_length: usize) -> usize {
    let cycle = cycle_length.max(1) as i64;
    (day_of_month - 1).rem_euclid(cycle) as usize
}

pub fn advance_day(cal: &mut Calendar) {
    let cur = cal.current;
    let mut month = cur.month;
    let mut day = cur.day_of_the_month + 1;
    let mut year = cur.year;

    if day > cal.months[month].days() {
        day = 1;
        month = (month + 1) % cal.months.len();
        if month == 0 {
            year = year.saturating_add(1);
        }
    }

    cal.relocate(month, day, year);
}

pub fn retreat_day(cal: &mut Calendar) {
    let cur = cal.current;
    let month_count = cal.months.len();
    let mut month = cur.month;
    let mut day = i64::from(cur.day_of_the_month) - 1;
    let mut year = cur.year;

    if day < 1 {
        month = (month + month_count - 1) % month_count;
        day = i64::from(cal.months[month].days());
        if month == month_count - 1 {
            year = year.saturating_sub(1).max(0);
        }
    }

    cal.relocate(month, day as u32, year);
}

/// Moves `n` days forward, or backward for negative `n`.
///
/// Whole months are crossed in one step, landing exactly where the same
/// number of `advance_day` or `retreat_day` calls would.
pub fn step_days(cal: &mut Calendar, n: i64) {
    let mut remaining = n.unsigned_abs();

    while remaining > 0 {
        let cur = cal.current;
        if n > 0 {
            let left = u64::from(cal.months[cur.month].days() - cur.day_of_the_month);
            if remaining <= left {
                cal.relocate(cur.month, cur.day_of_the_month + remaining as u32, cur.year);
                return;
            }
            cal.relocate(cur.month, cal.months[cur.month].days(), cur.year);
            advance_day(cal);
            remaining -= left + 1;
        } else {
            let back = u64::from(cur.day_of_the_month - 1);
            if remaining <= back {
                cal.relocate(cur.month, cur.day_of_the_month - remaining as u32, cur.year);
                return;
            }
            cal.relocate(cur.month, 1, cur.year);
            retreat_day(cal);
            remaining -= back + 1;
        }
    }
}

/// Sets the date from raw command arguments.
///
/// `month` is 1-based. Arguments that do not start with a number default to
/// 1 and everything is clamped into range. A missing or non-numeric `year`
/// keeps the current year.
pub fn set_date(cal: &mut Calendar, day: &str, month: &str, year: Option<&str>) {
    let month_count = cal.months.len() as i64;
    let month = parse_leading_int(month).unwrap_or(1).clamp(1, month_count) as usize - 1;

    let max_day = i64::from(cal.months[month].days());
    let day = parse_leading_int(day).unwrap_or(1).clamp(1, max_day) as u32;

    let year = year
        .and_then(parse_leading_int)
        .unwrap_or(cal.current.year);

    log::debug!("Setting date to {}/{}/{}", day, month + 1, year);
    cal.relocate(month, day, year);
}

/// Resolves the month a `show` or `sendDate` asks for.
///
/// `month` is a month name (any case), `next`, `previous` or a 1-based
/// number clamped into range. Names win over the keywords. A numeric `year`
/// replaces the resolved one. Returns `None` when nothing matches.
pub fn resolve_month(cal: &Calendar, month: &str, year: Option<&str>) -> Option<MonthIndex> {
    let month = month.trim();
    let current = cal.current_month_index();

    let named = cal
        .months
        .iter()
        .position(|m| m.name.trim().eq_ignore_ascii_case(month));

    let mut target = match named {
        Some(index) => MonthIndex {
            index,
            year: current.year,
        },
        None if month.eq_ignore_ascii_case("next") => cal.next_month(current),
        None if month.eq_ignore_ascii_case("previous") || month.eq_ignore_ascii_case("prev") => {
            cal.prev_month(current)
        }
        None => {
            let number = parse_leading_int(month)?;
            MonthIndex {
                index: number.clamp(1, cal.months.len() as i64) as usize - 1,
                year: current.year,
            }
        }
    };

    if let Some(year) = year.and_then(parse_leading_int) {
        target.year = year;
    }
    Some(target)
}

fn leading_int(input: &str) -> IResult<&str, &str> {
    preceded(space0, recognize(pair(opt(one_of("+-")), digit1)))(input)
}

/// Reads the integer at the start of `input`, ignoring whatever follows it,
/// so `"08"` is 8 and `"12th"` is 12. Returns `None` without leading digits.
/// Values too large for `i64` saturate towards their sign.
pub fn parse_leading_int(input: &str) -> Option<i64> {
    let (_, digits) = leading_int(input).ok()?;
    match digits.parse::<i64>() {
        Ok(value) => Some(value),
        Err(_) if digits.starts_with('-') => Some(i64::MIN),
        Err(_) => Some(i64::MAX),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::sets::default_calendar;
    use crate::calendar::tests::small_calendar;

    fn assert_weekday_derived(cal: &Calendar) {
        let cur = cal.current();
        assert_eq!(
            cur.day_of_the_week(),
            weekday_of(i64::from(cur.day_of_the_month()), cal.cycle_length())
        );
    }

    #[test]
    fn weekday_uses_floored_modulo() {
        assert_eq!(weekday_of(1, 7), 0);
        assert_eq!(weekday_of(8, 7), 0);
        assert_eq!(weekday_of(10, 7), 2);
        assert_eq!(weekday_of(0, 7), 6);
        assert_eq!(weekday_of(-6, 7), 0);
        assert_eq!(weekday_of(5, 1), 0);
    }

    #[test]
    fn advance_within_month() {
        let mut cal = small_calendar();
        advance_day(&mut cal);
        assert_eq!(cal.current().day_of_the_month(), 2);
        assert_eq!(cal.current().day_of_the_week(), 1);
        assert_eq!(cal.current().month(), 0);
    }

    #[test]
    fn advance_rolls_month() {
        let mut cal = small_calendar();
        set_date(&mut cal, "5", "1", None);
        advance_day(&mut cal);
        assert_eq!(cal.current().month(), 1);
        assert_eq!(cal.current().day_of_the_month(), 1);
        assert_eq!(cal.current().year(), 10);
    }

    #[test]
    fn advance_past_year_end_increments_year() {
        let mut cal = small_calendar();
        set_date(&mut cal, "3", "2", None);
        advance_day(&mut cal);
        assert_eq!(cal.current().month(), 0);
        assert_eq!(cal.current().day_of_the_month(), 1);
        assert_eq!(cal.current().year(), 11);
        assert_weekday_derived(&cal);
    }

    #[test]
    fn retreat_before_year_start_decrements_year() {
        let mut cal = small_calendar();
        retreat_day(&mut cal);
        assert_eq!(cal.current().month(), 1);
        assert_eq!(cal.current().day_of_the_month(), 3);
        assert_eq!(cal.current().year(), 9);
        assert_weekday_derived(&cal);
    }

    #[test]
    fn retreat_floors_year_at_zero() {
        let mut cal = small_calendar();
        set_date(&mut cal, "1", "1", Some("0"));
        retreat_day(&mut cal);
        assert_eq!(cal.current().year(), 0);
        assert_eq!(cal.current().month(), 1);
        assert_eq!(cal.current().day_of_the_month(), 3);
    }

    #[test]
    fn advance_then_retreat_is_identity() {
        let mut cal = default_calendar();
        for _ in 0..(28 * 12 + 5) {
            let before = *cal.current();
            advance_day(&mut cal);
            assert_weekday_derived(&cal);
            retreat_day(&mut cal);
            assert_eq!(*cal.current(), before);
            advance_day(&mut cal);
        }
    }

    #[test]
    fn retreat_then_advance_is_identity_away_from_floor() {
        let mut cal = small_calendar();
        for _ in 0..20 {
            let before = *cal.current();
            retreat_day(&mut cal);
            assert_weekday_derived(&cal);
            advance_day(&mut cal);
            assert_eq!(*cal.current(), before);
            advance_day(&mut cal);
        }
    }

    #[test]
    fn step_days_both_directions() {
        let mut cal = small_calendar();
        step_days(&mut cal, 7);
        assert_eq!(cal.current().month(), 1);
        assert_eq!(cal.current().day_of_the_month(), 3);

        step_days(&mut cal, -7);
        assert_eq!(cal.current().month(), 0);
        assert_eq!(cal.current().day_of_the_month(), 1);
        assert_eq!(cal.current().year(), 10);
    }

    #[test]
    fn set_date_clamps_day() {
        let mut cal = default_calendar();
        set_date(&mut cal, "99", "3", None);
        assert_eq!(cal.current().month(), 2);
        assert_eq!(cal.current().day_of_the_month(), 28);
        assert_weekday_derived(&cal);
    }

    #[test]
    fn set_date_defaults_non_numeric_month() {
        let mut cal = default_calendar();
        set_date(&mut cal, "10", "soon", None);
        assert_eq!(cal.current().month(), 0);
        assert_eq!(cal.current().day_of_the_month(), 10);
    }

    #[test]
    fn set_date_clamps_month_and_low_day() {
        let mut cal = default_calendar();
        set_date(&mut cal, "-4", "40", None);
        assert_eq!(cal.current().month(), 11);
        assert_eq!(cal.current().day_of_the_month(), 1);
    }

    #[test]
    fn set_date_keeps_year_unless_numeric() {
        let mut cal = default_calendar();
        set_date(&mut cal, "2", "2", None);
        assert_eq!(cal.current().year(), 998);

        set_date(&mut cal, "2", "2", Some("later"));
        assert_eq!(cal.current().year(), 998);

        set_date(&mut cal, "02", "02", Some("1002"));
        assert_eq!(cal.current().year(), 1002);
        assert_eq!(cal.current().day_of_the_week(), 1);
    }

    #[test]
    fn set_date_accepts_negative_year() {
        let mut cal = default_calendar();
        set_date(&mut cal, "1", "1", Some("-3"));
        assert_eq!(cal.current().year(), -3);
    }

    #[test]
    fn set_date_clamps_oversized_numbers() {
        let mut cal = default_calendar();
        set_date(&mut cal, "99999999999999999999", "3", None);
        assert_eq!(cal.current().month(), 2);
        assert_eq!(cal.current().day_of_the_month(), 28);

        set_date(&mut cal, "4", "99999999999999999999", Some("99999999999999999999"));
        assert_eq!(cal.current().month(), 11);
        assert_eq!(cal.current().day_of_the_month(), 4);
        assert_eq!(cal.current().year(), i64::MAX);
    }

    #[test]
    fn set_date_with_missing_arguments_defaults() {
        let mut cal = default_calendar();
        set_date(&mut cal, "12", "", None);
        assert_eq!(cal.current().month(), 0);
        assert_eq!(cal.current().day_of_the_month(), 12);
        assert_eq!(cal.current().year(), 998);

        set_date(&mut cal, "", "", None);
        assert_eq!(cal.current().month(), 0);
        assert_eq!(cal.current().day_of_the_month(), 1);
    }

    #[test]
    fn retreat_from_lowest_year_stays_at_zero() {
        let mut cal = small_calendar();
        set_date(&mut cal, "1", "1", Some("-9223372036854775808"));
        assert_eq!(cal.current().year(), i64::MIN);
        retreat_day(&mut cal);
        assert_eq!(cal.current().year(), 0);
        assert_eq!(cal.current().month(), 1);
        assert_eq!(cal.current().day_of_the_month(), 3);
    }

    #[test]
    fn step_days_matches_single_steps() {
        let mut stepped = default_calendar();
        let mut walked = default_calendar();
        set_date(&mut stepped, "17", "5", None);
        set_date(&mut walked, "17", "5", None);

        for &n in &[1, 11, 12, 28, 29, 400, -1, -16, -17, -28, -29, -400, -1000] {
            step_days(&mut stepped, n);
            if n > 0 {
                (0..n).for_each(|_| advance_day(&mut walked));
            } else {
                (0..-n).for_each(|_| retreat_day(&mut walked));
            }
            assert_eq!(stepped.current(), walked.current(), "after stepping {}", n);
            assert_weekday_derived(&stepped);
        }
    }

    #[test]
    fn step_days_crosses_many_years() {
        let mut cal = small_calendar();
        step_days(&mut cal, 8 * 1000);
        assert_eq!(cal.current().year(), 1010);
        assert_eq!(cal.current().month(), 0);
        assert_eq!(cal.current().day_of_the_month(), 1);

        step_days(&mut cal, -8 * 2000);
        assert_eq!(cal.current().year(), 0);
    }

    #[test]
    fn resolves_months_by_name_number_and_keyword() {
        let mut cal = default_calendar();
        let at = |index, year| Some(MonthIndex { index, year });

        assert_eq!(resolve_month(&cal, "olarune", None), at(1, 998));
        assert_eq!(resolve_month(&cal, "4", Some("1000")), at(3, 1000));
        assert_eq!(resolve_month(&cal, "99", None), at(11, 998));
        assert_eq!(resolve_month(&cal, "Next", None), at(1, 998));
        assert_eq!(resolve_month(&cal, "previous", None), at(11, 997));
        assert_eq!(resolve_month(&cal, "prev", Some("5")), at(11, 5));
        assert_eq!(resolve_month(&cal, "Midsummer", None), None);

        set_date(&mut cal, "1", "12", None);
        assert_eq!(resolve_month(&cal, "next", None), at(0, 999));
        assert_eq!(resolve_month(&cal, "vult", Some("soon")), at(11, 998));
    }

    #[test]
    fn leading_int_parsing() {
        assert_eq!(parse_leading_int("08"), Some(8));
        assert_eq!(parse_leading_int("12th"), Some(12));
        assert_eq!(parse_leading_int(" -2"), Some(-2));
        assert_eq!(parse_leading_int("+5"), Some(5));
        assert_eq!(parse_leading_int("x1"), None);
        assert_eq!(parse_leading_int(""), None);
        assert_eq!(parse_leading_int("99999999999999999999"), Some(i64::MAX));
        assert_eq!(parse_leading_int("-99999999999999999999th"), Some(i64::MIN));
    }
}
