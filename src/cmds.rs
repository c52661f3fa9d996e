use itertools::Itertools;
use nom::{
    branch::alt,
    bytes::complete::tag_no_case,
    character::complete::{space0, space1},
    combinator::{eof, rest},
    error::{ErrorKind, ParseError},
    sequence::{delimited, preceded},
    Err, IResult,
};
use std::error;
use std::fmt;

use crate::calendar::datemath::parse_leading_int;
use crate::calendar::sets::SetKind;
use crate::calendar::{DayRule, Event};
use crate::render::resolve_color;

pub const MAX_REPEAT: u32 = 10_000;

/// A month other than the current one, as typed after `show` or `sendDate`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthQuery {
    pub month: String,
    pub year: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cmd {
    Show(Option<MonthQuery>),
    AdvanceDay(u32),
    RetreatDay(u32),
    SetDate {
        day: String,
        month: String,
        year: Option<String>,
    },
    SendDate(Option<MonthQuery>),
    Help,
    AddEvent(Event),
    RemoveEvent(String),
    Events,
    /// List the sets of a kind, or apply the named one.
    Sets(SetKind, Option<String>),
    ResetCalendar,
    /// A known verb with unusable arguments.
    Invalid(CmdError),
    Unknown(String),
}

impl Cmd {
    /// Whether only privileged callers may run this command.
    pub fn requires_privilege(&self) -> bool {
        !matches!(self, Cmd::Show(_) | Cmd::Unknown(_))
    }

    pub fn name(&self) -> &str {
        match self {
            Cmd::Show(_) => "show",
            Cmd::AdvanceDay(_) => "advanceday",
            Cmd::RetreatDay(_) => "retreatday",
            Cmd::SetDate { .. } => "setdate",
            Cmd::SendDate(_) => "senddate",
            Cmd::Help => "help",
            Cmd::AddEvent(_) => "addevent",
            Cmd::RemoveEvent(_) => "removeevent",
            Cmd::Events => "events",
            Cmd::Sets(SetKind::Months, _) => "months",
            Cmd::Sets(SetKind::Weekdays, _) => "weekdays",
            Cmd::Sets(SetKind::Seasons, _) => "seasons",
            Cmd::Sets(SetKind::Theme, _) => "theme",
            Cmd::ResetCalendar => "resetcalendar",
            Cmd::Invalid(e) => e.verb,
            Cmd::Unknown(verb) => verb.as_str(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CmdError {
    verb: &'static str,
    usage: &'static str,
}

impl CmdError {
    pub fn new(verb: &'static str, usage: &'static str) -> Self {
        CmdError { verb, usage }
    }

    pub fn usage(&self) -> &'static str {
        self.usage
    }
}

impl fmt::Display for CmdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Usage: {}", self.usage)
    }
}

impl error::Error for CmdError {}

pub enum Action {
    NoArg(fn() -> Cmd),
    Repeatable(fn(u32) -> Cmd),
    Arg(fn(&[&str]) -> Cmd),
}

pub fn match_action<'a, 's, T: ?Sized, Act: 's>(
    c: &'a T,
) -> impl Fn(&str) -> IResult<&str, (&'s str, &'s Act)> + 'a
where
    &'a T: IntoIterator<Item = &'s (&'s str, Act)>,
{
    move |input| {
        if let Some((name, act)) = c
            .into_iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(input))
        {
            Ok(("", (name, act)))
        } else {
            Err(Err::Error(ParseError::from_error_kind(
                input,
                ErrorKind::Tag,
            )))
        }
    }
}

const COMMANDS: &[(&str, Action)] = &[
    ("show", Action::Arg(|args| Cmd::Show(month_query(args)))),
    ("advanceday", Action::Repeatable(Cmd::AdvanceDay)),
    ("retreatday", Action::Repeatable(Cmd::RetreatDay)),
    (
        "setdate",
        Action::Arg(|args| Cmd::SetDate {
            day: args.get(0).map_or_else(String::new, |d| (*d).to_owned()),
            month: args.get(1).map_or_else(String::new, |m| (*m).to_owned()),
            year: args.get(2).map(|y| (*y).to_owned()),
        }),
    ),
    ("senddate", Action::Arg(|args| Cmd::SendDate(month_query(args)))),
    ("help", Action::NoArg(|| Cmd::Help)),
    ("addevent", Action::Arg(parse_add_event)),
    (
        "removeevent",
        Action::Arg(|args| {
            if args.is_empty() {
                Cmd::Invalid(CmdError::new("removeevent", "!cal removeEvent <name>"))
            } else {
                Cmd::RemoveEvent(args.join(" "))
            }
        }),
    ),
    ("events", Action::NoArg(|| Cmd::Events)),
    ("months", Action::Arg(|args| sets(SetKind::Months, args))),
    ("weekdays", Action::Arg(|args| sets(SetKind::Weekdays, args))),
    ("seasons", Action::Arg(|args| sets(SetKind::Seasons, args))),
    ("theme", Action::Arg(|args| sets(SetKind::Theme, args))),
    ("resetcalendar", Action::NoArg(|| Cmd::ResetCalendar)),
];

const ADD_EVENT_USAGE: &str = "!cal addEvent <mm> <dd|a-b> <name> [#color]";

/// `[month] [year]`. A trailing number after a month is the year, so month
/// names may contain spaces.
fn month_query(args: &[&str]) -> Option<MonthQuery> {
    match args {
        [] => None,
        [month] => Some(MonthQuery {
            month: (*month).to_owned(),
            year: None,
        }),
        [month @ .., year] if parse_leading_int(year).is_some() => Some(MonthQuery {
            month: month.join(" "),
            year: Some((*year).to_owned()),
        }),
        _ => Some(MonthQuery {
            month: args.join(" "),
            year: None,
        }),
    }
}

fn sets(kind: SetKind, args: &[&str]) -> Cmd {
    match args {
        [] => Cmd::Sets(kind, None),
        [one] if one.eq_ignore_ascii_case("list") => Cmd::Sets(kind, None),
        _ => Cmd::Sets(kind, Some(args.join(" "))),
    }
}

fn parse_add_event(args: &[&str]) -> Cmd {
    let invalid = || Cmd::Invalid(CmdError::new("addevent", ADD_EVENT_USAGE));

    let (month, day, mut name) = match args {
        [month, day, name @ ..] if !name.is_empty() => (*month, *day, name),
        _ => return invalid(),
    };

    // A trailing `#hex` or `#name` token is the colour when it resolves.
    let mut color = None;
    if let [head @ .., last] = name {
        if !head.is_empty() && last.starts_with('#') {
            if let Some(resolved) = resolve_color(last) {
                color = Some(resolved);
                name = head;
            }
        }
    }

    let month = match parse_leading_int(month) {
        Some(m) => m.max(1) as usize,
        None => return invalid(),
    };
    let day: DayRule = match day.parse() {
        Ok(day) => day,
        Err(_) => return invalid(),
    };

    let event = Event::new(&name.join(" "), month, day);
    Cmd::AddEvent(match color {
        Some(color) => event.with_color(&color),
        None => event,
    })
}

fn repeat_count(arg: Option<&&str>) -> u32 {
    arg.and_then(|a| parse_leading_int(a))
        .unwrap_or(1)
        .clamp(1, i64::from(MAX_REPEAT)) as u32
}

fn prefix(input: &str) -> IResult<&str, &str> {
    delimited(space0, tag_no_case("!cal"), alt((space1, eof)))(input)
}

/// Parses a chat line. Returns `None` when it is not a calendar command.
pub fn parse_command(line: &str) -> Option<Cmd> {
    let (_, args) = preceded(prefix, rest)(line).ok()?;
    let mut words = args.split_whitespace();

    let verb = match words.next() {
        Some(verb) => verb,
        None => return Some(Cmd::Show(None)),
    };
    let args = words.collect_vec();

    let cmd = match match_action(COMMANDS)(verb) {
        Ok((_, (_, act))) => match act {
            Action::NoArg(a) => a(),
            Action::Repeatable(a) => a(repeat_count(args.first())),
            Action::Arg(a) => a(&args),
        },
        Err(_) => Cmd::Unknown(verb.to_lowercase()),
    };
    Some(cmd)
}
