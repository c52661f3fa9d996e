pub mod color;
pub mod grid;

use itertools::Itertools;

use crate::calendar::{event, sets::SetKind, Calendar, MonthIndex};
use color::event_color;
use grid::{MonthView, TABLE_STYLE, TD_STYLE, TH_STYLE};

pub use color::{header_contrast, resolve_color, TextTone};
pub use grid::{DayCell, Highlight};

pub const DEFAULT_ERA: &str = "YK";

const HELP: &[(&str, &str)] = &[
    ("!cal [show]", "Show the current month and date"),
    (
        "!cal show &lt;month|next|previous&gt; [yyyy]",
        "Show another month",
    ),
    ("!cal advanceDay [n]", "Move forward n days (default 1)"),
    ("!cal retreatDay [n]", "Move back n days (default 1)"),
    ("!cal setDate &lt;dd&gt; &lt;mm&gt; [yyyy]", "Jump to a date"),
    ("!cal sendDate [month] [yyyy]", "Show the date, or a month, to everyone"),
    ("!cal addEvent &lt;mm&gt; &lt;dd|a-b&gt; &lt;name&gt; [#color]", "Add an annual event"),
    ("!cal removeEvent &lt;name&gt;", "Remove events by name"),
    ("!cal events", "List all events"),
    ("!cal months|weekdays|seasons|theme [set]", "List or apply a name set or theme"),
    ("!cal resetCalendar", "Restore the default calendar"),
    ("!cal help", "This text"),
];

/// Column at which day 1 of the current month sits.
pub fn first_offset(cal: &Calendar) -> usize {
    let w = cal.cycle_length() as i64;
    let cur = cal.current();
    let offset = (cur.day_of_the_week() as i64 - (i64::from(cur.day_of_the_month()) - 1)).rem_euclid(w);
    offset as usize
}

pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

fn swatch(color: &str) -> String {
    format!(
        "<span style=\"display:inline-block;width:10px;height:10px;vertical-align:baseline;\
         margin-right:4px;border:1px solid #000;background:{0};\" title=\"{0}\"></span>",
        escape(color)
    )
}

/// One line per event in the month, then its season.
fn month_footer(cal: &Calendar, month0: usize) -> Vec<String> {
    let month = &cal.months()[month0];
    let mut html: Vec<String> = event::events_in_month(cal.events(), month0)
        .into_iter()
        .map(|e| {
            format!(
                "<div style=\"margin:2px 0;\">{}{} {}: {}</div>",
                swatch(&event_color(e)),
                escape(&month.name),
                e.day,
                escape(&e.name)
            )
        })
        .collect();

    html.push(format!(
        "<div style=\"margin-top:8px;\">Season: {}</div>",
        escape(&month.season)
    ));
    html
}

/// Produces the markup for every calendar message.
#[derive(Debug, Clone)]
pub struct Renderer {
    era: String,
}

impl Default for Renderer {
    fn default() -> Self {
        Renderer::new(DEFAULT_ERA)
    }
}

impl Renderer {
    pub fn new(era: &str) -> Self {
        Renderer {
            era: era.to_owned(),
        }
    }

    pub fn render_grid(&self, cal: &Calendar) -> String {
        MonthView::new(cal, &self.era).to_html()
    }

    /// `<weekday>, <day> <month>, <year> <era>`, used at startup.
    pub fn date_label(&self, cal: &Calendar) -> String {
        let cur = cal.current();
        format!(
            "{}, {} {}, {} {}",
            cal.current_weekday(),
            cur.day_of_the_month(),
            cal.current_month().name,
            cur.year(),
            self.era
        )
    }

    pub fn render_day_summary(&self, cal: &Calendar) -> String {
        let cur = cal.current();
        let month = cal.current_month();

        let mut html = vec![
            self.render_grid(cal),
            format!(
                "<div style=\"font-weight:bold;margin:2px 0;\">{}, {} {}, {} {}</div>",
                escape(cal.current_weekday()),
                escape(&month.name),
                cur.day_of_the_month(),
                cur.year(),
                escape(&self.era)
            ),
        ];
        html.extend(month_footer(cal, cur.month()));
        html.concat()
    }

    /// Grid, events and season of `shown`, without the date line.
    pub fn render_month(&self, cal: &Calendar, shown: MonthIndex) -> String {
        let index = shown.index.min(cal.months().len() - 1);
        let mut html = vec![MonthView::new(cal, &self.era).month(shown).to_html()];
        html.extend(month_footer(cal, index));
        html.concat()
    }

    pub fn render_event_list(&self, cal: &Calendar) -> String {
        if cal.events().is_empty() {
            return "<div style=\"opacity:.7;\">No events.</div>".to_owned();
        }

        let head = ["Month", "Day", "Event", "Color"]
            .iter()
            .map(|h| format!("<th style=\"{}\">{}</th>", TH_STYLE, h))
            .join("");

        let rows = cal
            .events()
            .iter()
            .map(|e| {
                let month = cal
                    .months()
                    .get(e.month.saturating_sub(1))
                    .map_or("?", |m| m.name.as_str());
                let color = event_color(e);
                format!(
                    "<tr><td style=\"{td}\">{}</td><td style=\"{td}\">{}</td>\
                     <td style=\"{td}text-align:left;\">{}</td><td style=\"{td}\">{}</td></tr>",
                    escape(month),
                    e.day,
                    escape(&e.name),
                    swatch(&color),
                    td = TD_STYLE,
                )
            })
            .join("");

        format!(
            "<div style=\"margin:4px 0;\"><b>All Events</b></div>\
             <table style=\"{}\"><tr>{}</tr>{}</table>",
            TABLE_STYLE, head, rows
        )
    }

    /// The names a `months`/`weekdays`/`seasons`/`theme` command accepts.
    pub fn render_set_list(&self, kind: SetKind) -> String {
        format!(
            "<div style=\"margin:4px 0;\"><b>{}</b></div><div>{}</div>",
            kind.label(),
            kind.available().iter().map(|n| escape(n)).join(", ")
        )
    }

    pub fn render_help(&self) -> String {
        let rows = HELP
            .iter()
            .map(|(usage, what)| {
                format!("<div style=\"margin:2px 0;\"><code>{}</code> {}</div>", usage, what)
            })
            .join("");
        format!("<div style=\"margin:4px 0;\"><b>Calendar commands</b></div>{}", rows)
    }
}
