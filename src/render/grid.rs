use itertools::Itertools;
use std::iter;

use super::color::{event_color, header_contrast};
use super::escape;
use crate::calendar::{event, Calendar, MonthIndex};

pub const TABLE_STYLE: &str = "border-collapse:collapse;margin:4px;";
pub const TH_STYLE: &str = "border:1px solid #444;padding:2px;width:2em;text-align:center;";
pub const HEAD_STYLE: &str = "border:1px solid #444;padding:0;";
pub const TD_STYLE: &str =
    "border:1px solid #444;width:2em;height:2em;text-align:center;vertical-align:middle;";
const MONTH_HEADER_STYLE: &str = "padding:6px;text-align:left;";
const TODAY_STYLE: &str = "position:relative;z-index:10;border-radius:2px;\
box-shadow:0 3px 8px rgba(0,0,0,.65),0 12px 24px rgba(0,0,0,.35),inset 0 2px 0 rgba(255,255,255,.18);\
outline:2px solid rgba(0,0,0,.35);outline-offset:1px;box-sizing:border-box;\
font-weight:bold;font-size:1.2em;";

/// How an in-month cell is emphasized. Exactly one applies to each cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Highlight {
    Plain,
    Today,
    Event,
    TodayEvent,
}

impl Highlight {
    pub fn of(is_today: bool, has_event: bool) -> Self {
        match (is_today, has_event) {
            (true, true) => Highlight::TodayEvent,
            (true, false) => Highlight::Today,
            (false, true) => Highlight::Event,
            (false, false) => Highlight::Plain,
        }
    }

    pub fn is_today(self) -> bool {
        matches!(self, Highlight::Today | Highlight::TodayEvent)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayCell {
    day_num: u32,
    is_today: bool,
    event_color: Option<String>,
    title: Option<String>,
    background: String,
}

impl DayCell {
    pub fn new(day_num: u32) -> Self {
        DayCell {
            day_num,
            is_today: false,
            event_color: None,
            title: None,
            background: String::new(),
        }
    }

    pub fn today(mut self, is_today: bool) -> Self {
        self.is_today = is_today;
        self
    }

    /// Paints the cell for an event of colour `color`.
    pub fn event_color(mut self, color: Option<String>) -> Self {
        self.event_color = color;
        self
    }

    pub fn title(mut self, title: Option<String>) -> Self {
        self.title = title;
        self
    }

    /// Background for cells without an event.
    pub fn background(mut self, color: &str) -> Self {
        self.background = color.to_owned();
        self
    }

    pub fn highlight(&self) -> Highlight {
        Highlight::of(self.is_today, self.event_color.is_some())
    }

    pub fn to_html(&self) -> String {
        let bg = self.event_color.as_deref().unwrap_or(&self.background);
        let mut style = String::from(TD_STYLE);
        if !bg.is_empty() {
            style.push_str(&format!(
                "background-color:{};color:{};",
                escape(bg),
                header_contrast(bg).css()
            ));
        }
        if self.highlight().is_today() {
            style.push_str(TODAY_STYLE);
        }

        let title = self
            .title
            .as_deref()
            .map(|t| format!(" title=\"{}\"", escape(t)))
            .unwrap_or_default();

        format!("<td{} style=\"{}\">{}</td>", title, style, self.day_num)
    }
}

/// Lays `days` cells out in rows of `columns`, starting `first_offset`
/// columns in. Leading and trailing slots are `None`; no row is entirely
/// empty.
pub fn layout<T, F>(days: u32, first_offset: usize, columns: usize, mut cell: F) -> Vec<Vec<Option<T>>>
where
    F: FnMut(u32) -> T,
{
    let columns = columns.max(1);
    let chunks = iter::repeat_with(|| None)
        .take(first_offset % columns)
        .chain((1..=days).map(|d| Some(cell(d))))
        .chunks(columns);

    let rows = chunks
        .into_iter()
        .map(|row| {
            let mut row: Vec<Option<T>> = row.collect();
            row.resize_with(columns, || None);
            row
        })
        .collect();
    rows
}

/// The HTML table for one month, the current one unless told otherwise.
pub struct MonthView<'a> {
    cal: &'a Calendar,
    era: &'a str,
    shown: MonthIndex,
    first_offset: usize,
}

impl<'a> MonthView<'a> {
    pub fn new(cal: &'a Calendar, era: &'a str) -> Self {
        MonthView {
            cal,
            era,
            shown: cal.current_month_index(),
            first_offset: super::first_offset(cal),
        }
    }

    /// Shows `month` instead. Today is only marked when it falls inside it.
    pub fn month(mut self, month: MonthIndex) -> Self {
        self.shown = MonthIndex {
            index: month.index.min(self.cal.months().len() - 1),
            year: month.year,
        };
        self
    }

    /// Overrides the computed starting column.
    pub fn first_offset(mut self, offset: usize) -> Self {
        self.first_offset = offset;
        self
    }

    pub fn cells(&self) -> Vec<Vec<Option<DayCell>>> {
        let index = self.shown.index;
        let month = &self.cal.months()[index];
        let today = if self.shown == self.cal.current_month_index() {
            Some(self.cal.current().day_of_the_month())
        } else {
            None
        };

        layout(month.days(), self.first_offset, self.cal.cycle_length(), |day| {
            let first = event::events_on(self.cal.events(), index, day).next();
            let names = event::events_on(self.cal.events(), index, day)
                .map(|e| e.name.as_str())
                .join(", ");

            DayCell::new(day)
                .today(today == Some(day))
                .event_color(first.map(event_color))
                .title(first.map(|_| names))
                .background(&month.color)
        })
    }

    pub fn to_html(&self) -> String {
        let month = &self.cal.months()[self.shown.index];
        let width = self.cal.cycle_length();

        let mut html = vec![
            format!("<table style=\"{}\">", TABLE_STYLE),
            format!(
                "<tr><th colspan=\"{}\" style=\"{}\"><div style=\"{}background-color:{};color:{};\">\
                 {}<span style=\"float:right;\">{} {}</span></div></th></tr>",
                width,
                HEAD_STYLE,
                MONTH_HEADER_STYLE,
                escape(&month.color),
                header_contrast(&month.color).css(),
                escape(&month.name),
                self.shown.year,
                escape(self.era),
            ),
            format!(
                "<tr>{}</tr>",
                self.cal
                    .weekdays()
                    .iter()
                    .map(|w| format!("<th style=\"{}\">{}</th>", TH_STYLE, escape(w)))
                    .join("")
            ),
        ];

        for row in self.cells() {
            let tds = row
                .iter()
                .map(|cell| match cell {
                    Some(cell) => cell.to_html(),
                    None => format!("<td style=\"{}\"></td>", TD_STYLE),
                })
                .join("");
            html.push(format!("<tr>{}</tr>", tds));
        }

        html.push("</table>".to_owned());
        html.concat()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::tests::small_calendar;
    use crate::calendar::{advance_day, set_date, DayRule, Event};

    fn shape<T>(rows: &[Vec<Option<T>>]) -> Vec<usize> {
        rows.iter().map(|r| r.iter().filter(|c| c.is_some()).count()).collect()
    }

    #[test]
    fn offset_month_stops_after_last_day() {
        let rows = layout(28, 3, 7, |d| d);
        assert_eq!(rows.len(), 5);
        assert_eq!(rows[0][..3], [None, None, None]);
        assert_eq!(rows[0][3], Some(1));
        assert_eq!(shape(&rows), vec![4, 7, 7, 7, 3]);
        assert_eq!(rows[4][2], Some(28));
        assert!(rows.iter().all(|r| r.len() == 7));
    }

    #[test]
    fn aligned_month_fills_whole_rows() {
        let rows = layout(28, 0, 7, |d| d);
        assert_eq!(rows.len(), 4);
        assert_eq!(shape(&rows), vec![7, 7, 7, 7]);
    }

    #[test]
    fn offset_wraps_and_zero_columns_is_safe() {
        assert_eq!(layout(3, 8, 7, |d| d)[0][1], Some(1));
        assert_eq!(layout(2, 0, 0, |d| d).len(), 2);
    }

    #[test]
    fn view_honours_explicit_offset() {
        let cal = crate::calendar::sets::default_calendar();
        assert_eq!(MonthView::new(&cal, "YK").cells().len(), 4);
        let shifted = MonthView::new(&cal, "YK").first_offset(3).cells();
        assert_eq!(shifted.len(), 5);
        assert!(shifted[4][3..].iter().all(Option::is_none));
    }

    #[test]
    fn highlights_are_exclusive() {
        assert_eq!(Highlight::of(true, true), Highlight::TodayEvent);
        assert_eq!(Highlight::of(true, false), Highlight::Today);
        assert_eq!(Highlight::of(false, true), Highlight::Event);
        assert_eq!(Highlight::of(false, false), Highlight::Plain);
    }

    #[test]
    fn cells_carry_highlights() {
        let mut cal = small_calendar();
        set_date(&mut cal, "1", "2", None);
        advance_day(&mut cal);

        let view = MonthView::new(&cal, "YK");
        let cells: Vec<DayCell> = view.cells().into_iter().flatten().flatten().collect();
        let highlights: Vec<Highlight> = cells.iter().map(DayCell::highlight).collect();
        assert_eq!(
            highlights,
            vec![Highlight::Plain, Highlight::TodayEvent, Highlight::Plain]
        );

        advance_day(&mut cal);
        let view = MonthView::new(&cal, "YK");
        let cells: Vec<DayCell> = view.cells().into_iter().flatten().flatten().collect();
        assert_eq!(cells[1].highlight(), Highlight::Event);
        assert_eq!(cells[2].highlight(), Highlight::Today);
    }

    #[test]
    fn other_months_have_no_today() {
        let cal = small_calendar();
        let second = cal.next_month(cal.current_month_index());
        let view = MonthView::new(&cal, "YK").month(second);
        let cells: Vec<DayCell> = view.cells().into_iter().flatten().flatten().collect();
        assert_eq!(
            cells.iter().map(DayCell::highlight).collect::<Vec<_>>(),
            vec![Highlight::Plain, Highlight::Event, Highlight::Plain]
        );

        let html = view.to_html();
        assert!(html.contains("Second<span style=\"float:right;\">10 YK</span>"));
        assert!(!html.contains("font-weight:bold;font-size:1.2em;"));

        // Same month, another year.
        let elsewhen = MonthIndex { index: 0, year: 42 };
        let html = MonthView::new(&cal, "YK").month(elsewhen).to_html();
        assert!(html.contains("First<span style=\"float:right;\">42 YK</span>"));
        assert!(!html.contains("font-weight:bold;font-size:1.2em;"));

        let current = MonthView::new(&cal, "YK").month(cal.current_month_index());
        assert!(current.to_html().contains("font-weight:bold;font-size:1.2em;"));
    }

    #[test]
    fn header_uses_month_color_and_contrast() {
        let cal = small_calendar();
        let html = MonthView::new(&cal, "YK").to_html();
        assert!(html.contains("colspan=\"3\""));
        assert!(html.contains("background-color:#FFFFFF;color:#000;"));
        assert!(html.contains("First<span style=\"float:right;\">10 YK</span>"));
        // Header, weekday names, then two rows of three.
        assert_eq!(html.matches("<tr>").count(), 4);
    }

    #[test]
    fn user_text_is_escaped() {
        let mut cal = small_calendar();
        event::add_event(&mut cal, Event::new("<b>Feast</b>", 1, DayRule::Single(3)));
        let html = MonthView::new(&cal, "<YK>").to_html();
        assert!(html.contains("&lt;YK&gt;"));
        assert!(html.contains("title=\"&lt;b&gt;Feast&lt;/b&gt;\""));
        assert!(!html.contains("<b>"));
    }
}
