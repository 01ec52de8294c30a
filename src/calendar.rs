use crate::models::{WorkoutDocument, date_key};
use chrono::{Datelike, Local, Months, NaiveDate};
use serde::Serialize;

/// The month currently on screen. Independent of the selected user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarView {
    first: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthGrid {
    pub year: i32,
    pub month: u32,
    pub label: String,
    /// Empty cells before the 1st; 0 when the month starts on a Sunday.
    pub leading_blanks: u32,
    pub days: Vec<DayCell>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DayCell {
    pub day: u32,
    pub date: String,
    pub active: bool,
}

impl CalendarView {
    /// `month` is 1-based. Returns `None` for an invalid month or an
    /// out-of-range year.
    pub fn new(year: i32, month: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, 1).map(|first| Self { first })
    }

    pub fn containing(date: NaiveDate) -> Self {
        Self {
            first: date.with_day(1).unwrap_or(date),
        }
    }

    pub fn current() -> Self {
        Self::containing(Local::now().date_naive())
    }

    pub fn year(&self) -> i32 {
        self.first.year()
    }

    pub fn month(&self) -> u32 {
        self.first.month()
    }

    /// Steps back one month; January wraps to December of the previous year.
    pub fn previous(&mut self) {
        if let Some(first) = self.first.checked_sub_months(Months::new(1)) {
            self.first = first;
        }
    }

    /// Steps forward one month; December wraps to January of the next year.
    pub fn next(&mut self) {
        if let Some(first) = self.first.checked_add_months(Months::new(1)) {
            self.first = first;
        }
    }

    pub fn label(&self) -> String {
        self.first.format("%B %Y").to_string()
    }

    pub fn leading_blanks(&self) -> u32 {
        self.first.weekday().num_days_from_sunday()
    }

    /// Day 0 of the following month, i.e. the last day of this one.
    pub fn days_in_month(&self) -> u32 {
        let (year, month) = match self.month() {
            12 => (self.year() + 1, 1),
            month => (self.year(), month + 1),
        };
        NaiveDate::from_ymd_opt(year, month, 1)
            .and_then(|next| next.pred_opt())
            .map_or(31, |last| last.day())
    }

    pub fn render(&self, document: Option<&WorkoutDocument>) -> MonthGrid {
        let days = self
            .first
            .iter_days()
            .take(self.days_in_month() as usize)
            .map(|date| DayCell {
                day: date.day(),
                date: date_key(date),
                active: document.is_some_and(|doc| doc.is_marked(date)),
            })
            .collect();

        MonthGrid {
            year: self.year(),
            month: self.month(),
            label: self.label(),
            leading_blanks: self.leading_blanks(),
            days,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leap_february_2024() {
        let view = CalendarView::new(2024, 2).unwrap();
        let grid = view.render(Some(&WorkoutDocument::default()));

        assert_eq!(grid.leading_blanks, 4);
        assert_eq!(grid.days.len(), 29);
        assert_eq!(grid.days[0].date, "2024-02-01");
        assert_eq!(grid.days[28].date, "2024-02-29");
        assert!(grid.days.iter().all(|cell| !cell.active));
        assert_eq!(grid.label, "February 2024");
    }

    #[test]
    fn day_counts_and_blanks_match_the_calendar() {
        for year in [1999, 2000, 2023, 2024, 2100] {
            for month in 1..=12 {
                let view = CalendarView::new(year, month).unwrap();
                let grid = view.render(None);
                let first = NaiveDate::from_ymd_opt(year, month, 1).unwrap();

                let expected_days = first
                    .iter_days()
                    .take_while(|d| d.month() == month)
                    .count();
                assert_eq!(grid.days.len(), expected_days, "{year}-{month}");
                assert_eq!(
                    grid.leading_blanks,
                    first.weekday().num_days_from_sunday(),
                    "{year}-{month}"
                );
            }
        }
    }

    #[test]
    fn january_2024_starts_on_monday() {
        let grid = CalendarView::new(2024, 1).unwrap().render(None);
        assert_eq!(grid.days.len(), 31);
        assert_eq!(grid.leading_blanks, 1);
    }

    #[test]
    fn cells_are_zero_padded_and_marked_from_the_document() {
        let mut doc = WorkoutDocument::default();
        doc.set_marked(NaiveDate::from_ymd_opt(2024, 3, 5).unwrap(), true);

        let grid = CalendarView::new(2024, 3).unwrap().render(Some(&doc));
        let marked: Vec<_> = grid.days.iter().filter(|c| c.active).collect();
        assert_eq!(marked.len(), 1);
        assert_eq!(marked[0].date, "2024-03-05");
        assert_eq!(marked[0].day, 5);
    }

    #[test]
    fn navigation_wraps_across_years() {
        let mut view = CalendarView::new(2024, 1).unwrap();
        view.previous();
        assert_eq!((view.year(), view.month()), (2023, 12));
        view.next();
        view.next();
        assert_eq!((view.year(), view.month()), (2024, 2));

        let mut december = CalendarView::new(2024, 12).unwrap();
        december.next();
        assert_eq!((december.year(), december.month()), (2025, 1));
    }

    #[test]
    fn rejects_invalid_months() {
        assert!(CalendarView::new(2024, 0).is_none());
        assert!(CalendarView::new(2024, 13).is_none());
    }
}
