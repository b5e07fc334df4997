//! Calendar math: date ranges, month grids, and date formatting.

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use datebook_core::{DatebookError, DatebookResult};
use serde::{Deserialize, Serialize};

use crate::normalize::parse_wire_date;

/// Weeks shown in a month grid, enough for any month and week start.
pub const GRID_WEEKS: usize = 6;

/// Inclusive range of calendar days. Always stored with `start <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    /// Build a range from two endpoints given in either order.
    pub fn new(a: NaiveDate, b: NaiveDate) -> Self {
        Self {
            start: a.min(b),
            end: a.max(b),
        }
    }

    pub fn single(date: NaiveDate) -> Self {
        Self::new(date, date)
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    pub fn len_days(&self) -> usize {
        (self.end - self.start).num_days() as usize + 1
    }

    pub fn is_single_day(&self) -> bool {
        self.start == self.end
    }

    /// Every day of the range in ascending order.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        let end = self.end;
        self.start.iter_days().take_while(move |day| *day <= end)
    }
}

/// Build a month view starting on `week_start`, padded with the neighbouring
/// months' days so every row has seven entries.
pub fn month_grid(year: i32, month: u32, week_start: Weekday) -> DatebookResult<Vec<[NaiveDate; 7]>> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| DatebookError::Validation(format!("invalid month {year}-{month:02}")))?;
    let offset = days_since_week_start(first.weekday(), week_start);
    let grid_start = first - Duration::days(offset);

    Ok((0..GRID_WEEKS)
        .map(|week| {
            let row_start = grid_start + Duration::days(week as i64 * 7);
            std::array::from_fn(|day| row_start + Duration::days(day as i64))
        })
        .collect())
}

/// The seven-day range containing `date`.
pub fn week_bounds(date: NaiveDate, week_start: Weekday) -> DateRange {
    let start = date - Duration::days(days_since_week_start(date.weekday(), week_start));
    DateRange::new(start, start + Duration::days(6))
}

fn days_since_week_start(day: Weekday, week_start: Weekday) -> i64 {
    let day = day.num_days_from_monday() as i64;
    let start = week_start.num_days_from_monday() as i64;
    (day - start).rem_euclid(7)
}

pub fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Short human form, e.g. `Mon, Feb 10`.
pub fn format_display(date: NaiveDate) -> String {
    date.format("%a, %b %-d").to_string()
}

pub fn parse_date(value: &str) -> DatebookResult<NaiveDate> {
    parse_wire_date(value).ok_or_else(|| {
        DatebookError::Validation(format!("invalid date '{value}'. Expected YYYY-MM-DD"))
    })
}
