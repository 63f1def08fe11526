use std::str::FromStr;

use chrono::{Datelike, Days, Months, NaiveDate};
use serde::{Deserialize, Serialize};

/// A calendar month. Income is reported per month, never per day.
///
/// Serialized as `YYYY-MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct YearMonth(NaiveDate);

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, 1).map(Self)
    }

    /// The month containing `date`.
    pub fn of(date: NaiveDate) -> Self {
        Self(date - Days::new(u64::from(date.day0())))
    }

    pub fn year(&self) -> i32 {
        self.0.year()
    }

    pub fn month(&self) -> u32 {
        self.0.month()
    }

    /// Reference date used when evaluating organization links.
    pub fn first_day(&self) -> NaiveDate {
        self.0
    }

    pub fn last_day(&self) -> NaiveDate {
        self.0
            .checked_add_months(Months::new(1))
            .and_then(|d| d.pred_opt())
            .unwrap_or(NaiveDate::MAX)
    }
}

impl std::fmt::Display for YearMonth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}", self.year(), self.month())
    }
}

impl FromStr for YearMonth {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (year, month) = s
            .rsplit_once('-')
            .ok_or_else(|| format!("cannot parse year-month '{s}' (expected YYYY-MM)"))?;
        let year: i32 = year.parse().map_err(|_| format!("bad year in '{s}'"))?;
        let month: u32 = month.parse().map_err(|_| format!("bad month in '{s}'"))?;
        Self::new(year, month).ok_or_else(|| format!("year-month '{s}' out of range"))
    }
}

impl TryFrom<String> for YearMonth {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<YearMonth> for String {
    fn from(value: YearMonth) -> Self {
        value.to_string()
    }
}

/// Inclusive on both ends; an open `valid_to` never expires.
pub fn active_at(valid_from: NaiveDate, valid_to: Option<NaiveDate>, at: NaiveDate) -> bool {
    valid_from <= at && valid_to.map_or(true, |to| at <= to)
}

/// Whether `[start, end]` (open-ended when `end` is `None`) shares at least
/// one day with the month.
pub fn overlaps_month(start: NaiveDate, end: Option<NaiveDate>, period: YearMonth) -> bool {
    start <= period.last_day() && end.map_or(true, |end| end >= period.first_day())
}

/// Whether `[start, end]` shares at least one day with `[from, to]`.
pub fn overlaps_range(start: NaiveDate, end: Option<NaiveDate>, from: NaiveDate, to: NaiveDate) -> bool {
    start <= to && end.map_or(true, |end| end >= from)
}
