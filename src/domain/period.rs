//! Calendar period arithmetic for reports.
//!
//! Every range here is a pair of inclusive calendar dates. Conversion to
//! instants happens only in [`DateRange::bounds`], which widens the end to
//! cover the whole final day.

use std::fmt;

use chrono::{DateTime, Datelike, Days, Months, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PeriodType {
    /// Month to date
    Mtd,
    /// Year to date
    Ytd,
    /// This month against the same month last year
    Yoy,
    /// Trailing twelve months
    Ttm,
}

impl PeriodType {
    pub const ALL: [PeriodType; 4] = [
        PeriodType::Mtd,
        PeriodType::Ytd,
        PeriodType::Yoy,
        PeriodType::Ttm,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PeriodType::Mtd => "mtd",
            PeriodType::Ytd => "ytd",
            PeriodType::Yoy => "yoy",
            PeriodType::Ttm => "ttm",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "mtd" => Some(PeriodType::Mtd),
            "ytd" => Some(PeriodType::Ytd),
            "yoy" => Some(PeriodType::Yoy),
            "ttm" => Some(PeriodType::Ttm),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PeriodType::Mtd => "Month to Date",
            PeriodType::Ytd => "Year to Date",
            PeriodType::Yoy => "Year over Year",
            PeriodType::Ttm => "Trailing Twelve Months",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            PeriodType::Mtd => "Income and expenses from the first day of this month through today",
            PeriodType::Ytd => "Income and expenses from January 1 through today",
            PeriodType::Yoy => "This month compared with the same month last year",
            PeriodType::Ttm => "Income and expenses over the last 12 months, including this month",
        }
    }

    /// The primary window this period covers for the given reference date.
    ///
    /// Returns None when the window reaches past the representable calendar.
    pub fn range(&self, today: NaiveDate) -> Option<DateRange> {
        match self {
            PeriodType::Mtd => Some(month_to_date(today)),
            PeriodType::Ytd => Some(year_to_date(today)),
            PeriodType::Yoy => year_over_year(today).map(|w| w.current),
            PeriodType::Ttm => trailing_twelve_months(today),
        }
    }
}

impl fmt::Display for PeriodType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for PeriodType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PeriodType::from_str(s).ok_or_else(|| format!("unknown period type '{}'", s))
    }
}

/// Inclusive calendar range. Time of day never enters into it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// Returns None when `start` is after `end`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Option<Self> {
        (start <= end).then_some(Self { start, end })
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    pub fn contains_instant(&self, instant: DateTime<Utc>) -> bool {
        self.contains(instant.date_naive())
    }

    /// Half-open instant bounds `[start 00:00, day after end 00:00)`.
    pub fn bounds(&self) -> (DateTime<Utc>, DateTime<Utc>) {
        (start_of_day(self.start), end_of_day_exclusive(self.end))
    }

    pub fn num_days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} to {}",
            self.start.format("%Y-%m-%d"),
            self.end.format("%Y-%m-%d")
        )
    }
}

/// Midnight UTC at the start of `date`.
pub fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

/// Midnight UTC at the start of the day after `date`; everything on `date` is before it.
pub fn end_of_day_exclusive(date: NaiveDate) -> DateTime<Utc> {
    date.succ_opt()
        .map(start_of_day)
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

/// A calendar month, identified by its first day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonthKey {
    first: NaiveDate,
}

impl MonthKey {
    /// Returns None for a month outside 1..=12 or an unrepresentable year.
    pub fn new(year: i32, month: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, 1).map(|first| Self { first })
    }

    pub fn containing(date: NaiveDate) -> Self {
        Self {
            first: date - Days::new(u64::from(date.day0())),
        }
    }

    pub fn year(&self) -> i32 {
        self.first.year()
    }

    pub fn month(&self) -> u32 {
        self.first.month()
    }

    pub fn first_day(&self) -> NaiveDate {
        self.first
    }

    pub fn last_day(&self) -> NaiveDate {
        match self.succ() {
            Some(next) => next.first - Days::new(1),
            None => NaiveDate::MAX,
        }
    }

    pub fn range(&self) -> DateRange {
        DateRange {
            start: self.first_day(),
            end: self.last_day(),
        }
    }

    /// The following month, None past the last representable month.
    pub fn succ(&self) -> Option<Self> {
        self.first
            .checked_add_months(Months::new(1))
            .map(|first| Self { first })
    }

    /// The month `n` months earlier, None before the first representable month.
    pub fn minus_months(&self, n: u32) -> Option<Self> {
        self.first
            .checked_sub_months(Months::new(n))
            .map(|first| Self { first })
    }

    /// `YYYY-MM`
    pub fn key(&self) -> String {
        self.first.format("%Y-%m").to_string()
    }

    /// `Jan 2024`
    pub fn label(&self) -> String {
        self.first.format("%b %Y").to_string()
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

/// Both halves of a year-over-year comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YoyWindows {
    pub current: DateRange,
    pub previous: DateRange,
}

/// First of the reference month through the reference date.
pub fn month_to_date(today: NaiveDate) -> DateRange {
    DateRange {
        start: MonthKey::containing(today).first_day(),
        end: today,
    }
}

/// January 1 of the reference year through the reference date.
pub fn year_to_date(today: NaiveDate) -> DateRange {
    DateRange {
        start: today - Days::new(u64::from(today.ordinal0())),
        end: today,
    }
}

/// The whole reference month and the whole same month one year earlier.
pub fn year_over_year(today: NaiveDate) -> Option<YoyWindows> {
    let current = MonthKey::containing(today);
    Some(YoyWindows {
        current: current.range(),
        previous: current.minus_months(12)?.range(),
    })
}

/// `n` whole months ending with the reference month. `n` of zero is treated as one.
///
/// Returns None when the first month falls before the representable calendar.
pub fn trailing_months(today: NaiveDate, n: u32) -> Option<DateRange> {
    let last = MonthKey::containing(today);
    let first = last.minus_months(n.saturating_sub(1))?;
    Some(DateRange {
        start: first.first_day(),
        end: last.last_day(),
    })
}

pub fn trailing_twelve_months(today: NaiveDate) -> Option<DateRange> {
    trailing_months(today, 12)
}

/// January through December of `year`. Returns None for an unrepresentable year.
pub fn calendar_year(year: i32) -> Option<DateRange> {
    Some(DateRange {
        start: NaiveDate::from_ymd_opt(year, 1, 1)?,
        end: NaiveDate::from_ymd_opt(year, 12, 31)?,
    })
}

/// Every month touched by `range`, oldest first.
pub fn month_slots(range: DateRange) -> Vec<MonthKey> {
    let mut slots = Vec::new();
    let mut month = MonthKey::containing(range.start);
    while month.first_day() <= range.end {
        slots.push(month);
        match month.succ() {
            Some(next) => month = next,
            None => break,
        }
    }
    slots
}

/// Every day in `range`, oldest first.
pub fn day_slots(range: DateRange) -> Vec<NaiveDate> {
    range
        .start
        .iter_days()
        .take_while(|day| *day <= range.end)
        .collect()
}
