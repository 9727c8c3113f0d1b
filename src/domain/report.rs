use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{
    Amount, Bucket, DateRange, Granularity, IncomeExpense, PeriodType, TransactionRow, aggregate,
    sum_buckets, sum_totals,
};

/// Display-ready result of a period report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodReport {
    pub period_type: PeriodType,
    pub label: String,
    pub description: String,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub income: Amount,
    pub expense: Amount,
    pub net: Amount,
    /// Year-over-year only: the same month one year earlier
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous: Option<PreviousPeriod>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub growth_income_percent: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub growth_expense_percent: Option<f64>,
    /// Trailing twelve months only: one bucket per month
    #[serde(skip_serializing_if = "Option::is_none")]
    pub monthly_data: Option<Vec<Bucket>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreviousPeriod {
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub income: Amount,
    pub expense: Amount,
    pub net: Amount,
}

impl PeriodReport {
    fn base(period_type: PeriodType, range: DateRange, totals: IncomeExpense) -> Self {
        Self {
            period_type,
            label: period_type.label().to_string(),
            description: period_type.description().to_string(),
            period_start: range.start,
            period_end: range.end,
            income: totals.income,
            expense: totals.expense,
            net: totals.net(),
            previous: None,
            growth_income_percent: None,
            growth_expense_percent: None,
            monthly_data: None,
        }
    }
}

/// Relative change from `previous` to `current` in percent.
///
/// With no previous value the change is 100 when anything happened now and
/// 0 otherwise, so the result is always finite.
pub fn growth_percent(current: Amount, previous: Amount) -> f64 {
    if previous == 0 {
        if current > 0 { 100.0 } else { 0.0 }
    } else {
        (current - previous) as f64 / previous as f64 * 100.0
    }
}

/// Month-to-date or year-to-date: plain totals over one range.
pub fn totals_report(period_type: PeriodType, range: DateRange, rows: &[TransactionRow]) -> PeriodReport {
    PeriodReport::base(period_type, range, sum_totals(rows, range))
}

/// This month against the same month last year.
pub fn year_over_year_report(
    current: DateRange,
    current_rows: &[TransactionRow],
    previous: DateRange,
    previous_rows: &[TransactionRow],
) -> PeriodReport {
    let now = sum_totals(current_rows, current);
    let before = sum_totals(previous_rows, previous);

    let mut report = PeriodReport::base(PeriodType::Yoy, current, now);
    report.previous = Some(PreviousPeriod {
        period_start: previous.start,
        period_end: previous.end,
        income: before.income,
        expense: before.expense,
        net: before.net(),
    });
    report.growth_income_percent = Some(growth_percent(now.income, before.income));
    report.growth_expense_percent = Some(growth_percent(now.expense, before.expense));
    report
}

/// Trailing twelve months: totals are the sum of the monthly series.
pub fn trailing_twelve_months_report(range: DateRange, rows: &[TransactionRow]) -> PeriodReport {
    let monthly = aggregate(rows, range, Granularity::Month);
    let mut report = PeriodReport::base(PeriodType::Ttm, range, sum_buckets(&monthly));
    report.monthly_data = Some(monthly);
    report
}
