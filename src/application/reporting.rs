use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::{
    Amount, Bucket, CategoryBreakdown, CategoryMonthlyComparison, CategoryType, DateRange,
    Granularity, MonthKey, PeriodReport, PeriodType, TransactionRow, WalletId, aggregate,
    calendar_year, category_breakdown, category_monthly_comparison, compute_balance,
    resolve_categories, sum_totals, totals_report, trailing_months, trailing_twelve_months,
    trailing_twelve_months_report, year_over_year, year_over_year_report,
};

use super::{AppError, TransactionSource};

const MIN_YEAR: i32 = 1;
const MAX_YEAR: i32 = 9999;

/// Which twelve months a monthly report covers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyReportOptions {
    /// Reference month, defaults to the current month
    pub month: Option<u32>,
    /// Reference year, defaults to the current year
    pub year: Option<i32>,
    /// January through December of `year` instead of the twelve months ending at `month`
    pub year_only: bool,
}

/// Headline numbers for the dashboard of one wallet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardStats {
    pub month_start: NaiveDate,
    pub month_end: NaiveDate,
    pub month_income: Amount,
    pub month_expense: Amount,
    /// All-time balance, not limited to the month
    pub total_balance: Amount,
}

/// Read-only reports over one transaction source.
///
/// Every method takes the wallet explicitly, and the ones that depend on
/// "now" take the reference date as an argument, so calling them twice with
/// the same inputs against unchanged data gives the same result.
pub struct Reporter<'a, S: TransactionSource + ?Sized> {
    source: &'a S,
}

impl<'a, S: TransactionSource + ?Sized> Reporter<'a, S> {
    pub fn new(source: &'a S) -> Self {
        Self { source }
    }

    /// Twelve monthly income/expense buckets.
    pub async fn monthly_report(
        &self,
        wallet_id: WalletId,
        options: MonthlyReportOptions,
        today: NaiveDate,
    ) -> Result<Vec<Bucket>, AppError> {
        let year = validate_year(options.year.unwrap_or_else(|| today.year()))?;
        let range = if options.year_only {
            calendar_year(year).ok_or(AppError::InvalidYear(year))?
        } else {
            let month = month_key(year, options.month.unwrap_or_else(|| today.month()))?;
            trailing_twelve_months(month.first_day()).ok_or(AppError::InvalidYear(year))?
        };

        let rows = self.fetch(wallet_id, Some(range)).await?;
        debug!(wallet = %wallet_id, %range, rows = rows.len(), "monthly report");
        Ok(aggregate(&rows, range, Granularity::Month))
    }

    /// One bucket per calendar day of the month, days still ahead included.
    pub async fn daily_report(
        &self,
        wallet_id: WalletId,
        month: u32,
        year: i32,
    ) -> Result<Vec<Bucket>, AppError> {
        let range = month_key(validate_year(year)?, month)?.range();
        let rows = self.fetch(wallet_id, Some(range)).await?;
        debug!(wallet = %wallet_id, %range, rows = rows.len(), "daily report");
        Ok(aggregate(&rows, range, Granularity::Day))
    }

    pub async fn period_report(
        &self,
        wallet_id: WalletId,
        period_type: PeriodType,
        today: NaiveDate,
    ) -> Result<PeriodReport, AppError> {
        let out_of_range = || AppError::InvalidYear(today.year());
        let report = match period_type {
            PeriodType::Mtd | PeriodType::Ytd => {
                let range = period_type.range(today).ok_or_else(out_of_range)?;
                let rows = self.fetch(wallet_id, Some(range)).await?;
                totals_report(period_type, range, &rows)
            }
            PeriodType::Yoy => {
                let windows = year_over_year(today).ok_or_else(out_of_range)?;
                let (current, previous) = tokio::try_join!(
                    self.fetch(wallet_id, Some(windows.current)),
                    self.fetch(wallet_id, Some(windows.previous)),
                )?;
                year_over_year_report(windows.current, &current, windows.previous, &previous)
            }
            PeriodType::Ttm => {
                let range = trailing_twelve_months(today).ok_or_else(out_of_range)?;
                let rows = self.fetch(wallet_id, Some(range)).await?;
                trailing_twelve_months_report(range, &rows)
            }
        };

        debug!(
            wallet = %wallet_id,
            period = %period_type,
            start = %report.period_start,
            end = %report.period_end,
            "period report"
        );
        Ok(report)
    }

    /// Category totals within an optional date window, largest first.
    pub async fn category_breakdown(
        &self,
        wallet_id: WalletId,
        type_filter: Option<CategoryType>,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Vec<CategoryBreakdown>, AppError> {
        // Only a closed window can be pushed down to the source;
        // an open-ended one is applied to the rows afterwards.
        let range = match (start, end) {
            (Some(start), Some(end)) => Some(DateRange::new(start, end).ok_or_else(|| {
                AppError::InvalidDateRange {
                    start: start.to_string(),
                    end: end.to_string(),
                }
            })?),
            _ => None,
        };

        let (mut rows, categories) = tokio::try_join!(
            self.fetch(wallet_id, range),
            self.source.fetch_categories(wallet_id),
        )?;
        rows.retain(|row| {
            let date = row.date.date_naive();
            start.is_none_or(|s| date >= s) && end.is_none_or(|e| date <= e)
        });
        let rows = resolve_categories(rows, &categories);

        debug!(wallet = %wallet_id, rows = rows.len(), ?type_filter, "category breakdown");
        Ok(category_breakdown(&rows, type_filter))
    }

    /// Per-month category totals over the last `months` months.
    pub async fn category_monthly_comparison(
        &self,
        wallet_id: WalletId,
        category_type: CategoryType,
        months: u32,
        today: NaiveDate,
    ) -> Result<Vec<CategoryMonthlyComparison>, AppError> {
        if months == 0 {
            return Err(AppError::InvalidMonthCount(months));
        }
        let range =
            trailing_months(today, months).ok_or(AppError::InvalidMonthCount(months))?;

        let (rows, categories) = tokio::try_join!(
            self.fetch(wallet_id, Some(range)),
            self.source.fetch_categories(wallet_id),
        )?;
        let rows = resolve_categories(rows, &categories);

        debug!(wallet = %wallet_id, %range, %category_type, "category monthly comparison");
        Ok(category_monthly_comparison(&rows, category_type, range))
    }

    /// Income and expense of one month next to the all-time balance.
    pub async fn dashboard_stats(
        &self,
        wallet_id: WalletId,
        month: Option<u32>,
        year: Option<i32>,
        today: NaiveDate,
    ) -> Result<DashboardStats, AppError> {
        let year = validate_year(year.unwrap_or_else(|| today.year()))?;
        let range = month_key(year, month.unwrap_or_else(|| today.month()))?.range();

        let (month_rows, all_rows) = tokio::try_join!(
            self.fetch(wallet_id, Some(range)),
            self.fetch(wallet_id, None),
        )?;
        let totals = sum_totals(&month_rows, range);

        Ok(DashboardStats {
            month_start: range.start,
            month_end: range.end,
            month_income: totals.income,
            month_expense: totals.expense,
            total_balance: compute_balance(&all_rows),
        })
    }

    /// All-time balance of a wallet.
    pub async fn wallet_balance(&self, wallet_id: WalletId) -> Result<Amount, AppError> {
        let rows = self.fetch(wallet_id, None).await?;
        Ok(compute_balance(&rows))
    }

    async fn fetch(
        &self,
        wallet_id: WalletId,
        range: Option<DateRange>,
    ) -> anyhow::Result<Vec<TransactionRow>> {
        self.source.fetch_transactions(wallet_id, range).await
    }
}

fn validate_year(year: i32) -> Result<i32, AppError> {
    if (MIN_YEAR..=MAX_YEAR).contains(&year) {
        Ok(year)
    } else {
        Err(AppError::InvalidYear(year))
    }
}

fn month_key(year: i32, month: u32) -> Result<MonthKey, AppError> {
    if !(1..=12).contains(&month) {
        return Err(AppError::InvalidMonth(month));
    }
    MonthKey::new(year, month).ok_or(AppError::InvalidYear(year))
}
