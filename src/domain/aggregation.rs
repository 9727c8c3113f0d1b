//! Income/expense bucketing over a dense series of calendar slots.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use super::{Amount, CategoryType, DateRange, MonthKey, TransactionRow, day_slots, month_slots};

pub const TOTAL_LABEL: &str = "Total";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    Month,
    Day,
    /// One bucket for the whole range
    Total,
}

/// One slot of an income/expense series, ready for charting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bucket {
    pub label: String,
    pub income: Amount,
    pub expense: Amount,
}

impl Bucket {
    fn empty(label: String) -> Self {
        Self {
            label,
            income: 0,
            expense: 0,
        }
    }

    pub fn net(&self) -> Amount {
        self.income - self.expense
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncomeExpense {
    pub income: Amount,
    pub expense: Amount,
}

impl IncomeExpense {
    pub fn net(&self) -> Amount {
        self.income - self.expense
    }

    fn add(&mut self, category_type: CategoryType, amount: Amount) {
        match category_type {
            CategoryType::Income => self.income += amount,
            CategoryType::Expense => self.expense += amount,
        }
    }
}

impl From<&Bucket> for IncomeExpense {
    fn from(bucket: &Bucket) -> Self {
        Self {
            income: bucket.income,
            expense: bucket.expense,
        }
    }
}

/// Sum `rows` into one bucket per slot of `range`.
///
/// Slots are generated from the range before any row is looked at, so the
/// output always covers the whole range in chronological order. Rows with no
/// category type, or dated outside the range, contribute nothing.
pub fn aggregate(rows: &[TransactionRow], range: DateRange, granularity: Granularity) -> Vec<Bucket> {
    let mut buckets: Vec<Bucket> = match granularity {
        Granularity::Month => month_slots(range)
            .into_iter()
            .map(|month| Bucket::empty(month.label()))
            .collect(),
        Granularity::Day => day_slots(range)
            .into_iter()
            .map(|day| Bucket::empty(day.day().to_string()))
            .collect(),
        Granularity::Total => vec![Bucket::empty(TOTAL_LABEL.to_string())],
    };

    for row in rows {
        let Some(category_type) = row.category_type() else {
            continue;
        };
        let date = row.date.date_naive();
        if !range.contains(date) {
            continue;
        }
        let Some(bucket) = slot_index(range, granularity, date).and_then(|i| buckets.get_mut(i))
        else {
            continue;
        };
        match category_type {
            CategoryType::Income => bucket.income += row.amount,
            CategoryType::Expense => bucket.expense += row.amount,
        }
    }

    buckets
}

/// Income and expense over the whole range.
pub fn sum_totals(rows: &[TransactionRow], range: DateRange) -> IncomeExpense {
    rows.iter()
        .filter(|row| range.contains_instant(row.date))
        .fold(IncomeExpense::default(), |mut totals, row| {
            if let Some(category_type) = row.category_type() {
                totals.add(category_type, row.amount);
            }
            totals
        })
}

/// Sum a series back into a single total.
pub fn sum_buckets(buckets: &[Bucket]) -> IncomeExpense {
    buckets.iter().fold(IncomeExpense::default(), |acc, b| IncomeExpense {
        income: acc.income + b.income,
        expense: acc.expense + b.expense,
    })
}

fn slot_index(range: DateRange, granularity: Granularity, date: NaiveDate) -> Option<usize> {
    match granularity {
        Granularity::Total => Some(0),
        Granularity::Day => usize::try_from((date - range.start).num_days()).ok(),
        Granularity::Month => {
            let first = MonthKey::containing(range.start);
            let months = (date.year() - first.year()) * 12 + date.month() as i32
                - first.month() as i32;
            usize::try_from(months).ok()
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use uuid::Uuid;

    use super::*;
    use crate::domain::{CategoryRef, calendar_year, month_to_date};

    fn row(amount: Amount, ymd: (i32, u32, u32), category_type: Option<CategoryType>) -> TransactionRow {
        TransactionRow {
            amount,
            date: Utc.with_ymd_and_hms(ymd.0, ymd.1, ymd.2, 14, 30, 0).unwrap(),
            category_id: category_type.map(|_| Uuid::new_v4()),
            category: category_type.map(|category_type| CategoryRef {
                name: "Test".into(),
                category_type,
            }),
        }
    }

    #[test]
    fn test_monthly_series_is_dense() {
        let rows = vec![
            row(5_000_000, (2024, 1, 15), Some(CategoryType::Income)),
            row(50_000, (2024, 1, 16), Some(CategoryType::Expense)),
        ];
        let buckets = aggregate(&rows, calendar_year(2024).unwrap(), Granularity::Month);

        assert_eq!(buckets.len(), 12);
        assert_eq!(buckets[0].label, "Jan 2024");
        assert_eq!(buckets[0].income, 5_000_000);
        assert_eq!(buckets[0].expense, 50_000);
        for bucket in &buckets[1..] {
            assert_eq!((bucket.income, bucket.expense), (0, 0), "{}", bucket.label);
        }
        assert_eq!(buckets[11].label, "Dec 2024");
    }

    #[test]
    fn test_uncategorized_rows_are_skipped() {
        let rows = vec![
            row(1_000, (2024, 1, 2), None),
            row(2_000, (2024, 1, 2), Some(CategoryType::Expense)),
        ];
        let range = MonthKey::new(2024, 1).unwrap().range();
        let totals = sum_totals(&rows, range);
        assert_eq!(totals, IncomeExpense { income: 0, expense: 2_000 });
    }

    #[test]
    fn test_daily_series_for_partial_range() {
        let today = NaiveDate::from_ymd_opt(2024, 2, 10).unwrap();
        let rows = vec![
            row(10, (2024, 2, 1), Some(CategoryType::Expense)),
            row(20, (2024, 2, 10), Some(CategoryType::Expense)),
            row(40, (2024, 2, 11), Some(CategoryType::Expense)),
        ];
        let buckets = aggregate(&rows, month_to_date(today), Granularity::Day);

        assert_eq!(buckets.len(), 10);
        assert_eq!(buckets[0].label, "1");
        assert_eq!(buckets[0].expense, 10);
        assert_eq!(buckets[9].label, "10");
        assert_eq!(buckets[9].expense, 20);
        assert_eq!(sum_buckets(&buckets).expense, 30);
    }

    #[test]
    fn test_total_granularity_single_bucket() {
        let rows = vec![
            row(300, (2024, 5, 1), Some(CategoryType::Income)),
            row(100, (2024, 5, 31), Some(CategoryType::Expense)),
        ];
        let buckets = aggregate(&rows, MonthKey::new(2024, 5).unwrap().range(), Granularity::Total);
        assert_eq!(buckets.len(), 1);
        assert_eq!(buckets[0].label, TOTAL_LABEL);
        assert_eq!(buckets[0].net(), 200);
    }

    #[test]
    fn test_empty_rows_still_fill_every_slot() {
        let buckets = aggregate(&[], MonthKey::new(2023, 2).unwrap().range(), Granularity::Day);
        assert_eq!(buckets.len(), 28);
        assert!(buckets.iter().all(|b| b.income == 0 && b.expense == 0));
    }

    #[test]
    fn test_month_buckets_when_range_starts_mid_month() {
        let range = DateRange::new(
            NaiveDate::from_ymd_opt(2023, 11, 20).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 5).unwrap(),
        )
        .unwrap();
        let rows = vec![
            row(1, (2023, 11, 19), Some(CategoryType::Income)),
            row(2, (2023, 11, 20), Some(CategoryType::Income)),
            row(4, (2024, 1, 5), Some(CategoryType::Income)),
        ];
        let buckets = aggregate(&rows, range, Granularity::Month);
        let incomes: Vec<_> = buckets.iter().map(|b| b.income).collect();
        assert_eq!(incomes, vec![2, 0, 4]);
    }
}
