use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::breakdown::{display_name, group_key};
use super::{Amount, CategoryType, DateRange, MonthKey, TransactionRow, month_slots};

pub const DEFAULT_COMPARISON_MONTHS: u32 = 6;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryMonthTotal {
    pub category_id: String,
    pub category_name: String,
    pub category_type: CategoryType,
    pub total: Amount,
}

/// Category totals for one month. Categories without activity that month are absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryMonthlyComparison {
    pub month: String,
    pub categories: Vec<CategoryMonthTotal>,
}

/// Build a month by category matrix of `category_type` rows over every month of `range`.
pub fn category_monthly_comparison(
    rows: &[TransactionRow],
    category_type: CategoryType,
    range: DateRange,
) -> Vec<CategoryMonthlyComparison> {
    let slots = month_slots(range);
    let mut matrix: Vec<Vec<CategoryMonthTotal>> = vec![Vec::new(); slots.len()];
    let mut index: HashMap<(MonthKey, String), usize> = HashMap::new();
    let slot_of: HashMap<MonthKey, usize> = slots.iter().enumerate().map(|(i, m)| (*m, i)).collect();

    for row in rows {
        let Some(category) = &row.category else {
            continue;
        };
        if category.category_type != category_type || !range.contains_instant(row.date) {
            continue;
        }

        let month = MonthKey::containing(row.date.date_naive());
        let Some(&slot) = slot_of.get(&month) else {
            continue;
        };

        let key = group_key(row);
        let cells = &mut matrix[slot];
        let cell = *index.entry((month, key.clone())).or_insert_with(|| {
            cells.push(CategoryMonthTotal {
                category_id: key,
                category_name: display_name(&category.name),
                category_type,
                total: 0,
            });
            cells.len() - 1
        });
        cells[cell].total += row.amount;
    }

    slots
        .into_iter()
        .zip(matrix)
        .map(|(month, categories)| CategoryMonthlyComparison {
            month: month.label(),
            categories,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, TimeZone, Utc};
    use uuid::Uuid;

    use super::*;
    use crate::domain::{CategoryId, CategoryRef, trailing_months};

    fn row(
        amount: Amount,
        ymd: (i32, u32, u32),
        id: CategoryId,
        name: &str,
        category_type: CategoryType,
    ) -> TransactionRow {
        TransactionRow {
            amount,
            date: Utc.with_ymd_and_hms(ymd.0, ymd.1, ymd.2, 8, 0, 0).unwrap(),
            category_id: Some(id),
            category: Some(CategoryRef {
                name: name.into(),
                category_type,
            }),
        }
    }

    #[test]
    fn test_months_are_chronological_and_sparse() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        let food = Uuid::new_v4();
        let fuel = Uuid::new_v4();
        let rows = vec![
            row(100, (2024, 1, 3), food, "Food", CategoryType::Expense),
            row(50, (2024, 1, 20), food, "Food", CategoryType::Expense),
            row(70, (2024, 3, 1), fuel, "Fuel", CategoryType::Expense),
            row(30, (2024, 3, 2), food, "Food", CategoryType::Expense),
            row(9_000, (2024, 3, 2), Uuid::new_v4(), "Salary", CategoryType::Income),
        ];

        let out = category_monthly_comparison(&rows, CategoryType::Expense, trailing_months(today, 3).unwrap());

        let months: Vec<_> = out.iter().map(|m| m.month.as_str()).collect();
        assert_eq!(months, vec!["Jan 2024", "Feb 2024", "Mar 2024"]);

        assert_eq!(out[0].categories.len(), 1);
        assert_eq!(out[0].categories[0].total, 150);
        assert!(out[1].categories.is_empty());

        let march: Vec<_> = out[2]
            .categories
            .iter()
            .map(|c| (c.category_name.as_str(), c.total))
            .collect();
        assert_eq!(march, vec![("Fuel", 70), ("Food", 30)]);
    }

    #[test]
    fn test_rows_outside_window_are_ignored() {
        let today = NaiveDate::from_ymd_opt(2024, 6, 30).unwrap();
        let rows = vec![row(
            10,
            (2023, 12, 31),
            Uuid::new_v4(),
            "Old",
            CategoryType::Expense,
        )];
        let out = category_monthly_comparison(&rows, CategoryType::Expense, trailing_months(today, 6).unwrap());
        assert_eq!(out.len(), 6);
        assert!(out.iter().all(|m| m.categories.is_empty()));
    }
}
