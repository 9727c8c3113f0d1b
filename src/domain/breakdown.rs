use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::{Amount, CategoryType, TransactionRow};

/// Group key used when a row carries a category but no category id.
pub const UNCATEGORIZED_ID: &str = "uncategorized";
pub const UNCATEGORIZED_NAME: &str = "Uncategorized";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryBreakdown {
    pub category_id: String,
    pub category_name: String,
    pub category_type: CategoryType,
    pub total: Amount,
    pub transaction_count: i64,
    /// Share of the total of its own category type, 0..=100
    pub percentage: f64,
}

/// Total and rank rows per category.
///
/// Rows without a category type are dropped, as are rows of the other type
/// when `type_filter` is set. The result is ordered by total, largest first;
/// categories with equal totals stay in the order they were first seen.
pub fn category_breakdown(
    rows: &[TransactionRow],
    type_filter: Option<CategoryType>,
) -> Vec<CategoryBreakdown> {
    let mut groups: Vec<CategoryBreakdown> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for row in rows {
        let Some(category) = &row.category else {
            continue;
        };
        if type_filter.is_some_and(|wanted| wanted != category.category_type) {
            continue;
        }

        let key = group_key(row);
        let slot = *index.entry(key.clone()).or_insert_with(|| {
            groups.push(CategoryBreakdown {
                category_id: key,
                category_name: display_name(&category.name),
                category_type: category.category_type,
                total: 0,
                transaction_count: 0,
                percentage: 0.0,
            });
            groups.len() - 1
        });

        let group = &mut groups[slot];
        group.total += row.amount;
        group.transaction_count += 1;
    }

    let side_total = |side: CategoryType| -> Amount {
        groups
            .iter()
            .filter(|g| g.category_type == side)
            .map(|g| g.total)
            .sum()
    };
    let income_total = side_total(CategoryType::Income);
    let expense_total = side_total(CategoryType::Expense);

    for group in &mut groups {
        let whole = match group.category_type {
            CategoryType::Income => income_total,
            CategoryType::Expense => expense_total,
        };
        group.percentage = percentage_of(group.total, whole);
    }

    groups.sort_by(|a, b| b.total.cmp(&a.total));
    groups
}

/// `part` as a percentage of `whole`, 0 when `whole` is not positive.
pub fn percentage_of(part: Amount, whole: Amount) -> f64 {
    if whole > 0 {
        part as f64 / whole as f64 * 100.0
    } else {
        0.0
    }
}

pub(crate) fn group_key(row: &TransactionRow) -> String {
    row.category_id
        .map(|id| id.to_string())
        .unwrap_or_else(|| UNCATEGORIZED_ID.to_string())
}

pub(crate) fn display_name(name: &str) -> String {
    if name.trim().is_empty() {
        UNCATEGORIZED_NAME.to_string()
    } else {
        name.to_string()
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use uuid::Uuid;

    use super::*;
    use crate::domain::{CategoryId, CategoryRef};

    fn row(amount: Amount, id: Option<CategoryId>, name: &str, category_type: CategoryType) -> TransactionRow {
        TransactionRow {
            amount,
            date: Utc.with_ymd_and_hms(2024, 1, 10, 0, 0, 0).unwrap(),
            category_id: id,
            category: Some(CategoryRef {
                name: name.into(),
                category_type,
            }),
        }
    }

    #[test]
    fn test_single_expense_category() {
        let makan = Uuid::new_v4();
        let rows = vec![
            row(5_000_000, Some(Uuid::new_v4()), "Gaji", CategoryType::Income),
            row(50_000, Some(makan), "Makan", CategoryType::Expense),
        ];
        let out = category_breakdown(&rows, Some(CategoryType::Expense));

        assert_eq!(out.len(), 1);
        assert_eq!(out[0].category_id, makan.to_string());
        assert_eq!(out[0].category_name, "Makan");
        assert_eq!(out[0].total, 50_000);
        assert_eq!(out[0].transaction_count, 1);
        assert_eq!(out[0].percentage, 100.0);
    }

    #[test]
    fn test_sorted_descending_and_percentages_sum_to_100() {
        let food = Some(Uuid::new_v4());
        let rent = Some(Uuid::new_v4());
        let fuel = Some(Uuid::new_v4());
        let rows = vec![
            row(150, food, "Food", CategoryType::Expense),
            row(1_200, rent, "Rent", CategoryType::Expense),
            row(200, food, "Food", CategoryType::Expense),
            row(90, fuel, "Fuel", CategoryType::Expense),
        ];
        let out = category_breakdown(&rows, Some(CategoryType::Expense));

        let names: Vec<_> = out.iter().map(|b| b.category_name.as_str()).collect();
        assert_eq!(names, vec!["Rent", "Food", "Fuel"]);
        assert!(out.windows(2).all(|w| w[0].total >= w[1].total));
        assert_eq!(out[1].transaction_count, 2);

        let sum: f64 = out.iter().map(|b| b.percentage).sum();
        assert!((sum - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_unfiltered_percentages_are_per_type() {
        let rows = vec![
            row(5_000_000, Some(Uuid::new_v4()), "Gaji", CategoryType::Income),
            row(30_000, Some(Uuid::new_v4()), "Makan", CategoryType::Expense),
            row(1_000_000, Some(Uuid::new_v4()), "Bonus", CategoryType::Income),
            row(20_000, Some(Uuid::new_v4()), "Transport", CategoryType::Expense),
        ];
        let out = category_breakdown(&rows, None);
        assert_eq!(out.len(), 4);

        for side in [CategoryType::Income, CategoryType::Expense] {
            let sum: f64 = out
                .iter()
                .filter(|b| b.category_type == side)
                .map(|b| b.percentage)
                .sum();
            assert!((sum - 100.0).abs() < 1e-9, "{side} sums to {sum}");
        }

        let makan = out.iter().find(|b| b.category_name == "Makan").unwrap();
        assert!((makan.percentage - 60.0).abs() < 1e-9);
    }

    #[test]
    fn test_ties_keep_first_seen_order() {
        let rows = vec![
            row(100, Some(Uuid::new_v4()), "Books", CategoryType::Expense),
            row(100, Some(Uuid::new_v4()), "Apps", CategoryType::Expense),
            row(100, Some(Uuid::new_v4()), "Coffee", CategoryType::Expense),
        ];
        let out = category_breakdown(&rows, None);
        let names: Vec<_> = out.iter().map(|b| b.category_name.as_str()).collect();
        assert_eq!(names, vec!["Books", "Apps", "Coffee"]);
    }

    #[test]
    fn test_zero_totals_give_zero_percentages() {
        let rows = vec![
            row(0, Some(Uuid::new_v4()), "Gift", CategoryType::Income),
            row(0, Some(Uuid::new_v4()), "Bonus", CategoryType::Income),
        ];
        let out = category_breakdown(&rows, Some(CategoryType::Income));
        assert_eq!(out.len(), 2);
        assert!(out.iter().all(|b| b.percentage == 0.0));
    }

    #[test]
    fn test_rows_without_category_are_excluded() {
        let mut orphan = row(999, None, "", CategoryType::Expense);
        orphan.category = None;
        let rows = vec![orphan, row(10, None, "", CategoryType::Expense)];
        let out = category_breakdown(&rows, None);

        assert_eq!(out.len(), 1);
        assert_eq!(out[0].category_id, UNCATEGORIZED_ID);
        assert_eq!(out[0].category_name, UNCATEGORIZED_NAME);
        assert_eq!(out[0].total, 10);
    }

    #[test]
    fn test_percentage_of() {
        assert_eq!(percentage_of(1, 4), 25.0);
        assert_eq!(percentage_of(5, 0), 0.0);
    }
}
