use super::{Amount, CategoryType, TransactionRow};

/// All-time balance of a wallet from its transactions.
///
/// Income adds and expense subtracts. A transaction whose category is gone
/// has no direction any more; it is counted as money out, so the balance
/// never overstates what is in the wallet.
pub fn compute_balance(rows: &[TransactionRow]) -> Amount {
    rows.iter().fold(0, |balance, row| match row.category_type() {
        Some(CategoryType::Income) => balance + row.amount,
        Some(CategoryType::Expense) | None => balance - row.amount,
    })
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use uuid::Uuid;

    use super::*;
    use crate::domain::CategoryRef;

    fn row(amount: Amount, category_type: Option<CategoryType>) -> TransactionRow {
        TransactionRow {
            amount,
            date: Utc::now(),
            category_id: category_type.map(|_| Uuid::new_v4()),
            category: category_type.map(|category_type| CategoryRef {
                name: "x".into(),
                category_type,
            }),
        }
    }

    #[test]
    fn test_compute_balance_empty() {
        assert_eq!(compute_balance(&[]), 0);
    }

    #[test]
    fn test_compute_balance_mixed() {
        let rows = vec![
            row(5_000_000, Some(CategoryType::Income)),
            row(50_000, Some(CategoryType::Expense)),
            row(25_000, Some(CategoryType::Expense)),
        ];
        assert_eq!(compute_balance(&rows), 4_925_000);
    }

    #[test]
    fn test_uncategorized_is_deducted() {
        let rows = vec![row(1_000, Some(CategoryType::Income)), row(300, None)];
        assert_eq!(compute_balance(&rows), 700);
    }
}
