use std::cmp::Ordering;
use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Amount, Category, CategoryId, CategoryType, WalletId};

pub type TransactionId = Uuid;

/// A single income or expense entry in a wallet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub id: TransactionId,
    pub wallet_id: WalletId,
    /// None once the category has been deleted
    pub category_id: Option<CategoryId>,
    /// Always non-negative; the category type decides the direction
    pub amount: Amount,
    /// When the transaction happened. Only the calendar date matters to reports.
    pub date: DateTime<Utc>,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Transaction {
    pub fn new(
        wallet_id: WalletId,
        category_id: Option<CategoryId>,
        amount: Amount,
        date: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            wallet_id,
            category_id,
            amount,
            date,
            description: None,
            created_at: Utc::now(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// The resolved category embedded in a fetched transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRef {
    pub name: String,
    pub category_type: CategoryType,
}

/// The shape every report consumes: one transaction joined with its category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRow {
    pub amount: Amount,
    pub date: DateTime<Utc>,
    pub category_id: Option<CategoryId>,
    pub category: Option<CategoryRef>,
}

impl TransactionRow {
    pub fn category_type(&self) -> Option<CategoryType> {
        self.category.as_ref().map(|c| c.category_type)
    }
}

/// Resolve each row's category against the wallet's category list.
///
/// The list wins over whatever the row carried, so renamed categories show
/// their current name. Rows whose category id is unknown keep what they had.
pub fn resolve_categories(mut rows: Vec<TransactionRow>, categories: &[Category]) -> Vec<TransactionRow> {
    let by_id: HashMap<CategoryId, &Category> = categories.iter().map(|c| (c.id, c)).collect();
    for row in &mut rows {
        if let Some(category) = row.category_id.and_then(|id| by_id.get(&id)) {
            row.category = Some(CategoryRef {
                name: category.name.clone(),
                category_type: category.category_type,
            });
        }
    }
    rows
}

/// A transaction with its category, as shown in listings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionDetail {
    pub transaction: Transaction,
    pub category: Option<CategoryRef>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortBy {
    #[default]
    Date,
    Amount,
    Category,
}

impl SortBy {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "date" => Some(SortBy::Date),
            "amount" => Some(SortBy::Amount),
            "category" => Some(SortBy::Category),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "asc" => Some(SortOrder::Asc),
            "desc" => Some(SortOrder::Desc),
            _ => None,
        }
    }
}

pub const DEFAULT_PAGE_SIZE: usize = 50;

/// Filters for listing a wallet's transactions.
#[derive(Debug, Clone)]
pub struct TransactionQuery {
    pub category_id: Option<CategoryId>,
    pub category_type: Option<CategoryType>,
    /// Inclusive, whole days
    pub from_date: Option<NaiveDate>,
    pub to_date: Option<NaiveDate>,
    /// Case-insensitive substring match on the description
    pub search: Option<String>,
    pub sort_by: SortBy,
    pub sort_order: SortOrder,
    pub limit: usize,
    pub offset: usize,
}

impl Default for TransactionQuery {
    fn default() -> Self {
        Self {
            category_id: None,
            category_type: None,
            from_date: None,
            to_date: None,
            search: None,
            sort_by: SortBy::default(),
            sort_order: SortOrder::default(),
            limit: DEFAULT_PAGE_SIZE,
            offset: 0,
        }
    }
}

/// Apply the category type filter that storage cannot apply without the join,
/// then re-sort by the requested key. The sort is stable, so equal keys keep
/// the order storage returned them in.
pub fn filter_by_type(
    mut details: Vec<TransactionDetail>,
    category_type: Option<CategoryType>,
    sort_by: SortBy,
    sort_order: SortOrder,
) -> Vec<TransactionDetail> {
    let Some(wanted) = category_type else {
        return details;
    };

    details.retain(|d| d.category.as_ref().map(|c| c.category_type) == Some(wanted));

    details.sort_by(|a, b| {
        let ordering = compare_by(a, b, sort_by);
        match sort_order {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    });

    details
}

fn compare_by(a: &TransactionDetail, b: &TransactionDetail, sort_by: SortBy) -> Ordering {
    match sort_by {
        SortBy::Date => a.transaction.date.cmp(&b.transaction.date),
        SortBy::Amount => a.transaction.amount.cmp(&b.transaction.amount),
        SortBy::Category => {
            let name = |d: &TransactionDetail| {
                d.category
                    .as_ref()
                    .map(|c| c.name.clone())
                    .unwrap_or_default()
            };
            name(a).cmp(&name(b))
        }
    }
}
