use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::WalletId;

pub type CategoryId = Uuid;

/// Which side of the ledger a category books into.
/// A transaction is income or expense solely through its category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CategoryType {
    Income,
    Expense,
}

impl CategoryType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CategoryType::Income => "income",
            CategoryType::Expense => "expense",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "income" => Some(CategoryType::Income),
            "expense" => Some(CategoryType::Expense),
            _ => None,
        }
    }
}

impl std::fmt::Display for CategoryType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for CategoryType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CategoryType::from_str(s).ok_or_else(|| format!("unknown category type '{}'", s))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub wallet_id: WalletId,
    pub name: String,
    pub category_type: CategoryType,
}

impl Category {
    pub fn new(wallet_id: WalletId, name: String, category_type: CategoryType) -> Self {
        Self {
            id: Uuid::new_v4(),
            wallet_id,
            name,
            category_type,
        }
    }
}

/// Name of the category recorded in the source wallet of a wallet transfer.
pub const TRANSFER_OUT_CATEGORY: &str = "Transfer Out";

/// Name of the category recorded in the destination wallet of a wallet transfer.
pub const TRANSFER_IN_CATEGORY: &str = "Transfer In";
