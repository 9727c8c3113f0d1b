use anyhow::Result;
use async_trait::async_trait;

use crate::domain::{Category, DateRange, TransactionRow, WalletId};

/// Where reports get their data from.
///
/// Implementations must return only rows of `wallet_id`, restricted to
/// `range` when one is given (both ends inclusive, whole days), with each
/// row's category already resolved. An unknown wallet yields no rows.
#[async_trait]
pub trait TransactionSource: Send + Sync {
    async fn fetch_transactions(
        &self,
        wallet_id: WalletId,
        range: Option<DateRange>,
    ) -> Result<Vec<TransactionRow>>;

    async fn fetch_categories(&self, wallet_id: WalletId) -> Result<Vec<Category>>;
}
