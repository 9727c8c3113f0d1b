use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Amount;

pub type WalletId = Uuid;

/// A wallet owns its categories and transactions. All reporting is scoped to one wallet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Wallet {
    pub id: WalletId,
    pub name: String,
    /// ISO 4217 currency code, stored upper-case
    pub currency: String,
    pub created_at: DateTime<Utc>,
}

impl Wallet {
    pub fn new(name: String, currency: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            currency: currency.to_uppercase(),
            created_at: Utc::now(),
        }
    }
}

/// A wallet together with its all-time balance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletSummary {
    pub wallet: Wallet,
    pub total_balance: Amount,
}

/// Free-text note attached to a wallet. A wallet has at most one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletNote {
    pub wallet_id: WalletId,
    pub content: String,
    /// None while the note has never been saved
    pub updated_at: Option<DateTime<Utc>>,
}

impl WalletNote {
    pub fn empty(wallet_id: WalletId) -> Self {
        Self {
            wallet_id,
            content: String::new(),
            updated_at: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.content.trim().is_empty()
    }
}
