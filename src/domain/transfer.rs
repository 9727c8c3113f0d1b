use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Amount, CategoryId, Transaction, Wallet};

/// A movement of money between two wallets.
///
/// Wallets only know income and expense, so a transfer is booked as an
/// expense in the source wallet and an income in the destination wallet,
/// both for the same amount and date.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletTransfer {
    pub amount: Amount,
    pub date: DateTime<Utc>,
    /// Used for both sides. Defaults to "Transfer to/from <wallet>".
    pub description: Option<String>,
}

impl WalletTransfer {
    pub fn new(amount: Amount, date: DateTime<Utc>) -> Self {
        Self {
            amount,
            date,
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Check the transfer can be booked between `from` and `to`.
    pub fn validate(&self, from: &Wallet, to: &Wallet) -> Result<(), TransferError> {
        if from.id == to.id {
            return Err(TransferError::SameWallet);
        }
        if self.amount <= 0 {
            return Err(TransferError::NonPositiveAmount(self.amount));
        }
        if from.currency != to.currency {
            return Err(TransferError::CurrencyMismatch {
                from_currency: from.currency.clone(),
                to_currency: to.currency.clone(),
            });
        }
        Ok(())
    }

    /// The expense booked in `from` and the income booked in `to`.
    pub fn into_transactions(
        self,
        from: &Wallet,
        out_category: CategoryId,
        to: &Wallet,
        in_category: CategoryId,
    ) -> (Transaction, Transaction) {
        let outgoing_description = self
            .description
            .clone()
            .unwrap_or_else(|| format!("Transfer to {}", to.name));
        let incoming_description = self
            .description
            .unwrap_or_else(|| format!("Transfer from {}", from.name));

        let outgoing = Transaction::new(from.id, Some(out_category), self.amount, self.date)
            .with_description(outgoing_description);
        let incoming = Transaction::new(to.id, Some(in_category), self.amount, self.date)
            .with_description(incoming_description);

        (outgoing, incoming)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferError {
    SameWallet,
    NonPositiveAmount(Amount),
    CurrencyMismatch {
        from_currency: String,
        to_currency: String,
    },
}

impl std::fmt::Display for TransferError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransferError::SameWallet => {
                write!(f, "Source and destination wallet must be different")
            }
            TransferError::NonPositiveAmount(amount) => {
                write!(f, "Transfer amount must be positive, got {}", amount)
            }
            TransferError::CurrencyMismatch {
                from_currency,
                to_currency,
            } => write!(
                f,
                "Currency mismatch between wallets: {} vs {}",
                from_currency, to_currency
            ),
        }
    }
}

impl std::error::Error for TransferError {}
