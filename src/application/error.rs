use thiserror::Error;

use crate::domain::{Amount, TransferError};

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Wallet not found: {0}")]
    WalletNotFound(String),

    #[error("Wallet already exists: {0}")]
    WalletAlreadyExists(String),

    #[error("Category not found: {0}")]
    CategoryNotFound(String),

    #[error("Category already exists in this wallet: {0}")]
    CategoryAlreadyExists(String),

    #[error("Transaction not found: {0}")]
    TransactionNotFound(String),

    #[error("Invalid amount: {0}")]
    InvalidAmount(Amount),

    #[error("Invalid month: {0} (expected 1-12)")]
    InvalidMonth(u32),

    #[error("Invalid year: {0}")]
    InvalidYear(i32),

    #[error("Invalid month count: {0} (expected at least 1 and within the calendar)")]
    InvalidMonthCount(u32),

    #[error("Invalid date range: {start} is after {end}")]
    InvalidDateRange { start: String, end: String },

    #[error("Invalid period type: {0} (expected mtd, ytd, yoy or ttm)")]
    InvalidPeriodType(String),

    #[error("Invalid transfer: {0}")]
    InvalidTransfer(#[from] TransferError),

    #[error("Database error: {0}")]
    Database(#[from] anyhow::Error),
}
