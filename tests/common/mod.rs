// Allow dead_code because these helpers are used across different test files
// which are compiled separately
#![allow(dead_code)]

use anyhow::{Result, bail};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use dompet::application::{FinanceService, TransactionSource};
use dompet::domain::{
    Category, CategoryRef, CategoryType, DateRange, TransactionRow, Wallet, WalletId,
};
use tempfile::TempDir;

/// Helper to create a test service with a temporary database
pub async fn test_service() -> Result<(FinanceService, TempDir)> {
    let temp_dir = TempDir::new()?;
    let db_path = temp_dir.path().join("test.db");
    let service = FinanceService::init(db_path.to_str().unwrap()).await?;
    Ok((service, temp_dir))
}

/// Helper to parse a date string into a NaiveDate
pub fn day(date_str: &str) -> NaiveDate {
    NaiveDate::parse_from_str(date_str, "%Y-%m-%d").unwrap()
}

/// Helper to parse a date string into DateTime<Utc> at midnight
pub fn parse_date(date_str: &str) -> DateTime<Utc> {
    day(date_str).and_hms_opt(0, 0, 0).unwrap().and_utc()
}

/// Helper for an instant within a day
pub fn at(date_str: &str, hour: u32, min: u32, sec: u32) -> DateTime<Utc> {
    day(date_str).and_hms_opt(hour, min, sec).unwrap().and_utc()
}

/// Test fixture: an IDR wallet with the usual categories
pub struct Household;

impl Household {
    pub const NAME: &'static str = "Household";

    /// Wallet "Household" with Gaji (income), Makan and Transport (expense)
    pub async fn create(service: &FinanceService) -> Result<Wallet> {
        let wallet = service
            .create_wallet(Self::NAME.into(), "IDR".into())
            .await?;
        service
            .create_category(Self::NAME, "Gaji".into(), CategoryType::Income)
            .await?;
        service
            .create_category(Self::NAME, "Makan".into(), CategoryType::Expense)
            .await?;
        service
            .create_category(Self::NAME, "Transport".into(), CategoryType::Expense)
            .await?;
        Ok(wallet)
    }

    /// Salary of 5,000,000 on 2024-01-15 and a 50,000 meal on 2024-01-16
    pub async fn create_with_january(service: &FinanceService) -> Result<Wallet> {
        let wallet = Self::create(service).await?;
        service
            .record_transaction(Self::NAME, "Gaji", 5_000_000, parse_date("2024-01-15"), None)
            .await?;
        service
            .record_transaction(Self::NAME, "Makan", 50_000, parse_date("2024-01-16"), None)
            .await?;
        Ok(wallet)
    }
}

/// Transaction source held in memory, for exercising reports without SQLite.
#[derive(Default)]
pub struct MemorySource {
    pub rows: Vec<(WalletId, TransactionRow)>,
    pub categories: Vec<Category>,
}

impl MemorySource {
    pub fn push(
        &mut self,
        wallet_id: WalletId,
        category: Option<&Category>,
        amount: i64,
        date: DateTime<Utc>,
    ) {
        self.rows.push((
            wallet_id,
            TransactionRow {
                amount,
                date,
                category_id: category.map(|c| c.id),
                category: category.map(|c| CategoryRef {
                    name: c.name.clone(),
                    category_type: c.category_type,
                }),
            },
        ));
    }
}

#[async_trait]
impl TransactionSource for MemorySource {
    async fn fetch_transactions(
        &self,
        wallet_id: WalletId,
        range: Option<DateRange>,
    ) -> Result<Vec<TransactionRow>> {
        Ok(self
            .rows
            .iter()
            .filter(|(w, row)| *w == wallet_id && range.is_none_or(|r| r.contains_instant(row.date)))
            .map(|(_, row)| row.clone())
            .collect())
    }

    async fn fetch_categories(&self, wallet_id: WalletId) -> Result<Vec<Category>> {
        Ok(self
            .categories
            .iter()
            .filter(|c| c.wallet_id == wallet_id)
            .cloned()
            .collect())
    }
}

/// Transaction source whose every fetch fails.
pub struct FailingSource;

#[async_trait]
impl TransactionSource for FailingSource {
    async fn fetch_transactions(
        &self,
        _wallet_id: WalletId,
        _range: Option<DateRange>,
    ) -> Result<Vec<TransactionRow>> {
        bail!("connection reset")
    }

    async fn fetch_categories(&self, _wallet_id: WalletId) -> Result<Vec<Category>> {
        bail!("connection reset")
    }
}
