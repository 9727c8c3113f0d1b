use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use crate::application::TransactionSource;
use crate::domain::{
    Category, CategoryId, CategoryRef, CategoryType, DateRange, SortBy, SortOrder, Transaction,
    TransactionDetail, TransactionId, TransactionQuery, TransactionRow, Wallet, WalletId,
    WalletNote, end_of_day_exclusive, start_of_day,
};

use super::MIGRATION_001_INITIAL;

const TRANSACTION_COLUMNS: &str = "t.id, t.wallet_id, t.category_id, t.amount, t.date, t.description, t.created_at, \
     c.id AS joined_category_id, c.name AS category_name, c.type AS category_type";

/// Repository for persisting and querying wallets, categories and transactions.
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    /// Create a new repository with the given SQLite connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Connect to a SQLite database at the given path.
    /// Creates the database file if it doesn't exist.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = SqlitePool::connect(database_url)
            .await
            .context("Failed to connect to database")?;
        Ok(Self::new(pool))
    }

    /// Run database migrations.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::query(MIGRATION_001_INITIAL)
            .execute(&self.pool)
            .await
            .context("Failed to run migration 001")?;
        Ok(())
    }

    /// Initialize a new database (connect + migrate).
    pub async fn init(database_url: &str) -> Result<Self> {
        let repo = Self::connect(database_url).await?;
        repo.migrate().await?;
        Ok(repo)
    }

    // ========================
    // Wallet operations
    // ========================

    /// Save a new wallet to the database.
    pub async fn save_wallet(&self, wallet: &Wallet) -> Result<()> {
        sqlx::query("INSERT INTO wallets (id, name, currency, created_at) VALUES (?, ?, ?, ?)")
            .bind(wallet.id.to_string())
            .bind(&wallet.name)
            .bind(&wallet.currency)
            .bind(timestamp(wallet.created_at))
            .execute(&self.pool)
            .await
            .context("Failed to save wallet")?;
        Ok(())
    }

    /// Get a wallet by ID.
    pub async fn get_wallet(&self, id: WalletId) -> Result<Option<Wallet>> {
        let row = sqlx::query("SELECT id, name, currency, created_at FROM wallets WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .context("Failed to fetch wallet")?;

        row.as_ref().map(Self::row_to_wallet).transpose()
    }

    /// Get a wallet by name.
    pub async fn get_wallet_by_name(&self, name: &str) -> Result<Option<Wallet>> {
        let row = sqlx::query("SELECT id, name, currency, created_at FROM wallets WHERE name = ?")
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to fetch wallet by name")?;

        row.as_ref().map(Self::row_to_wallet).transpose()
    }

    /// List all wallets, ordered by name.
    pub async fn list_wallets(&self) -> Result<Vec<Wallet>> {
        let rows = sqlx::query("SELECT id, name, currency, created_at FROM wallets ORDER BY name")
            .fetch_all(&self.pool)
            .await
            .context("Failed to list wallets")?;

        rows.iter().map(Self::row_to_wallet).collect()
    }

    fn row_to_wallet(row: &sqlx::sqlite::SqliteRow) -> Result<Wallet> {
        let id_str: String = row.get("id");
        let created_at_str: String = row.get("created_at");

        Ok(Wallet {
            id: Uuid::parse_str(&id_str).context("Invalid wallet ID")?,
            name: row.get("name"),
            currency: row.get("currency"),
            created_at: parse_timestamp(&created_at_str).context("Invalid created_at timestamp")?,
        })
    }

    /// Get the note of a wallet, if one was ever saved.
    pub async fn get_wallet_note(&self, wallet_id: WalletId) -> Result<Option<WalletNote>> {
        let row = sqlx::query("SELECT content, updated_at FROM wallet_notes WHERE wallet_id = ?")
            .bind(wallet_id.to_string())
            .fetch_optional(&self.pool)
            .await
            .context("Failed to fetch wallet note")?;

        row.map(|row| {
            let updated_at: String = row.get("updated_at");
            Ok(WalletNote {
                wallet_id,
                content: row.get("content"),
                updated_at: Some(
                    parse_timestamp(&updated_at).context("Invalid updated_at timestamp")?,
                ),
            })
        })
        .transpose()
    }

    /// Insert or replace the note of a wallet.
    pub async fn save_wallet_note(
        &self,
        wallet_id: WalletId,
        content: &str,
        updated_at: DateTime<Utc>,
    ) -> Result<()> {
        sqlx::query(
            "INSERT INTO wallet_notes (wallet_id, content, updated_at) VALUES (?, ?, ?) \
             ON CONFLICT(wallet_id) DO UPDATE SET content = excluded.content, updated_at = excluded.updated_at",
        )
        .bind(wallet_id.to_string())
        .bind(content)
        .bind(timestamp(updated_at))
        .execute(&self.pool)
        .await
        .context("Failed to save wallet note")?;
        Ok(())
    }

    // ========================
    // Category operations
    // ========================

    /// Save a new category.
    pub async fn save_category(&self, category: &Category) -> Result<()> {
        sqlx::query("INSERT INTO categories (id, wallet_id, name, type) VALUES (?, ?, ?, ?)")
            .bind(category.id.to_string())
            .bind(category.wallet_id.to_string())
            .bind(&category.name)
            .bind(category.category_type.as_str())
            .execute(&self.pool)
            .await
            .context("Failed to save category")?;
        Ok(())
    }

    /// Find a category of a wallet by name, ignoring case.
    pub async fn find_category(&self, wallet_id: WalletId, name: &str) -> Result<Option<Category>> {
        let row = sqlx::query(
            "SELECT id, wallet_id, name, type FROM categories WHERE wallet_id = ? AND name = ?",
        )
        .bind(wallet_id.to_string())
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch category by name")?;

        row.as_ref().map(Self::row_to_category).transpose()
    }

    /// List the categories of a wallet, ordered by name.
    pub async fn list_categories(&self, wallet_id: WalletId) -> Result<Vec<Category>> {
        let rows = sqlx::query(
            "SELECT id, wallet_id, name, type FROM categories WHERE wallet_id = ? ORDER BY name",
        )
        .bind(wallet_id.to_string())
        .fetch_all(&self.pool)
        .await
        .context("Failed to list categories")?;

        rows.iter().map(Self::row_to_category).collect()
    }

    pub async fn rename_category(&self, id: CategoryId, name: &str) -> Result<()> {
        sqlx::query("UPDATE categories SET name = ? WHERE id = ?")
            .bind(name)
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .context("Failed to rename category")?;
        Ok(())
    }

    /// Delete a category and detach its transactions.
    /// Returns how many transactions lost their category.
    pub async fn delete_category(&self, id: CategoryId) -> Result<u64> {
        let mut tx = self.pool.begin().await.context("Failed to begin transaction")?;

        let detached = sqlx::query("UPDATE transactions SET category_id = NULL WHERE category_id = ?")
            .bind(id.to_string())
            .execute(&mut *tx)
            .await
            .context("Failed to detach transactions from category")?
            .rows_affected();

        sqlx::query("DELETE FROM categories WHERE id = ?")
            .bind(id.to_string())
            .execute(&mut *tx)
            .await
            .context("Failed to delete category")?;

        tx.commit().await.context("Failed to commit category deletion")?;
        Ok(detached)
    }

    fn row_to_category(row: &sqlx::sqlite::SqliteRow) -> Result<Category> {
        let id_str: String = row.get("id");
        let wallet_id_str: String = row.get("wallet_id");
        let type_str: String = row.get("type");

        Ok(Category {
            id: Uuid::parse_str(&id_str).context("Invalid category ID")?,
            wallet_id: Uuid::parse_str(&wallet_id_str).context("Invalid wallet ID")?,
            name: row.get("name"),
            category_type: CategoryType::from_str(&type_str)
                .ok_or_else(|| anyhow::anyhow!("Invalid category type: {}", type_str))?,
        })
    }

    // ========================
    // Transaction operations
    // ========================

    /// Save a new transaction.
    pub async fn save_transaction(&self, transaction: &Transaction) -> Result<()> {
        self.save_transactions(&[transaction]).await
    }

    /// Save several transactions atomically: either all are stored or none.
    pub async fn save_transactions(&self, transactions: &[&Transaction]) -> Result<()> {
        let mut tx = self.pool.begin().await.context("Failed to begin transaction")?;

        for transaction in transactions {
            sqlx::query(
                r#"
                INSERT INTO transactions (id, wallet_id, category_id, amount, date, description, created_at)
                VALUES (?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(transaction.id.to_string())
            .bind(transaction.wallet_id.to_string())
            .bind(transaction.category_id.map(|id| id.to_string()))
            .bind(transaction.amount)
            .bind(timestamp(transaction.date))
            .bind(&transaction.description)
            .bind(timestamp(transaction.created_at))
            .execute(&mut *tx)
            .await
            .context("Failed to save transaction")?;
        }

        tx.commit().await.context("Failed to commit transactions")?;
        Ok(())
    }

    /// Get a transaction with its category.
    pub async fn get_transaction(&self, id: TransactionId) -> Result<Option<TransactionDetail>> {
        let query = format!(
            "SELECT {} FROM transactions t LEFT JOIN categories c ON c.id = t.category_id WHERE t.id = ?",
            TRANSACTION_COLUMNS
        );
        let row = sqlx::query(&query)
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .context("Failed to fetch transaction")?;

        row.as_ref().map(Self::row_to_detail).transpose()
    }

    /// Overwrite the mutable fields of a transaction.
    pub async fn update_transaction(&self, transaction: &Transaction) -> Result<()> {
        sqlx::query(
            "UPDATE transactions SET category_id = ?, amount = ?, date = ?, description = ? WHERE id = ?",
        )
        .bind(transaction.category_id.map(|id| id.to_string()))
        .bind(transaction.amount)
        .bind(timestamp(transaction.date))
        .bind(&transaction.description)
        .bind(transaction.id.to_string())
        .execute(&self.pool)
        .await
        .context("Failed to update transaction")?;
        Ok(())
    }

    pub async fn delete_transaction(&self, id: TransactionId) -> Result<()> {
        sqlx::query("DELETE FROM transactions WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .context("Failed to delete transaction")?;
        Ok(())
    }

    /// List transactions of a wallet with every filter storage can apply.
    /// `query.category_type` is not applied here.
    pub async fn list_transactions(
        &self,
        wallet_id: WalletId,
        query: &TransactionQuery,
    ) -> Result<Vec<TransactionDetail>> {
        // Build query dynamically based on filters
        let mut sql = format!(
            "SELECT {} FROM transactions t LEFT JOIN categories c ON c.id = t.category_id WHERE t.wallet_id = ?",
            TRANSACTION_COLUMNS
        );

        // Collect all string bindings first so they live long enough
        let wallet_id_str = wallet_id.to_string();
        let category_id_str = query.category_id.map(|id| id.to_string());
        let from_str = query.from_date.map(|d| timestamp(start_of_day(d)));
        let until_str = query.to_date.map(|d| timestamp(end_of_day_exclusive(d)));
        let search_str = query.search.as_ref().map(|s| format!("%{}%", s));

        if category_id_str.is_some() {
            sql.push_str(" AND t.category_id = ?");
        }
        if from_str.is_some() {
            sql.push_str(" AND t.date >= ?");
        }
        if until_str.is_some() {
            sql.push_str(" AND t.date < ?");
        }
        if search_str.is_some() {
            sql.push_str(" AND t.description LIKE ?");
        }

        let direction = match query.sort_order {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        };
        let column = match query.sort_by {
            SortBy::Date => "t.date",
            SortBy::Amount => "t.amount",
            SortBy::Category => "c.name",
        };
        sql.push_str(&format!(
            " ORDER BY {} {}, t.created_at {} LIMIT ? OFFSET ?",
            column, direction, direction
        ));

        let mut sql_query = sqlx::query(&sql).bind(&wallet_id_str);
        if let Some(ref id) = category_id_str {
            sql_query = sql_query.bind(id);
        }
        if let Some(ref from) = from_str {
            sql_query = sql_query.bind(from);
        }
        if let Some(ref until) = until_str {
            sql_query = sql_query.bind(until);
        }
        if let Some(ref search) = search_str {
            sql_query = sql_query.bind(search);
        }
        let limit = i64::try_from(query.limit).unwrap_or(i64::MAX);
        let offset = i64::try_from(query.offset).unwrap_or(i64::MAX);

        let rows = sql_query
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await
            .context("Failed to list filtered transactions")?;

        rows.iter().map(Self::row_to_detail).collect()
    }

    /// Rows of a wallet joined with their category, for reporting.
    pub async fn fetch_rows(
        &self,
        wallet_id: WalletId,
        range: Option<DateRange>,
    ) -> Result<Vec<TransactionRow>> {
        let mut sql = String::from(
            r#"
            SELECT t.amount, t.date, t.category_id,
                   c.id AS joined_category_id, c.name AS category_name, c.type AS category_type
            FROM transactions t
            LEFT JOIN categories c ON c.id = t.category_id
            WHERE t.wallet_id = ?
            "#,
        );
        let bounds = range.map(|r| {
            let (from, until) = r.bounds();
            (timestamp(from), timestamp(until))
        });
        if bounds.is_some() {
            sql.push_str(" AND t.date >= ? AND t.date < ?");
        }
        sql.push_str(" ORDER BY t.date, t.created_at");

        let mut sql_query = sqlx::query(&sql).bind(wallet_id.to_string());
        if let Some((ref from, ref until)) = bounds {
            sql_query = sql_query.bind(from).bind(until);
        }

        let rows = sql_query
            .fetch_all(&self.pool)
            .await
            .context("Failed to fetch transactions for report")?;

        rows.iter()
            .map(|row| {
                let date_str: String = row.get("date");
                Ok(TransactionRow {
                    amount: row.get("amount"),
                    date: parse_timestamp(&date_str).context("Invalid transaction date")?,
                    category_id: parse_optional_id(row.get("category_id"))?,
                    category: Self::row_to_category_ref(row)?,
                })
            })
            .collect()
    }

    /// The joined category of a transaction row, if the join found one.
    fn row_to_category_ref(row: &sqlx::sqlite::SqliteRow) -> Result<Option<CategoryRef>> {
        let joined: Option<String> = row.get("joined_category_id");
        if joined.is_none() {
            return Ok(None);
        }

        let name: Option<String> = row.get("category_name");
        let type_str: Option<String> = row.get("category_type");
        let type_str = type_str.unwrap_or_default();
        let category_type = CategoryType::from_str(&type_str)
            .ok_or_else(|| anyhow::anyhow!("Invalid category type: {}", type_str))?;

        Ok(Some(CategoryRef {
            name: name.unwrap_or_default(),
            category_type,
        }))
    }

    fn row_to_detail(row: &sqlx::sqlite::SqliteRow) -> Result<TransactionDetail> {
        let id_str: String = row.get("id");
        let wallet_id_str: String = row.get("wallet_id");
        let date_str: String = row.get("date");
        let created_at_str: String = row.get("created_at");

        Ok(TransactionDetail {
            transaction: Transaction {
                id: Uuid::parse_str(&id_str).context("Invalid transaction ID")?,
                wallet_id: Uuid::parse_str(&wallet_id_str).context("Invalid wallet ID")?,
                category_id: parse_optional_id(row.get("category_id"))?,
                amount: row.get("amount"),
                date: parse_timestamp(&date_str).context("Invalid transaction date")?,
                description: row.get("description"),
                created_at: parse_timestamp(&created_at_str)
                    .context("Invalid created_at timestamp")?,
            },
            category: Self::row_to_category_ref(row)?,
        })
    }
}

#[async_trait]
impl TransactionSource for Repository {
    async fn fetch_transactions(
        &self,
        wallet_id: WalletId,
        range: Option<DateRange>,
    ) -> Result<Vec<TransactionRow>> {
        self.fetch_rows(wallet_id, range).await
    }

    async fn fetch_categories(&self, wallet_id: WalletId) -> Result<Vec<Category>> {
        self.list_categories(wallet_id).await
    }
}

/// Fixed-width UTC text so that comparing strings compares instants.
fn timestamp(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn parse_timestamp(s: &str) -> Result<DateTime<Utc>> {
    Ok(DateTime::parse_from_rfc3339(s)?.with_timezone(&Utc))
}

fn parse_optional_id(value: Option<String>) -> Result<Option<Uuid>> {
    value
        .map(|s| Uuid::parse_str(&s))
        .transpose()
        .context("Invalid category ID")
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn test_timestamps_sort_as_text() {
        let early = Utc.with_ymd_and_hms(2024, 1, 31, 23, 59, 59).unwrap();
        let late = Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap();
        assert_eq!(timestamp(early), "2024-01-31T23:59:59Z");
        assert!(timestamp(early) < timestamp(late));
        assert_eq!(parse_timestamp(&timestamp(late)).unwrap(), late);
    }

    #[test]
    fn test_parse_timestamp_accepts_offsets() {
        let parsed = parse_timestamp("2024-01-15T07:00:00+07:00").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap());
    }
}
