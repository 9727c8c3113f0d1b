use chrono::{DateTime, NaiveDate, SubsecRound, Utc};
use tracing::{debug, info};

use crate::domain::{
    Amount, Category, CategoryRef, CategoryType, SortBy, SortOrder, TRANSFER_IN_CATEGORY,
    TRANSFER_OUT_CATEGORY, Transaction, TransactionDetail, TransactionId, TransactionQuery,
    Wallet, WalletId, WalletNote, WalletSummary, WalletTransfer, filter_by_type,
};
use crate::storage::Repository;

use super::{AppError, Reporter};

/// Application service providing high-level operations over wallets.
/// This is the primary interface for any client (CLI, API, TUI, etc.).
pub struct FinanceService {
    repo: Repository,
}

/// Filter for listing transactions, with the category given by name.
#[derive(Debug, Clone, Default)]
pub struct TransactionFilter {
    pub category: Option<String>,
    pub category_type: Option<CategoryType>,
    /// First day to include
    pub from_date: Option<NaiveDate>,
    /// Last day to include
    pub to_date: Option<NaiveDate>,
    pub search: Option<String>,
    pub sort_by: SortBy,
    pub sort_order: SortOrder,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

/// Fields to change on an existing transaction. `None` leaves a field as it is.
#[derive(Debug, Clone, Default)]
pub struct TransactionUpdate {
    pub amount: Option<Amount>,
    pub date: Option<DateTime<Utc>>,
    pub category: Option<String>,
    pub description: Option<String>,
}

/// Result of a transfer between wallets
pub struct TransferResult {
    pub outgoing: Transaction,
    pub incoming: Transaction,
    pub from_wallet_name: String,
    pub to_wallet_name: String,
}

impl FinanceService {
    /// Create a new finance service with the given repository.
    pub fn new(repo: Repository) -> Self {
        Self { repo }
    }

    /// Initialize a new database at the given path.
    pub async fn init(database_path: &str) -> Result<Self, AppError> {
        let db_url = format!("sqlite:{}?mode=rwc", database_path);
        let repo = Repository::init(&db_url).await?;
        Ok(Self::new(repo))
    }

    /// Connect to an existing database.
    pub async fn connect(database_path: &str) -> Result<Self, AppError> {
        let db_url = format!("sqlite:{}", database_path);
        let repo = Repository::connect(&db_url).await?;
        Ok(Self::new(repo))
    }

    /// Reports over this service's data.
    pub fn reports(&self) -> Reporter<'_, Repository> {
        Reporter::new(&self.repo)
    }

    // ========================
    // Wallet operations
    // ========================

    /// Create a new wallet.
    pub async fn create_wallet(&self, name: String, currency: String) -> Result<Wallet, AppError> {
        if self.repo.get_wallet_by_name(&name).await?.is_some() {
            return Err(AppError::WalletAlreadyExists(name));
        }

        let wallet = Wallet::new(name, currency);
        self.repo.save_wallet(&wallet).await?;
        info!(wallet = %wallet.id, name = %wallet.name, currency = %wallet.currency, "wallet created");
        Ok(wallet)
    }

    /// Get a wallet by name.
    pub async fn get_wallet(&self, name: &str) -> Result<Wallet, AppError> {
        self.repo
            .get_wallet_by_name(name)
            .await?
            .ok_or_else(|| AppError::WalletNotFound(name.to_string()))
    }

    pub async fn get_wallet_by_id(&self, id: WalletId) -> Result<Wallet, AppError> {
        self.repo
            .get_wallet(id)
            .await?
            .ok_or_else(|| AppError::WalletNotFound(id.to_string()))
    }

    /// List all wallets.
    pub async fn list_wallets(&self) -> Result<Vec<Wallet>, AppError> {
        Ok(self.repo.list_wallets().await?)
    }

    /// Every wallet with its all-time balance.
    pub async fn wallet_summaries(&self) -> Result<Vec<WalletSummary>, AppError> {
        let wallets = self.repo.list_wallets().await?;
        let reports = self.reports();

        let mut summaries = Vec::with_capacity(wallets.len());
        for wallet in wallets {
            let total_balance = reports.wallet_balance(wallet.id).await?;
            summaries.push(WalletSummary {
                wallet,
                total_balance,
            });
        }
        Ok(summaries)
    }

    /// The note of a wallet; empty when none was saved yet.
    pub async fn wallet_note(&self, wallet_name: &str) -> Result<WalletNote, AppError> {
        let wallet = self.get_wallet(wallet_name).await?;
        Ok(self
            .repo
            .get_wallet_note(wallet.id)
            .await?
            .unwrap_or_else(|| WalletNote::empty(wallet.id)))
    }

    /// Replace the note of a wallet with `content`.
    pub async fn save_wallet_note(
        &self,
        wallet_name: &str,
        content: String,
    ) -> Result<WalletNote, AppError> {
        let wallet = self.get_wallet(wallet_name).await?;
        let updated_at = Utc::now().trunc_subsecs(0);
        self.repo
            .save_wallet_note(wallet.id, &content, updated_at)
            .await?;
        debug!(wallet = %wallet.id, chars = content.chars().count(), "wallet note saved");

        Ok(WalletNote {
            wallet_id: wallet.id,
            content,
            updated_at: Some(updated_at),
        })
    }

    // ========================
    // Category operations
    // ========================

    /// Create a category in a wallet. Names are unique per wallet, ignoring case.
    pub async fn create_category(
        &self,
        wallet_name: &str,
        name: String,
        category_type: CategoryType,
    ) -> Result<Category, AppError> {
        let wallet = self.get_wallet(wallet_name).await?;
        if self.repo.find_category(wallet.id, &name).await?.is_some() {
            return Err(AppError::CategoryAlreadyExists(name));
        }

        let category = Category::new(wallet.id, name, category_type);
        self.repo.save_category(&category).await?;
        info!(wallet = %wallet.id, category = %category.name, kind = %category_type, "category created");
        Ok(category)
    }

    /// Get a category of a wallet by name.
    pub async fn get_category(&self, wallet_id: WalletId, name: &str) -> Result<Category, AppError> {
        self.repo
            .find_category(wallet_id, name)
            .await?
            .ok_or_else(|| AppError::CategoryNotFound(name.to_string()))
    }

    /// List the categories of a wallet, ordered by name.
    pub async fn list_categories(&self, wallet_name: &str) -> Result<Vec<Category>, AppError> {
        let wallet = self.get_wallet(wallet_name).await?;
        Ok(self.repo.list_categories(wallet.id).await?)
    }

    /// Rename a category. Reports pick the new name up immediately.
    pub async fn rename_category(
        &self,
        wallet_name: &str,
        name: &str,
        new_name: String,
    ) -> Result<Category, AppError> {
        let wallet = self.get_wallet(wallet_name).await?;
        let mut category = self.get_category(wallet.id, name).await?;
        if let Some(existing) = self.repo.find_category(wallet.id, &new_name).await? {
            if existing.id != category.id {
                return Err(AppError::CategoryAlreadyExists(new_name));
            }
        }

        self.repo.rename_category(category.id, &new_name).await?;
        category.name = new_name;
        Ok(category)
    }

    /// Delete a category. Its transactions stay, without a category.
    pub async fn delete_category(&self, wallet_name: &str, name: &str) -> Result<Category, AppError> {
        let wallet = self.get_wallet(wallet_name).await?;
        let category = self.get_category(wallet.id, name).await?;
        let detached = self.repo.delete_category(category.id).await?;
        info!(category = %category.name, detached, "category deleted");
        Ok(category)
    }

    // ========================
    // Transaction operations
    // ========================

    /// Record an income or expense in a wallet.
    pub async fn record_transaction(
        &self,
        wallet_name: &str,
        category_name: &str,
        amount: Amount,
        date: DateTime<Utc>,
        description: Option<String>,
    ) -> Result<TransactionDetail, AppError> {
        if amount <= 0 {
            return Err(AppError::InvalidAmount(amount));
        }

        let wallet = self.get_wallet(wallet_name).await?;
        let category = self.get_category(wallet.id, category_name).await?;

        let mut transaction = Transaction::new(wallet.id, Some(category.id), amount, date);
        if let Some(desc) = description {
            transaction = transaction.with_description(desc);
        }

        self.repo.save_transaction(&transaction).await?;
        debug!(transaction = %transaction.id, wallet = %wallet.id, amount, "transaction recorded");

        Ok(TransactionDetail {
            transaction,
            category: Some(CategoryRef {
                name: category.name,
                category_type: category.category_type,
            }),
        })
    }

    /// Get a transaction with its category.
    pub async fn get_transaction(&self, id: TransactionId) -> Result<TransactionDetail, AppError> {
        self.repo
            .get_transaction(id)
            .await?
            .ok_or_else(|| AppError::TransactionNotFound(id.to_string()))
    }

    /// Change an existing transaction.
    pub async fn update_transaction(
        &self,
        id: TransactionId,
        update: TransactionUpdate,
    ) -> Result<TransactionDetail, AppError> {
        let mut detail = self.get_transaction(id).await?;
        let tx = &mut detail.transaction;

        if let Some(amount) = update.amount {
            if amount <= 0 {
                return Err(AppError::InvalidAmount(amount));
            }
            tx.amount = amount;
        }
        if let Some(date) = update.date {
            tx.date = date;
        }
        if let Some(description) = update.description {
            tx.description = Some(description);
        }
        if let Some(name) = update.category {
            let category = self.get_category(tx.wallet_id, &name).await?;
            tx.category_id = Some(category.id);
        }

        self.repo.update_transaction(tx).await?;
        self.get_transaction(id).await
    }

    /// Delete a transaction.
    pub async fn delete_transaction(&self, id: TransactionId) -> Result<TransactionDetail, AppError> {
        let detail = self.get_transaction(id).await?;
        self.repo.delete_transaction(id).await?;
        Ok(detail)
    }

    /// List a wallet's transactions.
    ///
    /// Storage applies the category, date, and search filters plus the
    /// requested ordering and page. The type filter needs the category join,
    /// so it is applied afterwards and the page re-sorted.
    pub async fn list_transactions(
        &self,
        wallet_name: &str,
        filter: TransactionFilter,
    ) -> Result<Vec<TransactionDetail>, AppError> {
        let wallet = self.get_wallet(wallet_name).await?;
        let category_id = match &filter.category {
            Some(name) => Some(self.get_category(wallet.id, name).await?.id),
            None => None,
        };

        let defaults = TransactionQuery::default();
        let query = TransactionQuery {
            category_id,
            category_type: filter.category_type,
            from_date: filter.from_date,
            to_date: filter.to_date,
            search: filter.search,
            sort_by: filter.sort_by,
            sort_order: filter.sort_order,
            limit: filter.limit.unwrap_or(defaults.limit),
            offset: filter.offset.unwrap_or(defaults.offset),
        };

        let details = self.repo.list_transactions(wallet.id, &query).await?;
        Ok(filter_by_type(
            details,
            query.category_type,
            query.sort_by,
            query.sort_order,
        ))
    }

    // ========================
    // Transfer operations
    // ========================

    /// Move money between two wallets.
    pub async fn transfer(
        &self,
        from_wallet_name: &str,
        to_wallet_name: &str,
        transfer: WalletTransfer,
    ) -> Result<TransferResult, AppError> {
        let from_wallet = self.get_wallet(from_wallet_name).await?;
        let to_wallet = self.get_wallet(to_wallet_name).await?;
        transfer.validate(&from_wallet, &to_wallet)?;

        // Both names are checked before either category is created
        let out_existing = self
            .find_typed_category(from_wallet.id, TRANSFER_OUT_CATEGORY, CategoryType::Expense)
            .await?;
        let in_existing = self
            .find_typed_category(to_wallet.id, TRANSFER_IN_CATEGORY, CategoryType::Income)
            .await?;

        let out_category = self
            .existing_or_create(out_existing, from_wallet.id, TRANSFER_OUT_CATEGORY, CategoryType::Expense)
            .await?;
        let in_category = self
            .existing_or_create(in_existing, to_wallet.id, TRANSFER_IN_CATEGORY, CategoryType::Income)
            .await?;

        let (outgoing, incoming) =
            transfer.into_transactions(&from_wallet, out_category.id, &to_wallet, in_category.id);
        self.repo.save_transactions(&[&outgoing, &incoming]).await?;

        info!(
            from = %from_wallet.name,
            to = %to_wallet.name,
            amount = outgoing.amount,
            "transfer recorded"
        );

        Ok(TransferResult {
            outgoing,
            incoming,
            from_wallet_name: from_wallet.name,
            to_wallet_name: to_wallet.name,
        })
    }

    /// Look up a category by name, failing if it exists with another type.
    async fn find_typed_category(
        &self,
        wallet_id: WalletId,
        name: &str,
        category_type: CategoryType,
    ) -> Result<Option<Category>, AppError> {
        match self.repo.find_category(wallet_id, name).await? {
            Some(existing) if existing.category_type == category_type => Ok(Some(existing)),
            Some(_) => Err(AppError::CategoryAlreadyExists(name.to_string())),
            None => Ok(None),
        }
    }

    async fn existing_or_create(
        &self,
        existing: Option<Category>,
        wallet_id: WalletId,
        name: &str,
        category_type: CategoryType,
    ) -> Result<Category, AppError> {
        if let Some(category) = existing {
            return Ok(category);
        }
        let category = Category::new(wallet_id, name.to_string(), category_type);
        self.repo.save_category(&category).await?;
        Ok(category)
    }
}
