use std::io;

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use uuid::Uuid;

use crate::application::{
    AppError, FinanceService, MonthlyReportOptions, TransactionFilter, TransactionUpdate,
};
use crate::domain::{
    Amount, Bucket, CategoryType, DEFAULT_COMPARISON_MONTHS, PeriodType, SortBy, SortOrder,
    TransactionDetail, Wallet, WalletTransfer, format_amount, parse_amount, start_of_day,
    sum_buckets,
};

/// Dompet - wallet-based income and expense tracker
#[derive(Parser)]
#[command(name = "dompet")]
#[command(about = "Track income and expenses per wallet and report on them by period")]
#[command(version)]
pub struct Cli {
    /// Database file path
    #[arg(short, long, env = "DOMPET_DATABASE", default_value = "dompet.db", global = true)]
    pub database: String,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Reference date for reports (YYYY-MM-DD, defaults to today in UTC)
    #[arg(long, global = true)]
    pub as_of: Option<NaiveDate>,

    #[command(subcommand)]
    pub command: Commands,
}

/// How report output is rendered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    Csv,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new database
    Init,

    /// Wallet management commands
    #[command(subcommand)]
    Wallet(WalletCommands),

    /// Category management commands
    #[command(subcommand)]
    Category(CategoryCommands),

    /// Transaction management commands
    #[command(subcommand)]
    #[command(name = "tx")]
    Transaction(TransactionCommands),

    /// Move money from one wallet to another
    Transfer {
        /// Amount to transfer (e.g., "50.00" or "50,000")
        amount: String,

        /// Source wallet name
        #[arg(long)]
        from: String,

        /// Destination wallet name
        #[arg(long)]
        to: String,

        /// Date of the transfer (YYYY-MM-DD, defaults to now)
        #[arg(long)]
        date: Option<NaiveDate>,

        /// Description of the transfer
        #[arg(short = 'D', long)]
        description: Option<String>,
    },

    /// Generate reports
    #[command(subcommand)]
    Report(ReportCommands),

    /// Month totals and all-time balance of a wallet
    Dashboard {
        /// Wallet name
        wallet: String,

        /// Month (1-12, defaults to the reference month)
        #[arg(long)]
        month: Option<u32>,

        /// Year (defaults to the reference year)
        #[arg(long)]
        year: Option<i32>,

        /// Output format
        #[arg(long, value_enum, default_value_t)]
        format: OutputFormat,
    },
}

#[derive(Subcommand)]
pub enum WalletCommands {
    /// Create a new wallet
    Create {
        /// Wallet name (must be unique)
        name: String,

        /// Currency code (e.g., IDR, EUR)
        #[arg(short, long, default_value = "IDR")]
        currency: String,
    },

    /// List all wallets with their balances
    List,

    /// Show detailed wallet information
    Show {
        /// Wallet name
        name: String,
    },

    /// Show the wallet's note, or replace it with --set
    Note {
        /// Wallet name
        name: String,

        /// New note text (an empty string clears it)
        #[arg(long)]
        set: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum CategoryCommands {
    /// Add a category to a wallet
    Add {
        /// Wallet name
        wallet: String,

        /// Category name (unique per wallet, ignoring case)
        name: String,

        /// Category type: income, expense
        #[arg(short = 't', long = "type")]
        category_type: String,
    },

    /// List the categories of a wallet
    List {
        /// Wallet name
        wallet: String,
    },

    /// Rename a category
    Rename {
        /// Wallet name
        wallet: String,

        /// Current name
        name: String,

        /// New name
        new_name: String,
    },

    /// Remove a category; its transactions are kept without a category
    Remove {
        /// Wallet name
        wallet: String,

        /// Category name
        name: String,
    },
}

#[derive(Subcommand)]
pub enum TransactionCommands {
    /// Record an income or expense
    Add {
        /// Wallet name
        wallet: String,

        /// Amount (e.g., "50.00" or "5,000,000")
        amount: String,

        /// Category name
        #[arg(short, long)]
        category: String,

        /// Date (YYYY-MM-DD, defaults to now)
        #[arg(long)]
        date: Option<NaiveDate>,

        /// Description
        #[arg(short = 'D', long)]
        description: Option<String>,
    },

    /// List transactions of a wallet
    List {
        /// Wallet name
        wallet: String,

        /// Filter by category name
        #[arg(long)]
        category: Option<String>,

        /// Filter by category type: income, expense
        #[arg(short = 't', long = "type")]
        category_type: Option<String>,

        /// First day to include (YYYY-MM-DD)
        #[arg(long)]
        from: Option<NaiveDate>,

        /// Last day to include (YYYY-MM-DD)
        #[arg(long)]
        to: Option<NaiveDate>,

        /// Only descriptions containing this text
        #[arg(short, long)]
        search: Option<String>,

        /// Sort key: date, amount, category
        #[arg(long, default_value = "date")]
        sort: String,

        /// Sort order: asc, desc
        #[arg(long, default_value = "desc")]
        order: String,

        /// Maximum number of transactions to show
        #[arg(short, long)]
        limit: Option<usize>,

        /// Number of transactions to skip
        #[arg(long)]
        offset: Option<usize>,
    },

    /// Show one transaction
    Show {
        /// Transaction ID
        id: String,
    },

    /// Change a transaction
    Edit {
        /// Transaction ID
        id: String,

        /// New amount
        #[arg(short, long)]
        amount: Option<String>,

        /// New category name
        #[arg(short, long)]
        category: Option<String>,

        /// New date (YYYY-MM-DD)
        #[arg(long)]
        date: Option<NaiveDate>,

        /// New description
        #[arg(short = 'D', long)]
        description: Option<String>,
    },

    /// Delete a transaction
    Remove {
        /// Transaction ID
        id: String,
    },
}

#[derive(Subcommand)]
pub enum ReportCommands {
    /// Twelve months of income and expense
    Monthly {
        /// Wallet name
        wallet: String,

        /// Last month of the window (1-12, defaults to the reference month)
        #[arg(long)]
        month: Option<u32>,

        /// Year (defaults to the reference year)
        #[arg(long)]
        year: Option<i32>,

        /// January through December of the year instead of a rolling window
        #[arg(long)]
        year_only: bool,

        /// Output format
        #[arg(long, value_enum, default_value_t)]
        format: OutputFormat,
    },

    /// Every day of one month
    Daily {
        /// Wallet name
        wallet: String,

        /// Month (1-12, defaults to the reference month)
        #[arg(long)]
        month: Option<u32>,

        /// Year (defaults to the reference year)
        #[arg(long)]
        year: Option<i32>,

        /// Output format
        #[arg(long, value_enum, default_value_t)]
        format: OutputFormat,
    },

    /// Totals for a named period: mtd, ytd, yoy, ttm
    Period {
        /// Wallet name
        wallet: String,

        /// Period type: mtd, ytd, yoy, ttm
        period: String,

        /// Output format
        #[arg(long, value_enum, default_value_t)]
        format: OutputFormat,
    },

    /// Totals per category, largest first
    Categories {
        /// Wallet name
        wallet: String,

        /// Only income or expense categories
        #[arg(short = 't', long = "type")]
        category_type: Option<String>,

        /// First day to include (YYYY-MM-DD)
        #[arg(long)]
        from: Option<NaiveDate>,

        /// Last day to include (YYYY-MM-DD)
        #[arg(long)]
        to: Option<NaiveDate>,

        /// Output format
        #[arg(long, value_enum, default_value_t)]
        format: OutputFormat,
    },

    /// Category totals month by month
    Compare {
        /// Wallet name
        wallet: String,

        /// Category type: income, expense
        #[arg(short = 't', long = "type", default_value = "expense")]
        category_type: String,

        /// Number of months ending at the reference month
        #[arg(short, long, default_value_t = DEFAULT_COMPARISON_MONTHS)]
        months: u32,

        /// Output format
        #[arg(long, value_enum, default_value_t)]
        format: OutputFormat,
    },
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        let today = self.as_of.unwrap_or_else(|| Utc::now().date_naive());

        match self.command {
            Commands::Init => {
                FinanceService::init(&self.database).await?;
                println!("Database initialized: {}", self.database);
            }

            Commands::Wallet(wallet_cmd) => {
                let service = FinanceService::connect(&self.database).await?;
                run_wallet_command(&service, wallet_cmd).await?;
            }

            Commands::Category(category_cmd) => {
                let service = FinanceService::connect(&self.database).await?;
                run_category_command(&service, category_cmd).await?;
            }

            Commands::Transaction(tx_cmd) => {
                let service = FinanceService::connect(&self.database).await?;
                run_transaction_command(&service, tx_cmd).await?;
            }

            Commands::Transfer {
                amount,
                from,
                to,
                date,
                description,
            } => {
                let service = FinanceService::connect(&self.database).await?;
                let from_wallet = service.get_wallet(&from).await?;
                let amount = parse_wallet_amount(&amount, &from_wallet)?;

                let mut transfer = WalletTransfer::new(amount, timestamp_for(date));
                if let Some(desc) = description {
                    transfer = transfer.with_description(desc);
                }
                let result = service.transfer(&from, &to, transfer).await?;

                println!(
                    "Transferred {} {} -> {}",
                    format_amount(result.outgoing.amount, &from_wallet.currency),
                    result.from_wallet_name,
                    result.to_wallet_name
                );
                println!("  Outgoing: {}", result.outgoing.id);
                println!("  Incoming: {}", result.incoming.id);
            }

            Commands::Report(report_cmd) => {
                let service = FinanceService::connect(&self.database).await?;
                run_report_command(&service, report_cmd, today).await?;
            }

            Commands::Dashboard {
                wallet,
                month,
                year,
                format,
            } => {
                let service = FinanceService::connect(&self.database).await?;
                let wallet = service.get_wallet(&wallet).await?;
                let stats = service
                    .reports()
                    .dashboard_stats(wallet.id, month, year, today)
                    .await?;

                match format {
                    OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&stats)?),
                    OutputFormat::Csv => {
                        let mut writer = csv::Writer::from_writer(io::stdout());
                        writer.write_record([
                            "month_start",
                            "month_end",
                            "month_income",
                            "month_expense",
                            "total_balance",
                        ])?;
                        writer.write_record([
                            stats.month_start.to_string(),
                            stats.month_end.to_string(),
                            stats.month_income.to_string(),
                            stats.month_expense.to_string(),
                            stats.total_balance.to_string(),
                        ])?;
                        writer.flush()?;
                    }
                    OutputFormat::Table => {
                        let currency = &wallet.currency;
                        println!("Dashboard: {}", wallet.name);
                        println!("Month: {} to {}", stats.month_start, stats.month_end);
                        println!();
                        println!(
                            "Income:         {:>18}",
                            format_amount(stats.month_income, currency)
                        );
                        println!(
                            "Expense:        {:>18}",
                            format_amount(stats.month_expense, currency)
                        );
                        println!("{}", "-".repeat(34));
                        println!(
                            "Total balance:  {:>18}",
                            format_amount(stats.total_balance, currency)
                        );
                    }
                }
            }
        }

        Ok(())
    }
}

async fn run_wallet_command(service: &FinanceService, cmd: WalletCommands) -> Result<()> {
    match cmd {
        WalletCommands::Create { name, currency } => {
            let wallet = service.create_wallet(name, currency).await?;
            println!("Created wallet: {} ({})", wallet.name, wallet.currency);
        }

        WalletCommands::List => {
            let summaries = service.wallet_summaries().await?;
            if summaries.is_empty() {
                println!("No wallets found.");
            } else {
                println!("{:<20} {:<8} {:>18}", "NAME", "CURRENCY", "BALANCE");
                println!("{}", "-".repeat(48));
                for summary in summaries {
                    println!(
                        "{:<20} {:<8} {:>18}",
                        summary.wallet.name,
                        summary.wallet.currency,
                        format_amount(summary.total_balance, &summary.wallet.currency)
                    );
                }
            }
        }

        WalletCommands::Show { name } => {
            let wallet = service.get_wallet(&name).await?;
            let categories = service.list_categories(&name).await?;
            let balance = service.reports().wallet_balance(wallet.id).await?;

            println!("Wallet: {}", wallet.name);
            println!("  ID:         {}", wallet.id);
            println!("  Currency:   {}", wallet.currency);
            println!(
                "  Created:    {}",
                wallet.created_at.format("%Y-%m-%d %H:%M:%S")
            );
            println!("  Categories: {}", categories.len());
            println!("  Balance:    {}", format_amount(balance, &wallet.currency));
        }

        WalletCommands::Note { name, set } => {
            let note = match set {
                Some(content) => {
                    let note = service.save_wallet_note(&name, content).await?;
                    println!("Saved note for wallet: {}", name);
                    note
                }
                None => service.wallet_note(&name).await?,
            };
            if note.is_empty() {
                println!("(no note)");
            } else {
                println!("{}", note.content);
            }
        }
    }

    Ok(())
}

async fn run_category_command(service: &FinanceService, cmd: CategoryCommands) -> Result<()> {
    match cmd {
        CategoryCommands::Add {
            wallet,
            name,
            category_type,
        } => {
            let category_type = parse_category_type(&category_type)?;
            let category = service.create_category(&wallet, name, category_type).await?;
            println!(
                "Created category: {} ({})",
                category.name, category.category_type
            );
        }

        CategoryCommands::List { wallet } => {
            let categories = service.list_categories(&wallet).await?;
            if categories.is_empty() {
                println!("No categories found.");
            } else {
                println!("{:<24} {:<8}", "NAME", "TYPE");
                println!("{}", "-".repeat(33));
                for category in categories {
                    println!("{:<24} {:<8}", category.name, category.category_type);
                }
            }
        }

        CategoryCommands::Rename {
            wallet,
            name,
            new_name,
        } => {
            let category = service.rename_category(&wallet, &name, new_name).await?;
            println!("Renamed category: {} -> {}", name, category.name);
        }

        CategoryCommands::Remove { wallet, name } => {
            let category = service.delete_category(&wallet, &name).await?;
            println!("Removed category: {}", category.name);
        }
    }

    Ok(())
}

async fn run_transaction_command(service: &FinanceService, cmd: TransactionCommands) -> Result<()> {
    match cmd {
        TransactionCommands::Add {
            wallet,
            amount,
            category,
            date,
            description,
        } => {
            let wallet = service.get_wallet(&wallet).await?;
            let amount = parse_wallet_amount(&amount, &wallet)?;
            let detail = service
                .record_transaction(
                    &wallet.name,
                    &category,
                    amount,
                    timestamp_for(date),
                    description,
                )
                .await?;

            println!(
                "Recorded {}: {} ({})",
                category_label(&detail),
                format_amount(detail.transaction.amount, &wallet.currency),
                detail.transaction.id
            );
        }

        TransactionCommands::List {
            wallet,
            category,
            category_type,
            from,
            to,
            search,
            sort,
            order,
            limit,
            offset,
        } => {
            let filter = TransactionFilter {
                category,
                category_type: category_type
                    .as_deref()
                    .map(parse_category_type)
                    .transpose()?,
                from_date: from,
                to_date: to,
                search,
                sort_by: SortBy::from_str(&sort)
                    .with_context(|| format!("Invalid sort key '{}'. Use date, amount or category", sort))?,
                sort_order: SortOrder::from_str(&order)
                    .with_context(|| format!("Invalid sort order '{}'. Use asc or desc", order))?,
                limit,
                offset,
            };

            let wallet = service.get_wallet(&wallet).await?;
            let details = service.list_transactions(&wallet.name, filter).await?;

            if details.is_empty() {
                println!("No transactions found.");
                return Ok(());
            }

            println!(
                "{:<12} {:<20} {:<8} {:>18}  {:<30}",
                "DATE", "CATEGORY", "TYPE", "AMOUNT", "DESCRIPTION"
            );
            println!("{}", "-".repeat(92));
            for detail in &details {
                let tx = &detail.transaction;
                println!(
                    "{:<12} {:<20} {:<8} {:>18}  {:<30}",
                    tx.date.format("%Y-%m-%d"),
                    category_label(detail),
                    detail
                        .category
                        .as_ref()
                        .map(|c| c.category_type.as_str())
                        .unwrap_or("-"),
                    format_amount(tx.amount, &wallet.currency),
                    tx.description.as_deref().unwrap_or("")
                );
            }
        }

        TransactionCommands::Show { id } => {
            let detail = service.get_transaction(parse_id(&id)?).await?;
            let wallet = service.get_wallet_by_id(detail.transaction.wallet_id).await?;
            print_transaction(&detail, &wallet);
        }

        TransactionCommands::Edit {
            id,
            amount,
            category,
            date,
            description,
        } => {
            let id = parse_id(&id)?;
            let current = service.get_transaction(id).await?;
            let wallet = service.get_wallet_by_id(current.transaction.wallet_id).await?;

            let update = TransactionUpdate {
                amount: amount
                    .map(|a| parse_wallet_amount(&a, &wallet))
                    .transpose()?,
                date: date.map(start_of_day),
                category,
                description,
            };
            let detail = service.update_transaction(id, update).await?;
            println!("Updated transaction:");
            print_transaction(&detail, &wallet);
        }

        TransactionCommands::Remove { id } => {
            let detail = service.delete_transaction(parse_id(&id)?).await?;
            println!("Removed transaction: {}", detail.transaction.id);
        }
    }

    Ok(())
}

async fn run_report_command(
    service: &FinanceService,
    cmd: ReportCommands,
    today: NaiveDate,
) -> Result<()> {
    use chrono::Datelike;

    let reports = service.reports();

    match cmd {
        ReportCommands::Monthly {
            wallet,
            month,
            year,
            year_only,
            format,
        } => {
            let wallet = service.get_wallet(&wallet).await?;
            let options = MonthlyReportOptions {
                month,
                year,
                year_only,
            };
            let buckets = reports.monthly_report(wallet.id, options, today).await?;
            print_buckets("Monthly Report", &wallet, &buckets, format)?;
        }

        ReportCommands::Daily {
            wallet,
            month,
            year,
            format,
        } => {
            let wallet = service.get_wallet(&wallet).await?;
            let month = month.unwrap_or_else(|| today.month());
            let year = year.unwrap_or_else(|| today.year());
            let buckets = reports.daily_report(wallet.id, month, year).await?;
            print_buckets(
                &format!("Daily Report {:04}-{:02}", year, month),
                &wallet,
                &buckets,
                format,
            )?;
        }

        ReportCommands::Period {
            wallet,
            period,
            format,
        } => {
            let period_type =
                PeriodType::from_str(&period).ok_or(AppError::InvalidPeriodType(period))?;
            let wallet = service.get_wallet(&wallet).await?;
            let report = reports.period_report(wallet.id, period_type, today).await?;

            match format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
                OutputFormat::Csv => {
                    let mut writer = csv::Writer::from_writer(io::stdout());
                    writer.write_record(["period", "start", "end", "income", "expense", "net"])?;
                    writer.write_record([
                        "current".to_string(),
                        report.period_start.to_string(),
                        report.period_end.to_string(),
                        report.income.to_string(),
                        report.expense.to_string(),
                        report.net.to_string(),
                    ])?;
                    if let Some(previous) = &report.previous {
                        writer.write_record([
                            "previous".to_string(),
                            previous.period_start.to_string(),
                            previous.period_end.to_string(),
                            previous.income.to_string(),
                            previous.expense.to_string(),
                            previous.net.to_string(),
                        ])?;
                    }
                    writer.flush()?;
                }
                OutputFormat::Table => {
                    let currency = &wallet.currency;
                    println!("{} ({})", report.label, report.description);
                    println!("Period: {} to {}", report.period_start, report.period_end);
                    println!();
                    println!("Income:   {:>18}", format_amount(report.income, currency));
                    println!("Expense:  {:>18}", format_amount(report.expense, currency));
                    println!("{}", "-".repeat(28));
                    println!("Net:      {:>18}", format_amount(report.net, currency));

                    if let Some(previous) = &report.previous {
                        println!();
                        println!(
                            "Previous: {} to {}",
                            previous.period_start, previous.period_end
                        );
                        println!("Income:   {:>18}", format_amount(previous.income, currency));
                        println!("Expense:  {:>18}", format_amount(previous.expense, currency));
                        println!("Net:      {:>18}", format_amount(previous.net, currency));
                    }
                    if let Some(growth) = report.growth_income_percent {
                        println!();
                        println!("Income growth:  {:>+8.1}%", growth);
                    }
                    if let Some(growth) = report.growth_expense_percent {
                        println!("Expense growth: {:>+8.1}%", growth);
                    }
                    if let Some(monthly) = &report.monthly_data {
                        println!();
                        print_bucket_rows(monthly, currency);
                    }
                }
            }
        }

        ReportCommands::Categories {
            wallet,
            category_type,
            from,
            to,
            format,
        } => {
            let type_filter = category_type
                .as_deref()
                .map(parse_category_type)
                .transpose()?;
            let wallet = service.get_wallet(&wallet).await?;
            let breakdown = reports
                .category_breakdown(wallet.id, type_filter, from, to)
                .await?;

            match format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&breakdown)?),
                OutputFormat::Csv => {
                    let mut writer = csv::Writer::from_writer(io::stdout());
                    writer.write_record(["category", "type", "total", "count", "percentage"])?;
                    for item in &breakdown {
                        writer.write_record([
                            item.category_name.clone(),
                            item.category_type.to_string(),
                            item.total.to_string(),
                            item.transaction_count.to_string(),
                            format!("{:.2}", item.percentage),
                        ])?;
                    }
                    writer.flush()?;
                }
                OutputFormat::Table => {
                    println!("Category Breakdown: {}", wallet.name);
                    println!();
                    if breakdown.is_empty() {
                        println!("No categorized transactions found.");
                        return Ok(());
                    }
                    println!(
                        "{:<20} {:<8} {:>18} {:>6} {:>8}",
                        "CATEGORY", "TYPE", "TOTAL", "COUNT", "%"
                    );
                    println!("{}", "-".repeat(64));
                    for item in &breakdown {
                        println!(
                            "{:<20} {:<8} {:>18} {:>6} {:>7.1}%",
                            item.category_name,
                            item.category_type,
                            format_amount(item.total, &wallet.currency),
                            item.transaction_count,
                            item.percentage
                        );
                    }
                }
            }
        }

        ReportCommands::Compare {
            wallet,
            category_type,
            months,
            format,
        } => {
            let category_type = parse_category_type(&category_type)?;
            let wallet = service.get_wallet(&wallet).await?;
            let comparison = reports
                .category_monthly_comparison(wallet.id, category_type, months, today)
                .await?;

            match format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&comparison)?),
                OutputFormat::Csv => {
                    let mut writer = csv::Writer::from_writer(io::stdout());
                    writer.write_record(["month", "category", "total"])?;
                    for month in &comparison {
                        for entry in &month.categories {
                            writer.write_record([
                                month.month.clone(),
                                entry.category_name.clone(),
                                entry.total.to_string(),
                            ])?;
                        }
                    }
                    writer.flush()?;
                }
                OutputFormat::Table => {
                    println!(
                        "Category Comparison ({}): {}",
                        category_type, wallet.name
                    );
                    for month in &comparison {
                        println!();
                        println!("{}", month.month);
                        if month.categories.is_empty() {
                            println!("  (none)");
                        }
                        for entry in &month.categories {
                            println!(
                                "  {:<20} {:>18}",
                                entry.category_name,
                                format_amount(entry.total, &wallet.currency)
                            );
                        }
                    }
                }
            }
        }
    }

    Ok(())
}

fn print_buckets(
    title: &str,
    wallet: &Wallet,
    buckets: &[Bucket],
    format: OutputFormat,
) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(buckets)?),
        OutputFormat::Csv => {
            let mut writer = csv::Writer::from_writer(io::stdout());
            writer.write_record(["label", "income", "expense", "net"])?;
            for bucket in buckets {
                writer.write_record([
                    bucket.label.clone(),
                    bucket.income.to_string(),
                    bucket.expense.to_string(),
                    bucket.net().to_string(),
                ])?;
            }
            writer.flush()?;
        }
        OutputFormat::Table => {
            println!("{}: {}", title, wallet.name);
            println!();
            print_bucket_rows(buckets, &wallet.currency);
        }
    }
    Ok(())
}

fn print_bucket_rows(buckets: &[Bucket], currency: &str) {
    println!(
        "{:<10} {:>18} {:>18} {:>18}",
        "PERIOD", "INCOME", "EXPENSE", "NET"
    );
    println!("{}", "-".repeat(67));
    for bucket in buckets {
        println!(
            "{:<10} {:>18} {:>18} {:>18}",
            bucket.label,
            format_amount(bucket.income, currency),
            format_amount(bucket.expense, currency),
            format_amount(bucket.net(), currency)
        );
    }
    let totals = sum_buckets(buckets);
    println!("{}", "-".repeat(67));
    println!(
        "{:<10} {:>18} {:>18} {:>18}",
        "TOTAL",
        format_amount(totals.income, currency),
        format_amount(totals.expense, currency),
        format_amount(totals.net(), currency)
    );
}

fn print_transaction(detail: &TransactionDetail, wallet: &Wallet) {
    let tx = &detail.transaction;
    println!("Transaction: {}", tx.id);
    println!("  Wallet:      {}", wallet.name);
    println!("  Date:        {}", tx.date.format("%Y-%m-%d %H:%M:%S"));
    println!("  Category:    {}", category_label(detail));
    if let Some(category) = &detail.category {
        println!("  Type:        {}", category.category_type);
    }
    println!(
        "  Amount:      {}",
        format_amount(tx.amount, &wallet.currency)
    );
    if let Some(desc) = &tx.description {
        println!("  Description: {}", desc);
    }
}

fn category_label(detail: &TransactionDetail) -> &str {
    detail
        .category
        .as_ref()
        .map(|c| c.name.as_str())
        .unwrap_or("(none)")
}

fn parse_category_type(s: &str) -> Result<CategoryType> {
    CategoryType::from_str(s)
        .with_context(|| format!("Invalid category type '{}'. Use income or expense", s))
}

fn parse_wallet_amount(input: &str, wallet: &Wallet) -> Result<Amount> {
    parse_amount(input, &wallet.currency)
        .with_context(|| format!("Invalid amount '{}' for {}", input, wallet.currency))
}

fn parse_id(id: &str) -> Result<Uuid> {
    Uuid::parse_str(id).context("Invalid transaction ID format (expected UUID)")
}

/// Midnight UTC of the given day, or now when no day was given.
fn timestamp_for(date: Option<NaiveDate>) -> DateTime<Utc> {
    date.map(start_of_day).unwrap_or_else(Utc::now)
}
