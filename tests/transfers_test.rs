mod common;

use anyhow::Result;
use common::{Household, day, parse_date, test_service};
use dompet::application::{AppError, TransactionFilter};
use dompet::domain::{
    CategoryType, PeriodType, TRANSFER_IN_CATEGORY, TRANSFER_OUT_CATEGORY, TransferError,
    WalletTransfer,
};

#[tokio::test]
async fn test_transfer_books_expense_and_income() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let household = Household::create_with_january(&service).await?;
    let savings = service.create_wallet("Savings".into(), "IDR".into()).await?;

    let result = service
        .transfer(
            Household::NAME,
            "Savings",
            WalletTransfer::new(1_000_000, parse_date("2024-01-20")),
        )
        .await?;
    assert_eq!(result.from_wallet_name, "Household");
    assert_eq!(result.to_wallet_name, "Savings");
    assert_eq!(result.outgoing.wallet_id, household.id);
    assert_eq!(result.incoming.wallet_id, savings.id);
    assert_eq!(
        result.outgoing.description.as_deref(),
        Some("Transfer to Savings")
    );
    assert_eq!(
        result.incoming.description.as_deref(),
        Some("Transfer from Household")
    );

    let out_category = service
        .get_category(household.id, TRANSFER_OUT_CATEGORY)
        .await?;
    assert_eq!(out_category.category_type, CategoryType::Expense);
    let in_category = service.get_category(savings.id, TRANSFER_IN_CATEGORY).await?;
    assert_eq!(in_category.category_type, CategoryType::Income);

    let reports = service.reports();
    assert_eq!(reports.wallet_balance(household.id).await?, 3_950_000);
    assert_eq!(reports.wallet_balance(savings.id).await?, 1_000_000);

    // The transfer counts as ordinary expense in the source wallet's reports
    let mtd = reports
        .period_report(household.id, PeriodType::Mtd, day("2024-01-31"))
        .await?;
    assert_eq!(mtd.expense, 1_050_000);

    Ok(())
}

#[tokio::test]
async fn test_repeated_transfers_reuse_categories() -> Result<()> {
    let (service, _temp) = test_service().await?;
    Household::create_with_january(&service).await?;
    service.create_wallet("Savings".into(), "IDR".into()).await?;

    for amount in [100_000, 200_000] {
        service
            .transfer(
                Household::NAME,
                "Savings",
                WalletTransfer::new(amount, parse_date("2024-01-21")).with_description("Saving"),
            )
            .await?;
    }

    let categories = service.list_categories("Savings").await?;
    assert_eq!(categories.len(), 1);

    let incoming = service
        .list_transactions("Savings", TransactionFilter::default())
        .await?;
    assert_eq!(incoming.len(), 2);
    assert!(
        incoming
            .iter()
            .all(|d| d.transaction.description.as_deref() == Some("Saving"))
    );

    Ok(())
}

#[tokio::test]
async fn test_transfer_validation() -> Result<()> {
    let (service, _temp) = test_service().await?;
    Household::create(&service).await?;
    service.create_wallet("Travel".into(), "EUR".into()).await?;
    let date = parse_date("2024-01-20");

    let same = service
        .transfer(Household::NAME, Household::NAME, WalletTransfer::new(10, date))
        .await;
    assert!(matches!(
        same,
        Err(AppError::InvalidTransfer(TransferError::SameWallet))
    ));

    let currency = service
        .transfer(Household::NAME, "Travel", WalletTransfer::new(10, date))
        .await;
    assert!(matches!(
        currency,
        Err(AppError::InvalidTransfer(TransferError::CurrencyMismatch { .. }))
    ));

    let missing = service
        .transfer(Household::NAME, "Nowhere", WalletTransfer::new(10, date))
        .await;
    assert!(matches!(missing, Err(AppError::WalletNotFound(_))));

    // Nothing was booked by the failed attempts
    let categories = service.list_categories(Household::NAME).await?;
    assert!(categories.iter().all(|c| c.name != TRANSFER_OUT_CATEGORY));

    Ok(())
}

#[tokio::test]
async fn test_transfer_rejects_clashing_category() -> Result<()> {
    let (service, _temp) = test_service().await?;
    Household::create(&service).await?;
    service.create_wallet("Savings".into(), "IDR".into()).await?;
    // An income category squatting on the outgoing name
    service
        .create_category(
            Household::NAME,
            TRANSFER_OUT_CATEGORY.into(),
            CategoryType::Income,
        )
        .await?;

    let result = service
        .transfer(
            Household::NAME,
            "Savings",
            WalletTransfer::new(10, parse_date("2024-01-20")),
        )
        .await;
    assert!(matches!(result, Err(AppError::CategoryAlreadyExists(_))));

    Ok(())
}

#[tokio::test]
async fn test_destination_clash_creates_no_source_category() -> Result<()> {
    let (service, _temp) = test_service().await?;
    Household::create(&service).await?;
    service.create_wallet("Savings".into(), "IDR".into()).await?;
    // An expense category squatting on the incoming name
    service
        .create_category("Savings", TRANSFER_IN_CATEGORY.into(), CategoryType::Expense)
        .await?;

    let result = service
        .transfer(
            Household::NAME,
            "Savings",
            WalletTransfer::new(10, parse_date("2024-01-20")),
        )
        .await;
    assert!(matches!(result, Err(AppError::CategoryAlreadyExists(_))));

    let categories = service.list_categories(Household::NAME).await?;
    assert!(categories.iter().all(|c| c.name != TRANSFER_OUT_CATEGORY));
    let savings = service.list_categories("Savings").await?;
    assert_eq!(savings.len(), 1);

    Ok(())
}
