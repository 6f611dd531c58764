mod common;

use anyhow::Result;
use common::{add_expense, add_income, amount, date, test_service};
use finledger::application::{AppError, LedgerService};
use finledger::domain::TransferKind;
use std::collections::HashSet;
use uuid::Uuid;

#[tokio::test]
async fn test_add_then_fetch_returns_equal_record() -> Result<()> {
    let (service, _temp) = test_service().await?;

    let created = service
        .add_transfer(amount("50.00"), date("2024-01-10"), "Rent".into(), "Expense")
        .await?;

    assert!(!created.id.is_nil());
    assert_eq!(created.amount, amount("50.00"));
    assert_eq!(created.amount.to_string(), "50.00");
    assert_eq!(created.kind, TransferKind::Expense);
    assert_eq!(created.note, "Rent");
    assert_eq!(created.occurred_at, date("2024-01-10"));

    let fetched = service.get_transfer(created.id).await?;
    assert_eq!(fetched, created);

    Ok(())
}

#[tokio::test]
async fn test_rent_round_trip_scenario() -> Result<()> {
    let (service, _temp) = test_service().await?;

    let created = service
        .add_transfer(amount("50.00"), date("2024-01-10"), "Rent".into(), "Expense")
        .await?;

    let updated = service
        .update_transfer(
            created.id,
            amount("55.00"),
            date("2024-01-11"),
            "Rent (late fee)".into(),
            "Expense",
        )
        .await?;
    assert_eq!(updated.id, created.id);

    let fetched = service.get_transfer(created.id).await?;
    assert_eq!(fetched.id, created.id);
    assert_eq!(fetched.amount.to_string(), "55.00");
    assert_eq!(fetched.occurred_at, date("2024-01-11"));
    assert_eq!(fetched.note, "Rent (late fee)");
    assert_eq!(fetched.kind, TransferKind::Expense);

    service.delete_transfer(created.id).await?;

    let err = service
        .update_transfer(
            created.id,
            amount("60.00"),
            date("2024-01-12"),
            "Rent".into(),
            "Expense",
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::TransferNotFound(id) if id == created.id));

    Ok(())
}

#[tokio::test]
async fn test_update_replaces_every_field() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let created = add_expense(&service, "12.30", "2024-03-01T08:15:00", "Lunch").await?;

    let updated = service
        .update_transfer(
            created.id,
            amount("1500"),
            date("2024-03-31T17:00:00"),
            String::new(),
            "income",
        )
        .await?;

    let fetched = service.get_transfer(created.id).await?;
    assert_eq!(fetched, updated);
    assert_eq!(fetched.amount.to_string(), "1500.00");
    assert_eq!(fetched.occurred_at, date("2024-03-31T17:00:00"));
    assert_eq!(fetched.note, "");
    assert_eq!(fetched.kind, TransferKind::Income);

    Ok(())
}

#[tokio::test]
async fn test_operations_on_deleted_id_fail_with_not_found() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let created = add_income(&service, "100", "2024-01-01", "Gift").await?;

    service.delete_transfer(created.id).await?;

    assert!(matches!(
        service.delete_transfer(created.id).await,
        Err(AppError::TransferNotFound(_))
    ));
    assert!(matches!(
        service.get_transfer(created.id).await,
        Err(AppError::TransferNotFound(_))
    ));
    assert!(matches!(
        service
            .update_transfer(created.id, amount("1"), date("2024-01-01"), "x".into(), "Income")
            .await,
        Err(AppError::TransferNotFound(_))
    ));

    Ok(())
}

#[tokio::test]
async fn test_unknown_id_is_not_found() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let id = Uuid::new_v4();

    let err = service.delete_transfer(id).await.unwrap_err();
    assert_eq!(err.kind(), "NotFound");
    assert_eq!(err.to_string(), format!("Transfer with id {id} not found"));

    Ok(())
}

#[tokio::test]
async fn test_kind_is_case_insensitive() -> Result<()> {
    let (service, _temp) = test_service().await?;

    for kind in ["income", "Income", "INCOME"] {
        let created = service
            .add_transfer(amount("1"), date("2024-01-01"), kind.into(), kind)
            .await?;
        assert_eq!(created.kind, TransferKind::Income);
    }
    for kind in ["expense", "Expense", "EXPENSE"] {
        let created = service
            .add_transfer(amount("1"), date("2024-01-01"), kind.into(), kind)
            .await?;
        assert_eq!(created.kind, TransferKind::Expense);
    }

    Ok(())
}

#[tokio::test]
async fn test_invalid_kind_is_rejected_before_any_write() -> Result<()> {
    let (service, _temp) = test_service().await?;

    for kind in ["", "Transfer", "incomes", "0"] {
        let err = service
            .add_transfer(amount("10"), date("2024-01-01"), "x".into(), kind)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidArgument(_)), "kind {kind:?}");
    }
    assert_eq!(service.repository().count().await?, 0);

    Ok(())
}

#[tokio::test]
async fn test_invalid_kind_on_update_leaves_record_untouched() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let created = add_expense(&service, "20", "2024-01-01", "Books").await?;

    let err = service
        .update_transfer(created.id, amount("99"), date("2024-02-02"), "changed".into(), "refund")
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "InvalidArgument");

    assert_eq!(service.get_transfer(created.id).await?, created);
    Ok(())
}

#[tokio::test]
async fn test_negative_amount_is_rejected() -> Result<()> {
    let (service, _temp) = test_service().await?;

    let err = service
        .add_transfer(amount("-5.00"), date("2024-01-01"), "Refund".into(), "Income")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidArgument(_)));
    assert_eq!(service.repository().count().await?, 0);

    Ok(())
}

#[tokio::test]
async fn test_amount_is_kept_to_two_decimals() -> Result<()> {
    let (service, _temp) = test_service().await?;

    let created = add_expense(&service, "0.1", "2024-01-01", "Stamp").await?;
    assert_eq!(created.amount.to_string(), "0.10");

    let rounded = add_expense(&service, "19.995", "2024-01-01", "Rounded").await?;
    assert_eq!(rounded.amount.to_string(), "20.00");
    assert_eq!(service.get_transfer(rounded.id).await?.amount, amount("20.00"));

    Ok(())
}

#[tokio::test]
async fn test_ids_are_unique() -> Result<()> {
    let (service, _temp) = test_service().await?;

    let mut ids = HashSet::new();
    for i in 0..50 {
        let created = add_expense(&service, "1", "2024-01-01", &format!("#{i}")).await?;
        assert!(ids.insert(created.id));
    }

    Ok(())
}

#[tokio::test]
async fn test_data_survives_reopen() -> Result<()> {
    let (service, temp) = test_service().await?;
    let created = add_income(&service, "2500.00", "2024-01-31T09:00:00", "Salary").await?;
    service.repository().close().await;

    let reopened = LedgerService::init(temp.path().join("test.db")).await?;
    assert_eq!(reopened.get_transfer(created.id).await?, created);

    Ok(())
}

#[tokio::test]
async fn test_closed_store_reports_storage_unavailable() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let created = add_expense(&service, "10", "2024-01-10", "Before close").await?;
    service.repository().close().await;

    let errors = [
        add_expense(&service, "5", "2024-01-11", "After close")
            .await
            .unwrap_err()
            .downcast::<AppError>()?,
        service.get_transfer(created.id).await.unwrap_err(),
        service
            .update_transfer(created.id, amount("1"), date("2024-01-12"), "x".into(), "Income")
            .await
            .unwrap_err(),
        service.delete_transfer(created.id).await.unwrap_err(),
        service
            .get_transfers_in_range(date("2024-01-01"), date("2024-01-31"))
            .await
            .unwrap_err(),
    ];

    for err in errors {
        assert!(matches!(err, AppError::StorageUnavailable(_)), "{err}");
        assert_eq!(err.kind(), "StorageUnavailable");
        assert!(err.to_string().starts_with("Storage unavailable:"), "{err}");
    }

    Ok(())
}
