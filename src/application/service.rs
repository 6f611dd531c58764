use std::path::Path;

use chrono::NaiveDateTime;
use rust_decimal::Decimal;

use crate::domain::{
    ensure_storable, from_cents, to_cents, Transfer, TransferDetails, TransferId, TransferKind,
};
use crate::storage::Repository;

use super::AppError;

/// Application service providing the ledger operations.
/// This is the primary interface for any client (MCP tools, CLI, tests).
///
/// Arguments are validated before the repository is touched, so a rejected call never
/// writes anything.
#[derive(Clone)]
pub struct LedgerService {
    repo: Repository,
}

impl LedgerService {
    /// Create a new ledger service with the given repository.
    pub fn new(repo: Repository) -> Self {
        Self { repo }
    }

    /// Open (or create) the database at the given path and apply pending migrations.
    pub async fn init(database_path: impl AsRef<Path>) -> Result<Self, AppError> {
        let repo = Repository::init(database_path).await?;
        Ok(Self::new(repo))
    }

    pub fn repository(&self) -> &Repository {
        &self.repo
    }

    /// Record a new income or expense. `kind` is matched case-insensitively.
    pub async fn add_transfer(
        &self,
        amount: Decimal,
        occurred_at: NaiveDateTime,
        note: String,
        kind: &str,
    ) -> Result<Transfer, AppError> {
        let details = validate_details(amount, occurred_at, note, kind)?;
        let transfer = Transfer::new(details);

        let stored = self.repo.insert(&transfer).await?;
        tracing::debug!(id = %stored.id, "transfer inserted");
        Ok(stored)
    }

    /// Replace all value fields of an existing transfer. The id never changes.
    pub async fn update_transfer(
        &self,
        id: TransferId,
        amount: Decimal,
        occurred_at: NaiveDateTime,
        note: String,
        kind: &str,
    ) -> Result<Transfer, AppError> {
        let details = validate_details(amount, occurred_at, note, kind)?;

        let stored = self.repo.replace(&Transfer::with_id(id, details)).await?;
        tracing::debug!(id = %stored.id, "transfer replaced");
        Ok(stored)
    }

    /// Permanently delete a transfer.
    pub async fn delete_transfer(&self, id: TransferId) -> Result<(), AppError> {
        self.repo.delete(id).await?;
        tracing::debug!(%id, "transfer deleted");
        Ok(())
    }

    /// Get a single transfer by id.
    pub async fn get_transfer(&self, id: TransferId) -> Result<Transfer, AppError> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or(AppError::TransferNotFound(id))
    }

    /// List transfers with `from <= date <= to`. An inverted range is rejected.
    pub async fn get_transfers_in_range(
        &self,
        from: NaiveDateTime,
        to: NaiveDateTime,
    ) -> Result<Vec<Transfer>, AppError> {
        let from = ensure_storable(from)?;
        let to = ensure_storable(to)?;
        if from > to {
            return Err(AppError::InvalidArgument(format!(
                "range start {from} is after range end {to}"
            )));
        }

        Ok(self.repo.query_range(from, to).await?)
    }
}

fn validate_details(
    amount: Decimal,
    occurred_at: NaiveDateTime,
    note: String,
    kind: &str,
) -> Result<TransferDetails, AppError> {
    let kind = TransferKind::from_str(kind).ok_or_else(|| {
        AppError::InvalidArgument(format!(
            "Invalid transfer type: {kind}. Valid types are 'Income' and 'Expense'."
        ))
    })?;
    let occurred_at = ensure_storable(occurred_at)?;
    let amount = to_cents(amount)
        .map(from_cents)
        .map_err(|err| AppError::InvalidArgument(format!("{err}: {amount}")))?;

    Ok(TransferDetails {
        amount,
        occurred_at,
        note,
        kind,
    })
}
