use thiserror::Error;

use crate::domain::{AmountError, TransferId};

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Transfer not found: {0}")]
    NotFound(TransferId),

    #[error("Transfer already exists: {0}")]
    AlreadyExists(TransferId),

    #[error("Invalid amount: {0}")]
    InvalidAmount(#[from] AmountError),

    #[error("Storage unavailable: {0:#}")]
    Unavailable(#[from] anyhow::Error),
}
