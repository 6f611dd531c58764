use thiserror::Error;

use crate::domain::{DateTimeError, TransferId};
use crate::storage::StoreError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Transfer with id {0} not found")]
    TransferNotFound(TransferId),

    #[error("Storage unavailable: {0:#}")]
    StorageUnavailable(anyhow::Error),
}

impl AppError {
    /// Stable name of the error kind, reported to tool callers.
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::InvalidArgument(_) => "InvalidArgument",
            AppError::TransferNotFound(_) => "NotFound",
            AppError::StorageUnavailable(_) => "StorageUnavailable",
        }
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(id) => AppError::TransferNotFound(id),
            StoreError::AlreadyExists(id) => {
                AppError::InvalidArgument(format!("transfer {id} already exists"))
            }
            StoreError::InvalidAmount(err) => AppError::InvalidArgument(err.to_string()),
            StoreError::Unavailable(err) => AppError::StorageUnavailable(err),
        }
    }
}

impl From<DateTimeError> for AppError {
    fn from(err: DateTimeError) -> Self {
        AppError::InvalidArgument(err.to_string())
    }
}
