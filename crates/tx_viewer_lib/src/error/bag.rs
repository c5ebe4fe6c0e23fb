use thiserror::Error;

use super::{CustomError, TransactionFailedError, WrappedError};

#[derive(Error, Debug)]
pub enum ErrorBag {
    #[error("{0}")]
    CustomError(#[from] CustomError),
    #[error("{0}")]
    TransactionFailedError(#[from] TransactionFailedError),
    #[error("{0}")]
    WrappedError(#[from] WrappedError),
}
