mod bag;
mod custom;
mod wrapped;

pub use bag::ErrorBag;
pub use custom::{CustomError, TransactionFailedError};
pub use wrapped::WrappedError;

use std::fmt::{Display, Formatter};

/// Export macros for creating errors
mod macros;

#[derive(Debug)]
pub struct ViewerError {
    pub inner: ErrorBag,
}

impl ViewerError {
    pub fn new(inner: ErrorBag) -> Self {
        Self { inner }
    }
}

impl Display for ViewerError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.inner)
    }
}

impl std::error::Error for ViewerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.inner)
    }
}
