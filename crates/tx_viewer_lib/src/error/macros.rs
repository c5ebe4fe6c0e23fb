/// Wraps any value convertible into [`ErrorBag`](crate::error::ErrorBag).
#[macro_export]
macro_rules! err_create {
    ($t:expr) => {
        $crate::error::ViewerError::new($crate::error::ErrorBag::from($t))
    };
}

/// Builds a [`CustomError`](crate::error::CustomError) from format arguments.
#[macro_export]
macro_rules! err_custom_create {
    ($($t:tt)*) => {
        $crate::error::ViewerError::new($crate::error::ErrorBag::CustomError(
            $crate::error::CustomError::new(&format!($($t)*)),
        ))
    };
}

/// Closure for `map_err` wrapping third-party errors.
#[macro_export]
macro_rules! err_from {
    () => {
        |e| {
            $crate::error::ViewerError::new($crate::error::ErrorBag::WrappedError(
                $crate::error::WrappedError::from(e),
            ))
        }
    };
}
