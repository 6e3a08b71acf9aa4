//! Result channel helpers for async facade pipelines.
//!
//! Every fallible step returns `Result`; these helpers chain pending results
//! without dropping the failure variant and turn raised store faults into
//! channel failures.

use std::future::Future;

/// Wraps a value in the success variant.
pub fn ok<T, E>(value: T) -> Result<T, E> {
    Ok(value)
}

/// Wraps an error in the failure variant.
pub fn err<T, E>(error: E) -> Result<T, E> {
    Err(error)
}

/// Runs `next` only when `pending` resolves to `Ok`.
///
/// A failure passes through unchanged and `next` is never polled, so the first
/// failure in a chain wins.
pub async fn and_then_async<T, U, E, F, Fut>(
    pending: impl Future<Output = Result<T, E>>,
    next: F,
) -> Result<U, E>
where
    F: FnOnce(T) -> Fut,
    Fut: Future<Output = Result<U, E>>,
{
    match pending.await {
        Ok(value) => next(value).await,
        Err(error) => Err(error),
    }
}

/// Awaits a fallible action and maps its raised fault with `on_fault`.
pub async fn try_async<T, X, E>(
    action: impl Future<Output = Result<T, X>>,
    on_fault: impl FnOnce(X) -> E,
) -> Result<T, E> {
    action.await.map_err(on_fault)
}
