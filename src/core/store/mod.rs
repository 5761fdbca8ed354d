//! Balance store implementations and the per-call deadline
//!
//! - `memory` - DashMap-backed store with per-record atomic updates

pub mod memory;

pub use memory::MemoryStore;

use std::future::Future;
use std::time::Duration;

use crate::types::EconomyError;

/// Bound a store call by `deadline`
///
/// A call that does not finish in time fails `Unavailable`. The engine never
/// retries it; retry policy belongs to the caller.
pub async fn within_deadline<T, F>(
    deadline: Duration,
    operation: &'static str,
    call: F,
) -> Result<T, EconomyError>
where
    F: Future<Output = Result<T, EconomyError>>,
{
    match tokio::time::timeout(deadline, call).await {
        Ok(result) => result,
        Err(_) => Err(EconomyError::unavailable(
            operation,
            format!("no answer within {deadline:?}"),
        )),
    }
}
