//! Timeout enforcement.
//!
//! # Responsibilities
//! - Wrap collaborator calls with a deadline
//! - Report an expired deadline as a chain timeout, distinct from RPC errors

use std::future::Future;
use std::time::Duration;
use tokio::time::timeout;

use crate::chain::types::{ChainError, ChainResult};

/// Run `fut`, failing with [`ChainError::Timeout`] once `limit` passes.
pub async fn within<T, F>(limit: Duration, fut: F) -> ChainResult<T>
where
    F: Future<Output = ChainResult<T>>,
{
    match timeout(limit, fut).await {
        Ok(result) => result,
        Err(_) => Err(ChainError::Timeout(limit.as_secs())),
    }
}
