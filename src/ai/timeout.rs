//! Timeout Helpers
//!
//! Wraps async operations with a deadline and converts expiry into
//! `ExpandError::Timeout`.
//!
//! ## Usage
//!
//! ```ignore
//! use crate::ai::timeout::with_timeout;
//!
//! let result = with_timeout(
//!     Duration::from_secs(60),
//!     async { /* LLM call */ },
//!     "expansion generation"
//! ).await?;
//! ```

use std::future::Future;
use std::time::Duration;

use crate::types::{ExpandError, Result};

/// Execute an async operation with a timeout
///
/// Returns a timeout error if the operation doesn't complete within the specified duration.
pub async fn with_timeout<T, F>(timeout: Duration, future: F, operation_name: &str) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match tokio::time::timeout(timeout, future).await {
        Ok(result) => result,
        Err(_) => Err(ExpandError::timeout(operation_name, timeout)),
    }
}
