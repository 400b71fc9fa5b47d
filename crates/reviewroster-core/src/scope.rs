use std::future::Future;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::error::{ReviewError, ReviewResult};

/// Cancellation signal plus an optional per-call deadline
///
/// Futures returned by the review service are safe to drop at any await
/// point: each mutation is one atomic store write, so an aborted call leaves
/// either the full effect or none of it.
#[derive(Debug, Clone, Default)]
pub struct OperationScope {
    token: CancellationToken,
    deadline: Option<Duration>,
}

impl OperationScope {
    pub fn new(token: CancellationToken, deadline: Option<Duration>) -> Self {
        Self { token, deadline }
    }

    /// Run `op`, aborting it on cancellation or when the deadline passes
    pub async fn run<F, T>(&self, op: F) -> ReviewResult<T>
    where
        F: Future<Output = ReviewResult<T>>,
    {
        if self.token.is_cancelled() {
            return Err(ReviewError::Cancelled);
        }

        let bounded = async {
            match self.deadline {
                Some(limit) => tokio::time::timeout(limit, op)
                    .await
                    .unwrap_or(Err(ReviewError::DeadlineExceeded)),
                None => op.await,
            }
        };

        tokio::select! {
            _ = self.token.cancelled() => Err(ReviewError::Cancelled),
            result = bounded => result,
        }
    }
}
