//! Task runner wrapped around every export/import step

pub mod cancellation;

use std::future::Future;

use log::debug;

pub use cancellation::CancellationToken;

use crate::api::{ApiResult, RetryPolicy};
use crate::error::MigrationResult;

/// Runs steps and remote calls with cancellation checks and verbose logging.
/// Remote calls are additionally retried according to the retry policy.
#[derive(Debug, Clone)]
pub struct Engine {
    cancellation: CancellationToken,
    retry: RetryPolicy,
}

impl Engine {
    pub fn new(cancellation: CancellationToken, retry: RetryPolicy) -> Self {
        Self { cancellation, retry }
    }

    /// No retries, a fresh token
    pub fn without_retries() -> Self {
        Self::new(CancellationToken::new(), RetryPolicy::disabled())
    }

    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancellation
    }

    /// Run a composite step. The future is not polled once cancellation is requested.
    pub async fn step<T, Fut>(&self, label: &str, step: Fut) -> MigrationResult<T>
    where
        Fut: Future<Output = MigrationResult<T>>,
    {
        self.cancellation.check()?;
        debug!("Begin step '{}'.", label);
        let result = step.await?;
        debug!("Finished step '{}'.", label);
        Ok(result)
    }

    /// Run a single remote call, retrying transient failures
    pub async fn call<T, F, Fut>(&self, label: &str, operation: F) -> MigrationResult<T>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = ApiResult<T>>,
    {
        self.cancellation.check()?;
        debug!("Begin step '{}'.", label);
        let result = self
            .retry
            .execute(label, || self.cancellation.check(), operation)
            .await?;
        debug!("Finished step '{}'.", label);
        Ok(result)
    }
}
