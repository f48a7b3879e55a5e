//! Retry policies with exponential backoff
//!
//! Transient failures of remote calls are retried with exponential backoff and
//! jitter. Which failures count as transient is decided by a [`RetryClassifier`].

use std::future::Future;
use std::time::Duration;

use log::{debug, info};
use rand::Rng;

use super::logging::ApiLogger;
use crate::api::error::ApiError;

/// Configuration for retry behavior
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Total attempts including the first one
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
    pub backoff_multiplier: f64,
    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 4,
            base_delay: Duration::from_millis(1000),
            max_delay: Duration::from_secs(30),
            backoff_multiplier: 2.0,
            jitter: true,
        }
    }
}

impl RetryConfig {
    /// `max_retries` retries on top of the first attempt
    pub fn with_retries(max_retries: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts: max_retries + 1,
            base_delay,
            ..Self::default()
        }
    }

    /// Single attempt, no waiting
    pub fn disabled() -> Self {
        Self {
            max_attempts: 1,
            base_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
            backoff_multiplier: 1.0,
            jitter: false,
        }
    }
}

/// Types of errors and their retry behavior
#[derive(Debug, Clone, PartialEq)]
pub enum RetryableError {
    /// Connection refused/reset, DNS
    Network,
    /// HTTP 5xx server errors
    ServerError(u16),
    /// HTTP 429 Too Many Requests
    RateLimited,
    /// Client or HTTP 408 timeout
    Timeout,
    /// Non-retryable client errors (4xx except 401, 403, 408, 429)
    ClientError(u16),
    /// HTTP 401/403
    AuthError,
    Unknown,
}

impl RetryableError {
    /// Classify an HTTP status code into retry behavior
    pub fn from_status_code(status: u16) -> Self {
        match status {
            401 | 403 => RetryableError::AuthError,
            408 => RetryableError::Timeout,
            429 => RetryableError::RateLimited,
            400..=499 => RetryableError::ClientError(status),
            500..=599 => RetryableError::ServerError(status),
            _ => RetryableError::Unknown,
        }
    }

    pub fn from_api_error(error: &ApiError) -> Self {
        match error {
            ApiError::Connection(_) => RetryableError::Network,
            ApiError::Timeout(_) => RetryableError::Timeout,
            ApiError::Status { status, .. } => Self::from_status_code(*status),
            ApiError::Decode(_) | ApiError::Other(_) => RetryableError::Unknown,
        }
    }
}

/// Decides which error kinds are worth another attempt.
///
/// Network failures and timeouts always are. Server errors and throttling are
/// opt-in: a 5xx on a create call may mean the artifact was created anyway.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RetryClassifier {
    pub retry_server_errors: bool,
    pub retry_rate_limited: bool,
}

impl RetryClassifier {
    pub fn should_retry(&self, kind: &RetryableError) -> bool {
        match kind {
            RetryableError::Network | RetryableError::Timeout => true,
            RetryableError::ServerError(_) => self.retry_server_errors,
            RetryableError::RateLimited => self.retry_rate_limited,
            RetryableError::ClientError(_) | RetryableError::AuthError | RetryableError::Unknown => false,
        }
    }

    pub fn is_retryable(&self, error: &ApiError) -> bool {
        self.should_retry(&RetryableError::from_api_error(error))
    }
}

/// Retry policy that implements exponential backoff with jitter
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    config: RetryConfig,
    classifier: RetryClassifier,
    logger: ApiLogger,
}

impl RetryPolicy {
    pub fn new(config: RetryConfig, classifier: RetryClassifier) -> Self {
        Self {
            config,
            classifier,
            logger: ApiLogger::default(),
        }
    }

    pub fn disabled() -> Self {
        Self::new(RetryConfig::disabled(), RetryClassifier::default())
    }

    /// Run `operation` until it succeeds, fails with a non-retryable error or
    /// runs out of attempts. `before_attempt` runs ahead of every attempt and
    /// aborts the loop when it fails. The last error is returned unchanged.
    pub async fn execute<F, Fut, T, G, E>(&self, label: &str, mut before_attempt: G, operation: F) -> Result<T, E>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T, ApiError>>,
        G: FnMut() -> Result<(), E>,
        E: From<ApiError>,
    {
        let context = self.logger.start_operation("call", label);
        let max_attempts = self.config.max_attempts.max(1);
        let mut attempt = 1;

        loop {
            before_attempt()?;

            match operation().await {
                Ok(result) => {
                    if attempt > 1 {
                        info!("'{}' succeeded after {} attempts", label, attempt);
                    }
                    return Ok(result);
                }
                Err(error) => {
                    if attempt >= max_attempts || !self.classifier.is_retryable(&error) {
                        return Err(error.into());
                    }

                    let delay = self.calculate_delay(attempt);
                    self.logger.log_retry(&context, attempt, &error.to_string(), delay);
                    debug!("Waiting {:?} before retrying '{}'", delay, label);
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }

    /// Calculate exponential backoff delay with optional jitter
    fn calculate_delay(&self, attempt: u32) -> Duration {
        let delay_ms = (self.config.base_delay.as_millis() as f64)
            * self.config.backoff_multiplier.powi(attempt as i32 - 1);

        let mut delay = Duration::from_millis(delay_ms as u64).min(self.config.max_delay);

        if self.config.jitter {
            let jitter_factor = rand::thread_rng().gen_range(0.5..=1.5);
            delay = Duration::from_millis((delay.as_millis() as f64 * jitter_factor) as u64);
        }

        delay
    }
}
