//! Retry policies and structured request logging for remote calls

pub mod config;
pub mod logging;
pub mod retry;

pub use config::{MonitoringConfig, ResilienceConfig, ResilienceConfigBuilder};
pub use logging::{ApiLogger, OperationContext};
pub use retry::{RetryClassifier, RetryConfig, RetryPolicy, RetryableError};
