//! Resilience configuration with builder pattern

use std::time::Duration;

use super::retry::{RetryClassifier, RetryConfig};

/// Retry and request-logging settings for remote calls
#[derive(Debug, Clone, Default)]
pub struct ResilienceConfig {
    pub retry: RetryConfig,
    pub classifier: RetryClassifier,
    pub monitoring: MonitoringConfig,
}

#[derive(Debug, Clone)]
pub struct MonitoringConfig {
    pub correlation_ids: bool,
    pub request_logging: bool,
}

impl Default for MonitoringConfig {
    fn default() -> Self {
        Self {
            correlation_ids: true,
            request_logging: true,
        }
    }
}

impl ResilienceConfig {
    pub fn builder() -> ResilienceConfigBuilder {
        ResilienceConfigBuilder::new()
    }

    /// No retries, no request logging
    pub fn disabled() -> Self {
        Self {
            retry: RetryConfig::disabled(),
            classifier: RetryClassifier::default(),
            monitoring: MonitoringConfig {
                correlation_ids: false,
                request_logging: false,
            },
        }
    }
}

#[derive(Debug, Default)]
pub struct ResilienceConfigBuilder {
    config: ResilienceConfig,
}

impl ResilienceConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Retries on top of the first attempt
    pub fn max_retries(mut self, retries: u32) -> Self {
        self.config.retry.max_attempts = retries + 1;
        self
    }

    pub fn base_delay(mut self, delay: Duration) -> Self {
        self.config.retry.base_delay = delay;
        self
    }

    pub fn enable_retries(mut self, enabled: bool) -> Self {
        if !enabled {
            self.config.retry = RetryConfig::disabled();
        }
        self
    }

    pub fn retry_server_errors(mut self, enabled: bool) -> Self {
        self.config.classifier.retry_server_errors = enabled;
        self
    }

    pub fn retry_rate_limited(mut self, enabled: bool) -> Self {
        self.config.classifier.retry_rate_limited = enabled;
        self
    }

    pub fn request_logging(mut self, enabled: bool) -> Self {
        self.config.monitoring.request_logging = enabled;
        self
    }

    pub fn build(self) -> ResilienceConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ResilienceConfig::default();

        assert_eq!(config.retry.max_attempts, 4);
        assert!(!config.classifier.retry_server_errors);
        assert!(config.monitoring.correlation_ids);
    }

    #[test]
    fn test_builder_pattern() {
        let config = ResilienceConfig::builder()
            .max_retries(5)
            .base_delay(Duration::from_millis(250))
            .retry_server_errors(true)
            .build();

        assert_eq!(config.retry.max_attempts, 6);
        assert_eq!(config.retry.base_delay, Duration::from_millis(250));
        assert!(config.classifier.retry_server_errors);
        assert!(!config.classifier.retry_rate_limited);
    }

    #[test]
    fn test_disabling_retries_wins_over_retry_count() {
        let config = ResilienceConfig::builder().max_retries(5).enable_retries(false).build();
        assert_eq!(config.retry.max_attempts, 1);
    }
}
