//! Structured logging with correlation tracking for remote calls
//!
//! Every request gets a correlation id so the request, response and retry
//! events of one call can be matched up in the log file.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use log::{debug, warn};
use serde_json::json;

use super::config::MonitoringConfig;

/// Structured logger for API operations with correlation tracking
#[derive(Debug, Clone, Default)]
pub struct ApiLogger {
    config: MonitoringConfig,
}

/// Context for a single API operation
#[derive(Debug, Clone)]
pub struct OperationContext {
    pub correlation_id: String,
    /// HTTP method or a logical operation name
    pub operation_type: String,
    /// Request path or step label
    pub target: String,
    pub start_time: Instant,
}

impl OperationContext {
    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }
}

impl ApiLogger {
    pub fn new(config: MonitoringConfig) -> Self {
        Self { config }
    }

    pub fn start_operation(&self, operation_type: &str, target: &str) -> OperationContext {
        let correlation_id = if self.config.correlation_ids {
            uuid::Uuid::new_v4().to_string()
        } else {
            String::new()
        };

        OperationContext {
            correlation_id,
            operation_type: operation_type.to_string(),
            target: target.to_string(),
            start_time: Instant::now(),
        }
    }

    pub fn log_request(&self, context: &OperationContext, url: &str, headers: &HashMap<String, String>) {
        if !self.config.request_logging {
            return;
        }

        let log_data = json!({
            "event": "http_request",
            "correlation_id": context.correlation_id,
            "method": context.operation_type,
            "url": url,
            "headers": sanitize_headers(headers),
            "timestamp": chrono::Utc::now().to_rfc3339()
        });

        debug!("HTTP Request: {}", log_data);
    }

    pub fn log_response(&self, context: &OperationContext, status_code: u16) {
        if !self.config.request_logging {
            return;
        }

        let log_data = json!({
            "event": "http_response",
            "correlation_id": context.correlation_id,
            "method": context.operation_type,
            "target": context.target,
            "status_code": status_code,
            "duration_ms": context.elapsed().as_millis(),
            "timestamp": chrono::Utc::now().to_rfc3339()
        });

        if status_code >= 400 {
            warn!("HTTP Response (Error): {}", log_data);
        } else {
            debug!("HTTP Response: {}", log_data);
        }
    }

    pub fn log_retry(&self, context: &OperationContext, attempt: u32, error: &str, delay: Duration) {
        let log_data = json!({
            "event": "retry_attempt",
            "correlation_id": context.correlation_id,
            "operation": context.target,
            "attempt": attempt,
            "error": error,
            "delay_ms": delay.as_millis(),
            "timestamp": chrono::Utc::now().to_rfc3339()
        });

        warn!("Retry Attempt: {}", log_data);
    }
}

/// Redact credentials before headers reach the log file
fn sanitize_headers(headers: &HashMap<String, String>) -> HashMap<String, String> {
    headers
        .iter()
        .map(|(key, value)| {
            let key_lower = key.to_lowercase();
            if key_lower.contains("authorization") || key_lower.contains("token") || key_lower.contains("key") {
                (key.clone(), "[REDACTED]".to_string())
            } else {
                (key.clone(), value.clone())
            }
        })
        .collect()
}
