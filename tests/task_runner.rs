use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::time::Duration;

use process_migrator::api::{ApiError, RetryClassifier, RetryConfig, RetryPolicy};
use process_migrator::engine::{CancellationToken, Engine};
use process_migrator::error::MigrationError;

fn engine(max_retries: u32, classifier: RetryClassifier) -> Engine {
    let config = RetryConfig {
        jitter: false,
        ..RetryConfig::with_retries(max_retries, Duration::ZERO)
    };
    Engine::new(CancellationToken::new(), RetryPolicy::new(config, classifier))
}

#[tokio::test]
async fn test_connection_failures_are_retried() {
    let engine = engine(3, RetryClassifier::default());
    let attempts = AtomicU32::new(0);

    let result = engine
        .call("Get fields", || {
            let attempt = attempts.fetch_add(1, Ordering::SeqCst);
            async move {
                if attempt < 2 {
                    Err(ApiError::Connection("connection reset".to_string()))
                } else {
                    Ok(42)
                }
            }
        })
        .await;

    assert_eq!(result.unwrap(), 42);
    assert_eq!(attempts.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_client_errors_are_not_retried() {
    let engine = engine(3, RetryClassifier::default());
    let attempts = AtomicU32::new(0);

    let result: Result<(), _> = engine
        .call("Get process", || {
            attempts.fetch_add(1, Ordering::SeqCst);
            async { Err(ApiError::status(404, "Process not found")) }
        })
        .await;

    assert!(matches!(result, Err(MigrationError::Api(ApiError::Status { status: 404, .. }))));
    assert_eq!(attempts.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_last_error_is_returned_when_attempts_run_out() {
    let engine = engine(2, RetryClassifier::default());
    let attempts = AtomicU32::new(0);

    let result: Result<(), _> = engine
        .call("Create field", || {
            let attempt = attempts.fetch_add(1, Ordering::SeqCst) + 1;
            async move { Err(ApiError::Timeout(format!("attempt {}", attempt))) }
        })
        .await;

    assert_eq!(attempts.load(Ordering::SeqCst), 3);
    match result {
        Err(MigrationError::Api(ApiError::Timeout(message))) => assert_eq!(message, "attempt 3"),
        other => panic!("unexpected result: {:?}", other),
    }
}

#[tokio::test]
async fn test_server_errors_are_retried_only_when_enabled() {
    let attempts = AtomicU32::new(0);
    let failing = || {
        attempts.fetch_add(1, Ordering::SeqCst);
        async { Err::<(), _>(ApiError::status(503, "Service unavailable")) }
    };

    let _ = engine(2, RetryClassifier::default()).call("Get rules", failing).await;
    assert_eq!(attempts.load(Ordering::SeqCst), 1);

    attempts.store(0, Ordering::SeqCst);
    let classifier = RetryClassifier {
        retry_server_errors: true,
        ..Default::default()
    };
    let _ = engine(2, classifier).call("Get rules", failing).await;
    assert_eq!(attempts.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_cancellation_is_checked_before_every_attempt() {
    let engine = engine(5, RetryClassifier::default());
    let token = engine.cancellation().clone();
    let attempts = AtomicU32::new(0);

    let result: Result<(), _> = engine
        .call("Create behavior", || {
            attempts.fetch_add(1, Ordering::SeqCst);
            token.cancel();
            async { Err(ApiError::Connection("connection refused".to_string())) }
        })
        .await;

    assert!(matches!(result, Err(MigrationError::Cancelled)));
    assert_eq!(attempts.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_cancelled_step_is_never_polled() {
    let engine = Engine::without_retries();
    engine.cancellation().cancel();
    let polled = AtomicBool::new(false);

    let result = engine
        .step("Import fields on target account", async {
            polled.store(true, Ordering::SeqCst);
            Ok(())
        })
        .await;

    assert!(matches!(result, Err(MigrationError::Cancelled)));
    assert!(!polled.load(Ordering::SeqCst));
}

#[tokio::test]
async fn test_step_errors_pass_through_unchanged() {
    let engine = Engine::without_retries();

    let result: Result<(), _> = engine
        .step("Import rules on target process", async {
            Err(MigrationError::Import("Unable to create rule".to_string()))
        })
        .await;

    match result {
        Err(MigrationError::Import(message)) => assert_eq!(message, "Unable to create rule"),
        other => panic!("unexpected result: {:?}", other),
    }
}

#[tokio::test]
async fn test_cancellation_token_is_shared_between_clones() {
    let token = CancellationToken::new();
    let engine = Engine::new(token.clone(), RetryPolicy::disabled());
    assert!(!engine.cancellation().is_cancelled());

    token.cancel();
    assert!(engine.clone().cancellation().is_cancelled());
}
