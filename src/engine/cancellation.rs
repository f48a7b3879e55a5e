use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::{MigrationError, MigrationResult};

/// Cooperative cancellation flag shared between the listener and the engine.
/// Checked before each step or remote call, never mid-call.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    pub fn check(&self) -> MigrationResult<()> {
        if self.is_cancelled() {
            Err(MigrationError::Cancelled)
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_state() {
        let token = CancellationToken::new();
        let listener = token.clone();
        assert!(token.check().is_ok());

        listener.cancel();
        assert!(token.is_cancelled());
        assert!(matches!(token.check(), Err(MigrationError::Cancelled)));
    }
}
