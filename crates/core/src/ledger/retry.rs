//! Bounded retry with exponential backoff for ledger writes.

use std::future::Future;
use std::time::Duration;

use log::warn;

use crate::constants::{
    DEFAULT_LEDGER_RETRY_ATTEMPTS, DEFAULT_LEDGER_RETRY_BASE_DELAY, DEFAULT_LEDGER_RETRY_MAX_DELAY,
};
use crate::errors::{DatabaseError, Error, Result};

/// Classification for retry policy.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RetryClass {
    /// Conflict, closed event, validation or missing record. Retrying won't help.
    Never,
    /// Storage hiccup (busy database, lost connection). Retry after a delay.
    WithBackoff,
}

impl RetryClass {
    pub fn of(error: &Error) -> Self {
        match error {
            Error::Database(
                DatabaseError::ConnectionFailed(_) | DatabaseError::PoolCreationFailed(_),
            ) => RetryClass::WithBackoff,
            Error::Database(
                DatabaseError::QueryFailed(message) | DatabaseError::TransactionFailed(message),
            ) if is_contention(message) => RetryClass::WithBackoff,
            _ => RetryClass::Never,
        }
    }
}

/// SQLite's busy and locked results. Any other query failure is deterministic.
fn is_contention(message: &str) -> bool {
    let message = message.to_ascii_lowercase();
    message.contains("database is locked")
        || message.contains("database table is locked")
        || message.contains("database is busy")
        || message.contains("sqlite_busy")
        || message.contains("sqlite_locked")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_LEDGER_RETRY_ATTEMPTS,
            base_delay: DEFAULT_LEDGER_RETRY_BASE_DELAY,
            max_delay: DEFAULT_LEDGER_RETRY_MAX_DELAY,
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
            ..Self::default()
        }
    }

    /// Delay before attempt `attempt + 1`, doubling from `base_delay`.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 1u32
            .checked_shl(attempt.saturating_sub(1))
            .unwrap_or(u32::MAX);
        self.base_delay
            .checked_mul(factor)
            .unwrap_or(self.max_delay)
            .min(self.max_delay)
    }

    /// Runs `op` until it succeeds, fails terminally, or attempts run out.
    ///
    /// Exhausted transient failures become `Error::LedgerWriteFailure`.
    pub async fn run<T, F, Fut>(&self, operation: &str, mut op: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let max_attempts = self.max_attempts.max(1);
        let mut attempt = 0;
        loop {
            attempt += 1;
            match op().await {
                Ok(value) => return Ok(value),
                Err(e) if RetryClass::of(&e) == RetryClass::Never => return Err(e),
                Err(e) if attempt >= max_attempts => {
                    return Err(Error::LedgerWriteFailure {
                        attempts: attempt,
                        message: e.to_string(),
                    });
                }
                Err(e) => {
                    let delay = self.delay_for(attempt);
                    warn!(
                        "{} failed on attempt {}/{}: {}. Retrying in {:?}",
                        operation, attempt, max_attempts, e, delay
                    );
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn policy(max_attempts: u32) -> RetryPolicy {
        RetryPolicy::new(max_attempts, Duration::from_millis(10))
    }

    #[test]
    fn test_classifies_errors() {
        assert_eq!(
            RetryClass::of(&Error::Database(DatabaseError::QueryFailed(
                "database is locked".into()
            ))),
            RetryClass::WithBackoff
        );
        assert_eq!(
            RetryClass::of(&Error::Database(DatabaseError::ConnectionFailed(
                "timed out waiting for connection".into()
            ))),
            RetryClass::WithBackoff
        );
        assert_eq!(
            RetryClass::of(&Error::ConfirmationConflict("stale".into())),
            RetryClass::Never
        );
        assert_eq!(
            RetryClass::of(&Error::EventClosed("e".into())),
            RetryClass::Never
        );
        assert_eq!(RetryClass::of(&Error::not_found("x")), RetryClass::Never);
        assert_eq!(
            RetryClass::of(&Error::Database(DatabaseError::UniqueViolation("x".into()))),
            RetryClass::Never
        );
    }

    #[test]
    fn test_deterministic_database_errors_are_not_retried() {
        for error in [
            DatabaseError::QueryFailed("CHECK constraint failed: amount > 0".into()),
            DatabaseError::TransactionFailed(
                "cannot start a transaction within a transaction".into(),
            ),
            DatabaseError::Internal("writer returned an unexpected result type".into()),
            DatabaseError::Internal("column amount: invalid decimal".into()),
        ] {
            assert_eq!(RetryClass::of(&Error::Database(error)), RetryClass::Never);
        }
    }

    #[tokio::test]
    async fn test_internal_error_surfaces_without_backoff() {
        let calls = AtomicU32::new(0);
        let result: Result<()> = policy(5)
            .run("append", || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(Error::Database(DatabaseError::Internal("corrupt row".into()))) }
            })
            .await;
        assert!(matches!(
            result,
            Err(Error::Database(DatabaseError::Internal(_)))
        ));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_delay_doubles_and_caps() {
        let p = RetryPolicy {
            max_attempts: 10,
            base_delay: Duration::from_millis(50),
            max_delay: Duration::from_millis(300),
        };
        assert_eq!(p.delay_for(1), Duration::from_millis(50));
        assert_eq!(p.delay_for(2), Duration::from_millis(100));
        assert_eq!(p.delay_for(3), Duration::from_millis(200));
        assert_eq!(p.delay_for(4), Duration::from_millis(300));
        assert_eq!(p.delay_for(40), Duration::from_millis(300));
    }

    #[tokio::test(start_paused = true)]
    async fn test_retries_transient_then_succeeds() {
        let calls = AtomicU32::new(0);
        let result = policy(3)
            .run("append", || {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                async move {
                    if n == 0 {
                        Err(Error::Database(DatabaseError::QueryFailed(
                            "database is locked".into(),
                        )))
                    } else {
                        Ok(7)
                    }
                }
            })
            .await;
        assert_eq!(result.unwrap(), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhausted_retries_become_ledger_write_failure() {
        let calls = AtomicU32::new(0);
        let result: Result<()> = policy(3)
            .run("append", || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(Error::Database(DatabaseError::ConnectionFailed("gone".into()))) }
            })
            .await;
        assert!(matches!(
            result,
            Err(Error::LedgerWriteFailure { attempts: 3, .. })
        ));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_terminal_errors_are_not_retried() {
        let calls = AtomicU32::new(0);
        let result: Result<()> = policy(5)
            .run("append", || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(Error::ConfirmationConflict("already confirmed".into())) }
            })
            .await;
        assert!(matches!(result, Err(Error::ConfirmationConflict(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
