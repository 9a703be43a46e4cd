use std::time::Duration;

use crate::constants::{
    DEFAULT_CONFIDENCE_THRESHOLD, DEFAULT_EXTRACTION_TIMEOUT, DEFAULT_SUBSCRIBER_QUEUE_CAPACITY,
};
use crate::errors::{Error, Result};
use crate::ledger::RetryPolicy;

/// Settings consumed by core services. Built by the host from its config so
/// services never read the environment.
#[derive(Debug, Clone, PartialEq)]
pub struct IntakeSettings {
    pub confidence_threshold: f64,
    pub extraction_timeout: Duration,
    pub ledger_retry: RetryPolicy,
    pub subscriber_queue_capacity: usize,
}

impl Default for IntakeSettings {
    fn default() -> Self {
        Self {
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
            extraction_timeout: DEFAULT_EXTRACTION_TIMEOUT,
            ledger_retry: RetryPolicy::default(),
            subscriber_queue_capacity: DEFAULT_SUBSCRIBER_QUEUE_CAPACITY,
        }
    }
}

impl IntakeSettings {
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.confidence_threshold) {
            return Err(Error::InvalidConfigValue(format!(
                "confidence threshold must be within [0, 1], got {}",
                self.confidence_threshold
            )));
        }
        if self.extraction_timeout.is_zero() {
            return Err(Error::InvalidConfigValue(
                "extraction timeout must be greater than zero".to_string(),
            ));
        }
        if self.subscriber_queue_capacity == 0 {
            return Err(Error::InvalidConfigValue(
                "subscriber queue capacity must be at least 1".to_string(),
            ));
        }
        if self.ledger_retry.max_attempts == 0 {
            return Err(Error::InvalidConfigValue(
                "ledger retry attempts must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
