use std::time::Duration;

/// Decimal places used for every currency amount.
pub const CURRENCY_SCALE: u32 = 2;

/// Decimal places kept on the progress ratio.
pub const PROGRESS_RATIO_SCALE: u32 = 4;

/// Default confidence below which an extracted field is highlighted.
pub const DEFAULT_CONFIDENCE_THRESHOLD: f64 = 0.6;

/// Default upper bound on a single vision call.
pub const DEFAULT_EXTRACTION_TIMEOUT: Duration = Duration::from_secs(20);

/// Default per-subscriber queue depth for the live sync broadcaster.
pub const DEFAULT_SUBSCRIBER_QUEUE_CAPACITY: usize = 256;

/// How long the broadcaster holds later deltas back while waiting for a
/// missing seq before skipping it and flagging subscribers for resync.
pub const DEFAULT_SEQ_GAP_TIMEOUT: Duration = Duration::from_secs(2);

/// Default number of attempts for a ledger append.
pub const DEFAULT_LEDGER_RETRY_ATTEMPTS: u32 = 3;

/// Default first backoff delay between ledger append attempts.
pub const DEFAULT_LEDGER_RETRY_BASE_DELAY: Duration = Duration::from_millis(50);

/// Backoff ceiling between ledger append attempts.
pub const DEFAULT_LEDGER_RETRY_MAX_DELAY: Duration = Duration::from_secs(2);
