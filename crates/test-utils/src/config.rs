//! Test configuration helpers.
//!
//! Centralizes the magic values tests need, keeping retry backoff tight so
//! injected-failure tests don't sleep through real backoff schedules.

use std::time::Duration;

use vaultscope_types::{EngineConfig, RetryPolicy, ScanConfig};

/// Returns an engine configuration suitable for tests.
///
/// Uses small values for fast execution:
/// - retry: 3 attempts with 1ms initial backoff
/// - request timeout: 1s (mock reads complete instantly)
/// - scan lookback: 100 blocks
#[must_use]
pub fn test_engine_config() -> EngineConfig {
    EngineConfig {
        vault_registry: Vec::new(),
        scan: ScanConfig { lookback_blocks: 100 },
        request_timeout: Duration::from_secs(1),
        retry_policy: test_retry_policy(),
    }
}

/// Retry policy with millisecond backoff for fast failure-injection tests.
#[must_use]
pub fn test_retry_policy() -> RetryPolicy {
    RetryPolicy {
        max_attempts: 3,
        initial_backoff: Duration::from_millis(1),
        max_backoff: Duration::from_millis(5),
        multiplier: 2.0,
    }
}
