//! Explicit configuration objects.
//!
//! Everything the source environment kept as ambient globals (chain id, RPC
//! endpoints, contract registry) is an explicit value here, constructed once
//! and passed in. Two engines over different networks, or over test
//! fixtures, can coexist in one process.

use std::time::Duration;

use alloy_primitives::Address;
use snafu::{ensure, Snafu};

/// Default request timeout for a single chain read.
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Default scan lookback when discovering members from events.
const DEFAULT_LOOKBACK_BLOCKS: u64 = 10_000;

/// Configuration validation error.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum ConfigError {
    /// A field failed validation.
    #[snafu(display("invalid configuration: {message}"))]
    Validation {
        /// Description of the violated constraint.
        message: String,
    },
}

/// Retry policy for transient collaborator failures.
///
/// Exponential backoff: `initial_backoff * multiplier^(attempt-1)`, capped at
/// `max_backoff`, with jitter applied by the retry layer. `max_attempts`
/// counts the initial attempt, so the default of 3 allows two retries.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Maximum number of attempts, including the initial one.
    pub max_attempts: u32,
    /// Backoff before the first retry.
    pub initial_backoff: Duration,
    /// Backoff ceiling.
    pub max_backoff: Duration,
    /// Exponential growth factor.
    pub multiplier: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff: Duration::from_millis(100),
            max_backoff: Duration::from_secs(5),
            multiplier: 2.0,
        }
    }
}

#[bon::bon]
impl RetryPolicy {
    /// Creates a retry policy with validation.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] if `max_attempts` is zero or the
    /// multiplier is below 1.0.
    #[builder]
    pub fn new(
        #[builder(default = 3)] max_attempts: u32,
        #[builder(default = Duration::from_millis(100))] initial_backoff: Duration,
        #[builder(default = Duration::from_secs(5))] max_backoff: Duration,
        #[builder(default = 2.0)] multiplier: f64,
    ) -> Result<Self, ConfigError> {
        ensure!(
            max_attempts > 0,
            ValidationSnafu { message: "max_attempts must be > 0" }
        );
        ensure!(
            multiplier >= 1.0,
            ValidationSnafu { message: "multiplier must be >= 1.0" }
        );
        Ok(Self { max_attempts, initial_backoff, max_backoff, multiplier })
    }
}

/// Configuration for a chain-read collaborator.
///
/// Consumed at collaborator construction; the engine itself never touches
/// endpoints directly.
#[derive(Debug, Clone, PartialEq)]
pub struct ChainConfig {
    /// EVM chain id the collaborator serves.
    pub chain_id: u64,
    /// Provider endpoint URLs, tried in order.
    pub endpoints: Vec<String>,
    /// Deadline for a single provider call.
    pub request_timeout: Duration,
    /// Retry policy for transient provider failures.
    pub retry_policy: RetryPolicy,
}

#[bon::bon]
impl ChainConfig {
    /// Creates a chain configuration with validation.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] if the chain id is zero or the
    /// timeout is zero.
    #[builder]
    pub fn new(
        chain_id: u64,
        #[builder(default)] endpoints: Vec<String>,
        #[builder(default = DEFAULT_REQUEST_TIMEOUT)] request_timeout: Duration,
        #[builder(default)] retry_policy: RetryPolicy,
    ) -> Result<Self, ConfigError> {
        ensure!(chain_id > 0, ValidationSnafu { message: "chain_id must be > 0" });
        ensure!(
            !request_timeout.is_zero(),
            ValidationSnafu { message: "request_timeout must be > 0" }
        );
        Ok(Self { chain_id, endpoints, request_timeout, retry_policy })
    }
}

/// Event-scan parameters for candidate discovery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanConfig {
    /// How far back from the chain head discovery scans reach.
    pub lookback_blocks: u64,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self { lookback_blocks: DEFAULT_LOOKBACK_BLOCKS }
    }
}

/// Configuration for the reconciliation engine.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Known vault contracts on this network. Drives
    /// `memberships_for_user`; an empty registry yields empty portfolios.
    pub vault_registry: Vec<Address>,
    /// Event-scan parameters.
    pub scan: ScanConfig,
    /// Deadline for a single chain read issued by the engine.
    pub request_timeout: Duration,
    /// Retry policy for transient read failures.
    pub retry_policy: RetryPolicy,
}

#[bon::bon]
impl EngineConfig {
    /// Creates an engine configuration with validation.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] if the timeout is zero or the
    /// scan lookback is zero.
    #[builder]
    pub fn new(
        #[builder(default)] vault_registry: Vec<Address>,
        #[builder(default)] scan: ScanConfig,
        #[builder(default = DEFAULT_REQUEST_TIMEOUT)] request_timeout: Duration,
        #[builder(default)] retry_policy: RetryPolicy,
    ) -> Result<Self, ConfigError> {
        ensure!(
            !request_timeout.is_zero(),
            ValidationSnafu { message: "request_timeout must be > 0" }
        );
        ensure!(
            scan.lookback_blocks > 0,
            ValidationSnafu { message: "scan.lookback_blocks must be > 0" }
        );
        Ok(Self { vault_registry, scan, request_timeout, retry_policy })
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            vault_registry: Vec::new(),
            scan: ScanConfig::default(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            retry_policy: RetryPolicy::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retry_policy_defaults_allow_two_retries() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts, 3);
    }

    #[test]
    fn retry_policy_rejects_zero_attempts() {
        let err = RetryPolicy::builder().max_attempts(0).build().unwrap_err();
        assert!(err.to_string().contains("max_attempts"));
    }

    #[test]
    fn chain_config_rejects_zero_chain_id() {
        let err = ChainConfig::builder().chain_id(0).build().unwrap_err();
        assert!(err.to_string().contains("chain_id"));
    }

    #[test]
    fn chain_config_builder_applies_defaults() {
        let config = ChainConfig::builder()
            .chain_id(8453)
            .endpoints(vec!["https://mainnet.base.org".into()])
            .build()
            .unwrap();
        assert_eq!(config.request_timeout, DEFAULT_REQUEST_TIMEOUT);
        assert_eq!(config.retry_policy, RetryPolicy::default());
    }

    #[test]
    fn engine_config_rejects_zero_lookback() {
        let err = EngineConfig::builder()
            .scan(ScanConfig { lookback_blocks: 0 })
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("lookback"));
    }

    #[test]
    fn two_engine_configs_coexist_independently() {
        let base = EngineConfig::builder()
            .vault_registry(vec![Address::repeat_byte(1)])
            .build()
            .unwrap();
        let test_fixture = EngineConfig::default();
        assert_ne!(base.vault_registry, test_fixture.vault_registry);
    }
}
