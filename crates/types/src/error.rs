//! Error types for Vaultscope using snafu.
//!
//! Two tiers:
//! - [`ReadError`] — failures of the chain-read collaborator (transport,
//!   timeout, reverted call, oversized log window), with a retryability
//!   classification consumed by the retry layer.
//! - [`EngineError`] — failures surfaced by the reconciliation core itself
//!   (malformed input, pass-level upstream outage).
//!
//! Per-field read failures are never surfaced: the reconciler downgrades them
//! to safe defaults and logs. `RangeTooLarge` is handled inside the event
//! ingestor with a shrink-and-retry and never crosses its boundary.

use alloy_primitives::Address;
use snafu::{Location, Snafu};

/// Unified result type for reconciliation operations.
pub type Result<T, E = EngineError> = std::result::Result<T, E>;

/// Errors produced by the chain-read collaborator.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum ReadError {
    /// The requested log window exceeds the provider's range limit.
    #[snafu(display("log query range [{from}, {to}] exceeds provider limit"))]
    RangeTooLarge {
        /// First block of the rejected window.
        from: u64,
        /// Last block of the rejected window.
        to: u64,
    },

    /// The contract call reverted.
    #[snafu(display("contract call reverted: {message}"))]
    Reverted {
        /// Revert reason reported by the provider.
        message: String,
    },

    /// Transport-level failure (connection reset, malformed response).
    #[snafu(display("transport error at {location}: {message}"))]
    Transport {
        /// Error description.
        message: String,
        /// Source location.
        #[snafu(implicit)]
        location: Location,
    },

    /// The call did not complete within its deadline.
    #[snafu(display("chain read timed out after {duration_ms}ms"))]
    Timeout {
        /// Deadline that elapsed, in milliseconds.
        duration_ms: u64,
    },

    /// The provider is temporarily unreachable or overloaded.
    #[snafu(display("provider unavailable: {message}"))]
    Unavailable {
        /// Error description.
        message: String,
    },
}

impl ReadError {
    /// Returns true if the error is transient and the read should be retried.
    ///
    /// Retryable: transport failures, timeouts, provider unavailability.
    /// Non-retryable: reverted calls (deterministic) and oversized ranges
    /// (retrying the same window cannot succeed; the ingestor shrinks the
    /// window instead).
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport { .. } | Self::Timeout { .. } | Self::Unavailable { .. } => true,
            Self::RangeTooLarge { .. } | Self::Reverted { .. } => false,
        }
    }
}

/// Errors surfaced by the reconciliation core.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum EngineError {
    /// A vault or user identifier failed to parse as an EVM address.
    ///
    /// Rejected synchronously, before any I/O is issued.
    #[snafu(display("invalid address: {input:?}"))]
    InvalidAddress {
        /// The malformed input.
        input: String,
    },

    /// A scan window with `from > to` was requested.
    ///
    /// Rejected synchronously, before any I/O is issued.
    #[snafu(display("invalid block range: from {from} > to {to}"))]
    InvalidRange {
        /// Requested start block.
        from: u64,
        /// Requested end block.
        to: u64,
    },

    /// A reconciliation pass could load nothing from the chain provider.
    ///
    /// Raised when every per-candidate read failed, or when a discovery
    /// pass is left with zero candidates (`candidates_attempted == 0`)
    /// because the owner read failed and no fact nominated anyone.
    /// Distinguishes "no data could be loaded" from a valid empty result;
    /// partial outages are handled per-field and never reach this variant.
    #[snafu(display(
        "chain provider unavailable reconciling vault {vault} ({candidates_attempted} candidates attempted)"
    ))]
    UpstreamUnavailable {
        /// Vault whose pass failed.
        vault: Address,
        /// Number of candidates the pass attempted to evaluate.
        candidates_attempted: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_errors_are_retryable() {
        assert!(ReadError::Timeout { duration_ms: 100 }.is_retryable());
        assert!(ReadError::Unavailable { message: "503".into() }.is_retryable());
    }

    #[test]
    fn deterministic_errors_are_not_retryable() {
        assert!(!ReadError::RangeTooLarge { from: 0, to: 100 }.is_retryable());
        assert!(!ReadError::Reverted { message: "ERC4626: not allowed".into() }.is_retryable());
    }

    #[test]
    fn engine_error_display_includes_context() {
        let err = EngineError::UpstreamUnavailable {
            vault: Address::ZERO,
            candidates_attempted: 4,
        };
        assert!(err.to_string().contains("4 candidates"));
    }
}
