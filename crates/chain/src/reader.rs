//! The abstract chain-read capability.

use alloy_primitives::{Address, U256};
use async_trait::async_trait;
use vaultscope_types::{ReadError, VaultInfo};

/// Log categories the engine scans.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// `AllowlistUpdated(user, allowed)`.
    AllowlistUpdated,
    /// `Deposit(caller, owner, assets, shares)`.
    Deposit,
}

/// Decoded payload of a scanned log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VaultEvent {
    /// A user's allowlist flag changed.
    AllowlistUpdated {
        /// Affected user.
        user: Address,
        /// New flag value.
        allowed: bool,
    },
    /// Assets were deposited for a share recipient.
    Deposit {
        /// Share recipient (`owner` in the event signature).
        owner: Address,
        /// Deposited assets in base units.
        assets: U256,
    },
}

impl VaultEvent {
    /// The user this event concerns.
    #[must_use]
    pub fn user(&self) -> Address {
        match self {
            Self::AllowlistUpdated { user, .. } => *user,
            Self::Deposit { owner, .. } => *owner,
        }
    }
}

/// One decoded log with its chain position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogRecord {
    /// Decoded event payload.
    pub event: VaultEvent,
    /// Block the log was emitted in.
    pub block: u64,
    /// Position within the block.
    pub log_index: u64,
}

/// Point-in-time read and log-query capability over one network.
///
/// Implementations are stateless from the engine's perspective: they perform
/// no local mutation, so a single instance is safe to share across any
/// number of concurrent reconciliation passes without locking.
///
/// Every method is a suspension point; callers bound each call with a
/// deadline and retry policy via [`with_retry`](crate::with_retry).
#[async_trait]
pub trait ChainRead: Send + Sync {
    /// Reads the vault's current owner.
    async fn read_owner(&self, vault: Address) -> Result<Address, ReadError>;

    /// Reads whether the vault's allowlist gate is enabled.
    async fn read_allowlist_enabled(&self, vault: Address) -> Result<bool, ReadError>;

    /// Reads whether `user` is on the vault's allowlist.
    ///
    /// Callers must not invoke this when the allowlist is disabled; the
    /// result is meaningless in that state.
    async fn read_allowlist_status(
        &self,
        vault: Address,
        user: Address,
    ) -> Result<bool, ReadError>;

    /// Reads `user`'s share balance in the vault.
    async fn read_balance(&self, vault: Address, user: Address) -> Result<U256, ReadError>;

    /// Reads the vault's summary fields.
    async fn read_vault_info(&self, vault: Address) -> Result<VaultInfo, ReadError>;

    /// Queries logs of one category in the inclusive block range
    /// `[from, to]`, ordered by (block, log index) ascending.
    ///
    /// Fails with [`ReadError::RangeTooLarge`] when the window exceeds the
    /// provider's limit; callers shrink and retry.
    async fn query_logs(
        &self,
        vault: Address,
        kind: EventKind,
        from: u64,
        to: u64,
    ) -> Result<Vec<LogRecord>, ReadError>;

    /// Current chain head height.
    async fn current_block_height(&self) -> Result<u64, ReadError>;
}
