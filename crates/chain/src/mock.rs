//! Controllable in-memory chain provider for tests.
//!
//! [`MockChain`] implements [`ChainRead`] over parking_lot-guarded maps,
//! with the knobs integration tests need:
//!
//! - **Fixture setup**: owners, allowlist flags, balances, vault info, logs
//! - **Failure injection**: fail the next N calls of a method, or target a
//!   specific user's read
//! - **Range limits**: reject log queries wider than a configured window
//! - **Call counting**: per-method request counters for verifying caching
//!   and skip-when-disabled behavior
//!
//! # Example
//!
//! ```no_run
//! use vaultscope_chain::mock::{MockChain, ReadMethod};
//! use vaultscope_chain::ChainRead;
//! use alloy_primitives::{Address, U256};
//!
//! # async fn demo() {
//! let chain = MockChain::new();
//! let vault = Address::repeat_byte(0xaa);
//! let user = Address::repeat_byte(0xbb);
//!
//! chain.set_owner(vault, user);
//! chain.set_balance(vault, user, U256::from(1_000_000u64));
//! chain.fail_next(ReadMethod::Balance, 1);
//!
//! // First balance read fails, a retry succeeds.
//! assert!(chain.read_balance(vault, user).await.is_err());
//! assert!(chain.read_balance(vault, user).await.is_ok());
//! assert_eq!(chain.calls(ReadMethod::Balance), 2);
//! # }
//! ```

use std::collections::{HashMap, HashSet};

use alloy_primitives::{Address, U256};
use async_trait::async_trait;
use parking_lot::RwLock;
use vaultscope_types::{ChainConfig, ReadError, VaultInfo};

use crate::reader::{ChainRead, EventKind, LogRecord, VaultEvent};

/// Chain id used by [`MockChain::new`].
const MOCK_CHAIN_ID: u64 = 31_337;

/// Identifies a [`ChainRead`] method for injection and counting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReadMethod {
    /// `read_owner`.
    Owner,
    /// `read_allowlist_enabled`.
    AllowlistEnabled,
    /// `read_allowlist_status`.
    AllowlistStatus,
    /// `read_balance`.
    Balance,
    /// `read_vault_info`.
    VaultInfo,
    /// `query_logs`.
    QueryLogs,
    /// `current_block_height`.
    BlockHeight,
}

/// All injectable methods, used by [`MockChain::fail_next_all`].
const ALL_METHODS: [ReadMethod; 7] = [
    ReadMethod::Owner,
    ReadMethod::AllowlistEnabled,
    ReadMethod::AllowlistStatus,
    ReadMethod::Balance,
    ReadMethod::VaultInfo,
    ReadMethod::QueryLogs,
    ReadMethod::BlockHeight,
];

/// Shared mutable fixture state.
#[derive(Debug, Default)]
struct MockState {
    /// vault -> owner
    owners: HashMap<Address, Address>,
    /// vault -> allowlist gate enabled
    allowlist_enabled: HashMap<Address, bool>,
    /// (vault, user) -> on allowlist
    allowlist: HashMap<(Address, Address), bool>,
    /// (vault, user) -> share balance
    balances: HashMap<(Address, Address), U256>,
    /// vault -> summary fields
    vault_info: HashMap<Address, VaultInfo>,
    /// (vault, kind) -> logs in chain order
    logs: HashMap<(Address, EventKind), Vec<LogRecord>>,
    /// Chain head height.
    head: u64,
    /// Maximum accepted log window width; `None` means unlimited.
    max_log_range: Option<u64>,
    /// Remaining injected failures per method.
    fail_counts: HashMap<ReadMethod, usize>,
    /// Targeted failures: every call of `method` for `user` fails.
    fail_for_user: HashSet<(ReadMethod, Address)>,
    /// Requests served per method (including failed ones).
    calls: HashMap<ReadMethod, usize>,
}

/// In-memory [`ChainRead`] implementation with failure injection.
#[derive(Debug)]
pub struct MockChain {
    state: RwLock<MockState>,
    config: ChainConfig,
}

impl Default for MockChain {
    fn default() -> Self {
        Self::new()
    }
}

impl MockChain {
    /// Creates an empty mock on a local test chain id.
    #[must_use]
    pub fn new() -> Self {
        let config = ChainConfig {
            chain_id: MOCK_CHAIN_ID,
            endpoints: Vec::new(),
            request_timeout: std::time::Duration::from_secs(10),
            retry_policy: vaultscope_types::RetryPolicy::default(),
        };
        Self::with_config(config)
    }

    /// Creates a mock that reports the given collaborator configuration.
    #[must_use]
    pub fn with_config(config: ChainConfig) -> Self {
        Self { state: RwLock::new(MockState::default()), config }
    }

    /// The configuration this collaborator was constructed with.
    #[must_use]
    pub fn config(&self) -> &ChainConfig {
        &self.config
    }

    // --- fixture setup -----------------------------------------------------

    /// Sets the vault owner.
    pub fn set_owner(&self, vault: Address, owner: Address) {
        self.state.write().owners.insert(vault, owner);
    }

    /// Enables or disables the vault's allowlist gate.
    pub fn set_allowlist_enabled(&self, vault: Address, enabled: bool) {
        self.state.write().allowlist_enabled.insert(vault, enabled);
    }

    /// Sets a user's allowlist flag.
    pub fn set_allowlist_status(&self, vault: Address, user: Address, allowed: bool) {
        self.state.write().allowlist.insert((vault, user), allowed);
    }

    /// Sets a user's share balance.
    pub fn set_balance(&self, vault: Address, user: Address, balance: U256) {
        self.state.write().balances.insert((vault, user), balance);
    }

    /// Sets the vault's summary fields.
    pub fn set_vault_info(&self, info: VaultInfo) {
        self.state.write().vault_info.insert(info.address, info);
    }

    /// Appends a log for the vault. Logs are returned in insertion order;
    /// callers should insert in (block, log index) order like a provider.
    pub fn push_log(&self, vault: Address, record: LogRecord) {
        let kind = match record.event {
            VaultEvent::AllowlistUpdated { .. } => EventKind::AllowlistUpdated,
            VaultEvent::Deposit { .. } => EventKind::Deposit,
        };
        self.state.write().logs.entry((vault, kind)).or_default().push(record);
    }

    /// Sets the chain head height.
    pub fn set_head(&self, height: u64) {
        self.state.write().head = height;
    }

    // --- failure injection -------------------------------------------------

    /// Rejects log queries wider than `max_width` blocks with
    /// [`ReadError::RangeTooLarge`]. `Some(0)` rejects every query.
    pub fn set_max_log_range(&self, max_width: Option<u64>) {
        self.state.write().max_log_range = max_width;
    }

    /// Fails the next `count` calls of `method` with
    /// [`ReadError::Unavailable`].
    pub fn fail_next(&self, method: ReadMethod, count: usize) {
        self.state.write().fail_counts.insert(method, count);
    }

    /// Fails the next `count` calls of every method, simulating a provider
    /// outage.
    pub fn fail_next_all(&self, count: usize) {
        let mut state = self.state.write();
        for method in ALL_METHODS {
            state.fail_counts.insert(method, count);
        }
    }

    /// Fails every call of `method` that targets `user`.
    pub fn fail_for_user(&self, method: ReadMethod, user: Address) {
        self.state.write().fail_for_user.insert((method, user));
    }

    /// Requests served for `method`, failed ones included.
    #[must_use]
    pub fn calls(&self, method: ReadMethod) -> usize {
        self.state.read().calls.get(&method).copied().unwrap_or(0)
    }

    /// Records the call and applies any injected failure.
    fn admit(&self, method: ReadMethod, user: Option<Address>) -> Result<(), ReadError> {
        let mut state = self.state.write();
        *state.calls.entry(method).or_insert(0) += 1;

        if let Some(user) = user {
            if state.fail_for_user.contains(&(method, user)) {
                return Err(ReadError::Unavailable {
                    message: format!("injected failure for {user}"),
                });
            }
        }
        if let Some(remaining) = state.fail_counts.get_mut(&method) {
            if *remaining > 0 {
                *remaining -= 1;
                return Err(ReadError::Unavailable { message: "injected failure".into() });
            }
        }
        Ok(())
    }
}

#[async_trait]
impl ChainRead for MockChain {
    async fn read_owner(&self, vault: Address) -> Result<Address, ReadError> {
        self.admit(ReadMethod::Owner, None)?;
        self.state.read().owners.get(&vault).copied().ok_or_else(|| ReadError::Reverted {
            message: format!("unknown vault {vault}"),
        })
    }

    async fn read_allowlist_enabled(&self, vault: Address) -> Result<bool, ReadError> {
        self.admit(ReadMethod::AllowlistEnabled, None)?;
        Ok(self.state.read().allowlist_enabled.get(&vault).copied().unwrap_or(false))
    }

    async fn read_allowlist_status(
        &self,
        vault: Address,
        user: Address,
    ) -> Result<bool, ReadError> {
        self.admit(ReadMethod::AllowlistStatus, Some(user))?;
        Ok(self.state.read().allowlist.get(&(vault, user)).copied().unwrap_or(false))
    }

    async fn read_balance(&self, vault: Address, user: Address) -> Result<U256, ReadError> {
        self.admit(ReadMethod::Balance, Some(user))?;
        Ok(self.state.read().balances.get(&(vault, user)).copied().unwrap_or(U256::ZERO))
    }

    async fn read_vault_info(&self, vault: Address) -> Result<VaultInfo, ReadError> {
        self.admit(ReadMethod::VaultInfo, None)?;
        self.state.read().vault_info.get(&vault).cloned().ok_or_else(|| ReadError::Reverted {
            message: format!("unknown vault {vault}"),
        })
    }

    async fn query_logs(
        &self,
        vault: Address,
        kind: EventKind,
        from: u64,
        to: u64,
    ) -> Result<Vec<LogRecord>, ReadError> {
        self.admit(ReadMethod::QueryLogs, None)?;
        let state = self.state.read();
        if let Some(max) = state.max_log_range {
            let width = to.saturating_sub(from) + 1;
            if width > max {
                return Err(ReadError::RangeTooLarge { from, to });
            }
        }
        let mut records: Vec<LogRecord> = state
            .logs
            .get(&(vault, kind))
            .map(|logs| {
                logs.iter().filter(|r| r.block >= from && r.block <= to).copied().collect()
            })
            .unwrap_or_default();
        records.sort_by_key(|r| (r.block, r.log_index));
        Ok(records)
    }

    async fn current_block_height(&self) -> Result<u64, ReadError> {
        self.admit(ReadMethod::BlockHeight, None)?;
        Ok(self.state.read().head)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn addr(byte: u8) -> Address {
        Address::repeat_byte(byte)
    }

    #[tokio::test]
    async fn unknown_balance_reads_as_zero() {
        let chain = MockChain::new();
        let balance = chain.read_balance(addr(1), addr(2)).await.unwrap();
        assert_eq!(balance, U256::ZERO);
    }

    #[tokio::test]
    async fn injected_failures_are_consumed_in_order() {
        let chain = MockChain::new();
        chain.set_owner(addr(1), addr(9));
        chain.fail_next(ReadMethod::Owner, 2);

        assert!(chain.read_owner(addr(1)).await.is_err());
        assert!(chain.read_owner(addr(1)).await.is_err());
        assert_eq!(chain.read_owner(addr(1)).await.unwrap(), addr(9));
        assert_eq!(chain.calls(ReadMethod::Owner), 3);
    }

    #[tokio::test]
    async fn targeted_failure_spares_other_users() {
        let chain = MockChain::new();
        chain.set_balance(addr(1), addr(2), U256::from(5u64));
        chain.set_balance(addr(1), addr(3), U256::from(7u64));
        chain.fail_for_user(ReadMethod::Balance, addr(2));

        assert!(chain.read_balance(addr(1), addr(2)).await.is_err());
        assert_eq!(chain.read_balance(addr(1), addr(3)).await.unwrap(), U256::from(7u64));
    }

    #[tokio::test]
    async fn oversized_log_windows_are_rejected() {
        let chain = MockChain::new();
        chain.set_max_log_range(Some(50));

        let err = chain
            .query_logs(addr(1), EventKind::Deposit, 0, 100)
            .await
            .unwrap_err();
        assert!(matches!(err, ReadError::RangeTooLarge { from: 0, to: 100 }));

        assert!(chain.query_logs(addr(1), EventKind::Deposit, 0, 49).await.is_ok());
    }

    #[tokio::test]
    async fn logs_filter_by_window_and_sort_by_position() {
        let chain = MockChain::new();
        let vault = addr(1);
        chain.push_log(
            vault,
            LogRecord {
                event: VaultEvent::Deposit { owner: addr(2), assets: U256::from(10u64) },
                block: 20,
                log_index: 0,
            },
        );
        chain.push_log(
            vault,
            LogRecord {
                event: VaultEvent::Deposit { owner: addr(3), assets: U256::from(20u64) },
                block: 5,
                log_index: 1,
            },
        );
        chain.push_log(
            vault,
            LogRecord {
                event: VaultEvent::Deposit { owner: addr(4), assets: U256::from(30u64) },
                block: 5,
                log_index: 0,
            },
        );

        let records = chain.query_logs(vault, EventKind::Deposit, 0, 10).await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].event.user(), addr(4));
        assert_eq!(records[1].event.user(), addr(3));
    }
}
