//! State reconciliation: facts plus live reads become membership records.
//!
//! Events are a hint; reads are truth. The reconciler takes the candidate
//! addresses a pass should evaluate (explicit, or discovered from facts),
//! confirms each against live reads, and emits exactly one
//! [`VaultMembership`] per deduplicated candidate.
//!
//! # Failure model
//!
//! A failed field read never aborts a pass. Each field falls back to the
//! value in [`defaults`] and the failure is logged; candidates whose reads
//! succeeded are unaffected. Only a pass in which *every* attempted read
//! failed is surfaced, as [`EngineError::UpstreamUnavailable`], so callers
//! can tell an outage apart from a vault with no members.

use std::{
    collections::HashSet,
    sync::atomic::{AtomicUsize, Ordering},
    time::Duration,
};

use alloy_primitives::Address;
use futures::future::join_all;
use vaultscope_chain::{with_retry, ChainRead, ReadError};
use vaultscope_types::{
    EngineConfig, EngineError, MembershipFact, Result, RetryPolicy, VaultMembership,
};

/// Safe default per read field, applied when the live read fails.
///
/// The table errs toward non-membership: an outage can hide a member for
/// one pass, but never invents one.
pub mod defaults {
    use alloy_primitives::{Address, U256};

    /// Failed owner read: owner unknown, every owner comparison is false.
    pub const OWNER: Option<Address> = None;

    /// Failed allowlist-gate read: treat the gate as disabled.
    pub const ALLOWLIST_ENABLED: bool = false;

    /// Failed per-user allowlist read: not on the allowlist.
    pub const ALLOWLIST_STATUS: bool = false;

    /// Failed balance read: zero.
    pub const BALANCE: U256 = U256::ZERO;
}

/// Per-pass read accounting for outage detection.
#[derive(Debug, Default)]
struct PassStats {
    attempted: AtomicUsize,
    succeeded: AtomicUsize,
}

impl PassStats {
    fn all_failed(&self) -> bool {
        self.attempted.load(Ordering::Relaxed) > 0 && self.succeeded.load(Ordering::Relaxed) == 0
    }
}

/// Vault-level reads shared by every candidate in one pass.
#[derive(Debug, Clone, Copy)]
struct VaultContext {
    owner: Option<Address>,
    allowlist_enabled: bool,
}

/// Reconciles candidates for one vault against live reads.
pub struct StateReconciler<'a, C: ChainRead + ?Sized> {
    chain: &'a C,
    retry_policy: &'a RetryPolicy,
    deadline: Duration,
}

impl<'a, C: ChainRead + ?Sized> StateReconciler<'a, C> {
    /// Creates a reconciler over the given collaborator.
    pub fn new(chain: &'a C, config: &'a EngineConfig) -> Self {
        Self { chain, retry_policy: &config.retry_policy, deadline: config.request_timeout }
    }

    /// Reconciles an explicit candidate list.
    ///
    /// Candidates are deduplicated (address parsing already normalized
    /// case) with input order preserved; the output has exactly one record
    /// per distinct candidate. An empty list short-circuits to an empty
    /// result without touching the collaborator.
    ///
    /// # Errors
    ///
    /// [`EngineError::UpstreamUnavailable`] when every read in the pass
    /// failed.
    pub async fn reconcile(
        &self,
        vault: Address,
        candidates: &[Address],
    ) -> Result<Vec<VaultMembership>> {
        let candidates = dedup(candidates.iter().copied());
        if candidates.is_empty() {
            return Ok(Vec::new());
        }

        let stats = PassStats::default();
        let context = self.vault_context(vault, &stats).await;
        self.evaluate_all(vault, context, candidates, &stats).await
    }

    /// Discovery mode: candidates are the vault owner plus every user
    /// nominated by an allowlist or deposit fact.
    ///
    /// # Errors
    ///
    /// [`EngineError::UpstreamUnavailable`] when every read in the pass
    /// failed.
    pub async fn reconcile_discovered(
        &self,
        vault: Address,
        facts: &[MembershipFact],
    ) -> Result<Vec<VaultMembership>> {
        let stats = PassStats::default();
        let context = self.vault_context(vault, &stats).await;

        let candidates = dedup(
            context
                .owner
                .into_iter()
                .chain(facts.iter().filter(|f| f.nominates_candidate()).map(|f| f.user)),
        );
        if candidates.is_empty() {
            // The owner read failed and no fact nominated a candidate. With
            // nothing left to evaluate, discovery cannot tell an empty vault
            // from a provider problem, so report unavailability.
            return Err(EngineError::UpstreamUnavailable { vault, candidates_attempted: 0 });
        }

        self.evaluate_all(vault, context, candidates, &stats).await
    }

    async fn evaluate_all(
        &self,
        vault: Address,
        context: VaultContext,
        candidates: Vec<Address>,
        stats: &PassStats,
    ) -> Result<Vec<VaultMembership>> {
        // Candidate records are independent; fan out and join. Output order
        // follows candidate order, so completion order never shows.
        let rows = join_all(
            candidates.iter().map(|user| self.evaluate(vault, *user, context, stats)),
        )
        .await;

        if stats.all_failed() {
            return Err(EngineError::UpstreamUnavailable {
                vault,
                candidates_attempted: candidates.len(),
            });
        }
        Ok(rows)
    }

    /// Vault-level reads, issued once per pass regardless of candidate count.
    async fn vault_context(&self, vault: Address, stats: &PassStats) -> VaultContext {
        let owner = self
            .try_read(stats, vault, "owner", defaults::OWNER, || async {
                self.chain.read_owner(vault).await.map(Some)
            })
            .await;
        let allowlist_enabled = self
            .try_read(stats, vault, "allowlist_enabled", defaults::ALLOWLIST_ENABLED, || {
                self.chain.read_allowlist_enabled(vault)
            })
            .await;
        VaultContext { owner, allowlist_enabled }
    }

    async fn evaluate(
        &self,
        vault: Address,
        user: Address,
        context: VaultContext,
        stats: &PassStats,
    ) -> VaultMembership {
        let is_owner = context.owner == Some(user);

        // A disabled gate means "not on allowlist" by definition; the
        // per-user read is skipped entirely, not defaulted.
        let is_on_allowlist = if context.allowlist_enabled {
            self.try_read(stats, vault, "allowlist_status", defaults::ALLOWLIST_STATUS, || {
                self.chain.read_allowlist_status(vault, user)
            })
            .await
        } else {
            defaults::ALLOWLIST_STATUS
        };

        let balance = self
            .try_read(stats, vault, "balance", defaults::BALANCE, || {
                self.chain.read_balance(vault, user)
            })
            .await;

        VaultMembership::derive(vault, user, is_owner, is_on_allowlist, balance)
    }

    /// Issues one read with retry and deadline; on exhaustion, logs and
    /// returns the field's safe default.
    async fn try_read<T, F, Fut>(
        &self,
        stats: &PassStats,
        vault: Address,
        field: &'static str,
        default: T,
        operation: F,
    ) -> T
    where
        F: FnMut() -> Fut,
        Fut: std::future::Future<Output = std::result::Result<T, ReadError>>,
    {
        stats.attempted.fetch_add(1, Ordering::Relaxed);
        match with_retry(self.retry_policy, self.deadline, operation).await {
            Ok(value) => {
                stats.succeeded.fetch_add(1, Ordering::Relaxed);
                value
            }
            Err(error) => {
                tracing::warn!(%vault, field, %error, "chain read failed; using safe default");
                default
            }
        }
    }
}

/// Deduplicates addresses, preserving first-seen order. Address parsing
/// already normalized case, so byte equality is case-insensitive equality.
fn dedup(addresses: impl IntoIterator<Item = Address>) -> Vec<Address> {
    let mut seen = HashSet::new();
    addresses.into_iter().filter(|a| seen.insert(*a)).collect()
}
