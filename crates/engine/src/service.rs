//! Presentation-facing membership API.
//!
//! [`MembershipService`] is what the dashboard layer consumes. It owns the
//! shared chain collaborator and configuration, parses string identifiers at
//! the boundary, and composes the ingest → reconcile → aggregate phases.
//!
//! The return contract never conflates emptiness with failure: `Ok(vec![])`
//! means a genuinely empty result, `Err` means data could not be loaded.

use std::sync::Arc;

use alloy_primitives::Address;
use futures::future::join_all;
use vaultscope_chain::{with_retry, ChainRead};
use vaultscope_types::{
    parse_address, BlockWindow, EngineConfig, PortfolioSummary, Result, VaultInfo,
    VaultMembership,
};

use crate::{AggregateView, EventIngestor, StateReconciler};

/// Membership reconciliation service over one network.
///
/// Cheap to clone; passes for different vaults run concurrently against the
/// same collaborator, which is stateless and requires no locking.
pub struct MembershipService<C: ChainRead + ?Sized> {
    chain: Arc<C>,
    config: EngineConfig,
}

impl<C: ChainRead + ?Sized> Clone for MembershipService<C> {
    fn clone(&self) -> Self {
        Self { chain: Arc::clone(&self.chain), config: self.config.clone() }
    }
}

impl<C: ChainRead + ?Sized> MembershipService<C> {
    /// Creates a service over a shared collaborator.
    pub fn new(chain: Arc<C>, config: EngineConfig) -> Self {
        Self { chain, config }
    }

    /// The configuration this service runs with.
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Reconciles one (vault, user) pair.
    ///
    /// # Errors
    ///
    /// [`EngineError::InvalidAddress`](vaultscope_types::EngineError::InvalidAddress) for malformed identifiers (before any
    /// I/O); [`EngineError::UpstreamUnavailable`](vaultscope_types::EngineError::UpstreamUnavailable) when the provider is down.
    pub async fn vault_membership(&self, vault: &str, user: &str) -> Result<VaultMembership> {
        let vault = parse_address(vault)?;
        let user = parse_address(user)?;
        self.membership_of(vault, user).await
    }

    /// Lists every current member of a vault via candidate discovery:
    /// the owner, allowlist-event targets, and depositors from the scan
    /// window, each confirmed by live reads.
    ///
    /// Returns all discovered candidates, members and non-members alike,
    /// so callers can also render who was considered; filter on
    /// `is_member` for the member roster.
    ///
    /// # Errors
    ///
    /// [`EngineError::InvalidAddress`](vaultscope_types::EngineError::InvalidAddress) for a malformed vault identifier;
    /// [`EngineError::UpstreamUnavailable`](vaultscope_types::EngineError::UpstreamUnavailable) when the provider is down.
    pub async fn list_members(&self, vault: &str) -> Result<Vec<VaultMembership>> {
        let vault = parse_address(vault)?;

        let facts = match self.scan_window().await {
            Some(window) => {
                EventIngestor::new(self.chain.as_ref(), &self.config).scan(vault, window).await
            }
            None => {
                // Head unknown: fall back to owner-only discovery rather
                // than failing the whole listing.
                crate::FactSet { facts: Vec::new(), partial: true }
            }
        };
        if facts.partial {
            tracing::debug!(%vault, "member discovery ran on a partial event scan");
        }

        StateReconciler::new(self.chain.as_ref(), &self.config)
            .reconcile_discovered(vault, &facts.facts)
            .await
    }

    /// Lists the vaults in the configured registry where the user is a
    /// member, with vault context attached.
    ///
    /// Vaults whose pass failed are skipped with a warning so one bad vault
    /// cannot sink the portfolio; if every vault in a non-empty registry
    /// failed, the first error is surfaced instead of an empty list.
    ///
    /// # Errors
    ///
    /// [`EngineError::InvalidAddress`](vaultscope_types::EngineError::InvalidAddress) for a malformed user identifier;
    /// [`EngineError::UpstreamUnavailable`](vaultscope_types::EngineError::UpstreamUnavailable) when every vault pass failed.
    pub async fn memberships_for_user(
        &self,
        user: &str,
    ) -> Result<Vec<(VaultInfo, VaultMembership)>> {
        let user = parse_address(user)?;

        if self.config.vault_registry.is_empty() {
            return Ok(Vec::new());
        }

        let passes = join_all(
            self.config
                .vault_registry
                .iter()
                .map(|vault| async move { (*vault, self.membership_of(*vault, user).await) }),
        )
        .await;

        let mut rows = Vec::new();
        let mut first_error = None;
        let mut failures = 0usize;
        for (vault, outcome) in passes {
            match outcome {
                Ok(membership) if membership.is_member => {
                    rows.push((self.vault_info_or_placeholder(vault).await, membership));
                }
                Ok(_) => {}
                Err(error) => {
                    tracing::warn!(%vault, %user, %error, "skipping vault in portfolio pass");
                    failures += 1;
                    first_error.get_or_insert(error);
                }
            }
        }

        if failures == self.config.vault_registry.len() {
            if let Some(error) = first_error {
                return Err(error);
            }
        }
        Ok(rows)
    }

    /// Portfolio totals for a user across the configured registry.
    ///
    /// # Errors
    ///
    /// Same contract as [`Self::memberships_for_user`].
    pub async fn portfolio_summary(&self, user: &str) -> Result<PortfolioSummary> {
        let rows = self.memberships_for_user(user).await?;
        Ok(AggregateView::summarize(&rows))
    }

    async fn membership_of(&self, vault: Address, user: Address) -> Result<VaultMembership> {
        let rows = StateReconciler::new(self.chain.as_ref(), &self.config)
            .reconcile(vault, &[user])
            .await?;
        // One candidate in, exactly one record out per the reconciler's
        // output guarantee.
        Ok(rows.into_iter().next().unwrap_or_else(|| {
            VaultMembership::derive(vault, user, false, false, alloy_primitives::U256::ZERO)
        }))
    }

    /// Discovery window ending at the chain head; `None` when the head
    /// read fails.
    async fn scan_window(&self) -> Option<BlockWindow> {
        let head = with_retry(&self.config.retry_policy, self.config.request_timeout, || {
            self.chain.current_block_height()
        })
        .await
        .map_err(|error| {
            tracing::warn!(%error, "head height read failed; skipping event discovery");
        })
        .ok()?;
        Some(BlockWindow::lookback_from(head, self.config.scan.lookback_blocks))
    }

    async fn vault_info_or_placeholder(&self, vault: Address) -> VaultInfo {
        with_retry(&self.config.retry_policy, self.config.request_timeout, || {
            self.chain.read_vault_info(vault)
        })
        .await
        .unwrap_or_else(|error| {
            tracing::warn!(%vault, %error, "vault info read failed; using placeholder");
            VaultInfo::placeholder(vault)
        })
    }
}
