//! Event ingestion: bounded log scans normalized into membership facts.
//!
//! The ingestor is a hint generator. Facts it emits enumerate addresses
//! worth probing with live reads; amounts carried by deposit facts are
//! never trusted as balances. Because hints are best-effort, no failure
//! crosses the ingestor boundary: callers always receive a fact set, marked
//! `partial` when coverage is incomplete.

use std::time::Duration;

use alloy_primitives::Address;
use vaultscope_chain::{with_retry, ChainRead, EventKind, LogRecord, VaultEvent};
use vaultscope_types::{BlockWindow, EngineConfig, MembershipFact, ReadError, RetryPolicy};

/// The outcome of a scan: gathered facts plus a coverage marker.
#[derive(Debug, Clone, Default)]
pub struct FactSet {
    /// Facts in (block, log index) order within each category.
    pub facts: Vec<MembershipFact>,
    /// True when some portion of the requested window was not scanned.
    pub partial: bool,
}

impl FactSet {
    /// Folds another category's outcome into this one.
    fn absorb(&mut self, mut other: FactSet) {
        self.facts.append(&mut other.facts);
        self.partial |= other.partial;
    }
}

/// Scans one vault's logs over a bounded window.
pub struct EventIngestor<'a, C: ChainRead + ?Sized> {
    chain: &'a C,
    retry_policy: &'a RetryPolicy,
    deadline: Duration,
}

impl<'a, C: ChainRead + ?Sized> EventIngestor<'a, C> {
    /// Creates an ingestor over the given collaborator.
    pub fn new(chain: &'a C, config: &'a EngineConfig) -> Self {
        Self { chain, retry_policy: &config.retry_policy, deadline: config.request_timeout }
    }

    /// Scans both log categories over `window` and merges the results.
    pub async fn scan(&self, vault: Address, window: BlockWindow) -> FactSet {
        let mut set = self.scan_allowlist_events(vault, window).await;
        set.absorb(self.scan_deposit_events(vault, window).await);
        set
    }

    /// Emits one `Allowlist` fact per `AllowlistUpdated` log in the window.
    pub async fn scan_allowlist_events(&self, vault: Address, window: BlockWindow) -> FactSet {
        self.scan_category(vault, EventKind::AllowlistUpdated, window).await
    }

    /// Emits one `DepositActivity` fact per `Deposit` log in the window,
    /// keyed on the share recipient. Discovery metadata only.
    pub async fn scan_deposit_events(&self, vault: Address, window: BlockWindow) -> FactSet {
        self.scan_category(vault, EventKind::Deposit, window).await
    }

    async fn scan_category(
        &self,
        vault: Address,
        kind: EventKind,
        window: BlockWindow,
    ) -> FactSet {
        match self.query(vault, kind, window).await {
            Ok(records) => FactSet { facts: to_facts(vault, records), partial: false },
            Err(ReadError::RangeTooLarge { .. }) => self.retry_shrunk(vault, kind, window).await,
            Err(error) => {
                tracing::warn!(%vault, ?kind, %error, "log scan failed; returning partial facts");
                FactSet { facts: Vec::new(), partial: true }
            }
        }
    }

    /// One retry with a halved window after a range rejection. The result
    /// is partial either way: a successful sub-window leaves the rest of
    /// the requested range unscanned.
    async fn retry_shrunk(&self, vault: Address, kind: EventKind, window: BlockWindow) -> FactSet {
        let Some(shrunk) = window.halved() else {
            tracing::warn!(
                %vault,
                ?kind,
                from = window.from(),
                "provider rejected minimum-width log window"
            );
            return FactSet { facts: Vec::new(), partial: true };
        };

        tracing::debug!(
            %vault,
            ?kind,
            from = shrunk.from(),
            to = shrunk.to(),
            "log range rejected; retrying with halved window"
        );

        match self.query(vault, kind, shrunk).await {
            Ok(records) => FactSet { facts: to_facts(vault, records), partial: true },
            Err(error) => {
                tracing::warn!(%vault, ?kind, %error, "shrunk log scan failed; giving up");
                FactSet { facts: Vec::new(), partial: true }
            }
        }
    }

    async fn query(
        &self,
        vault: Address,
        kind: EventKind,
        window: BlockWindow,
    ) -> Result<Vec<LogRecord>, ReadError> {
        with_retry(self.retry_policy, self.deadline, || {
            self.chain.query_logs(vault, kind, window.from(), window.to())
        })
        .await
        .map(|mut records| {
            // Providers promise position order; enforce it so same-kind
            // supersession stays correct regardless.
            records.sort_by_key(|r| (r.block, r.log_index));
            records
        })
    }
}

fn to_facts(vault: Address, records: Vec<LogRecord>) -> Vec<MembershipFact> {
    records
        .into_iter()
        .map(|record| match record.event {
            VaultEvent::AllowlistUpdated { user, allowed } => {
                MembershipFact::allowlist_event(vault, user, allowed, record.block)
            }
            VaultEvent::Deposit { owner, assets } => {
                MembershipFact::deposit_event(vault, owner, assets, record.block)
            }
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use alloy_primitives::U256;
    use vaultscope_chain::mock::{MockChain, ReadMethod};
    use vaultscope_types::{FactKind, FactSource, FactValue};

    use super::*;

    fn addr(byte: u8) -> Address {
        Address::repeat_byte(byte)
    }

    fn fast_config() -> EngineConfig {
        EngineConfig {
            retry_policy: RetryPolicy {
                max_attempts: 2,
                initial_backoff: Duration::from_millis(1),
                max_backoff: Duration::from_millis(2),
                multiplier: 2.0,
            },
            ..EngineConfig::default()
        }
    }

    fn deposit_log(owner: Address, assets: u64, block: u64, log_index: u64) -> LogRecord {
        LogRecord {
            event: VaultEvent::Deposit { owner, assets: U256::from(assets) },
            block,
            log_index,
        }
    }

    #[tokio::test]
    async fn scan_normalizes_both_categories() {
        let chain = MockChain::new();
        let vault = addr(1);
        chain.push_log(
            vault,
            LogRecord {
                event: VaultEvent::AllowlistUpdated { user: addr(2), allowed: true },
                block: 3,
                log_index: 0,
            },
        );
        chain.push_log(vault, deposit_log(addr(3), 1_000_000, 5, 0));

        let config = fast_config();
        let ingestor = EventIngestor::new(&chain, &config);
        let set = ingestor.scan(vault, BlockWindow::new(0, 10).unwrap()).await;

        assert!(!set.partial);
        assert_eq!(set.facts.len(), 2);
        assert_eq!(set.facts[0].kind, FactKind::Allowlist);
        assert_eq!(set.facts[0].value, FactValue::Flag(true));
        assert_eq!(set.facts[0].source, FactSource::AllowlistEvent);
        assert_eq!(set.facts[1].kind, FactKind::DepositActivity);
        assert_eq!(set.facts[1].observed_at_block, Some(5));
    }

    #[tokio::test]
    async fn facts_preserve_position_order_within_category() {
        let chain = MockChain::new();
        let vault = addr(1);
        chain.push_log(vault, deposit_log(addr(4), 30, 5, 1));
        chain.push_log(vault, deposit_log(addr(2), 10, 2, 0));
        chain.push_log(vault, deposit_log(addr(3), 20, 5, 0));

        let config = fast_config();
        let ingestor = EventIngestor::new(&chain, &config);
        let set = ingestor.scan_deposit_events(vault, BlockWindow::new(0, 10).unwrap()).await;

        let users: Vec<Address> = set.facts.iter().map(|f| f.user).collect();
        assert_eq!(users, vec![addr(2), addr(3), addr(4)]);
    }

    #[tokio::test]
    async fn range_rejection_shrinks_once_and_marks_partial() {
        let chain = MockChain::new();
        let vault = addr(1);
        chain.set_max_log_range(Some(50));
        chain.push_log(vault, deposit_log(addr(2), 10, 8, 0));
        // Outside the halved window; must not appear.
        chain.push_log(vault, deposit_log(addr(3), 20, 90, 0));

        let config = fast_config();
        let ingestor = EventIngestor::new(&chain, &config);
        let set = ingestor.scan_deposit_events(vault, BlockWindow::new(0, 100).unwrap()).await;

        assert!(set.partial);
        assert_eq!(set.facts.len(), 1);
        assert_eq!(set.facts[0].user, addr(2));
        // Initial query plus exactly one shrunk retry.
        assert_eq!(chain.calls(ReadMethod::QueryLogs), 2);
    }

    #[tokio::test]
    async fn unshrinkable_rejection_gives_up_empty_and_partial() {
        let chain = MockChain::new();
        chain.set_max_log_range(Some(0));

        let config = fast_config();
        let ingestor = EventIngestor::new(&chain, &config);
        let set = ingestor
            .scan_deposit_events(addr(1), BlockWindow::new(0, 100).unwrap())
            .await;

        assert!(set.partial);
        assert!(set.facts.is_empty());
    }

    #[tokio::test]
    async fn transient_query_failures_degrade_to_partial() {
        let chain = MockChain::new();
        // Outlasts the retry budget of 2 attempts per category.
        chain.fail_next(ReadMethod::QueryLogs, 10);

        let config = fast_config();
        let ingestor = EventIngestor::new(&chain, &config);
        let set = ingestor.scan(addr(1), BlockWindow::new(0, 10).unwrap()).await;

        assert!(set.partial);
        assert!(set.facts.is_empty());
    }
}
