//! Membership facts: atomic observations feeding reconciliation.
//!
//! A fact records one thing seen on chain about a (vault, user) pair — an
//! event in a scanned window or a point-in-time read. Facts are immutable:
//! reconciliation only derives [`VaultMembership`](crate::VaultMembership)
//! state from a set of facts, it never rewrites one.

use std::fmt;

use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};

/// What aspect of the (vault, user) relationship a fact describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FactKind {
    /// The user is (or is not) the vault owner.
    Owner,
    /// The user's allowlist flag changed or was read.
    Allowlist,
    /// The user's share balance was read.
    Balance,
    /// The user deposited into the vault. Discovery metadata only: the
    /// amount enumerates candidate addresses for live probing and is never
    /// trusted as a balance.
    DepositActivity,
}

/// Provenance of a fact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FactSource {
    /// Live `owner()` read.
    OwnerRead,
    /// `AllowlistUpdated` log event.
    AllowlistEvent,
    /// Live `allowlist(user)` read.
    AllowlistRead,
    /// Live `balanceOf(user)` read.
    BalanceRead,
    /// `Deposit` log event.
    DepositEvent,
}

impl fmt::Display for FactSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self {
            Self::OwnerRead => "owner-read",
            Self::AllowlistEvent => "allowlist-event",
            Self::AllowlistRead => "allowlist-read",
            Self::BalanceRead => "balance-read",
            Self::DepositEvent => "deposit-event",
        };
        f.write_str(tag)
    }
}

/// The payload of a fact: a flag for owner/allowlist facts, an amount for
/// balance/deposit facts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FactValue {
    /// Boolean observation (ownership, allowlist status).
    Flag(bool),
    /// Unsigned amount observation (balance, deposit assets).
    Amount(U256),
}

/// One atomic, immutable observation about a user's relationship to a vault.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, bon::Builder)]
pub struct MembershipFact {
    /// Vault the observation concerns.
    pub vault: Address,
    /// User the observation concerns.
    pub user: Address,
    /// Aspect observed.
    pub kind: FactKind,
    /// Observed value.
    pub value: FactValue,
    /// Block height of the observation; `None` for a live read.
    pub observed_at_block: Option<u64>,
    /// Provenance tag.
    pub source: FactSource,
}

impl MembershipFact {
    /// Fact derived from an `AllowlistUpdated(user, allowed)` log.
    #[must_use]
    pub fn allowlist_event(vault: Address, user: Address, allowed: bool, block: u64) -> Self {
        Self {
            vault,
            user,
            kind: FactKind::Allowlist,
            value: FactValue::Flag(allowed),
            observed_at_block: Some(block),
            source: FactSource::AllowlistEvent,
        }
    }

    /// Fact derived from a `Deposit(caller, owner, assets, shares)` log,
    /// keyed on the share recipient.
    #[must_use]
    pub fn deposit_event(vault: Address, owner: Address, assets: U256, block: u64) -> Self {
        Self {
            vault,
            user: owner,
            kind: FactKind::DepositActivity,
            value: FactValue::Amount(assets),
            observed_at_block: Some(block),
            source: FactSource::DepositEvent,
        }
    }

    /// True if this fact nominates its user as a reconciliation candidate
    /// (allowlist targets and depositors; owner candidacy comes from the
    /// live owner read, balance facts are already per-candidate output).
    #[must_use]
    pub fn nominates_candidate(&self) -> bool {
        matches!(self.kind, FactKind::Allowlist | FactKind::DepositActivity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(byte: u8) -> Address {
        Address::repeat_byte(byte)
    }

    #[test]
    fn allowlist_event_fact_carries_block_and_source() {
        let fact = MembershipFact::allowlist_event(addr(1), addr(2), true, 42);
        assert_eq!(fact.kind, FactKind::Allowlist);
        assert_eq!(fact.value, FactValue::Flag(true));
        assert_eq!(fact.observed_at_block, Some(42));
        assert_eq!(fact.source, FactSource::AllowlistEvent);
        assert!(fact.nominates_candidate());
    }

    #[test]
    fn deposit_fact_is_keyed_on_share_recipient() {
        let fact = MembershipFact::deposit_event(addr(1), addr(3), U256::from(500u64), 7);
        assert_eq!(fact.user, addr(3));
        assert_eq!(fact.value, FactValue::Amount(U256::from(500u64)));
        assert!(fact.nominates_candidate());
    }

    #[test]
    fn source_tags_match_wire_convention() {
        assert_eq!(FactSource::AllowlistEvent.to_string(), "allowlist-event");
        assert_eq!(FactSource::DepositEvent.to_string(), "deposit-event");
        assert_eq!(FactSource::BalanceRead.to_string(), "balance-read");
    }

    #[test]
    fn facts_serialize_with_kebab_case_sources() {
        let fact = MembershipFact::allowlist_event(addr(1), addr(2), false, 9);
        let json = serde_json::to_string(&fact).unwrap();
        assert!(json.contains("allowlist-event"));
        let back: MembershipFact = serde_json::from_str(&json).unwrap();
        assert_eq!(back, fact);
    }
}
