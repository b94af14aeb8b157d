//! Reconciled membership records.
//!
//! A [`VaultMembership`] is the current-truth view of one (vault, user)
//! pair, derived from live reads. It is recomputed on every reconciliation
//! pass; a later pass supersedes an earlier one, nothing is deleted.

use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};

/// Role a member holds in a vault. Only meaningful when
/// [`VaultMembership::is_member`] is true.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The vault owner.
    Admin,
    /// Any other member.
    Member,
}

/// Current-truth membership view of one (vault, user) pair.
///
/// # Invariants
///
/// - `is_member == is_owner || balance > 0 || is_on_allowlist` — no other
///   path sets membership.
/// - `role == Admin` iff `is_owner`.
/// - `balance` comes from a live read only; event-sourced deposit amounts
///   are discovery hints and never land here.
///
/// Both hold by construction: the only way to build a record is
/// [`VaultMembership::derive`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaultMembership {
    /// Vault contract address.
    pub vault: Address,
    /// User account address.
    pub user: Address,
    /// True iff the live owner read equals this user.
    pub is_owner: bool,
    /// True iff the vault's allowlist is enabled and the user is on it.
    pub is_on_allowlist: bool,
    /// Share balance from a live read.
    pub balance: U256,
    /// Derived membership flag.
    pub is_member: bool,
    /// Derived role.
    pub role: Role,
}

impl VaultMembership {
    /// Derives a membership record from reconciled inputs.
    #[must_use]
    pub fn derive(
        vault: Address,
        user: Address,
        is_owner: bool,
        is_on_allowlist: bool,
        balance: U256,
    ) -> Self {
        let is_member = is_owner || balance > U256::ZERO || is_on_allowlist;
        let role = if is_owner { Role::Admin } else { Role::Member };
        Self { vault, user, is_owner, is_on_allowlist, balance, is_member, role }
    }
}
