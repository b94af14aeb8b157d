//! Vault context and portfolio aggregates.

use alloy_primitives::{Address, U256};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::membership::{Role, VaultMembership};

/// Asset decimal precision assumed when a vault does not report one
/// (stablecoin convention).
pub const DEFAULT_DECIMALS: u8 = 6;

/// Read-only summary of a vault contract, fetched via live reads.
///
/// The reconciliation engine treats this as context owned by the dashboard
/// layer; it never writes any of these fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, bon::Builder)]
pub struct VaultInfo {
    /// Vault contract address.
    pub address: Address,
    /// Underlying asset contract address.
    pub asset: Address,
    /// Vault display name.
    #[builder(into, default)]
    pub name: String,
    /// Vault share token symbol.
    #[builder(into, default)]
    pub symbol: String,
    /// Total assets under management, in base units.
    #[builder(default = U256::ZERO)]
    pub total_assets: U256,
    /// Total shares outstanding.
    #[builder(default = U256::ZERO)]
    pub total_supply: U256,
    /// Whether deposits are currently paused.
    #[builder(default = false)]
    pub is_paused: bool,
    /// Whether the membership allowlist gate is enabled.
    #[builder(default = false)]
    pub allowlist_enabled: bool,
    /// Per-vault deposit cap in base units; zero means uncapped.
    #[builder(default = U256::ZERO)]
    pub deposit_cap: U256,
    /// Minimum accepted deposit in base units.
    #[builder(default = U256::ZERO)]
    pub min_deposit: U256,
    /// Asset decimal precision.
    #[builder(default = DEFAULT_DECIMALS)]
    pub decimals: u8,
}

impl VaultInfo {
    /// Placeholder record used when the live info read failed, so a
    /// partial-data vault still yields best-effort membership rows.
    #[must_use]
    pub fn placeholder(address: Address) -> Self {
        Self::builder().address(address).asset(Address::ZERO).build()
    }
}

/// Aggregate over one user's memberships across vaults.
///
/// `total_value_locked` is kept exact; rounding to two decimal places
/// happens only in [`PortfolioSummary::total_value_locked_rounded`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortfolioSummary {
    /// Number of vaults where the user is a member.
    pub total_vaults: usize,
    /// Vaults where the user holds the admin role.
    pub admin_vaults: usize,
    /// Vaults where the user holds the member role.
    pub member_vaults: usize,
    /// Sum of balances converted to decimal units, exact.
    pub total_value_locked: Decimal,
}

impl PortfolioSummary {
    /// The all-zero summary, returned for users with no memberships.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            total_vaults: 0,
            admin_vaults: 0,
            member_vaults: 0,
            total_value_locked: Decimal::ZERO,
        }
    }

    /// Records one membership-true row in the summary.
    pub fn record(&mut self, membership: &VaultMembership, value: Decimal) {
        self.total_vaults += 1;
        match membership.role {
            Role::Admin => self.admin_vaults += 1,
            Role::Member => self.member_vaults += 1,
        }
        self.total_value_locked = self.total_value_locked.saturating_add(value);
    }

    /// Presentation-time TVL, rounded to two decimal places.
    #[must_use]
    pub fn total_value_locked_rounded(&self) -> Decimal {
        self.total_value_locked.round_dp(2)
    }
}

impl Default for PortfolioSummary {
    fn default() -> Self {
        Self::empty()
    }
}
