//! Portfolio aggregation across vaults.
//!
//! Folds per-vault membership records for one user into a
//! [`PortfolioSummary`]. Sums are exact decimals; rounding to two places
//! happens only in the summary's presentation accessor.

use alloy_primitives::U256;
use rust_decimal::Decimal;
use vaultscope_types::{PortfolioSummary, VaultInfo, VaultMembership};

/// Converts a base-unit amount to decimal units using the asset's
/// precision.
///
/// Amounts beyond `Decimal` range (above ~7.9e28 at scale 0) are clamped to
/// `Decimal::MAX` with a warning; summation saturates rather than wraps.
#[must_use]
pub fn base_units_to_decimal(amount: U256, decimals: u8) -> Decimal {
    let Ok(units) = i128::try_from(amount) else {
        tracing::warn!(%amount, "balance exceeds decimal range; clamping");
        return Decimal::MAX;
    };
    Decimal::try_from_i128_with_scale(units, u32::from(decimals)).unwrap_or_else(|_| {
        tracing::warn!(%amount, decimals, "balance exceeds decimal range; clamping");
        Decimal::MAX
    })
}

/// Folds (vault, membership) rows for a single user into portfolio totals.
#[derive(Debug, Clone, Copy, Default)]
pub struct AggregateView;

impl AggregateView {
    /// Summarizes membership-true rows: admin/member partition plus total
    /// value locked.
    ///
    /// Rows with `is_member == false` are ignored, so callers may pass
    /// unfiltered reconciliation output. An empty input yields the
    /// all-zero summary, never an error.
    #[must_use]
    pub fn summarize(rows: &[(VaultInfo, VaultMembership)]) -> PortfolioSummary {
        let mut summary = PortfolioSummary::empty();
        for (info, membership) in rows {
            if !membership.is_member {
                continue;
            }
            let value = base_units_to_decimal(membership.balance, info.decimals);
            summary.record(membership, value);
        }
        summary
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use alloy_primitives::Address;
    use rust_decimal_macros::dec;

    use super::*;

    fn addr(byte: u8) -> Address {
        Address::repeat_byte(byte)
    }

    fn info(vault: Address, decimals: u8) -> VaultInfo {
        VaultInfo::builder()
            .address(vault)
            .asset(addr(0xee))
            .decimals(decimals)
            .build()
    }

    #[test]
    fn converts_base_units_exactly() {
        assert_eq!(base_units_to_decimal(U256::from(5_000_000u64), 6), dec!(5));
        assert_eq!(base_units_to_decimal(U256::from(1u64), 6), dec!(0.000001));
        assert_eq!(base_units_to_decimal(U256::ZERO, 6), Decimal::ZERO);
    }

    #[test]
    fn oversized_amounts_clamp_instead_of_panicking() {
        let value = base_units_to_decimal(U256::MAX, 6);
        assert_eq!(value, Decimal::MAX);
    }

    #[test]
    fn summary_partitions_roles_and_sums_tvl() {
        let user = addr(7);
        let vault_a = addr(1);
        let vault_b = addr(2);
        let rows = vec![
            (
                info(vault_a, 6),
                VaultMembership::derive(vault_a, user, false, false, U256::from(5_000_000u64)),
            ),
            (
                info(vault_b, 6),
                VaultMembership::derive(vault_b, user, true, false, U256::ZERO),
            ),
        ];

        let summary = AggregateView::summarize(&rows);
        assert_eq!(summary.total_vaults, 2);
        assert_eq!(summary.admin_vaults, 1);
        assert_eq!(summary.member_vaults, 1);
        assert_eq!(summary.total_value_locked_rounded(), dec!(5.00));
    }

    #[test]
    fn non_members_are_excluded() {
        let user = addr(7);
        let vault = addr(1);
        let rows = vec![(
            info(vault, 6),
            VaultMembership::derive(vault, user, false, false, U256::ZERO),
        )];

        let summary = AggregateView::summarize(&rows);
        assert_eq!(summary, PortfolioSummary::empty());
    }

    #[test]
    fn empty_input_yields_zero_summary() {
        assert_eq!(AggregateView::summarize(&[]), PortfolioSummary::empty());
    }

    #[test]
    fn mixed_decimals_convert_per_vault() {
        let user = addr(7);
        let vault_a = addr(1);
        let vault_b = addr(2);
        let rows = vec![
            (
                info(vault_a, 6),
                VaultMembership::derive(vault_a, user, false, false, U256::from(1_500_000u64)),
            ),
            (
                info(vault_b, 18),
                VaultMembership::derive(
                    vault_b,
                    user,
                    false,
                    false,
                    U256::from(2_500_000_000_000_000_000u128),
                ),
            ),
        ];

        let summary = AggregateView::summarize(&rows);
        assert_eq!(summary.total_value_locked, dec!(4.0));
    }
}
