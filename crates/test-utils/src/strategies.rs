//! Proptest strategies for Vaultscope domain types.
//!
//! Reusable generators for property-based testing across crates. Strategies
//! produce well-formed domain values while exploring edge cases through
//! random variation.
//!
//! # Usage
//!
//! ```no_run
//! use vaultscope_test_utils::strategies;
//! use proptest::prelude::*;
//!
//! proptest! {
//!     #[test]
//!     fn my_property(fact in strategies::arb_fact()) {
//!         // test invariant with a randomly generated fact
//!     }
//! }
//! ```

use alloy_primitives::{Address, U256};
use proptest::prelude::*;
use vaultscope_types::MembershipFact;

/// Generates an arbitrary EVM address.
pub fn arb_address() -> impl Strategy<Value = Address> {
    any::<[u8; 20]>().prop_map(Address::from)
}

/// Generates a small pool of distinct addresses, useful when tests need
/// collisions between owners, depositors, and allowlist targets.
pub fn arb_address_pool() -> impl Strategy<Value = Address> {
    (0u8..8).prop_map(Address::repeat_byte)
}

/// Generates a balance amount within u128 range (realistic for base units;
/// keeps decimal conversion exact).
pub fn arb_amount() -> impl Strategy<Value = U256> {
    any::<u128>().prop_map(U256::from)
}

/// Generates a block height within a scanning-friendly range.
pub fn arb_block() -> impl Strategy<Value = u64> {
    0u64..1_000_000
}

/// Generates an arbitrary membership fact from either log category.
pub fn arb_fact() -> impl Strategy<Value = MembershipFact> {
    prop_oneof![
        (arb_address_pool(), arb_address_pool(), any::<bool>(), arb_block()).prop_map(
            |(vault, user, allowed, block)| MembershipFact::allowlist_event(
                vault, user, allowed, block
            )
        ),
        (arb_address_pool(), arb_address_pool(), arb_amount(), arb_block()).prop_map(
            |(vault, owner, assets, block)| MembershipFact::deposit_event(
                vault, owner, assets, block
            )
        ),
    ]
}
