//! Core types, errors, and configuration for Vaultscope.
//!
//! This crate provides the foundational types used throughout the
//! reconciliation engine:
//! - Identifier parsing and scan-window arithmetic
//! - Membership facts (atomic on-chain observations)
//! - Reconciled membership records and portfolio summaries
//! - Error types using snafu
//! - Explicit configuration objects (no ambient global state)

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod fact;
pub mod ids;
pub mod membership;
pub mod vault;

// Re-export commonly used types at crate root
pub use config::{ChainConfig, EngineConfig, RetryPolicy, ScanConfig};
pub use error::{EngineError, ReadError, Result};
pub use fact::{FactKind, FactSource, FactValue, MembershipFact};
pub use ids::{parse_address, BlockWindow};
pub use membership::{Role, VaultMembership};
pub use vault::{PortfolioSummary, VaultInfo};

// Re-export the EVM primitives used pervasively in public signatures so
// downstream crates don't need a direct alloy-primitives dependency.
pub use alloy_primitives::{Address, U256};
