//! Vault membership reconciliation engine.
//!
//! Reconstructs who is a member of a vault, and with what balance, from two
//! unequal sources: scanned log events (a discovery hint) and live contract
//! reads (the truth). The pipeline has three phases, each independently
//! testable:
//!
//! 1. [`EventIngestor`] — scans a bounded block window for allowlist and
//!    deposit logs and normalizes them into membership facts. Never fails;
//!    degraded scans are marked partial.
//! 2. [`StateReconciler`] — merges facts with authoritative reads into one
//!    [`VaultMembership`](vaultscope_types::VaultMembership) per candidate,
//!    defaulting failed fields to safe values.
//! 3. [`AggregateView`] — folds memberships across vaults into a
//!    [`PortfolioSummary`](vaultscope_types::PortfolioSummary).
//!
//! [`MembershipService`] composes the phases behind the interface the
//! presentation layer consumes. Every pass is stateless given its inputs,
//! so re-scans and retries are idempotent; passes for different vaults may
//! run concurrently against the same shared
//! [`ChainRead`](vaultscope_chain::ChainRead) collaborator.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod aggregate;
mod ingest;
mod reconcile;
mod service;

pub use aggregate::{base_units_to_decimal, AggregateView};
pub use ingest::{EventIngestor, FactSet};
pub use reconcile::{defaults, StateReconciler};
pub use service::MembershipService;
