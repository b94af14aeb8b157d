//! Chain-read collaborator boundary for Vaultscope.
//!
//! The reconciliation engine never talks to an RPC provider directly; it
//! depends on the [`ChainRead`] capability defined here. This crate provides:
//!
//! - [`ChainRead`] — the abstract, stateless, shared read capability
//!   (contract field reads and ordered log queries)
//! - [`with_retry`] — deadline + exponential-backoff wrapper applied to
//!   every engine call site
//! - [`mock::MockChain`] — a controllable in-memory provider with failure
//!   injection for tests and downstream consumers
//!
//! A production implementation backs [`ChainRead`] with a JSON-RPC client
//! (or a pre-indexed subgraph acting as a log cache) constructed from a
//! [`ChainConfig`](vaultscope_types::ChainConfig); that transport lives
//! outside this crate.

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod mock;
mod reader;
mod retry;

pub use reader::{ChainRead, EventKind, LogRecord, VaultEvent};
pub use retry::with_retry;

// Re-export so call sites can name collaborator errors without a direct
// vaultscope-types import.
pub use vaultscope_types::ReadError;
