//! Shared test utilities for Vaultscope crates.
//!
//! Centralizes helpers that would otherwise be duplicated across test
//! modules:
//!
//! - [`strategies`] - proptest generators for domain values
//! - [`config`] - fast default configurations for tests

#![deny(unsafe_code)]
// Test utilities are allowed to use unwrap for simplicity
#![cfg_attr(test, allow(clippy::disallowed_methods))]

pub mod config;
pub mod strategies;

pub use config::test_engine_config;
