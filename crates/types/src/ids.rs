//! Identifier parsing and block-window arithmetic.
//!
//! String identifiers arriving from the presentation layer are parsed into
//! [`Address`] values before any I/O is issued; parsing normalizes case, so
//! all downstream comparisons are case-insensitive by construction.

use alloy_primitives::Address;
use snafu::OptionExt;

use crate::error::{EngineError, InvalidAddressSnafu, InvalidRangeSnafu, Result};

/// Parses a vault or user identifier into an [`Address`].
///
/// Accepts 40 hex digits with or without a `0x` prefix, in any case.
/// Surrounding whitespace is tolerated.
///
/// # Errors
///
/// Returns [`EngineError::InvalidAddress`] if the input is not a well-formed
/// EVM address.
pub fn parse_address(input: &str) -> Result<Address> {
    input
        .trim()
        .parse::<Address>()
        .ok()
        .context(InvalidAddressSnafu { input })
}

/// An inclusive block range for log scanning.
///
/// Construction enforces `from <= to`, so every window handed to the event
/// ingestor is already valid; downstream code never re-checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockWindow {
    from: u64,
    to: u64,
}

impl BlockWindow {
    /// Creates a window covering blocks `from..=to`.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidRange`] if `from > to`.
    pub fn new(from: u64, to: u64) -> Result<Self> {
        snafu::ensure!(from <= to, InvalidRangeSnafu { from, to });
        Ok(Self { from, to })
    }

    /// Window ending at `head`, reaching back `lookback` blocks (saturating
    /// at genesis).
    #[must_use]
    pub fn lookback_from(head: u64, lookback: u64) -> Self {
        Self { from: head.saturating_sub(lookback), to: head }
    }

    /// First block of the window.
    #[must_use]
    pub const fn from(self) -> u64 {
        self.from
    }

    /// Last block of the window (inclusive).
    #[must_use]
    pub const fn to(self) -> u64 {
        self.to
    }

    /// Number of blocks covered, always >= 1.
    ///
    /// Saturates at `u64::MAX` for a window spanning the whole block
    /// number space.
    #[must_use]
    pub const fn width(self) -> u64 {
        (self.to - self.from).saturating_add(1)
    }

    /// Returns the front half of this window, used when a provider rejects
    /// the full range.
    ///
    /// The result is always strictly smaller; a window already at the
    /// minimum width of one block cannot shrink and yields `None`.
    #[must_use]
    pub fn halved(self) -> Option<Self> {
        let half = self.width() / 2;
        if half == 0 {
            None
        } else {
            Some(Self { from: self.from, to: self.from + half - 1 })
        }
    }
}
