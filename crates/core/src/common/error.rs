//! Crate-wide error type.
//!
//! This module defines the error handling for the simulator. It provides:
//! 1. **Configuration errors:** malformed input files, reported before the core starts.
//! 2. **Out-of-range memory access:** a fatal condition naming the offending address.
//! 3. **Invariant violations:** fatal assertions indicating a simulator bug.

use thiserror::Error;

/// Errors that can occur while loading a configuration or running a simulation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimError {
    /// The input file was malformed; the offending line or reason is included.
    #[error("malformed configuration: {0}")]
    Config(String),

    /// A memory access fell outside the configured memory unit's address range.
    #[error("out-of-range memory address: {addr}")]
    OutOfRangeMemory {
        /// The offending byte address.
        addr: usize,
    },

    /// An internal invariant was violated, indicating a simulator bug rather
    /// than a malformed program.
    #[error("invariant violation: {0}")]
    InvariantViolation(String),
}

impl SimError {
    /// Converts an `Option` that should always be `Some` into a `Result`,
    /// debug-asserting the invariant too so a violation panics loudly in
    /// debug builds instead of only surfacing as a returned error.
    pub fn require<T>(value: Option<T>, msg: &str) -> Result<T, Self> {
        debug_assert!(value.is_some(), "{msg}");
        value.ok_or_else(|| Self::InvariantViolation(msg.to_string()))
    }
}
