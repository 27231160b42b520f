//! Tomasulo-style out-of-order CPU pipeline simulator.
//!
//! Simulates register renaming through a Register Alias Table, reservation
//! stations, a reorder buffer, a common data bus, and one-bit branch
//! prediction with speculative rollback, cycle by cycle, over a program
//! described by a line-oriented input file.
//!
//! 1. **Common:** registers, tagged values, and the crate-wide error type.
//! 2. **Config:** parses the input file into a runnable [`Config`].
//! 3. **Core:** the ARF and RAT, plus the pipeline's ROB, reservation
//!    stations, LSQ, and functional units, tied together by the per-cycle
//!    orchestrator.
//! 4. **ISA:** opcodes, operands, and the textual instruction decoder.
//! 5. **Memory:** flat, word-addressed main memory.
//! 6. **Sim:** the top-level `Simulator` and its run report.

/// Registers, tagged values, and the crate-wide error type.
pub mod common;
/// Input-file parsing into a runnable [`Config`].
pub mod config;
/// Register renaming state and the instruction pipeline.
pub mod core;
/// Opcodes, operands, and the textual instruction decoder.
pub mod isa;
/// Flat, word-addressed main memory.
pub mod memory;
/// The top-level `Simulator` and its run report.
pub mod sim;

/// A fully parsed run configuration; build one with [`config::load`] or [`config::parse`].
pub use crate::config::Config;
/// The crate-wide error type.
pub use crate::common::SimError;
/// A rendered simulation outcome, produced by [`Simulator::run`].
pub use crate::sim::SimulationReport;
/// Top-level simulator; build with [`Simulator::new`] and drive with [`Simulator::run`].
pub use crate::sim::Simulator;
