//! Core micro-architectural state and pipeline.
//!
//! Holds the register renaming state (ARF + RAT) and the pipeline module,
//! which in turn holds the ROB, reservation stations, LSQ, functional
//! units, branch unit, and the orchestrator that drives them one cycle
//! at a time.

/// Architectural Register File.
pub mod arf;

/// Instruction pipeline: ROB, reservation stations, LSQ, functional units,
/// branch unit, and the per-cycle orchestrator.
pub mod pipeline;

/// Register Alias Table.
pub mod rat;

/// Functional units (integer ALU, FP adder, FP multiplier).
pub mod units;

pub use self::arf::Arf;
pub use self::rat::Rat;
