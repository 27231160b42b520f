//! Global simulator constants.
//!
//! This module defines system-wide constants used across the simulator:
//! 1. **Register file sizing:** integer and floating-point register counts.
//! 2. **Memory sizing:** word/byte counts of the flat memory array.
//! 3. **Simulation control:** the hang-detection cycle cap.

/// Number of integer registers (`R0..R31`).
pub const NUM_INT_REGS: usize = 32;

/// Number of floating-point registers (`F0..F31`).
pub const NUM_FP_REGS: usize = 32;

/// Number of 4-byte words in the memory unit (256 bytes total).
pub const MEM_WORDS: usize = 64;

/// Word size in bytes.
pub const WORD_BYTES: usize = 4;

/// Total addressable memory size in bytes.
pub const MEM_BYTES: usize = MEM_WORDS * WORD_BYTES;

/// Safety cap on simulated cycles, guarding against an orchestrator bug
/// that would otherwise loop forever. Expressed as a multiplier applied to
/// the instruction count by the caller; this is the minimum floor.
pub const MIN_CYCLE_CAP: u64 = 10_000;
