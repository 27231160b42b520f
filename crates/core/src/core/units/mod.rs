//! Execution unit arithmetic.
//!
//! The pipeline's three functional-unit banks (integer ALU, FP adder, FP
//! multiplier) share one generic runner
//! ([`crate::core::pipeline::functional_unit::FunctionalUnit`]); this module
//! supplies the per-opcode compute functions it dispatches to.

/// Integer arithmetic (`ADD`, `ADDI`, `SUB`, `SUBI`).
pub mod alu;

/// Double-precision arithmetic (`ADD.D`, `SUB.D`, `MULT.D`).
pub mod fpu;
