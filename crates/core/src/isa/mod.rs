//! Instruction set definitions for the simulated core.
//!
//! Contains the opcode and operand tagged enums, the decoded [`Instruction`]
//! structure, and the textual decoder that turns a line from the
//! `Instructions:` section of the input file into an [`Instruction`].
//!
//! # Instruction set
//!
//! * Integer: `ADD`, `ADDI`, `SUB`, `SUBI`.
//! * Floating-point: `ADD.D`, `SUB.D`, `MULT.D`.
//! * Memory: `LD`, `SD`.
//! * Control flow: `BEQ`, `BNE`.
//! * `NOP`.

/// Textual instruction decoding.
pub mod decode;

/// Opcode, operand, and decoded-instruction structures.
pub mod instruction;

pub use instruction::{Instruction, Opcode, Operand};
