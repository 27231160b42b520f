//! Opcode, operand, and decoded-instruction types.

use std::fmt;

use crate::common::Register;

/// The operation an instruction performs.
///
/// Integer arithmetic operates on `i64`; floating-point arithmetic operates
/// on `f64`. `Ld`/`Sd` go through the load/store queue; `Beq`/`Bne` go
/// through the branch unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Opcode {
    /// `ADD Rd, Rs, Rt` — integer addition.
    Add,
    /// `ADDI Rd, Rs, imm` — integer addition with an immediate.
    Addi,
    /// `SUB Rd, Rs, Rt` — integer subtraction.
    Sub,
    /// `SUBI Rd, Rs, imm` — integer subtraction with an immediate.
    Subi,
    /// `ADD.D Fd, Fs, Ft` — double-precision addition.
    AddD,
    /// `SUB.D Fd, Fs, Ft` — double-precision subtraction.
    SubD,
    /// `MULT.D Fd, Fs, Ft` — double-precision multiplication.
    MultD,
    /// `LD Rt, offset(Rs)` — load a word from memory.
    Ld,
    /// `SD Rt, offset(Rs)` — store a word to memory.
    Sd,
    /// `BEQ Rs, Rt, offset` — branch if equal.
    Beq,
    /// `BNE Rs, Rt, offset` — branch if not equal.
    Bne,
    /// `NOP` — no operation; occupies a pipeline slot but touches no state.
    Nop,
}

impl Opcode {
    /// Returns true for `ADD.D`/`SUB.D`/`MULT.D`.
    #[must_use]
    pub const fn is_fp_arith(self) -> bool {
        matches!(self, Self::AddD | Self::SubD | Self::MultD)
    }

    /// Returns true for `LD`/`SD`.
    #[must_use]
    pub const fn is_memory(self) -> bool {
        matches!(self, Self::Ld | Self::Sd)
    }

    /// Returns true for `BEQ`/`BNE`.
    #[must_use]
    pub const fn is_branch(self) -> bool {
        matches!(self, Self::Beq | Self::Bne)
    }

    /// Returns true if this opcode writes an architectural destination
    /// register (excludes `SD`, branches, and `NOP`).
    #[must_use]
    pub const fn writes_dest(self) -> bool {
        !matches!(self, Self::Sd | Self::Beq | Self::Bne | Self::Nop)
    }

    /// The mnemonic used in program text and trace output.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Add => "ADD",
            Self::Addi => "ADDI",
            Self::Sub => "SUB",
            Self::Subi => "SUBI",
            Self::AddD => "ADD.D",
            Self::SubD => "SUB.D",
            Self::MultD => "MULT.D",
            Self::Ld => "LD",
            Self::Sd => "SD",
            Self::Beq => "BEQ",
            Self::Bne => "BNE",
            Self::Nop => "NOP",
        }
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A source operand as written in the program text: either a register to be
/// renamed through the RAT, or an immediate literal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Operand {
    /// A register name, resolved through the RAT at issue time.
    Register(Register),
    /// An immediate literal, already known at decode time.
    Literal(i64),
}

/// A fully decoded instruction, as produced by the textual decoder and
/// consumed by the instruction queue.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Instruction {
    /// Unique, monotonically-increasing ID assigned at decode time. Doubles
    /// as program order for commit and as the key into the completion record.
    pub id: u32,
    /// The operation this instruction performs.
    pub opcode: Opcode,
    /// Architectural destination register, if any (see [`Opcode::writes_dest`]).
    pub dest: Option<Register>,
    /// First source operand. For `LD`/`SD` this is the base register used to
    /// compute the effective address. For branches, the left comparand.
    pub src1: Option<Operand>,
    /// Second source operand. For `SD`, this is the store-data register
    /// (renamed independently of the address in `src1`). For branches, the
    /// right comparand. Unused by `LD` and `NOP`.
    pub src2: Option<Operand>,
    /// Byte displacement for `LD`/`SD`; signed instruction-count offset for
    /// `BEQ`/`BNE`. Zero and unused otherwise.
    pub offset: i64,
}

impl Instruction {
    /// Builds a `NOP` with the given ID; used to pad decode errors and as
    /// the queue's sentinel instruction.
    #[must_use]
    pub const fn nop(id: u32) -> Self {
        Self {
            id,
            opcode: Opcode::Nop,
            dest: None,
            src1: None,
            src2: None,
            offset: 0,
        }
    }
}
