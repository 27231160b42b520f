//! Architectural register naming.
//!
//! A [`Register`] names one of the 32 integer (`R0..R31`) or 32
//! floating-point (`F0..F31`) architectural registers. It is the key used
//! by the RAT, the ARF, and every decoded [`crate::isa::Operand`].

use std::fmt;

/// A named architectural register: integer or floating-point, with its index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Register {
    /// Integer register `R0..R31`.
    Int(u8),
    /// Floating-point register `F0..F31`.
    Fp(u8),
}

impl Register {
    /// Parses a register name such as `"R3"` or `"F12"`.
    pub fn parse(name: &str) -> Option<Self> {
        let (tag, rest) = name.split_at_checked(1)?;
        let idx: u8 = rest.parse().ok()?;
        match tag {
            "R" | "r" => Some(Self::Int(idx)),
            "F" | "f" => Some(Self::Fp(idx)),
            _ => None,
        }
    }

    /// Returns true if this names a floating-point register.
    #[must_use]
    pub const fn is_fp(self) -> bool {
        matches!(self, Self::Fp(_))
    }

    /// Returns the register's index within its own bank (0-31).
    #[must_use]
    pub const fn index(self) -> u8 {
        match self {
            Self::Int(i) | Self::Fp(i) => i,
        }
    }
}

impl fmt::Display for Register {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(i) => write!(f, "R{i}"),
            Self::Fp(i) => write!(f, "F{i}"),
        }
    }
}
