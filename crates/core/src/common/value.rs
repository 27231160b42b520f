//! Tagged numeric value carried on the CDB, in registers, and in memory.
//!
//! Integer registers and arithmetic hold signed 64-bit integers; FP registers
//! and arithmetic hold native `f64` values. A [`Value`] remembers which kind
//! it is so the ARF, memory, and the output formatter can round-trip it
//! without relying on the consuming register's type alone.

use std::fmt;

/// A numeric value that is either a 64-bit signed integer or a double.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value {
    /// Integer result, e.g. from `ADD`/`ADDI`/`SUB`/`SUBI` or a branch comparison.
    Int(i64),
    /// Double-precision result, e.g. from `ADD.D`/`SUB.D`/`MULT.D`.
    Float(f64),
}

impl Value {
    /// Returns the value as an `i64`, truncating a float via `as`.
    #[must_use]
    pub fn as_int(self) -> i64 {
        match self {
            Self::Int(v) => v,
            Self::Float(v) => v as i64,
        }
    }

    /// Returns the value as an `f64`.
    #[must_use]
    pub fn as_float(self) -> f64 {
        match self {
            Self::Int(v) => v as f64,
            Self::Float(v) => v,
        }
    }

    /// Returns a boolean encoded as `Value::Int(0 | 1)` back into a `bool`.
    #[must_use]
    pub fn as_bool(self) -> bool {
        self.as_int() != 0
    }

    /// Encodes a branch outcome as an integer-tagged `Value`.
    #[must_use]
    pub const fn from_bool(taken: bool) -> Self {
        Self::Int(taken as i64)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v:.6}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bool_round_trips_through_int_tag() {
        assert!(Value::from_bool(true).as_bool());
        assert!(!Value::from_bool(false).as_bool());
    }

    #[test]
    fn float_display_uses_six_fractional_digits() {
        assert_eq!(Value::Float(3.14).to_string(), "3.140000");
    }
}
