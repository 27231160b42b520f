//! Integer arithmetic.
//!
//! `BEQ`/`BNE` share this bank rather than getting their own: a branch's
//! "result" is its taken/not-taken outcome, computed by the same ALU that
//! handles `ADD`/`SUB`, and drained separately by the Branch-check phase.

use crate::common::Value;
use crate::isa::Opcode;

/// Computes an integer-ALU opcode. `b` is a register value for `ADD`/`SUB`/
/// `BEQ`/`BNE` and a literal for `ADDI`/`SUBI`; both are already resolved
/// `Value`s by the time they reach here.
///
/// # Panics
///
/// Panics if `op` is not one of `ADD`, `ADDI`, `SUB`, `SUBI`, `BEQ`, `BNE`.
#[must_use]
pub fn execute(op: Opcode, a: Value, b: Value) -> Value {
    match op {
        Opcode::Add | Opcode::Addi => Value::Int(a.as_int().wrapping_add(b.as_int())),
        Opcode::Sub | Opcode::Subi => Value::Int(a.as_int().wrapping_sub(b.as_int())),
        Opcode::Beq => Value::from_bool(a.as_int() == b.as_int()),
        Opcode::Bne => Value::from_bool(a.as_int() != b.as_int()),
        other => unreachable!("{other} is not an integer ALU opcode"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_and_sub_wrap_on_overflow() {
        assert_eq!(
            execute(Opcode::Add, Value::Int(i64::MAX), Value::Int(1)),
            Value::Int(i64::MIN)
        );
        assert_eq!(
            execute(Opcode::Sub, Value::Int(5), Value::Int(8)),
            Value::Int(-3)
        );
    }
}
