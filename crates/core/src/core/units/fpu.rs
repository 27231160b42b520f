//! Double-precision floating-point arithmetic.

use crate::common::Value;
use crate::isa::Opcode;

/// Computes `ADD.D`/`SUB.D` on two doubles.
///
/// # Panics
///
/// Panics if `op` is not `ADD.D` or `SUB.D`.
#[must_use]
pub fn add(op: Opcode, a: Value, b: Value) -> Value {
    match op {
        Opcode::AddD => Value::Float(a.as_float() + b.as_float()),
        Opcode::SubD => Value::Float(a.as_float() - b.as_float()),
        other => unreachable!("{other} is not an FP adder opcode"),
    }
}

/// Computes `MULT.D` on two doubles.
///
/// # Panics
///
/// Panics if `op` is not `MULT.D`.
#[must_use]
pub fn multiply(op: Opcode, a: Value, b: Value) -> Value {
    match op {
        Opcode::MultD => Value::Float(a.as_float() * b.as_float()),
        other => unreachable!("{other} is not the FP multiplier opcode"),
    }
}
