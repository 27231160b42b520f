//! Textual instruction decoder.
//!
//! Turns one line from the `Instructions:` section of the input file into an
//! [`Instruction`]. Operands are whitespace-separated and may carry trailing
//! commas (`ADD R1, R2, R3` and `ADD R1 R2 R3` both decode the same way).

use crate::common::{Register, SimError};
use crate::isa::instruction::{Instruction, Opcode, Operand};

/// Decodes a single instruction line, assigning it the given ID.
///
/// # Errors
///
/// Returns [`SimError::Config`] if the mnemonic is unrecognized, an operand
/// is missing, or a register name / immediate fails to parse.
pub fn decode_line(id: u32, line: &str) -> Result<Instruction, SimError> {
    let mut tokens = line.split_whitespace().map(|t| t.trim_matches(','));
    let mnemonic = tokens
        .next()
        .ok_or_else(|| SimError::Config(format!("empty instruction line: {line:?}")))?;

    let opcode = match mnemonic.to_ascii_uppercase().as_str() {
        "ADD" => Opcode::Add,
        "ADDI" => Opcode::Addi,
        "SUB" => Opcode::Sub,
        "SUBI" => Opcode::Subi,
        "ADD.D" => Opcode::AddD,
        "SUB.D" => Opcode::SubD,
        "MULT.D" => Opcode::MultD,
        "LD" => Opcode::Ld,
        "SD" => Opcode::Sd,
        "BEQ" => Opcode::Beq,
        "BNE" => Opcode::Bne,
        "NOP" => Opcode::Nop,
        other => return Err(SimError::Config(format!("unknown opcode {other:?}"))),
    };

    let rest: Vec<&str> = tokens.collect();

    match opcode {
        Opcode::Add | Opcode::Sub | Opcode::AddD | Opcode::SubD | Opcode::MultD => {
            let [d, s, t] = take3(&rest, line)?;
            Ok(Instruction {
                id,
                opcode,
                dest: Some(reg(d, line)?),
                src1: Some(Operand::Register(reg(s, line)?)),
                src2: Some(Operand::Register(reg(t, line)?)),
                offset: 0,
            })
        }
        Opcode::Addi | Opcode::Subi => {
            let [d, s, imm] = take3(&rest, line)?;
            Ok(Instruction {
                id,
                opcode,
                dest: Some(reg(d, line)?),
                src1: Some(Operand::Register(reg(s, line)?)),
                src2: Some(Operand::Literal(int(imm, line)?)),
                offset: 0,
            })
        }
        Opcode::Ld => {
            let [rt, mem] = take2(&rest, line)?;
            let (offset, base) = mem_operand(mem, line)?;
            Ok(Instruction {
                id,
                opcode,
                dest: Some(reg(rt, line)?),
                src1: Some(Operand::Register(base)),
                src2: None,
                offset,
            })
        }
        Opcode::Sd => {
            let [rt, mem] = take2(&rest, line)?;
            let (offset, base) = mem_operand(mem, line)?;
            Ok(Instruction {
                id,
                opcode,
                dest: None,
                src1: Some(Operand::Register(base)),
                src2: Some(Operand::Register(reg(rt, line)?)),
                offset,
            })
        }
        Opcode::Beq | Opcode::Bne => {
            let [s, t, off] = take3(&rest, line)?;
            Ok(Instruction {
                id,
                opcode,
                dest: None,
                src1: Some(Operand::Register(reg(s, line)?)),
                src2: Some(Operand::Register(reg(t, line)?)),
                offset: int(off, line)?,
            })
        }
        Opcode::Nop => Ok(Instruction::nop(id)),
    }
}

fn take2<'a>(rest: &[&'a str], line: &str) -> Result<[&'a str; 2], SimError> {
    match rest {
        [a, b] => Ok([a, b]),
        _ => Err(SimError::Config(format!(
            "expected 2 operands: {line:?}"
        ))),
    }
}

fn take3<'a>(rest: &[&'a str], line: &str) -> Result<[&'a str; 3], SimError> {
    match rest {
        [a, b, c] => Ok([a, b, c]),
        _ => Err(SimError::Config(format!(
            "expected 3 operands: {line:?}"
        ))),
    }
}

fn reg(token: &str, line: &str) -> Result<Register, SimError> {
    Register::parse(token)
        .ok_or_else(|| SimError::Config(format!("invalid register {token:?} in {line:?}")))
}

fn int(token: &str, line: &str) -> Result<i64, SimError> {
    token
        .parse()
        .map_err(|_| SimError::Config(format!("invalid integer {token:?} in {line:?}")))
}

/// Parses the `offset(Rs)` memory operand of `LD`/`SD`.
fn mem_operand(token: &str, line: &str) -> Result<(i64, Register), SimError> {
    let open = token
        .find('(')
        .ok_or_else(|| SimError::Config(format!("malformed memory operand {token:?} in {line:?}")))?;
    let close = token
        .find(')')
        .ok_or_else(|| SimError::Config(format!("malformed memory operand {token:?} in {line:?}")))?;
    let offset = int(&token[..open], line)?;
    let base = reg(&token[open + 1..close], line)?;
    Ok((offset, base))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_integer_arithmetic() {
        let i = decode_line(0, "ADDI R1, R0, 5").unwrap();
        assert_eq!(i.opcode, Opcode::Addi);
        assert_eq!(i.dest, Some(Register::Int(1)));
        assert_eq!(i.src1, Some(Operand::Register(Register::Int(0))));
        assert_eq!(i.src2, Some(Operand::Literal(5)));
    }

    #[test]
    fn decodes_load_and_store() {
        let ld = decode_line(1, "LD F1, 0(R1)").unwrap();
        assert_eq!(ld.opcode, Opcode::Ld);
        assert_eq!(ld.dest, Some(Register::Fp(1)));
        assert_eq!(ld.src1, Some(Operand::Register(Register::Int(1))));
        assert_eq!(ld.offset, 0);

        let sd = decode_line(2, "SD F0, 0(R1)").unwrap();
        assert_eq!(sd.opcode, Opcode::Sd);
        assert_eq!(sd.dest, None);
        assert_eq!(sd.src1, Some(Operand::Register(Register::Int(1))));
        assert_eq!(sd.src2, Some(Operand::Register(Register::Fp(0))));
    }

    #[test]
    fn decodes_branch_with_signed_offset() {
        let b = decode_line(3, "BNE R1, R0, 2").unwrap();
        assert_eq!(b.opcode, Opcode::Bne);
        assert_eq!(b.offset, 2);
    }

    #[test]
    fn rejects_unknown_mnemonic() {
        assert!(decode_line(0, "JMP R1").is_err());
    }
}
