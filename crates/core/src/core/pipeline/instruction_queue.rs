//! Instruction queue.
//!
//! Holds the fully decoded program and a program counter. `fetch` is the
//! only way the PC advances; `offset` lets the Issue stage skip over
//! instructions that were already consumed (e.g. after a branch target
//! redirects into the middle of the program) while still bumping the PC by
//! the right amount.

use crate::isa::Instruction;

/// The decoded program plus a PC, ready to be issued one instruction at a
/// time.
pub struct InstructionQueue {
    instructions: Vec<Instruction>,
    pc: usize,
}

impl InstructionQueue {
    /// Builds a queue over `instructions`, starting at PC 0.
    #[must_use]
    pub const fn new(instructions: Vec<Instruction>) -> Self {
        Self { instructions, pc: 0 }
    }

    /// Looks at the instruction `offset` past the current PC without
    /// consuming it.
    #[must_use]
    pub fn peek(&self, offset: usize) -> Option<&Instruction> {
        self.instructions.get(self.pc + offset)
    }

    /// Consumes the instruction `offset` past the current PC, advancing the
    /// PC by `1 + offset`.
    pub fn fetch(&mut self, offset: usize) -> Option<Instruction> {
        let instr = self.peek(offset).copied()?;
        self.pc += 1 + offset;
        Some(instr)
    }

    /// Returns true if there is no instruction `offset` past the current PC.
    #[must_use]
    pub fn empty(&self, offset: usize) -> bool {
        self.peek(offset).is_none()
    }

    /// Redirects the PC, as the branch unit does after a misprediction.
    pub fn set_pc(&mut self, new_pc: usize) {
        self.pc = new_pc;
    }

    /// The current PC, in instruction-count units.
    #[must_use]
    pub const fn pc(&self) -> usize {
        self.pc
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::isa::Instruction;

    fn program(n: usize) -> InstructionQueue {
        InstructionQueue::new((0..n as u32).map(Instruction::nop).collect())
    }

    #[test]
    fn fetch_advances_pc_by_one_plus_offset() {
        let mut q = program(5);
        let i = q.fetch(0).unwrap();
        assert_eq!(i.id, 0);
        assert_eq!(q.pc(), 1);
        let i = q.fetch(2).unwrap();
        assert_eq!(i.id, 3);
        assert_eq!(q.pc(), 4);
    }

    #[test]
    fn empty_reports_end_of_program() {
        let q = program(1);
        assert!(!q.empty(0));
        assert!(q.empty(1));
    }

    #[test]
    fn set_pc_redirects_for_branch_targets() {
        let mut q = program(5);
        q.set_pc(3);
        assert_eq!(q.fetch(0).unwrap().id, 3);
    }
}
