//! Register Alias Table (RAT).
//!
//! Maps each architectural register to either the Architectural Register
//! File (its value is committed and stable) or a reorder-buffer tag (its
//! value is still in flight). The Issue stage consults the RAT to rename
//! source operands; Commit consults it to retire the renaming once the
//! producing instruction is the oldest outstanding writer of that register.

use crate::common::Register;
use crate::common::constants::{NUM_FP_REGS, NUM_INT_REGS};

/// Where a register's current value will come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RatEntry {
    /// The ARF holds the committed value.
    Committed,
    /// The value is still being produced by the ROB entry at this index.
    Pending(usize),
}

/// A point-in-time copy of the RAT, taken when a branch issues and restored
/// if that branch is later found to have mispredicted.
#[derive(Debug, Clone)]
pub struct RatSnapshot {
    int: [RatEntry; NUM_INT_REGS],
    fp: [RatEntry; NUM_FP_REGS],
}

/// The register alias table.
#[derive(Debug, Clone)]
pub struct Rat {
    int: [RatEntry; NUM_INT_REGS],
    fp: [RatEntry; NUM_FP_REGS],
}

impl Rat {
    /// Builds a RAT with every register mapped to the ARF.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            int: [RatEntry::Committed; NUM_INT_REGS],
            fp: [RatEntry::Committed; NUM_FP_REGS],
        }
    }

    fn slot(&self, reg: Register) -> &RatEntry {
        match reg {
            Register::Int(i) => &self.int[i as usize],
            Register::Fp(i) => &self.fp[i as usize],
        }
    }

    fn slot_mut(&mut self, reg: Register) -> &mut RatEntry {
        match reg {
            Register::Int(i) => &mut self.int[i as usize],
            Register::Fp(i) => &mut self.fp[i as usize],
        }
    }

    /// Returns where `reg`'s current value comes from.
    #[must_use]
    pub fn lookup(&self, reg: Register) -> RatEntry {
        *self.slot(reg)
    }

    /// Renames `reg` to the producing ROB entry at `rob_tag`.
    pub fn set_pending(&mut self, reg: Register, rob_tag: usize) {
        *self.slot_mut(reg) = RatEntry::Pending(rob_tag);
    }

    /// Retires the renaming for `reg` if it still points at `rob_tag`.
    ///
    /// A later instruction may have remapped the same register before
    /// `rob_tag` committed; in that case the RAT already reflects the
    /// newer producer and must not be reset to `Committed`.
    pub fn clear_if_matches(&mut self, reg: Register, rob_tag: usize) {
        let slot = self.slot_mut(reg);
        if *slot == RatEntry::Pending(rob_tag) {
            *slot = RatEntry::Committed;
        }
    }

    /// Takes a checkpoint of the full table, to be restored on misprediction.
    #[must_use]
    pub fn snapshot(&self) -> RatSnapshot {
        RatSnapshot {
            int: self.int,
            fp: self.fp,
        }
    }

    /// Restores the table from a checkpoint taken by [`Rat::snapshot`].
    pub fn restore(&mut self, snapshot: &RatSnapshot) {
        self.int = snapshot.int;
        self.fp = snapshot.fp;
    }
}

impl Default for Rat {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rename_and_clear_round_trip() {
        let mut rat = Rat::new();
        let r1 = Register::Int(1);
        assert_eq!(rat.lookup(r1), RatEntry::Committed);
        rat.set_pending(r1, 3);
        assert_eq!(rat.lookup(r1), RatEntry::Pending(3));
        rat.clear_if_matches(r1, 3);
        assert_eq!(rat.lookup(r1), RatEntry::Committed);
    }

    #[test]
    fn stale_commit_does_not_clobber_newer_rename() {
        let mut rat = Rat::new();
        let r1 = Register::Int(1);
        rat.set_pending(r1, 3);
        rat.set_pending(r1, 7);
        rat.clear_if_matches(r1, 3);
        assert_eq!(rat.lookup(r1), RatEntry::Pending(7));
    }

    #[test]
    fn snapshot_restores_prior_mappings() {
        let mut rat = Rat::new();
        let r1 = Register::Int(1);
        let snap = rat.snapshot();
        rat.set_pending(r1, 5);
        rat.restore(&snap);
        assert_eq!(rat.lookup(r1), RatEntry::Committed);
    }
}
