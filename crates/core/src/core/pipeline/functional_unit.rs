//! Generic functional-unit bank.
//!
//! The integer ALU, the FP adder, and the FP multiplier are all a bank of
//! `count` identical pipelines, each `latency` cycles deep, computing with a
//! fixed per-opcode function. This type implements that shape once; the
//! three banks differ only in which compute function and `(count, latency)`
//! they're built with.
//!
//! The result is computed as soon as a slot is occupied and simply held for
//! `latency` cycles before becoming visible — equivalent to, and simpler
//! than, re-deriving the result bit-for-bit on the final cycle.

use crate::common::Value;
use crate::isa::Opcode;

struct Slot {
    instr_id: u32,
    rob_tag: usize,
    opcode: Opcode,
    result: Value,
    remaining: u32,
}

/// A bank of `count` identical execution pipelines.
pub struct FunctionalUnit {
    compute: fn(Opcode, Value, Value) -> Value,
    latency: u32,
    slots: Vec<Option<Slot>>,
}

impl FunctionalUnit {
    /// Builds a bank of `count` pipelines, each `latency` cycles deep,
    /// computing with `compute`.
    #[must_use]
    pub fn new(latency: u32, count: usize, compute: fn(Opcode, Value, Value) -> Value) -> Self {
        let mut slots = Vec::with_capacity(count.max(1));
        slots.resize_with(count.max(1), || None);
        Self {
            compute,
            latency: latency.max(1),
            slots,
        }
    }

    /// Returns true if every pipeline is occupied.
    #[must_use]
    pub fn busy(&self) -> bool {
        self.slots.iter().all(Option::is_some)
    }

    /// Dispatches `op(a, b)` into the first free pipeline, tagging the
    /// result with `instr_id`/`rob_tag` for later pickup. Returns `false`
    /// (without mutating state) if every pipeline is occupied.
    pub fn execute(
        &mut self,
        instr_id: u32,
        rob_tag: usize,
        op: Opcode,
        a: Value,
        b: Value,
    ) -> bool {
        let Some(slot) = self.slots.iter_mut().find(|s| s.is_none()) else {
            return false;
        };
        *slot = Some(Slot {
            instr_id,
            rob_tag,
            opcode: op,
            result: (self.compute)(op, a, b),
            remaining: self.latency,
        });
        true
    }

    /// Advances every occupied pipeline by one cycle.
    pub fn advance_time(&mut self) {
        for slot in self.slots.iter_mut().flatten() {
            slot.remaining = slot.remaining.saturating_sub(1);
        }
    }

    /// Returns true if at least one pipeline has finished its latency.
    #[must_use]
    pub fn is_result_ready(&self) -> bool {
        self.slots
            .iter()
            .flatten()
            .any(|slot| slot.remaining == 0)
    }

    /// Looks at one finished `(instr_id, rob_tag, value)` without removing
    /// it, so the Writeback election can compare candidates across banks
    /// before committing to a winner.
    #[must_use]
    pub fn peek_ready(&self) -> Option<(u32, usize, Value)> {
        self.slots
            .iter()
            .flatten()
            .find(|slot| slot.remaining == 0)
            .map(|slot| (slot.instr_id, slot.rob_tag, slot.result))
    }

    /// Removes and returns one finished `(instr_id, rob_tag, value)`, if any.
    pub fn take_result(&mut self) -> Option<(u32, usize, Value)> {
        let index = self.slots.iter().position(|s| matches!(s, Some(slot) if slot.remaining == 0))?;
        let finished = self.slots[index].take()?;
        Some((finished.instr_id, finished.rob_tag, finished.result))
    }

    /// Removes and returns the oldest (smallest `instr_id`) finished result
    /// whose opcode satisfies `pred`, without disturbing other finished
    /// slots. Used by the Branch-check phase to pull a resolved branch out
    /// of the integer ALU ahead of the unified Writeback election; picking
    /// the oldest match matters once more than one branch is ready in the
    /// same cycle, so an earlier branch resolves (and potentially squashes)
    /// before a later one is considered.
    pub fn take_result_where(
        &mut self,
        pred: impl Fn(Opcode) -> bool,
    ) -> Option<(u32, usize, Value)> {
        let index = self
            .slots
            .iter()
            .enumerate()
            .filter_map(|(i, s)| {
                s.as_ref()
                    .filter(|slot| slot.remaining == 0 && pred(slot.opcode))
                    .map(|slot| (i, slot.instr_id))
            })
            .min_by_key(|&(_, instr_id)| instr_id)
            .map(|(i, _)| i)?;
        let finished = self.slots[index].take()?;
        Some((finished.instr_id, finished.rob_tag, finished.result))
    }

    /// Drops any in-flight result belonging to a squashed instruction.
    pub fn purge_after_mispredict(&mut self, is_live: impl Fn(u32) -> bool) {
        for slot in &mut self.slots {
            if let Some(inner) = slot {
                if !is_live(inner.instr_id) {
                    *slot = None;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::units::alu;

    #[test]
    fn result_becomes_ready_after_latency_cycles() {
        let mut fu = FunctionalUnit::new(2, 1, alu::execute);
        assert!(fu.execute(0, 0, Opcode::Add, Value::Int(1), Value::Int(2)));
        assert!(fu.busy());
        assert!(!fu.is_result_ready());
        fu.advance_time();
        assert!(!fu.is_result_ready());
        fu.advance_time();
        assert!(fu.is_result_ready());
        let (id, tag, value) = fu.take_result().unwrap();
        assert_eq!((id, tag, value), (0, 0, Value::Int(3)));
        assert!(!fu.busy());
    }

    #[test]
    fn take_result_where_picks_the_oldest_matching_slot() {
        let mut fu = FunctionalUnit::new(1, 2, alu::execute);
        assert!(fu.execute(5, 5, Opcode::Beq, Value::Int(1), Value::Int(1)));
        assert!(fu.execute(2, 2, Opcode::Bne, Value::Int(1), Value::Int(1)));
        fu.advance_time();
        let (id, ..) = fu.take_result_where(Opcode::is_branch).unwrap();
        assert_eq!(id, 2, "the younger slot index must not win over an older instr_id");
        let (id, ..) = fu.take_result_where(Opcode::is_branch).unwrap();
        assert_eq!(id, 5);
        assert!(fu.take_result_where(Opcode::is_branch).is_none());
    }

    #[test]
    fn bank_rejects_dispatch_once_every_pipeline_is_busy() {
        let mut fu = FunctionalUnit::new(1, 1, alu::execute);
        assert!(fu.execute(0, 0, Opcode::Add, Value::Int(1), Value::Int(1)));
        assert!(!fu.execute(1, 1, Opcode::Add, Value::Int(1), Value::Int(1)));
    }
}
