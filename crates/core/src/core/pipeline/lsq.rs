//! Load/Store Queue (LSQ).
//!
//! Holds both loads and stores, in program order, from issue until the
//! store commits or the load's result is broadcast. Implements
//! store-to-load forwarding and arbitrates the single memory port.
//!
//! Address computation uses the configured [`AddressMode`]: the reference
//! implementation's `4 * base + displacement` quirk by default, or the
//! straightforward `base + displacement` when opted into.

use crate::common::{SimError, Value};
use crate::core::pipeline::memory_port::MemoryPort;
use crate::core::pipeline::reservation_station::Source;
use crate::isa::Opcode;
use crate::memory::Memory;

/// How the LSQ turns a base register value and a displacement into a byte
/// address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AddressMode {
    /// `4 * base + displacement`, matching the reference implementation.
    #[default]
    QuirkTimesFour,
    /// `base + displacement`.
    MipsCorrect,
}

impl AddressMode {
    fn effective_address(self, base: i64, displacement: i64) -> i64 {
        match self {
            Self::QuirkTimesFour => 4 * base + displacement,
            Self::MipsCorrect => base + displacement,
        }
    }
}

/// One load/store queue entry.
#[derive(Debug, Clone)]
pub struct LsqEntry {
    /// Program-order instruction ID.
    pub instr_id: u32,
    /// `LD` or `SD`.
    pub opcode: Opcode,
    /// The ROB slot this entry reports completion into.
    pub rob_tag: usize,
    /// The base register feeding address computation.
    pub base: Source,
    /// Byte displacement added (or, for `QuirkTimesFour`, the constant
    /// term) to the scaled base.
    pub displacement: i64,
    /// `SD`'s value to store; `None` for `LD`.
    pub store_data: Option<Source>,
    /// The computed byte address, once `base` resolves.
    pub address: Option<i64>,
    /// True once dispatched to the memory port (`LD`) or written to memory
    /// at commit (`SD`).
    pub issued: bool,
    /// True once a result (the loaded value, or store completion) is ready.
    pub result_ready: bool,
    /// The value read from memory or forwarded from an earlier store.
    pub loaded_value: Option<Value>,
    /// The cycle this entry was issued. An entry may not have its address
    /// computed in the same cycle it was created (the "isNew" rule).
    pub created_cycle: u64,
}

impl LsqEntry {
    fn store_data_ready(&self) -> Option<Value> {
        self.store_data.and_then(Source::value)
    }

    fn fully_resolved(&self) -> bool {
        self.address.is_some() && (self.opcode != Opcode::Sd || self.store_data_ready().is_some())
    }
}

/// The load/store queue.
pub struct Lsq {
    capacity: usize,
    entries: Vec<LsqEntry>,
    mode: AddressMode,
}

impl Lsq {
    /// Builds an empty queue with room for `capacity` entries.
    #[must_use]
    pub fn new(capacity: usize, mode: AddressMode) -> Self {
        Self {
            capacity: capacity.max(1),
            entries: Vec::new(),
            mode,
        }
    }

    /// Returns true if no free slot remains.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.entries.len() >= self.capacity
    }

    /// Adds `entry` in program order, failing if the queue is full.
    pub fn add(&mut self, entry: LsqEntry) -> bool {
        if self.is_full() {
            return false;
        }
        self.entries.push(entry);
        true
    }

    /// Snoops a CDB broadcast, resolving any entry waiting on `rob_tag`.
    pub fn update(&mut self, rob_tag: usize, value: Value) {
        for entry in &mut self.entries {
            entry.base.resolve(rob_tag, value);
            if let Some(store_data) = entry.store_data.as_mut() {
                store_data.resolve(rob_tag, value);
            }
        }
    }

    /// Computes the effective address of the oldest entry whose base is now
    /// known, wasn't created this cycle, and doesn't have one yet. The
    /// address unit can only form one address per cycle, and an entry may
    /// not have its address computed in the same cycle it was issued.
    pub fn compute_addresses(&mut self, current_cycle: u64) {
        let target = self.entries.iter_mut().find_map(|entry| {
            if entry.address.is_some() || entry.created_cycle == current_cycle {
                return None;
            }
            entry.base.value().map(|base| (entry, base))
        });
        if let Some((entry, base)) = target {
            entry.address = Some(self.mode.effective_address(base.as_int(), entry.displacement));
        }
    }

    /// True if an older, not-yet-fully-resolved store could alias this
    /// load's address and must block it from reading memory or forwarding.
    fn blocked_by_earlier_store(&self, load_instr_id: u32) -> bool {
        self.entries
            .iter()
            .any(|e| e.opcode == Opcode::Sd && e.instr_id < load_instr_id && !e.fully_resolved())
    }

    /// Finds the nearest older store at the same address as `load`, if its
    /// data is ready, and returns the value to forward.
    fn forwarding_value(&self, load: &LsqEntry) -> Option<Value> {
        self.entries
            .iter()
            .filter(|e| e.opcode == Opcode::Sd && e.instr_id < load.instr_id)
            .filter(|e| e.address == load.address)
            .max_by_key(|e| e.instr_id)
            .and_then(LsqEntry::store_data_ready)
    }

    /// Attempts to resolve a load via store-to-load forwarding, marking its
    /// result ready for the Writeback election to pick up. Returns the
    /// resolved `(instr_id, rob_tag, value)` on success.
    pub fn try_forward(&mut self) -> Option<(u32, usize, Value)> {
        let index = self.entries.iter().position(|e| {
            e.opcode == Opcode::Ld
                && !e.result_ready
                && e.address.is_some()
                && !self.blocked_by_earlier_store(e.instr_id)
                && self.forwarding_value(e).is_some()
        })?;
        let value = self.forwarding_value(&self.entries[index])?;
        let entry = &mut self.entries[index];
        entry.loaded_value = Some(value);
        entry.result_ready = true;
        entry.issued = true;
        Some((entry.instr_id, entry.rob_tag, value))
    }

    /// Dispatches the oldest ready, non-forwarded load onto the memory port
    /// if it is free. Returns true if a load was issued.
    pub fn issue_ready_load(&mut self, port: &mut MemoryPort, latency: u32) -> bool {
        if !port.is_free() {
            return false;
        }
        let Some(instr_id) = self.entries.iter().find_map(|e| {
            (e.opcode == Opcode::Ld && !e.issued && e.address.is_some()).then_some(e.instr_id)
        }) else {
            return false;
        };
        if self.blocked_by_earlier_store(instr_id) {
            return false;
        }
        let entry = self
            .entries
            .iter_mut()
            .find(|e| e.instr_id == instr_id)
            .expect("entry found above still exists");
        entry.issued = true;
        port.start(entry.instr_id, latency);
        true
    }

    /// Completes a memory read once the port reports `instr_id` done,
    /// reading `memory` at the load's computed address.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::OutOfRangeMemory`] if the address is out of range,
    /// or [`SimError::InvariantViolation`] if `instr_id` has no live entry
    /// or no computed address.
    pub fn complete_load(
        &mut self,
        instr_id: u32,
        memory: &Memory,
    ) -> Result<(u32, usize, Value), SimError> {
        let entry = SimError::require(
            self.entries.iter_mut().find(|e| e.instr_id == instr_id),
            "port only reports instructions it was given",
        )?;
        let addr = SimError::require(entry.address, "address computed before issue")?;
        let value = memory.read(addr as usize)?;
        entry.loaded_value = Some(value);
        entry.result_ready = true;
        Ok((entry.instr_id, entry.rob_tag, value))
    }

    /// Returns the oldest (smallest `instr_id`) load whose result is ready
    /// but not yet consumed, whether resolved by store-to-load forwarding or
    /// by the memory port. Polled by the Writeback election every cycle, so
    /// a forwarded or port-completed load competes for the CDB exactly like
    /// any other result source instead of broadcasting out of band.
    #[must_use]
    pub fn ready_load_result(&self) -> Option<(u32, usize, Value)> {
        self.entries
            .iter()
            .filter(|e| e.opcode == Opcode::Ld && e.result_ready)
            .min_by_key(|e| e.instr_id)
            .and_then(|e| e.loaded_value.map(|v| (e.instr_id, e.rob_tag, v)))
    }

    /// True once a store's address and data are both known, so the ROB may
    /// mark it done and schedule it to commit.
    #[must_use]
    pub fn store_ready_to_complete(&self, instr_id: u32) -> bool {
        self.entries
            .iter()
            .any(|e| e.instr_id == instr_id && e.opcode == Opcode::Sd && e.fully_resolved() && !e.result_ready)
    }

    /// Marks a resolved store as ready to commit.
    pub fn mark_store_ready(&mut self, instr_id: u32) {
        if let Some(entry) = self.entries.iter_mut().find(|e| e.instr_id == instr_id) {
            entry.result_ready = true;
        }
    }

    /// Performs the actual memory write for a store being committed, and
    /// removes its entry.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::OutOfRangeMemory`] if the address is out of
    /// range, or [`SimError::InvariantViolation`] if `instr_id` has no live,
    /// fully-resolved store entry.
    pub fn commit_store(&mut self, instr_id: u32, memory: &mut Memory) -> Result<(), SimError> {
        let entry = SimError::require(
            self.entries.iter().find(|e| e.instr_id == instr_id),
            "commit only targets a live entry",
        )?;
        let addr = SimError::require(entry.address, "store ready implies address known")?;
        let value = SimError::require(entry.store_data_ready(), "store ready implies data known")?;
        memory.write(addr as usize, value)?;
        self.entries.retain(|e| e.instr_id != instr_id);
        Ok(())
    }

    /// Removes a load's entry once its result has been consumed.
    pub fn remove(&mut self, instr_id: u32) {
        self.entries.retain(|e| e.instr_id != instr_id);
    }

    /// Drops entries belonging to squashed instructions.
    pub fn purge_after_mispredict(&mut self, is_live: impl Fn(u32) -> bool) {
        self.entries.retain(|e| is_live(e.instr_id));
    }

    /// Iterates all live entries, for diagnostics and output dumps.
    pub fn entries(&self) -> impl Iterator<Item = &LsqEntry> {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::Value;

    fn store(id: u32, addr: i64, value: f64) -> LsqEntry {
        LsqEntry {
            instr_id: id,
            opcode: Opcode::Sd,
            rob_tag: id as usize,
            base: Source::Ready(Value::Int(0)),
            displacement: 0,
            store_data: Some(Source::Ready(Value::Float(value))),
            address: Some(addr),
            issued: false,
            result_ready: false,
            loaded_value: None,
            created_cycle: 0,
        }
    }

    fn load(id: u32, addr: i64) -> LsqEntry {
        LsqEntry {
            instr_id: id,
            opcode: Opcode::Ld,
            rob_tag: id as usize,
            base: Source::Ready(Value::Int(0)),
            displacement: 0,
            store_data: None,
            address: Some(addr),
            issued: false,
            result_ready: false,
            loaded_value: None,
            created_cycle: 0,
        }
    }

    #[test]
    fn load_forwards_from_matching_earlier_store() {
        let mut lsq = Lsq::new(4, AddressMode::default());
        let _ = lsq.add(store(0, 16, 3.14));
        let _ = lsq.add(load(1, 16));
        let (id, _, value) = lsq.try_forward().unwrap();
        assert_eq!(id, 1);
        assert_eq!(value, Value::Float(3.14));
    }

    #[test]
    fn load_is_blocked_by_unresolved_earlier_store() {
        let mut lsq = Lsq::new(4, AddressMode::default());
        let mut pending = store(0, 16, 0.0);
        pending.store_data = Some(Source::Waiting(5));
        pending.address = None;
        let _ = lsq.add(pending);
        let _ = lsq.add(load(1, 16));
        lsq.compute_addresses(1);
        assert!(lsq.try_forward().is_none());
    }

    #[test]
    fn ready_load_result_surfaces_a_forwarded_load_until_removed() {
        let mut lsq = Lsq::new(4, AddressMode::default());
        let _ = lsq.add(store(0, 16, 3.14));
        let _ = lsq.add(load(1, 16));
        assert!(lsq.ready_load_result().is_none(), "the load hasn't forwarded yet");
        let _ = lsq.try_forward().unwrap();
        let (id, _, value) = lsq.ready_load_result().unwrap();
        assert_eq!(id, 1);
        assert_eq!(value, Value::Float(3.14));
        // Losing the writeback election this cycle must not drop the result.
        assert_eq!(lsq.ready_load_result(), Some((1, 1, Value::Float(3.14))));
        lsq.remove(1);
        assert!(lsq.ready_load_result().is_none());
    }

    #[test]
    fn quirk_times_four_matches_reference_addressing() {
        assert_eq!(AddressMode::QuirkTimesFour.effective_address(4, 0), 16);
        assert_eq!(AddressMode::MipsCorrect.effective_address(4, 0), 4);
    }

    #[test]
    fn compute_addresses_forms_at_most_one_address_per_call_and_skips_new_entries() {
        let mut lsq = Lsq::new(4, AddressMode::MipsCorrect);
        let mut first = load(0, 0);
        first.address = None;
        first.created_cycle = 0;
        let mut second = load(1, 0);
        second.address = None;
        second.created_cycle = 0;
        let _ = lsq.add(first);
        let _ = lsq.add(second);

        // Created this cycle: neither entry may have its address computed yet.
        lsq.compute_addresses(0);
        assert!(lsq.entries().all(|e| e.address.is_none()));

        // A later cycle: only the oldest entry gets an address this call.
        lsq.compute_addresses(1);
        let computed = lsq.entries().filter(|e| e.address.is_some()).count();
        assert_eq!(computed, 1, "address unit forms at most one address per cycle");

        lsq.compute_addresses(1);
        let computed = lsq.entries().filter(|e| e.address.is_some()).count();
        assert_eq!(computed, 2);
    }
}
