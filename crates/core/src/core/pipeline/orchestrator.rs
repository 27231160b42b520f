//! Per-cycle orchestrator.
//!
//! Drives the six-phase schedule every simulated cycle: Issue, Execute,
//! Branch-check, Memory, Writeback, Commit. Each phase is a private method
//! on [`Orchestrator`]; [`Orchestrator::step`] runs them in order and then
//! advances every unit's internal timers.

use tracing::{trace, trace_span};

use crate::common::constants::WORD_BYTES;
use crate::common::{SimError, Value};
use crate::config::Config;
use crate::core::pipeline::branch_unit::{BranchUnit, Checkpoint};
use crate::core::pipeline::completion::CompletionRecord;
use crate::core::pipeline::functional_unit::FunctionalUnit;
use crate::core::pipeline::instruction_queue::InstructionQueue;
use crate::core::pipeline::lsq::{Lsq, LsqEntry};
use crate::core::pipeline::memory_port::MemoryPort;
use crate::core::pipeline::reservation_station::{Entry, ReservationStation, Source};
use crate::core::pipeline::rob::Rob;
use crate::core::rat::{Rat, RatEntry};
use crate::core::units::{alu, fpu};
use crate::core::Arf;
use crate::isa::{Instruction, Opcode, Operand};
use crate::memory::Memory;

/// Owns every pipeline structure and drives it one cycle at a time.
pub struct Orchestrator {
    iq: InstructionQueue,
    rat: Rat,
    arf: Arf,
    rob: Rob,
    rs_int: ReservationStation,
    rs_fp_add: ReservationStation,
    rs_fp_mult: ReservationStation,
    lsq: Lsq,
    fu_int: FunctionalUnit,
    fu_fp_add: FunctionalUnit,
    fu_fp_mult: FunctionalUnit,
    memory_port: MemoryPort,
    memory: Memory,
    branch_unit: BranchUnit,
    completion: CompletionRecord,
    mem_latency: u32,
    cycle: u64,
}

impl Orchestrator {
    /// Builds the pipeline state described by `config`, with every register
    /// and memory word initialized per its `RegFileInitData`/`MemInitData`.
    #[must_use]
    pub fn new(config: &Config) -> Self {
        let mut arf = Arf::new();
        for (reg, value) in &config.reg_init {
            arf.write(*reg, *value);
        }
        let mut memory = Memory::with_size(config.mem_words.max(1));
        for (word_addr, value) in &config.mem_init {
            let _ = memory.write(word_addr * WORD_BYTES, *value);
        }
        Self {
            iq: InstructionQueue::new(config.instructions.clone()),
            rat: Rat::new(),
            arf,
            rob: Rob::new(config.rob_entries),
            rs_int: ReservationStation::new(config.alu_i.rs_size),
            rs_fp_add: ReservationStation::new(config.alu_fp.rs_size),
            rs_fp_mult: ReservationStation::new(config.mult_fp.rs_size),
            lsq: Lsq::new(config.lsq_size, config.address_mode),
            fu_int: FunctionalUnit::new(config.alu_i.latency, config.alu_i.count, alu::execute),
            fu_fp_add: FunctionalUnit::new(config.alu_fp.latency, config.alu_fp.count, fpu::add),
            fu_fp_mult: FunctionalUnit::new(config.mult_fp.latency, config.mult_fp.count, fpu::multiply),
            memory_port: MemoryPort::default(),
            memory,
            branch_unit: BranchUnit::new(),
            completion: CompletionRecord::new(),
            mem_latency: config.mem_latency,
            cycle: 0,
        }
    }

    /// The number of cycles executed so far.
    #[must_use]
    pub const fn cycle(&self) -> u64 {
        self.cycle
    }

    /// The committed register state.
    #[must_use]
    pub const fn arf(&self) -> &Arf {
        &self.arf
    }

    /// The final memory contents.
    #[must_use]
    pub const fn memory(&self) -> &Memory {
        &self.memory
    }

    /// Per-instruction stage timestamps, for the run report.
    #[must_use]
    pub const fn completion(&self) -> &CompletionRecord {
        &self.completion
    }

    /// True once every instruction has been fetched and the ROB has
    /// drained, meaning the program is fully committed.
    #[must_use]
    pub fn is_drained(&self) -> bool {
        self.iq.empty(0) && self.rob.is_empty()
    }

    /// Runs one full cycle: all six phases, then advances every unit's
    /// internal timer.
    ///
    /// # Errors
    ///
    /// Returns [`SimError`] if a committed memory access falls outside the
    /// configured memory unit.
    pub fn step(&mut self) -> Result<(), SimError> {
        let _span = trace_span!("cycle", cycle = self.cycle).entered();
        self.issue()?;
        self.execute()?;
        self.branch_check()?;
        self.memory_phase()?;
        self.writeback();
        self.commit()?;
        self.advance_time();
        self.cycle += 1;
        Ok(())
    }

    // -- Phase 1: Issue --------------------------------------------------

    fn issue(&mut self) -> Result<(), SimError> {
        let Some(instr) = self.iq.peek(0).copied() else {
            return Ok(());
        };
        if self.rob.is_full() {
            return Ok(());
        }
        if instr.opcode.is_memory() {
            if self.lsq.is_full() {
                return Ok(());
            }
        } else if self.rs_for(instr.opcode).is_full() {
            return Ok(());
        }

        let instr = SimError::require(self.iq.fetch(0), "peeked instruction is still present")?;
        let tag = SimError::require(self.rob.add(instr.id, instr.opcode, instr.dest), "checked not full above")?;
        self.completion.record_issue(instr.id, self.cycle);
        trace!(instr_id = instr.id, opcode = %instr.opcode, tag, "issue");

        if instr.opcode == Opcode::Nop {
            self.rob.mark_done(tag, Value::Int(0), self.cycle);
        } else if instr.opcode.is_memory() {
            self.issue_memory(&instr, tag);
        } else if instr.opcode.is_branch() {
            self.issue_branch(&instr, tag);
        } else {
            self.issue_arithmetic(&instr, tag);
        }
        Ok(())
    }

    fn rs_for(&mut self, opcode: Opcode) -> &mut ReservationStation {
        match opcode {
            Opcode::AddD | Opcode::SubD => &mut self.rs_fp_add,
            Opcode::MultD => &mut self.rs_fp_mult,
            _ => &mut self.rs_int,
        }
    }

    /// Resolves an operand to a value or a CDB tag to wait on. An operand
    /// pending on the ROB head is back-filled directly from the head's
    /// value if it has already completed, rather than left waiting for a
    /// broadcast that would otherwise resolve it a cycle later than needed.
    fn resolve_operand(&self, operand: Option<Operand>) -> Source {
        match operand {
            Some(Operand::Literal(v)) => Source::Ready(Value::Int(v)),
            Some(Operand::Register(reg)) => match self.rat.lookup(reg) {
                RatEntry::Committed => Source::Ready(self.arf.read(reg)),
                RatEntry::Pending(tag) => match self.rob.head_if_done() {
                    Some((head_tag, value)) if head_tag == tag => Source::Ready(value),
                    _ => Source::Waiting(tag),
                },
            },
            None => Source::Ready(Value::Int(0)),
        }
    }

    fn issue_arithmetic(&mut self, instr: &Instruction, tag: usize) {
        let op1 = self.resolve_operand(instr.src1);
        let op2 = self.resolve_operand(instr.src2);
        if let Some(dest) = instr.dest {
            self.rat.set_pending(dest, tag);
        }
        let created_cycle = self.cycle;
        let _ = self.rs_for(instr.opcode).add(Entry {
            instr_id: instr.id,
            rob_tag: tag,
            opcode: instr.opcode,
            op1,
            op2,
            executing: false,
            created_cycle,
        });
    }

    fn issue_branch(&mut self, instr: &Instruction, tag: usize) {
        let op1 = self.resolve_operand(instr.src1);
        let op2 = self.resolve_operand(instr.src2);
        let fallthrough_pc = self.iq.pc();
        let target_pc = (i64::from(instr.id) + instr.offset).max(0) as usize;
        self.branch_unit.checkpoint(
            instr.id,
            Checkpoint {
                rat: self.rat.snapshot(),
                rob_tag: tag,
                fallthrough_pc,
                target_pc,
            },
        );
        if self.branch_unit.predict(instr.id) {
            self.iq.set_pc(target_pc);
        }
        let _ = self.rs_int.add(Entry {
            instr_id: instr.id,
            rob_tag: tag,
            opcode: instr.opcode,
            op1,
            op2,
            executing: false,
            created_cycle: self.cycle,
        });
    }

    fn issue_memory(&mut self, instr: &Instruction, tag: usize) {
        let base = self.resolve_operand(instr.src1);
        let store_data = (instr.opcode == Opcode::Sd).then(|| self.resolve_operand(instr.src2));
        if let Some(dest) = instr.dest {
            self.rat.set_pending(dest, tag);
        }
        let _ = self.lsq.add(LsqEntry {
            instr_id: instr.id,
            opcode: instr.opcode,
            rob_tag: tag,
            base,
            displacement: instr.offset,
            store_data,
            address: None,
            issued: false,
            result_ready: false,
            loaded_value: None,
            created_cycle: self.cycle,
        });
    }

    // -- Phase 2: Execute --------------------------------------------------

    fn execute(&mut self) -> Result<(), SimError> {
        self.lsq.compute_addresses(self.cycle);
        dispatch(&mut self.rs_int, &mut self.fu_int, &mut self.completion, self.cycle)?;
        dispatch(&mut self.rs_fp_add, &mut self.fu_fp_add, &mut self.completion, self.cycle)?;
        dispatch(&mut self.rs_fp_mult, &mut self.fu_fp_mult, &mut self.completion, self.cycle)?;
        Ok(())
    }

    // -- Phase 3: Branch-check ---------------------------------------------

    fn branch_check(&mut self) -> Result<(), SimError> {
        while let Some((instr_id, rob_tag, value)) = self.fu_int.take_result_where(Opcode::is_branch) {
            self.rob.mark_done(rob_tag, value, self.cycle);
            self.completion.record_writeback(instr_id, self.cycle);
            self.rs_int.remove(instr_id);

            let (recovery, checkpoint) = self.branch_unit.resolve(instr_id, value.as_bool())?;
            if let Some(recovery) = recovery {
                trace!(instr_id, new_pc = recovery.new_pc, "branch mispredicted");
                self.rat.restore(&checkpoint.rat);
                self.squash_after(instr_id, recovery.rob_tag, recovery.new_pc);
            }
        }
        Ok(())
    }

    fn squash_after(&mut self, branch_instr_id: u32, rob_tag: usize, new_pc: usize) {
        let is_live = |id: u32| id <= branch_instr_id;
        self.rob.purge_after(rob_tag);
        self.rs_int.purge_after_mispredict(is_live);
        self.rs_fp_add.purge_after_mispredict(is_live);
        self.rs_fp_mult.purge_after_mispredict(is_live);
        self.lsq.purge_after_mispredict(is_live);
        self.fu_int.purge_after_mispredict(is_live);
        self.fu_fp_add.purge_after_mispredict(is_live);
        self.fu_fp_mult.purge_after_mispredict(is_live);
        self.iq.set_pc(new_pc);
    }

    // -- Phase 4: Memory -----------------------------------------------------

    /// Completes a port-drained load's memory read and kicks off addressing
    /// for the next one. Forwarded and port-completed loads both land in
    /// the LSQ's `result_ready` state and are picked up by the Writeback
    /// election on this or a later cycle via [`Lsq::ready_load_result`];
    /// neither path broadcasts directly, so only Writeback ever puts a
    /// result on the CDB.
    fn memory_phase(&mut self) -> Result<(), SimError> {
        self.ready_stores();

        if self.memory_port.is_done() {
            if let Some(instr_id) = self.memory_port.finish() {
                let (id, ..) = self.lsq.complete_load(instr_id, &self.memory)?;
                self.completion.record_memory(id, self.cycle);
            }
        }

        if let Some((id, ..)) = self.lsq.try_forward() {
            self.completion.record_memory(id, self.cycle);
        } else {
            let _ = self.lsq.issue_ready_load(&mut self.memory_port, self.mem_latency);
        }

        Ok(())
    }

    fn ready_stores(&mut self) {
        let newly_ready: Vec<(u32, usize)> = self
            .lsq
            .entries()
            .filter(|e| e.opcode == Opcode::Sd && self.lsq.store_ready_to_complete(e.instr_id))
            .map(|e| (e.instr_id, e.rob_tag))
            .collect();
        for (instr_id, tag) in newly_ready {
            self.lsq.mark_store_ready(instr_id);
            self.rob.mark_done(tag, Value::Int(0), self.cycle);
        }
    }

    // -- Phase 5: Writeback ---------------------------------------------------

    fn writeback(&mut self) {
        let candidates = [
            ("int", self.fu_int.peek_ready()),
            ("fp_add", self.fu_fp_add.peek_ready()),
            ("fp_mult", self.fu_fp_mult.peek_ready()),
            ("load", self.lsq.ready_load_result()),
        ];

        let mut winner: Option<(&str, u32, usize, Value)> = None;
        for (label, candidate) in candidates {
            if let Some((id, tag, value)) = candidate {
                let better = winner.map_or(true, |(_, best_id, ..)| id < best_id);
                if better {
                    winner = Some((label, id, tag, value));
                }
            }
        }

        let Some((label, instr_id, rob_tag, value)) = winner else {
            return;
        };
        match label {
            "int" => {
                let _ = self.fu_int.take_result();
                self.rs_int.remove(instr_id);
            }
            "fp_add" => {
                let _ = self.fu_fp_add.take_result();
                self.rs_fp_add.remove(instr_id);
            }
            "fp_mult" => {
                let _ = self.fu_fp_mult.take_result();
                self.rs_fp_mult.remove(instr_id);
            }
            _ => self.lsq.remove(instr_id),
        }
        trace!(instr_id, source = label, "writeback");
        self.completion.record_writeback(instr_id, self.cycle);
        self.broadcast(rob_tag, value);
    }

    fn broadcast(&mut self, rob_tag: usize, value: Value) {
        self.rob.mark_done(rob_tag, value, self.cycle);
        self.rs_int.update(rob_tag, value);
        self.rs_fp_add.update(rob_tag, value);
        self.rs_fp_mult.update(rob_tag, value);
        self.lsq.update(rob_tag, value);
    }

    // -- Phase 6: Commit ----------------------------------------------------

    fn commit(&mut self) -> Result<(), SimError> {
        if !self.rob.can_commit(self.cycle) {
            return Ok(());
        }
        let (tag, entry) = SimError::require(self.rob.commit(self.cycle), "can_commit checked above")?;
        self.completion.record_commit(entry.instr_id, self.cycle);
        trace!(instr_id = entry.instr_id, opcode = %entry.opcode, "commit");

        if entry.opcode == Opcode::Sd {
            self.lsq.commit_store(entry.instr_id, &mut self.memory)?;
        } else if let Some(dest) = entry.dest {
            let value = SimError::require(entry.value, "a done entry always carries a value")?;
            self.arf.write(dest, value);
            self.rat.clear_if_matches(dest, tag);
        }
        Ok(())
    }

    fn advance_time(&mut self) {
        self.fu_int.advance_time();
        self.fu_fp_add.advance_time();
        self.fu_fp_mult.advance_time();
        self.memory_port.advance_time();
    }
}

fn dispatch(
    rs: &mut ReservationStation,
    fu: &mut FunctionalUnit,
    completion: &mut CompletionRecord,
    cycle: u64,
) -> Result<(), SimError> {
    if fu.busy() {
        return Ok(());
    }
    let Some(index) = rs.next_ready(cycle) else {
        return Ok(());
    };
    let entry = SimError::require(rs.entries().nth(index).copied(), "next_ready returned a valid index")?;
    let a = SimError::require(entry.op1.value(), "a ready entry has a known op1")?;
    let b = SimError::require(entry.op2.value(), "a ready entry has a known op2")?;
    if fu.execute(entry.instr_id, entry.rob_tag, entry.opcode, a, b) {
        rs.mark_executing(index);
        completion.record_execute(entry.instr_id, cycle);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::isa::decode;

    fn config_from(instructions: &str) -> Config {
        let text = format!(
            "ROBEntries: 8\nCDBs: 1\nALUI: 4 1 2\nALUFP: 4 2 1\nMULTFP: 4 4 1\nLoadStoreUnit: 4 2 64\n{instructions}"
        );
        crate::config::parse(&text).unwrap()
    }

    #[test]
    fn raw_dependency_chain_forwards_through_the_rob() {
        let config = config_from(
            "Instructions: ADDI R1, R0, 5\nInstructions: ADD R2, R1, R1\nInstructions: ADD R3, R2, R1\n",
        );
        let mut orch = Orchestrator::new(&config);
        for _ in 0..config.cycle_cap() {
            if orch.is_drained() {
                break;
            }
            orch.step().unwrap();
        }
        assert!(orch.is_drained());
        assert_eq!(orch.arf().read(crate::common::Register::Int(1)).as_int(), 5);
        assert_eq!(orch.arf().read(crate::common::Register::Int(2)).as_int(), 10);
        assert_eq!(orch.arf().read(crate::common::Register::Int(3)).as_int(), 15);
    }

    #[test]
    fn store_then_load_forwards_without_touching_memory_twice() {
        let config = config_from(
            "Instructions: ADDI R1, R0, 7\nInstructions: SD R1, 0(R0)\nInstructions: LD R2, 0(R0)\n",
        );
        let mut orch = Orchestrator::new(&config);
        for _ in 0..config.cycle_cap() {
            if orch.is_drained() {
                break;
            }
            orch.step().unwrap();
        }
        assert_eq!(orch.arf().read(crate::common::Register::Int(2)).as_int(), 7);
    }

    #[test]
    fn mispredicted_branch_squashes_the_wrong_path() {
        // R1 != R0, so BNE is taken; the predictor defaults to not-taken,
        // so this mispredicts and must squash the ADDI into R2.
        let config = config_from(
            "Instructions: ADDI R1, R0, 1\nInstructions: BNE R1, R0, 2\nInstructions: ADDI R2, R0, 99\nInstructions: ADDI R3, R0, 7\n",
        );
        let mut orch = Orchestrator::new(&config);
        for _ in 0..config.cycle_cap() {
            if orch.is_drained() {
                break;
            }
            orch.step().unwrap();
        }
        assert_eq!(orch.arf().read(crate::common::Register::Int(2)).as_int(), 0);
        assert_eq!(orch.arf().read(crate::common::Register::Int(3)).as_int(), 7);
    }

    #[test]
    fn decode_feeds_issue_without_reinterpreting_opcodes() {
        let instr = decode::decode_line(0, "ADD R1, R0, R0").unwrap();
        assert_eq!(instr.opcode, Opcode::Add);
    }

    #[test]
    fn nop_result_cannot_commit_the_cycle_it_issues() {
        let config = config_from("Instructions: NOP\n");
        let mut orch = Orchestrator::new(&config);
        orch.step().unwrap();
        assert!(!orch.is_drained(), "a NOP must not commit in its own issue cycle");
        orch.step().unwrap();
        assert!(orch.is_drained());
    }

    #[test]
    fn raw_dependency_across_a_long_bubble_still_resolves() {
        // Several NOPs separate the producer from its consumer, so the
        // consumer issues well after the producer's one CDB broadcast. If
        // an Issue-time operand can only ever be resolved by a broadcast it
        // arrived in time to snoop, this stalls forever; late-forwarding
        // from a completed-but-not-yet-committed ROB head is what lets the
        // consumer pick up the value at issue regardless of when it shows
        // up relative to the one broadcast.
        let config = config_from(
            "Instructions: ADDI R1, R0, 5\n\
             Instructions: NOP\nInstructions: NOP\nInstructions: NOP\nInstructions: NOP\n\
             Instructions: NOP\nInstructions: NOP\nInstructions: NOP\nInstructions: NOP\n\
             Instructions: ADD R2, R1, R1\n",
        );
        let mut orch = Orchestrator::new(&config);
        for _ in 0..config.cycle_cap() {
            if orch.is_drained() {
                break;
            }
            orch.step().unwrap();
        }
        assert!(orch.is_drained(), "program must drain within the configured cycle cap");
        assert_eq!(orch.arf().read(crate::common::Register::Int(2)).as_int(), 10);
    }
}
