//! Top-level simulator: owns the pipeline and produces a run report.

use tracing::info;

use crate::common::{SimError, Value};
use crate::config::Config;
use crate::core::pipeline::orchestrator::Orchestrator;
use crate::sim::report::SimulationReport;

/// Runs a fully configured program to completion and reports the outcome.
pub struct Simulator {
    orchestrator: Orchestrator,
    cycle_cap: u64,
}

impl Simulator {
    /// Builds a simulator over `config`'s program and resource limits.
    #[must_use]
    pub fn new(config: &Config) -> Self {
        Self {
            orchestrator: Orchestrator::new(config),
            cycle_cap: config.cycle_cap(),
        }
    }

    /// Runs the pipeline cycle by cycle until the program drains, producing
    /// a [`SimulationReport`].
    ///
    /// # Errors
    ///
    /// Returns [`SimError::InvariantViolation`] if the program fails to
    /// drain within the configured cycle cap, or any error a committed
    /// memory access raises.
    pub fn run(mut self) -> Result<SimulationReport, SimError> {
        while !self.orchestrator.is_drained() {
            if self.orchestrator.cycle() >= self.cycle_cap {
                return Err(SimError::InvariantViolation(format!(
                    "program did not drain within {} cycles",
                    self.cycle_cap
                )));
            }
            self.orchestrator.step()?;
        }
        info!(cycles = self.orchestrator.cycle(), "simulation complete");
        Ok(self.build_report())
    }

    fn build_report(&self) -> SimulationReport {
        let arf = self.orchestrator.arf();
        let mut int_regs = [0i64; 32];
        for (i, v) in arf.int_registers().enumerate() {
            int_regs[i] = v;
        }
        let mut fp_regs = [0.0f64; 32];
        for (i, v) in arf.fp_registers().enumerate() {
            fp_regs[i] = v;
        }
        let memory_words: Vec<(usize, Value)> = self
            .orchestrator
            .memory()
            .words()
            .filter(|(_, v)| !is_zero(*v))
            .collect();
        let timelines = self
            .orchestrator
            .completion()
            .rows()
            .map(|(id, t)| (id, *t))
            .collect();

        SimulationReport {
            cycles: self.orchestrator.cycle(),
            timelines,
            int_regs,
            fp_regs,
            memory_words,
        }
    }
}

fn is_zero(value: Value) -> bool {
    match value {
        Value::Int(v) => v == 0,
        Value::Float(v) => v == 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn a_straight_line_program_drains_and_reports_committed_state() {
        let config = crate::config::parse(
            "ROBEntries: 4\nCDBs: 1\nALUI: 2 1 1\nALUFP: 2 2 1\nMULTFP: 2 4 1\nLoadStoreUnit: 2 2 16\nInstructions: ADDI R1, R0, 9\n",
        )
        .unwrap();
        let report = Simulator::new(&config).run().unwrap();
        assert!(report.cycles() > 0);
    }
}
