//! Run report formatting.
//!
//! Renders the four sections a completed run produces: the instruction
//! completion table, the integer and floating-point architectural register
//! files, and every non-zero memory word.

use std::fmt;

use crate::common::Value;
use crate::core::pipeline::completion::Timeline;

/// A fully rendered simulation outcome, built once a program has drained.
#[derive(Debug)]
pub struct SimulationReport {
    pub(crate) cycles: u64,
    pub(crate) timelines: Vec<(u32, Timeline)>,
    pub(crate) int_regs: [i64; 32],
    pub(crate) fp_regs: [f64; 32],
    pub(crate) memory_words: Vec<(usize, Value)>,
}

impl SimulationReport {
    /// Total cycles the run took to drain every instruction.
    #[must_use]
    pub const fn cycles(&self) -> u64 {
        self.cycles
    }

    /// The stage timestamps recorded for `instr_id`, if it ever issued.
    #[must_use]
    pub fn timeline(&self, instr_id: u32) -> Option<&Timeline> {
        self.timelines
            .iter()
            .find(|(id, _)| *id == instr_id)
            .map(|(_, t)| t)
    }

    /// The committed value of integer register `index` (0-31).
    #[must_use]
    pub fn int_register(&self, index: usize) -> i64 {
        self.int_regs[index]
    }

    /// The committed value of floating-point register `index` (0-31).
    #[must_use]
    pub fn fp_register(&self, index: usize) -> f64 {
        self.fp_regs[index]
    }

    /// The value at memory word `index`, or `0` if never written.
    #[must_use]
    pub fn memory_word(&self, index: usize) -> i64 {
        self.memory_words
            .iter()
            .find(|(w, _)| *w == index)
            .map_or(0, |(_, v)| v.as_int())
    }
}

impl fmt::Display for SimulationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Instruction Completion Table")?;
        writeln!(
            f,
            "{:<6}{:<6}{:<6}{:<6}{:<6}{:<6}",
            "ID", "IS", "EX", "MEM", "WB", "COM"
        )?;
        for (id, timeline) in &self.timelines {
            writeln!(
                f,
                "{:<6}{:<6}{:<6}{:<6}{:<6}{:<6}",
                id,
                fmt_cycle(timeline.issue),
                fmt_cycle(timeline.execute),
                fmt_cycle(timeline.memory),
                fmt_cycle(timeline.writeback),
                fmt_cycle(timeline.commit),
            )?;
        }
        writeln!(f)?;

        writeln!(f, "Integer ARF")?;
        for (row, chunk) in self.int_regs.chunks(4).enumerate() {
            let base = row * 4;
            let mut line = String::new();
            for (i, value) in chunk.iter().enumerate() {
                line.push_str(&format!("R{:<3}= {value:<10} ", base + i));
            }
            writeln!(f, "{}", line.trim_end())?;
        }
        writeln!(f)?;

        writeln!(f, "Floating-Point ARF")?;
        for (row, chunk) in self.fp_regs.chunks(2).enumerate() {
            let base = row * 2;
            let mut line = String::new();
            for (i, value) in chunk.iter().enumerate() {
                line.push_str(&format!("F{:<3}= {value:<14.6} ", base + i));
            }
            writeln!(f, "{}", line.trim_end())?;
        }
        writeln!(f)?;

        writeln!(f, "Memory Unit")?;
        for pair in self.memory_words.chunks(2) {
            let mut line = String::new();
            for (word, value) in pair {
                line.push_str(&format!("Word {word:<3}: {value:<12} "));
            }
            writeln!(f, "{}", line.trim_end())?;
        }
        Ok(())
    }
}

fn fmt_cycle(cycle: Option<u64>) -> String {
    cycle.map_or_else(|| "-".to_string(), |c| c.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_all_four_sections() {
        let mut timeline = Timeline::default();
        timeline.issue = Some(0);
        timeline.commit = Some(3);
        let report = SimulationReport {
            cycles: 4,
            timelines: vec![(0, timeline)],
            int_regs: [0; 32],
            fp_regs: [0.0; 32],
            memory_words: vec![(2, Value::Int(7))],
        };
        let text = report.to_string();
        assert!(text.contains("Instruction Completion Table"));
        assert!(text.contains("Integer ARF"));
        assert!(text.contains("Floating-Point ARF"));
        assert!(text.contains("Memory Unit"));
        assert!(text.contains("Word 2"));
    }
}
