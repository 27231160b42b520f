//! Configuration loading.
//!
//! Parses the line-oriented input file into a [`Config`] the simulator can
//! run directly. Every error path reports the offending line's text via
//! [`SimError::Config`], matching the reference implementation's habit of
//! failing loudly on malformed input rather than guessing.

use tracing::debug;

use crate::common::constants::MIN_CYCLE_CAP;
use crate::common::{Register, SimError, Value};
use crate::core::pipeline::lsq::AddressMode;
use crate::isa::{decode, Instruction};

/// `(reservation station size, functional-unit latency, functional-unit count)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct FunctionalUnitConfig {
    /// Number of reservation station entries.
    pub rs_size: usize,
    /// Cycles from dispatch to result.
    pub latency: u32,
    /// Number of parallel pipelines in the bank.
    pub count: usize,
}

/// A fully parsed run configuration.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Reorder buffer capacity.
    pub rob_entries: usize,
    /// Number of common data buses. Informational; the orchestrator
    /// broadcasts at most one result per cycle regardless of this value.
    pub cdbs: usize,
    /// Integer ALU bank.
    pub alu_i: FunctionalUnitConfig,
    /// FP adder bank.
    pub alu_fp: FunctionalUnitConfig,
    /// FP multiplier bank.
    pub mult_fp: FunctionalUnitConfig,
    /// Load/store queue capacity.
    pub lsq_size: usize,
    /// Cycles for a single memory access.
    pub mem_latency: u32,
    /// Number of words in main memory.
    pub mem_words: usize,
    /// Initial architectural register values.
    pub reg_init: Vec<(Register, Value)>,
    /// Initial memory contents, as `(byte address, value)`.
    pub mem_init: Vec<(usize, Value)>,
    /// The decoded program.
    pub instructions: Vec<Instruction>,
    /// How `LD`/`SD` compute their effective address.
    pub address_mode: AddressMode,
}

impl Config {
    /// Safety cap on simulated cycles, scaled to the program's length.
    #[must_use]
    pub fn cycle_cap(&self) -> u64 {
        MIN_CYCLE_CAP.max(self.instructions.len() as u64 * 50)
    }
}

/// Parses the input file at `path` into a [`Config`].
///
/// # Errors
///
/// Returns [`SimError::Config`] if the file can't be read, a required
/// section is missing, or a line fails to parse.
pub fn load(path: &std::path::Path) -> Result<Config, SimError> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| SimError::Config(format!("cannot read {}: {e}", path.display())))?;
    parse(&text)
}

/// Parses already-read input text into a [`Config`]. Split out from
/// [`load`] so tests can exercise the parser without touching the
/// filesystem.
///
/// # Errors
///
/// Returns [`SimError::Config`] if a required section is missing or a line
/// fails to parse.
pub fn parse(text: &str) -> Result<Config, SimError> {
    let mut config = Config::default();
    let mut next_instr_id = 0u32;
    let mut saw_rob = false;
    let mut saw_lsq = false;

    for raw_line in text.lines() {
        let line = raw_line.split('#').next().unwrap_or("").trim();
        if line.is_empty() {
            continue;
        }
        let (key, rest) = line
            .split_once(':')
            .ok_or_else(|| SimError::Config(format!("missing ':' in line: {raw_line:?}")))?;
        let rest = rest.trim();

        match key.trim() {
            "ROBEntries" => {
                config.rob_entries = parse_usize(rest, raw_line)?;
                saw_rob = true;
            }
            "CDBs" => config.cdbs = parse_usize(rest, raw_line)?,
            "ALUI" => config.alu_i = parse_fu_triple(rest, raw_line)?,
            "ALUFP" => config.alu_fp = parse_fu_triple(rest, raw_line)?,
            "MULTFP" => config.mult_fp = parse_fu_triple(rest, raw_line)?,
            "LoadStoreUnit" => {
                let parts: Vec<&str> = rest.split_whitespace().collect();
                let [lsq_size, mem_latency, mem_words] = parts.as_slice() else {
                    return Err(SimError::Config(format!(
                        "LoadStoreUnit expects 3 fields: {raw_line:?}"
                    )));
                };
                config.lsq_size = parse_usize(lsq_size, raw_line)?;
                config.mem_latency = parse_usize(mem_latency, raw_line)? as u32;
                config.mem_words = parse_usize(mem_words, raw_line)?;
                saw_lsq = true;
            }
            "RegFileInitData" => {
                for pair in rest.split_whitespace() {
                    let (reg, value) = pair.split_once('=').ok_or_else(|| {
                        SimError::Config(format!("malformed register init {pair:?}"))
                    })?;
                    let reg = Register::parse(reg)
                        .ok_or_else(|| SimError::Config(format!("bad register name {reg:?}")))?;
                    let value = parse_value(reg.is_fp(), value, raw_line)?;
                    config.reg_init.push((reg, value));
                }
            }
            "MemInitData" => {
                for pair in rest.split_whitespace() {
                    let (addr, value) = pair
                        .split_once('=')
                        .ok_or_else(|| SimError::Config(format!("malformed memory init {pair:?}")))?;
                    let addr = parse_usize(addr, raw_line)?;
                    let value = parse_value(value.contains('.'), value, raw_line)?;
                    config.mem_init.push((addr, value));
                }
            }
            "Instructions" => {
                if !rest.is_empty() {
                    config.instructions.push(decode::decode_line(next_instr_id, rest)?);
                    next_instr_id += 1;
                }
            }
            other => {
                return Err(SimError::Config(format!("unknown directive {other:?} in {raw_line:?}")));
            }
        }
    }

    if !saw_rob {
        return Err(SimError::Config("missing ROBEntries".to_string()));
    }
    if !saw_lsq {
        return Err(SimError::Config("missing LoadStoreUnit".to_string()));
    }

    debug!(
        instructions = config.instructions.len(),
        rob_entries = config.rob_entries,
        "configuration loaded"
    );
    Ok(config)
}

fn parse_usize(token: &str, line: &str) -> Result<usize, SimError> {
    token
        .trim()
        .parse()
        .map_err(|_| SimError::Config(format!("expected integer {token:?} in {line:?}")))
}

fn parse_fu_triple(rest: &str, line: &str) -> Result<FunctionalUnitConfig, SimError> {
    let parts: Vec<&str> = rest.split_whitespace().collect();
    let [rs_size, latency, count] = parts.as_slice() else {
        return Err(SimError::Config(format!(
            "functional-unit line expects 3 fields: {line:?}"
        )));
    };
    Ok(FunctionalUnitConfig {
        rs_size: parse_usize(rs_size, line)?,
        latency: parse_usize(latency, line)? as u32,
        count: parse_usize(count, line)?,
    })
}

fn parse_value(is_float: bool, token: &str, line: &str) -> Result<Value, SimError> {
    if is_float {
        token
            .parse::<f64>()
            .map(Value::Float)
            .map_err(|_| SimError::Config(format!("expected float {token:?} in {line:?}")))
    } else {
        token
            .parse::<i64>()
            .map(Value::Int)
            .map_err(|_| SimError::Config(format!("expected integer {token:?} in {line:?}")))
    }
}
