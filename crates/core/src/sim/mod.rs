//! Top-level simulation: drives a configured program to completion and
//! renders the result.

/// Run report formatting.
pub mod report;

/// The top-level `Simulator`.
pub mod simulator;

pub use report::SimulationReport;
pub use simulator::Simulator;
