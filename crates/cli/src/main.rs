//! Tomasulo simulator CLI.
//!
//! Loads a configuration file, runs it to completion, and writes the run
//! report alongside the input as `<stem>_output.txt`.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use tomasulo_core::config;
use tomasulo_core::Simulator;

/// Runs a Tomasulo pipeline simulation from a configuration file.
#[derive(Parser, Debug)]
#[command(name = "tomasulo-sim", author, version, about)]
struct Cli {
    /// Path to the input configuration file.
    input: PathBuf,

    /// Enable verbose (debug-level) tracing to stderr.
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(&cli.input) {
        Ok(output_path) => {
            println!("wrote {}", output_path.display());
            ExitCode::SUCCESS
        }
        Err(message) => {
            eprintln!("error: {message}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::new(if verbose { "debug" } else { "info" });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn run(input: &Path) -> Result<PathBuf, String> {
    let cfg = config::load(input).map_err(|e| e.to_string())?;
    let report = Simulator::new(&cfg).run().map_err(|e| e.to_string())?;

    let output_path = output_path_for(input);
    std::fs::write(&output_path, report.to_string())
        .map_err(|e| format!("writing {}: {e}", output_path.display()))?;
    Ok(output_path)
}

fn output_path_for(input: &Path) -> PathBuf {
    let stem = input.file_stem().and_then(|s| s.to_str()).unwrap_or("program");
    let dir = input.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or_else(|| Path::new("."));
    dir.join(format!("{stem}_output.txt"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_path_sits_alongside_input() {
        let path = output_path_for(Path::new("programs/sample.txt"));
        assert_eq!(path, PathBuf::from("programs/sample_output.txt"));
    }

    #[test]
    fn output_path_defaults_dir_for_bare_filenames() {
        let path = output_path_for(Path::new("sample.txt"));
        assert_eq!(path, PathBuf::from("./sample_output.txt"));
    }
}
