//! Run command implementation.

use super::{load_config, CliError, OutputFormat};
use mipsim::dump::{format_registers, JsonState};
use mipsim::{load_simulator, RunSummary};
use serde::Serialize;
use std::path::PathBuf;

/// JSON output for a batch run.
#[derive(Debug, Serialize)]
struct JsonRunResult {
    summary: RunSummary,
    state: JsonState,
}

/// Execute the run command.
///
/// # Errors
///
/// Returns an error if the config or programs fail to load.
pub(crate) fn execute(
    programs: &[PathBuf],
    cycles: Option<u64>,
    format: OutputFormat,
    config: Option<PathBuf>,
    max_cycles: Option<u64>,
) -> Result<(), CliError> {
    let config = load_config(config.as_deref(), max_cycles)?;
    let mut sim = load_simulator(programs, &config)?;

    let summary = match cycles {
        Some(n) => sim.run(n)?,
        None => sim.go(config.max_cycles)?,
    };

    match format {
        OutputFormat::Text => {
            if summary.halted {
                println!("Simulation halted after {} cycles", summary.cycles);
            } else {
                println!("Simulated {} cycles", summary.cycles);
            }
            for diag in &summary.diagnostics {
                println!("warning: {diag}");
            }
            let kept = u64::try_from(summary.diagnostics.len()).unwrap_or(u64::MAX);
            if summary.diagnostic_count > kept {
                println!("warning: {} more unknown instructions", summary.diagnostic_count - kept);
            }
            println!();
            print!("{}", format_registers(sim.state(), sim.instruction_count()));
        }
        OutputFormat::Json => {
            let result = JsonRunResult {
                state: JsonState::new(sim.state(), sim.instruction_count(), sim.is_running()),
                summary,
            };
            let json = serde_json::to_string_pretty(&result)
                .map_err(|e| CliError::new(format!("JSON serialization failed: {e}")))?;
            println!("{json}");
        }
    }

    Ok(())
}
