//! Shell command implementation: reads commands from stdin until `quit` or EOF.

use super::{load_config, CliError};
use mipsim::load_simulator;
use mipsim::shell::{Control, Shell};
use std::fs::File;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

const PROMPT: &str = "MIPS-SIM> ";

/// Execute the shell command.
///
/// # Errors
///
/// Returns an error if loading fails or the terminal cannot be written.
pub(crate) fn execute(
    programs: &[PathBuf],
    config: Option<PathBuf>,
    dumpsim: Option<PathBuf>,
) -> Result<(), CliError> {
    let config = load_config(config.as_deref(), None)?;
    let sim = load_simulator(programs, &config)?;

    let mut shell = Shell::new(sim, io::stdout()).with_max_cycles(config.max_cycles);
    if let Some(path) = dumpsim {
        let file = File::create(&path)
            .map_err(|e| CliError::new(format!("Failed to create {}: {e}", path.display())))?;
        shell = shell.with_dump_file(Box::new(file));
    }

    println!("MIPS simulator - type '?' for help");
    let stdin = io::stdin();
    let mut line = String::new();
    loop {
        print!("{PROMPT}");
        io::stdout().flush()?;

        line.clear();
        if stdin.lock().read_line(&mut line)? == 0 {
            println!();
            break;
        }
        if shell.execute_line(&line)? == Control::Quit {
            break;
        }
    }

    Ok(())
}
