//! mipsim CLI - run MIPS programs in batch mode or from an interactive shell.

// Allow print in the CLI binary
#![allow(clippy::print_stdout, clippy::print_stderr)]

mod cli;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// mipsim - a cycle-level MIPS32 instruction simulator
#[derive(Parser, Debug)]
#[command(name = "mipsim")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Log output format
    #[arg(long, global = true, default_value = "text")]
    log_format: cli::LogFormat,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Interactive shell: step, run and inspect the machine
    Shell {
        /// Program files (hex text or MIPS ELF), loaded back to back
        #[arg(required = true)]
        programs: Vec<PathBuf>,

        /// JSON configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Mirror register and memory dumps to this file
        #[arg(long)]
        dumpsim: Option<PathBuf>,
    },

    /// Run a program and print the final machine state
    Run {
        /// Program files (hex text or MIPS ELF), loaded back to back
        #[arg(required = true)]
        programs: Vec<PathBuf>,

        /// Run exactly this many cycles instead of running to completion
        #[arg(short = 'n', long)]
        cycles: Option<u64>,

        /// Output format: text or json
        #[arg(short, long, default_value = "text")]
        format: cli::OutputFormat,

        /// JSON configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Cycle cap when running to completion
        #[arg(long)]
        max_cycles: Option<u64>,
    },
}

fn init_logging(format: cli::LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    match format {
        cli::LogFormat::Text => builder.init(),
        cli::LogFormat::Json => builder.json().init(),
    }
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.log_format);

    let result = match args.command {
        Commands::Shell {
            programs,
            config,
            dumpsim,
        } => cli::shell::execute(&programs, config, dumpsim),

        Commands::Run {
            programs,
            cycles,
            format,
            config,
            max_cycles,
        } => cli::run::execute(&programs, cycles, format, config, max_cycles),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
