//! Interactive command language for stepping and inspecting a simulator.

use std::fmt;
use std::io::Write;

use crate::dump::{format_registers, write_memory};
use crate::error::SimError;
use crate::vm::Simulator;

/// One parsed shell command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShellCommand {
    /// Run until the program halts.
    Go,
    /// Run a fixed number of cycles.
    Run(u64),
    /// Dump memory words in `[low, high]`.
    MemoryDump {
        /// First address.
        low: u32,
        /// Last address (inclusive).
        high: u32,
    },
    /// Dump registers.
    RegisterDump,
    /// Set a general-purpose register.
    Input {
        /// Register index.
        reg: u32,
        /// New value.
        value: u32,
    },
    /// Set HI.
    High(u32),
    /// Set LO.
    Low(u32),
    /// Print the command list.
    Help,
    /// Leave the shell.
    Quit,
}

/// Error type for shell input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellError {
    /// The command word is not recognized.
    UnknownCommand(String),
    /// An argument is missing.
    MissingArgument(&'static str),
    /// An argument is not a number.
    BadNumber(String),
    /// The simulator rejected the request.
    Sim(SimError),
}

impl fmt::Display for ShellError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShellError::UnknownCommand(word) => write!(f, "invalid command '{word}' (try '?')"),
            ShellError::MissingArgument(name) => write!(f, "missing argument: {name}"),
            ShellError::BadNumber(token) => write!(f, "'{token}' is not a number"),
            ShellError::Sim(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for ShellError {}

impl From<SimError> for ShellError {
    fn from(e: SimError) -> Self {
        ShellError::Sim(e)
    }
}

/// Parse a decimal or `0x`-prefixed hex number.
fn parse_number<T>(token: &str) -> Result<T, ShellError>
where
    T: TryFrom<u64>,
{
    let parsed = match token.strip_prefix("0x").or_else(|| token.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16),
        None => token.parse::<u64>(),
    };
    parsed
        .ok()
        .and_then(|value| T::try_from(value).ok())
        .ok_or_else(|| ShellError::BadNumber(token.to_string()))
}

fn arg<'a, T: TryFrom<u64>>(
    args: &mut impl Iterator<Item = &'a str>,
    name: &'static str,
) -> Result<T, ShellError> {
    parse_number(args.next().ok_or(ShellError::MissingArgument(name))?)
}

impl ShellCommand {
    /// Parse one input line. Returns `Ok(None)` for a blank line.
    ///
    /// # Errors
    ///
    /// Returns a [`ShellError`] for unknown commands and bad arguments.
    pub fn parse(line: &str) -> Result<Option<Self>, ShellError> {
        let mut words = line.split_whitespace();
        let Some(command) = words.next() else {
            return Ok(None);
        };

        let cmd = match command.to_ascii_lowercase().as_str() {
            "go" | "g" => ShellCommand::Go,
            "run" | "r" => ShellCommand::Run(arg(&mut words, "cycles")?),
            "mdump" | "m" => ShellCommand::MemoryDump {
                low: arg(&mut words, "low address")?,
                high: arg(&mut words, "high address")?,
            },
            "rdump" | "rd" => ShellCommand::RegisterDump,
            "input" | "i" => ShellCommand::Input {
                reg: arg(&mut words, "register")?,
                value: arg(&mut words, "value")?,
            },
            "high" | "h" => ShellCommand::High(arg(&mut words, "value")?),
            "low" | "l" => ShellCommand::Low(arg(&mut words, "value")?),
            "?" | "help" => ShellCommand::Help,
            "quit" | "q" => ShellCommand::Quit,
            _ => return Err(ShellError::UnknownCommand(command.to_string())),
        };
        Ok(Some(cmd))
    }
}

const HELP: &str = "\
----------------MIPS ISIM Help-----------------------
go                     -  run program to completion
run n                  -  execute program for n instructions
mdump low high         -  dump memory from low to high
rdump                  -  dump the register & bus values
input reg_no reg_value -  set GPR reg_no to reg_value
high value             -  set the HI register to value
low value              -  set the LO register to value
?                      -  display this help menu
quit                   -  exit the program
";

/// Whether the shell should keep reading commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    /// Read the next command.
    Continue,
    /// Stop the shell.
    Quit,
}

/// Executes shell commands against a simulator, writing output to `out`.
///
/// Dumps are mirrored to `dump_file` when one is attached.
#[derive(Debug)]
pub struct Shell<W: Write> {
    sim: Simulator,
    out: W,
    dump_file: Option<Box<dyn WriteDebug>>,
    max_cycles: Option<u64>,
}

/// A writer that can also be debug-printed.
pub trait WriteDebug: Write + fmt::Debug {}

impl<T: Write + fmt::Debug> WriteDebug for T {}

impl<W: Write> Shell<W> {
    /// Create a shell around `sim`.
    pub fn new(sim: Simulator, out: W) -> Self {
        Shell {
            sim,
            out,
            dump_file: None,
            max_cycles: None,
        }
    }

    /// Mirror register and memory dumps to `file`.
    #[must_use]
    pub fn with_dump_file(mut self, file: Box<dyn WriteDebug>) -> Self {
        self.dump_file = Some(file);
        self
    }

    /// Cap the cycles executed by `go`.
    #[must_use]
    pub fn with_max_cycles(mut self, max_cycles: Option<u64>) -> Self {
        self.max_cycles = max_cycles;
        self
    }

    /// The simulator being driven.
    #[must_use]
    pub fn simulator(&self) -> &Simulator {
        &self.sim
    }

    /// Consume the shell, returning the simulator and output.
    pub fn into_parts(self) -> (Simulator, W) {
        (self.sim, self.out)
    }

    /// Parse and execute one input line.
    ///
    /// Command errors are reported on the output and do not stop the shell.
    ///
    /// # Errors
    ///
    /// Returns an I/O error only if writing output fails.
    pub fn execute_line(&mut self, line: &str) -> std::io::Result<Control> {
        let result = ShellCommand::parse(line).and_then(|cmd| match cmd {
            Some(cmd) => self.execute(cmd),
            None => Ok(Ok(Control::Continue)),
        });
        match result {
            Ok(control) => control,
            Err(e) => {
                writeln!(self.out, "Error: {e}")?;
                Ok(Control::Continue)
            }
        }
    }

    /// Execute one command.
    ///
    /// The outer result carries command errors, the inner one output errors.
    fn execute(&mut self, cmd: ShellCommand) -> Result<std::io::Result<Control>, ShellError> {
        let output = match cmd {
            ShellCommand::Go => {
                let summary = self.sim.go(self.max_cycles)?;
                Some(if summary.halted {
                    format!("Simulation halted after {} cycles\n", summary.cycles)
                } else {
                    format!("Cycle limit reached after {} cycles\n", summary.cycles)
                })
            }
            ShellCommand::Run(cycles) => {
                let summary = self.sim.run(cycles)?;
                Some(format!("Simulated {} cycles\n", summary.cycles))
            }
            ShellCommand::MemoryDump { low, high } => {
                return Ok(self.memory_dump(low, high).map(|()| Control::Continue));
            }
            ShellCommand::RegisterDump => {
                let text = format_registers(self.sim.state(), self.sim.instruction_count());
                return Ok(self.dump(&text));
            }
            ShellCommand::Input { reg, value } => {
                self.sim.set_register(reg, value)?;
                None
            }
            ShellCommand::High(value) => {
                self.sim.set_hi(value);
                None
            }
            ShellCommand::Low(value) => {
                self.sim.set_lo(value);
                None
            }
            ShellCommand::Help => Some(HELP.to_string()),
            ShellCommand::Quit => {
                return Ok(writeln!(self.out, "Bye.").map(|()| Control::Quit));
            }
        };
        Ok(match output {
            Some(text) => self.out.write_all(text.as_bytes()).map(|()| Control::Continue),
            None => Ok(Control::Continue),
        })
    }

    /// Stream the memory dump to the output and the dump file.
    fn memory_dump(&mut self, low: u32, high: u32) -> std::io::Result<()> {
        write_memory(&mut self.out, self.sim.bus(), low, high)?;
        if let Some(file) = self.dump_file.as_mut() {
            write_memory(file.as_mut(), self.sim.bus(), low, high)?;
            file.write_all(b"\n")?;
        }
        Ok(())
    }

    fn dump(&mut self, text: &str) -> std::io::Result<Control> {
        self.out.write_all(text.as_bytes())?;
        if let Some(file) = self.dump_file.as_mut() {
            file.write_all(text.as_bytes())?;
            file.write_all(b"\n")?;
        }
        Ok(Control::Continue)
    }
}
