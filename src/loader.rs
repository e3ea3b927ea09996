//! Program loading: hex text files and MIPS ELF executables.

mod elf;
mod hex;

use std::fmt;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::config::SimConfig;
use crate::error::MemoryFault;
use crate::vm::cpu::{REG_GP, REG_SP};
use crate::vm::{Memory, Simulator};

pub use elf::load_elf;
pub use hex::{load_hex, parse_hex};

const ELF_MAGIC: &[u8] = b"\x7fELF";

/// Error type for program loading.
#[derive(Debug)]
pub enum LoadError {
    /// The program file could not be read.
    Io {
        /// File that failed.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
    /// A hex program contains a token that is not a 32-bit hex word.
    Parse {
        /// 1-based line number.
        line: usize,
        /// Offending token.
        token: String,
    },
    /// The ELF is valid but not a 32-bit little-endian MIPS executable.
    NotMips(String),
    /// The ELF is malformed or a segment cannot be placed.
    Segment {
        /// Description of the problem.
        reason: String,
    },
    /// The program does not fit in mapped memory.
    Fault(MemoryFault),
    /// The program contains no instructions.
    Empty,
    /// No program files were given.
    NoPrograms,
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadError::Io { path, source } => {
                write!(f, "failed to read {}: {source}", path.display())
            }
            LoadError::Parse { line, token } => {
                write!(f, "line {line}: '{token}' is not a 32-bit hex word")
            }
            LoadError::NotMips(reason) => write!(f, "unsupported ELF: {reason}"),
            LoadError::Segment { reason } => write!(f, "ELF load error: {reason}"),
            LoadError::Fault(fault) => write!(f, "program does not fit in memory: {fault}"),
            LoadError::Empty => write!(f, "program contains no instructions"),
            LoadError::NoPrograms => write!(f, "no program files given"),
        }
    }
}

impl std::error::Error for LoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LoadError::Io { source, .. } => Some(source),
            LoadError::Fault(fault) => Some(fault),
            _ => None,
        }
    }
}

/// Where a program landed in memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadedProgram {
    /// Initial PC for this program.
    pub entry: u32,
    /// One past the highest loaded address.
    pub end: u32,
    /// Initial `$sp`, when the format defines one.
    pub stack_pointer: Option<u32>,
    /// Initial `$gp`, when the format defines one.
    pub global_pointer: Option<u32>,
}

/// Load one program image, detecting ELF by its magic number and treating
/// anything else as hex text placed at `addr`.
///
/// # Errors
///
/// Returns a [`LoadError`] if the image cannot be parsed or placed.
pub fn load_program(
    memory: &mut Memory,
    bytes: &[u8],
    addr: u32,
    config: &SimConfig,
) -> Result<LoadedProgram, LoadError> {
    if bytes.starts_with(ELF_MAGIC) {
        load_elf(memory, bytes, config.stack_top())
    } else {
        let text = String::from_utf8_lossy(bytes);
        load_hex(memory, &text, addr)
    }
}

/// Build a simulator from program files.
///
/// Hex programs are placed back to back starting at `config.text_start`.
/// The first program's entry point becomes the initial PC; `$sp` and `$gp`
/// are taken from the first program that defines them, with `$sp` falling
/// back to the top of the configured stack region.
///
/// # Errors
///
/// Returns a [`LoadError`] for the first file that fails to load.
pub fn load_simulator<P: AsRef<Path>>(
    paths: &[P],
    config: &SimConfig,
) -> Result<Simulator, LoadError> {
    if paths.is_empty() {
        return Err(LoadError::NoPrograms);
    }

    let mut memory = config.build_memory();
    let mut next_addr = config.text_start;
    let mut programs = Vec::with_capacity(paths.len());

    for path in paths {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let program = load_program(&mut memory, &bytes, next_addr, config)?;
        info!(
            path = %path.display(),
            entry = format_args!("{:#010x}", program.entry),
            end = format_args!("{:#010x}", program.end),
            "loaded program"
        );
        next_addr = next_addr.max(program.end);
        programs.push(program);
    }

    let entry = programs.first().map_or(config.text_start, |p| p.entry);
    let mut sim = Simulator::new(memory, entry);
    let stack_pointer = programs.iter().find_map(|p| p.stack_pointer);
    if let Some(sp) = stack_pointer.or_else(|| config.stack_top()) {
        sim.set_register(u32::from(REG_SP), sp)
            .map_err(|e| LoadError::Segment { reason: e.to_string() })?;
    }
    if let Some(gp) = programs.iter().find_map(|p| p.global_pointer) {
        sim.set_register(u32::from(REG_GP), gp)
            .map_err(|e| LoadError::Segment { reason: e.to_string() })?;
    }
    Ok(sim)
}
