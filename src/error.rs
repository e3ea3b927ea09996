//! Error and diagnostic types for the simulator core.

use std::fmt;

use serde::Serialize;

/// Memory access type for fault reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessType {
    /// Data read (loads, dumps).
    Read,
    /// Data write (stores, program loading).
    Write,
    /// Instruction fetch.
    Execute,
}

/// An access that touched an address outside every mapped region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MemoryFault {
    /// First byte of the faulting access.
    pub addr: u32,
    /// The type of access attempted.
    pub access: AccessType,
}

impl fmt::Display for MemoryFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "memory {:?} fault at {:#010x}", self.access, self.addr)
    }
}

impl std::error::Error for MemoryFault {}

/// Result type for fallible memory operations.
pub type MemResult<T> = Result<T, MemoryFault>;

/// A non-fatal anomaly raised while executing one instruction.
///
/// Unknown encodings never abort simulation: the offending cycle behaves as a
/// no-op (PC advances by 4) and the dispatcher hands this event back to the
/// caller so it can be inspected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    /// Top-level opcode field is not one the core implements.
    UnknownOpcode {
        /// Address of the instruction.
        pc: u32,
        /// Raw instruction word.
        word: u32,
        /// Bits [31:26].
        opcode: u8,
    },
    /// R-format instruction with an unimplemented function code.
    UnknownFunct {
        /// Address of the instruction.
        pc: u32,
        /// Raw instruction word.
        word: u32,
        /// Bits [5:0].
        funct: u8,
    },
    /// Opcode 0x01 with an rt sub-code outside bltz/bgez/bltzal/bgezal.
    UnknownBranchCode {
        /// Address of the instruction.
        pc: u32,
        /// Raw instruction word.
        word: u32,
        /// Bits [20:16].
        code: u8,
    },
}

impl Diagnostic {
    /// Address of the instruction that raised this diagnostic.
    #[must_use]
    pub fn pc(&self) -> u32 {
        match *self {
            Diagnostic::UnknownOpcode { pc, .. }
            | Diagnostic::UnknownFunct { pc, .. }
            | Diagnostic::UnknownBranchCode { pc, .. } => pc,
        }
    }

    /// Raw instruction word that raised this diagnostic.
    #[must_use]
    pub fn word(&self) -> u32 {
        match *self {
            Diagnostic::UnknownOpcode { word, .. }
            | Diagnostic::UnknownFunct { word, .. }
            | Diagnostic::UnknownBranchCode { word, .. } => word,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::UnknownOpcode { pc, word, opcode } => write!(
                f,
                "unknown instruction {word:#010x} at {pc:#010x} (opcode {opcode:#04x})"
            ),
            Diagnostic::UnknownFunct { pc, word, funct } => write!(
                f,
                "unknown R-format instruction {word:#010x} at {pc:#010x} (funct {funct:#04x})"
            ),
            Diagnostic::UnknownBranchCode { pc, word, code } => write!(
                f,
                "unknown branch instruction {word:#010x} at {pc:#010x} (rt {code:#04x})"
            ),
        }
    }
}

impl std::error::Error for Diagnostic {}

/// Errors from the simulator driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimError {
    /// The run flag is clear; no further cycles may execute.
    Halted,
    /// Register index outside 0..32.
    InvalidRegister(u32),
}

impl fmt::Display for SimError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimError::Halted => write!(f, "can't simulate, simulator is halted"),
            SimError::InvalidRegister(index) => {
                write!(f, "invalid register index {index} (expected 0-31)")
            }
        }
    }
}

impl std::error::Error for SimError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostic_display() {
        let diag = Diagnostic::UnknownOpcode {
            pc: 0x0040_0000,
            word: 0xFC00_0000,
            opcode: 0x3F,
        };
        assert_eq!(
            diag.to_string(),
            "unknown instruction 0xfc000000 at 0x00400000 (opcode 0x3f)"
        );
        assert_eq!(diag.pc(), 0x0040_0000);
        assert_eq!(diag.word(), 0xFC00_0000);
    }

    #[test]
    fn test_diagnostic_serializes_with_kind_tag() {
        let diag = Diagnostic::UnknownFunct {
            pc: 4,
            word: 0x3F,
            funct: 0x3F,
        };
        let json = serde_json::to_value(diag).unwrap();
        assert_eq!(json["kind"], "unknown_funct");
        assert_eq!(json["funct"], 0x3F);
    }

    #[test]
    fn test_memory_fault_display() {
        let fault = MemoryFault {
            addr: 0xDEAD_0000,
            access: AccessType::Write,
        };
        assert_eq!(fault.to_string(), "memory Write fault at 0xdead0000");
    }

    #[test]
    fn test_sim_error_display() {
        assert_eq!(
            SimError::Halted.to_string(),
            "can't simulate, simulator is halted"
        );
        assert!(SimError::InvalidRegister(40).to_string().contains("40"));
    }
}
