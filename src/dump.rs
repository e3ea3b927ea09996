//! Register and memory dumps, as text and as JSON.

use std::fmt::Write as _;
use std::io;

use serde::Serialize;

use crate::vm::{MachineState, Memory};

/// Format the register/bus dump.
#[must_use]
pub fn format_registers(state: &MachineState, instruction_count: u64) -> String {
    let mut out = String::new();
    // Writing to a String cannot fail
    let _ = writeln!(out, "Current register/bus values :");
    let _ = writeln!(out, "-------------------------------------");
    let _ = writeln!(out, "Instruction Count : {instruction_count}");
    let _ = writeln!(out, "PC                : 0x{:08x}", state.pc);
    let _ = writeln!(out, "Registers:");
    for (index, value) in state.registers().iter().enumerate() {
        let _ = writeln!(out, "R{index}: 0x{value:08x}");
    }
    let _ = writeln!(out, "HI: 0x{:08x}", state.hi);
    let _ = writeln!(out, "LO: 0x{:08x}", state.lo);
    out
}

/// Write the words from `low` to `high` inclusive, 4 bytes apart, one line
/// at a time.
///
/// Unmapped words are shown as `--------`.
///
/// # Errors
///
/// Returns any error from `out`.
pub fn write_memory<W: io::Write + ?Sized>(
    out: &mut W,
    memory: &Memory,
    low: u32,
    high: u32,
) -> io::Result<()> {
    writeln!(out, "Memory content [0x{low:08x}..0x{high:08x}] :")?;
    writeln!(out, "-------------------------------------")?;
    let mut addr = low;
    while addr <= high {
        match memory.load_u32(addr) {
            Ok(value) => writeln!(out, "  0x{addr:08x} ({addr}) : 0x{value:08x}")?,
            Err(_) => writeln!(out, "  0x{addr:08x} ({addr}) : --------")?,
        }
        let Some(next) = addr.checked_add(4) else {
            break;
        };
        addr = next;
    }
    Ok(())
}

/// JSON view of the committed machine state.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct JsonState {
    /// Instructions executed so far.
    pub instruction_count: u64,
    /// Whether the run flag is still set.
    pub running: bool,
    /// Program counter.
    pub pc: u32,
    /// HI register.
    pub hi: u32,
    /// LO register.
    pub lo: u32,
    /// r0-r31.
    pub registers: [u32; 32],
}

impl JsonState {
    /// Capture a snapshot.
    #[must_use]
    pub fn new(state: &MachineState, instruction_count: u64, running: bool) -> Self {
        JsonState {
            instruction_count,
            running,
            pc: state.pc,
            hi: state.hi,
            lo: state.lo,
            registers: *state.registers(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vm::Region;

    #[test]
    fn test_format_registers() {
        let mut state = MachineState::with_pc(0x0040_0008);
        state.set_reg(2, 10);
        state.hi = 0xABCD;

        let text = format_registers(&state, 2);

        assert!(text.contains("Instruction Count : 2\n"));
        assert!(text.contains("PC                : 0x00400008\n"));
        assert!(text.contains("R2: 0x0000000a\n"));
        assert!(text.contains("R31: 0x00000000\n"));
        assert!(text.contains("HI: 0x0000abcd\n"));
        assert_eq!(text.lines().count(), 5 + 32 + 2);
    }

    fn memory_text(memory: &Memory, low: u32, high: u32) -> String {
        let mut out = Vec::new();
        write_memory(&mut out, memory, low, high).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_write_memory() {
        let mut mem = Memory::with_regions(vec![Region::new(0x1000, 0x8)]);
        mem.store_u32(0x1004, 0xCAFE_BABE).unwrap();

        let text = memory_text(&mem, 0x1000, 0x1008);

        assert!(text.contains("  0x00001000 (4096) : 0x00000000\n"));
        assert!(text.contains("  0x00001004 (4100) : 0xcafebabe\n"));
        assert!(text.contains("  0x00001008 (4104) : --------\n"));
    }

    #[test]
    fn test_write_memory_top_of_address_space() {
        let mem = Memory::new();
        let text = memory_text(&mem, 0xFFFF_FFF8, 0xFFFF_FFFF);
        assert_eq!(text.lines().count(), 2 + 2);
    }

    #[test]
    fn test_write_memory_stops_at_first_write_error() {
        struct Limited(usize);
        impl io::Write for Limited {
            fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
                if self.0 == 0 {
                    return Err(io::Error::other("full"));
                }
                self.0 -= 1;
                Ok(buf.len())
            }
            fn flush(&mut self) -> io::Result<()> {
                Ok(())
            }
        }

        let mem = Memory::new();
        let mut out = Limited(8);
        assert!(write_memory(&mut out, &mem, 0, u32::MAX).is_err());
    }

    #[test]
    fn test_json_state() {
        let mut state = MachineState::with_pc(0x0040_0000);
        state.set_reg(31, 7);
        let json = serde_json::to_value(JsonState::new(&state, 3, true)).unwrap();
        assert_eq!(json["pc"], 0x0040_0000);
        assert_eq!(json["registers"][31], 7);
        assert_eq!(json["running"], true);
    }
}
