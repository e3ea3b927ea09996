//! Architectural machine state: registers, HI/LO and the program counter.

use serde::{Deserialize, Serialize};

/// Register receiving syscall numbers ($v0).
pub const REG_V0: u8 = 2;

/// Global pointer ($gp).
pub const REG_GP: u8 = 28;

/// Stack pointer ($sp).
pub const REG_SP: u8 = 29;

/// Link register written by jal, bltzal and bgezal ($ra).
pub const REG_RA: u8 = 31;

/// One snapshot of the machine.
///
/// The simulator keeps two of these per cycle: a `current` one that is only
/// read and a `next` one that is only written. Register 0 is *not* hardwired
/// to zero; a write to it sticks like any other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MachineState {
    /// General-purpose registers r0-r31.
    regs: [u32; 32],

    /// Address of the instruction to execute.
    pub pc: u32,

    /// High word of a product, or remainder of a division.
    pub hi: u32,

    /// Low word of a product, or quotient of a division.
    pub lo: u32,
}

impl MachineState {
    /// Create a snapshot with every register zeroed.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a zeroed snapshot with a specific entry point.
    #[must_use]
    pub fn with_pc(pc: u32) -> Self {
        MachineState {
            pc,
            ..Self::default()
        }
    }

    /// Read a general-purpose register. Only the low 5 bits of `index` are used.
    #[inline]
    #[must_use]
    pub fn reg(&self, index: u8) -> u32 {
        self.regs[usize::from(index & 0x1F)]
    }

    /// Write a general-purpose register. Only the low 5 bits of `index` are used.
    #[inline]
    pub fn set_reg(&mut self, index: u8, value: u32) {
        self.regs[usize::from(index & 0x1F)] = value;
    }

    /// Get a reference to the register file.
    #[must_use]
    pub fn registers(&self) -> &[u32; 32] {
        &self.regs
    }

    /// Replace the entire register file.
    pub fn set_registers(&mut self, regs: [u32; 32]) {
        self.regs = regs;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_r0_is_not_hardwired() {
        let mut state = MachineState::new();
        state.set_reg(0, 0xDEAD_BEEF);
        assert_eq!(state.reg(0), 0xDEAD_BEEF);
    }

    #[test]
    fn test_all_registers() {
        let mut state = MachineState::new();

        for i in 0..32u8 {
            state.set_reg(i, u32::from(i) * 100);
        }

        for i in 0..32u8 {
            assert_eq!(state.reg(i), u32::from(i) * 100);
        }
        assert_eq!(state.registers()[31], 3100);
    }

    #[test]
    fn test_index_masked_to_five_bits() {
        let mut state = MachineState::new();
        state.set_reg(33, 7);
        assert_eq!(state.reg(1), 7);
    }

    #[test]
    fn test_with_pc() {
        let state = MachineState::with_pc(0x0040_0000);
        assert_eq!(state.pc, 0x0040_0000);
        assert_eq!(state.hi, 0);
        assert_eq!(state.lo, 0);
        assert!(state.registers().iter().all(|&r| r == 0));
    }
}
