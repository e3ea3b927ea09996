//! J-format execution: absolute jumps within the current 256 MiB segment.

use crate::isa::fields::target;
use crate::vm::cpu::REG_RA;
use crate::vm::{Flow, MachineState};

/// Absolute jump target: the 26-bit field shifted left by 2, under the top
/// four bits of `pc`.
#[inline]
#[must_use]
pub fn jump_target(pc: u32, word: u32) -> u32 {
    (pc & 0xF000_0000) | (target(word) << 2)
}

/// Execute `j` (or `jal` when `link` is set, which also writes $ra).
pub(crate) fn execute_jtype(
    word: u32,
    current: &MachineState,
    next: &mut MachineState,
    link: bool,
) -> Flow {
    if link {
        next.set_reg(REG_RA, current.pc.wrapping_add(4));
    }
    Flow::Jump(jump_target(current.pc, word))
}
