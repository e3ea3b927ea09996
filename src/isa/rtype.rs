//! R-format execution: register-register arithmetic, shifts, multiply and
//! divide, HI/LO moves, register-indirect jumps and the halt syscall.
//!
//! The cast warnings below are intentionally allowed because MIPS semantics
//! require deliberate signed/unsigned reinterpretation of 32-bit values.

#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_possible_truncation)]

use tracing::{info, trace};

use crate::error::Diagnostic;
use crate::isa::fields::{funct, rd, rs, rt, shamt};
use crate::isa::Funct;
use crate::vm::cpu::REG_V0;
use crate::vm::{Flow, MachineState, RunFlag};

/// Syscall number (in $v0) that stops the simulator.
pub const SYSCALL_EXIT: u32 = 0x0A;

/// Execute an R-format (opcode 0) instruction.
///
/// Reads only from `current` and writes only to `next`. Returns
/// [`Flow::Jump`] for `jr`/`jalr` and [`Flow::Fallthrough`] otherwise.
///
/// # Errors
///
/// Returns [`Diagnostic::UnknownFunct`] for function codes outside the
/// implemented set; nothing is written in that case.
pub(crate) fn execute_rtype(
    word: u32,
    current: &MachineState,
    next: &mut MachineState,
    run: &mut RunFlag,
) -> Result<Flow, Diagnostic> {
    let Some(op) = Funct::from_bits(funct(word)) else {
        return Err(Diagnostic::UnknownFunct {
            pc: current.pc,
            word,
            funct: funct(word),
        });
    };

    let rs_val = current.reg(rs(word));
    let rt_val = current.reg(rt(word));
    let dest = rd(word);

    match op {
        // ==================== Arithmetic ====================
        // add/sub do not trap on overflow here; all four wrap.
        Funct::Add | Funct::Addu => next.set_reg(dest, rs_val.wrapping_add(rt_val)),
        Funct::Sub | Funct::Subu => next.set_reg(dest, rs_val.wrapping_sub(rt_val)),

        // ==================== Multiply / Divide ====================
        Funct::Mult => {
            let product = i64::from(rs_val as i32) * i64::from(rt_val as i32);
            next.hi = (product >> 32) as u32;
            next.lo = product as u32;
        }
        Funct::Multu => {
            let product = u64::from(rs_val) * u64::from(rt_val);
            next.hi = (product >> 32) as u32;
            next.lo = product as u32;
        }
        Funct::Div => {
            if rt_val == 0 {
                trace!(pc = current.pc, "div by zero ignored");
            } else {
                // i32::MIN / -1 wraps to i32::MIN with remainder 0
                let (dividend, divisor) = (rs_val as i32, rt_val as i32);
                next.lo = dividend.wrapping_div(divisor) as u32;
                next.hi = dividend.wrapping_rem(divisor) as u32;
            }
        }
        Funct::Divu => {
            if rt_val == 0 {
                trace!(pc = current.pc, "divu by zero ignored");
            } else {
                next.lo = rs_val / rt_val;
                next.hi = rs_val % rt_val;
            }
        }

        // ==================== HI/LO moves ====================
        Funct::Mfhi => next.set_reg(dest, current.hi),
        Funct::Mflo => next.set_reg(dest, current.lo),
        Funct::Mthi => next.hi = rs_val,
        Funct::Mtlo => next.lo = rs_val,

        // ==================== Shifts ====================
        Funct::Sll => next.set_reg(dest, rt_val << shamt(word)),
        Funct::Srl => next.set_reg(dest, rt_val >> shamt(word)),
        Funct::Sra => next.set_reg(dest, ((rt_val as i32) >> shamt(word)) as u32),
        Funct::Sllv => next.set_reg(dest, rt_val << (rs_val & 0x1F)),
        Funct::Srlv => next.set_reg(dest, rt_val >> (rs_val & 0x1F)),
        Funct::Srav => next.set_reg(dest, ((rt_val as i32) >> (rs_val & 0x1F)) as u32),

        // ==================== Jumps ====================
        Funct::Jr => return Ok(Flow::Jump(rs_val)),
        Funct::Jalr => {
            // Link from the pre-increment PC of this instruction
            next.set_reg(dest, current.pc.wrapping_add(4));
            return Ok(Flow::Jump(rs_val));
        }

        // ==================== System ====================
        Funct::Syscall => {
            let number = current.reg(REG_V0);
            if number == SYSCALL_EXIT {
                info!(pc = current.pc, "exit syscall, halting");
                run.halt();
            } else {
                trace!(pc = current.pc, number, "unimplemented syscall ignored");
            }
        }
    }

    Ok(Flow::Fallthrough)
}
