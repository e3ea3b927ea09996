//! I-format execution: immediate arithmetic and logic, loads, stores and
//! conditional branches (including the opcode 0x01 branch-on-sign family).
//!
//! The cast warnings below are intentionally allowed because MIPS semantics
//! require deliberate signed/unsigned reinterpretation of 32-bit values.

#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_possible_truncation)]

use crate::error::Diagnostic;
use crate::isa::fields::{imm_signed, imm_unsigned, opcode, rs, rt};
use crate::isa::{BranchCode, Opcode};
use crate::vm::cpu::REG_RA;
use crate::vm::{Bus, Flow, MachineState, Width};

/// Target of a taken branch: relative to the instruction after the branch.
#[inline]
#[must_use]
pub fn branch_target(pc: u32, imm: i32) -> u32 {
    pc.wrapping_add(4).wrapping_add((imm << 2) as u32)
}

/// Execute an I-format instruction.
///
/// Reads only from `current` and writes only to `next` (and, for stores, to
/// the bus). Returns [`Flow::Jump`] for taken branches.
///
/// # Errors
///
/// Returns [`Diagnostic::UnknownBranchCode`] for an opcode 0x01 instruction
/// whose rt field is not a known branch, or [`Diagnostic::UnknownOpcode`] if
/// the opcode is not an I-format opcode at all. Nothing is written in either
/// case.
#[allow(clippy::too_many_lines)]
pub(crate) fn execute_itype<B: Bus + ?Sized>(
    word: u32,
    current: &MachineState,
    next: &mut MachineState,
    bus: &mut B,
) -> Result<Flow, Diagnostic> {
    let unknown = || Diagnostic::UnknownOpcode {
        pc: current.pc,
        word,
        opcode: opcode(word),
    };
    let op = Opcode::from_bits(opcode(word)).ok_or_else(unknown)?;

    let rs_val = current.reg(rs(word));
    let dest = rt(word);
    let rt_val = current.reg(dest);
    let imm = imm_signed(word);
    let addr = rs_val.wrapping_add(imm as u32);
    let taken = |cond: bool| {
        if cond {
            Flow::Jump(branch_target(current.pc, imm))
        } else {
            Flow::Fallthrough
        }
    };

    let flow = match op {
        // ==================== Branches ====================
        Opcode::Beq => taken(rs_val == rt_val),
        Opcode::Bne => taken(rs_val != rt_val),
        Opcode::Blez => taken((rs_val as i32) <= 0),
        Opcode::Bgtz => taken((rs_val as i32) > 0),
        Opcode::RegImm => {
            let code = BranchCode::from_bits(dest).ok_or(Diagnostic::UnknownBranchCode {
                pc: current.pc,
                word,
                code: dest,
            })?;
            let flow = taken(code.taken(rs_val as i32));
            if code.links() && flow != Flow::Fallthrough {
                next.set_reg(REG_RA, current.pc.wrapping_add(4));
            }
            flow
        }

        // ==================== Arithmetic ====================
        // addi does not trap on overflow here; both wrap.
        Opcode::Addi | Opcode::Addiu => {
            next.set_reg(dest, rs_val.wrapping_add(imm as u32));
            Flow::Fallthrough
        }
        Opcode::Slti => {
            next.set_reg(dest, u32::from((rs_val as i32) < imm));
            Flow::Fallthrough
        }
        Opcode::Sltiu => {
            next.set_reg(dest, u32::from(rs_val < imm as u32));
            Flow::Fallthrough
        }

        // ==================== Logical ====================
        Opcode::Andi => {
            next.set_reg(dest, rs_val & imm_unsigned(word));
            Flow::Fallthrough
        }
        Opcode::Ori => {
            next.set_reg(dest, rs_val | imm_unsigned(word));
            Flow::Fallthrough
        }
        Opcode::Xori => {
            next.set_reg(dest, rs_val ^ imm_unsigned(word));
            Flow::Fallthrough
        }
        Opcode::Lui => {
            next.set_reg(dest, imm_unsigned(word) << 16);
            Flow::Fallthrough
        }

        // ==================== Loads ====================
        // Memory is little-endian, so the low bits of the word read at
        // `addr` are exactly the byte/halfword at `addr`.
        Opcode::Lb => {
            let data = bus.read32(addr);
            next.set_reg(dest, i32::from(data as u8 as i8) as u32);
            Flow::Fallthrough
        }
        Opcode::Lh => {
            let data = bus.read32(addr);
            next.set_reg(dest, i32::from(data as u16 as i16) as u32);
            Flow::Fallthrough
        }
        Opcode::Lw => {
            next.set_reg(dest, bus.read32(addr));
            Flow::Fallthrough
        }
        Opcode::Lbu => {
            next.set_reg(dest, bus.read32(addr) & 0xFF);
            Flow::Fallthrough
        }
        Opcode::Lhu => {
            next.set_reg(dest, bus.read32(addr) & 0xFFFF);
            Flow::Fallthrough
        }

        // ==================== Stores ====================
        Opcode::Sb => {
            bus.write(addr, rt_val, Width::Byte);
            Flow::Fallthrough
        }
        Opcode::Sh => {
            bus.write(addr, rt_val, Width::Half);
            Flow::Fallthrough
        }
        Opcode::Sw => {
            bus.write(addr, rt_val, Width::Word);
            Flow::Fallthrough
        }

        // R- and J-format opcodes are routed elsewhere by the dispatcher
        Opcode::Special | Opcode::J | Opcode::Jal => return Err(unknown()),
    };

    Ok(flow)
}
