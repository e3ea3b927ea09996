//! Property tests for field extraction and single-cycle execution.

#![allow(missing_docs)]
#![allow(clippy::unreadable_literal)] // Instruction encodings are standard hex
#![allow(clippy::unwrap_used)] // Test code can use unwrap
#![allow(clippy::cast_possible_wrap)] // Test code casts are intentional
#![allow(clippy::cast_sign_loss)] // Test code casts are intentional
#![allow(clippy::cast_possible_truncation)] // Test code casts are intentional

use proptest::prelude::*;

use mipsim::isa::{fields, Funct, Opcode};
use mipsim::{process_instruction, Diagnostic, MachineState, Memory, Region, RunFlag};

const TEXT: u32 = 0x0040_0000;
const DATA: u32 = 0x1000_0000;

fn r_type(rs: u8, rt: u8, rd: u8, shamt: u8, funct: u8) -> u32 {
    (u32::from(rs) << 21)
        | (u32::from(rt) << 16)
        | (u32::from(rd) << 11)
        | (u32::from(shamt) << 6)
        | u32::from(funct)
}

fn i_type(op: u8, rs: u8, rt: u8, imm: u16) -> u32 {
    (u32::from(op) << 26) | (u32::from(rs) << 21) | (u32::from(rt) << 16) | u32::from(imm)
}

/// Run one cycle of `word` placed at `TEXT` against `current`.
fn step(word: u32, current: &MachineState) -> (MachineState, Option<Diagnostic>, RunFlag) {
    let mut mem = Memory::with_regions(vec![
        Region::new(TEXT, 0x100),
        Region::new(DATA, 0x100),
    ]);
    mem.store_u32(current.pc, word).unwrap();
    let mut next = *current;
    let mut run = RunFlag::new();
    let diag = process_instruction(current, &mut next, &mut mem, &mut run);
    (next, diag, run)
}

fn state_strategy() -> impl Strategy<Value = MachineState> {
    (prop::array::uniform32(any::<u32>()), any::<u32>(), any::<u32>()).prop_map(
        |(regs, hi, lo)| {
            let mut state = MachineState::with_pc(TEXT);
            state.set_registers(regs);
            state.hi = hi;
            state.lo = lo;
            state
        },
    )
}

/// Two distinct source registers and a destination.
fn regs3() -> impl Strategy<Value = (u8, u8, u8)> {
    (1u8..32, 1u8..32, 1u8..32).prop_filter("distinct sources", |(a, b, _)| a != b)
}

proptest! {
    #[test]
    fn extractors_cover_bit_layout(word: u32) {
        let rebuilt = (u32::from(fields::opcode(word)) << 26)
            | (u32::from(fields::rs(word)) << 21)
            | (u32::from(fields::rt(word)) << 16)
            | (u32::from(fields::rd(word)) << 11)
            | (fields::shamt(word) << 6)
            | u32::from(fields::funct(word));
        prop_assert_eq!(rebuilt, word);
        prop_assert_eq!(fields::imm_unsigned(word), word & 0xFFFF);
        prop_assert_eq!(fields::target(word), word & 0x03FF_FFFF);
    }

    #[test]
    fn extractors_are_pure(word: u32) {
        prop_assert_eq!(fields::opcode(word), fields::opcode(word));
        prop_assert_eq!(fields::imm_signed(word), fields::imm_signed(word));
        prop_assert!(fields::opcode(word) < 64);
        prop_assert!(fields::rs(word) < 32 && fields::rt(word) < 32 && fields::rd(word) < 32);
        prop_assert!(fields::shamt(word) < 32);
        prop_assert!(fields::funct(word) < 64);
    }

    #[test]
    fn imm_signed_sign_extends(imm: u16) {
        let word = i_type(0x08, 0, 0, imm);
        prop_assert_eq!(fields::imm_signed(word), i32::from(imm as i16));
        prop_assert_eq!(fields::imm_signed(word) as u32 & 0xFFFF, u32::from(imm));
    }

    #[test]
    fn add_and_sub_wrap_like_i32(
        state in state_strategy(),
        (rs, rt, rd) in regs3(),
    ) {
        let a = state.reg(rs) as i32;
        let b = state.reg(rt) as i32;

        let (next, diag, _) = step(r_type(rs, rt, rd, 0, Funct::Add as u8), &state);
        prop_assert!(diag.is_none());
        prop_assert_eq!(next.reg(rd) as i32, a.wrapping_add(b));

        let (next, _, _) = step(r_type(rs, rt, rd, 0, Funct::Subu as u8), &state);
        prop_assert_eq!(next.reg(rd) as i32, a.wrapping_sub(b));
        prop_assert_eq!(next.pc, TEXT + 4);
    }

    #[test]
    fn addi_wraps_like_i32(state in state_strategy(), rs in 0u8..32, rt in 1u8..32, imm: u16) {
        let expected = (state.reg(rs) as i32).wrapping_add(i32::from(imm as i16));
        let (next, diag, _) = step(i_type(Opcode::Addi as u8, rs, rt, imm), &state);
        prop_assert!(diag.is_none());
        prop_assert_eq!(next.reg(rt) as i32, expected);
    }

    #[test]
    fn mult_matches_i64(state in state_strategy(), (rs, rt, _) in regs3()) {
        let product = i64::from(state.reg(rs) as i32) * i64::from(state.reg(rt) as i32);
        let (next, _, _) = step(r_type(rs, rt, 0, 0, Funct::Mult as u8), &state);
        prop_assert_eq!(next.hi, (product >> 32) as u32);
        prop_assert_eq!(next.lo, product as u32);
    }

    #[test]
    fn multu_matches_u64(state in state_strategy(), (rs, rt, _) in regs3()) {
        let product = u64::from(state.reg(rs)) * u64::from(state.reg(rt));
        let (next, _, _) = step(r_type(rs, rt, 0, 0, Funct::Multu as u8), &state);
        prop_assert_eq!((u64::from(next.hi) << 32) | u64::from(next.lo), product);
    }

    #[test]
    fn divu_matches_u32(state in state_strategy(), (rs, rt, _) in regs3()) {
        let (a, b) = (state.reg(rs), state.reg(rt));
        let (next, _, _) = step(r_type(rs, rt, 0, 0, Funct::Divu as u8), &state);
        if b == 0 {
            prop_assert_eq!((next.hi, next.lo), (state.hi, state.lo));
        } else {
            prop_assert_eq!((next.hi, next.lo), (a % b, a / b));
        }
    }

    #[test]
    fn div_matches_i32_wrapping(state in state_strategy(), (rs, rt, _) in regs3()) {
        let (a, b) = (state.reg(rs) as i32, state.reg(rt) as i32);
        let (next, _, _) = step(r_type(rs, rt, 0, 0, Funct::Div as u8), &state);
        if b == 0 {
            prop_assert_eq!((next.hi, next.lo), (state.hi, state.lo));
        } else {
            prop_assert_eq!(
                (next.hi, next.lo),
                (a.wrapping_rem(b) as u32, a.wrapping_div(b) as u32)
            );
        }
    }

    #[test]
    fn shifts_match_rust_ops(state in state_strategy(), rt in 0u8..32, rd in 1u8..32, shamt in 0u8..32) {
        let value = state.reg(rt);

        let (next, _, _) = step(r_type(0, rt, rd, shamt, Funct::Sll as u8), &state);
        prop_assert_eq!(next.reg(rd), value << shamt);

        let (next, _, _) = step(r_type(0, rt, rd, shamt, Funct::Srl as u8), &state);
        prop_assert_eq!(next.reg(rd), value >> shamt);

        let (next, _, _) = step(r_type(0, rt, rd, shamt, Funct::Sra as u8), &state);
        prop_assert_eq!(next.reg(rd), ((value as i32) >> shamt) as u32);
    }

    #[test]
    fn unknown_funct_only_advances_pc(state in state_strategy(), upper in 0u32..(1 << 20)) {
        // and, or, xor, nor, slt, sltu are outside the implemented set
        for funct in [0x24u32, 0x25, 0x26, 0x27, 0x2A, 0x2B, 0x3F] {
            let word = (upper << 6) | funct;
            let (next, diag, run) = step(word, &state);
            let mut expected = state;
            expected.pc = TEXT + 4;
            prop_assert_eq!(next, expected);
            prop_assert!(run.is_running());
            prop_assert!(
                matches!(diag, Some(Diagnostic::UnknownFunct { funct: f, .. }) if u32::from(f) == funct),
                "expected UnknownFunct"
            );
        }
    }

    #[test]
    fn unknown_opcode_only_advances_pc(state in state_strategy(), low in 0u32..(1 << 26)) {
        for op in [0x10u32, 0x11, 0x22, 0x26, 0x2A, 0x30, 0x3F] {
            let word = (op << 26) | low;
            let (next, diag, run) = step(word, &state);
            let mut expected = state;
            expected.pc = TEXT + 4;
            prop_assert_eq!(next, expected);
            prop_assert!(run.is_running());
            prop_assert_eq!(diag.map(|d| d.word()), Some(word));
        }
    }

    #[test]
    fn branch_targets_are_relative_to_next_pc(state in state_strategy(), imm: u16) {
        let mut state = state;
        state.set_reg(1, 5);
        state.set_reg(2, 5);
        let (next, diag, _) = step(i_type(Opcode::Beq as u8, 1, 2, imm), &state);
        prop_assert!(diag.is_none());
        let offset = i32::from(imm as i16) << 2;
        prop_assert_eq!(next.pc, (TEXT + 4).wrapping_add(offset as u32));
    }
}
