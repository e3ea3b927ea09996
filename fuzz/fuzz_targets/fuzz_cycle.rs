#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use mipsim::isa::{fields, mnemonic, SYSCALL_EXIT};
use mipsim::{process_instruction, MachineState, Memory, Region, RunFlag};

const TEXT: u32 = 0x0040_0000;
const DATA: u32 = 0x1000_0000;

/// Structured input for single-cycle fuzzing.
#[derive(Arbitrary, Debug)]
struct CycleInput {
    /// Instruction word placed at the PC.
    word: u32,
    /// Initial register file.
    regs: [u32; 32],
    hi: u32,
    lo: u32,
    /// Word offset of the PC inside the text region.
    pc_slot: u8,
}

fn is_control_transfer(op: &str) -> bool {
    matches!(
        op,
        "j" | "jal" | "jr" | "jalr" | "beq" | "bne" | "blez" | "bgtz" | "bltz" | "bgez"
            | "bltzal" | "bgezal"
    )
}

fuzz_target!(|input: CycleInput| {
    let mut mem = Memory::with_regions(vec![
        Region::new(TEXT, 0x400),
        Region::new(DATA, 0x400),
    ]);
    let pc = TEXT + u32::from(input.pc_slot) * 4;
    if mem.store_u32(pc, input.word).is_err() {
        return;
    }

    let mut current = MachineState::with_pc(pc);
    current.set_registers(input.regs);
    current.hi = input.hi;
    current.lo = input.lo;
    let mut next = current;
    let mut run = RunFlag::new();

    let diagnostic = process_instruction(&current, &mut next, &mut mem, &mut run);

    // An unknown instruction changes nothing but the PC
    if let Some(diag) = diagnostic {
        assert_eq!(diag.pc(), pc);
        assert_eq!(diag.word(), input.word);
        let mut expected = current;
        expected.pc = pc.wrapping_add(4);
        assert_eq!(next, expected);
        assert!(run.is_running());
    }

    // Only the exit syscall clears the run flag
    let is_exit = fields::opcode(input.word) == 0
        && fields::funct(input.word) == 0x0C
        && input.regs[2] == SYSCALL_EXIT;
    assert_eq!(run.is_running(), !is_exit);

    // Anything that is not a jump or branch falls through to pc + 4
    if mnemonic(input.word).is_some_and(|op| !is_control_transfer(op)) {
        assert_eq!(next.pc, pc.wrapping_add(4));
    }
});
