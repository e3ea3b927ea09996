//! Benchmarks for the MIPS cycle loop.

#![allow(missing_docs)] // Benchmark macros generate undocumented functions
#![allow(clippy::unreadable_literal)] // Instruction encodings are standard hex

use std::hint::black_box;

use criterion::{Criterion, criterion_group, criterion_main};
use mipsim::isa::{fields, mnemonic};
use mipsim::{MachineState, Memory, Region, RunFlag, Simulator, process_instruction};

const TEXT: u32 = 0x0040_0000;
const TEXT_SIZE: u32 = 0x0001_0000;

fn filled_memory(word: u32) -> Memory {
    let mut mem = Memory::with_regions(vec![Region::new(TEXT, TEXT_SIZE)]);
    for offset in (0..TEXT_SIZE).step_by(4) {
        let _ = mem.store_u32(TEXT + offset, word);
    }
    mem
}

fn bench_cycle(c: &mut Criterion) {
    // addiu $t0, $t0, 1
    let mut sim = Simulator::new(filled_memory(0x25080001), TEXT);

    c.bench_function("cycle_addiu", |b| {
        b.iter(|| {
            sim.set_pc(TEXT);
            for _ in 0..1000 {
                let _ = black_box(sim.cycle());
            }
        });
    });
}

fn bench_process_instruction(c: &mut Criterion) {
    // add $v1, $at, $v0
    let mut mem = filled_memory(0x00221820);
    let current = MachineState::with_pc(TEXT);

    c.bench_function("process_instruction_add", |b| {
        b.iter(|| {
            let mut next = current;
            let mut run = RunFlag::new();
            black_box(process_instruction(&current, &mut next, &mut mem, &mut run))
        });
    });
}

fn bench_run_loop(c: &mut Criterion) {
    // Count $t0 down from 10_000:
    //   addiu $t0, $zero, 10000
    //   addiu $t0, $t0, -1
    //   bne   $t0, $zero, -2
    //   addiu $v0, $zero, 10
    //   syscall
    let program = [0x24082710u32, 0x2508FFFF, 0x1500FFFE, 0x2402000A, 0x0000000C];
    let mut mem = Memory::with_regions(vec![Region::new(TEXT, 0x100)]);
    for (addr, word) in (TEXT..).step_by(4).zip(program) {
        let _ = mem.store_u32(addr, word);
    }

    c.bench_function("go_countdown_10k", |b| {
        b.iter(|| {
            let mut sim = Simulator::new(mem.clone(), TEXT);
            black_box(sim.go(None))
        });
    });
}

fn bench_decode(c: &mut Criterion) {
    let words = [
        0x00221820u32, // add
        0x2085FFFF,    // addi
        0x10220004,    // beq
        0x0C100004,    // jal
        0x04110003,    // bgezal
    ];

    c.bench_function("decode_fields", |b| {
        b.iter(|| {
            for &word in &words {
                black_box((
                    fields::opcode(word),
                    fields::rs(word),
                    fields::rt(word),
                    fields::imm_signed(word),
                ));
            }
        });
    });

    c.bench_function("mnemonic", |b| {
        b.iter(|| {
            for &word in &words {
                black_box(mnemonic(word));
            }
        });
    });
}

criterion_group!(
    benches,
    bench_cycle,
    bench_process_instruction,
    bench_run_loop,
    bench_decode
);
criterion_main!(benches);
