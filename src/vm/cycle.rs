//! Per-cycle dispatch: fetch, route to a format executor, resolve the PC.

use tracing::{trace, warn};

use crate::error::Diagnostic;
use crate::isa::{self, fields, Format, Opcode};
use crate::vm::{Bus, MachineState};

/// How the program counter moves after an instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Continue with the next sequential instruction (PC + 4).
    Fallthrough,
    /// Transfer control to an absolute address.
    Jump(u32),
}

/// Process-wide run/halt flag.
///
/// The core only ever clears it (via the exit syscall); the driver checks it
/// between cycles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunFlag(bool);

impl RunFlag {
    /// A flag in the running state.
    #[must_use]
    pub fn new() -> Self {
        RunFlag(true)
    }

    /// Whether simulation may continue.
    #[inline]
    #[must_use]
    pub fn is_running(self) -> bool {
        self.0
    }

    /// Stop simulation after the current cycle.
    #[inline]
    pub fn halt(&mut self) {
        self.0 = false;
    }
}

impl Default for RunFlag {
    fn default() -> Self {
        Self::new()
    }
}

/// Execute the instruction at `current.pc`.
///
/// All reads come from `current`, all register/PC/HI/LO writes go to `next`.
/// `next` is expected to equal `current` on entry; the caller commits it
/// afterwards. The executors only *report* control transfers, so this is the
/// sole writer of `next.pc` and a jump target can never be overwritten by the
/// sequential PC + 4.
///
/// Unknown encodings are not fatal: the cycle behaves as a no-op, the event
/// is logged and returned.
pub fn process_instruction<B: Bus + ?Sized>(
    current: &MachineState,
    next: &mut MachineState,
    bus: &mut B,
    run: &mut RunFlag,
) -> Option<Diagnostic> {
    let word = bus.fetch32(current.pc);
    trace!(
        pc = format_args!("{:#010x}", current.pc),
        word = format_args!("{word:#010x}"),
        op = isa::mnemonic(word).unwrap_or("?"),
        "fetch"
    );

    let result = match Opcode::from_bits(fields::opcode(word)) {
        Some(op) => match op.format() {
            Format::R => isa::execute_rtype(word, current, next, run),
            Format::J => Ok(isa::execute_jtype(word, current, next, op == Opcode::Jal)),
            Format::I => isa::execute_itype(word, current, next, bus),
        },
        None => Err(Diagnostic::UnknownOpcode {
            pc: current.pc,
            word,
            opcode: fields::opcode(word),
        }),
    };

    let (flow, diagnostic) = match result {
        Ok(flow) => (flow, None),
        Err(diagnostic) => {
            warn!("{diagnostic}");
            (Flow::Fallthrough, Some(diagnostic))
        }
    };

    next.pc = match flow {
        Flow::Fallthrough => current.pc.wrapping_add(4),
        Flow::Jump(target) => target,
    };

    diagnostic
}
