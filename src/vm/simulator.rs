//! Simulator driver: owns the current/next snapshot pair and commits once per
//! cycle.

use serde::Serialize;
use tracing::info;

use crate::error::{Diagnostic, SimError};
use crate::vm::{process_instruction, Bus, MachineState, Memory, RunFlag};

/// Diagnostics kept per request; later ones are only counted.
pub const MAX_DIAGNOSTICS: usize = 64;

/// Outcome of a `run` or `go` request.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct RunSummary {
    /// Cycles executed by this request.
    pub cycles: u64,
    /// Whether the run flag was cleared when the request returned.
    pub halted: bool,
    /// The first [`MAX_DIAGNOSTICS`] unknown-instruction events, in order.
    pub diagnostics: Vec<Diagnostic>,
    /// Total unknown-instruction events, including those not kept.
    pub diagnostic_count: u64,
}

/// A single-core simulator.
#[derive(Debug, Clone)]
pub struct Simulator<B: Bus = Memory> {
    current: MachineState,
    next: MachineState,
    bus: B,
    run: RunFlag,
    instruction_count: u64,
}

impl<B: Bus> Simulator<B> {
    /// Create a simulator with zeroed registers, starting at `entry`.
    #[must_use]
    pub fn new(bus: B, entry: u32) -> Self {
        Self::with_state(bus, MachineState::with_pc(entry))
    }

    /// Create a simulator from an initial snapshot.
    #[must_use]
    pub fn with_state(bus: B, state: MachineState) -> Self {
        Simulator {
            current: state,
            next: state,
            bus,
            run: RunFlag::new(),
            instruction_count: 0,
        }
    }

    /// Execute one instruction and commit its effects.
    ///
    /// Runs regardless of the run flag; use [`Simulator::run`] for the
    /// halting-aware loop.
    pub fn cycle(&mut self) -> Option<Diagnostic> {
        let diagnostic =
            process_instruction(&self.current, &mut self.next, &mut self.bus, &mut self.run);
        self.current = self.next;
        self.instruction_count += 1;
        diagnostic
    }

    /// Execute up to `cycles` instructions, stopping early on halt.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Halted`] if the simulator is already halted.
    pub fn run(&mut self, cycles: u64) -> Result<RunSummary, SimError> {
        self.run_until(Some(cycles))
    }

    /// Execute until the program halts, or until `limit` cycles if given.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Halted`] if the simulator is already halted.
    pub fn go(&mut self, limit: Option<u64>) -> Result<RunSummary, SimError> {
        self.run_until(limit)
    }

    fn run_until(&mut self, limit: Option<u64>) -> Result<RunSummary, SimError> {
        if !self.run.is_running() {
            return Err(SimError::Halted);
        }

        let mut summary = RunSummary::default();
        while self.run.is_running() && limit.is_none_or(|limit| summary.cycles < limit) {
            if let Some(diagnostic) = self.cycle() {
                if summary.diagnostics.len() < MAX_DIAGNOSTICS {
                    summary.diagnostics.push(diagnostic);
                }
                summary.diagnostic_count += 1;
            }
            summary.cycles += 1;
        }
        summary.halted = !self.run.is_running();

        info!(
            cycles = summary.cycles,
            halted = summary.halted,
            diagnostics = summary.diagnostic_count,
            pc = format_args!("{:#010x}", self.current.pc),
            "run finished"
        );
        Ok(summary)
    }

    /// Committed machine state.
    #[must_use]
    pub fn state(&self) -> &MachineState {
        &self.current
    }

    /// Set a general-purpose register in both snapshots.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::InvalidRegister`] for indices of 32 and above.
    pub fn set_register(&mut self, index: u32, value: u32) -> Result<(), SimError> {
        let reg = u8::try_from(index)
            .ok()
            .filter(|&reg| reg < 32)
            .ok_or(SimError::InvalidRegister(index))?;
        self.current.set_reg(reg, value);
        self.next.set_reg(reg, value);
        Ok(())
    }

    /// Set HI in both snapshots.
    pub fn set_hi(&mut self, value: u32) {
        self.current.hi = value;
        self.next.hi = value;
    }

    /// Set LO in both snapshots.
    pub fn set_lo(&mut self, value: u32) {
        self.current.lo = value;
        self.next.lo = value;
    }

    /// Set the PC in both snapshots.
    pub fn set_pc(&mut self, pc: u32) {
        self.current.pc = pc;
        self.next.pc = pc;
    }

    /// The memory bus.
    #[must_use]
    pub fn bus(&self) -> &B {
        &self.bus
    }

    /// Mutable access to the memory bus (for loading and poking).
    pub fn bus_mut(&mut self) -> &mut B {
        &mut self.bus
    }

    /// Whether the run flag is still set.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.run.is_running()
    }

    /// Total instructions executed since creation.
    #[must_use]
    pub fn instruction_count(&self) -> u64 {
        self.instruction_count
    }
}
