//! Virtual machine components: state snapshots, memory, and the cycle loop.

pub mod cpu;
mod cycle;
pub mod memory;
mod simulator;

pub use cpu::MachineState;
pub use cycle::{process_instruction, Flow, RunFlag};
pub use memory::{Bus, Memory, Region, Width};
pub use simulator::{RunSummary, Simulator, MAX_DIAGNOSTICS};
