// Allow unwrap and unreadable literals in tests (test code is not production)
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::unreadable_literal))]
//! mipsim: a cycle-level simulator for a MIPS32 integer subset.
//!
//! The core is the per-cycle [`process_instruction`]: it fetches the word at
//! `current.pc`, decodes it, and writes the effects into `next`. The
//! [`Simulator`] driver owns the two snapshots and commits `next` after each
//! cycle.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────┐
//! │      CLI / Shell / Loader           │
//! ├─────────────────────────────────────┤
//! │   Simulator (commit, run flag)      │
//! ├─────────────────────────────────────┤
//! │   Cycle dispatcher (R / I / J)      │
//! ├─────────────────────────────────────┤
//! │   Bus: region-based Memory          │
//! └─────────────────────────────────────┘
//! ```

pub mod config;
pub mod dump;
pub mod error;
pub mod isa;
pub mod loader;
pub mod shell;
pub mod vm;

pub use config::{ConfigError, SimConfig};
pub use error::{AccessType, Diagnostic, MemResult, MemoryFault, SimError};
pub use loader::{load_simulator, LoadError};
pub use vm::{
    process_instruction, Bus, MachineState, Memory, Region, RunFlag, RunSummary, Simulator, Width,
};
