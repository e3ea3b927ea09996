//! MIPS instruction set: field extraction, code tables and the three format
//! executors.

pub mod fields;
mod instruction;
mod itype;
mod jtype;
mod rtype;

pub use instruction::{BranchCode, Format, Funct, Opcode};
pub use itype::branch_target;
pub use jtype::jump_target;
pub use rtype::SYSCALL_EXIT;

pub(crate) use itype::execute_itype;
pub(crate) use jtype::execute_jtype;
pub(crate) use rtype::execute_rtype;

/// Assembly mnemonic for an instruction word, or `None` if the core does
/// not implement it.
#[must_use]
pub fn mnemonic(word: u32) -> Option<&'static str> {
    let op = Opcode::from_bits(fields::opcode(word))?;
    match op {
        Opcode::Special => Funct::from_bits(fields::funct(word)).map(Funct::mnemonic),
        Opcode::RegImm => BranchCode::from_bits(fields::rt(word)).map(|code| match code {
            BranchCode::Bltz => "bltz",
            BranchCode::Bgez => "bgez",
            BranchCode::Bltzal => "bltzal",
            BranchCode::Bgezal => "bgezal",
        }),
        _ => Some(op.mnemonic()),
    }
}
