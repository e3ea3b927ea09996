//! Opcode and function-code tables.
//!
//! Numeric codes from the instruction word are mapped onto tagged variants
//! here so the executors can dispatch with an exhaustive `match`.

/// Instruction layout, selected by the opcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// Register-register (opcode 0).
    R,
    /// Register-immediate, loads, stores, branches.
    I,
    /// 26-bit absolute jump.
    J,
}

/// Top-level opcodes implemented by the core, bits [31:26].
#[allow(missing_docs)] // Variants are the ISA mnemonics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Opcode {
    Special = 0x00,
    RegImm = 0x01,
    J = 0x02,
    Jal = 0x03,
    Beq = 0x04,
    Bne = 0x05,
    Blez = 0x06,
    Bgtz = 0x07,
    Addi = 0x08,
    Addiu = 0x09,
    Slti = 0x0A,
    Sltiu = 0x0B,
    Andi = 0x0C,
    Ori = 0x0D,
    Xori = 0x0E,
    Lui = 0x0F,
    Lb = 0x20,
    Lh = 0x21,
    Lw = 0x23,
    Lbu = 0x24,
    Lhu = 0x25,
    Sb = 0x28,
    Sh = 0x29,
    Sw = 0x2B,
}

impl Opcode {
    /// Map a 6-bit opcode field onto a variant.
    #[must_use]
    pub fn from_bits(bits: u8) -> Option<Self> {
        let op = match bits {
            0x00 => Opcode::Special,
            0x01 => Opcode::RegImm,
            0x02 => Opcode::J,
            0x03 => Opcode::Jal,
            0x04 => Opcode::Beq,
            0x05 => Opcode::Bne,
            0x06 => Opcode::Blez,
            0x07 => Opcode::Bgtz,
            0x08 => Opcode::Addi,
            0x09 => Opcode::Addiu,
            0x0A => Opcode::Slti,
            0x0B => Opcode::Sltiu,
            0x0C => Opcode::Andi,
            0x0D => Opcode::Ori,
            0x0E => Opcode::Xori,
            0x0F => Opcode::Lui,
            0x20 => Opcode::Lb,
            0x21 => Opcode::Lh,
            0x23 => Opcode::Lw,
            0x24 => Opcode::Lbu,
            0x25 => Opcode::Lhu,
            0x28 => Opcode::Sb,
            0x29 => Opcode::Sh,
            0x2B => Opcode::Sw,
            _ => return None,
        };
        Some(op)
    }

    /// Which executor handles this opcode.
    #[must_use]
    pub fn format(self) -> Format {
        match self {
            Opcode::Special => Format::R,
            Opcode::J | Opcode::Jal => Format::J,
            _ => Format::I,
        }
    }

    /// Assembly mnemonic (`"special"`/`"regimm"` for the sub-dispatched groups).
    #[must_use]
    pub fn mnemonic(self) -> &'static str {
        match self {
            Opcode::Special => "special",
            Opcode::RegImm => "regimm",
            Opcode::J => "j",
            Opcode::Jal => "jal",
            Opcode::Beq => "beq",
            Opcode::Bne => "bne",
            Opcode::Blez => "blez",
            Opcode::Bgtz => "bgtz",
            Opcode::Addi => "addi",
            Opcode::Addiu => "addiu",
            Opcode::Slti => "slti",
            Opcode::Sltiu => "sltiu",
            Opcode::Andi => "andi",
            Opcode::Ori => "ori",
            Opcode::Xori => "xori",
            Opcode::Lui => "lui",
            Opcode::Lb => "lb",
            Opcode::Lh => "lh",
            Opcode::Lw => "lw",
            Opcode::Lbu => "lbu",
            Opcode::Lhu => "lhu",
            Opcode::Sb => "sb",
            Opcode::Sh => "sh",
            Opcode::Sw => "sw",
        }
    }
}

/// R-format function codes implemented by the core, bits [5:0].
#[allow(missing_docs)] // Variants are the ISA mnemonics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Funct {
    Sll = 0x00,
    Srl = 0x02,
    Sra = 0x03,
    Sllv = 0x04,
    Srlv = 0x06,
    Srav = 0x07,
    Jr = 0x08,
    Jalr = 0x09,
    Syscall = 0x0C,
    Mfhi = 0x10,
    Mthi = 0x11,
    Mflo = 0x12,
    Mtlo = 0x13,
    Mult = 0x18,
    Multu = 0x19,
    Div = 0x1A,
    Divu = 0x1B,
    Add = 0x20,
    Addu = 0x21,
    Sub = 0x22,
    Subu = 0x23,
}

impl Funct {
    /// Map a 6-bit function field onto a variant.
    #[must_use]
    pub fn from_bits(bits: u8) -> Option<Self> {
        let funct = match bits {
            0x00 => Funct::Sll,
            0x02 => Funct::Srl,
            0x03 => Funct::Sra,
            0x04 => Funct::Sllv,
            0x06 => Funct::Srlv,
            0x07 => Funct::Srav,
            0x08 => Funct::Jr,
            0x09 => Funct::Jalr,
            0x0C => Funct::Syscall,
            0x10 => Funct::Mfhi,
            0x11 => Funct::Mthi,
            0x12 => Funct::Mflo,
            0x13 => Funct::Mtlo,
            0x18 => Funct::Mult,
            0x19 => Funct::Multu,
            0x1A => Funct::Div,
            0x1B => Funct::Divu,
            0x20 => Funct::Add,
            0x21 => Funct::Addu,
            0x22 => Funct::Sub,
            0x23 => Funct::Subu,
            _ => return None,
        };
        Some(funct)
    }

    /// Assembly mnemonic.
    #[must_use]
    pub fn mnemonic(self) -> &'static str {
        match self {
            Funct::Sll => "sll",
            Funct::Srl => "srl",
            Funct::Sra => "sra",
            Funct::Sllv => "sllv",
            Funct::Srlv => "srlv",
            Funct::Srav => "srav",
            Funct::Jr => "jr",
            Funct::Jalr => "jalr",
            Funct::Syscall => "syscall",
            Funct::Mfhi => "mfhi",
            Funct::Mthi => "mthi",
            Funct::Mflo => "mflo",
            Funct::Mtlo => "mtlo",
            Funct::Mult => "mult",
            Funct::Multu => "multu",
            Funct::Div => "div",
            Funct::Divu => "divu",
            Funct::Add => "add",
            Funct::Addu => "addu",
            Funct::Sub => "sub",
            Funct::Subu => "subu",
        }
    }
}

/// Branch-on-sign family under opcode 0x01, selected by the rt field.
#[allow(missing_docs)] // Variants are the ISA mnemonics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum BranchCode {
    Bltz = 0x00,
    Bgez = 0x01,
    Bltzal = 0x10,
    Bgezal = 0x11,
}

impl BranchCode {
    /// Map a 5-bit rt field onto a variant.
    #[must_use]
    pub fn from_bits(bits: u8) -> Option<Self> {
        match bits {
            0x00 => Some(BranchCode::Bltz),
            0x01 => Some(BranchCode::Bgez),
            0x10 => Some(BranchCode::Bltzal),
            0x11 => Some(BranchCode::Bgezal),
            _ => None,
        }
    }

    /// Whether the branch writes the link register when taken.
    #[must_use]
    pub fn links(self) -> bool {
        matches!(self, BranchCode::Bltzal | BranchCode::Bgezal)
    }

    /// Whether the branch is taken for a signed `rs` value.
    #[must_use]
    pub fn taken(self, rs: i32) -> bool {
        match self {
            BranchCode::Bltz | BranchCode::Bltzal => rs < 0,
            BranchCode::Bgez | BranchCode::Bgezal => rs >= 0,
        }
    }
}
