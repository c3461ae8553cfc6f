use crate::virtual_machine::errors::VMError;
use crate::virtual_machine::isa::{IMM, RAM, REG};

const REG_IMM: u8 = REG | IMM;

/// Size in bytes of an encoded `f64` literal.
pub const LITERAL_SIZE: usize = size_of::<f64>();
/// Size in bytes of an encoded register index.
pub const REGISTER_INDEX_SIZE: usize = 1;

/// How an operand's base value is located, selected by the IMM/REG bits.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum AddrMode {
    /// Register index byte.
    Reg,
    /// Literal `f64` embedded in the code.
    Imm,
    /// Register index byte followed by a literal; value is their sum.
    RegImm,
}

impl AddrMode {
    /// Returns the number of operand bytes following the opcode byte.
    pub const fn size(&self) -> usize {
        match self {
            AddrMode::Reg => REGISTER_INDEX_SIZE,
            AddrMode::Imm => LITERAL_SIZE,
            AddrMode::RegImm => REGISTER_INDEX_SIZE + LITERAL_SIZE,
        }
    }

    /// Returns a human-readable mode name for diagnostics.
    pub const fn name(&self) -> &'static str {
        match self {
            AddrMode::Reg => "Register",
            AddrMode::Imm => "Immediate",
            AddrMode::RegImm => "Register+Immediate",
        }
    }
}

impl TryFrom<u8> for AddrMode {
    type Error = VMError;

    /// Decodes the addressing mode from a full opcode byte.
    fn try_from(opcode: u8) -> Result<Self, Self::Error> {
        match opcode & REG_IMM {
            REG_IMM => Ok(Self::RegImm),
            IMM => Ok(Self::Imm),
            REG => Ok(Self::Reg),
            _ => Err(VMError::InvalidAddressingMode { opcode, offset: 0 }),
        }
    }
}

/// Returns true if the opcode byte asks for RAM-indirect resolution.
pub const fn is_ram_indirect(opcode: u8) -> bool {
    opcode & RAM != 0
}

/// A resolved operand: where the instruction reads or writes its value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Location {
    /// Register slot.
    Register(u8),
    /// RAM cell.
    Ram(usize),
    /// Literal at this byte offset of the code image (read-only).
    Immediate(usize),
}
