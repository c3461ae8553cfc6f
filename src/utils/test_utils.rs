//! Test utilities for building code images.

use crate::virtual_machine::code::Code;
use crate::virtual_machine::isa::{IMM, Instruction, RAM, REG};
use crate::virtual_machine::operand::LITERAL_SIZE;
use crate::virtual_machine::program::{HEADER_SIZE, header_bytes};

/// Emits a header followed by instructions, tracking offsets so tests never
/// count bytes by hand.
///
/// ```ignore
/// let mut b = ImageBuilder::new();
/// b.imm(Instruction::Jmp, 0.0);
/// let skip = b.literal_slot();
/// b.imm(Instruction::Push, 1.0);
/// b.patch(skip, b.here());
/// b.op(Instruction::Halt);
/// ```
#[derive(Clone, Debug)]
pub struct ImageBuilder {
    bytes: Vec<u8>,
    last_opcode: Option<usize>,
    last_literal: Option<usize>,
}

impl Default for ImageBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageBuilder {
    /// Starts an image with a valid header.
    pub fn new() -> Self {
        Self::with_header(&header_bytes())
    }

    /// Starts an image with arbitrary header bytes.
    pub fn with_header(header: &[u8]) -> Self {
        Self {
            bytes: header.to_vec(),
            last_opcode: None,
            last_literal: None,
        }
    }

    fn opcode(&mut self, byte: u8) -> &mut Self {
        self.last_opcode = Some(self.bytes.len());
        self.bytes.push(byte);
        self
    }

    fn literal(&mut self, value: f64) -> &mut Self {
        self.last_literal = Some(self.bytes.len());
        self.bytes.extend_from_slice(&value.to_le_bytes());
        self
    }

    /// Emits an instruction with no operand.
    pub fn op(&mut self, instr: Instruction) -> &mut Self {
        self.opcode(instr as u8)
    }

    /// Emits an instruction with a literal operand.
    pub fn imm(&mut self, instr: Instruction, value: f64) -> &mut Self {
        self.opcode(instr as u8 | IMM).literal(value)
    }

    /// Emits an instruction with a register operand.
    pub fn reg(&mut self, instr: Instruction, index: u8) -> &mut Self {
        self.opcode(instr as u8 | REG).byte(index)
    }

    /// Emits an instruction with a register-plus-literal operand.
    pub fn reg_imm(&mut self, instr: Instruction, index: u8, value: f64) -> &mut Self {
        self.opcode(instr as u8 | REG | IMM).byte(index).literal(value)
    }

    /// Sets the RAM bit on the most recent opcode.
    pub fn ram(&mut self) -> &mut Self {
        if let Some(at) = self.last_opcode {
            self.bytes[at] |= RAM;
        }
        self
    }

    /// Appends a raw byte.
    pub fn byte(&mut self, byte: u8) -> &mut Self {
        self.bytes.push(byte);
        self
    }

    /// Returns the jump target that lands on the next emitted byte.
    pub fn here(&self) -> f64 {
        (self.bytes.len() - HEADER_SIZE) as f64
    }

    /// Returns the absolute offset of the next emitted byte.
    pub fn offset(&self) -> usize {
        self.bytes.len()
    }

    /// Returns the offset of the most recent literal, for later [`patch`](Self::patch).
    pub fn literal_slot(&self) -> usize {
        self.last_literal
            .expect("literal_slot called before any literal was emitted")
    }

    /// Overwrites the literal at `slot`.
    pub fn patch(&mut self, slot: usize, value: f64) -> &mut Self {
        self.bytes[slot..slot + LITERAL_SIZE].copy_from_slice(&value.to_le_bytes());
        self
    }

    pub fn build(&self) -> Code {
        Code::from_bytes(self.bytes.clone())
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_operands_after_header() {
        let mut b = ImageBuilder::new();
        b.reg_imm(Instruction::Push, 2, 1.0).ram();
        let bytes = b.into_bytes();

        assert_eq!(&bytes[..HEADER_SIZE], &header_bytes());
        assert_eq!(bytes[HEADER_SIZE], Instruction::Push as u8 | REG | IMM | RAM);
        assert_eq!(bytes[HEADER_SIZE + 1], 2);
        assert_eq!(&bytes[HEADER_SIZE + 2..], &1.0f64.to_le_bytes());
    }

    #[test]
    fn patch_rewrites_forward_target() {
        let mut b = ImageBuilder::new();
        b.imm(Instruction::Jmp, 0.0);
        let slot = b.literal_slot();
        b.op(Instruction::Halt);
        let target = b.here();
        b.patch(slot, target);

        let code = b.build();
        assert_eq!(code.f64_at(slot), Some(10.0));
    }
}
