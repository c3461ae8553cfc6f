use super::ram::Ram;
use super::registers::Registers;
use super::stack::Stack;

/// Processor state: register file, operand stack, and RAM.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Cpu {
    pub registers: Registers,
    pub stack: Stack,
    pub ram: Ram,
}

impl Cpu {
    /// Creates a CPU with zeroed registers and RAM and an empty stack.
    pub fn new() -> Self {
        Self {
            registers: Registers::new(),
            stack: Stack::new(),
            ram: Ram::new(),
        }
    }

    /// Restores the freshly constructed state.
    pub fn reset(&mut self) {
        self.registers = Registers::new();
        self.stack.clear();
        self.ram.clear();
    }
}
