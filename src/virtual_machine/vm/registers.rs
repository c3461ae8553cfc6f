use crate::virtual_machine::errors::VMError;

/// Number of general-purpose registers.
pub const NUM_REGS: usize = 16;

/// Register the operand resolver overwrites with `register + literal` sums.
///
/// Programs may read it, but any `REG|IMM` operand clobbers it, so it never
/// holds a value across instructions.
pub const SCRATCH_REGISTER: u8 = 0;

/// Register file of [`NUM_REGS`] `f64` slots, all starting at zero.
#[derive(Clone, Debug, PartialEq)]
pub struct Registers {
    regs: [f64; NUM_REGS],
}

impl Default for Registers {
    fn default() -> Self {
        Self::new()
    }
}

impl Registers {
    pub const fn new() -> Self {
        Self {
            regs: [0.0; NUM_REGS],
        }
    }

    /// Checks that `idx` names a register.
    ///
    /// Returns [`VMError::InvalidRegisterIndex`] if `idx` is out of bounds.
    pub fn check(idx: u8) -> Result<u8, VMError> {
        if (idx as usize) < NUM_REGS {
            Ok(idx)
        } else {
            Err(VMError::InvalidRegisterIndex {
                index: idx,
                available: NUM_REGS,
            })
        }
    }

    /// Returns the value in register `idx`.
    pub fn get(&self, idx: u8) -> Result<f64, VMError> {
        Ok(self.regs[Self::check(idx)? as usize])
    }

    /// Stores a value into register `idx`.
    pub fn set(&mut self, idx: u8, v: f64) -> Result<(), VMError> {
        self.regs[Self::check(idx)? as usize] = v;
        Ok(())
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.regs
    }
}
