use crate::virtual_machine::errors::VMError;

/// Maximum number of values on the operand stack.
pub const STACK_CAPACITY: usize = 4096;

/// Bounded LIFO of `f64` operands.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Stack {
    values: Vec<f64>,
}

impl Stack {
    pub fn new() -> Self {
        Self { values: Vec::new() }
    }

    /// Pushes a value, failing with [`VMError::StackOverflow`] when full.
    pub fn push(&mut self, value: f64) -> Result<(), VMError> {
        if self.values.len() >= STACK_CAPACITY {
            return Err(VMError::StackOverflow {
                capacity: STACK_CAPACITY,
            });
        }
        self.values.push(value);
        Ok(())
    }

    /// Pops the top value, failing with [`VMError::StackUnderflow`] when empty.
    pub fn pop(&mut self) -> Result<f64, VMError> {
        self.values.pop().ok_or(VMError::StackUnderflow)
    }

    /// Returns the top value without removing it.
    pub fn peek(&self) -> Result<f64, VMError> {
        self.values.last().copied().ok_or(VMError::StackUnderflow)
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Returns the stack contents, bottom first.
    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }
}
