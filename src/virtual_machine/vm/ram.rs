use crate::virtual_machine::errors::VMError;
use std::ops::{Index, IndexMut};

/// Number of RAM cells.
pub const RAM_SIZE: usize = 1024;

/// Flat `f64` memory addressed by cell index.
///
/// Indexing (`[]`) panics on an out-of-range cell; the engine only indexes
/// with addresses produced by [`Ram::address`].
#[derive(Clone, Debug, PartialEq)]
pub struct Ram {
    cells: Vec<f64>,
}

impl Default for Ram {
    fn default() -> Self {
        Self::new()
    }
}

impl Ram {
    pub fn new() -> Self {
        Self {
            cells: vec![0.0; RAM_SIZE],
        }
    }

    /// Converts an operand value into a cell index.
    ///
    /// The value must be finite and non-negative, and its integer part must be
    /// below [`RAM_SIZE`]. Fractions are truncated toward zero.
    pub fn address(value: f64) -> Result<usize, VMError> {
        if value.is_finite() && value >= 0.0 && value.trunc() < RAM_SIZE as f64 {
            Ok(value as usize)
        } else {
            Err(VMError::RamOutOfBounds {
                address: value,
                capacity: RAM_SIZE,
            })
        }
    }

    /// Zeroes every cell.
    pub fn clear(&mut self) {
        self.cells.fill(0.0);
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.cells
    }
}

impl Index<usize> for Ram {
    type Output = f64;

    fn index(&self, index: usize) -> &Self::Output {
        &self.cells[index]
    }
}

impl IndexMut<usize> for Ram {
    fn index_mut(&mut self, index: usize) -> &mut Self::Output {
        &mut self.cells[index]
    }
}
