//! Growable byte buffer holding a code image.
//!
//! A [`Code`] owns the header followed by the instruction stream. All reads go
//! through bounds-checked accessors; the engine never reinterprets raw
//! pointers.

use crate::virtual_machine::errors::VMError;
use crate::virtual_machine::operand::LITERAL_SIZE;

/// Code image buffer.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Code {
    bytes: Vec<u8>,
}

impl Code {
    /// Allocates a zero-initialized buffer of `capacity` bytes.
    ///
    /// Returns [`VMError::AllocationFailed`] instead of aborting when the
    /// allocator refuses the request.
    pub fn with_capacity(capacity: usize) -> Result<Self, VMError> {
        let mut bytes = Vec::new();
        bytes
            .try_reserve_exact(capacity)
            .map_err(|_| VMError::AllocationFailed {
                requested: capacity,
            })?;
        bytes.resize(capacity, 0);
        Ok(Self { bytes })
    }

    /// Wraps an existing byte vector.
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    /// Resizes the buffer to `len() * multiplier` bytes, keeping its content.
    ///
    /// New bytes are zeroed. On failure the buffer is left untouched.
    pub fn grow(&mut self, multiplier: usize) -> Result<(), VMError> {
        let new_len = self
            .bytes
            .len()
            .checked_mul(multiplier)
            .filter(|&n| n >= self.bytes.len())
            .ok_or(VMError::AllocationFailed {
                requested: self.bytes.len().saturating_mul(multiplier),
            })?;
        self.bytes
            .try_reserve_exact(new_len - self.bytes.len())
            .map_err(|_| VMError::AllocationFailed { requested: new_len })?;
        self.bytes.resize(new_len, 0);
        Ok(())
    }

    /// Frees the storage and resets the size to zero. Calling it again is a no-op.
    pub fn release(&mut self) {
        self.bytes = Vec::new();
    }

    /// Shortens the buffer to `len` bytes. Has no effect if `len >= self.len()`.
    pub fn truncate(&mut self, len: usize) {
        self.bytes.truncate(len);
    }

    /// Returns the logical size in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Returns true if the buffer holds no bytes.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Returns the byte at `offset`, if in bounds.
    pub fn byte_at(&self, offset: usize) -> Option<u8> {
        self.bytes.get(offset).copied()
    }

    /// Returns the little-endian `f64` starting at `offset`, if all 8 bytes are in bounds.
    pub fn f64_at(&self, offset: usize) -> Option<f64> {
        let end = offset.checked_add(LITERAL_SIZE)?;
        let bytes: [u8; LITERAL_SIZE] = self.bytes.get(offset..end)?.try_into().ok()?;
        Some(f64::from_le_bytes(bytes))
    }

    /// Returns the buffer contents as a byte slice.
    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }

    /// Returns the buffer contents as a mutable byte slice.
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.bytes
    }
}

impl From<Vec<u8>> for Code {
    fn from(bytes: Vec<u8>) -> Self {
        Self::from_bytes(bytes)
    }
}

impl From<&[u8]> for Code {
    fn from(bytes: &[u8]) -> Self {
        Self::from_bytes(bytes.to_vec())
    }
}
