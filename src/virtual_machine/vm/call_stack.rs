use crate::virtual_machine::errors::VMError;

/// Maximum nesting depth of `CALL`.
pub const CALL_STACK_CAPACITY: usize = 1024;

/// Saved return point of a `CALL`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) struct CallFrame {
    /// Last byte of the `CALL` encoding; the next fetch follows it.
    pub(super) return_ip: usize,
}

/// Bounded stack of [`CallFrame`]s.
#[derive(Debug, Default)]
pub(super) struct CallStack {
    frames: Vec<CallFrame>,
}

impl CallStack {
    pub(super) fn push(&mut self, frame: CallFrame) -> Result<(), VMError> {
        if self.frames.len() >= CALL_STACK_CAPACITY {
            return Err(VMError::CallStackOverflow {
                depth: self.frames.len(),
            });
        }
        self.frames.push(frame);
        Ok(())
    }

    pub(super) fn pop(&mut self) -> Result<CallFrame, VMError> {
        self.frames.pop().ok_or(VMError::ReturnWithoutCall)
    }

    pub(super) fn depth(&self) -> usize {
        self.frames.len()
    }
}
