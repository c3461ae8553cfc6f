//! Process-level entry point: load an image, run it, report a result code.

use crate::virtual_machine::errors::{FaultKind, VMError};
use crate::virtual_machine::io::Io;
use crate::virtual_machine::loader;
use crate::virtual_machine::vm::VM;
use crate::{error, info};
use std::path::Path;

/// Outcome of [`process`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ExecRes {
    /// The program halted normally.
    Ok,
    /// The image could not be read.
    FileNotFound,
    /// The image has a bad header or contains an invalid instruction stream.
    NotValidFmt,
}

impl ExecRes {
    /// Returns the process exit status for this result.
    pub const fn exit_code(&self) -> u8 {
        match self {
            ExecRes::Ok => 0,
            ExecRes::FileNotFound => 2,
            ExecRes::NotValidFmt => 3,
        }
    }
}

/// Loads the image at `path` and runs it to completion.
pub fn execute<I: Io>(path: impl AsRef<Path>, io: &mut I) -> Result<(), VMError> {
    let path = path.as_ref();
    let code = loader::load(path)?;
    let mut vm = VM::new(code);
    vm.run(io)?;
    info!("{} halted at offset {}", path.display(), vm.ip());
    Ok(())
}

/// Loads and runs the image at `path`, mapping failures to an [`ExecRes`].
///
/// Stack and call-stack faults are unrecoverable: the diagnostic is written to
/// stderr and the process aborts.
pub fn process<I: Io>(path: impl AsRef<Path>, io: &mut I) -> ExecRes {
    let path = path.as_ref();
    let Err(e) = execute(path, io) else {
        return ExecRes::Ok;
    };

    match e.kind() {
        FaultKind::Load | FaultKind::Allocation => {
            error!("{e}");
            ExecRes::FileNotFound
        }
        FaultKind::Format | FaultKind::Decode => {
            error!("{}: {e}", path.display());
            ExecRes::NotValidFmt
        }
        FaultKind::Resource => {
            error!("fatal: {}: {e}", path.display());
            std::process::abort()
        }
    }
}
