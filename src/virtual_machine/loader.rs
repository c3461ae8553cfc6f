//! Reads a code image from disk into a [`Code`] buffer.

use crate::info;
use crate::virtual_machine::code::Code;
use crate::virtual_machine::errors::VMError;
use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::Path;

/// Starting buffer size for [`load`]; doubled whenever it fills up.
pub const INITIAL_CODE_CAPACITY: usize = 256;

/// Loads the whole file at `path` into a code buffer.
///
/// The buffer is read in place and grown with [`Code::grow`] so an oversized
/// image reports [`VMError::AllocationFailed`] instead of aborting.
pub fn load(path: impl AsRef<Path>) -> Result<Code, VMError> {
    let path = path.as_ref();
    let load_err = |e: std::io::Error| VMError::Load {
        path: path.display().to_string(),
        reason: e.to_string(),
    };

    let mut file = File::open(path).map_err(load_err)?;
    let mut code = Code::with_capacity(INITIAL_CODE_CAPACITY)?;
    let mut filled = 0;
    loop {
        if filled == code.len() {
            code.grow(2)?;
        }
        match file.read(&mut code.as_mut_slice()[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(load_err(e)),
        }
    }
    code.truncate(filled);

    info!("loaded {} bytes from {}", code.len(), path.display());
    Ok(code)
}
