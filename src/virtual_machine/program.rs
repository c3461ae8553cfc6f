//! Code image header.
//!
//! Every image starts with a fixed 5-byte header: a little-endian `u32`
//! signature followed by a one-byte format version. Instruction bytes begin
//! at [`HEADER_SIZE`], and jump targets are offsets relative to that point.

use crate::virtual_machine::code::Code;
use crate::virtual_machine::errors::VMError;

/// Magic value identifying a code image (`"HYVM"` read as little-endian).
pub const SIGNATURE: u32 = u32::from_le_bytes(*b"HYVM");

/// Current image format version.
pub const VERSION: u8 = 3;

/// Size in bytes of the image header.
pub const HEADER_SIZE: usize = size_of::<u32>() + size_of::<u8>();

/// Returns the header bytes this engine accepts.
pub const fn header_bytes() -> [u8; HEADER_SIZE] {
    let sig = SIGNATURE.to_le_bytes();
    [sig[0], sig[1], sig[2], sig[3], VERSION]
}

/// Checks the image header.
///
/// Fails if the image is shorter than the header, if the signature differs,
/// or if the version differs. A header-only image is valid; executing it
/// fails later with [`VMError::MissingHalt`].
pub fn validate(code: &Code) -> Result<(), VMError> {
    let bytes = code.as_slice();
    let header: &[u8; HEADER_SIZE] = bytes
        .get(..HEADER_SIZE)
        .and_then(|h| h.try_into().ok())
        .ok_or(VMError::TruncatedHeader {
            len: bytes.len(),
            expected: HEADER_SIZE,
        })?;

    let found = u32::from_le_bytes([header[0], header[1], header[2], header[3]]);
    if found != SIGNATURE {
        return Err(VMError::BadSignature {
            found,
            expected: SIGNATURE,
        });
    }

    let version = header[HEADER_SIZE - 1];
    if version != VERSION {
        return Err(VMError::UnsupportedVersion {
            found: version,
            expected: VERSION,
        });
    }
    Ok(())
}
