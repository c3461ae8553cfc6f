use hybrid_vm_derive::Error;

/// Coarse classification of a [`VMError`].
///
/// The process entry point maps each class to its result code; resource faults
/// are fatal to the process rather than reported.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FaultKind {
    /// The image could not be produced.
    Load,
    /// A code buffer could not be allocated or grown.
    Allocation,
    /// Signature or version mismatch; nothing executed.
    Format,
    /// Malformed or out-of-range operand, opcode, or control transfer.
    Decode,
    /// Operand stack or call stack overflow/underflow.
    Resource,
}

/// Errors that can occur while loading, validating, or executing an image.
#[derive(Debug, Error)]
pub enum VMError {
    /// Image file could not be opened or read.
    #[error("cannot load {path}: {reason}")]
    Load { path: String, reason: String },
    /// Code buffer allocation or growth failed.
    #[error("allocation of {requested} bytes failed")]
    AllocationFailed { requested: usize },
    /// Image is shorter than the fixed header.
    #[error("image is {len} bytes, shorter than the {expected}-byte header")]
    TruncatedHeader { len: usize, expected: usize },
    /// Header signature does not identify this format.
    #[error("bad signature {found:#010x}, expected {expected:#010x}")]
    BadSignature { found: u32, expected: u32 },
    /// Header version differs from the one this engine executes.
    #[error("unsupported version {found}, expected {expected}")]
    UnsupportedVersion { found: u8, expected: u8 },
    /// Unknown opcode encountered in bytecode.
    #[error("invalid instruction {opcode:#04x} at offset {offset}")]
    InvalidInstruction { opcode: u8, offset: usize },
    /// Neither the IMM nor the REG bit is set on an instruction that takes an operand.
    #[error("invalid addressing mode in {opcode:#04x} at offset {offset}")]
    InvalidAddressingMode { opcode: u8, offset: usize },
    /// Bytecode ended in the middle of an operand.
    #[error(
        "unexpected end of bytecode at offset {ip}: requested {requested} bytes, {available} available"
    )]
    UnexpectedEndOfBytecode {
        ip: usize,
        requested: usize,
        available: usize,
    },
    /// Register index exceeds the register file size.
    #[error("register index {index} out of bounds (available: {available})")]
    InvalidRegisterIndex { index: u8, available: usize },
    /// RAM-indirect operand does not name a cell.
    #[error("RAM address {address} out of bounds (capacity: {capacity})")]
    RamOutOfBounds { address: f64, capacity: usize },
    /// Jump target lies outside the code image.
    #[error("jump target {target} out of range (code size: {size})")]
    JumpOutOfRange { target: f64, size: usize },
    /// Attempted to store through a literal embedded in the code image.
    #[error("immediate operand at offset {offset} is not writable")]
    ImmediateNotWritable { offset: usize },
    /// Execution ran off the end of the image without HLT.
    #[error("execution reached offset {ip} past the end of the image without HLT")]
    MissingHalt { ip: usize },
    /// Operand stack is full.
    #[error("operand stack overflow (capacity: {capacity})")]
    StackOverflow { capacity: usize },
    /// Pop from an empty operand stack.
    #[error("operand stack underflow")]
    StackUnderflow,
    /// Too many nested CALLs.
    #[error("call stack overflow (depth: {depth})")]
    CallStackOverflow { depth: usize },
    /// RET with no matching CALL.
    #[error("return without call")]
    ReturnWithoutCall,
    /// Host input is not a number.
    #[error("invalid numeric input: {input:?}")]
    InvalidInput { input: String },
    /// Host input/output stream failure.
    #[error("io error: {reason}")]
    Io { reason: String },
}

impl VMError {
    /// Returns the fault class of this error.
    pub const fn kind(&self) -> FaultKind {
        match self {
            VMError::Load { .. } => FaultKind::Load,
            VMError::AllocationFailed { .. } => FaultKind::Allocation,
            VMError::TruncatedHeader { .. }
            | VMError::BadSignature { .. }
            | VMError::UnsupportedVersion { .. } => FaultKind::Format,
            VMError::StackOverflow { .. }
            | VMError::StackUnderflow
            | VMError::CallStackOverflow { .. }
            | VMError::ReturnWithoutCall => FaultKind::Resource,
            VMError::InvalidInstruction { .. }
            | VMError::InvalidAddressingMode { .. }
            | VMError::UnexpectedEndOfBytecode { .. }
            | VMError::InvalidRegisterIndex { .. }
            | VMError::RamOutOfBounds { .. }
            | VMError::JumpOutOfRange { .. }
            | VMError::ImmediateNotWritable { .. }
            | VMError::MissingHalt { .. }
            | VMError::InvalidInput { .. }
            | VMError::Io { .. } => FaultKind::Decode,
        }
    }
}
