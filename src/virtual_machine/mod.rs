//! Register/stack hybrid bytecode virtual machine.
//!
//! # Architecture
//!
//! - **Registers**: 16 `f64` registers; `r0` doubles as the scratch register
//!   for `register + literal` operands
//! - **Operand stack**: bounded `f64` stack used by arithmetic and branches
//! - **RAM**: 1024 `f64` cells reachable through RAM-indirect operands
//! - **Instruction format**: one opcode byte whose high bits select how the
//!   optional operand is encoded
//! - **Execution model**: fetch/decode/dispatch from the first byte after the
//!   header until `HLT`
//!
//! # Modules
//!
//! - [`code`]: Growable code buffer with bounds-checked accessors
//! - [`compare`]: Epsilon comparison used by conditional jumps
//! - [`errors`]: Error type and fault classification
//! - [`io`]: Host I/O seam for `IN`/`OUT`
//! - [`isa`]: Instruction set definition and opcode mappings
//! - [`loader`]: Reads images from disk
//! - [`operand`]: Addressing modes and resolved operand locations
//! - [`program`]: Image header layout and validation
//! - [`vm`]: Core virtual machine implementation

pub mod code;
pub mod compare;
pub mod errors;
pub mod io;
pub mod isa;
#[cfg(test)]
mod isa_static_check;
pub mod loader;
pub mod operand;
pub mod program;
pub mod vm;
