//! Register/stack hybrid virtual machine.
//!
//! Loads a bytecode image, validates its header, and interprets it against a
//! CPU made of floating-point registers, an operand stack, and RAM.

pub mod process;
pub mod utils;
pub mod virtual_machine;

pub use crate::process::{ExecRes, process};
