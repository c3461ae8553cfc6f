//! Instruction Set Architecture (ISA) definitions.
//!
//! The [`for_each_instruction!`](crate::for_each_instruction) macro holds the
//! canonical opcode table and invokes a callback macro for code generation, so
//! every opcode value sits next to its mnemonic and operand list.
//!
//! This module generates:
//! - The [`Instruction`] enum with opcode mappings
//! - `TryFrom<u8>` for decoding opcodes
//!
//! # Bytecode Format
//!
//! Every instruction starts with one opcode byte:
//! - Bits 0-4 ([`CMD_MASK`]): operation selector
//! - Bit 5 ([`IMM`]): an 8-byte little-endian `f64` literal follows
//! - Bit 6 ([`REG`]): a 1-byte register index follows
//! - Bit 7 ([`RAM`]): the resolved operand value is a RAM address
//!
//! With both `IMM` and `REG` set, the register index comes first and the
//! operand is `register + literal`. Qualifier bits are ignored on
//! instructions that take no operand.
//!
//! Stack effects below name the first pushed value `a` and the top value `b`.

use crate::virtual_machine::errors::VMError;

/// Selects the operation bits of an opcode byte.
pub const CMD_MASK: u8 = 0x1F;
/// Operand carries a literal `f64`.
pub const IMM: u8 = 0x20;
/// Operand carries a register index.
pub const REG: u8 = 0x40;
/// Operand value is used as a RAM address.
pub const RAM: u8 = 0x80;

/// Invokes a callback macro with the complete instruction definition list.
///
/// Operand kinds:
/// - `Operand`: resolved to a readable/writable location before the handler runs
/// - `Target`: jump target, only resolved when the branch is taken
#[macro_export]
macro_rules! for_each_instruction {
    ($callback:ident) => {
        $callback! {
            // =========================
            // Control
            // =========================
            /// HLT ; stop execution successfully
            Halt = 0x00, "HLT" => [],
            // =========================
            // Stack transfer
            // =========================
            /// PUSH src ; push the value at src
            Push = 0x01, "PUSH" => [src: Operand],
            /// POP dst ; pop into a register or RAM cell
            Pop = 0x02, "POP" => [dst: Operand],
            /// DUP ; push a copy of the top value
            Dup = 0x0C, "DUP" => [],
            // =========================
            // Arithmetic
            // =========================
            /// ADD ; push a + b
            Add = 0x03, "ADD" => [],
            /// SUB ; push a - b
            Sub = 0x04, "SUB" => [],
            /// MUL ; push a * b
            Mul = 0x05, "MUL" => [],
            /// DIV ; push a / b (IEEE 754, no trap on zero)
            Div = 0x06, "DIV" => [],
            /// SQRT ; push sqrt(a)
            Sqrt = 0x07, "SQRT" => [],
            /// SIN ; push sin(a)
            Sin = 0x08, "SIN" => [],
            /// COS ; push cos(a)
            Cos = 0x09, "COS" => [],
            // =========================
            // Host I/O
            // =========================
            /// IN ; read a number from the host and push it
            In = 0x0A, "IN" => [],
            /// OUT ; pop a value and write it to the host
            Out = 0x0B, "OUT" => [],
            // =========================
            // Control Flow
            // =========================
            /// JMP target ; unconditional jump
            Jmp = 0x0D, "JMP" => [target: Target],
            /// JA target ; jump if a > b
            Ja = 0x0E, "JA" => [target: Target],
            /// JAE target ; jump if a >= b
            Jae = 0x0F, "JAE" => [target: Target],
            /// JB target ; jump if a < b
            Jb = 0x10, "JB" => [target: Target],
            /// JBE target ; jump if a <= b
            Jbe = 0x11, "JBE" => [target: Target],
            /// JE target ; jump if a == b (within epsilon)
            Je = 0x12, "JE" => [target: Target],
            /// JNE target ; jump if a != b (outside epsilon)
            Jne = 0x13, "JNE" => [target: Target],
            /// CALL target ; save the return point and jump
            Call = 0x14, "CALL" => [target: Target],
            /// RET ; resume after the matching CALL
            Ret = 0x15, "RET" => [],
        }
    };
}

#[macro_export]
macro_rules! define_instructions {
    (
        $(
            $(#[$doc:meta])*
            $name:ident = $opcode:literal, $mnemonic:literal => [
                $( $field:ident : $kind:ident ),* $(,)?
            ]
        ),* $(,)?
    ) => {
        // =========================
        // VM instruction enum
        // =========================
        #[repr(u8)]
        #[derive(Copy, Clone, Debug, Eq, PartialEq)]
        pub enum Instruction {
            $(
                $(#[$doc])*
                $name = $opcode,
            )*
        }

        impl TryFrom<u8> for Instruction {
            type Error = VMError;

            /// Decodes an operation selector (already masked with [`CMD_MASK`]).
            fn try_from(value: u8) -> Result<Self, Self::Error> {
                match value {
                    $( $opcode => Ok(Instruction::$name), )*
                    _ => Err(VMError::InvalidInstruction {
                        opcode: value,
                        offset: 0,
                    }),
                }
            }
        }

        impl Instruction {
            /// Every instruction, in table order.
            pub const ALL: &'static [Instruction] = &[ $( Instruction::$name, )* ];

            /// Returns the assembly mnemonic for this instruction.
            pub const fn mnemonic(&self) -> &'static str {
                match self {
                    $( Instruction::$name => $mnemonic, )*
                }
            }

            /// Returns true if an operand encoding follows the opcode byte.
            pub const fn has_operand(&self) -> bool {
                match self {
                    $( Instruction::$name => $crate::define_instructions!(@any $($kind)*), )*
                }
            }
        }
    };

    (@any) => { false };
    (@any $($kind:ident)+) => { true };
}

for_each_instruction!(define_instructions);
