//! Core virtual machine implementation.
//!
//! The VM executes a validated code image on a stack machine with a small
//! `f64` register file and flat `f64` RAM. Each instruction is a single
//! opcode byte optionally followed by an operand encoding (see
//! [`isa`](crate::virtual_machine::isa)).
//!
//! While a handler runs, `ip` rests on the last byte the instruction has
//! consumed so far; [`VM::step`] then moves it one byte forward onto the
//! next opcode.

mod call_stack;
mod cpu;
mod ram;
mod registers;
mod stack;

pub use call_stack::CALL_STACK_CAPACITY;
pub use cpu::Cpu;
pub use ram::{RAM_SIZE, Ram};
pub use registers::{NUM_REGS, Registers, SCRATCH_REGISTER};
pub use stack::{STACK_CAPACITY, Stack};

use crate::debug;
use crate::virtual_machine::code::Code;
use crate::virtual_machine::compare::compare;
use crate::virtual_machine::errors::VMError;
use crate::virtual_machine::io::Io;
use crate::virtual_machine::isa::{CMD_MASK, Instruction};
use crate::virtual_machine::operand::{AddrMode, LITERAL_SIZE, Location, is_ram_indirect};
use crate::virtual_machine::program::{self, HEADER_SIZE};
use call_stack::{CallFrame, CallStack};

macro_rules! exec_vm {
    // Entry point
    (
        vm = $vm:ident,
        io = $io:ident,
        instr = $instr:ident,
        { $( $variant:ident => $handler:ident $args:tt ),* $(,)? }
    ) => {{
        match $instr {
            $(
                Instruction::$variant => exec_vm!(@call $vm, $io, $handler, $args),
            )*
        }
    }};

    // Handler that talks to the host (semicolon separator)
    (@call $vm:ident, $io:ident, $handler:ident,
        (io; $( $field:ident : $kind:ident ),* $(,)? )
    ) => {{
        $( let $field = exec_vm!(@read $vm, $kind)?; )*
        $vm.$handler($io, $( $field ),*)
    }};

    // Handler without host access
    (@call $vm:ident, $io:ident, $handler:ident,
        ( $( $field:ident : $kind:ident ),* $(,)? )
    ) => {{
        $( let $field = exec_vm!(@read $vm, $kind)?; )*
        $vm.$handler($( $field ),*)
    }};

    // Resolve a readable/writable operand location
    (@read $vm:ident, Operand) => {{
        $vm.resolve_operand()
    }};
}

/// Outcome of executing one instruction.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Flow {
    /// Fetch the next instruction.
    Continue,
    /// `HLT` executed; the run finished successfully.
    Halt,
}

/// Bytecode virtual machine.
///
/// Owns its code image and processor state. Construction does not validate
/// the image; [`VM::run`] does before executing anything.
pub struct VM {
    /// Code image, header included.
    code: Code,
    /// Instruction pointer (absolute byte offset into `code`).
    ip: usize,
    /// Registers, operand stack, and RAM.
    cpu: Cpu,
    /// Return points of active `CALL`s.
    call_stack: CallStack,
}

impl VM {
    /// Creates a VM for `code` with a fresh CPU and `ip` at the first instruction.
    pub fn new(code: Code) -> Self {
        Self {
            code,
            ip: HEADER_SIZE,
            cpu: Cpu::new(),
            call_stack: CallStack::default(),
        }
    }

    /// Validates the header, then executes from the first instruction until `HLT`.
    ///
    /// On a header error nothing executes and the CPU keeps its initial state.
    pub fn run<I: Io>(&mut self, io: &mut I) -> Result<(), VMError> {
        program::validate(&self.code)?;
        self.ip = HEADER_SIZE;
        while self.step(io)? == Flow::Continue {}
        Ok(())
    }

    /// Executes the instruction at `ip`.
    ///
    /// On [`Flow::Continue`] `ip` is left on the next opcode byte.
    pub fn step<I: Io>(&mut self, io: &mut I) -> Result<Flow, VMError> {
        let offset = self.ip;
        let opcode = self
            .code
            .byte_at(offset)
            .ok_or(VMError::MissingHalt { ip: offset })?;
        let instruction =
            Instruction::try_from(opcode & CMD_MASK).map_err(|_| VMError::InvalidInstruction {
                opcode,
                offset,
            })?;
        debug!(
            "{offset:>6}: {:<4} ({opcode:#04x}) {} stack={:?}",
            instruction.mnemonic(),
            operand_label(instruction, opcode),
            self.cpu.stack.as_slice()
        );

        let flow = self.exec(instruction, io)?;
        if flow == Flow::Continue {
            self.ip += 1;
        }
        Ok(flow)
    }

    /// Returns the processor state.
    pub fn cpu(&self) -> &Cpu {
        &self.cpu
    }

    /// Returns the current instruction pointer.
    pub fn ip(&self) -> usize {
        self.ip
    }

    /// Returns the code image.
    pub fn code(&self) -> &Code {
        &self.code
    }

    /// Returns the number of active `CALL`s.
    pub fn call_depth(&self) -> usize {
        self.call_stack.depth()
    }

    /// Executes a single decoded instruction.
    fn exec<I: Io>(&mut self, instruction: Instruction, io: &mut I) -> Result<Flow, VMError> {
        exec_vm! {
            vm = self,
            io = io,
            instr = instruction,
            {
                Halt => op_halt(),
                // Stack transfer
                Push => op_push(src: Operand),
                Pop => op_pop(dst: Operand),
                Dup => op_dup(),
                // Arithmetic
                Add => op_add(),
                Sub => op_sub(),
                Mul => op_mul(),
                Div => op_div(),
                Sqrt => op_sqrt(),
                Sin => op_sin(),
                Cos => op_cos(),
                // Host I/O
                In => op_in(io;),
                Out => op_out(io;),
                // Control flow
                Jmp => op_jmp(),
                Ja => op_ja(),
                Jae => op_jae(),
                Jb => op_jb(),
                Jbe => op_jbe(),
                Je => op_je(),
                Jne => op_jne(),
                Call => op_call(),
                Ret => op_ret(),
            }
        }
    }

    // =========================
    // Operand resolution
    // =========================

    /// Returns the opcode byte at `at` with its decoded addressing mode.
    fn addr_mode_at(&self, at: usize) -> Result<(u8, AddrMode), VMError> {
        let opcode = self
            .code
            .byte_at(at)
            .ok_or(VMError::MissingHalt { ip: at })?;
        let mode = AddrMode::try_from(opcode)
            .map_err(|_| VMError::InvalidAddressingMode { opcode, offset: at })?;
        Ok((opcode, mode))
    }

    /// Checks that `count` operand bytes follow the byte at `ip`.
    fn ensure_available(&self, count: usize) -> Result<(), VMError> {
        let available = self.code.len().saturating_sub(self.ip + 1);
        if count > available {
            return Err(VMError::UnexpectedEndOfBytecode {
                ip: self.ip,
                requested: count,
                available,
            });
        }
        Ok(())
    }

    /// Resolves the operand of the instruction whose opcode byte is at `ip`.
    ///
    /// Leaves `ip` on the last byte of the operand encoding. A `REG|IMM`
    /// operand is computed into [`SCRATCH_REGISTER`].
    fn resolve_operand(&mut self) -> Result<Location, VMError> {
        let at = self.ip;
        let (opcode, mode) = self.addr_mode_at(at)?;
        self.ensure_available(mode.size())?;

        let location = match mode {
            AddrMode::Reg => Location::Register(self.register_index_at(at + 1)?),
            AddrMode::Imm => Location::Immediate(at + 1),
            AddrMode::RegImm => {
                let index = self.register_index_at(at + 1)?;
                let literal = self.literal_at(at + 2)?;
                let registers = &mut self.cpu.registers;
                registers.set(SCRATCH_REGISTER, 0.0)?;
                let sum = registers.get(index)? + literal;
                registers.set(SCRATCH_REGISTER, sum)?;
                Location::Register(SCRATCH_REGISTER)
            }
        };
        self.ip = at + mode.size();

        if is_ram_indirect(opcode) {
            let address = Ram::address(self.read(location)?)?;
            return Ok(Location::Ram(address));
        }
        Ok(location)
    }

    fn register_index_at(&self, offset: usize) -> Result<u8, VMError> {
        let index = self
            .code
            .byte_at(offset)
            .ok_or(VMError::UnexpectedEndOfBytecode {
                ip: offset,
                requested: 1,
                available: 0,
            })?;
        Registers::check(index)
    }

    fn literal_at(&self, offset: usize) -> Result<f64, VMError> {
        self.code
            .f64_at(offset)
            .ok_or(VMError::UnexpectedEndOfBytecode {
                ip: offset,
                requested: LITERAL_SIZE,
                available: self.code.len().saturating_sub(offset),
            })
    }

    /// Reads the value stored at `location`.
    fn read(&self, location: Location) -> Result<f64, VMError> {
        match location {
            Location::Register(idx) => self.cpu.registers.get(idx),
            Location::Ram(addr) => Ok(self.cpu.ram[addr]),
            Location::Immediate(offset) => self.literal_at(offset),
        }
    }

    /// Stores `value` at `location`. Literals in the code image are read-only.
    fn write(&mut self, location: Location, value: f64) -> Result<(), VMError> {
        match location {
            Location::Register(idx) => self.cpu.registers.set(idx, value),
            Location::Ram(addr) => {
                self.cpu.ram[addr] = value;
                Ok(())
            }
            Location::Immediate(offset) => Err(VMError::ImmediateNotWritable { offset }),
        }
    }

    // =========================
    // Branch resolution
    // =========================

    /// Transfers control to the target operand, or steps over it when not taken.
    fn jump(&mut self, taken: bool) -> Result<(), VMError> {
        if !taken {
            return self.skip_operand();
        }

        let location = self.resolve_operand()?;
        let target = self.read(location)?;
        let size = self.code.len();
        let out_of_range = VMError::JumpOutOfRange { target, size };
        if !target.is_finite() || target < 0.0 {
            return Err(out_of_range);
        }
        let offset = target as usize;
        if offset >= size {
            return Err(out_of_range);
        }
        self.ip = HEADER_SIZE + offset - 1;
        Ok(())
    }

    /// Advances `ip` over the operand encoding without evaluating it.
    fn skip_operand(&mut self) -> Result<(), VMError> {
        let size = self.addr_mode_at(self.ip)?.1.size();
        self.ensure_available(size)?;
        self.ip += size;
        Ok(())
    }

    /// Pops `b` then `a` and jumps if `cond(compare(a, b))` holds.
    fn branch_if(&mut self, cond: impl FnOnce(i8) -> bool) -> Result<Flow, VMError> {
        let b = self.cpu.stack.pop()?;
        let a = self.cpu.stack.pop()?;
        self.jump(cond(compare(a, b)))?;
        Ok(Flow::Continue)
    }

    // =========================
    // Handlers
    // =========================

    fn op_halt(&mut self) -> Result<Flow, VMError> {
        Ok(Flow::Halt)
    }

    fn op_push(&mut self, src: Location) -> Result<Flow, VMError> {
        let value = self.read(src)?;
        self.cpu.stack.push(value)?;
        Ok(Flow::Continue)
    }

    fn op_pop(&mut self, dst: Location) -> Result<Flow, VMError> {
        let value = self.cpu.stack.pop()?;
        self.write(dst, value)?;
        Ok(Flow::Continue)
    }

    fn op_dup(&mut self) -> Result<Flow, VMError> {
        let top = self.cpu.stack.peek()?;
        self.cpu.stack.push(top)?;
        Ok(Flow::Continue)
    }

    fn binary(&mut self, f: impl FnOnce(f64, f64) -> f64) -> Result<Flow, VMError> {
        let b = self.cpu.stack.pop()?;
        let a = self.cpu.stack.pop()?;
        self.cpu.stack.push(f(a, b))?;
        Ok(Flow::Continue)
    }

    fn unary(&mut self, f: impl FnOnce(f64) -> f64) -> Result<Flow, VMError> {
        let a = self.cpu.stack.pop()?;
        self.cpu.stack.push(f(a))?;
        Ok(Flow::Continue)
    }

    fn op_add(&mut self) -> Result<Flow, VMError> {
        self.binary(|a, b| a + b)
    }

    fn op_sub(&mut self) -> Result<Flow, VMError> {
        self.binary(|a, b| a - b)
    }

    fn op_mul(&mut self) -> Result<Flow, VMError> {
        self.binary(|a, b| a * b)
    }

    fn op_div(&mut self) -> Result<Flow, VMError> {
        self.binary(|a, b| a / b)
    }

    fn op_sqrt(&mut self) -> Result<Flow, VMError> {
        self.unary(f64::sqrt)
    }

    fn op_sin(&mut self) -> Result<Flow, VMError> {
        self.unary(f64::sin)
    }

    fn op_cos(&mut self) -> Result<Flow, VMError> {
        self.unary(f64::cos)
    }

    fn op_in<I: Io>(&mut self, io: &mut I) -> Result<Flow, VMError> {
        let value = io.read_value()?;
        self.cpu.stack.push(value)?;
        Ok(Flow::Continue)
    }

    fn op_out<I: Io>(&mut self, io: &mut I) -> Result<Flow, VMError> {
        let value = self.cpu.stack.pop()?;
        io.write_value(value)?;
        Ok(Flow::Continue)
    }

    fn op_jmp(&mut self) -> Result<Flow, VMError> {
        self.jump(true)?;
        Ok(Flow::Continue)
    }

    fn op_ja(&mut self) -> Result<Flow, VMError> {
        self.branch_if(|c| c < 0)
    }

    fn op_jae(&mut self) -> Result<Flow, VMError> {
        self.branch_if(|c| c <= 0)
    }

    fn op_jb(&mut self) -> Result<Flow, VMError> {
        self.branch_if(|c| c > 0)
    }

    fn op_jbe(&mut self) -> Result<Flow, VMError> {
        self.branch_if(|c| c >= 0)
    }

    fn op_je(&mut self) -> Result<Flow, VMError> {
        self.branch_if(|c| c == 0)
    }

    fn op_jne(&mut self) -> Result<Flow, VMError> {
        self.branch_if(|c| c != 0)
    }

    fn op_call(&mut self) -> Result<Flow, VMError> {
        let (_, mode) = self.addr_mode_at(self.ip)?;
        let return_ip = self.ip + mode.size();
        self.call_stack.push(CallFrame { return_ip })?;
        self.jump(true)?;
        Ok(Flow::Continue)
    }

    fn op_ret(&mut self) -> Result<Flow, VMError> {
        let frame = self.call_stack.pop()?;
        self.ip = frame.return_ip;
        Ok(Flow::Continue)
    }
}

/// Names the operand encoding of `opcode` for the trace log.
fn operand_label(instruction: Instruction, opcode: u8) -> &'static str {
    if !instruction.has_operand() {
        return "-";
    }
    AddrMode::try_from(opcode).map_or("?", |mode| mode.name())
}
