/// The virtual machine: a single-threaded fetch-decode-dispatch loop over a
/// chunk's bytecode, with a bounded value stack and a table of globals.
mod debug;
pub mod errors;
mod operations;
mod variables;

use std::collections::HashMap;
use std::io::{self, Write};
use std::rc::Rc;

use crate::{
    chunk::{Chunk, OpCode},
    constants::STACK_MAX,
    value::Value,
    vm::errors::VMError,
};

/// Stack based virtual machine. The VM outlives the chunks it runs: globals
/// defined by one chunk stay visible to the next, which is what makes the
/// REPL useful.
pub struct VM {
    /// Value stack. Bounded: overflowing it is a runtime error, not a
    /// reallocation.
    stack: Vec<Value>,
    /// Global variables by name. The names share storage with the constant
    /// pools they came from, so they stay alive after a chunk is dropped.
    globals: HashMap<Rc<str>, Value>,
    /// Offset of the next byte to execute in the current chunk
    ip: usize,
    /// When set, every instruction is disassembled and the stack dumped
    /// before dispatch
    trace: bool,
    /// Destination for `print`. Stdout normally; tests inject a buffer.
    output: Box<dyn Write>,
}

impl Default for VM {
    fn default() -> Self {
        Self::new()
    }
}

impl VM {
    #[must_use]
    pub fn new() -> Self {
        Self::with_output(Box::new(io::stdout()))
    }

    /// A VM whose `print` statements write somewhere else than stdout
    pub fn with_output(output: Box<dyn Write>) -> Self {
        Self {
            stack: Vec::with_capacity(STACK_MAX),
            globals: HashMap::new(),
            ip: 0,
            trace: false,
            output,
        }
    }

    /// Turns on per-instruction tracing for this VM
    pub fn enable_trace(&mut self) {
        self.trace = true;
    }

    fn tracing(&self) -> bool {
        cfg!(feature = "debug_trace_execution") || self.trace
    }

    /// Clears execution state. Globals survive: only the stack and the
    /// instruction pointer belong to a single run.
    pub fn reset(&mut self) {
        self.stack.clear();
        self.ip = 0;
    }

    /// Executes a compiled chunk from the beginning.
    ///
    /// # Errors
    ///
    /// Returns `VMError` when execution hits a runtime error. The stack is
    /// unwound, the error message carries the faulting source line.
    pub fn run(&mut self, chunk: &Chunk) -> Result<(), VMError> {
        self.ip = 0;

        loop {
            if self.tracing() {
                self.trace_instruction(chunk);
            }

            // Running off the end of the code means the compiler forgot to
            // terminate the chunk. Fail, don't panic.
            let instruction_byte = self.read_byte(chunk)?;
            let opcode = OpCode::try_from(instruction_byte).map_err(|e| {
                self.construct_runtime_error(chunk, format_args!("Malformed bytecode: {e}."))
            })?;

            match opcode {
                OpCode::Nop => {}
                OpCode::Return => {
                    return Ok(());
                }
                OpCode::Constant8 | OpCode::Constant16 | OpCode::Constant24 => {
                    let index = self.read_index(chunk, opcode.operand_width())?;
                    let constant = chunk.constant(index).cloned().ok_or_else(|| {
                        self.construct_runtime_error(
                            chunk,
                            format_args!("Malformed bytecode: no constant at index {index}."),
                        )
                    })?;
                    self.push(chunk, constant)?;
                }
                OpCode::NdfGlobal8 | OpCode::NdfGlobal16 | OpCode::NdfGlobal24 => {
                    self.op_ndf_global(chunk, opcode.operand_width())?;
                }
                OpCode::DefGlobal8 | OpCode::DefGlobal16 | OpCode::DefGlobal24 => {
                    self.op_def_global(chunk, opcode.operand_width())?;
                }
                OpCode::GetGlobal8 | OpCode::GetGlobal16 | OpCode::GetGlobal24 => {
                    self.op_get_global(chunk, opcode.operand_width())?;
                }
                OpCode::SetGlobal8 | OpCode::SetGlobal16 | OpCode::SetGlobal24 => {
                    self.op_set_global(chunk, opcode.operand_width())?;
                }
                OpCode::Nil => self.push(chunk, Value::Nil)?,
                OpCode::True => self.push(chunk, Value::Bool(true))?,
                OpCode::False => self.push(chunk, Value::Bool(false))?,
                OpCode::Equal => self.op_equal(chunk, false)?,
                OpCode::NotEqual => self.op_equal(chunk, true)?,
                // The numeric binary operators share their operand checks
                OpCode::Less
                | OpCode::LessEqual
                | OpCode::Greater
                | OpCode::GreaterEqual
                | OpCode::Add
                | OpCode::Subtract
                | OpCode::Multiply
                | OpCode::Divide => self.binary_op(chunk, opcode)?,
                OpCode::Negate => self.op_negate(chunk)?,
                OpCode::Not => self.op_not(chunk)?,
                OpCode::Print => {
                    let value = self.pop(chunk)?;
                    writeln!(self.output, "{value}").map_err(|e| {
                        self.construct_runtime_error(
                            chunk,
                            format_args!("Could not write output: {e}."),
                        )
                    })?;
                }
                OpCode::Pop => {
                    self.pop(chunk)?;
                }
                OpCode::Jump => {
                    // Unconditional: just skip the encoded distance
                    let offset = self.read_index(chunk, 2)?;
                    self.ip += offset;
                }
                OpCode::JumpIfFalse => {
                    let offset = self.read_index(chunk, 2)?;
                    // Peek, never pop: the operand value is the result of a
                    // short-circuited expression
                    if self.peek_top(chunk)?.is_falsey() {
                        self.ip += offset;
                    }
                }
                OpCode::JumpIfTrue => {
                    let offset = self.read_index(chunk, 2)?;
                    if !self.peek_top(chunk)?.is_falsey() {
                        self.ip += offset;
                    }
                }
            }
        }
    }

    /// Reads the byte at the instruction pointer and advances past it
    fn read_byte(&mut self, chunk: &Chunk) -> Result<u8, VMError> {
        let byte = chunk.get(self.ip).ok_or_else(|| {
            self.construct_runtime_error(
                chunk,
                format_args!("Malformed bytecode: ran past the end of the chunk."),
            )
        })?;
        self.ip += 1;
        Ok(byte)
    }

    /// Reads a `width`-byte little-endian operand and advances past it
    fn read_index(&mut self, chunk: &Chunk, width: usize) -> Result<usize, VMError> {
        let index = chunk.read_index(self.ip, width).ok_or_else(|| {
            self.construct_runtime_error(
                chunk,
                format_args!("Malformed bytecode: truncated operand."),
            )
        })?;
        self.ip += width;
        Ok(index)
    }

    /// Pushes a value, enforcing the stack bound
    fn push(&mut self, chunk: &Chunk, value: Value) -> Result<(), VMError> {
        if self.stack.len() >= STACK_MAX {
            return Err(self.construct_runtime_error(chunk, format_args!("Stack overflow.")));
        }
        self.stack.push(value);
        Ok(())
    }

    /// Pops the top of the stack. An empty stack here means the compiler
    /// emitted unbalanced bytecode; it surfaces as a runtime error.
    fn pop(&mut self, chunk: &Chunk) -> Result<Value, VMError> {
        match self.stack.pop() {
            Some(value) => Ok(value),
            None => Err(self.construct_runtime_error(chunk, format_args!("Stack underflow."))),
        }
    }

    /// Borrows the top of the stack without popping it
    fn peek_top(&mut self, chunk: &Chunk) -> Result<&Value, VMError> {
        if self.stack.is_empty() {
            return Err(self.construct_runtime_error(chunk, format_args!("Stack underflow.")));
        }
        Ok(self.stack.last().unwrap())
    }
}
