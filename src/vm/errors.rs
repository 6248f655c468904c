use std::fmt::Arguments;

use crate::{chunk::Chunk, vm::VM};

/// Errors surfaced while executing a chunk
#[derive(Debug)]
pub enum VMError {
    RuntimeError(String),
}

impl std::fmt::Display for VMError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RuntimeError(e) => {
                write!(f, "{e}")
            }
        }
    }
}

impl VM {
    /// Builds a runtime error pointing at the source line of the faulting
    /// instruction. Every byte of an instruction is recorded against the
    /// same line, so any offset inside it resolves correctly.
    pub(crate) fn construct_runtime_error(&mut self, chunk: &Chunk, arguments: Arguments) -> VMError {
        let offset = self.ip.saturating_sub(1);
        let line = chunk.line_at(offset).unwrap_or(0);

        // Runtime errors are terminal, unwind the stack for the next run
        self.reset();

        VMError::RuntimeError(format!("[line {line}] Error: {arguments}"))
    }
}
