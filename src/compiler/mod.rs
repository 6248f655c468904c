///
/// This module turns source text into bytecode. It is a single-pass
/// compiler: there is no syntax tree, bytecode is appended to the chunk as
/// soon as each expression has been parsed.
///
use crate::{
    chunk::{Chunk, OpCode},
    compiler::{
        errors::{CompileError, CompileErrors},
        parser::Parser,
    },
    constants::MAX_JUMP,
    scanner::{Scanner, token::TokenType},
    value::Value,
};

mod declarations;
pub mod errors;
mod expressions;
pub mod parser;
pub mod precedence;

#[cfg(test)]
mod tests;

/// Compiles a whole program into a chunk. On failure the chunk is withheld
/// and every diagnostic collected along the way is returned instead, so a
/// flagged compile can never reach the VM.
pub fn compile(source: &str) -> Result<Chunk, CompileErrors> {
    Compiler::new(source).compile()
}

/// Drives parsing and bytecode generation. The compiler doesn't care how the
/// bytecode gets executed; it only ever appends to its chunk. Tokens are
/// scanned on demand, so the whole token stream never sits in memory.
pub struct Compiler<'a> {
    source: &'a str,
    parser: Parser<'a>,
    chunk: Chunk,
    errors: Vec<CompileError>,
}

impl<'a> Compiler<'a> {
    pub fn new(source: &'a str) -> Self {
        let scanner = Scanner::new(source);
        // The parser scans tokens on demand, it needs the scanner for that
        let parser = Parser::new(scanner);

        Self {
            source,
            parser,
            chunk: Chunk::new(),
            errors: Vec::new(),
        }
    }

    /// Parses declarations until end of input. Each failed declaration is
    /// recorded and skipped past, so one compile reports as many errors as
    /// the source contains.
    pub fn compile(mut self) -> Result<Chunk, CompileErrors> {
        // Prime the cursor: parsing always looks at `current`. A scan error
        // this early still consumes the bad input, so retrying terminates.
        while let Err(e) = self.parser.advance() {
            self.errors.push(e);
        }

        while !self.parser.check(TokenType::Eof) {
            if let Err(e) = self.declaration() {
                self.errors.push(e);
                self.synchronize();
            }
        }

        self.end_compiler();

        if self.errors.is_empty() {
            Ok(self.chunk)
        } else {
            Err(CompileErrors::new(self.errors))
        }
    }

    /// Panic-mode recovery: discard tokens until a statement boundary, then
    /// let the main loop resume parsing. Scan errors inside the skipped
    /// region are fallout of the original problem and are swallowed.
    fn synchronize(&mut self) {
        loop {
            if self.parser.check(TokenType::Eof) {
                return;
            }

            // Just past the end of a statement
            if let Some(previous) = &self.parser.previous
                && previous.ty == TokenType::Semicolon
            {
                return;
            }

            // At the start of a new one
            if let Some(current) = &self.parser.current
                && matches!(
                    current.ty,
                    TokenType::Var | TokenType::Print | TokenType::Return
                )
            {
                return;
            }

            let _ = self.parser.advance();
        }
    }

    /// Executes when all declarations have been compiled
    fn end_compiler(&mut self) {
        self.emit_return();

        // Dump the bytecode to see what was produced
        #[cfg(feature = "debug_trace_execution")]
        print!("{}", crate::debug::Debug::disassemble_chunk(&self.chunk, "code"));
    }

    /// Returns the type of the current token
    pub(super) fn get_current_token_ty(&self) -> Result<TokenType, CompileError> {
        Ok(self
            .parser
            .current
            .as_ref()
            .ok_or_else(|| self.parser.error_at_previous("Expected a token"))?
            .ty)
    }

    /// Returns the type of the previous token
    pub(super) fn get_previous_token_ty(&self) -> Result<TokenType, CompileError> {
        Ok(self
            .parser
            .previous
            .as_ref()
            .ok_or_else(|| self.parser.error_at_current("Expected a token"))?
            .ty)
    }

    /// Consumes the current token when it has the given type
    pub(super) fn match_curr_ty(&mut self, ty: TokenType) -> Result<bool, CompileError> {
        if self.parser.check(ty) {
            self.parser.advance()?;
            return Ok(true);
        }
        Ok(false)
    }

    pub(super) fn consume(&mut self, ty: TokenType, message: &str) -> Result<(), CompileError> {
        self.parser.consume(ty, message)
    }

    /// Source line bytes emitted right now should be attributed to: the line
    /// of the token that produced them.
    fn current_line(&self) -> i32 {
        self.parser.previous.as_ref().map_or(1, |token| token.line)
    }

    /// Appends a plain opcode to the chunk
    pub(super) fn emit_opcode(&mut self, opcode: OpCode) {
        self.chunk.write_opcode(opcode, self.current_line());
    }

    /// Appends an index-carrying instruction, letting the chunk pick the
    /// 8/16/24-bit family member from the index magnitude
    pub(super) fn emit_load(&mut self, family: OpCode, index: usize) {
        self.chunk.write_load(family, index, self.current_line());
    }

    /// Adds a value to the constant pool, converting pool exhaustion into a
    /// parse error against the current token
    pub(super) fn make_constant(&mut self, value: Value) -> Result<usize, CompileError> {
        self.chunk
            .add_constant(value)
            .map_err(|_| self.parser.error_at_previous("Too many constants in one chunk."))
    }

    /// Emits the instruction loading `value` onto the stack
    pub(super) fn emit_constant(&mut self, value: Value) -> Result<(), CompileError> {
        let index = self.make_constant(value)?;
        self.emit_load(OpCode::Constant8, index);
        Ok(())
    }

    /// Interns an identifier's name in the constant pool and returns its
    /// index, for the global opcodes that name their variable this way
    pub(super) fn identifier_constant(&mut self, start: usize, length: u32) -> Result<usize, CompileError> {
        let name = &self.source[start..start + length as usize];
        self.make_constant(Value::from(name))
    }

    /// Emits a jump with a placeholder operand and returns the operand's
    /// offset for later patching
    pub(super) fn emit_jump(&mut self, opcode: OpCode) -> usize {
        self.emit_opcode(opcode);
        let line = self.current_line();
        self.chunk.write_byte(0xff, line);
        self.chunk.write_byte(0xff, line);
        self.chunk.len() - 2
    }

    /// Backfills a jump operand so the jump lands just past the last byte
    /// emitted so far
    pub(super) fn patch_jump(&mut self, operand_offset: usize) -> Result<(), CompileError> {
        // The jump distance is measured from after the 2-byte operand
        let jump = self.chunk.len() - operand_offset - 2;

        if jump > MAX_JUMP {
            return Err(self.parser.error_at_previous("Too much code to jump over."));
        }

        let bytes = (jump as u16).to_le_bytes();
        self.chunk.patch(operand_offset, bytes[0]);
        self.chunk.patch(operand_offset + 1, bytes[1]);
        Ok(())
    }

    /// Writes the instruction that terminates the chunk
    fn emit_return(&mut self) {
        self.emit_opcode(OpCode::Return);
    }
}
