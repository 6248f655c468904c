use crate::{
    chunk::OpCode,
    compiler::{Compiler, errors::CompileError},
    scanner::token::TokenType,
};

impl<'a> Compiler<'a> {
    /// Handles one top level declaration or statement
    pub(super) fn declaration(&mut self) -> Result<(), CompileError> {
        if self.match_curr_ty(TokenType::Var)? {
            self.var_declaration()
        } else {
            self.statement()
        }
    }

    /// Generates bytecode for a variable declaration. The name goes into
    /// the constant pool; which define opcode follows depends on whether an
    /// initializer was written.
    fn var_declaration(&mut self) -> Result<(), CompileError> {
        self.consume(TokenType::Identifier, "Expected variable name.")?;

        // After consumption the name is the previous token
        let token = self
            .parser
            .previous
            .as_ref()
            .ok_or_else(|| self.parser.error_at_current("Expected variable name"))?;
        let (start, length) = (token.start, token.length);
        let index = self.identifier_constant(start, length)?;

        if self.match_curr_ty(TokenType::Equal)? {
            // Evaluate the initializer; the define opcode pops its result
            self.expression()?;
            self.consume(TokenType::Semicolon, "Expected ';' after variable declaration.")?;
            self.emit_load(OpCode::DefGlobal8, index);
        } else {
            // No initializer: the global is born nil without a stack
            // round-trip
            self.consume(TokenType::Semicolon, "Expected ';' after variable declaration.")?;
            self.emit_load(OpCode::NdfGlobal8, index);
        }

        Ok(())
    }

    fn statement(&mut self) -> Result<(), CompileError> {
        if self.match_curr_ty(TokenType::Print)? {
            self.print_statement()
        } else if self.match_curr_ty(TokenType::Return)? {
            self.return_statement()
        } else {
            self.expression_statement()
        }
    }

    fn print_statement(&mut self) -> Result<(), CompileError> {
        self.expression()?;
        self.consume(TokenType::Semicolon, "Expected ';' after value.")?;
        self.emit_opcode(OpCode::Print);
        Ok(())
    }

    /// A top level `return;` simply ends execution of the chunk. There are
    /// no functions, so it carries no value.
    fn return_statement(&mut self) -> Result<(), CompileError> {
        self.consume(TokenType::Semicolon, "Expected ';' after return.")?;
        self.emit_opcode(OpCode::Return);
        Ok(())
    }

    /// An expression evaluated for its side effects. The result is popped:
    /// statements leave the stack the way they found it.
    fn expression_statement(&mut self) -> Result<(), CompileError> {
        self.expression()?;
        self.consume(TokenType::Semicolon, "Expected ';' after expression.")?;
        self.emit_opcode(OpCode::Pop);
        Ok(())
    }
}
