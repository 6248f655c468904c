use std::num::ParseFloatError;

use crate::{
    chunk::OpCode,
    compiler::{
        Compiler,
        errors::CompileError,
        precedence::{ParseRule, Precedence},
    },
    scanner::token::TokenType,
    value::Value,
};

impl<'a> Compiler<'a> {
    pub(super) fn expression(&mut self) -> Result<(), CompileError> {
        // Parse expression based on precedence
        self.parse_precedence(Precedence::Assignment)
    }

    /// Executes prefix and infix rules according to precedence.
    pub(super) fn parse_precedence(&mut self, precedence: Precedence) -> Result<(), CompileError> {
        // Consume the token that is supposed to start the expression
        self.parser.advance()?;

        let Some(prefix_rule) = ParseRule::get_parse_rule(self.get_previous_token_ty()?).prefix
        else {
            // A token with no prefix rule can't begin an expression
            return Err(self.parser.error_at_previous("Expected expression."));
        };

        // Only a bare identifier parsed at assignment precedence may be
        // followed by '='. The flag rides along into `variable`, the one
        // rule that acts on it.
        let can_assign = precedence as u8 <= Precedence::Assignment as u8;
        // The prefix rule of an expression gets executed first
        prefix_rule(self, can_assign)?;

        // Keep folding infix operators while they bind at least as tightly
        // as the level requested
        while precedence as u8
            <= ParseRule::get_parse_rule(self.get_current_token_ty()?).precedence as u8
        {
            // Consume the operator; the infix rule will parse its right
            // operand itself
            self.parser.advance()?;

            if let Some(infix_rule) = ParseRule::get_parse_rule(self.get_previous_token_ty()?).infix
            {
                infix_rule(self, can_assign)?;
            }
        }

        // An '=' still sitting here means the left side was not a plain
        // identifier, e.g. `a + b = c`.
        if can_assign && self.match_curr_ty(TokenType::Equal)? {
            return Err(self.parser.error_at_previous("Invalid assignment target."));
        }

        Ok(())
    }

    pub(super) fn grouping(&mut self, _: bool) -> Result<(), CompileError> {
        // The '(' is already consumed, evaluate the inner expression with a
        // recursive call
        self.expression()?;

        // When the inner expression has been parsed, the ')' must follow
        self.consume(TokenType::RightParen, "Expected ')' after expression.")
    }

    pub(super) fn number(&mut self, _: bool) -> Result<(), CompileError> {
        // The previous token is the number literal
        let token = self
            .parser
            .previous
            .as_ref()
            .ok_or_else(|| self.parser.error_at_current("Expected a number"))?;

        // Extract the lexeme from the source and parse it
        let lexeme = token.as_str(self.source);
        let value: f64 = lexeme.parse().map_err(|_: ParseFloatError| {
            self.parser.error_at_previous("Invalid number literal.")
        })?;

        self.emit_constant(Value::Number(value))
    }

    pub(super) fn string(&mut self, _: bool) -> Result<(), CompileError> {
        let token = self
            .parser
            .previous
            .as_ref()
            .ok_or_else(|| self.parser.error_at_current("Expected a string"))?;

        // The lexeme still carries its quotes, trim one character from both
        // ends. There are no escape sequences to process.
        let lexeme = token.as_str(self.source);
        let content = &lexeme[1..lexeme.len() - 1];

        self.emit_constant(Value::from(content))
    }

    pub(super) fn literal(&mut self, _: bool) -> Result<(), CompileError> {
        match self.get_previous_token_ty()? {
            TokenType::Nil => self.emit_opcode(OpCode::Nil),
            TokenType::True => self.emit_opcode(OpCode::True),
            TokenType::False => self.emit_opcode(OpCode::False),
            _ => unreachable!(),
        }

        Ok(())
    }

    /// Emits bytecode for the supported unary operators
    pub(super) fn unary(&mut self, _: bool) -> Result<(), CompileError> {
        let operator = self.get_previous_token_ty()?;

        // Compile the operand first; unary operators are right-associative,
        // so parse at their own level
        self.parse_precedence(Precedence::Unary)?;

        match operator {
            TokenType::Bang => self.emit_opcode(OpCode::Not),
            TokenType::Minus => self.emit_opcode(OpCode::Negate),
            // No other token has this rule attached
            _ => unreachable!(),
        }

        Ok(())
    }

    /// Emits bytecode for binary operators. Every comparison has its own
    /// opcode, so nothing is synthesized from Equal + Not pairs.
    pub(super) fn binary(&mut self, _: bool) -> Result<(), CompileError> {
        let operator = self.get_previous_token_ty()?;
        let rule = ParseRule::get_parse_rule(operator);

        // Parse the right operand, binding one level tighter so the
        // operator stays left-associative
        self.parse_precedence(Precedence::from(rule.precedence as u8 + 1))?;

        match operator {
            TokenType::Plus => self.emit_opcode(OpCode::Add),
            TokenType::Minus => self.emit_opcode(OpCode::Subtract),
            TokenType::Star => self.emit_opcode(OpCode::Multiply),
            TokenType::Slash => self.emit_opcode(OpCode::Divide),
            TokenType::EqualEqual => self.emit_opcode(OpCode::Equal),
            TokenType::BangEqual => self.emit_opcode(OpCode::NotEqual),
            TokenType::Greater => self.emit_opcode(OpCode::Greater),
            TokenType::GreaterEqual => self.emit_opcode(OpCode::GreaterEqual),
            TokenType::Less => self.emit_opcode(OpCode::Less),
            TokenType::LessEqual => self.emit_opcode(OpCode::LessEqual),
            // There isn't any other binary operator
            _ => unreachable!(),
        }

        Ok(())
    }

    /// `a and b`: when `a` is falsey it IS the result, jump over `b`
    /// without popping. Otherwise drop `a` and let `b` produce the result.
    pub(super) fn logical_and(&mut self, _: bool) -> Result<(), CompileError> {
        let end_jump = self.emit_jump(OpCode::JumpIfFalse);

        self.emit_opcode(OpCode::Pop);
        self.parse_precedence(Precedence::And)?;

        self.patch_jump(end_jump)
    }

    /// `a or b`: mirror image of `and`, skipping `b` when `a` is truthy
    pub(super) fn logical_or(&mut self, _: bool) -> Result<(), CompileError> {
        let end_jump = self.emit_jump(OpCode::JumpIfTrue);

        self.emit_opcode(OpCode::Pop);
        self.parse_precedence(Precedence::Or)?;

        self.patch_jump(end_jump)
    }

    /// A bare identifier in expression position: a global read, or the
    /// target of an assignment when an '=' follows and assignment is legal
    /// here.
    pub(super) fn variable(&mut self, can_assign: bool) -> Result<(), CompileError> {
        let token = self
            .parser
            .previous
            .as_ref()
            .ok_or_else(|| self.parser.error_at_current("Expected variable name"))?;
        let (start, length) = (token.start, token.length);

        let index = self.identifier_constant(start, length)?;

        if can_assign && self.match_curr_ty(TokenType::Equal)? {
            // Compile the right-hand side, then store it. The value stays
            // on the stack: assignment is itself an expression.
            self.expression()?;
            self.emit_load(OpCode::SetGlobal8, index);
        } else {
            self.emit_load(OpCode::GetGlobal8, index);
        }

        Ok(())
    }
}
