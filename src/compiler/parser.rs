use crate::compiler::errors::CompileError;
use crate::scanner::{
    Scanner,
    token::{Token, TokenType},
};

/// Token cursor shared by the whole compile. It holds exactly two tokens at
/// a time and pulls the next one from the scanner on demand.
pub struct Parser<'a> {
    /// Scanner object to scan tokens on demand
    scanner: Scanner<'a>,
    /// The token currently being looked at
    pub current: Option<Token>,
    /// The previously consumed token, one step behind `current`
    pub previous: Option<Token>,
}

impl<'a> Parser<'a> {
    pub fn new(scanner: Scanner<'a>) -> Self {
        Self {
            scanner,
            current: None,
            previous: None,
        }
    }

    /// Consumes the current token and scans the next one. On a scan error
    /// `current` is left untouched, and the scanner has already stepped past
    /// the bad input, so calling `advance` again makes progress.
    pub fn advance(&mut self) -> Result<(), CompileError> {
        match self.scanner.scan_token() {
            Ok(token) => {
                self.previous = self.current.take();
                self.current = Some(token);
                Ok(())
            }
            Err(e) => Err(CompileError::Scan(e)),
        }
    }

    /// Whether the current token has the given type
    pub fn check(&self, ty: TokenType) -> bool {
        self.current.as_ref().is_some_and(|token| token.ty == ty)
    }

    /// Consumes the current token if it matches the expected type, reports
    /// `message` against it otherwise.
    pub fn consume(&mut self, ty: TokenType, message: &str) -> Result<(), CompileError> {
        if self.check(ty) {
            return self.advance();
        }

        Err(self.error_at_current(message))
    }

    /// Builds a parse error pointing at the previous token
    pub fn error_at_previous(&self, message: &str) -> CompileError {
        // The parser never reports against `previous` before consuming at
        // least one token, so it is safe to unwrap here.
        self.construct_error(self.previous.as_ref().unwrap(), message)
    }

    /// Builds a parse error pointing at the current token
    pub fn error_at_current(&self, message: &str) -> CompileError {
        self.construct_error(self.current.as_ref().unwrap(), message)
    }

    fn construct_error(&self, token: &Token, message: &str) -> CompileError {
        // An Eof token has no lexeme worth printing; the message says
        // "at end" instead.
        let lexeme = if token.ty == TokenType::Eof {
            None
        } else {
            Some(token.as_str(self.scanner.source).to_owned())
        };

        CompileError::Parse {
            line: token.line,
            lexeme,
            message: message.to_owned(),
        }
    }
}
