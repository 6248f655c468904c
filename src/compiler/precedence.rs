use crate::{
    compiler::{Compiler, errors::CompileError},
    scanner::token::TokenType,
};

/// `#[repr(u8)]` means its memory layout will be equivalent to a byte.
/// The order of variants matters: precedence climbing compares and
/// increments these as numbers.
#[repr(u8)]
#[derive(Debug, Clone, Copy)]
pub enum Precedence {
    None,
    Assignment, // =
    Or,         // or
    And,        // and
    Equality,   // == !=
    Comparison, // < > <= >=
    Term,       // + -
    Factor,     // * /
    Unary,      // ! -
    Primary,
}

/// Converts a byte back to a `Precedence`, for the `precedence + 1` step in
/// binary expressions.
impl From<u8> for Precedence {
    fn from(value: u8) -> Self {
        match value {
            0 => Self::None,
            1 => Self::Assignment,
            2 => Self::Or,
            3 => Self::And,
            4 => Self::Equality,
            5 => Self::Comparison,
            6 => Self::Term,
            7 => Self::Factor,
            8 => Self::Unary,
            9 => Self::Primary,
            _ => unreachable!(),
        }
    }
}

/// A pointer to a parse method on `Compiler`. The `bool` is `can_assign`:
/// whether an `=` after the parsed expression would be a valid assignment.
pub type ParseFn<'a> = Option<fn(&mut Compiler<'a>, bool) -> Result<(), CompileError>>;

/// Prefix and infix rules for one token type, plus the precedence the token
/// has when it appears in infix position.
#[derive(Clone, Copy)]
pub struct ParseRule<'a> {
    pub prefix: ParseFn<'a>,
    pub infix: ParseFn<'a>,
    pub precedence: Precedence,
}

impl<'a> ParseRule<'a> {
    /// All the rules, one per token type. The table is accessed by index,
    /// so the order here must stay the same as the order of `TokenType`
    /// variants.
    fn get_rules() -> [ParseRule<'a>; 31] {
        [
            // TokenType::LeftParen
            ParseRule {
                // '(' starts a grouping. It needs no left operand, so it is
                // a prefix rule; the precedence belongs to the inner
                // expression, not the token.
                prefix: Some(Compiler::grouping),
                infix: None,
                precedence: Precedence::None,
            },
            // TokenType::RightParen
            ParseRule {
                prefix: None,
                infix: None,
                precedence: Precedence::None,
            },
            // TokenType::LeftBrace
            ParseRule {
                prefix: None,
                infix: None,
                precedence: Precedence::None,
            },
            // TokenType::RightBrace
            ParseRule {
                prefix: None,
                infix: None,
                precedence: Precedence::None,
            },
            // TokenType::Comma
            ParseRule {
                prefix: None,
                infix: None,
                precedence: Precedence::None,
            },
            // TokenType::Dot
            ParseRule {
                prefix: None,
                infix: None,
                precedence: Precedence::None,
            },
            // TokenType::Minus
            ParseRule {
                // With one operand it's a prefix rule (negation), with two
                // it's an infix rule (subtraction)
                prefix: Some(Compiler::unary),
                infix: Some(Compiler::binary),
                precedence: Precedence::Term,
            },
            // TokenType::Plus
            ParseRule {
                prefix: None,
                // Only a binary operation
                infix: Some(Compiler::binary),
                precedence: Precedence::Term,
            },
            // TokenType::Semicolon
            ParseRule {
                prefix: None,
                infix: None,
                precedence: Precedence::None,
            },
            // TokenType::Slash
            ParseRule {
                prefix: None,
                infix: Some(Compiler::binary),
                precedence: Precedence::Factor,
            },
            // TokenType::Star
            ParseRule {
                prefix: None,
                infix: Some(Compiler::binary),
                precedence: Precedence::Factor,
            },
            // TokenType::Bang
            ParseRule {
                prefix: Some(Compiler::unary),
                infix: None,
                precedence: Precedence::None,
            },
            // TokenType::BangEqual
            ParseRule {
                prefix: None,
                infix: Some(Compiler::binary),
                precedence: Precedence::Equality,
            },
            // TokenType::Equal
            ParseRule {
                prefix: None,
                infix: None,
                precedence: Precedence::None,
            },
            // TokenType::EqualEqual
            ParseRule {
                prefix: None,
                infix: Some(Compiler::binary),
                precedence: Precedence::Equality,
            },
            // TokenType::Greater
            ParseRule {
                prefix: None,
                infix: Some(Compiler::binary),
                precedence: Precedence::Comparison,
            },
            // TokenType::GreaterEqual
            ParseRule {
                prefix: None,
                infix: Some(Compiler::binary),
                precedence: Precedence::Comparison,
            },
            // TokenType::Less
            ParseRule {
                prefix: None,
                infix: Some(Compiler::binary),
                precedence: Precedence::Comparison,
            },
            // TokenType::LessEqual
            ParseRule {
                prefix: None,
                infix: Some(Compiler::binary),
                precedence: Precedence::Comparison,
            },
            // TokenType::Identifier
            ParseRule {
                prefix: Some(Compiler::variable),
                infix: None,
                precedence: Precedence::None,
            },
            // TokenType::String
            ParseRule {
                prefix: Some(Compiler::string),
                infix: None,
                precedence: Precedence::None,
            },
            // TokenType::Number
            ParseRule {
                prefix: Some(Compiler::number),
                infix: None,
                precedence: Precedence::None,
            },
            // TokenType::And
            ParseRule {
                prefix: None,
                // Short-circuits, so it has its own rule instead of the
                // generic binary one
                infix: Some(Compiler::logical_and),
                precedence: Precedence::And,
            },
            // TokenType::False
            ParseRule {
                prefix: Some(Compiler::literal),
                infix: None,
                precedence: Precedence::None,
            },
            // TokenType::Nil
            ParseRule {
                prefix: Some(Compiler::literal),
                infix: None,
                precedence: Precedence::None,
            },
            // TokenType::Or
            ParseRule {
                prefix: None,
                infix: Some(Compiler::logical_or),
                precedence: Precedence::Or,
            },
            // TokenType::Print
            ParseRule {
                prefix: None,
                infix: None,
                precedence: Precedence::None,
            },
            // TokenType::Return
            ParseRule {
                prefix: None,
                infix: None,
                precedence: Precedence::None,
            },
            // TokenType::True
            ParseRule {
                prefix: Some(Compiler::literal),
                infix: None,
                precedence: Precedence::None,
            },
            // TokenType::Var
            ParseRule {
                prefix: None,
                infix: None,
                precedence: Precedence::None,
            },
            // TokenType::Eof
            ParseRule {
                prefix: None,
                infix: None,
                precedence: Precedence::None,
            },
        ]
    }

    /// Returns the rule for a token type. The variant order of `TokenType`
    /// matches the table order, so the type is usable as an index.
    pub fn get_parse_rule(ty: TokenType) -> ParseRule<'a> {
        let rules = Self::get_rules();
        rules[ty as usize]
    }
}
