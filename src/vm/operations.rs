use crate::{
    chunk::{Chunk, OpCode},
    value::Value,
    vm::{VM, errors::VMError},
};

impl VM {
    /// Performs a two-operand operation. Only called for the opcodes listed
    /// in the match below.
    ///
    /// The right operand was pushed last, so it pops first: for `2 - 1` the
    /// stack holds `[2, 1]` and the subtraction is `left - right`.
    pub(super) fn binary_op(&mut self, chunk: &Chunk, opcode: OpCode) -> Result<(), VMError> {
        let rhs = self.pop(chunk)?;
        let lhs = self.pop(chunk)?;

        let result = match (&lhs, &rhs) {
            (Value::Number(a), Value::Number(b)) => match opcode {
                OpCode::Add => Value::Number(a + b),
                OpCode::Subtract => Value::Number(a - b),
                OpCode::Multiply => Value::Number(a * b),
                OpCode::Divide => Value::Number(a / b),
                OpCode::Less => Value::Bool(a < b),
                OpCode::LessEqual => Value::Bool(a <= b),
                OpCode::Greater => Value::Bool(a > b),
                OpCode::GreaterEqual => Value::Bool(a >= b),
                // No other opcode is routed here
                _ => unreachable!(),
            },
            // Addition doubles as concatenation when both operands are
            // strings. A fresh allocation holds the result; the operands'
            // storage stays shared with wherever else it is referenced.
            (Value::String(a), Value::String(b)) if opcode == OpCode::Add => {
                let mut text = String::with_capacity(a.len() + b.len());
                text.push_str(a);
                text.push_str(b);
                Value::from(text)
            }
            _ => {
                // No coercions, mixed operands are a type error
                let message = if opcode == OpCode::Add {
                    "Operands must be two numbers or two strings."
                } else {
                    "Operands must be numbers."
                };
                return Err(self.construct_runtime_error(chunk, format_args!("{message}")));
            }
        };

        self.push(chunk, result)
    }

    pub(super) fn op_negate(&mut self, chunk: &Chunk) -> Result<(), VMError> {
        let value = self.pop(chunk)?;

        if let Value::Number(n) = value {
            self.push(chunk, Value::Number(-n))
        } else {
            Err(self.construct_runtime_error(chunk, format_args!("Operand must be a number.")))
        }
    }

    /// `!` works on every value through truthiness, there is nothing to
    /// type-check
    pub(super) fn op_not(&mut self, chunk: &Chunk) -> Result<(), VMError> {
        let value = self.pop(chunk)?;
        self.push(chunk, Value::Bool(value.is_falsey()))
    }

    /// Equality over any pair of values. `negate` flips the result for the
    /// dedicated not-equal opcode.
    pub(super) fn op_equal(&mut self, chunk: &Chunk, negate: bool) -> Result<(), VMError> {
        let rhs = self.pop(chunk)?;
        let lhs = self.pop(chunk)?;

        let equal = lhs == rhs;
        self.push(chunk, Value::Bool(equal != negate))
    }
}
