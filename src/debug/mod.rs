/// Human-readable dumps of compiled chunks. Used by the execution tracer
/// and available for poking at compiler output.
use std::fmt::Write as _;

use crate::chunk::{Chunk, OpCode};

/// Struct doesn't have any properties, it only namespaces the functions
pub struct Debug;

impl Debug {
    /// Renders a whole chunk, one line per instruction, under a header.
    /// The result is a pure function of the chunk's bytes: same chunk,
    /// same text.
    pub fn disassemble_chunk(chunk: &Chunk, name: &str) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "== {name} ==");

        let mut offset = 0;
        while offset < chunk.len() {
            offset = Self::disassemble_instruction(chunk, offset, &mut out);
        }

        out
    }

    /// Appends one decoded instruction to `out` and returns the offset of
    /// the next one
    pub fn disassemble_instruction(chunk: &Chunk, offset: usize, out: &mut String) -> usize {
        let _ = write!(out, "{offset:04} ");

        // Instructions on the same line as their predecessor print a '|'
        // instead of repeating the number
        let line = chunk.line_at(offset).unwrap_or(0);
        if offset > 0 && chunk.line_at(offset - 1) == Some(line) {
            let _ = write!(out, "   | ");
        } else {
            let _ = write!(out, "{line: >4} ");
        }

        let Some(instruction) = chunk.get(offset) else {
            let _ = writeln!(out, "<end of chunk>");
            return offset + 1;
        };

        match OpCode::try_from(instruction) {
            Ok(opcode) => match opcode {
                OpCode::Constant8
                | OpCode::Constant16
                | OpCode::Constant24
                | OpCode::NdfGlobal8
                | OpCode::NdfGlobal16
                | OpCode::NdfGlobal24
                | OpCode::DefGlobal8
                | OpCode::DefGlobal16
                | OpCode::DefGlobal24
                | OpCode::GetGlobal8
                | OpCode::GetGlobal16
                | OpCode::GetGlobal24
                | OpCode::SetGlobal8
                | OpCode::SetGlobal16
                | OpCode::SetGlobal24 => Self::constant_instruction(opcode, chunk, offset, out),
                OpCode::Jump | OpCode::JumpIfFalse | OpCode::JumpIfTrue => {
                    Self::jump_instruction(opcode, chunk, offset, out)
                }
                _ => Self::simple_instruction(opcode, offset, out),
            },
            Err(_) => {
                let _ = writeln!(out, "Unknown opcode {instruction}");
                offset + 1
            }
        }
    }

    /// Prints an instruction without operands and returns the new offset
    fn simple_instruction(opcode: OpCode, offset: usize, out: &mut String) -> usize {
        let _ = writeln!(out, "{}", Self::name(opcode));
        offset + 1
    }

    /// Prints a constant-bearing instruction: mnemonic, pool index, and the
    /// referenced value in quotes
    fn constant_instruction(opcode: OpCode, chunk: &Chunk, offset: usize, out: &mut String) -> usize {
        let width = opcode.operand_width();

        match chunk.read_index(offset + 1, width) {
            Some(index) => {
                let _ = write!(out, "{: <16} {index: >4} '", Self::name(opcode));
                match chunk.constant(index) {
                    Some(value) => {
                        let _ = writeln!(out, "{value}'");
                    }
                    None => {
                        let _ = writeln!(out, "<no such constant>'");
                    }
                }
            }
            None => {
                let _ = writeln!(out, "{: <16} <truncated>", Self::name(opcode));
            }
        }

        offset + 1 + width
    }

    /// Prints a jump with its origin and resolved target offsets
    fn jump_instruction(opcode: OpCode, chunk: &Chunk, offset: usize, out: &mut String) -> usize {
        match chunk.read_index(offset + 1, 2) {
            Some(jump) => {
                let target = offset + 3 + jump;
                let _ = writeln!(out, "{: <16} {offset: >4} -> {target}", Self::name(opcode));
            }
            None => {
                let _ = writeln!(out, "{: <16} <truncated>", Self::name(opcode));
            }
        }

        offset + 3
    }

    fn name(opcode: OpCode) -> &'static str {
        match opcode {
            OpCode::Nop => "OpNop",
            OpCode::Constant8 => "OpConstant8",
            OpCode::Constant16 => "OpConstant16",
            OpCode::Constant24 => "OpConstant24",
            OpCode::NdfGlobal8 => "OpNdfGlobal8",
            OpCode::NdfGlobal16 => "OpNdfGlobal16",
            OpCode::NdfGlobal24 => "OpNdfGlobal24",
            OpCode::DefGlobal8 => "OpDefGlobal8",
            OpCode::DefGlobal16 => "OpDefGlobal16",
            OpCode::DefGlobal24 => "OpDefGlobal24",
            OpCode::GetGlobal8 => "OpGetGlobal8",
            OpCode::GetGlobal16 => "OpGetGlobal16",
            OpCode::GetGlobal24 => "OpGetGlobal24",
            OpCode::SetGlobal8 => "OpSetGlobal8",
            OpCode::SetGlobal16 => "OpSetGlobal16",
            OpCode::SetGlobal24 => "OpSetGlobal24",
            OpCode::Nil => "OpNil",
            OpCode::True => "OpTrue",
            OpCode::False => "OpFalse",
            OpCode::Equal => "OpEqual",
            OpCode::NotEqual => "OpNotEqual",
            OpCode::Less => "OpLess",
            OpCode::LessEqual => "OpLessEqual",
            OpCode::Greater => "OpGreater",
            OpCode::GreaterEqual => "OpGreaterEqual",
            OpCode::Add => "OpAdd",
            OpCode::Subtract => "OpSubtract",
            OpCode::Multiply => "OpMultiply",
            OpCode::Divide => "OpDivide",
            OpCode::Negate => "OpNegate",
            OpCode::Not => "OpNot",
            OpCode::Print => "OpPrint",
            OpCode::Pop => "OpPop",
            OpCode::Jump => "OpJump",
            OpCode::JumpIfFalse => "OpJumpIfFalse",
            OpCode::JumpIfTrue => "OpJumpIfTrue",
            OpCode::Return => "OpReturn",
        }
    }
}
