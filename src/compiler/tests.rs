use crate::{
    chunk::{Chunk, OpCode},
    compiler::{compile, errors::CompileErrors},
    value::Value,
};

fn compile_ok(source: &str) -> Chunk {
    compile(source).expect("program should compile")
}

fn compile_err(source: &str) -> CompileErrors {
    compile(source).expect_err("program should not compile")
}

#[test]
fn arithmetic_expression_statement() {
    let chunk = compile_ok("1 + 2;");
    let expected = vec![
        OpCode::Constant8 as u8,
        0, // index of 1 in the constant pool
        OpCode::Constant8 as u8,
        1, // index of 2 in the constant pool
        OpCode::Add as u8,
        // Expression statements discard their result
        OpCode::Pop as u8,
        OpCode::Return as u8,
    ];
    assert_eq!(chunk.code, expected);
    assert_eq!(chunk.constant(0), Some(&Value::Number(1.0)));
    assert_eq!(chunk.constant(1), Some(&Value::Number(2.0)));
}

#[test]
fn instruction_walk_reports_offsets_and_lines() {
    let chunk = compile_ok("1+2;");

    let decoded: Vec<_> = chunk
        .instructions()
        .map(|(offset, opcode, line)| (offset, opcode.unwrap(), line))
        .collect();

    assert_eq!(
        decoded,
        vec![
            (0, OpCode::Constant8, 1),
            (2, OpCode::Constant8, 1),
            (4, OpCode::Add, 1),
            (5, OpCode::Pop, 1),
            (6, OpCode::Return, 1),
        ]
    );

    // Every byte of the encoded stream belongs to line 1
    for offset in 0..chunk.len() {
        assert_eq!(chunk.line_at(offset), Some(1));
    }
}

#[test]
fn var_declaration_without_initializer() {
    let chunk = compile_ok("var a;");
    let expected = vec![
        // No initializer, so the variable is defined nil-valued directly,
        // with no stack traffic
        OpCode::NdfGlobal8 as u8,
        0, // index of the name "a"
        OpCode::Return as u8,
    ];
    assert_eq!(chunk.code, expected);
    assert_eq!(chunk.constant(0), Some(&Value::from("a")));
}

#[test]
fn var_declaration_with_initializer() {
    let chunk = compile_ok("var a = 10 + 20;");
    let expected = vec![
        OpCode::Constant8 as u8,
        1, // 10: the name "a" was interned first, at index 0
        OpCode::Constant8 as u8,
        2, // 20
        OpCode::Add as u8,
        OpCode::DefGlobal8 as u8,
        0, // index of the name "a"
        OpCode::Return as u8,
    ];
    assert_eq!(chunk.code, expected);
}

#[test]
fn assignment_keeps_value_on_stack() {
    let chunk = compile_ok("a = 2;");
    let expected = vec![
        OpCode::Constant8 as u8,
        1, // 2; "a" sits at index 0
        OpCode::SetGlobal8 as u8,
        0,
        // Assignment is an expression, the statement pops its value
        OpCode::Pop as u8,
        OpCode::Return as u8,
    ];
    assert_eq!(chunk.code, expected);
}

#[test]
fn print_statement() {
    let chunk = compile_ok("print x;");
    let expected = vec![
        OpCode::GetGlobal8 as u8,
        0,
        OpCode::Print as u8,
        OpCode::Return as u8,
    ];
    assert_eq!(chunk.code, expected);
}

#[test]
fn return_statement_ends_chunk_early() {
    let chunk = compile_ok("return;");
    assert_eq!(
        chunk.code,
        vec![OpCode::Return as u8, OpCode::Return as u8]
    );
}

#[test]
fn string_literal_drops_quotes() {
    let chunk = compile_ok("\"hi\";");
    assert_eq!(chunk.constant(0), Some(&Value::from("hi")));
}

#[test]
fn comparison_operators_have_dedicated_opcodes() {
    let chunk = compile_ok("1 <= 2;");
    assert_eq!(
        chunk.code,
        vec![
            OpCode::Constant8 as u8,
            0,
            OpCode::Constant8 as u8,
            1,
            OpCode::LessEqual as u8,
            OpCode::Pop as u8,
            OpCode::Return as u8,
        ]
    );

    let chunk = compile_ok("1 != 2;");
    assert_eq!(chunk.code[4], OpCode::NotEqual as u8);
}

#[test]
fn logical_and_short_circuits_over_the_right_operand() {
    let chunk = compile_ok("true and false;");
    let expected = vec![
        OpCode::True as u8,
        OpCode::JumpIfFalse as u8,
        2, // skip the Pop and False below, little-endian
        0,
        OpCode::Pop as u8,
        OpCode::False as u8,
        OpCode::Pop as u8,
        OpCode::Return as u8,
    ];
    assert_eq!(chunk.code, expected);
}

#[test]
fn logical_or_jumps_on_truthy() {
    let chunk = compile_ok("false or true;");
    let expected = vec![
        OpCode::False as u8,
        OpCode::JumpIfTrue as u8,
        2,
        0,
        OpCode::Pop as u8,
        OpCode::True as u8,
        OpCode::Pop as u8,
        OpCode::Return as u8,
    ];
    assert_eq!(chunk.code, expected);
}

#[test]
fn unary_operators() {
    let chunk = compile_ok("!(-1 == 2);");
    assert_eq!(
        chunk.code,
        vec![
            OpCode::Constant8 as u8,
            0,
            OpCode::Negate as u8,
            OpCode::Constant8 as u8,
            1,
            OpCode::Equal as u8,
            OpCode::Not as u8,
            OpCode::Pop as u8,
            OpCode::Return as u8,
        ]
    );
}

#[test]
fn line_numbers_follow_statements() {
    let chunk = compile_ok("1;\n2;");
    // Constant8 + operand + Pop on line 1, the same plus Return on line 2
    assert_eq!(chunk.line_at(0), Some(1));
    assert_eq!(chunk.line_at(2), Some(1));
    assert_eq!(chunk.line_at(3), Some(2));
    assert_eq!(chunk.line_at(chunk.len() - 1), Some(2));
}

#[test]
fn wide_constant_indices_use_wider_opcodes() {
    // 300 distinct literals overflow the 1-byte operand range; the emitter
    // must switch to the 16-bit family member on its own
    let source: String = (0..300).map(|i| format!("{i};")).collect();
    let chunk = compile_ok(&source);

    assert_eq!(chunk.constants_len(), 300);
    assert!(
        chunk
            .instructions()
            .any(|(_, opcode, _)| opcode == Ok(OpCode::Constant16))
    );
}

#[test]
fn missing_semicolon_is_a_compile_error() {
    let errors = compile_err("var a = 1 a = 2;");
    assert_eq!(errors.len(), 1);
    let message = errors.to_string();
    assert!(message.contains("[line 1]"));
    assert!(message.contains("Expected ';'"));
}

#[test]
fn invalid_assignment_target() {
    let errors = compile_err("(1 + 2) = 3;");
    assert!(errors.to_string().contains("Invalid assignment target."));
}

#[test]
fn missing_expression() {
    let errors = compile_err("print ;");
    assert!(errors.to_string().contains("Expected expression."));
}

#[test]
fn panic_mode_recovers_and_reports_several_errors() {
    let errors = compile_err("var; print;");
    assert_eq!(errors.len(), 2);
    let rendered: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
    assert!(rendered[0].contains("Expected variable name."));
    assert!(rendered[1].contains("Expected expression."));
}

#[test]
fn scan_errors_are_collected_with_parse_errors() {
    let errors = compile_err("var @ = 1;\nprint;");
    assert!(errors.len() >= 2);
    let message = errors.to_string();
    assert!(message.contains("Unexpected character '@'"));
    assert!(message.contains("Expected expression."));
}

#[test]
fn constant_indices_are_contiguous() {
    let chunk = compile_ok("1; 2; 3;");
    assert_eq!(chunk.constants_len(), 3);
    for (index, expected) in [(0, 1.0), (1, 2.0), (2, 3.0)] {
        assert_eq!(chunk.constant(index), Some(&Value::Number(expected)));
    }
}
