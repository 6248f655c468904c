use proptest::prelude::*;

use crate::chunk::{Chunk, ChunkError, OpCode, lines::LineTable};
use crate::value::Value;

#[test]
fn single_byte_on_a_single_line() {
    let mut table = LineTable::new();
    table.add(1);
    assert_eq!(table.entries(), &[1]);
    assert_eq!(table.line_at(0), Some(1));
    assert_eq!(table.line_at(1), None);
}

#[test]
fn run_on_one_line_collapses_to_two_entries() {
    let mut table = LineTable::new();
    table.add(1);
    table.add(1);
    table.add(1);
    // Three bytes of line 1 cost two entries no matter the length
    assert_eq!(table.entries(), &[-3, 1]);
    for offset in 0..3 {
        assert_eq!(table.line_at(offset), Some(1));
    }
    assert_eq!(table.line_at(3), None);
}

#[test]
fn line_change_starts_a_new_run() {
    let mut table = LineTable::new();
    table.add(1);
    table.add(1);
    table.add(2);
    assert_eq!(table.entries(), &[-2, 1, 2]);

    table.add(2);
    assert_eq!(table.entries(), &[-2, 1, -2, 2]);

    assert_eq!(table.line_at(0), Some(1));
    assert_eq!(table.line_at(1), Some(1));
    assert_eq!(table.line_at(2), Some(2));
    assert_eq!(table.line_at(3), Some(2));
}

#[test]
fn lone_entry_grows_into_a_run() {
    let mut table = LineTable::new();
    table.add(5);
    table.add(7);
    // Two single-byte entries, no run markers yet
    assert_eq!(table.entries(), &[5, 7]);

    table.add(7);
    // The trailing lone 7 becomes an explicit run of two
    assert_eq!(table.entries(), &[5, -2, 7]);
    assert_eq!(table.line_at(0), Some(5));
    assert_eq!(table.line_at(1), Some(7));
    assert_eq!(table.line_at(2), Some(7));
}

#[test]
fn revisited_line_is_a_fresh_run() {
    let mut table = LineTable::new();
    table.add(1);
    table.add(2);
    table.add(1);
    // Runs never merge across a gap
    assert_eq!(table.entries(), &[1, 2, 1]);
    assert_eq!(table.line_at(2), Some(1));
}

#[test]
fn write_load_picks_width_from_index_magnitude() {
    let mut chunk = Chunk::new();

    chunk.write_load(OpCode::Constant8, 5, 1);
    assert_eq!(chunk.code, vec![OpCode::Constant8 as u8, 5]);

    let mut chunk = Chunk::new();
    chunk.write_load(OpCode::Constant8, 0x012B, 1);
    assert_eq!(
        chunk.code,
        vec![OpCode::Constant16 as u8, 0x2B, 0x01],
        "operand bytes are little-endian"
    );

    let mut chunk = Chunk::new();
    chunk.write_load(OpCode::GetGlobal8, 0x0001_0203, 1);
    assert_eq!(
        chunk.code,
        vec![OpCode::GetGlobal24 as u8, 0x03, 0x02, 0x01]
    );
}

#[test]
fn write_load_records_the_line_for_every_byte() {
    let mut chunk = Chunk::new();
    chunk.write_load(OpCode::Constant8, 0x012B, 3);
    for offset in 0..chunk.len() {
        assert_eq!(chunk.line_at(offset), Some(3));
    }
}

#[test]
fn read_index_reassembles_the_operand() {
    let mut chunk = Chunk::new();
    chunk.write_load(OpCode::Constant8, 0x0001_0203, 1);
    assert_eq!(chunk.read_index(1, 3), Some(0x0001_0203));
    // Reading past the end yields nothing instead of panicking
    assert_eq!(chunk.read_index(2, 3), None);
    assert_eq!(chunk.get(chunk.len()), None);
}

#[test]
fn add_constant_returns_successive_indices() {
    let mut chunk = Chunk::new();
    assert_eq!(chunk.add_constant(Value::Number(1.0)), Ok(0));
    assert_eq!(chunk.add_constant(Value::from("x")), Ok(1));
    assert_eq!(chunk.add_constant(Value::Nil), Ok(2));
    assert_eq!(chunk.constants_len(), 3);
    assert_eq!(chunk.constant(1), Some(&Value::from("x")));
}

#[test]
fn patch_overwrites_a_written_byte() {
    let mut chunk = Chunk::new();
    chunk.write_opcode(OpCode::Jump, 1);
    chunk.write_byte(0xff, 1);
    chunk.write_byte(0xff, 1);

    chunk.patch(1, 0x04);
    chunk.patch(2, 0x00);
    assert_eq!(chunk.read_index(1, 2), Some(4));
}

#[test]
fn instruction_iterator_steps_over_operands() {
    let mut chunk = Chunk::new();
    chunk.write_load(OpCode::Constant8, 0, 1);
    chunk.write_opcode(OpCode::Add, 1);
    chunk.write_opcode(OpCode::Return, 2);

    let decoded: Vec<_> = chunk.instructions().collect();
    assert_eq!(
        decoded,
        vec![
            (0, Ok(OpCode::Constant8), 1),
            (2, Ok(OpCode::Add), 1),
            (3, Ok(OpCode::Return), 2),
        ]
    );
}

#[test]
fn instruction_iterator_survives_junk_bytes() {
    let mut chunk = Chunk::new();
    chunk.write_byte(0xC8, 1);
    chunk.write_opcode(OpCode::Return, 1);

    let decoded: Vec<_> = chunk.instructions().collect();
    assert_eq!(decoded.len(), 2);
    assert_eq!(decoded[0].1, Err(ChunkError::InvalidOpCode(0xC8)));
    assert_eq!(decoded[1].1, Ok(OpCode::Return));
}

proptest! {
    /// For any emitted sequence of (line, run) pairs, looking up any byte
    /// offset must return the line it was recorded under.
    #[test]
    fn line_lookup_matches_emission(runs in prop::collection::vec((1i32..200, 1usize..8), 1..40)) {
        let mut table = LineTable::new();
        let mut expected = Vec::new();
        for (line, count) in &runs {
            for _ in 0..*count {
                table.add(*line);
                expected.push(*line);
            }
        }

        for (offset, line) in expected.iter().enumerate() {
            prop_assert_eq!(table.line_at(offset), Some(*line));
        }
        prop_assert_eq!(table.line_at(expected.len()), None);
    }

    /// Constant indices handed out by the pool are dense: 0..n-1 in
    /// emission order.
    #[test]
    fn constant_indices_are_dense(values in prop::collection::vec(any::<f64>(), 0..50)) {
        let mut chunk = Chunk::new();
        for (i, v) in values.iter().enumerate() {
            prop_assert_eq!(chunk.add_constant(Value::Number(*v)), Ok(i));
        }
    }

    /// Values equal themselves, except NaN, which follows IEEE.
    #[test]
    fn values_equal_themselves(v in any::<f64>()) {
        prop_assume!(!v.is_nan());
        let value = Value::Number(v);
        prop_assert_eq!(&value, &value);
    }
}
