//! Wire-format conformance tests for the standard codec.
//!
//! These pin the byte-exact layout the external format fixes: tag values,
//! size encoding branches, alignment, and the malformed-input failures.

use std::collections::HashMap;

use crosstalk_codec::{
    DecodingState, EncodingState, FieldTag, MessageCodec, StandardCodec, Value, WireError,
    MAX_DEPTH,
};

fn encode(value: &Value) -> Vec<u8> {
    StandardCodec.encode_message(value).expect("encode")
}

fn decode(bytes: &[u8]) -> Value {
    StandardCodec.decode_message(bytes).expect("decode")
}

fn roundtrip(value: Value) {
    assert_eq!(decode(&encode(&value)), value, "round-trip of {value:?}");
}

#[test]
fn test_boolean_and_nil_vectors() {
    assert_eq!(encode(&Value::Bool(true)), vec![0x01]);
    assert_eq!(encode(&Value::Bool(false)), vec![0x02]);
    assert_eq!(encode(&Value::Nil), vec![0x00]);
}

#[test]
fn test_int32_vector() {
    assert_eq!(
        encode(&Value::I32(0x12345678)),
        vec![0x03, 0x78, 0x56, 0x34, 0x12]
    );
}

#[test]
fn test_int64_vector() {
    let mut expected = vec![0x04];
    expected.extend_from_slice(&(-2i64).to_le_bytes());
    assert_eq!(encode(&Value::I64(-2)), expected);
}

#[test]
fn test_string_vector() {
    let mut expected = vec![0x07, 0x0b];
    expected.extend_from_slice(b"hello world");
    assert_eq!(encode(&Value::from("hello world")), expected);
}

#[test]
fn test_float64_payload_is_eight_aligned() {
    let bytes = encode(&Value::F64(2.0));
    assert_eq!(bytes[0], 0x06);
    assert_eq!(&bytes[1..8], &[0u8; 7], "padding up to offset 8");
    assert_eq!(&bytes[8..16], &2.0f64.to_le_bytes());
}

#[test]
fn test_float64_alignment_after_string() {
    // A variable-length string in front shifts the float payload; the
    // padding must still land it on a multiple of 8 from buffer start.
    for text in ["", "a", "abcdef", "twelve chars"] {
        let value = Value::List(vec![Value::from(text), Value::F64(1.25)]);
        let bytes = encode(&value);
        let payload_offset = bytes.len() - 8;
        assert_eq!(payload_offset % 8, 0, "string {text:?}");
        assert_eq!(&bytes[payload_offset..], &1.25f64.to_le_bytes());
        roundtrip(value);
    }
}

#[test]
fn test_size_boundaries_roundtrip() {
    for len in [0usize, 1, 253, 254, 255, 65535, 65536] {
        roundtrip(Value::U8List(vec![0xAB; len]));
    }
}

#[test]
fn test_size_boundary_prefixes() {
    let bytes = encode(&Value::U8List(vec![0; 253]));
    assert_eq!(bytes[1], 253);
    let bytes = encode(&Value::U8List(vec![0; 254]));
    assert_eq!(&bytes[1..4], &[0xFE, 0xFE, 0x00]);
    let bytes = encode(&Value::U8List(vec![0; 65535]));
    assert_eq!(&bytes[1..4], &[0xFE, 0xFF, 0xFF]);
    let bytes = encode(&Value::U8List(vec![0; 65536]));
    assert_eq!(&bytes[1..6], &[0xFF, 0x00, 0x00, 0x01, 0x00]);
}

#[test]
fn test_typed_array_layouts() {
    // tag, size, padding to element width, raw little-endian elements
    let bytes = encode(&Value::I32List(vec![1, -1]));
    assert_eq!(bytes[0], 0x09);
    assert_eq!(bytes[1], 2);
    assert_eq!(&bytes[2..4], &[0, 0], "padding from offset 2 to 4");
    assert_eq!(&bytes[4..8], &1i32.to_le_bytes());
    assert_eq!(&bytes[8..12], &(-1i32).to_le_bytes());

    let bytes = encode(&Value::F32List(vec![0.5]));
    assert_eq!(bytes[0], 0x0E);
    assert_eq!(&bytes[4..8], &0.5f32.to_le_bytes());

    let bytes = encode(&Value::I64List(vec![7]));
    assert_eq!(bytes[0], 0x0A);
    assert_eq!(&bytes[8..16], &7i64.to_le_bytes());

    let bytes = encode(&Value::F64List(vec![-0.25]));
    assert_eq!(bytes[0], 0x0B);
    assert_eq!(&bytes[8..16], &(-0.25f64).to_le_bytes());
}

#[test]
fn test_roundtrip_every_variant() {
    roundtrip(Value::Nil);
    roundtrip(Value::Bool(true));
    roundtrip(Value::Bool(false));
    roundtrip(Value::I32(i32::MIN));
    roundtrip(Value::I64(i64::MAX));
    roundtrip(Value::F64(std::f64::consts::PI));
    roundtrip(Value::from("héllo wörld 👋"));
    roundtrip(Value::U8List(vec![0, 127, 255]));
    roundtrip(Value::I32List(vec![i32::MIN, 0, i32::MAX]));
    roundtrip(Value::I64List(vec![i64::MIN, 0, i64::MAX]));
    roundtrip(Value::F32List(vec![f32::MIN_POSITIVE, -1.5]));
    roundtrip(Value::F64List(vec![f64::EPSILON, 1e300]));
    roundtrip(Value::List(vec![]));
    roundtrip(Value::Map(HashMap::new()));
}

#[test]
fn test_roundtrip_nested_composite() {
    let mut inner = HashMap::new();
    inner.insert(Value::from("xs"), Value::I32List(vec![3, 1, 4]));
    inner.insert(Value::I32(9), Value::Nil);
    inner.insert(
        Value::Bool(false),
        Value::List(vec![Value::F64(0.5), Value::from("nested")]),
    );
    let value = Value::List(vec![
        Value::Map(inner),
        Value::U8List(vec![1, 2, 3]),
        Value::from("tail"),
    ]);
    roundtrip(value);
}

#[test]
fn test_empty_input_decodes_as_nil() {
    assert_eq!(decode(&[]), Value::Nil);
}

#[test]
fn test_unknown_tag_fails() {
    let mut state = DecodingState::new(&[0x0F]);
    assert!(matches!(
        state.read_value(),
        Err(WireError::UnknownFieldTag { tag: 0x0F })
    ));
}

#[test]
fn test_truncated_payloads_fail() {
    // int32 tag with 3 payload bytes
    let mut state = DecodingState::new(&[0x03, 1, 2, 3]);
    assert!(matches!(
        state.read_value(),
        Err(WireError::UnexpectedEof)
    ));

    // string promising 5 bytes with 2 present
    let mut state = DecodingState::new(&[0x07, 5, b'h', b'i']);
    assert!(matches!(
        state.read_value(),
        Err(WireError::UnexpectedEof)
    ));

    // list promising one element with none present
    let mut state = DecodingState::new(&[0x0C, 1]);
    assert!(matches!(
        state.read_value(),
        Err(WireError::UnexpectedEof)
    ));
}

#[test]
fn test_deeply_nested_input_is_bounded() {
    let mut bytes = Vec::new();
    for _ in 0..(MAX_DEPTH * 2) {
        bytes.push(FieldTag::List.as_byte());
        bytes.push(1);
    }
    bytes.push(FieldTag::Nil.as_byte());
    let mut state = DecodingState::new(&bytes);
    assert!(matches!(
        state.read_value(),
        Err(WireError::DepthLimitExceeded { .. })
    ));
}

#[test]
fn test_map_entry_order_does_not_change_bytes() {
    let mut forward = HashMap::new();
    let mut reverse = HashMap::new();
    for i in 0..32 {
        forward.insert(Value::I32(i), Value::from(format!("v{i}")));
    }
    for i in (0..32).rev() {
        reverse.insert(Value::I32(i), Value::from(format!("v{i}")));
    }
    assert_eq!(encode(&Value::Map(forward)), encode(&Value::Map(reverse)));
}

#[test]
fn test_writer_reader_primitive_symmetry() {
    let mut writer = EncodingState::new();
    writer.write_bool(true);
    writer.write_i32(-42);
    writer.write_string("mid").expect("write");
    writer.write_f64(6.5);
    writer.write_i64(1 << 40);
    let bytes = writer.into_bytes();

    let mut reader = DecodingState::new(&bytes);
    assert!(reader.read_bool().expect("bool"));
    assert_eq!(reader.read_i32().expect("i32"), -42);
    assert_eq!(reader.read_string().expect("string"), "mid");
    assert_eq!(reader.read_f64().expect("f64"), 6.5);
    assert_eq!(reader.read_i64().expect("i64"), 1 << 40);
    assert!(reader.is_at_end());
}
