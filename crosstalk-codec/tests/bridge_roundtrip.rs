//! Round-trip tests for the generic serde bridge.
//!
//! Derived records, optionals, enums, nested and recursive shapes all go
//! through `to_bytes`/`from_bytes`; the wire stays interchangeable with the
//! dynamic `Value` path throughout.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crosstalk_codec::{from_bytes, to_bytes, Codec, MessageCodec, StandardCodec, Value, WireError};

fn roundtrip<T>(value: T)
where
    T: Serialize + serde::de::DeserializeOwned + PartialEq + std::fmt::Debug,
{
    let bytes = to_bytes(&value).expect("encode");
    let back: T = from_bytes(&bytes).expect("decode");
    assert_eq!(back, value);
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
struct Viewport {
    width: u32,
    height: u32,
    title: String,
    fullscreen: bool,
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct Frame {
    viewport: Viewport,
    scale: f64,
    monitor: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
enum PointerEvent {
    Idle,
    Moved { x: f64, y: f64 },
    Pressed(u8),
    Batch(Vec<PointerEvent>),
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct TreeNode {
    label: String,
    child: Option<Box<TreeNode>>,
}

#[test]
fn test_scalar_roundtrips() {
    roundtrip(true);
    roundtrip(false);
    roundtrip(-5i8);
    roundtrip(1000i16);
    roundtrip(i32::MIN);
    roundtrip(i64::MAX);
    roundtrip(250u8);
    roundtrip(u16::MAX);
    roundtrip(u32::MAX);
    roundtrip(u64::MAX);
    roundtrip(2.5f64);
    roundtrip('é');
    roundtrip("multi-byte: ωΩ 🚀".to_string());
}

#[test]
fn test_f32_survives_promotion() {
    // f32 rides the wire as float64; narrowing back is exact for any f32.
    roundtrip(3.14159f32);
    roundtrip(f32::MAX);
    roundtrip(f32::MIN_POSITIVE);
}

#[test]
fn test_derived_struct_roundtrip() {
    roundtrip(Frame {
        viewport: Viewport {
            width: 1280,
            height: 720,
            title: "main".to_string(),
            fullscreen: false,
        },
        scale: 2.0,
        monitor: None,
    });
}

#[test]
fn test_struct_encodes_as_map() {
    let viewport = Viewport {
        width: 1,
        height: 2,
        title: "t".to_string(),
        fullscreen: true,
    };
    let bytes = to_bytes(&viewport).expect("encode");
    let dynamic = StandardCodec.decode_message(&bytes).expect("decode");
    let entries = dynamic.as_map().expect("map");
    assert_eq!(entries.len(), 4);
    assert_eq!(entries.get(&Value::from("width")), Some(&Value::I32(1)));
    assert_eq!(
        entries.get(&Value::from("fullscreen")),
        Some(&Value::Bool(true))
    );
}

#[test]
fn test_enum_roundtrips() {
    roundtrip(PointerEvent::Idle);
    roundtrip(PointerEvent::Moved { x: 1.0, y: -2.0 });
    roundtrip(PointerEvent::Pressed(3));
    roundtrip(PointerEvent::Batch(vec![
        PointerEvent::Idle,
        PointerEvent::Moved { x: 0.0, y: 0.0 },
    ]));
}

#[test]
fn test_unit_variant_is_a_bare_string() {
    let bytes = to_bytes(&PointerEvent::Idle).expect("encode");
    assert_eq!(
        StandardCodec.decode_message(&bytes).expect("decode"),
        Value::from("Idle")
    );
}

#[test]
fn test_recursive_type_roundtrip() {
    let chain = TreeNode {
        label: "root".to_string(),
        child: Some(Box::new(TreeNode {
            label: "leaf".to_string(),
            child: None,
        })),
    };
    roundtrip(chain);
}

#[test]
fn test_tuples_and_sequences() {
    roundtrip((1i32, "two".to_string(), 3.0f64));
    roundtrip(vec![1i64, 2, 3]);
    roundtrip(vec!["a".to_string(), "b".to_string()]);
    roundtrip(Vec::<i32>::new());
}

#[test]
fn test_tuple_length_mismatch_fails() {
    let bytes = to_bytes(&(1i32, 2i32, 3i32)).expect("encode");
    let result: Result<(i32, i32), WireError> = from_bytes(&bytes);
    assert!(matches!(result, Err(WireError::Message(_))));
}

#[test]
fn test_hash_map_roundtrip() {
    let mut scores: HashMap<String, i32> = HashMap::new();
    scores.insert("alpha".to_string(), 1);
    scores.insert("beta".to_string(), -1);
    roundtrip(scores);
}

#[test]
fn test_value_rides_inside_derived_records() {
    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    struct Event {
        name: String,
        payload: Value,
    }

    let mut map = HashMap::new();
    map.insert(Value::from("samples"), Value::F64List(vec![0.5, 1.5]));
    for payload in [
        Value::Nil,
        Value::I32List(vec![1, 2, 3]),
        Value::I64List(vec![i64::MIN]),
        Value::F32List(vec![-1.0, 1.0]),
        Value::U8List(vec![9, 8]),
        Value::Map(map),
        Value::List(vec![Value::Bool(true), Value::F64List(vec![2.0])]),
    ] {
        roundtrip(Event {
            name: "probe".to_string(),
            payload,
        });
    }
}

#[test]
fn test_value_roundtrip_through_generic_codec() {
    let codec = StandardCodec;
    let value = Value::List(vec![
        Value::I32List(vec![10, 20]),
        Value::from("typed arrays survive the bridge"),
    ]);
    let bytes = codec.encode(&value).expect("encode");
    let back: Value = codec.decode(&bytes).expect("decode");
    assert_eq!(back, value);
    // And the bytes are the same ones the dynamic path produces.
    assert_eq!(bytes, codec.encode_message(&value).expect("encode"));
}

#[test]
fn test_bytes_decode_into_plain_vec() {
    // A wire byte array deserializes into Vec<u8> through the sequence path.
    let bytes = StandardCodec
        .encode_message(&Value::U8List(vec![5, 6, 7]))
        .expect("encode");
    let back: Vec<u8> = from_bytes(&bytes).expect("decode");
    assert_eq!(back, vec![5, 6, 7]);
}

#[test]
fn test_typed_wire_arrays_decode_into_vecs() {
    let bytes = StandardCodec
        .encode_message(&Value::F64List(vec![0.25, -0.25]))
        .expect("encode");
    let back: Vec<f64> = from_bytes(&bytes).expect("decode");
    assert_eq!(back, vec![0.25, -0.25]);

    let bytes = StandardCodec
        .encode_message(&Value::I32List(vec![7, 8]))
        .expect("encode");
    let back: Vec<i32> = from_bytes(&bytes).expect("decode");
    assert_eq!(back, vec![7, 8]);
}

#[test]
fn test_narrowing_matrix() {
    let encoded_i64 = to_bytes(&0xFFFF_FFFF_FFFF_FFFAu64).expect("encode");
    // As i64 the bits read back as -6; as u8 they do not fit.
    assert_eq!(from_bytes::<i64>(&encoded_i64).expect("decode"), -6);
    assert!(matches!(
        from_bytes::<u8>(&encoded_i64),
        Err(WireError::IntegerOutOfRange { .. })
    ));

    let encoded_small = to_bytes(&200i64).expect("encode");
    assert_eq!(from_bytes::<u8>(&encoded_small).expect("decode"), 200u8);
    assert!(matches!(
        from_bytes::<i8>(&encoded_small),
        Err(WireError::IntegerOutOfRange { value: 200 })
    ));
}

#[test]
fn test_optionals_and_empty_input() {
    roundtrip(Some(5i32));
    roundtrip(Option::<i32>::None);
    let absent: Option<Viewport> = from_bytes(&[]).expect("decode");
    assert_eq!(absent, None);
}

#[test]
fn test_borrowed_str_decode() {
    let bytes = to_bytes("borrow me").expect("encode");
    let borrowed: &str = from_bytes(&bytes).expect("decode");
    assert_eq!(borrowed, "borrow me");
}

#[test]
fn test_option_inside_struct_uses_nil() {
    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    struct Sparse {
        present: Option<i32>,
        absent: Option<i32>,
    }
    roundtrip(Sparse {
        present: Some(1),
        absent: None,
    });
}
