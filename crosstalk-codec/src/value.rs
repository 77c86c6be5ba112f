//! Dynamic value model mirroring the wire format.
//!
//! [`Value`] can represent anything the standard format can carry and is the
//! payload type for dynamically typed channels. Equality and hashing are
//! structural; floats compare by bit pattern so values can key a map.
//!
//! `Value` also implements `Serialize`/`Deserialize`, so it can ride inside
//! derived records through the generic bridge. Typed numeric lists cross the
//! bridge through a private newtype-token protocol (the same trick serde_json
//! uses for arbitrary-precision numbers) so that their dedicated wire tags
//! survive a round-trip instead of degrading to plain lists.

use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};

use serde::de::{MapAccess, SeqAccess, Visitor};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};

use crate::writer::EncodingState;

/// Token names for smuggling typed numeric lists through serde.
///
/// The bridge serializer recognizes these newtype-struct names and emits the
/// dedicated array tags; the bridge deserializer surfaces typed arrays as a
/// single-entry map keyed by the matching token. Foreign serializers treat
/// the newtype as transparent and see a plain sequence.
pub(crate) const TOKEN_I32_LIST: &str = "$crosstalk::i32_list";
pub(crate) const TOKEN_I64_LIST: &str = "$crosstalk::i64_list";
pub(crate) const TOKEN_F32_LIST: &str = "$crosstalk::f32_list";
pub(crate) const TOKEN_F64_LIST: &str = "$crosstalk::f64_list";

/// A dynamically typed value carried by the standard codec.
///
/// Each subtree is exclusively owned by its parent container; values are
/// constructed fresh per encode/decode call and never shared.
#[derive(Debug, Clone, Default)]
pub enum Value {
    /// The null value.
    #[default]
    Nil,
    /// A boolean, encoded as one of two distinct tags.
    Bool(bool),
    /// A 32-bit signed integer.
    I32(i32),
    /// A 64-bit signed integer.
    I64(i64),
    /// A 64-bit float.
    F64(f64),
    /// A UTF-8 string.
    String(String),
    /// A byte array with its own wire tag.
    U8List(Vec<u8>),
    /// A packed array of 32-bit integers.
    I32List(Vec<i32>),
    /// A packed array of 64-bit integers.
    I64List(Vec<i64>),
    /// A packed array of 32-bit floats.
    F32List(Vec<f32>),
    /// A packed array of 64-bit floats.
    F64List(Vec<f64>),
    /// A heterogeneous list of values.
    List(Vec<Value>),
    /// A map from values to values.
    Map(HashMap<Value, Value>),
}

impl Value {
    /// Returns true for [`Value::Nil`].
    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }

    /// Returns the boolean payload, if this is a boolean.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the integer payload widened to 64 bits, if this is an integer.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::I32(v) => Some(i64::from(*v)),
            Value::I64(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the float payload, if this is a float.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::F64(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the string payload, if this is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the list elements, if this is a heterogeneous list.
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    /// Returns the map entries, if this is a map.
    pub fn as_map(&self) -> Option<&HashMap<Value, Value>> {
        match self {
            Value::Map(entries) => Some(entries),
            _ => None,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Nil, Value::Nil) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::I32(a), Value::I32(b)) => a == b,
            (Value::I64(a), Value::I64(b)) => a == b,
            (Value::F64(a), Value::F64(b)) => a.to_bits() == b.to_bits(),
            (Value::String(a), Value::String(b)) => a == b,
            (Value::U8List(a), Value::U8List(b)) => a == b,
            (Value::I32List(a), Value::I32List(b)) => a == b,
            (Value::I64List(a), Value::I64List(b)) => a == b,
            (Value::F32List(a), Value::F32List(b)) => {
                a.len() == b.len()
                    && a.iter().zip(b).all(|(x, y)| x.to_bits() == y.to_bits())
            }
            (Value::F64List(a), Value::F64List(b)) => {
                a.len() == b.len()
                    && a.iter().zip(b).all(|(x, y)| x.to_bits() == y.to_bits())
            }
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Map(a), Value::Map(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Value::Nil => {}
            Value::Bool(b) => b.hash(state),
            Value::I32(v) => v.hash(state),
            Value::I64(v) => v.hash(state),
            Value::F64(v) => v.to_bits().hash(state),
            Value::String(s) => s.hash(state),
            Value::U8List(v) => v.hash(state),
            Value::I32List(v) => v.hash(state),
            Value::I64List(v) => v.hash(state),
            Value::F32List(v) => {
                v.len().hash(state);
                for x in v {
                    x.to_bits().hash(state);
                }
            }
            Value::F64List(v) => {
                v.len().hash(state);
                for x in v {
                    x.to_bits().hash(state);
                }
            }
            Value::List(items) => items.hash(state),
            Value::Map(entries) => {
                // Order-independent: combine per-entry hashes commutatively.
                entries.len().hash(state);
                let mut combined: u64 = 0;
                for (k, v) in entries {
                    let mut entry_hasher = DefaultHasher::new();
                    k.hash(&mut entry_hasher);
                    v.hash(&mut entry_hasher);
                    combined = combined.wrapping_add(entry_hasher.finish());
                }
                combined.hash(state);
            }
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::I32(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::I64(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::F64(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::U8List(v)
    }
}

impl From<Vec<i32>> for Value {
    fn from(v: Vec<i32>) -> Self {
        Value::I32List(v)
    }
}

impl From<Vec<i64>> for Value {
    fn from(v: Vec<i64>) -> Self {
        Value::I64List(v)
    }
}

impl From<Vec<f32>> for Value {
    fn from(v: Vec<f32>) -> Self {
        Value::F32List(v)
    }
}

impl From<Vec<f64>> for Value {
    fn from(v: Vec<f64>) -> Self {
        Value::F64List(v)
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Value::List(v)
    }
}

impl From<HashMap<Value, Value>> for Value {
    fn from(v: HashMap<Value, Value>) -> Self {
        Value::Map(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(inner) => inner.into(),
            None => Value::Nil,
        }
    }
}

/// Sorts map entries by their standalone wire encoding of the key.
///
/// Map iteration order is not stable, so the codec fixes entry order by the
/// encoded key bytes. The sort key is computed against a fresh buffer; the
/// comparison is deterministic even though alignment inside the real buffer
/// depends on position.
pub(crate) fn sorted_entries(
    entries: &HashMap<Value, Value>,
) -> Result<Vec<(&Value, &Value)>, crate::error::WireError> {
    let mut keyed: Vec<(Vec<u8>, &Value, &Value)> = Vec::with_capacity(entries.len());
    for (k, v) in entries {
        let mut scratch = EncodingState::new();
        scratch.write_value(k)?;
        keyed.push((scratch.into_bytes(), k, v));
    }
    keyed.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(keyed.into_iter().map(|(_, k, v)| (k, v)).collect())
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Nil => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::I32(v) => serializer.serialize_i32(*v),
            Value::I64(v) => serializer.serialize_i64(*v),
            Value::F64(v) => serializer.serialize_f64(*v),
            Value::String(s) => serializer.serialize_str(s),
            Value::U8List(v) => serializer.serialize_bytes(v),
            Value::I32List(v) => serializer.serialize_newtype_struct(TOKEN_I32_LIST, v),
            Value::I64List(v) => serializer.serialize_newtype_struct(TOKEN_I64_LIST, v),
            Value::F32List(v) => serializer.serialize_newtype_struct(TOKEN_F32_LIST, v),
            Value::F64List(v) => serializer.serialize_newtype_struct(TOKEN_F64_LIST, v),
            Value::List(items) => items.serialize(serializer),
            Value::Map(entries) => {
                let sorted = sorted_entries(entries)
                    .map_err(|e| serde::ser::Error::custom(e.to_string()))?;
                let mut map = serializer.serialize_map(Some(sorted.len()))?;
                for (k, v) in sorted {
                    map.serialize_entry(k, v)?;
                }
                map.end()
            }
        }
    }
}

struct ValueVisitor;

impl<'de> Visitor<'de> for ValueVisitor {
    type Value = Value;

    fn expecting(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("any standard codec value")
    }

    fn visit_unit<E: serde::de::Error>(self) -> Result<Value, E> {
        Ok(Value::Nil)
    }

    fn visit_none<E: serde::de::Error>(self) -> Result<Value, E> {
        Ok(Value::Nil)
    }

    fn visit_some<D: serde::Deserializer<'de>>(self, deserializer: D) -> Result<Value, D::Error> {
        Value::deserialize(deserializer)
    }

    fn visit_bool<E: serde::de::Error>(self, v: bool) -> Result<Value, E> {
        Ok(Value::Bool(v))
    }

    fn visit_i8<E: serde::de::Error>(self, v: i8) -> Result<Value, E> {
        Ok(Value::I32(i32::from(v)))
    }

    fn visit_i16<E: serde::de::Error>(self, v: i16) -> Result<Value, E> {
        Ok(Value::I32(i32::from(v)))
    }

    fn visit_i32<E: serde::de::Error>(self, v: i32) -> Result<Value, E> {
        Ok(Value::I32(v))
    }

    fn visit_i64<E: serde::de::Error>(self, v: i64) -> Result<Value, E> {
        Ok(Value::I64(v))
    }

    fn visit_u8<E: serde::de::Error>(self, v: u8) -> Result<Value, E> {
        Ok(Value::I32(i32::from(v)))
    }

    fn visit_u16<E: serde::de::Error>(self, v: u16) -> Result<Value, E> {
        Ok(Value::I32(i32::from(v)))
    }

    fn visit_u32<E: serde::de::Error>(self, v: u32) -> Result<Value, E> {
        Ok(Value::I64(i64::from(v)))
    }

    fn visit_u64<E: serde::de::Error>(self, v: u64) -> Result<Value, E> {
        i64::try_from(v)
            .map(Value::I64)
            .map_err(|_| E::custom("integer out of range for the wire format"))
    }

    fn visit_f32<E: serde::de::Error>(self, v: f32) -> Result<Value, E> {
        Ok(Value::F64(f64::from(v)))
    }

    fn visit_f64<E: serde::de::Error>(self, v: f64) -> Result<Value, E> {
        Ok(Value::F64(v))
    }

    fn visit_char<E: serde::de::Error>(self, v: char) -> Result<Value, E> {
        Ok(Value::String(v.to_string()))
    }

    fn visit_str<E: serde::de::Error>(self, v: &str) -> Result<Value, E> {
        Ok(Value::String(v.to_string()))
    }

    fn visit_string<E: serde::de::Error>(self, v: String) -> Result<Value, E> {
        Ok(Value::String(v))
    }

    fn visit_bytes<E: serde::de::Error>(self, v: &[u8]) -> Result<Value, E> {
        Ok(Value::U8List(v.to_vec()))
    }

    fn visit_byte_buf<E: serde::de::Error>(self, v: Vec<u8>) -> Result<Value, E> {
        Ok(Value::U8List(v))
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Value, A::Error> {
        let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(item) = seq.next_element::<Value>()? {
            items.push(item);
        }
        Ok(Value::List(items))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Value, A::Error> {
        // The first key decides whether this map is a smuggled typed array.
        match map.next_key::<Value>()? {
            None => Ok(Value::Map(HashMap::new())),
            Some(Value::String(s)) if s == TOKEN_I32_LIST => {
                Ok(Value::I32List(map.next_value()?))
            }
            Some(Value::String(s)) if s == TOKEN_I64_LIST => {
                Ok(Value::I64List(map.next_value()?))
            }
            Some(Value::String(s)) if s == TOKEN_F32_LIST => {
                Ok(Value::F32List(map.next_value()?))
            }
            Some(Value::String(s)) if s == TOKEN_F64_LIST => {
                Ok(Value::F64List(map.next_value()?))
            }
            Some(first_key) => {
                let mut entries = HashMap::new();
                let first_value: Value = map.next_value()?;
                entries.insert(first_key, first_value);
                while let Some((k, v)) = map.next_entry::<Value, Value>()? {
                    entries.insert(k, v);
                }
                Ok(Value::Map(entries))
            }
        }
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Value, D::Error> {
        deserializer.deserialize_any(ValueVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hash_of(value: &Value) -> u64 {
        let mut hasher = DefaultHasher::new();
        value.hash(&mut hasher);
        hasher.finish()
    }

    #[test]
    fn test_structural_equality() {
        assert_eq!(Value::from("abc"), Value::from("abc"));
        assert_ne!(Value::I32(1), Value::I64(1));
        assert_eq!(
            Value::List(vec![Value::Nil, Value::Bool(true)]),
            Value::List(vec![Value::Nil, Value::Bool(true)]),
        );
    }

    #[test]
    fn test_float_equality_is_bitwise() {
        assert_eq!(Value::F64(f64::NAN), Value::F64(f64::NAN));
        assert_ne!(Value::F64(0.0), Value::F64(-0.0));
    }

    #[test]
    fn test_map_hash_is_order_independent() {
        let mut a = HashMap::new();
        a.insert(Value::from("x"), Value::I32(1));
        a.insert(Value::from("y"), Value::I32(2));
        let mut b = HashMap::new();
        b.insert(Value::from("y"), Value::I32(2));
        b.insert(Value::from("x"), Value::I32(1));
        assert_eq!(Value::Map(a.clone()), Value::Map(b.clone()));
        assert_eq!(hash_of(&Value::Map(a)), hash_of(&Value::Map(b)));
    }

    #[test]
    fn test_values_can_key_a_map() {
        let mut entries = HashMap::new();
        entries.insert(Value::F64(1.5), Value::from("float key"));
        entries.insert(Value::List(vec![Value::I32(1)]), Value::from("list key"));
        assert_eq!(
            entries.get(&Value::F64(1.5)).and_then(Value::as_str),
            Some("float key")
        );
    }

    #[test]
    fn test_typed_list_inequality_with_plain_list() {
        assert_ne!(
            Value::I32List(vec![1, 2]),
            Value::List(vec![Value::I32(1), Value::I32(2)]),
        );
    }
}
