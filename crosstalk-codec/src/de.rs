//! Generic decoder bridge: serde deserialization from a [`DecodingState`].
//!
//! The format is self-describing, so `deserialize_any` dispatches on the
//! peeked tag. Typed requests are strict: asking for an integer when the
//! wire holds a string is [`WireError::UnexpectedFieldTag`], and narrowing
//! an integer that does not fit is [`WireError::IntegerOutOfRange`].
//!
//! Sequential decoding tracks a known element count when the wire provides
//! one (lists, maps) and falls back to end-of-input termination for
//! top-level sequences such as method calls and envelopes, which are
//! concatenated without framing.

use serde::de::value::BorrowedStrDeserializer;
use serde::de::{self, DeserializeSeed, Visitor};
use serde::forward_to_deserialize_any;

use crate::error::WireError;
use crate::reader::{DecodingState, MAX_DEPTH};
use crate::tag::FieldTag;
use crate::value::{TOKEN_F32_LIST, TOKEN_F64_LIST, TOKEN_I32_LIST, TOKEN_I64_LIST};

/// Decodes a value from a standalone message.
///
/// A zero-length message decodes as the absent value for optional targets.
///
/// # Errors
///
/// Propagates the first [`WireError`] hit by any read, and rejects
/// unconsumed trailing bytes with [`WireError::TrailingBytes`].
pub fn from_bytes<'de, T: de::Deserialize<'de>>(bytes: &'de [u8]) -> Result<T, WireError> {
    let mut deserializer = Deserializer::new(bytes);
    let value = T::deserialize(&mut deserializer)?;
    deserializer.end()?;
    Ok(value)
}

/// serde deserializer reading the standard binary format.
///
/// Several values can be deserialized back to back from the same
/// deserializer; [`Deserializer::is_at_end`] reports whether input remains,
/// which is how the top-level method-call and envelope sequences are walked.
pub struct Deserializer<'de> {
    state: DecodingState<'de>,
    depth: usize,
}

impl<'de> Deserializer<'de> {
    /// Creates a deserializer over `bytes`.
    pub fn new(bytes: &'de [u8]) -> Self {
        Self {
            state: DecodingState::new(bytes),
            depth: 0,
        }
    }

    /// True iff the input is exhausted.
    pub fn is_at_end(&self) -> bool {
        self.state.is_at_end()
    }

    /// Requires the input to be fully consumed.
    ///
    /// # Errors
    ///
    /// Returns [`WireError::TrailingBytes`] when bytes remain.
    pub fn end(&self) -> Result<(), WireError> {
        if self.state.is_at_end() {
            Ok(())
        } else {
            Err(WireError::TrailingBytes {
                remaining: self.state.remaining(),
            })
        }
    }

    fn descend(&mut self) -> Result<(), WireError> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(WireError::DepthLimitExceeded { max: MAX_DEPTH });
        }
        Ok(())
    }

    fn ascend(&mut self) {
        self.depth -= 1;
    }

    fn read_int(&mut self) -> Result<IntWire, WireError> {
        match self.state.read_tag()? {
            FieldTag::Int32 => Ok(IntWire::I32(self.state.read_i32_raw()?)),
            FieldTag::Int64 => Ok(IntWire::I64(self.state.read_i64_raw()?)),
            actual => Err(WireError::UnexpectedFieldTag {
                expected: FieldTag::Int32,
                actual,
            }),
        }
    }
}

/// An integer as found on the wire, before narrowing.
#[derive(Clone, Copy)]
enum IntWire {
    I32(i32),
    I64(i64),
}

impl IntWire {
    fn widened(self) -> i64 {
        match self {
            IntWire::I32(v) => i64::from(v),
            IntWire::I64(v) => v,
        }
    }

    /// Reinterprets the wire bits as unsigned at the stored width, then
    /// widens. `int32 -6` becomes `0xFFFF_FFFA`, not a 64-bit sign extend.
    fn reinterpreted(self) -> u64 {
        match self {
            IntWire::I32(v) => u64::from(v as u32),
            IntWire::I64(v) => v as u64,
        }
    }

    fn out_of_range(self) -> WireError {
        WireError::IntegerOutOfRange {
            value: self.widened(),
        }
    }
}

impl<'de, 'a> de::Deserializer<'de> for &'a mut Deserializer<'de> {
    type Error = WireError;

    fn deserialize_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, WireError> {
        if self.state.consumed() == 0 && self.state.is_at_end() {
            return visitor.visit_unit();
        }
        match self.state.peek_tag()? {
            FieldTag::Nil => {
                self.state.read_tag()?;
                visitor.visit_unit()
            }
            FieldTag::True => {
                self.state.read_tag()?;
                visitor.visit_bool(true)
            }
            FieldTag::False => {
                self.state.read_tag()?;
                visitor.visit_bool(false)
            }
            FieldTag::Int32 => {
                self.state.read_tag()?;
                visitor.visit_i32(self.state.read_i32_raw()?)
            }
            FieldTag::Int64 => {
                self.state.read_tag()?;
                visitor.visit_i64(self.state.read_i64_raw()?)
            }
            FieldTag::IntHex => Err(WireError::Unsupported(
                "reserved hex-encoded integer tag",
            )),
            FieldTag::Float64 => {
                self.state.read_tag()?;
                self.state.skip_alignment(8)?;
                visitor.visit_f64(self.state.read_f64_raw()?)
            }
            FieldTag::String => visitor.visit_borrowed_str(self.state.read_string()?),
            FieldTag::U8List => visitor.visit_borrowed_bytes(self.state.read_u8_list()?),
            FieldTag::I32List => visitor.visit_map(TypedArrayAccess::new(self, ArrayKind::I32)),
            FieldTag::I64List => visitor.visit_map(TypedArrayAccess::new(self, ArrayKind::I64)),
            FieldTag::F32List => visitor.visit_map(TypedArrayAccess::new(self, ArrayKind::F32)),
            FieldTag::F64List => visitor.visit_map(TypedArrayAccess::new(self, ArrayKind::F64)),
            FieldTag::List => self.deserialize_seq(visitor),
            FieldTag::Map => self.deserialize_map(visitor),
        }
    }

    fn deserialize_bool<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, WireError> {
        visitor.visit_bool(self.state.read_bool()?)
    }

    fn deserialize_i8<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, WireError> {
        let int = self.read_int()?;
        let narrowed = i8::try_from(int.widened()).map_err(|_| int.out_of_range())?;
        visitor.visit_i8(narrowed)
    }

    fn deserialize_i16<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, WireError> {
        let int = self.read_int()?;
        let narrowed = i16::try_from(int.widened()).map_err(|_| int.out_of_range())?;
        visitor.visit_i16(narrowed)
    }

    fn deserialize_i32<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, WireError> {
        let int = self.read_int()?;
        let narrowed = i32::try_from(int.widened()).map_err(|_| int.out_of_range())?;
        visitor.visit_i32(narrowed)
    }

    fn deserialize_i64<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, WireError> {
        visitor.visit_i64(self.read_int()?.widened())
    }

    fn deserialize_u8<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, WireError> {
        let int = self.read_int()?;
        let narrowed = u8::try_from(int.reinterpreted()).map_err(|_| int.out_of_range())?;
        visitor.visit_u8(narrowed)
    }

    fn deserialize_u16<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, WireError> {
        let int = self.read_int()?;
        let narrowed = u16::try_from(int.reinterpreted()).map_err(|_| int.out_of_range())?;
        visitor.visit_u16(narrowed)
    }

    fn deserialize_u32<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, WireError> {
        let int = self.read_int()?;
        let narrowed = u32::try_from(int.reinterpreted()).map_err(|_| int.out_of_range())?;
        visitor.visit_u32(narrowed)
    }

    fn deserialize_u64<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, WireError> {
        visitor.visit_u64(self.read_int()?.reinterpreted())
    }

    fn deserialize_f32<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, WireError> {
        // Read a float64 and narrow; precision loss is not an error.
        visitor.visit_f32(self.state.read_f64()? as f32)
    }

    fn deserialize_f64<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, WireError> {
        visitor.visit_f64(self.state.read_f64()?)
    }

    fn deserialize_char<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, WireError> {
        let text = self.state.read_string()?;
        let mut chars = text.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => visitor.visit_char(c),
            _ => Err(WireError::Message(format!(
                "expected a single-character string, found {text:?}"
            ))),
        }
    }

    fn deserialize_str<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, WireError> {
        visitor.visit_borrowed_str(self.state.read_string()?)
    }

    fn deserialize_string<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, WireError> {
        self.deserialize_str(visitor)
    }

    fn deserialize_bytes<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, WireError> {
        visitor.visit_borrowed_bytes(self.state.read_u8_list()?)
    }

    fn deserialize_byte_buf<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, WireError> {
        self.deserialize_bytes(visitor)
    }

    fn deserialize_option<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, WireError> {
        if self.state.read_nil() {
            visitor.visit_none()
        } else {
            visitor.visit_some(self)
        }
    }

    fn deserialize_unit<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, WireError> {
        if self.state.read_nil() {
            visitor.visit_unit()
        } else {
            Err(WireError::UnexpectedFieldTag {
                expected: FieldTag::Nil,
                actual: self.state.peek_tag()?,
            })
        }
    }

    fn deserialize_unit_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value, WireError> {
        self.deserialize_unit(visitor)
    }

    fn deserialize_newtype_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value, WireError> {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_seq<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, WireError> {
        match self.state.peek_tag()? {
            FieldTag::List => {
                self.state.read_tag()?;
                let len = self.state.read_size()?;
                self.descend()?;
                let value = visitor.visit_seq(SeqElements {
                    de: &mut *self,
                    remaining: len,
                })?;
                self.ascend();
                Ok(value)
            }
            FieldTag::U8List => {
                self.state.read_tag()?;
                let len = self.state.read_size()?;
                visitor.visit_seq(TypedElements {
                    de: self,
                    kind: ArrayKind::U8,
                    remaining: len,
                })
            }
            FieldTag::I32List => self.typed_seq(ArrayKind::I32, visitor),
            FieldTag::I64List => self.typed_seq(ArrayKind::I64, visitor),
            FieldTag::F32List => self.typed_seq(ArrayKind::F32, visitor),
            FieldTag::F64List => self.typed_seq(ArrayKind::F64, visitor),
            actual => Err(WireError::UnexpectedFieldTag {
                expected: FieldTag::List,
                actual,
            }),
        }
    }

    fn deserialize_tuple<V: Visitor<'de>>(
        self,
        len: usize,
        visitor: V,
    ) -> Result<V::Value, WireError> {
        match self.state.peek_tag()? {
            FieldTag::List => {
                self.state.read_tag()?;
                let wire_len = self.state.read_size()?;
                if wire_len != len {
                    return Err(WireError::Message(format!(
                        "expected a tuple of {len} elements, found {wire_len}"
                    )));
                }
                self.descend()?;
                let value = visitor.visit_seq(SeqElements {
                    de: &mut *self,
                    remaining: len,
                })?;
                self.ascend();
                Ok(value)
            }
            actual => Err(WireError::UnexpectedFieldTag {
                expected: FieldTag::List,
                actual,
            }),
        }
    }

    fn deserialize_tuple_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        len: usize,
        visitor: V,
    ) -> Result<V::Value, WireError> {
        self.deserialize_tuple(len, visitor)
    }

    fn deserialize_map<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, WireError> {
        match self.state.peek_tag()? {
            FieldTag::Map => {
                self.state.read_tag()?;
                let len = self.state.read_size()?;
                self.descend()?;
                let value = visitor.visit_map(MapEntries {
                    de: &mut *self,
                    remaining: len,
                })?;
                self.ascend();
                Ok(value)
            }
            actual => Err(WireError::UnexpectedFieldTag {
                expected: FieldTag::Map,
                actual,
            }),
        }
    }

    fn deserialize_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        _fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, WireError> {
        self.deserialize_map(visitor)
    }

    fn deserialize_enum<V: Visitor<'de>>(
        self,
        _name: &'static str,
        _variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, WireError> {
        match self.state.peek_tag()? {
            FieldTag::String => visitor.visit_enum(EnumAccess {
                de: self,
                has_value: false,
            }),
            FieldTag::Map => {
                self.state.read_tag()?;
                let len = self.state.read_size()?;
                if len != 1 {
                    return Err(WireError::Message(format!(
                        "expected a single-entry variant map, found {len} entries"
                    )));
                }
                visitor.visit_enum(EnumAccess {
                    de: self,
                    has_value: true,
                })
            }
            actual => Err(WireError::UnexpectedFieldTag {
                expected: FieldTag::String,
                actual,
            }),
        }
    }

    fn deserialize_identifier<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, WireError> {
        self.deserialize_str(visitor)
    }

    fn deserialize_ignored_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, WireError> {
        self.state.skip_value()?;
        visitor.visit_unit()
    }
}

impl<'de> Deserializer<'de> {
    fn typed_seq<'a, V: Visitor<'de>>(
        &'a mut self,
        kind: ArrayKind,
        visitor: V,
    ) -> Result<V::Value, WireError> {
        self.state.read_tag()?;
        let len = self.state.read_size()?;
        self.state.skip_alignment(kind.width())?;
        visitor.visit_seq(TypedElements {
            de: self,
            kind,
            remaining: len,
        })
    }
}

/// Element kinds for the packed numeric arrays.
#[derive(Clone, Copy)]
enum ArrayKind {
    U8,
    I32,
    I64,
    F32,
    F64,
}

impl ArrayKind {
    fn width(self) -> usize {
        match self {
            ArrayKind::U8 => 1,
            ArrayKind::I32 | ArrayKind::F32 => 4,
            ArrayKind::I64 | ArrayKind::F64 => 8,
        }
    }

    fn token(self) -> &'static str {
        match self {
            ArrayKind::I32 => TOKEN_I32_LIST,
            ArrayKind::I64 => TOKEN_I64_LIST,
            ArrayKind::F32 => TOKEN_F32_LIST,
            ArrayKind::F64 => TOKEN_F64_LIST,
            // u8 arrays surface as borrowed bytes, never as a token map.
            ArrayKind::U8 => unreachable!(),
        }
    }
}

/// Access over a length-prefixed heterogeneous list.
struct SeqElements<'de, 'a> {
    de: &'a mut Deserializer<'de>,
    remaining: usize,
}

impl<'de> de::SeqAccess<'de> for SeqElements<'de, '_> {
    type Error = WireError;

    fn next_element_seed<T: DeserializeSeed<'de>>(
        &mut self,
        seed: T,
    ) -> Result<Option<T::Value>, WireError> {
        if self.remaining == 0 {
            return Ok(None);
        }
        self.remaining -= 1;
        seed.deserialize(&mut *self.de).map(Some)
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.remaining)
    }
}

/// Access over a length-prefixed map.
struct MapEntries<'de, 'a> {
    de: &'a mut Deserializer<'de>,
    remaining: usize,
}

impl<'de> de::MapAccess<'de> for MapEntries<'de, '_> {
    type Error = WireError;

    fn next_key_seed<K: DeserializeSeed<'de>>(
        &mut self,
        seed: K,
    ) -> Result<Option<K::Value>, WireError> {
        if self.remaining == 0 {
            return Ok(None);
        }
        self.remaining -= 1;
        seed.deserialize(&mut *self.de).map(Some)
    }

    fn next_value_seed<V: DeserializeSeed<'de>>(&mut self, seed: V) -> Result<V::Value, WireError> {
        seed.deserialize(&mut *self.de)
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.remaining)
    }
}

/// Access over the raw elements of a packed numeric array.
struct TypedElements<'de, 'a> {
    de: &'a mut Deserializer<'de>,
    kind: ArrayKind,
    remaining: usize,
}

impl<'de> de::SeqAccess<'de> for TypedElements<'de, '_> {
    type Error = WireError;

    fn next_element_seed<T: DeserializeSeed<'de>>(
        &mut self,
        seed: T,
    ) -> Result<Option<T::Value>, WireError> {
        if self.remaining == 0 {
            return Ok(None);
        }
        self.remaining -= 1;
        seed.deserialize(RawElement {
            de: &mut *self.de,
            kind: self.kind,
        })
        .map(Some)
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.remaining)
    }
}

/// Deserializer for one raw element inside a packed numeric array.
struct RawElement<'de, 'a> {
    de: &'a mut Deserializer<'de>,
    kind: ArrayKind,
}

impl<'de> de::Deserializer<'de> for RawElement<'de, '_> {
    type Error = WireError;

    fn deserialize_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, WireError> {
        match self.kind {
            ArrayKind::U8 => {
                let byte = self.de.state.take_bytes(1)?[0];
                visitor.visit_u8(byte)
            }
            ArrayKind::I32 => visitor.visit_i32(self.de.state.read_i32_raw()?),
            ArrayKind::I64 => visitor.visit_i64(self.de.state.read_i64_raw()?),
            ArrayKind::F32 => visitor.visit_f32(self.de.state.read_f32_raw()?),
            ArrayKind::F64 => visitor.visit_f64(self.de.state.read_f64_raw()?),
        }
    }

    forward_to_deserialize_any! {
        bool i8 i16 i32 i64 i128 u8 u16 u32 u64 u128 f32 f64 char str string
        bytes byte_buf option unit unit_struct newtype_struct seq tuple
        tuple_struct map struct enum identifier ignored_any
    }
}

/// Surfaces a packed numeric array to `deserialize_any` callers as a
/// single-entry map keyed by the matching private token.
///
/// The dynamic [`crate::Value`] deserializer recognizes the token and
/// rebuilds the typed list; anything else sees a map it was not expecting
/// and fails with a type error, which is the correct outcome for a typed
/// array in a position the caller thought held something else.
struct TypedArrayAccess<'de, 'a> {
    de: &'a mut Deserializer<'de>,
    kind: ArrayKind,
    stage: Stage,
}

#[derive(PartialEq)]
enum Stage {
    Key,
    Value,
    Done,
}

impl<'de, 'a> TypedArrayAccess<'de, 'a> {
    fn new(de: &'a mut Deserializer<'de>, kind: ArrayKind) -> Self {
        Self {
            de,
            kind,
            stage: Stage::Key,
        }
    }
}

impl<'de> de::MapAccess<'de> for TypedArrayAccess<'de, '_> {
    type Error = WireError;

    fn next_key_seed<K: DeserializeSeed<'de>>(
        &mut self,
        seed: K,
    ) -> Result<Option<K::Value>, WireError> {
        if self.stage != Stage::Key {
            return Ok(None);
        }
        self.stage = Stage::Value;
        seed.deserialize(BorrowedStrDeserializer::<WireError>::new(
            self.kind.token(),
        ))
        .map(Some)
    }

    fn next_value_seed<V: DeserializeSeed<'de>>(&mut self, seed: V) -> Result<V::Value, WireError> {
        if self.stage != Stage::Value {
            return Err(de::Error::custom("typed array token read out of order"));
        }
        self.stage = Stage::Done;
        self.de.state.read_tag()?;
        let len = self.de.state.read_size()?;
        self.de.state.skip_alignment(self.kind.width())?;
        seed.deserialize(TypedArrayBody {
            de: &mut *self.de,
            kind: self.kind,
            remaining: len,
        })
    }
}

/// Deserializer handed out for the token value: the packed elements.
struct TypedArrayBody<'de, 'a> {
    de: &'a mut Deserializer<'de>,
    kind: ArrayKind,
    remaining: usize,
}

impl<'de> de::Deserializer<'de> for TypedArrayBody<'de, '_> {
    type Error = WireError;

    fn deserialize_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, WireError> {
        visitor.visit_seq(TypedElements {
            de: self.de,
            kind: self.kind,
            remaining: self.remaining,
        })
    }

    forward_to_deserialize_any! {
        bool i8 i16 i32 i64 i128 u8 u16 u32 u64 u128 f32 f64 char str string
        bytes byte_buf option unit unit_struct newtype_struct seq tuple
        tuple_struct map struct enum identifier ignored_any
    }
}

/// Enum access for externally tagged variants: a bare string is a unit
/// variant, a single-entry map carries the variant payload.
struct EnumAccess<'de, 'a> {
    de: &'a mut Deserializer<'de>,
    has_value: bool,
}

impl<'de, 'a> de::EnumAccess<'de> for EnumAccess<'de, 'a> {
    type Error = WireError;
    type Variant = VariantAccess<'de, 'a>;

    fn variant_seed<V: DeserializeSeed<'de>>(
        self,
        seed: V,
    ) -> Result<(V::Value, Self::Variant), WireError> {
        let variant = seed.deserialize(&mut *self.de)?;
        Ok((
            variant,
            VariantAccess {
                de: self.de,
                has_value: self.has_value,
            },
        ))
    }
}

/// Payload access for one enum variant.
struct VariantAccess<'de, 'a> {
    de: &'a mut Deserializer<'de>,
    has_value: bool,
}

impl<'de> de::VariantAccess<'de> for VariantAccess<'de, '_> {
    type Error = WireError;

    fn unit_variant(self) -> Result<(), WireError> {
        if self.has_value && !self.de.state.read_nil() {
            return Err(de::Error::custom("expected no payload for unit variant"));
        }
        Ok(())
    }

    fn newtype_variant_seed<T: DeserializeSeed<'de>>(self, seed: T) -> Result<T::Value, WireError> {
        if !self.has_value {
            return Err(de::Error::custom("expected a payload for newtype variant"));
        }
        seed.deserialize(&mut *self.de)
    }

    fn tuple_variant<V: Visitor<'de>>(self, len: usize, visitor: V) -> Result<V::Value, WireError> {
        if !self.has_value {
            return Err(de::Error::custom("expected a payload for tuple variant"));
        }
        de::Deserializer::deserialize_tuple(&mut *self.de, len, visitor)
    }

    fn struct_variant<V: Visitor<'de>>(
        self,
        _fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, WireError> {
        if !self.has_value {
            return Err(de::Error::custom("expected a payload for struct variant"));
        }
        de::Deserializer::deserialize_map(&mut *self.de, visitor)
    }
}
