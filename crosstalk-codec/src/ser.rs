//! Generic encoder bridge: serde serialization onto an [`EncodingState`].
//!
//! Maps serde's data model onto the wire format:
//!
//! - keyed containers (structs, maps) become wire maps with string field
//!   names as keys;
//! - unkeyed containers (sequences, tuples) become wire lists;
//! - scalars follow the widening rules of the format: `i8`/`i16`/`u8`/`u16`
//!   widen to `int32`, `u32`/`u64` are bit-reinterpreted into the signed
//!   scalar of the same width, `f32` is promoted to `float64`;
//! - enums are externally tagged: a unit variant is a bare string, a data
//!   variant is a single-entry map from the variant name to its payload.
//!
//! Nested containers all append into the one shared [`EncodingState`], so
//! sibling values land in call order with no intermediate buffering.

use serde::ser::{self, Impossible, Serialize};

use crate::error::WireError;
use crate::tag::FieldTag;
use crate::value;
use crate::writer::EncodingState;

/// Encodes any serializable value into a standalone message.
///
/// # Errors
///
/// Propagates the first [`WireError`] hit by any write.
pub fn to_bytes<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, WireError> {
    let mut state = EncodingState::new();
    value.serialize(Serializer::new(&mut state))?;
    Ok(state.into_bytes())
}

/// serde serializer writing the standard binary format.
///
/// Borrow a [`Serializer`] per value; several values can be serialized back
/// to back into the same state, which is how the top-level method-call and
/// envelope sequences are built.
pub struct Serializer<'a> {
    state: &'a mut EncodingState,
}

impl<'a> Serializer<'a> {
    /// Creates a serializer appending to `state`.
    pub fn new(state: &'a mut EncodingState) -> Self {
        Self { state }
    }
}

impl<'a> ser::Serializer for Serializer<'a> {
    type Ok = ();
    type Error = WireError;

    type SerializeSeq = Compound<'a>;
    type SerializeTuple = Compound<'a>;
    type SerializeTupleStruct = Compound<'a>;
    type SerializeTupleVariant = Compound<'a>;
    type SerializeMap = Compound<'a>;
    type SerializeStruct = Compound<'a>;
    type SerializeStructVariant = Compound<'a>;

    fn serialize_bool(self, v: bool) -> Result<(), WireError> {
        self.state.write_bool(v);
        Ok(())
    }

    fn serialize_i8(self, v: i8) -> Result<(), WireError> {
        self.state.write_i32(i32::from(v));
        Ok(())
    }

    fn serialize_i16(self, v: i16) -> Result<(), WireError> {
        self.state.write_i32(i32::from(v));
        Ok(())
    }

    fn serialize_i32(self, v: i32) -> Result<(), WireError> {
        self.state.write_i32(v);
        Ok(())
    }

    fn serialize_i64(self, v: i64) -> Result<(), WireError> {
        self.state.write_i64(v);
        Ok(())
    }

    fn serialize_u8(self, v: u8) -> Result<(), WireError> {
        self.state.write_i32(i32::from(v));
        Ok(())
    }

    fn serialize_u16(self, v: u16) -> Result<(), WireError> {
        self.state.write_i32(i32::from(v));
        Ok(())
    }

    fn serialize_u32(self, v: u32) -> Result<(), WireError> {
        // Same width, reinterpreted: the wire has no unsigned scalars.
        self.state.write_i32(v as i32);
        Ok(())
    }

    fn serialize_u64(self, v: u64) -> Result<(), WireError> {
        self.state.write_i64(v as i64);
        Ok(())
    }

    fn serialize_f32(self, v: f32) -> Result<(), WireError> {
        // No float32 scalar tag; promote. Only arrays keep 32-bit floats.
        self.state.write_f64(f64::from(v));
        Ok(())
    }

    fn serialize_f64(self, v: f64) -> Result<(), WireError> {
        self.state.write_f64(v);
        Ok(())
    }

    fn serialize_char(self, v: char) -> Result<(), WireError> {
        let mut buf = [0u8; 4];
        self.state.write_string(v.encode_utf8(&mut buf))
    }

    fn serialize_str(self, v: &str) -> Result<(), WireError> {
        self.state.write_string(v)
    }

    fn serialize_bytes(self, v: &[u8]) -> Result<(), WireError> {
        self.state.write_u8_list(v)
    }

    fn serialize_none(self) -> Result<(), WireError> {
        self.state.write_nil();
        Ok(())
    }

    fn serialize_some<T: Serialize + ?Sized>(self, value: &T) -> Result<(), WireError> {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<(), WireError> {
        self.state.write_nil();
        Ok(())
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<(), WireError> {
        self.state.write_nil();
        Ok(())
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<(), WireError> {
        self.state.write_string(variant)
    }

    fn serialize_newtype_struct<T: Serialize + ?Sized>(
        self,
        name: &'static str,
        value: &T,
    ) -> Result<(), WireError> {
        match name {
            value::TOKEN_I32_LIST => value.serialize(TypedListSerializer {
                state: self.state,
                tag: FieldTag::I32List,
                width: 4,
            }),
            value::TOKEN_I64_LIST => value.serialize(TypedListSerializer {
                state: self.state,
                tag: FieldTag::I64List,
                width: 8,
            }),
            value::TOKEN_F32_LIST => value.serialize(TypedListSerializer {
                state: self.state,
                tag: FieldTag::F32List,
                width: 4,
            }),
            value::TOKEN_F64_LIST => value.serialize(TypedListSerializer {
                state: self.state,
                tag: FieldTag::F64List,
                width: 8,
            }),
            _ => value.serialize(self),
        }
    }

    fn serialize_newtype_variant<T: Serialize + ?Sized>(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        value: &T,
    ) -> Result<(), WireError> {
        self.state.write_tag(FieldTag::Map);
        self.state.write_size(1)?;
        self.state.write_string(variant)?;
        value.serialize(Serializer::new(self.state))
    }

    fn serialize_seq(self, len: Option<usize>) -> Result<Compound<'a>, WireError> {
        let len = len.ok_or(WireError::Unsupported(
            "sequences of unknown length cannot be length-prefixed",
        ))?;
        self.state.write_tag(FieldTag::List);
        self.state.write_size(len)?;
        Ok(Compound { state: self.state })
    }

    fn serialize_tuple(self, len: usize) -> Result<Compound<'a>, WireError> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        len: usize,
    ) -> Result<Compound<'a>, WireError> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<Compound<'a>, WireError> {
        self.state.write_tag(FieldTag::Map);
        self.state.write_size(1)?;
        self.state.write_string(variant)?;
        self.state.write_tag(FieldTag::List);
        self.state.write_size(len)?;
        Ok(Compound { state: self.state })
    }

    fn serialize_map(self, len: Option<usize>) -> Result<Compound<'a>, WireError> {
        let len = len.ok_or(WireError::Unsupported(
            "maps of unknown length cannot be length-prefixed",
        ))?;
        self.state.write_tag(FieldTag::Map);
        self.state.write_size(len)?;
        Ok(Compound { state: self.state })
    }

    fn serialize_struct(
        self,
        _name: &'static str,
        len: usize,
    ) -> Result<Compound<'a>, WireError> {
        self.state.write_tag(FieldTag::Map);
        self.state.write_size(len)?;
        Ok(Compound { state: self.state })
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<Compound<'a>, WireError> {
        self.state.write_tag(FieldTag::Map);
        self.state.write_size(1)?;
        self.state.write_string(variant)?;
        self.state.write_tag(FieldTag::Map);
        self.state.write_size(len)?;
        Ok(Compound { state: self.state })
    }
}

/// Shared compound serializer: every container appends into the same state,
/// so elements, entries, and fields are emitted in call order.
pub struct Compound<'a> {
    state: &'a mut EncodingState,
}

impl ser::SerializeSeq for Compound<'_> {
    type Ok = ();
    type Error = WireError;

    fn serialize_element<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), WireError> {
        value.serialize(Serializer::new(self.state))
    }

    fn end(self) -> Result<(), WireError> {
        Ok(())
    }
}

impl ser::SerializeTuple for Compound<'_> {
    type Ok = ();
    type Error = WireError;

    fn serialize_element<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), WireError> {
        value.serialize(Serializer::new(self.state))
    }

    fn end(self) -> Result<(), WireError> {
        Ok(())
    }
}

impl ser::SerializeTupleStruct for Compound<'_> {
    type Ok = ();
    type Error = WireError;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), WireError> {
        value.serialize(Serializer::new(self.state))
    }

    fn end(self) -> Result<(), WireError> {
        Ok(())
    }
}

impl ser::SerializeTupleVariant for Compound<'_> {
    type Ok = ();
    type Error = WireError;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), WireError> {
        value.serialize(Serializer::new(self.state))
    }

    fn end(self) -> Result<(), WireError> {
        Ok(())
    }
}

impl ser::SerializeMap for Compound<'_> {
    type Ok = ();
    type Error = WireError;

    fn serialize_key<T: Serialize + ?Sized>(&mut self, key: &T) -> Result<(), WireError> {
        key.serialize(Serializer::new(self.state))
    }

    fn serialize_value<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), WireError> {
        value.serialize(Serializer::new(self.state))
    }

    fn end(self) -> Result<(), WireError> {
        Ok(())
    }
}

impl ser::SerializeStruct for Compound<'_> {
    type Ok = ();
    type Error = WireError;

    fn serialize_field<T: Serialize + ?Sized>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> Result<(), WireError> {
        self.state.write_string(key)?;
        value.serialize(Serializer::new(self.state))
    }

    fn end(self) -> Result<(), WireError> {
        Ok(())
    }
}

impl ser::SerializeStructVariant for Compound<'_> {
    type Ok = ();
    type Error = WireError;

    fn serialize_field<T: Serialize + ?Sized>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> Result<(), WireError> {
        self.state.write_string(key)?;
        value.serialize(Serializer::new(self.state))
    }

    fn end(self) -> Result<(), WireError> {
        Ok(())
    }
}

const TYPED_LIST_ONLY: WireError =
    WireError::Unsupported("typed list tokens carry a sequence of fixed-width numerics");

/// Serializer accepted behind a typed-list token: a single sequence whose
/// elements are written raw, without per-element tags.
struct TypedListSerializer<'a> {
    state: &'a mut EncodingState,
    tag: FieldTag,
    width: usize,
}

impl<'a> ser::Serializer for TypedListSerializer<'a> {
    type Ok = ();
    type Error = WireError;

    type SerializeSeq = TypedListBody<'a>;
    type SerializeTuple = Impossible<(), WireError>;
    type SerializeTupleStruct = Impossible<(), WireError>;
    type SerializeTupleVariant = Impossible<(), WireError>;
    type SerializeMap = Impossible<(), WireError>;
    type SerializeStruct = Impossible<(), WireError>;
    type SerializeStructVariant = Impossible<(), WireError>;

    fn serialize_seq(self, len: Option<usize>) -> Result<TypedListBody<'a>, WireError> {
        let len = len.ok_or(TYPED_LIST_ONLY)?;
        self.state.write_tag(self.tag);
        self.state.write_size(len)?;
        self.state.write_alignment(self.width);
        Ok(TypedListBody { state: self.state })
    }

    fn serialize_bool(self, _v: bool) -> Result<(), WireError> {
        Err(TYPED_LIST_ONLY)
    }

    fn serialize_i8(self, _v: i8) -> Result<(), WireError> {
        Err(TYPED_LIST_ONLY)
    }

    fn serialize_i16(self, _v: i16) -> Result<(), WireError> {
        Err(TYPED_LIST_ONLY)
    }

    fn serialize_i32(self, _v: i32) -> Result<(), WireError> {
        Err(TYPED_LIST_ONLY)
    }

    fn serialize_i64(self, _v: i64) -> Result<(), WireError> {
        Err(TYPED_LIST_ONLY)
    }

    fn serialize_u8(self, _v: u8) -> Result<(), WireError> {
        Err(TYPED_LIST_ONLY)
    }

    fn serialize_u16(self, _v: u16) -> Result<(), WireError> {
        Err(TYPED_LIST_ONLY)
    }

    fn serialize_u32(self, _v: u32) -> Result<(), WireError> {
        Err(TYPED_LIST_ONLY)
    }

    fn serialize_u64(self, _v: u64) -> Result<(), WireError> {
        Err(TYPED_LIST_ONLY)
    }

    fn serialize_f32(self, _v: f32) -> Result<(), WireError> {
        Err(TYPED_LIST_ONLY)
    }

    fn serialize_f64(self, _v: f64) -> Result<(), WireError> {
        Err(TYPED_LIST_ONLY)
    }

    fn serialize_char(self, _v: char) -> Result<(), WireError> {
        Err(TYPED_LIST_ONLY)
    }

    fn serialize_str(self, _v: &str) -> Result<(), WireError> {
        Err(TYPED_LIST_ONLY)
    }

    fn serialize_bytes(self, _v: &[u8]) -> Result<(), WireError> {
        Err(TYPED_LIST_ONLY)
    }

    fn serialize_none(self) -> Result<(), WireError> {
        Err(TYPED_LIST_ONLY)
    }

    fn serialize_some<T: Serialize + ?Sized>(self, _value: &T) -> Result<(), WireError> {
        Err(TYPED_LIST_ONLY)
    }

    fn serialize_unit(self) -> Result<(), WireError> {
        Err(TYPED_LIST_ONLY)
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<(), WireError> {
        Err(TYPED_LIST_ONLY)
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
    ) -> Result<(), WireError> {
        Err(TYPED_LIST_ONLY)
    }

    fn serialize_newtype_struct<T: Serialize + ?Sized>(
        self,
        _name: &'static str,
        _value: &T,
    ) -> Result<(), WireError> {
        Err(TYPED_LIST_ONLY)
    }

    fn serialize_newtype_variant<T: Serialize + ?Sized>(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _value: &T,
    ) -> Result<(), WireError> {
        Err(TYPED_LIST_ONLY)
    }

    fn serialize_tuple(self, _len: usize) -> Result<Self::SerializeTuple, WireError> {
        Err(TYPED_LIST_ONLY)
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleStruct, WireError> {
        Err(TYPED_LIST_ONLY)
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleVariant, WireError> {
        Err(TYPED_LIST_ONLY)
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<Self::SerializeMap, WireError> {
        Err(TYPED_LIST_ONLY)
    }

    fn serialize_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStruct, WireError> {
        Err(TYPED_LIST_ONLY)
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStructVariant, WireError> {
        Err(TYPED_LIST_ONLY)
    }
}

/// Body of a typed list: raw little-endian elements, no per-element tags.
struct TypedListBody<'a> {
    state: &'a mut EncodingState,
}

impl ser::SerializeSeq for TypedListBody<'_> {
    type Ok = ();
    type Error = WireError;

    fn serialize_element<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), WireError> {
        value.serialize(RawScalarSerializer { state: self.state })
    }

    fn end(self) -> Result<(), WireError> {
        Ok(())
    }
}

/// Serializer for one raw element inside a typed list.
struct RawScalarSerializer<'a> {
    state: &'a mut EncodingState,
}

impl ser::Serializer for RawScalarSerializer<'_> {
    type Ok = ();
    type Error = WireError;

    type SerializeSeq = Impossible<(), WireError>;
    type SerializeTuple = Impossible<(), WireError>;
    type SerializeTupleStruct = Impossible<(), WireError>;
    type SerializeTupleVariant = Impossible<(), WireError>;
    type SerializeMap = Impossible<(), WireError>;
    type SerializeStruct = Impossible<(), WireError>;
    type SerializeStructVariant = Impossible<(), WireError>;

    fn serialize_i32(self, v: i32) -> Result<(), WireError> {
        self.state.push_raw(&v.to_le_bytes());
        Ok(())
    }

    fn serialize_i64(self, v: i64) -> Result<(), WireError> {
        self.state.push_raw(&v.to_le_bytes());
        Ok(())
    }

    fn serialize_f32(self, v: f32) -> Result<(), WireError> {
        self.state.push_raw(&v.to_le_bytes());
        Ok(())
    }

    fn serialize_f64(self, v: f64) -> Result<(), WireError> {
        self.state.push_raw(&v.to_le_bytes());
        Ok(())
    }

    fn serialize_bool(self, _v: bool) -> Result<(), WireError> {
        Err(TYPED_LIST_ONLY)
    }

    fn serialize_i8(self, _v: i8) -> Result<(), WireError> {
        Err(TYPED_LIST_ONLY)
    }

    fn serialize_i16(self, _v: i16) -> Result<(), WireError> {
        Err(TYPED_LIST_ONLY)
    }

    fn serialize_u8(self, _v: u8) -> Result<(), WireError> {
        Err(TYPED_LIST_ONLY)
    }

    fn serialize_u16(self, _v: u16) -> Result<(), WireError> {
        Err(TYPED_LIST_ONLY)
    }

    fn serialize_u32(self, _v: u32) -> Result<(), WireError> {
        Err(TYPED_LIST_ONLY)
    }

    fn serialize_u64(self, _v: u64) -> Result<(), WireError> {
        Err(TYPED_LIST_ONLY)
    }

    fn serialize_char(self, _v: char) -> Result<(), WireError> {
        Err(TYPED_LIST_ONLY)
    }

    fn serialize_str(self, _v: &str) -> Result<(), WireError> {
        Err(TYPED_LIST_ONLY)
    }

    fn serialize_bytes(self, _v: &[u8]) -> Result<(), WireError> {
        Err(TYPED_LIST_ONLY)
    }

    fn serialize_none(self) -> Result<(), WireError> {
        Err(TYPED_LIST_ONLY)
    }

    fn serialize_some<T: Serialize + ?Sized>(self, _value: &T) -> Result<(), WireError> {
        Err(TYPED_LIST_ONLY)
    }

    fn serialize_unit(self) -> Result<(), WireError> {
        Err(TYPED_LIST_ONLY)
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<(), WireError> {
        Err(TYPED_LIST_ONLY)
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
    ) -> Result<(), WireError> {
        Err(TYPED_LIST_ONLY)
    }

    fn serialize_newtype_struct<T: Serialize + ?Sized>(
        self,
        _name: &'static str,
        _value: &T,
    ) -> Result<(), WireError> {
        Err(TYPED_LIST_ONLY)
    }

    fn serialize_newtype_variant<T: Serialize + ?Sized>(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _value: &T,
    ) -> Result<(), WireError> {
        Err(TYPED_LIST_ONLY)
    }

    fn serialize_seq(self, _len: Option<usize>) -> Result<Self::SerializeSeq, WireError> {
        Err(TYPED_LIST_ONLY)
    }

    fn serialize_tuple(self, _len: usize) -> Result<Self::SerializeTuple, WireError> {
        Err(TYPED_LIST_ONLY)
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleStruct, WireError> {
        Err(TYPED_LIST_ONLY)
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleVariant, WireError> {
        Err(TYPED_LIST_ONLY)
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<Self::SerializeMap, WireError> {
        Err(TYPED_LIST_ONLY)
    }

    fn serialize_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStruct, WireError> {
        Err(TYPED_LIST_ONLY)
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStructVariant, WireError> {
        Err(TYPED_LIST_ONLY)
    }
}
