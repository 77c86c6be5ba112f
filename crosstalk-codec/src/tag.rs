//! Wire discriminants for the standard binary format.
//!
//! Every encoded value starts with exactly one tag byte. The byte value of
//! each tag equals its position in the enumeration; the set is closed, and
//! any byte outside `0..=14` is a decode error.

use crate::error::WireError;

/// One-byte wire discriminant identifying the shape of the following payload.
///
/// The discriminant values are positional, not arbitrary: the external format
/// fixes them, and [`FieldTag::as_byte`] / [`FieldTag::from_byte`] convert
/// between the symbolic tag and the wire byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum FieldTag {
    /// Null value. No payload.
    Nil = 0,
    /// Boolean `true`. No payload; the tag alone carries the value.
    True = 1,
    /// Boolean `false`. No payload.
    False = 2,
    /// 32-bit signed integer, 4 little-endian payload bytes.
    Int32 = 3,
    /// 64-bit signed integer, 8 little-endian payload bytes.
    Int64 = 4,
    /// Reserved hex-encoded big integer. Never produced by the encoder.
    IntHex = 5,
    /// IEEE-754 double, 8-byte aligned, 8 payload bytes.
    Float64 = 6,
    /// UTF-8 string: size, then raw bytes.
    String = 7,
    /// Byte array: size, then raw bytes.
    U8List = 8,
    /// Array of 32-bit integers: size, 4-byte alignment, raw elements.
    I32List = 9,
    /// Array of 64-bit integers: size, 8-byte alignment, raw elements.
    I64List = 10,
    /// Array of 64-bit floats: size, 8-byte alignment, raw elements.
    F64List = 11,
    /// Heterogeneous list: size, then each element recursively encoded.
    List = 12,
    /// Map: pair count, then each key and value recursively encoded.
    Map = 13,
    /// Array of 32-bit floats: size, 4-byte alignment, raw elements.
    F32List = 14,
}

impl FieldTag {
    /// Returns the wire byte for this tag.
    pub fn as_byte(self) -> u8 {
        self as u8
    }

    /// Maps a wire byte back to its tag.
    ///
    /// # Errors
    ///
    /// Returns [`WireError::UnknownFieldTag`] for bytes outside the defined
    /// range.
    pub fn from_byte(byte: u8) -> Result<Self, WireError> {
        Ok(match byte {
            0 => FieldTag::Nil,
            1 => FieldTag::True,
            2 => FieldTag::False,
            3 => FieldTag::Int32,
            4 => FieldTag::Int64,
            5 => FieldTag::IntHex,
            6 => FieldTag::Float64,
            7 => FieldTag::String,
            8 => FieldTag::U8List,
            9 => FieldTag::I32List,
            10 => FieldTag::I64List,
            11 => FieldTag::F64List,
            12 => FieldTag::List,
            13 => FieldTag::Map,
            14 => FieldTag::F32List,
            _ => return Err(WireError::UnknownFieldTag { tag: byte }),
        })
    }
}

impl TryFrom<u8> for FieldTag {
    type Error = WireError;

    fn try_from(byte: u8) -> Result<Self, WireError> {
        FieldTag::from_byte(byte)
    }
}
