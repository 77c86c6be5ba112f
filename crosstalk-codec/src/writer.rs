//! Append-only encoding state for the standard binary format.
//!
//! # Wire layout
//!
//! ```text
//! [tag: 1 byte]                       // FieldTag discriminant
//! [size: 1 | 3 | 5 bytes]            // u8 <254, or 0xFE+u16, or 0xFF+u32
//! [alignment: 0..width-1 zero bytes]  // multi-byte numeric payloads only
//! [payload: N bytes]                  // little-endian
//! ```
//!
//! All multi-byte payloads are little-endian. Alignment is computed against
//! bytes written since the start of the buffer, so a numeric payload always
//! begins at an offset divisible by its natural width; the decoder mirrors
//! the same rule against bytes consumed.

use crate::error::WireError;
use crate::tag::FieldTag;
use crate::value::{sorted_entries, Value};

/// Append-only byte buffer with primitives for each wire element.
///
/// Created per top-level encode call and consumed into the finished message
/// with [`EncodingState::into_bytes`]. The buffer never shrinks.
#[derive(Debug, Default)]
pub struct EncodingState {
    data: Vec<u8>,
}

impl EncodingState {
    /// Creates an empty encoding state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bytes written so far.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns true when nothing has been written yet.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Consumes the state into the encoded message.
    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }

    /// Appends one tag byte.
    pub fn write_tag(&mut self, tag: FieldTag) {
        self.data.push(tag.as_byte());
    }

    /// Appends a variable-length size field.
    ///
    /// Sizes below 254 take a single byte; sizes up to 65535 take `0xFE`
    /// plus a little-endian u16; sizes up to `u32::MAX` take `0xFF` plus a
    /// little-endian u32.
    ///
    /// # Errors
    ///
    /// Returns [`WireError::SizeTooLarge`] when the size exceeds 32 bits.
    pub fn write_size(&mut self, size: usize) -> Result<(), WireError> {
        if size < 254 {
            self.data.push(size as u8);
        } else if size <= usize::from(u16::MAX) {
            self.data.push(254);
            self.data.extend_from_slice(&(size as u16).to_le_bytes());
        } else if u32::try_from(size).is_ok() {
            self.data.push(255);
            self.data.extend_from_slice(&(size as u32).to_le_bytes());
        } else {
            return Err(WireError::SizeTooLarge { size });
        }
        Ok(())
    }

    /// Appends zero bytes so the next write begins at a multiple of
    /// `alignment` from the start of the buffer. No-op when already aligned.
    pub fn write_alignment(&mut self, alignment: usize) {
        let misalignment = self.data.len() % alignment;
        if misalignment != 0 {
            self.data.resize(self.data.len() + alignment - misalignment, 0);
        }
    }

    /// Appends a `nil` tag. No payload.
    pub fn write_nil(&mut self) {
        self.write_tag(FieldTag::Nil);
    }

    /// Appends a boolean. The tag alone carries the value.
    pub fn write_bool(&mut self, value: bool) {
        self.write_tag(if value { FieldTag::True } else { FieldTag::False });
    }

    /// Appends a 32-bit integer: tag plus four little-endian bytes.
    pub fn write_i32(&mut self, value: i32) {
        self.write_tag(FieldTag::Int32);
        self.data.extend_from_slice(&value.to_le_bytes());
    }

    /// Appends a 64-bit integer: tag plus eight little-endian bytes.
    pub fn write_i64(&mut self, value: i64) {
        self.write_tag(FieldTag::Int64);
        self.data.extend_from_slice(&value.to_le_bytes());
    }

    /// Appends a 64-bit float: tag, alignment to 8 bytes, then the payload.
    pub fn write_f64(&mut self, value: f64) {
        self.write_tag(FieldTag::Float64);
        self.write_alignment(8);
        self.data.extend_from_slice(&value.to_le_bytes());
    }

    /// Appends a string: tag, byte length, raw UTF-8 bytes.
    ///
    /// # Errors
    ///
    /// Returns [`WireError::SizeTooLarge`] when the byte length exceeds the
    /// size-field ceiling.
    pub fn write_string(&mut self, value: &str) -> Result<(), WireError> {
        self.write_tag(FieldTag::String);
        self.write_size(value.len())?;
        self.data.extend_from_slice(value.as_bytes());
        Ok(())
    }

    /// Appends a byte array: tag, count, raw bytes. Byte-granular, so no
    /// alignment is needed.
    ///
    /// # Errors
    ///
    /// Returns [`WireError::SizeTooLarge`] when the count exceeds the
    /// size-field ceiling.
    pub fn write_u8_list(&mut self, values: &[u8]) -> Result<(), WireError> {
        self.write_tag(FieldTag::U8List);
        self.write_size(values.len())?;
        self.data.extend_from_slice(values);
        Ok(())
    }

    /// Appends a packed 32-bit integer array: tag, count, 4-byte alignment,
    /// raw little-endian elements.
    ///
    /// # Errors
    ///
    /// Returns [`WireError::SizeTooLarge`] when the count exceeds the
    /// size-field ceiling.
    pub fn write_i32_list(&mut self, values: &[i32]) -> Result<(), WireError> {
        self.write_tag(FieldTag::I32List);
        self.write_size(values.len())?;
        self.write_alignment(4);
        for v in values {
            self.data.extend_from_slice(&v.to_le_bytes());
        }
        Ok(())
    }

    /// Appends a packed 64-bit integer array: tag, count, 8-byte alignment,
    /// raw little-endian elements.
    ///
    /// # Errors
    ///
    /// Returns [`WireError::SizeTooLarge`] when the count exceeds the
    /// size-field ceiling.
    pub fn write_i64_list(&mut self, values: &[i64]) -> Result<(), WireError> {
        self.write_tag(FieldTag::I64List);
        self.write_size(values.len())?;
        self.write_alignment(8);
        for v in values {
            self.data.extend_from_slice(&v.to_le_bytes());
        }
        Ok(())
    }

    /// Appends a packed 32-bit float array: tag, count, 4-byte alignment,
    /// raw little-endian elements.
    ///
    /// # Errors
    ///
    /// Returns [`WireError::SizeTooLarge`] when the count exceeds the
    /// size-field ceiling.
    pub fn write_f32_list(&mut self, values: &[f32]) -> Result<(), WireError> {
        self.write_tag(FieldTag::F32List);
        self.write_size(values.len())?;
        self.write_alignment(4);
        for v in values {
            self.data.extend_from_slice(&v.to_le_bytes());
        }
        Ok(())
    }

    /// Appends a packed 64-bit float array: tag, count, 8-byte alignment,
    /// raw little-endian elements.
    ///
    /// # Errors
    ///
    /// Returns [`WireError::SizeTooLarge`] when the count exceeds the
    /// size-field ceiling.
    pub fn write_f64_list(&mut self, values: &[f64]) -> Result<(), WireError> {
        self.write_tag(FieldTag::F64List);
        self.write_size(values.len())?;
        self.write_alignment(8);
        for v in values {
            self.data.extend_from_slice(&v.to_le_bytes());
        }
        Ok(())
    }

    /// Appends a heterogeneous list: tag, element count, each element
    /// recursively encoded.
    ///
    /// # Errors
    ///
    /// Propagates the first failure from any element.
    pub fn write_list(&mut self, items: &[Value]) -> Result<(), WireError> {
        self.write_tag(FieldTag::List);
        self.write_size(items.len())?;
        for item in items {
            self.write_value(item)?;
        }
        Ok(())
    }

    /// Appends a map: tag, pair count, each key and value recursively
    /// encoded. Entries are ordered by their standalone key encoding so the
    /// wire output is deterministic.
    ///
    /// # Errors
    ///
    /// Propagates the first failure from any key or value.
    pub fn write_map(
        &mut self,
        entries: &std::collections::HashMap<Value, Value>,
    ) -> Result<(), WireError> {
        self.write_tag(FieldTag::Map);
        self.write_size(entries.len())?;
        for (k, v) in sorted_entries(entries)? {
            self.write_value(k)?;
            self.write_value(v)?;
        }
        Ok(())
    }

    /// Appends any [`Value`], dispatching to the matching primitive.
    ///
    /// # Errors
    ///
    /// Propagates failures from size fields and nested values.
    pub fn write_value(&mut self, value: &Value) -> Result<(), WireError> {
        match value {
            Value::Nil => self.write_nil(),
            Value::Bool(b) => self.write_bool(*b),
            Value::I32(v) => self.write_i32(*v),
            Value::I64(v) => self.write_i64(*v),
            Value::F64(v) => self.write_f64(*v),
            Value::String(s) => self.write_string(s)?,
            Value::U8List(v) => self.write_u8_list(v)?,
            Value::I32List(v) => self.write_i32_list(v)?,
            Value::I64List(v) => self.write_i64_list(v)?,
            Value::F32List(v) => self.write_f32_list(v)?,
            Value::F64List(v) => self.write_f64_list(v)?,
            Value::List(items) => self.write_list(items)?,
            Value::Map(entries) => self.write_map(entries)?,
        }
        Ok(())
    }

    pub(crate) fn push_raw(&mut self, bytes: &[u8]) {
        self.data.extend_from_slice(bytes);
    }
}
