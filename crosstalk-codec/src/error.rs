//! Error types for the standard binary format.
//!
//! Every failure is detected by the exact primitive that hit it and
//! propagates unmodified to the top-level encode/decode caller. There is no
//! partial recovery: a malformed buffer aborts the whole decode.

use std::str::Utf8Error;

use thiserror::Error;

use crate::tag::FieldTag;

/// Format-level error for standard codec encode and decode operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum WireError {
    /// Fewer bytes remain than a structural read requires.
    #[error("unexpected end of input")]
    UnexpectedEof,

    /// A tag byte outside the defined range was encountered.
    #[error("unknown field tag byte {tag:#04x}")]
    UnknownFieldTag {
        /// The raw tag byte.
        tag: u8,
    },

    /// The decoder expected one wire shape and found another.
    #[error("unexpected field tag {actual:?}, expected {expected:?}")]
    UnexpectedFieldTag {
        /// The tag the decoder was prepared to read.
        expected: FieldTag,
        /// The tag actually present in the buffer.
        actual: FieldTag,
    },

    /// Alignment padding would consume more bytes than remain.
    #[error("alignment padding of {padding} bytes exceeds {remaining} remaining")]
    InvalidAlignment {
        /// Zero bytes the alignment rule requires.
        padding: usize,
        /// Bytes left in the buffer.
        remaining: usize,
    },

    /// A narrowing integer conversion would lose information.
    #[error("integer {value} does not fit the requested width")]
    IntegerOutOfRange {
        /// The decoded wire value, widened to 64 bits.
        value: i64,
    },

    /// A string payload was not valid UTF-8.
    #[error("string payload is not valid UTF-8: {0}")]
    StringNotDecodable(#[source] Utf8Error),

    /// A size value exceeds the 32-bit size-field ceiling.
    #[error("size {size} exceeds the 32-bit wire limit")]
    SizeTooLarge {
        /// The offending size.
        size: usize,
    },

    /// An envelope element count matched none of the known shapes.
    #[error("unknown envelope shape: {count} top-level elements")]
    UnknownDiscriminant {
        /// Number of top-level elements found.
        count: usize,
    },

    /// Value nesting exceeded the decoder's recursion limit.
    #[error("value nesting exceeds the depth limit of {max}")]
    DepthLimitExceeded {
        /// The configured maximum depth.
        max: usize,
    },

    /// A top-level decode left unconsumed bytes in the buffer.
    #[error("{remaining} trailing bytes after a complete value")]
    TrailingBytes {
        /// Bytes left over after the value.
        remaining: usize,
    },

    /// The value cannot be represented in the wire format.
    #[error("unsupported value: {0}")]
    Unsupported(&'static str),

    /// A custom message raised by the generic bridge.
    #[error("{0}")]
    Message(String),
}

impl serde::ser::Error for WireError {
    fn custom<T: std::fmt::Display>(msg: T) -> Self {
        WireError::Message(msg.to_string())
    }
}

impl serde::de::Error for WireError {
    fn custom<T: std::fmt::Display>(msg: T) -> Self {
        WireError::Message(msg.to_string())
    }
}
