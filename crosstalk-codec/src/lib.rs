//! # Crosstalk Standard Codec
//!
//! The binary message format spoken across platform-channel boundaries,
//! plus the serde bridge that walks arbitrary structured values through it.
//!
//! This crate provides:
//! - **Wire primitives**: [`EncodingState`] and [`DecodingState`], the
//!   append-only writer and validating cursor for the tagged, size-prefixed,
//!   alignment-sensitive format
//! - **Dynamic values**: [`Value`], a recursive tagged union mirroring the
//!   wire format's expressiveness
//! - **Generic bridge**: [`to_bytes`] / [`from_bytes`], a serde
//!   serializer/deserializer pair over the wire primitives
//! - **Method protocol**: [`MethodCall`] and [`Envelope`], the two
//!   fixed-shape records used for method invocation and results
//! - **Codec family**: [`StandardCodec`], [`JsonCodec`], [`StringCodec`],
//!   and [`BinaryCodec`] behind the [`Codec`], [`MessageCodec`], and
//!   [`MethodCodec`] traits
//!
//! Encoding and decoding are pure, synchronous functions over in-memory
//! buffers. Each call owns its own state, so the codec is safe to use from
//! multiple threads as long as states are not shared.

#![deny(missing_docs)]
#![deny(clippy::unwrap_used)]

// =============================================================================
// Modules
// =============================================================================

/// Pluggable message and method codecs.
pub mod codec;

/// Generic decoder bridge (serde deserializer).
pub mod de;

/// Error types for the wire format.
pub mod error;

/// Method call and result envelope models.
pub mod method;

/// Decoding cursor and format validation.
pub mod reader;

/// Generic encoder bridge (serde serializer).
pub mod ser;

/// Wire discriminants.
pub mod tag;

/// Dynamic value model.
pub mod value;

/// Append-only encoding buffer.
pub mod writer;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use codec::{
    BinaryCodec, Codec, CodecError, JsonCodec, JsonMethodCodec, MessageCodec, MethodCodec,
    StandardCodec, StandardMethodCodec, StringCodec,
};
pub use de::{from_bytes, Deserializer};
pub use error::WireError;
pub use method::{Envelope, MethodCall, RemoteError};
pub use reader::{DecodingState, MAX_DEPTH};
pub use ser::{to_bytes, Serializer};
pub use tag::FieldTag;
pub use value::Value;
pub use writer::EncodingState;
