//! # Crosstalk
//!
//! Platform-channel messaging for embedders: a standard binary codec, a
//! serde bridge over it, and typed channels riding an opaque byte-buffer
//! messenger.
//!
//! ## Crate Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │              crosstalk (this crate)                         │
//! │   Channels + messenger seam, re-exports the codec           │
//! ├─────────────────────────────────────────────────────────────┤
//! │                  crosstalk-codec                            │
//! │  • FieldTag / Value / EncodingState / DecodingState         │
//! │  • serde bridge (to_bytes / from_bytes)                     │
//! │  • MethodCall / Envelope models                             │
//! │  • Standard / JSON / String / Binary codecs                 │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use crosstalk::prelude::*;
//!
//! let messenger = LoopbackMessenger::new();
//!
//! let service = MethodChannel::new(messenger.clone(), "app/math", StandardMethodCodec);
//! service.set_method_call_handler(|call, reply| match call.method.as_str() {
//!     "double" => {
//!         let doubled = call
//!             .arguments
//!             .as_ref()
//!             .and_then(Value::as_i64)
//!             .map(|n| Value::I64(n * 2));
//!         reply.success(doubled.as_ref());
//!     }
//!     _ => reply.not_implemented(),
//! });
//!
//! let client = MethodChannel::new(messenger, "app/math", StandardMethodCodec);
//! client
//!     .invoke_method_with_result("double", Some(Value::I64(21)), |result| {
//!         let envelope = result.expect("reply");
//!         assert_eq!(envelope.into_result().expect("success"), Some(Value::I64(42)));
//!     })
//!     .expect("invoke");
//! ```
//!
//! The messenger seam is the system boundary: windowing, engine bootstrap,
//! and transport live behind [`BinaryMessenger`] implementations and only
//! ever exchange opaque byte buffers with this crate.

#![deny(missing_docs)]
#![deny(clippy::unwrap_used)]

// =============================================================================
// Modules
// =============================================================================

/// Typed channels over a binary messenger.
pub mod channel;

/// Error types for the channel layer.
pub mod error;

/// The opaque byte-buffer messenger seam.
pub mod messenger;

/// Common imports.
pub mod prelude;

// =============================================================================
// Public API Re-exports
// =============================================================================

// Channel exports
pub use channel::{BasicMessageChannel, MethodChannel, MethodReply};

// Error exports
pub use error::ChannelError;

// Messenger exports
pub use messenger::{BinaryHandler, BinaryMessenger, BinaryReply, LoopbackMessenger};

// Codec re-exports for single-crate consumers
pub use crosstalk_codec::{
    from_bytes, to_bytes, BinaryCodec, Codec, CodecError, DecodingState, EncodingState, Envelope,
    FieldTag, JsonCodec, JsonMethodCodec, MessageCodec, MethodCall, MethodCodec, RemoteError,
    StandardCodec, StandardMethodCodec, StringCodec, Value, WireError,
};
