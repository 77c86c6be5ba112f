//! Common imports for crosstalk channels.
//!
//! This module provides a convenient prelude for importing commonly used
//! types and traits.

pub use crate::channel::{BasicMessageChannel, MethodChannel, MethodReply};
pub use crate::error::ChannelError;
pub use crate::messenger::{BinaryMessenger, BinaryReply, LoopbackMessenger};

// Re-export the codec surface
pub use crosstalk_codec::{
    Codec, Envelope, MessageCodec, MethodCall, MethodCodec, RemoteError, StandardCodec,
    StandardMethodCodec, Value,
};

// Re-export commonly used external types
pub use serde::{Deserialize, Serialize};
pub use std::rc::Rc;

/// Result type for channel operations.
pub type Result<T> = std::result::Result<T, ChannelError>;
