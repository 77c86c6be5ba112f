//! Typed channels over a [`BinaryMessenger`](crate::messenger::BinaryMessenger).
//!
//! - [`BasicMessageChannel`] sends and receives one codec-defined message
//!   type.
//! - [`MethodChannel`] layers named method invocation and result envelopes
//!   on top.
//!
//! Channels are thin: they compose a codec with a messenger and add the
//! boundary behavior — a method call that fails to decode is answered with
//! an error envelope, and an absent reply surfaces as not-implemented.

mod basic;
mod method;

pub use basic::BasicMessageChannel;
pub use method::{MethodChannel, MethodReply};
