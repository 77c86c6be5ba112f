//! Pluggable message and method codecs.
//!
//! Three trait families cover the channel-facing surface:
//!
//! - [`Codec`] is the serde-generic boundary: encode any `Serialize` type,
//!   decode any `DeserializeOwned` type.
//! - [`MessageCodec`] is the dynamic boundary used by basic message
//!   channels: one fixed `Message` type per codec.
//! - [`MethodCodec`] covers method calls and result envelopes.
//!
//! [`StandardCodec`] implements the binary wire format; [`JsonCodec`] is the
//! human-readable alternative; [`StringCodec`] and [`BinaryCodec`] are the
//! passthrough codecs for plain-text and opaque-bytes channels.
//!
//! # Example
//!
//! ```rust
//! use crosstalk_codec::{Codec, StandardCodec};
//! use serde::{Serialize, Deserialize};
//!
//! #[derive(Serialize, Deserialize, Debug, PartialEq)]
//! struct Ping {
//!     seq: u32,
//! }
//!
//! let codec = StandardCodec;
//! let bytes = codec.encode(&Ping { seq: 1 }).unwrap();
//! let back: Ping = codec.decode(&bytes).unwrap();
//! assert_eq!(back, Ping { seq: 1 });
//! ```

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::de::{from_bytes, Deserializer};
use crate::error::WireError;
use crate::method::{Envelope, MethodCall, RemoteError};
use crate::reader::DecodingState;
use crate::ser::{to_bytes, Serializer};
use crate::value::Value;
use crate::writer::EncodingState;

/// Error type for codec operations.
///
/// The cause chain keeps the format-level error ([`WireError`] for the
/// standard codec, `serde_json::Error` for JSON) reachable via `source()`.
#[derive(Debug, Error)]
pub enum CodecError {
    /// Failed to encode a message to bytes.
    #[error("encode error: {0}")]
    Encode(#[source] Box<dyn std::error::Error + Send + Sync>),
    /// Failed to decode bytes to a message.
    #[error("decode error: {0}")]
    Decode(#[source] Box<dyn std::error::Error + Send + Sync>),
}

fn encode_err(err: impl std::error::Error + Send + Sync + 'static) -> CodecError {
    CodecError::Encode(Box::new(err))
}

fn decode_err(err: impl std::error::Error + Send + Sync + 'static) -> CodecError {
    CodecError::Decode(Box::new(err))
}

/// Serde-generic message serialization.
///
/// The trait requires `Clone + 'static` so codec instances can be stored in
/// channels and handler closures.
pub trait Codec: Clone + 'static {
    /// Encodes a serializable message to bytes.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::Encode`] if serialization fails.
    fn encode<T: Serialize>(&self, message: &T) -> Result<Vec<u8>, CodecError>;

    /// Decodes bytes to a deserializable message.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::Decode`] if deserialization fails.
    fn decode<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T, CodecError>;
}

/// Dynamic message serialization with one fixed message type per codec.
pub trait MessageCodec: Clone + 'static {
    /// The message type this codec carries.
    type Message;

    /// Encodes a message to bytes.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::Encode`] if serialization fails.
    fn encode_message(&self, message: &Self::Message) -> Result<Vec<u8>, CodecError>;

    /// Decodes bytes to a message. A zero-length buffer decodes as the
    /// codec's null message where one exists.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::Decode`] if deserialization fails.
    fn decode_message(&self, bytes: &[u8]) -> Result<Self::Message, CodecError>;
}

/// Method call and result envelope serialization.
pub trait MethodCodec: Clone + 'static {
    /// The value type carried in arguments, results, and error details.
    type Value;

    /// Encodes a method call.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::Encode`] if serialization fails.
    fn encode_method_call(&self, call: &MethodCall<Self::Value>) -> Result<Vec<u8>, CodecError>;

    /// Decodes a method call.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::Decode`] if deserialization fails.
    fn decode_method_call(&self, bytes: &[u8]) -> Result<MethodCall<Self::Value>, CodecError>;

    /// Encodes a success envelope around an optional result.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::Encode`] if serialization fails.
    fn encode_success_envelope(
        &self,
        result: Option<&Self::Value>,
    ) -> Result<Vec<u8>, CodecError>;

    /// Encodes a failure envelope around a structured error.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::Encode`] if serialization fails.
    fn encode_error_envelope(
        &self,
        error: &RemoteError<Self::Value>,
    ) -> Result<Vec<u8>, CodecError>;

    /// Decodes a result envelope, discriminating success from failure.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::Decode`] if deserialization fails or the
    /// envelope shape matches neither arm.
    fn decode_envelope(&self, bytes: &[u8]) -> Result<Envelope<Self::Value>, CodecError>;
}

/// The standard binary codec.
///
/// Implements [`Codec`] through the generic bridge and [`MessageCodec`] over
/// dynamic [`Value`] payloads. Both paths produce identical bytes.
#[derive(Clone, Copy, Debug, Default)]
pub struct StandardCodec;

impl Codec for StandardCodec {
    fn encode<T: Serialize>(&self, message: &T) -> Result<Vec<u8>, CodecError> {
        to_bytes(message).map_err(encode_err)
    }

    fn decode<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T, CodecError> {
        from_bytes(bytes).map_err(decode_err)
    }
}

impl MessageCodec for StandardCodec {
    type Message = Value;

    fn encode_message(&self, message: &Value) -> Result<Vec<u8>, CodecError> {
        let mut state = EncodingState::new();
        state.write_value(message).map_err(encode_err)?;
        Ok(state.into_bytes())
    }

    fn decode_message(&self, bytes: &[u8]) -> Result<Value, CodecError> {
        if bytes.is_empty() {
            return Ok(Value::Nil);
        }
        let mut state = DecodingState::new(bytes);
        let value = state.read_value().map_err(decode_err)?;
        if !state.is_at_end() {
            return Err(decode_err(WireError::TrailingBytes {
                remaining: state.remaining(),
            }));
        }
        Ok(value)
    }
}

/// The standard binary method codec.
///
/// The trait surface works on dynamic [`Value`] payloads; the typed inherent
/// methods ([`StandardMethodCodec::encode_call`] and friends) accept any
/// serde-compatible argument and result types through the generic bridge.
#[derive(Clone, Copy, Debug, Default)]
pub struct StandardMethodCodec;

impl StandardMethodCodec {
    /// Encodes a method call with typed arguments: the method name and the
    /// arguments (or `nil`) concatenated as a top-level 2-sequence.
    ///
    /// # Errors
    ///
    /// Propagates [`WireError`] from either write.
    pub fn encode_call<A: Serialize>(&self, call: &MethodCall<A>) -> Result<Vec<u8>, WireError> {
        let mut state = EncodingState::new();
        state.write_string(&call.method)?;
        match &call.arguments {
            Some(arguments) => arguments.serialize(Serializer::new(&mut state))?,
            None => state.write_nil(),
        }
        Ok(state.into_bytes())
    }

    /// Decodes a method call with typed arguments.
    ///
    /// # Errors
    ///
    /// Propagates [`WireError`] from either read.
    pub fn decode_call<A: DeserializeOwned>(
        &self,
        bytes: &[u8],
    ) -> Result<MethodCall<A>, WireError> {
        let mut deserializer = Deserializer::new(bytes);
        let method = String::deserialize(&mut deserializer)?;
        let arguments = Option::<A>::deserialize(&mut deserializer)?;
        deserializer.end()?;
        Ok(MethodCall { method, arguments })
    }

    /// Encodes a success envelope: a single top-level element, the result
    /// value or `nil`.
    ///
    /// # Errors
    ///
    /// Propagates [`WireError`] from the write.
    pub fn encode_success<S: Serialize>(&self, result: Option<&S>) -> Result<Vec<u8>, WireError> {
        let mut state = EncodingState::new();
        match result {
            Some(value) => value.serialize(Serializer::new(&mut state))?,
            None => state.write_nil(),
        }
        Ok(state.into_bytes())
    }

    /// Encodes a failure envelope: code, message, details, and — only when
    /// present — a stacktrace as the fourth element.
    ///
    /// # Errors
    ///
    /// Propagates [`WireError`] from any write.
    pub fn encode_error<S: Serialize>(
        &self,
        error: &RemoteError<S>,
    ) -> Result<Vec<u8>, WireError> {
        let mut state = EncodingState::new();
        state.write_string(&error.code)?;
        match &error.message {
            Some(message) => state.write_string(message)?,
            None => state.write_nil(),
        }
        match &error.details {
            Some(details) => details.serialize(Serializer::new(&mut state))?,
            None => state.write_nil(),
        }
        if let Some(stacktrace) = &error.stacktrace {
            state.write_string(stacktrace)?;
        }
        Ok(state.into_bytes())
    }

    /// Decodes a result envelope by counting top-level elements: one element
    /// is success, three or four are failure, anything else is an unknown
    /// discriminant.
    ///
    /// # Errors
    ///
    /// Propagates [`WireError`] from any read, including
    /// [`WireError::UnknownDiscriminant`] for unrecognized shapes.
    pub fn decode_envelope_as<S: DeserializeOwned>(
        &self,
        bytes: &[u8],
    ) -> Result<Envelope<S>, WireError> {
        let mut probe = DecodingState::new(bytes);
        let mut count = 0usize;
        while !probe.is_at_end() {
            probe.skip_value()?;
            count += 1;
        }
        match count {
            1 => {
                let mut deserializer = Deserializer::new(bytes);
                let value = Option::<S>::deserialize(&mut deserializer)?;
                deserializer.end()?;
                Ok(Envelope::Success(value))
            }
            3 | 4 => {
                let mut deserializer = Deserializer::new(bytes);
                let code = String::deserialize(&mut deserializer)?;
                let message = Option::<String>::deserialize(&mut deserializer)?;
                let details = Option::<S>::deserialize(&mut deserializer)?;
                let stacktrace = if count == 4 {
                    Option::<String>::deserialize(&mut deserializer)?
                } else {
                    None
                };
                deserializer.end()?;
                Ok(Envelope::Failure(RemoteError {
                    code,
                    message,
                    details,
                    stacktrace,
                }))
            }
            count => Err(WireError::UnknownDiscriminant { count }),
        }
    }
}

impl MethodCodec for StandardMethodCodec {
    type Value = Value;

    fn encode_method_call(&self, call: &MethodCall) -> Result<Vec<u8>, CodecError> {
        self.encode_call(call).map_err(encode_err)
    }

    fn decode_method_call(&self, bytes: &[u8]) -> Result<MethodCall, CodecError> {
        self.decode_call(bytes).map_err(decode_err)
    }

    fn encode_success_envelope(&self, result: Option<&Value>) -> Result<Vec<u8>, CodecError> {
        self.encode_success(result).map_err(encode_err)
    }

    fn encode_error_envelope(&self, error: &RemoteError) -> Result<Vec<u8>, CodecError> {
        self.encode_error(error).map_err(encode_err)
    }

    fn decode_envelope(&self, bytes: &[u8]) -> Result<Envelope, CodecError> {
        self.decode_envelope_as(bytes).map_err(decode_err)
    }
}

/// JSON codec using serde_json.
///
/// Human-readable alternative to the standard codec; handy for debugging
/// with packet inspection at the cost of wire size.
#[derive(Clone, Copy, Debug, Default)]
pub struct JsonCodec;

impl Codec for JsonCodec {
    fn encode<T: Serialize>(&self, message: &T) -> Result<Vec<u8>, CodecError> {
        serde_json::to_vec(message).map_err(encode_err)
    }

    fn decode<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T, CodecError> {
        serde_json::from_slice(bytes).map_err(decode_err)
    }
}

impl MessageCodec for JsonCodec {
    type Message = serde_json::Value;

    fn encode_message(&self, message: &serde_json::Value) -> Result<Vec<u8>, CodecError> {
        serde_json::to_vec(message).map_err(encode_err)
    }

    fn decode_message(&self, bytes: &[u8]) -> Result<serde_json::Value, CodecError> {
        if bytes.is_empty() {
            return Ok(serde_json::Value::Null);
        }
        serde_json::from_slice(bytes).map_err(decode_err)
    }
}

fn json_shape_err(message: &str) -> CodecError {
    CodecError::Decode(Box::new(<serde_json::Error as serde::de::Error>::custom(
        message,
    )))
}

/// JSON method codec.
///
/// A call is `{"method": .., "args": ..}`; an envelope is a JSON array of
/// one element for success, three or four for failure.
#[derive(Clone, Copy, Debug, Default)]
pub struct JsonMethodCodec;

impl MethodCodec for JsonMethodCodec {
    type Value = serde_json::Value;

    fn encode_method_call(
        &self,
        call: &MethodCall<serde_json::Value>,
    ) -> Result<Vec<u8>, CodecError> {
        let payload = serde_json::json!({
            "method": call.method,
            "args": call.arguments,
        });
        serde_json::to_vec(&payload).map_err(encode_err)
    }

    fn decode_method_call(
        &self,
        bytes: &[u8],
    ) -> Result<MethodCall<serde_json::Value>, CodecError> {
        let value: serde_json::Value = serde_json::from_slice(bytes).map_err(decode_err)?;
        let object = value
            .as_object()
            .ok_or_else(|| json_shape_err("method call must be a JSON object"))?;
        let method = object
            .get("method")
            .and_then(serde_json::Value::as_str)
            .ok_or_else(|| json_shape_err("method call is missing a string \"method\""))?
            .to_string();
        let arguments = match object.get("args") {
            None | Some(serde_json::Value::Null) => None,
            Some(args) => Some(args.clone()),
        };
        Ok(MethodCall { method, arguments })
    }

    fn encode_success_envelope(
        &self,
        result: Option<&serde_json::Value>,
    ) -> Result<Vec<u8>, CodecError> {
        let envelope = vec![result.cloned().unwrap_or(serde_json::Value::Null)];
        serde_json::to_vec(&envelope).map_err(encode_err)
    }

    fn encode_error_envelope(
        &self,
        error: &RemoteError<serde_json::Value>,
    ) -> Result<Vec<u8>, CodecError> {
        let mut envelope = vec![
            serde_json::Value::String(error.code.clone()),
            error
                .message
                .clone()
                .map_or(serde_json::Value::Null, serde_json::Value::String),
            error.details.clone().unwrap_or(serde_json::Value::Null),
        ];
        if let Some(stacktrace) = &error.stacktrace {
            envelope.push(serde_json::Value::String(stacktrace.clone()));
        }
        serde_json::to_vec(&envelope).map_err(encode_err)
    }

    fn decode_envelope(&self, bytes: &[u8]) -> Result<Envelope<serde_json::Value>, CodecError> {
        let value: serde_json::Value = serde_json::from_slice(bytes).map_err(decode_err)?;
        let elements = value
            .as_array()
            .ok_or_else(|| json_shape_err("envelope must be a JSON array"))?;
        match elements.len() {
            1 => Ok(Envelope::Success(match &elements[0] {
                serde_json::Value::Null => None,
                result => Some(result.clone()),
            })),
            count @ (3 | 4) => {
                let code = elements[0]
                    .as_str()
                    .ok_or_else(|| json_shape_err("error code must be a string"))?
                    .to_string();
                let message = match &elements[1] {
                    serde_json::Value::Null => None,
                    serde_json::Value::String(message) => Some(message.clone()),
                    _ => return Err(json_shape_err("error message must be a string or null")),
                };
                let details = match &elements[2] {
                    serde_json::Value::Null => None,
                    details => Some(details.clone()),
                };
                let stacktrace = if count == 4 {
                    match &elements[3] {
                        serde_json::Value::Null => None,
                        serde_json::Value::String(trace) => Some(trace.clone()),
                        _ => return Err(json_shape_err("stacktrace must be a string or null")),
                    }
                } else {
                    None
                };
                Ok(Envelope::Failure(RemoteError {
                    code,
                    message,
                    details,
                    stacktrace,
                }))
            }
            count => Err(decode_err(WireError::UnknownDiscriminant { count })),
        }
    }
}

/// UTF-8 string passthrough codec.
#[derive(Clone, Copy, Debug, Default)]
pub struct StringCodec;

impl MessageCodec for StringCodec {
    type Message = String;

    fn encode_message(&self, message: &String) -> Result<Vec<u8>, CodecError> {
        Ok(message.as_bytes().to_vec())
    }

    fn decode_message(&self, bytes: &[u8]) -> Result<String, CodecError> {
        std::str::from_utf8(bytes)
            .map(str::to_string)
            .map_err(|e| decode_err(WireError::StringNotDecodable(e)))
    }
}

/// Opaque byte passthrough codec.
#[derive(Clone, Copy, Debug, Default)]
pub struct BinaryCodec;

impl MessageCodec for BinaryCodec {
    type Message = Vec<u8>;

    fn encode_message(&self, message: &Vec<u8>) -> Result<Vec<u8>, CodecError> {
        Ok(message.clone())
    }

    fn decode_message(&self, bytes: &[u8]) -> Result<Vec<u8>, CodecError> {
        Ok(bytes.to_vec())
    }
}
