//! Channel for named method invocation with result envelopes.

use std::rc::Rc;

use crosstalk_codec::{Envelope, MethodCall, MethodCodec, RemoteError};

use crate::error::ChannelError;
use crate::messenger::{BinaryMessenger, BinaryReply};

/// A named channel carrying method calls one way and result envelopes back.
pub struct MethodChannel<C: MethodCodec> {
    messenger: Rc<dyn BinaryMessenger>,
    name: String,
    codec: C,
}

impl<C: MethodCodec> MethodChannel<C> {
    /// Creates a channel speaking `codec` over `messenger`.
    pub fn new(messenger: Rc<dyn BinaryMessenger>, name: impl Into<String>, codec: C) -> Self {
        Self {
            messenger,
            name: name.into(),
            codec,
        }
    }

    /// The channel name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Invokes a method, discarding the result.
    ///
    /// # Errors
    ///
    /// Fails on encoding errors or a detached channel.
    pub fn invoke_method(
        &self,
        method: impl Into<String>,
        arguments: Option<C::Value>,
    ) -> Result<(), ChannelError> {
        let call = MethodCall::new(method, arguments);
        let bytes = self.codec.encode_method_call(&call)?;
        self.messenger.send(&self.name, &bytes)
    }

    /// Invokes a method and hands the decoded result envelope to
    /// `on_result`. An absent reply surfaces as
    /// [`ChannelError::MethodNotImplemented`].
    ///
    /// # Errors
    ///
    /// Fails on encoding errors or a detached channel; `on_result` is not
    /// invoked in that case.
    pub fn invoke_method_with_result<F>(
        &self,
        method: impl Into<String>,
        arguments: Option<C::Value>,
        on_result: F,
    ) -> Result<(), ChannelError>
    where
        F: FnOnce(Result<Envelope<C::Value>, ChannelError>) + 'static,
    {
        let call = MethodCall::new(method, arguments);
        let bytes = self.codec.encode_method_call(&call)?;
        let codec = self.codec.clone();
        let channel = self.name.clone();
        let method = call.method;
        self.messenger.send_with_reply(
            &self.name,
            &bytes,
            Box::new(move |reply| {
                let outcome = match reply {
                    None => Err(ChannelError::MethodNotImplemented { channel, method }),
                    Some(bytes) => codec.decode_envelope(&bytes).map_err(ChannelError::from),
                };
                on_result(outcome);
            }),
        )
    }

    /// Installs a handler for incoming method calls.
    ///
    /// The handler answers through its [`MethodReply`]; a reply dropped
    /// unanswered counts as not-implemented. A call that fails to decode is
    /// logged and answered with an error envelope, so the caller gets a
    /// failure instead of silence.
    pub fn set_method_call_handler<F>(&self, mut handler: F)
    where
        F: FnMut(MethodCall<C::Value>, MethodReply<C>) + 'static,
    {
        let codec = self.codec.clone();
        let channel = self.name.clone();
        self.messenger.set_message_handler(
            &self.name,
            Some(Box::new(move |bytes, reply| {
                match codec.decode_method_call(bytes) {
                    Ok(call) => {
                        tracing::debug!(
                            "channel {}: dispatching method call {}",
                            channel,
                            call.method
                        );
                        handler(
                            call,
                            MethodReply {
                                codec: codec.clone(),
                                channel: channel.clone(),
                                reply: Some(reply),
                            },
                        );
                    }
                    Err(error) => {
                        tracing::warn!(
                            "channel {}: failed to decode method call: {}",
                            channel,
                            error
                        );
                        let envelope = codec.encode_error_envelope(
                            &RemoteError::new("decode-error").with_message(error.to_string()),
                        );
                        match envelope {
                            Ok(bytes) => reply(Some(bytes)),
                            Err(_) => reply(None),
                        }
                    }
                }
            })),
        );
    }

    /// Removes the handler installed by
    /// [`MethodChannel::set_method_call_handler`].
    pub fn unset_method_call_handler(&self) {
        self.messenger.set_message_handler(&self.name, None);
    }
}

/// One-shot reply handle passed to method call handlers.
///
/// Exactly one of [`MethodReply::success`], [`MethodReply::error`], or
/// [`MethodReply::not_implemented`] should be called; dropping the handle
/// unanswered replies not-implemented.
pub struct MethodReply<C: MethodCodec> {
    codec: C,
    channel: String,
    reply: Option<BinaryReply>,
}

impl<C: MethodCodec> MethodReply<C> {
    /// Answers with a success envelope.
    pub fn success(mut self, result: Option<&C::Value>) {
        if let Some(reply) = self.reply.take() {
            match self.codec.encode_success_envelope(result) {
                Ok(bytes) => reply(Some(bytes)),
                Err(error) => {
                    tracing::warn!(
                        "channel {}: failed to encode success envelope: {}",
                        self.channel,
                        error
                    );
                    reply(None);
                }
            }
        }
    }

    /// Answers with a failure envelope.
    pub fn error(mut self, error: &RemoteError<C::Value>) {
        if let Some(reply) = self.reply.take() {
            match self.codec.encode_error_envelope(error) {
                Ok(bytes) => reply(Some(bytes)),
                Err(encode_error) => {
                    tracing::warn!(
                        "channel {}: failed to encode error envelope: {}",
                        self.channel,
                        encode_error
                    );
                    reply(None);
                }
            }
        }
    }

    /// Answers that no handler implements the method.
    pub fn not_implemented(mut self) {
        if let Some(reply) = self.reply.take() {
            reply(None);
        }
    }
}

impl<C: MethodCodec> Drop for MethodReply<C> {
    fn drop(&mut self) {
        if let Some(reply) = self.reply.take() {
            reply(None);
        }
    }
}
