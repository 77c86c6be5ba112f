//! Channel for passing codec-typed messages.

use std::rc::Rc;

use crosstalk_codec::MessageCodec;

use crate::error::ChannelError;
use crate::messenger::BinaryMessenger;

/// A named channel carrying one message type in both directions.
///
/// The codec decides the message type: [`StandardCodec`] channels carry
/// dynamic [`Value`]s, [`StringCodec`] channels carry strings, and so on.
///
/// [`StandardCodec`]: crosstalk_codec::StandardCodec
/// [`StringCodec`]: crosstalk_codec::StringCodec
/// [`Value`]: crosstalk_codec::Value
pub struct BasicMessageChannel<C: MessageCodec> {
    messenger: Rc<dyn BinaryMessenger>,
    name: String,
    codec: C,
}

impl<C: MessageCodec> BasicMessageChannel<C> {
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

    /// Sends a message with no interest in the reply.
    ///
    /// # Errors
    ///
    /// Fails on encoding errors or a detached channel.
    pub fn send(&self, message: &C::Message) -> Result<(), ChannelError> {
        let bytes = self.codec.encode_message(message)?;
        self.messenger.send(&self.name, &bytes)
    }

    /// Sends a message and hands the decoded reply to `on_reply`.
    ///
    /// An absent reply is delivered as `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Fails on encoding errors or a detached channel; `on_reply` is not
    /// invoked in that case.
    pub fn send_with_reply<F>(&self, message: &C::Message, on_reply: F) -> Result<(), ChannelError>
    where
        F: FnOnce(Result<Option<C::Message>, ChannelError>) + 'static,
    {
        let bytes = self.codec.encode_message(message)?;
        let codec = self.codec.clone();
        self.messenger.send_with_reply(
            &self.name,
            &bytes,
            Box::new(move |reply| {
                let outcome = match reply {
                    None => Ok(None),
                    Some(bytes) => codec
                        .decode_message(&bytes)
                        .map(Some)
                        .map_err(ChannelError::from),
                };
                on_reply(outcome);
            }),
        )
    }

    /// Installs a handler for incoming messages. The handler's return value,
    /// if any, is encoded and sent back as the reply.
    ///
    /// A message that fails to decode is logged and answered with an empty
    /// reply; the sender sees `Ok(None)`.
    pub fn set_message_handler<F>(&self, mut handler: F)
    where
        F: FnMut(&C::Message) -> Option<C::Message> + 'static,
    {
        let codec = self.codec.clone();
        let channel = self.name.clone();
        self.messenger.set_message_handler(
            &self.name,
            Some(Box::new(move |bytes, reply| {
                let message = match codec.decode_message(bytes) {
                    Ok(message) => message,
                    Err(error) => {
                        tracing::warn!(
                            "channel {}: failed to decode incoming message: {}",
                            channel,
                            error
                        );
                        reply(None);
                        return;
                    }
                };
                match handler(&message) {
                    Some(response) => match codec.encode_message(&response) {
                        Ok(encoded) => reply(Some(encoded)),
                        Err(error) => {
                            tracing::warn!(
                                "channel {}: failed to encode reply: {}",
                                channel,
                                error
                            );
                            reply(None);
                        }
                    },
                    None => reply(None),
                }
            })),
        );
    }

    /// Removes the handler installed by
    /// [`BasicMessageChannel::set_message_handler`].
    pub fn unset_message_handler(&self) {
        self.messenger.set_message_handler(&self.name, None);
    }
}
