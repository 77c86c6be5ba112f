//! The opaque-byte-buffer seam between channels and the host platform.
//!
//! Everything below a channel — engine bindings, window plumbing, process
//! transport — only has to satisfy [`BinaryMessenger`]: deliver a byte
//! buffer to a named channel and, optionally, carry one reply back. The
//! codec layer never sees any of it.
//!
//! [`LoopbackMessenger`] is an in-process implementation that routes sends
//! straight into registered handlers, for tests and examples.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::error::ChannelError;

/// One-shot reply callback. `None` means "nobody handled this", which
/// channels surface as not-implemented.
pub type BinaryReply = Box<dyn FnOnce(Option<Vec<u8>>)>;

/// Per-channel handler for incoming byte buffers. Every invocation receives
/// a reply callback it must eventually call (dropping an unanswered reply is
/// equivalent to replying `None`).
pub type BinaryHandler = Box<dyn FnMut(&[u8], BinaryReply)>;

/// Delivers opaque byte buffers between channels and the platform.
///
/// Single-threaded by design: messengers and their handlers live on the
/// platform thread and are shared with `Rc`, never across threads.
pub trait BinaryMessenger {
    /// Sends a message with no interest in the reply.
    ///
    /// # Errors
    ///
    /// Returns [`ChannelError::Detached`] when the target channel cannot
    /// accept messages.
    fn send(&self, channel: &str, message: &[u8]) -> Result<(), ChannelError>;

    /// Sends a message and routes the reply to `reply`.
    ///
    /// # Errors
    ///
    /// Returns [`ChannelError::Detached`] when the target channel cannot
    /// accept messages; `reply` is not invoked in that case.
    fn send_with_reply(
        &self,
        channel: &str,
        message: &[u8],
        reply: BinaryReply,
    ) -> Result<(), ChannelError>;

    /// Installs or removes the handler for a channel. Passing `None`
    /// unregisters.
    fn set_message_handler(&self, channel: &str, handler: Option<BinaryHandler>);
}

/// In-process messenger: sends are dispatched synchronously to the handler
/// registered for the channel.
///
/// The handler is taken out of the registry for the duration of its own
/// invocation, so a handler re-registering itself wins over the old
/// registration; re-entrant sends to the same channel see it as detached.
#[derive(Default)]
pub struct LoopbackMessenger {
    handlers: RefCell<HashMap<String, BinaryHandler>>,
}

impl LoopbackMessenger {
    /// Creates a messenger ready for sharing between channels.
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    fn dispatch(
        &self,
        channel: &str,
        message: &[u8],
        reply: BinaryReply,
    ) -> Result<(), ChannelError> {
        let mut handler = self
            .handlers
            .borrow_mut()
            .remove(channel)
            .ok_or_else(|| ChannelError::Detached {
                channel: channel.to_string(),
            })?;
        handler(message, reply);
        self.handlers
            .borrow_mut()
            .entry(channel.to_string())
            .or_insert(handler);
        Ok(())
    }
}

impl BinaryMessenger for LoopbackMessenger {
    fn send(&self, channel: &str, message: &[u8]) -> Result<(), ChannelError> {
        self.dispatch(channel, message, Box::new(|_| {}))
    }

    fn send_with_reply(
        &self,
        channel: &str,
        message: &[u8],
        reply: BinaryReply,
    ) -> Result<(), ChannelError> {
        self.dispatch(channel, message, reply)
    }

    fn set_message_handler(&self, channel: &str, handler: Option<BinaryHandler>) {
        match handler {
            Some(handler) => {
                self.handlers
                    .borrow_mut()
                    .insert(channel.to_string(), handler);
            }
            None => {
                self.handlers.borrow_mut().remove(channel);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_send_to_unregistered_channel_is_detached() {
        let messenger = LoopbackMessenger::new();
        let result = messenger.send("nowhere", b"payload");
        assert!(matches!(result, Err(ChannelError::Detached { .. })));
    }

    #[test]
    fn test_reply_routes_back_to_sender() {
        let messenger = LoopbackMessenger::new();
        messenger.set_message_handler(
            "echo",
            Some(Box::new(|message, reply| {
                reply(Some(message.to_vec()));
            })),
        );

        let received = Rc::new(RefCell::new(None));
        let sink = Rc::clone(&received);
        messenger
            .send_with_reply(
                "echo",
                b"ping",
                Box::new(move |reply| {
                    *sink.borrow_mut() = reply;
                }),
            )
            .expect("send");
        assert_eq!(received.borrow().as_deref(), Some(b"ping".as_slice()));
    }

    #[test]
    fn test_unregistering_detaches_the_channel() {
        let messenger = LoopbackMessenger::new();
        messenger.set_message_handler("temp", Some(Box::new(|_, reply| reply(None))));
        messenger.send("temp", b"").expect("registered");
        messenger.set_message_handler("temp", None);
        assert!(matches!(
            messenger.send("temp", b""),
            Err(ChannelError::Detached { .. })
        ));
    }

    #[test]
    fn test_handler_survives_its_own_invocation() {
        let messenger = LoopbackMessenger::new();
        let calls = Rc::new(RefCell::new(0));
        let counter = Rc::clone(&calls);
        messenger.set_message_handler(
            "count",
            Some(Box::new(move |_, reply| {
                *counter.borrow_mut() += 1;
                reply(None);
            })),
        );
        messenger.send("count", b"").expect("first");
        messenger.send("count", b"").expect("second");
        assert_eq!(*calls.borrow(), 2);
    }
}
