//! Error types for the channel layer.

use thiserror::Error;

use crosstalk_codec::CodecError;

/// Errors raised by channels and messengers.
#[derive(Debug, Error)]
pub enum ChannelError {
    /// Encoding or decoding a payload failed.
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),

    /// The remote side has no handler for the invoked method.
    ///
    /// Signalled on the wire by an absent reply rather than an envelope.
    #[error("method {method:?} is not implemented on channel {channel:?}")]
    MethodNotImplemented {
        /// The channel the call was sent on.
        channel: String,
        /// The method that nobody handles.
        method: String,
    },

    /// No handler is registered for the target channel.
    #[error("channel {channel:?} has no registered handler")]
    Detached {
        /// The unhandled channel name.
        channel: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_names_the_channel() {
        let err = ChannelError::MethodNotImplemented {
            channel: "app/audio".to_string(),
            method: "setVolume".to_string(),
        };
        let text = err.to_string();
        assert!(text.contains("app/audio"));
        assert!(text.contains("setVolume"));
    }
}
