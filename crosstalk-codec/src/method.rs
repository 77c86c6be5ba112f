//! Method call and result envelope models.
//!
//! These are the two fixed-shape wire records of the channel protocol:
//!
//! - a [`MethodCall`] is a 2-element top-level sequence, method name then
//!   arguments, concatenated without list framing;
//! - an [`Envelope`] is a 1-element sequence for success and a 3- or
//!   4-element sequence for failure (the fourth element is a stacktrace).
//!
//! The element count is the discriminant: decoders count self-describing
//! top-level values to end-of-input and branch on the total.

use crate::value::Value;

/// A named method invocation with optional arguments.
///
/// `arguments: None` is encoded as an explicit `nil` so the wire record is
/// always two elements.
#[derive(Debug, Clone, PartialEq)]
pub struct MethodCall<A = Value> {
    /// The method name.
    pub method: String,
    /// The arguments, if any.
    pub arguments: Option<A>,
}

impl<A> MethodCall<A> {
    /// Creates a method call.
    pub fn new(method: impl Into<String>, arguments: Option<A>) -> Self {
        Self {
            method: method.into(),
            arguments,
        }
    }
}

/// A success-or-error wrapper around a method result.
#[derive(Debug, Clone, PartialEq)]
pub enum Envelope<S = Value> {
    /// The call succeeded, possibly with no result value.
    Success(Option<S>),
    /// The call failed with a structured error.
    Failure(RemoteError<S>),
}

impl<S> Envelope<S> {
    /// True for the success arm.
    pub fn is_success(&self) -> bool {
        matches!(self, Envelope::Success(_))
    }

    /// Converts into a `Result`, discarding nothing.
    pub fn into_result(self) -> Result<Option<S>, RemoteError<S>> {
        match self {
            Envelope::Success(value) => Ok(value),
            Envelope::Failure(error) => Err(error),
        }
    }
}

impl<S> From<Result<Option<S>, RemoteError<S>>> for Envelope<S> {
    fn from(result: Result<Option<S>, RemoteError<S>>) -> Self {
        match result {
            Ok(value) => Envelope::Success(value),
            Err(error) => Envelope::Failure(error),
        }
    }
}

/// A structured error carried by a failure envelope.
///
/// `code` is mandatory; everything else is optional. The stacktrace only
/// exists on the wire when present, which is what widens the failure record
/// from three elements to four.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteError<V = Value> {
    /// Machine-readable error code.
    pub code: String,
    /// Human-readable message.
    pub message: Option<String>,
    /// Arbitrary structured details.
    pub details: Option<V>,
    /// Remote stacktrace, when the peer captured one.
    pub stacktrace: Option<String>,
}

impl<V> RemoteError<V> {
    /// Creates an error with only a code.
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: None,
            details: None,
            stacktrace: None,
        }
    }

    /// Attaches a message.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Attaches structured details.
    pub fn with_details(mut self, details: V) -> Self {
        self.details = Some(details);
        self
    }

    /// Attaches a stacktrace.
    pub fn with_stacktrace(mut self, stacktrace: impl Into<String>) -> Self {
        self.stacktrace = Some(stacktrace.into());
        self
    }
}

impl<V> std::fmt::Display for RemoteError<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.message {
            Some(message) => write!(f, "remote error {}: {}", self.code, message),
            None => write!(f, "remote error {}", self.code),
        }
    }
}

impl<V: std::fmt::Debug> std::error::Error for RemoteError<V> {}
