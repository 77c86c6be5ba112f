//! Integration tests for channels over the loopback messenger.
//!
//! These exercise the full dispatch flow: encode on the caller side, decode
//! in the handler, encode the reply, decode it back — including the
//! boundary behaviors (not-implemented, malformed calls, dropped replies).

use std::cell::RefCell;
use std::rc::Rc;

use crosstalk::prelude::*;
use crosstalk::{BinaryMessenger, StringCodec};

fn capture<T: 'static>() -> (Rc<RefCell<Option<T>>>, Rc<RefCell<Option<T>>>) {
    let cell = Rc::new(RefCell::new(None));
    (Rc::clone(&cell), cell)
}

#[test]
fn test_method_channel_success_roundtrip() {
    let messenger = LoopbackMessenger::new();

    let service = MethodChannel::new(messenger.clone(), "app/audio", StandardMethodCodec);
    service.set_method_call_handler(|call, reply| {
        assert_eq!(call.method, "setVolume");
        let volume = call.arguments.as_ref().and_then(Value::as_f64);
        match volume {
            Some(volume) if (0.0..=1.0).contains(&volume) => {
                reply.success(Some(&Value::Bool(true)));
            }
            _ => reply.error(
                &RemoteError::new("out-of-range").with_message("volume must be within 0..=1"),
            ),
        }
    });

    let client = MethodChannel::new(messenger, "app/audio", StandardMethodCodec);

    let (seen, sink) = capture::<Envelope>();
    client
        .invoke_method_with_result("setVolume", Some(Value::F64(0.3)), move |result| {
            *sink.borrow_mut() = Some(result.expect("reply"));
        })
        .expect("invoke");
    assert_eq!(
        seen.borrow_mut().take().expect("delivered"),
        Envelope::Success(Some(Value::Bool(true)))
    );
}

#[test]
fn test_method_channel_error_envelope() {
    let messenger = LoopbackMessenger::new();

    let service = MethodChannel::new(messenger.clone(), "app/audio", StandardMethodCodec);
    service.set_method_call_handler(|_, reply| {
        reply.error(&RemoteError::new("unavailable").with_details(Value::I32(7)));
    });

    let client = MethodChannel::new(messenger, "app/audio", StandardMethodCodec);
    let (seen, sink) = capture::<Envelope>();
    client
        .invoke_method_with_result("anything", None, move |result| {
            *sink.borrow_mut() = Some(result.expect("reply"));
        })
        .expect("invoke");

    match seen.borrow_mut().take().expect("delivered") {
        Envelope::Failure(error) => {
            assert_eq!(error.code, "unavailable");
            assert_eq!(error.details, Some(Value::I32(7)));
        }
        other => panic!("expected failure, got {other:?}"),
    };
}

#[test]
fn test_unhandled_method_surfaces_not_implemented() {
    let messenger = LoopbackMessenger::new();

    let service = MethodChannel::new(messenger.clone(), "app/audio", StandardMethodCodec);
    service.set_method_call_handler(|_, reply| reply.not_implemented());

    let client = MethodChannel::new(messenger, "app/audio", StandardMethodCodec);
    let (seen, sink) = capture::<ChannelError>();
    client
        .invoke_method_with_result("nope", None, move |result| {
            *sink.borrow_mut() = Some(result.expect_err("should be unimplemented"));
        })
        .expect("invoke");

    assert!(matches!(
        seen.borrow_mut().take().expect("delivered"),
        ChannelError::MethodNotImplemented { method, .. } if method == "nope"
    ));
}

#[test]
fn test_dropped_reply_counts_as_not_implemented() {
    let messenger = LoopbackMessenger::new();

    let service = MethodChannel::new(messenger.clone(), "app/audio", StandardMethodCodec);
    service.set_method_call_handler(|_, reply| {
        // Never answer; dropping the handle must still release the caller.
        drop(reply);
    });

    let client = MethodChannel::new(messenger, "app/audio", StandardMethodCodec);
    let (seen, sink) = capture::<bool>();
    client
        .invoke_method_with_result("silent", None, move |result| {
            *sink.borrow_mut() = Some(matches!(
                result,
                Err(ChannelError::MethodNotImplemented { .. })
            ));
        })
        .expect("invoke");
    assert_eq!(seen.borrow_mut().take(), Some(true));
}

#[test]
fn test_malformed_call_is_answered_with_error_envelope() {
    let messenger = LoopbackMessenger::new();

    let service = MethodChannel::new(messenger.clone(), "app/audio", StandardMethodCodec);
    service.set_method_call_handler(|_, reply| reply.success(None));

    // Bypass the client channel and push garbage straight at the handler.
    let (seen, sink) = capture::<Vec<u8>>();
    messenger
        .send_with_reply(
            "app/audio",
            &[0xFF, 0xFF, 0xFF],
            Box::new(move |reply| {
                *sink.borrow_mut() = reply;
            }),
        )
        .expect("send");

    let envelope_bytes = seen.borrow_mut().take().expect("error envelope reply");
    match StandardMethodCodec
        .decode_envelope(&envelope_bytes)
        .expect("decode")
    {
        Envelope::Failure(error) => assert_eq!(error.code, "decode-error"),
        other => panic!("expected failure, got {other:?}"),
    }
}

#[test]
fn test_invoke_on_detached_channel_fails_fast() {
    let messenger = LoopbackMessenger::new();
    let client = MethodChannel::new(messenger, "app/none", StandardMethodCodec);
    let result = client.invoke_method("ping", None);
    assert!(matches!(result, Err(ChannelError::Detached { .. })));
}

#[test]
fn test_basic_channel_roundtrip_with_standard_codec() {
    let messenger = LoopbackMessenger::new();

    let receiver = BasicMessageChannel::new(messenger.clone(), "app/events", StandardCodec);
    receiver.set_message_handler(|message| {
        let n = message.as_i64().expect("integer message");
        Some(Value::I64(n + 1))
    });

    let sender = BasicMessageChannel::new(messenger, "app/events", StandardCodec);
    let (seen, sink) = capture::<Option<Value>>();
    sender
        .send_with_reply(&Value::I64(41), move |reply| {
            *sink.borrow_mut() = Some(reply.expect("reply"));
        })
        .expect("send");
    assert_eq!(
        seen.borrow_mut().take().expect("delivered"),
        Some(Value::I64(42))
    );
}

#[test]
fn test_basic_channel_with_string_codec() {
    let messenger = LoopbackMessenger::new();

    let receiver = BasicMessageChannel::new(messenger.clone(), "app/log", StringCodec);
    let lines = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&lines);
    receiver.set_message_handler(move |line: &String| {
        sink.borrow_mut().push(line.clone());
        None
    });

    let sender = BasicMessageChannel::new(messenger, "app/log", StringCodec);
    sender.send(&"first".to_string()).expect("send");
    sender.send(&"sécond".to_string()).expect("send");
    assert_eq!(*lines.borrow(), vec!["first", "sécond"]);
}

#[test]
fn test_handler_can_be_replaced_and_removed() {
    let messenger = LoopbackMessenger::new();

    let channel = BasicMessageChannel::new(messenger.clone(), "app/events", StandardCodec);
    channel.set_message_handler(|_| Some(Value::I32(1)));
    channel.set_message_handler(|_| Some(Value::I32(2)));

    let sender = BasicMessageChannel::new(messenger, "app/events", StandardCodec);
    let (seen, sink) = capture::<Option<Value>>();
    sender
        .send_with_reply(&Value::Nil, move |reply| {
            *sink.borrow_mut() = Some(reply.expect("reply"));
        })
        .expect("send");
    assert_eq!(
        seen.borrow_mut().take().expect("delivered"),
        Some(Value::I32(2))
    );

    channel.unset_message_handler();
    assert!(matches!(
        sender.send(&Value::Nil),
        Err(ChannelError::Detached { .. })
    ));
}
