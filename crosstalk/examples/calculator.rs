//! Calculator Example: a method channel served and invoked in-process.
//!
//! This example wires a [`MethodChannel`] to a [`LoopbackMessenger`] and
//! exercises the three reply shapes: success, error envelope, and
//! not-implemented.
//!
//! # Run
//!
//! ```bash
//! cargo run --example calculator
//! ```

use crosstalk::prelude::*;

// ============================================================================
// Configuration
// ============================================================================

const CHANNEL: &str = "examples/calculator";

fn main() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let messenger = LoopbackMessenger::new();

    // Server side: handle "add" and "divide".
    let service = MethodChannel::new(messenger.clone(), CHANNEL, StandardMethodCodec);
    service.set_method_call_handler(|call, reply| {
        let operands = call
            .arguments
            .as_ref()
            .and_then(Value::as_list)
            .map(|items| {
                (
                    items.first().and_then(Value::as_f64),
                    items.get(1).and_then(Value::as_f64),
                )
            });
        match (call.method.as_str(), operands) {
            ("add", Some((Some(a), Some(b)))) => reply.success(Some(&Value::F64(a + b))),
            ("divide", Some((Some(_), Some(b)))) if b == 0.0 => reply.error(
                &RemoteError::new("division-by-zero").with_message("denominator is zero"),
            ),
            ("divide", Some((Some(a), Some(b)))) => reply.success(Some(&Value::F64(a / b))),
            ("add" | "divide", _) => reply.error(
                &RemoteError::new("bad-arguments")
                    .with_message("expected a list of two floats"),
            ),
            _ => reply.not_implemented(),
        }
    });

    // Client side: same messenger, same channel name.
    let client = MethodChannel::new(messenger, CHANNEL, StandardMethodCodec);

    invoke(&client, "add", &[4.0, 38.0]);
    invoke(&client, "divide", &[1.0, 0.0]);
    invoke(&client, "modulo", &[5.0, 3.0]);
}

fn invoke(client: &MethodChannel<StandardMethodCodec>, method: &str, operands: &[f64]) {
    let arguments = Value::List(operands.iter().map(|v| Value::F64(*v)).collect());
    let shown = method.to_string();
    client
        .invoke_method_with_result(method, Some(arguments), move |result| match result {
            Ok(Envelope::Success(value)) => println!("{shown}: ok {value:?}"),
            Ok(Envelope::Failure(error)) => println!("{shown}: failed: {error}"),
            Err(error) => println!("{shown}: {error}"),
        })
        .expect("invoke");
}
