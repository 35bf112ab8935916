//! How a subscriber endpoint validates an inbound notification.

use kai_platform::{compute_signature, verify_notification, EventEnvelope};

fn main() {
    // The secret handed out once, at subscription creation.
    let secret = b"my-shared-secret";

    // What the dispatcher would send.
    let body = serde_json::to_vec(&EventEnvelope {
        event: "host.deleted".to_string(),
        data: serde_json::json!({"hostId": "a3f1"}),
        timestamp: "2026-08-07T12:00:00.000Z".to_string(),
    })
    .unwrap();
    let signature = compute_signature(secret, &body);

    // What the receiver does with the raw request.
    let headers = vec![
        ("content-type", "application/json"),
        ("x-kai-event", "host.deleted"),
        ("x-kai-signature", signature.as_str()),
    ];

    match verify_notification(headers, &body, secret, "X-Kai-Signature") {
        Ok(()) => println!("signature ok"),
        Err(err) => println!("rejected: {err:?}"),
    }
}
