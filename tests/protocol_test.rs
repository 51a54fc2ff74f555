//! Tests for the subscription handshake against an in-memory transport.

mod common;

use common::{MemoryTransport, fast_timing, impatient_timing, peer};
use strictly_agents::{Inbound, PeerAddress, ProtocolError, SubscriptionProtocol};

fn protocol(transport: MemoryTransport) -> SubscriptionProtocol<MemoryTransport> {
    SubscriptionProtocol::new(transport, "agent1", peer(), fast_timing())
}

fn inbound(payload: &[u8], from: &PeerAddress) -> Inbound {
    Inbound {
        payload: payload.to_vec(),
        from: from.clone(),
    }
}

#[test]
fn test_subscribe_adds_sender_and_replies_once() {
    let mut proto = protocol(MemoryTransport::confirming(&peer()));

    let result = proto.classify(inbound(b"SUBSCRIBE", &peer()));

    assert_eq!(result, None);
    assert!(proto.subscribers().contains(&peer()));
    assert_eq!(proto.transport().count_sent(b"SUBSCRIBED", &peer()), 1);
}

#[test]
fn test_subscribe_triggers_reciprocal_subscription() {
    let mut proto = protocol(MemoryTransport::confirming(&peer()));

    proto.classify(inbound(b"SUBSCRIBE", &peer()));

    assert_eq!(proto.transport().count_sent(b"SUBSCRIBE", &peer()), 1);
    assert!(proto.is_subscribed_to_peer());
    assert!(proto.is_mutually_subscribed());
}

#[test]
fn test_duplicate_subscribe_is_idempotent() {
    let mut proto = protocol(MemoryTransport::confirming(&peer()));

    proto.classify(inbound(b"SUBSCRIBE", &peer()));
    proto.classify(inbound(b"SUBSCRIBE", &peer()));

    assert_eq!(proto.subscribers().len(), 1);
    assert_eq!(proto.transport().count_sent(b"SUBSCRIBED", &peer()), 2);
    // Already subscribed outbound, so no second request.
    assert_eq!(proto.transport().count_sent(b"SUBSCRIBE", &peer()), 1);
}

#[test]
fn test_subscribe_accepted_from_any_address() {
    let stranger = PeerAddress::new("10.0.0.9", 7000);
    let mut proto = protocol(MemoryTransport::confirming(&peer()));

    proto.classify(inbound(b"SUBSCRIBE", &stranger));

    assert!(proto.subscribers().contains(&stranger));
    assert_eq!(proto.transport().count_sent(b"SUBSCRIBED", &stranger), 1);
}

#[test]
fn test_duplicate_subscribed_keeps_state() {
    let mut proto = protocol(MemoryTransport::default());

    assert_eq!(proto.classify(inbound(b"SUBSCRIBED", &peer())), None);
    assert!(proto.is_subscribed_to_peer());
    assert_eq!(proto.classify(inbound(b"SUBSCRIBED", &peer())), None);
    assert!(proto.is_subscribed_to_peer());
    assert!(proto.transport().sent.is_empty());
}

#[test]
fn test_application_payload_is_returned() {
    let mut proto = protocol(MemoryTransport::default());

    let payload = br#"{"row": 0, "col": 0}"#;
    assert_eq!(
        proto.classify(inbound(payload, &peer())),
        Some(payload.to_vec())
    );
    assert!(proto.subscribers().is_empty());
    assert!(!proto.is_subscribed_to_peer());
}

#[test]
fn test_subscribe_to_peer_is_noop_when_subscribed() {
    let mut proto = protocol(MemoryTransport::default());
    proto.classify(inbound(b"SUBSCRIBED", &peer()));

    assert_eq!(proto.subscribe_to_peer(), Ok(()));
    assert!(proto.transport().sent.is_empty());
}

#[test]
fn test_subscribe_to_peer_exhausts_budget() {
    let mut proto = SubscriptionProtocol::new(
        MemoryTransport::default(),
        "agent1",
        peer(),
        impatient_timing(),
    );

    let result = proto.subscribe_to_peer();

    assert_eq!(result, Err(ProtocolError::SubscribeExhausted { attempts: 5 }));
    assert_eq!(proto.transport().count_sent(b"SUBSCRIBE", &peer()), 5);
    assert!(!proto.is_subscribed_to_peer());
}

#[test]
fn test_mutual_subscription_fails_without_peer() {
    let mut proto = SubscriptionProtocol::new(
        MemoryTransport::default(),
        "agent1",
        peer(),
        impatient_timing(),
    );

    let result = proto.ensure_mutual_subscription();

    assert_eq!(result, Err(ProtocolError::HandshakeExhausted { attempts: 10 }));
    // Ten mutual attempts, each running a full five-attempt subscription.
    assert_eq!(proto.transport().count_sent(b"SUBSCRIBE", &peer()), 50);
}

#[test]
fn test_mutual_subscription_needs_inbound_subscriber() {
    let mut proto = protocol(MemoryTransport::confirming(&peer()));

    let result = proto.ensure_mutual_subscription();

    assert!(proto.is_subscribed_to_peer());
    assert!(proto.subscribers().is_empty());
    assert_eq!(result, Err(ProtocolError::HandshakeExhausted { attempts: 10 }));
    assert_eq!(proto.transport().count_sent(b"SUBSCRIBE", &peer()), 1);
}

#[test]
fn test_mutual_subscription_when_peer_subscribes_first() {
    let mut transport = MemoryTransport::confirming(&peer());
    transport.push(b"SUBSCRIBE", &peer());
    let mut proto = protocol(transport);

    assert_eq!(proto.ensure_mutual_subscription(), Ok(()));
    assert!(proto.is_mutually_subscribed());
}

#[test]
fn test_payload_during_handshake_is_queued() {
    let mut transport = MemoryTransport::confirming(&peer());
    transport.push(br#"{"row":1,"col":1}"#, &peer());
    transport.push(b"SUBSCRIBE", &peer());
    let mut proto = protocol(transport);

    assert_eq!(proto.ensure_mutual_subscription(), Ok(()));
    assert_eq!(
        proto.next_application(),
        Some(br#"{"row":1,"col":1}"#.to_vec())
    );
    assert_eq!(proto.next_application(), None);
}

#[test]
fn test_publish_without_subscribers_sends_nothing() {
    let mut proto = protocol(MemoryTransport::default());
    proto.publish(b"1");
    assert!(proto.transport().sent.is_empty());
}

#[test]
fn test_publish_reaches_every_subscriber() {
    let other = PeerAddress::new("127.0.0.1", 6000);
    let mut proto = protocol(MemoryTransport::confirming(&peer()));
    proto.classify(inbound(b"SUBSCRIBE", &peer()));
    proto.classify(inbound(b"SUBSCRIBE", &other));

    proto.publish(b"7");

    assert_eq!(proto.transport().count_sent(b"7", &peer()), 1);
    assert_eq!(proto.transport().count_sent(b"7", &other), 1);
}
