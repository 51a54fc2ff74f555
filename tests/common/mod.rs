//! In-memory transport shared by the protocol and exchange tests.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::time::Duration;
use strictly_agents::{HandshakeTiming, Inbound, PeerAddress, Transport};

/// Scripted transport: hands out queued datagrams and records every send.
///
/// When `confirming_peer` is set, a `SUBSCRIBE` sent to it is answered
/// with `SUBSCRIBED` at the back of the inbox.
#[derive(Debug, Default)]
pub struct MemoryTransport {
    pub inbox: VecDeque<Inbound>,
    pub sent: Vec<(Vec<u8>, PeerAddress)>,
    pub confirming_peer: Option<PeerAddress>,
}

impl MemoryTransport {
    pub fn confirming(peer: &PeerAddress) -> Self {
        Self {
            confirming_peer: Some(peer.clone()),
            ..Default::default()
        }
    }

    pub fn push(&mut self, payload: &[u8], from: &PeerAddress) {
        self.inbox.push_back(Inbound {
            payload: payload.to_vec(),
            from: from.clone(),
        });
    }

    /// Number of datagrams with exactly `payload` sent to `to`.
    pub fn count_sent(&self, payload: &[u8], to: &PeerAddress) -> usize {
        self.sent
            .iter()
            .filter(|(p, addr)| p.as_slice() == payload && addr == to)
            .count()
    }

    /// Application payloads sent, in order.
    pub fn sent_moves(&self) -> Vec<String> {
        self.sent
            .iter()
            .map(|(p, _)| String::from_utf8_lossy(p).into_owned())
            .filter(|p| p != "SUBSCRIBE" && p != "SUBSCRIBED")
            .collect()
    }
}

impl Transport for MemoryTransport {
    fn send_to(&mut self, payload: &[u8], to: &PeerAddress) {
        self.sent.push((payload.to_vec(), to.clone()));
        if payload == b"SUBSCRIBE" && self.confirming_peer.as_ref() == Some(to) {
            self.push(b"SUBSCRIBED", to);
        }
    }

    fn receive(&mut self, _timeout: Option<Duration>) -> Option<Inbound> {
        self.inbox.pop_front()
    }
}

pub fn peer() -> PeerAddress {
    PeerAddress::new("127.0.0.1", 5002)
}

/// Millisecond-scale timing so exhaustion paths finish quickly.
pub fn fast_timing() -> HandshakeTiming {
    HandshakeTiming::default()
        .with_confirm_window(Duration::from_millis(50))
        .with_poll_interval(Duration::from_millis(1))
        .with_retry_backoff(Duration::ZERO)
        .with_mutual_pacing(Duration::ZERO)
        .with_receive_timeout(Duration::from_millis(1))
}

/// Like [`fast_timing`] with a tiny confirmation window.
pub fn impatient_timing() -> HandshakeTiming {
    fast_timing().with_confirm_window(Duration::from_millis(3))
}
