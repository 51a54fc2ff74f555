//! Subscription handshake layered on a [`Transport`].
//!
//! Each endpoint tracks two independent axes:
//!
//! - **outbound**: whether the designated peer has confirmed our `SUBSCRIBE`
//!   with `SUBSCRIBED` (one-way transition, never reverts);
//! - **inbound**: the set of addresses that subscribed to us and will receive
//!   our publications (grows only).
//!
//! Receiving `SUBSCRIBE` always triggers a reciprocal subscription attempt, so
//! the handshake converges no matter which peer starts first.

use crate::message::{Control, Message};
use crate::transport::{Inbound, PeerAddress, Transport};
use derive_getters::Getters;
use derive_setters::Setters;
use std::collections::{HashSet, VecDeque};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, instrument, warn};

/// Retry budgets and pacing for the handshake.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Setters)]
#[setters(prefix = "with_")]
pub struct HandshakeTiming {
    /// `SUBSCRIBE` attempts per subscribe-to-peer procedure.
    subscribe_attempts: u32,
    /// How long each attempt waits for `SUBSCRIBED`.
    confirm_window: Duration,
    /// Pause between receive calls inside the confirmation window.
    poll_interval: Duration,
    /// Pause after an attempt whose window elapsed without confirmation.
    retry_backoff: Duration,
    /// Attempts of the mutual-subscription procedure.
    mutual_attempts: u32,
    /// Pause at the end of each mutual-subscription attempt.
    mutual_pacing: Duration,
    /// Receive timeout while the handshake is running.
    receive_timeout: Duration,
}

impl Default for HandshakeTiming {
    fn default() -> Self {
        Self {
            subscribe_attempts: 5,
            confirm_window: Duration::from_secs(2),
            poll_interval: Duration::from_millis(100),
            retry_backoff: Duration::from_secs(1),
            mutual_attempts: 10,
            mutual_pacing: Duration::from_millis(500),
            receive_timeout: Duration::from_secs(2),
        }
    }
}

/// Handshake budget exhausted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum ProtocolError {
    /// The peer never confirmed our subscription.
    #[display("Failed to subscribe to peer after {attempts} attempts")]
    SubscribeExhausted {
        /// Attempts made.
        attempts: u32,
    },
    /// Mutual subscription was not reached.
    #[display("Failed to establish mutual subscription after {attempts} attempts")]
    HandshakeExhausted {
        /// Attempts made.
        attempts: u32,
    },
}

/// Subscription protocol state for one endpoint.
#[derive(Debug)]
pub struct SubscriptionProtocol<T> {
    transport: T,
    name: String,
    peer: PeerAddress,
    timing: HandshakeTiming,
    subscribers: HashSet<PeerAddress>,
    subscribed_to_peer: bool,
    subscribing: bool,
    pending: VecDeque<Vec<u8>>,
    receive_timeout: Option<Duration>,
}

impl<T: Transport> SubscriptionProtocol<T> {
    /// Creates the protocol with empty subscriber set and no outbound subscription.
    #[instrument(skip(transport, name, timing), fields(agent = %name.as_ref()))]
    pub fn new(
        transport: T,
        name: impl AsRef<str>,
        peer: PeerAddress,
        timing: HandshakeTiming,
    ) -> Self {
        let receive_timeout = Some(*timing.receive_timeout());
        Self {
            transport,
            name: name.as_ref().to_string(),
            peer,
            timing,
            subscribers: HashSet::new(),
            subscribed_to_peer: false,
            subscribing: false,
            pending: VecDeque::new(),
            receive_timeout,
        }
    }

    /// Endpoint name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Designated peer.
    pub fn peer(&self) -> &PeerAddress {
        &self.peer
    }

    /// Addresses that will receive our publications.
    pub fn subscribers(&self) -> &HashSet<PeerAddress> {
        &self.subscribers
    }

    /// Whether the designated peer confirmed our subscription.
    pub fn is_subscribed_to_peer(&self) -> bool {
        self.subscribed_to_peer
    }

    /// Both axes hold: we are subscribed and someone subscribed to us.
    pub fn is_mutually_subscribed(&self) -> bool {
        self.subscribed_to_peer && !self.subscribers.is_empty()
    }

    /// Underlying transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Timeout used by [`Self::receive_and_classify`]; `None` blocks.
    pub fn set_receive_timeout(&mut self, timeout: Option<Duration>) {
        debug!(?timeout, "Receive timeout changed");
        self.receive_timeout = timeout;
    }

    /// Sends a payload to every subscriber.
    #[instrument(skip(self, payload), fields(agent = %self.name, len = payload.len()))]
    pub fn publish(&mut self, payload: &[u8]) {
        debug!(message = %String::from_utf8_lossy(payload), "Publishing");
        if self.subscribers.is_empty() {
            warn!("No subscribers available");
            return;
        }

        for subscriber in &self.subscribers {
            self.transport.send_to(payload, subscriber);
        }
    }

    /// Applies one inbound datagram to protocol state.
    ///
    /// Returns the payload only when it is application data.
    #[instrument(skip(self, inbound), fields(agent = %self.name, from = %inbound.from))]
    pub fn classify(&mut self, inbound: Inbound) -> Option<Vec<u8>> {
        let Inbound { payload, from } = inbound;
        match Message::decode(payload) {
            Message::Control(Control::Subscribe) => {
                if !self.subscribers.contains(&from) {
                    info!(subscriber = %from, "New subscriber");
                    self.subscribers.insert(from.clone());
                }
                self.send_control(Control::Subscribed, &from);

                // A running procedure keeps retrying on its own.
                if !self.subscribed_to_peer && !self.subscribing {
                    if let Err(e) = self.subscribe_to_peer() {
                        debug!(error = %e, "Reciprocal subscription not confirmed yet");
                    }
                }
                None
            }
            Message::Control(Control::Subscribed) => {
                if !self.subscribed_to_peer {
                    info!("Subscription confirmed!");
                }
                self.subscribed_to_peer = true;
                None
            }
            Message::Application(payload) => {
                debug!(message = %String::from_utf8_lossy(&payload), "Received message");
                Some(payload)
            }
        }
    }

    /// Receives at most one datagram with the current timeout and classifies it.
    pub fn receive_and_classify(&mut self) -> Option<Vec<u8>> {
        let inbound = self.transport.receive(self.receive_timeout)?;
        self.classify(inbound)
    }

    /// Next application payload, draining payloads queued during the handshake first.
    pub fn next_application(&mut self) -> Option<Vec<u8>> {
        if let Some(payload) = self.pending.pop_front() {
            return Some(payload);
        }
        self.receive_and_classify()
    }

    /// Asks the designated peer for its publications.
    ///
    /// Returns immediately if already subscribed. Otherwise sends `SUBSCRIBE`
    /// up to the attempt budget, waiting for confirmation after each one.
    #[instrument(skip(self), fields(agent = %self.name, peer = %self.peer))]
    pub fn subscribe_to_peer(&mut self) -> Result<(), ProtocolError> {
        if self.subscribed_to_peer {
            return Ok(());
        }

        self.subscribing = true;
        let result = self.run_subscribe_attempts();
        self.subscribing = false;
        result
    }

    fn run_subscribe_attempts(&mut self) -> Result<(), ProtocolError> {
        let attempts = *self.timing.subscribe_attempts();
        let window = *self.timing.confirm_window();

        for attempt in 1..=attempts {
            info!(attempt, "Sending subscription request to {}", self.peer.host());
            let peer = self.peer.clone();
            self.send_control(Control::Subscribe, &peer);

            let started = Instant::now();
            while let Some(remaining) = window.checked_sub(started.elapsed()) {
                self.poll_handshake(remaining);
                if self.subscribed_to_peer {
                    return Ok(());
                }
                thread::sleep(*self.timing.poll_interval());
            }

            warn!(attempt, "Subscription attempt failed, retrying...");
            thread::sleep(*self.timing.retry_backoff());
        }

        error!(attempts, "Failed to subscribe to peer after all retries");
        Err(ProtocolError::SubscribeExhausted { attempts })
    }

    /// Drives both axes until mutual subscription holds or the budget runs out.
    #[instrument(skip(self), fields(agent = %self.name, peer = %self.peer))]
    pub fn ensure_mutual_subscription(&mut self) -> Result<(), ProtocolError> {
        let attempts = *self.timing.mutual_attempts();

        for attempt in 1..=attempts {
            if self.is_mutually_subscribed() {
                info!(attempt, "Mutual subscription established!");
                return Ok(());
            }

            if !self.subscribed_to_peer {
                if let Err(e) = self.subscribe_to_peer() {
                    debug!(attempt, error = %e, "Outbound subscription still pending");
                }
            }

            // Accept a SUBSCRIBE from a peer that is still retrying.
            let timeout = *self.timing.receive_timeout();
            self.poll_handshake(timeout);
            thread::sleep(*self.timing.mutual_pacing());
        }

        if self.is_mutually_subscribed() {
            info!("Mutual subscription established!");
            return Ok(());
        }

        error!(
            attempts,
            subscribed_to_peer = self.subscribed_to_peer,
            subscribers = self.subscribers.len(),
            "Failed to establish mutual subscription"
        );
        Err(ProtocolError::HandshakeExhausted { attempts })
    }

    /// One bounded receive on behalf of a handshake procedure.
    fn poll_handshake(&mut self, limit: Duration) {
        let timeout = self.receive_timeout.map_or(limit, |t| t.min(limit));
        let Some(inbound) = self.transport.receive(Some(timeout)) else {
            return;
        };
        if let Some(payload) = self.classify(inbound) {
            debug!(
                queued = self.pending.len() + 1,
                "Queued application payload received during handshake"
            );
            self.pending.push_back(payload);
        }
    }

    fn send_control(&mut self, control: Control, to: &PeerAddress) {
        self.transport.send_to(Message::Control(control).encode(), to);
    }
}
