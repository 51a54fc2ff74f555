//! Datagram transport endpoint.
//!
//! The [`Transport`] trait is the seam between the subscription protocol and
//! the network, so the protocol can run against a real UDP socket or an
//! in-memory double.

use derive_getters::Getters;
use derive_new::new;
use std::io;
use std::net::{SocketAddr, ToSocketAddrs, UdpSocket};
use std::time::Duration;
use tracing::{debug, error, info, instrument};

/// Size of the receive buffer; longer datagrams are truncated.
pub const MAX_DATAGRAM: usize = 1024;

/// Host/port pair identifying a datagram endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Getters, new, derive_more::Display)]
#[display("{host}:{port}")]
pub struct PeerAddress {
    /// Hostname or IP literal.
    #[new(into)]
    host: String,
    /// UDP port.
    port: u16,
}

impl From<SocketAddr> for PeerAddress {
    fn from(addr: SocketAddr) -> Self {
        Self {
            host: addr.ip().to_string(),
            port: addr.port(),
        }
    }
}

/// One datagram and the address it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inbound {
    /// Raw payload bytes.
    pub payload: Vec<u8>,
    /// Sender address.
    pub from: PeerAddress,
}

/// Best-effort datagram transport.
///
/// Neither operation reports failure: a send error is a lost datagram and a
/// receive error is indistinguishable from silence.
pub trait Transport {
    /// Sends one datagram to `to`.
    fn send_to(&mut self, payload: &[u8], to: &PeerAddress);

    /// Waits up to `timeout` for one datagram (`None` blocks indefinitely).
    ///
    /// Returns `None` when nothing arrived in time.
    fn receive(&mut self, timeout: Option<Duration>) -> Option<Inbound>;
}

/// UDP socket bound on all interfaces.
#[derive(Debug)]
pub struct UdpEndpoint {
    socket: UdpSocket,
    read_timeout: Option<Duration>,
}

impl UdpEndpoint {
    /// Binds `0.0.0.0:port`. Port `0` picks an ephemeral port.
    #[instrument]
    pub fn bind(port: u16) -> io::Result<Self> {
        let socket = UdpSocket::bind(("0.0.0.0", port))?;
        info!(local = %socket.local_addr()?, "Socket bound");
        Ok(Self {
            socket,
            read_timeout: None,
        })
    }

    /// Port the socket is bound to.
    pub fn local_port(&self) -> io::Result<u16> {
        Ok(self.socket.local_addr()?.port())
    }

    /// Updates the socket read timeout only when it changed.
    fn apply_timeout(&mut self, timeout: Option<Duration>) -> io::Result<()> {
        if timeout != self.read_timeout {
            // A zero read timeout is rejected by the OS.
            let effective = timeout.map(|t| t.max(Duration::from_millis(1)));
            self.socket.set_read_timeout(effective)?;
            self.read_timeout = timeout;
        }
        Ok(())
    }
}

/// Resolves a host/port pair to its first IPv4 address.
fn resolve(to: &PeerAddress) -> io::Result<SocketAddr> {
    (to.host().as_str(), *to.port())
        .to_socket_addrs()?
        .find(SocketAddr::is_ipv4)
        .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no IPv4 address for host"))
}

impl Transport for UdpEndpoint {
    fn send_to(&mut self, payload: &[u8], to: &PeerAddress) {
        match resolve(to).and_then(|addr| self.socket.send_to(payload, addr)) {
            Ok(_) => debug!(to = %to, message = %String::from_utf8_lossy(payload), "Sent"),
            Err(e) => error!(to = %to, error = %e, "Error sending message"),
        }
    }

    fn receive(&mut self, timeout: Option<Duration>) -> Option<Inbound> {
        if let Err(e) = self.apply_timeout(timeout) {
            error!(error = %e, "Error setting receive timeout");
            return None;
        }

        let mut buf = [0u8; MAX_DATAGRAM];
        match self.socket.recv_from(&mut buf) {
            Ok((len, from)) => Some(Inbound {
                payload: buf[..len].to_vec(),
                from: from.into(),
            }),
            Err(e) if matches!(e.kind(), io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut) => {
                None
            }
            Err(e) => {
                error!(error = %e, "Error receiving message");
                None
            }
        }
    }
}
