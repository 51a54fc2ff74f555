//! Strictly Agents library - peer agents over UDP publish/subscribe
//!
//! Two symmetric agents discover each other over UDP, subscribe to each
//! other's publications, then exchange game moves until the game ends.
//!
//! # Architecture
//!
//! - **Transport**: one bound UDP socket with bounded receives
//! - **Protocol**: `SUBSCRIBE`/`SUBSCRIBED` handshake and subscriber set
//! - **Exchange**: turn loop driving a [`RulesEngine`]
//! - **Rules**: tic-tac-toe (from `strictly_tictactoe`) or a counter
//!
//! # Example
//!
//! ```no_run
//! use strictly_agents::{
//!     ExchangeLoop, HandshakeTiming, MoveStrategy, PeerAddress, SubscriptionProtocol,
//!     TicTacToeRules, TicTacToePlayer, UdpEndpoint,
//! };
//!
//! # fn example() -> anyhow::Result<()> {
//! let endpoint = UdpEndpoint::bind(5001)?;
//! let protocol = SubscriptionProtocol::new(
//!     endpoint,
//!     "agent1",
//!     PeerAddress::new("agent2", 5002),
//!     HandshakeTiming::default(),
//! );
//! let rules = TicTacToeRules::new(TicTacToePlayer::X, MoveStrategy::Random);
//! let outcome = ExchangeLoop::new(protocol, rules, true).run()?;
//! println!("{outcome}");
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Private module declarations
mod config;
mod exchange;
mod message;
mod protocol;
mod rules_engine;
mod transport;

// Crate-level exports - Configuration
pub use config::{
    AgentConfig, ConfigError, ConfigErrorKind, FIRST_AGENT, GameKind, PartialConfig, SECOND_AGENT,
};

// Crate-level exports - Transport
pub use transport::{Inbound, MAX_DATAGRAM, PeerAddress, Transport, UdpEndpoint};

// Crate-level exports - Wire messages
pub use message::{Control, Message};

// Crate-level exports - Subscription protocol
pub use protocol::{HandshakeTiming, ProtocolError, SubscriptionProtocol};

// Crate-level exports - Rules engines
pub use rules_engine::{
    CounterRules, DecodeError, MoveStrategy, RulesEngine, RulesError, TicTacToeRules, WireMove,
};

// Crate-level exports - Exchange loop
pub use exchange::{ExchangeError, ExchangeLoop, Outcome};

// Crate-level exports - Game types (tic-tac-toe)
pub use strictly_tictactoe::{Board, GameStatus, Position, Square, Player as TicTacToePlayer};
