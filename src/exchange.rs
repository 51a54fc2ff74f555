//! Turn-based message exchange on top of an established subscription.

use crate::protocol::{ProtocolError, SubscriptionProtocol};
use crate::rules_engine::{RulesEngine, RulesError};
use crate::transport::Transport;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{error, info, instrument};

/// How a session ended, from the local player's side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum Outcome {
    /// Our own move completed a winning position.
    #[display("We win!")]
    Won,
    /// The peer's move completed a winning position.
    #[display("Opponent wins!")]
    Lost,
    /// The board filled without a winner.
    #[display("It's a draw!")]
    Draw,
}

/// Session aborted before reaching an outcome.
#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum ExchangeError {
    /// Mutual subscription was never established.
    #[display("Handshake failed: {_0}")]
    Handshake(ProtocolError),
    /// No application message arrived within the idle timeout.
    #[display("Peer silent for {idle:?}")]
    PeerSilent {
        /// Configured idle timeout.
        idle: Duration,
    },
    /// The rules engine could not produce a move.
    #[display("Rules engine failed: {_0}")]
    Rules(RulesError),
}

impl From<ProtocolError> for ExchangeError {
    fn from(err: ProtocolError) -> Self {
        ExchangeError::Handshake(err)
    }
}

impl From<RulesError> for ExchangeError {
    fn from(err: RulesError) -> Self {
        ExchangeError::Rules(err)
    }
}

/// Composes the subscription protocol with a rules engine.
#[derive(Debug)]
pub struct ExchangeLoop<T, R> {
    protocol: SubscriptionProtocol<T>,
    rules: R,
    initiator: bool,
    turn_delay: Duration,
    idle_timeout: Option<Duration>,
}

impl<T: Transport, R: RulesEngine> ExchangeLoop<T, R> {
    /// Creates a loop with no turn delay and no idle timeout.
    pub fn new(protocol: SubscriptionProtocol<T>, rules: R, initiator: bool) -> Self {
        Self {
            protocol,
            rules,
            initiator,
            turn_delay: Duration::ZERO,
            idle_timeout: None,
        }
    }

    /// Pause after each local move that does not end the game.
    pub fn with_turn_delay(mut self, turn_delay: Duration) -> Self {
        self.turn_delay = turn_delay;
        self
    }

    /// Abort with [`ExchangeError::PeerSilent`] after this long without a move.
    ///
    /// `None` waits forever.
    pub fn with_idle_timeout(mut self, idle_timeout: Option<Duration>) -> Self {
        self.idle_timeout = idle_timeout;
        self
    }

    /// Subscription state.
    pub fn protocol(&self) -> &SubscriptionProtocol<T> {
        &self.protocol
    }

    /// Rules state.
    pub fn rules(&self) -> &R {
        &self.rules
    }

    /// Establishes mutual subscription, then plays until a terminal condition.
    #[instrument(skip(self), fields(agent = %self.protocol.name(), initiator = self.initiator))]
    pub fn run(&mut self) -> Result<Outcome, ExchangeError> {
        info!("Starting agent...");

        if let Err(e) = self.protocol.ensure_mutual_subscription() {
            error!("Failed to establish mutual subscription");
            return Err(e.into());
        }

        self.protocol.set_receive_timeout(self.idle_timeout);

        if self.initiator {
            info!("Making first move...");
            if let Some(outcome) = self.play_local_move()? {
                return Ok(outcome);
            }
        }

        let mut last_move = Instant::now();
        loop {
            let Some(payload) = self.protocol.next_application() else {
                if let Some(idle) = self.idle_timeout {
                    if last_move.elapsed() >= idle {
                        error!(?idle, "Peer went silent");
                        return Err(ExchangeError::PeerSilent { idle });
                    }
                }
                continue;
            };
            last_move = Instant::now();

            if let Some(outcome) = self.take_turn(&payload)? {
                return Ok(outcome);
            }
        }
    }

    /// Applies the peer's move and answers it unless the game ended.
    fn take_turn(&mut self, payload: &[u8]) -> Result<Option<Outcome>, ExchangeError> {
        if let Err(e) = self.rules.apply_opponent_move(payload) {
            error!(
                error = %e,
                payload = %String::from_utf8_lossy(payload),
                "Received invalid move data"
            );
            return Ok(None);
        }

        if let Some(outcome) = self.terminal(Outcome::Lost) {
            return Ok(Some(outcome));
        }

        if let Some(outcome) = self.play_local_move()? {
            return Ok(Some(outcome));
        }

        if !self.turn_delay.is_zero() {
            thread::sleep(self.turn_delay);
        }
        Ok(None)
    }

    /// Computes, logs and publishes our next move.
    fn play_local_move(&mut self) -> Result<Option<Outcome>, ExchangeError> {
        let payload = self.rules.encode_next_move()?;
        if let Some(board) = self.rules.render() {
            info!("Board:\n{}", board);
        }
        self.protocol.publish(&payload);
        Ok(self.terminal(Outcome::Won))
    }

    /// Maps the rules engine's terminal conditions to an outcome.
    fn terminal(&self, on_win: Outcome) -> Option<Outcome> {
        let outcome = if self.rules.is_win() {
            on_win
        } else if self.rules.is_draw() {
            Outcome::Draw
        } else {
            return None;
        };
        info!(%outcome, "Game Over - {}", outcome);
        Some(outcome)
    }
}
