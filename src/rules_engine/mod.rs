//! Narrow interface between the exchange loop and a game's rules.
//!
//! The exchange loop never inspects payloads itself: it asks the engine to
//! produce the next local move, hands it the peer's moves, and polls the
//! terminal conditions after each of them.

mod counter;
mod tictactoe;

pub use counter::CounterRules;
pub use tictactoe::{MoveStrategy, TicTacToeRules, WireMove};

use strictly_tictactoe::MoveError;

/// Rules collaborator consumed by the exchange loop.
pub trait RulesEngine {
    /// Produces the local player's next move in wire format and applies it locally.
    fn encode_next_move(&mut self) -> Result<Vec<u8>, RulesError>;

    /// Updates local state from the peer's payload.
    ///
    /// A well-formed move that the rules refuse (e.g. an occupied square) is
    /// a no-op, not an error.
    fn apply_opponent_move(&mut self, payload: &[u8]) -> Result<(), DecodeError>;

    /// A winning position has been reached.
    fn is_win(&self) -> bool;

    /// The game ended without a winner.
    fn is_draw(&self) -> bool;

    /// Human-readable state for logging, if the game has one.
    fn render(&self) -> Option<String> {
        None
    }
}

/// Payload could not be decoded into a move.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum DecodeError {
    /// Payload bytes are not UTF-8.
    #[display("payload is not valid UTF-8")]
    NotUtf8,
    /// Payload is not a well-formed move object.
    #[display("malformed move: {message}")]
    Malformed {
        /// Parser message.
        message: String,
    },
    /// Coordinates fall outside the board.
    #[display("move ({row}, {col}) is off the board")]
    OutOfBounds {
        /// Row received.
        row: usize,
        /// Column received.
        col: usize,
    },
    /// Payload is not a decimal counter value.
    #[display("not a counter value: {payload:?}")]
    NotANumber {
        /// Payload text.
        payload: String,
    },
}

impl std::error::Error for DecodeError {}

/// The engine could not produce a local move.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum RulesError {
    /// No legal move remains.
    #[display("no moves left")]
    NoMovesLeft,
    /// The chosen move was refused by the rules.
    #[display("move rejected: {_0}")]
    Rejected(MoveError),
    /// The move could not be serialized.
    #[display("failed to encode move: {message}")]
    Encode {
        /// Serializer message.
        message: String,
    },
}

impl std::error::Error for RulesError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RulesError::Rejected(e) => Some(e),
            _ => None,
        }
    }
}

impl From<MoveError> for RulesError {
    fn from(err: MoveError) -> Self {
        RulesError::Rejected(err)
    }
}
