//! Tic-tac-toe adapter: moves travel as `{"row": r, "col": c}`.

use super::{DecodeError, RulesEngine, RulesError};
use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};
use strictly_tictactoe::{Game, GameStatus, Move, Player, Position};
use tracing::{debug, info, instrument, warn};

/// Zero-based board coordinates as sent on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireMove {
    /// Row (0-2).
    pub row: usize,
    /// Column (0-2).
    pub col: usize,
}

impl From<Position> for WireMove {
    fn from(pos: Position) -> Self {
        Self {
            row: pos.row(),
            col: pos.col(),
        }
    }
}

/// How the local player picks a square.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Serialize,
    Deserialize,
    clap::ValueEnum,
    strum::Display,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum MoveStrategy {
    /// Uniformly random empty square.
    #[default]
    Random,
    /// First empty square in row-major order.
    FirstAvailable,
}

impl MoveStrategy {
    fn choose(self, candidates: &[Position]) -> Option<Position> {
        match self {
            MoveStrategy::Random => candidates.choose(&mut rand::rng()).copied(),
            MoveStrategy::FirstAvailable => candidates.first().copied(),
        }
    }
}

/// Tic-tac-toe rules for one side of a networked match.
#[derive(Debug, Clone)]
pub struct TicTacToeRules {
    game: Game,
    strategy: MoveStrategy,
}

impl TicTacToeRules {
    /// Creates an empty board where the local player uses `mark`.
    #[instrument]
    pub fn new(mark: Player, strategy: MoveStrategy) -> Self {
        Self {
            game: Game::new(mark),
            strategy,
        }
    }

    /// Underlying game.
    pub fn game(&self) -> &Game {
        &self.game
    }
}

impl RulesEngine for TicTacToeRules {
    #[instrument(skip(self), fields(mark = %self.game.mark()))]
    fn encode_next_move(&mut self) -> Result<Vec<u8>, RulesError> {
        let candidates = Position::valid_moves(self.game.board());
        let position = self
            .strategy
            .choose(&candidates)
            .ok_or(RulesError::NoMovesLeft)?;

        self.game.place(Move::new(self.game.mark(), position))?;
        info!(
            "Making move at position ({}, {})",
            position.row(),
            position.col()
        );

        serde_json::to_vec(&WireMove::from(position)).map_err(|e| RulesError::Encode {
            message: e.to_string(),
        })
    }

    #[instrument(skip(self, payload), fields(mark = %self.game.mark()))]
    fn apply_opponent_move(&mut self, payload: &[u8]) -> Result<(), DecodeError> {
        let text = std::str::from_utf8(payload).map_err(|_| DecodeError::NotUtf8)?;
        let wire: WireMove = serde_json::from_str(text).map_err(|e| DecodeError::Malformed {
            message: e.to_string(),
        })?;
        let Some(position) = Position::from_row_col(wire.row, wire.col) else {
            return Err(DecodeError::OutOfBounds {
                row: wire.row,
                col: wire.col,
            });
        };

        let opponent = self.game.mark().opponent();
        match self.game.place(Move::new(opponent, position)) {
            Ok(_) => debug!("Opponent moved to position ({}, {})", wire.row, wire.col),
            Err(e) => {
                warn!(error = %e, row = wire.row, col = wire.col, "Ignoring opponent move");
            }
        }
        Ok(())
    }

    fn is_win(&self) -> bool {
        matches!(self.game.status(), GameStatus::Won(_))
    }

    fn is_draw(&self) -> bool {
        self.game.status() == GameStatus::Draw
    }

    fn render(&self) -> Option<String> {
        Some(self.game.board().display())
    }
}
