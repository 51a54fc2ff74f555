//! Game engine for one side of a networked tic-tac-toe match.

use super::rules::{check_winner, is_draw};
use super::{Board, GameStatus, Move, MoveError, Player, Square};
use tracing::{debug, instrument};

/// Tic-tac-toe game engine seen from one player's side.
///
/// Turn order is driven by the message exchange, not by this type:
/// any move on an empty square is accepted while the game is in progress.
#[derive(Debug, Clone)]
pub struct Game {
    board: Board,
    mark: Player,
    status: GameStatus,
    history: Vec<Move>,
}

impl Game {
    /// Creates a new game where the local player uses `mark`.
    #[instrument]
    pub fn new(mark: Player) -> Self {
        Self {
            board: Board::new(),
            mark,
            status: GameStatus::InProgress,
            history: Vec::new(),
        }
    }

    /// Returns the board.
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Returns the local player's mark.
    pub fn mark(&self) -> Player {
        self.mark
    }

    /// Returns the game status.
    pub fn status(&self) -> GameStatus {
        self.status
    }

    /// Returns the moves applied so far, in order.
    pub fn history(&self) -> &[Move] {
        &self.history
    }

    /// Places a mark and re-evaluates the game status.
    #[instrument(skip(self, mv), fields(mv = %mv))]
    pub fn place(&mut self, mv: Move) -> Result<GameStatus, MoveError> {
        if self.status != GameStatus::InProgress {
            return Err(MoveError::GameOver);
        }

        if !self.board.is_empty(mv.position) {
            return Err(MoveError::SquareOccupied(mv.position));
        }

        self.board.set(mv.position, Square::Occupied(mv.player));
        self.history.push(mv);
        self.update_status();

        debug!(status = ?self.status, "Move applied");
        Ok(self.status)
    }

    /// Updates game status after a move.
    fn update_status(&mut self) {
        if let Some(winner) = check_winner(&self.board) {
            self.status = GameStatus::Won(winner);
        } else if is_draw(&self.board) {
            self.status = GameStatus::Draw;
        }
    }
}
