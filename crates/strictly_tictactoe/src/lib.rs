//! Pure tic-tac-toe rules.
//!
//! Board storage, win/draw evaluation and move validation with no I/O.
//! The networked agents consume this crate through their rules-engine
//! adapter.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod action;
mod game;
mod position;
pub mod rules;
mod types;

pub use action::{Move, MoveError};
pub use game::Game;
pub use position::Position;
pub use types::{Board, GameStatus, Player, Square};
