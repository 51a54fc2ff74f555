//! Tests for the tic-tac-toe game engine.

use strictly_tictactoe::{Game, GameStatus, Move, MoveError, Player, Position};

#[test]
fn test_place_on_empty_square() {
    let mut game = Game::new(Player::X);
    let status = game.place(Move::new(Player::X, Position::Center));
    assert_eq!(status, Ok(GameStatus::InProgress));
    assert_eq!(game.history().len(), 1);
}

#[test]
fn test_place_occupied_square_is_rejected() {
    let mut game = Game::new(Player::X);
    game.place(Move::new(Player::X, Position::Center)).unwrap();

    let result = game.place(Move::new(Player::O, Position::Center));
    assert_eq!(result, Err(MoveError::SquareOccupied(Position::Center)));
    assert!(result.unwrap_err().to_string().contains("occupied"));
    assert_eq!(game.history().len(), 1);
}

#[test]
fn test_win_ends_game() {
    let mut game = Game::new(Player::O);
    for (player, pos) in [
        (Player::X, Position::TopLeft),
        (Player::O, Position::Center),
        (Player::X, Position::TopCenter),
        (Player::O, Position::BottomLeft),
    ] {
        game.place(Move::new(player, pos)).unwrap();
    }

    let status = game.place(Move::new(Player::X, Position::TopRight));
    assert_eq!(status, Ok(GameStatus::Won(Player::X)));

    let after = game.place(Move::new(Player::O, Position::BottomRight));
    assert_eq!(after, Err(MoveError::GameOver));
}

#[test]
fn test_full_board_is_draw() {
    let mut game = Game::new(Player::X);
    // X O X / X O O / O X X
    for (player, pos) in [
        (Player::X, Position::TopLeft),
        (Player::O, Position::TopCenter),
        (Player::X, Position::TopRight),
        (Player::O, Position::Center),
        (Player::X, Position::MiddleLeft),
        (Player::O, Position::MiddleRight),
        (Player::X, Position::BottomCenter),
        (Player::O, Position::BottomLeft),
    ] {
        assert_eq!(game.place(Move::new(player, pos)), Ok(GameStatus::InProgress));
    }

    let status = game.place(Move::new(Player::X, Position::BottomRight));
    assert_eq!(status, Ok(GameStatus::Draw));
}

#[test]
fn test_win_on_last_square_is_not_draw() {
    let mut game = Game::new(Player::X);
    // X O X / O X O / O X X
    for (player, pos) in [
        (Player::X, Position::TopLeft),
        (Player::O, Position::TopCenter),
        (Player::X, Position::TopRight),
        (Player::O, Position::MiddleLeft),
        (Player::X, Position::Center),
        (Player::O, Position::MiddleRight),
        (Player::X, Position::BottomCenter),
        (Player::O, Position::BottomLeft),
    ] {
        assert_eq!(game.place(Move::new(player, pos)), Ok(GameStatus::InProgress));
    }

    let status = game.place(Move::new(Player::X, Position::BottomRight));
    assert_eq!(status, Ok(GameStatus::Won(Player::X)));
}
