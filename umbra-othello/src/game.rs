//! Game-level Othello logic: the turn state machine over [`Board`].
//!
//! Turn advancement is a pure state transition: `advance` consumes nothing
//! and returns the successor state plus the flip groups, so a UI can replay
//! the flips at its own pace against a snapshot while the committed state
//! moves on independently.

use crate::board::{Board, FlipSet, MoveError};
use crate::location::{Location, LocationList};
use std::fmt;

/// One of the two players in a game.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Player {
    Black,
    White,
}

impl Default for Player {
    /// Gets the starting player (black).
    fn default() -> Self {
        Self::Black
    }
}

impl std::ops::Not for Player {
    type Output = Self;

    /// Gets the other player.
    fn not(self) -> Self {
        match self {
            Player::Black => Player::White,
            Player::White => Player::Black,
        }
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Player::Black => f.write_str("Black"),
            Player::White => f.write_str("White"),
        }
    }
}

/// An action in an Othello game: place a disc, or pass.
///
/// A pass is a valid zero-move turn, never an error, but it is only
/// available when the mover has no legal placement.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    Place(Location),
    Pass,
}

impl From<Location> for Action {
    fn from(mv: Location) -> Self {
        Self::Place(mv)
    }
}

/// The complete state of an Othello game.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GameState {
    pub board: Board,
    pub to_move: Player,
}

impl Default for GameState {
    fn default() -> Self {
        Self::new()
    }
}

impl GameState {
    /// The starting position, Black to move.
    pub fn new() -> Self {
        Self {
            board: Board::new(),
            to_move: Player::default(),
        }
    }

    /// Legal placements for the side to move.
    #[inline]
    pub fn legal_moves(&self) -> LocationList {
        self.board.legal_moves(self.to_move)
    }

    /// Whether the side to move is forced to pass.
    #[inline]
    pub fn must_pass(&self) -> bool {
        !self.board.has_legal_moves(self.to_move) && !self.is_finished()
    }

    /// The game ends when neither player can move.
    #[inline]
    pub fn is_finished(&self) -> bool {
        self.board.is_terminal()
    }

    /// Apply an action for the side to move, producing the successor state
    /// and the flipped discs (empty for a pass). Rejected actions leave
    /// the state untouched.
    pub fn advance(&self, action: Action) -> Result<(GameState, FlipSet), MoveError> {
        match action {
            Action::Pass => {
                if self.board.has_legal_moves(self.to_move) {
                    return Err(MoveError::PassWithMoves);
                }
                let next = Self {
                    board: self.board,
                    to_move: !self.to_move,
                };
                Ok((next, FlipSet::default()))
            }
            Action::Place(loc) => {
                let (board, flips) = self.board.apply_move(loc, self.to_move)?;
                let next = Self {
                    board,
                    to_move: !self.to_move,
                };
                Ok((next, flips))
            }
        }
    }

    /// The player with the disc majority on a finished game, or None on a
    /// draw. Meaningless before the game ends.
    pub fn winner(&self) -> Option<Player> {
        let count = self.board.score();
        match count.black.cmp(&count.white) {
            std::cmp::Ordering::Greater => Some(Player::Black),
            std::cmp::Ordering::Less => Some(Player::White),
            std::cmp::Ordering::Equal => None,
        }
    }
}

impl fmt::Display for GameState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.board.to_string())?;
        write!(f, "\n{} to move\n", self.to_move)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loc(row: u8, col: u8) -> Location {
        Location::from_coords(row, col).unwrap()
    }

    #[test]
    fn turn_alternates_after_placement() {
        let state = GameState::new();
        assert_eq!(state.to_move, Player::Black);

        let (next, _) = state.advance(Action::Place(loc(2, 3))).unwrap();
        assert_eq!(next.to_move, Player::White);

        // The original state is unchanged.
        assert_eq!(state.to_move, Player::Black);
        assert_eq!(state.board, Board::new());
    }

    #[test]
    fn pass_rejected_while_moves_exist() {
        let state = GameState::new();
        assert_eq!(state.advance(Action::Pass), Err(MoveError::PassWithMoves));
    }

    #[test]
    fn pass_allowed_when_stuck() {
        use crate::bitboard::Bitboard;

        // Black on A1, White on B1: Black can capture on C1, but White has
        // no reply anywhere and must pass.
        let board = Board::from_masks(Bitboard::new(0x01), Bitboard::new(0x02));
        let state = GameState {
            board,
            to_move: Player::White,
        };

        assert!(state.must_pass());
        let (next, flips) = state.advance(Action::Pass).unwrap();
        assert!(flips.is_empty());
        assert_eq!(next.to_move, Player::Black);
        assert_eq!(next.board, board);
        assert!(!next.must_pass());
    }

    #[test]
    fn winner_by_majority() {
        use crate::bitboard::Bitboard;

        let board = Board::from_masks(Bitboard::new(0xff), Bitboard::new(0xff00));
        let state = GameState {
            board,
            to_move: Player::Black,
        };
        assert_eq!(state.winner(), None);

        let board = Board::from_masks(Bitboard::new(0xffff), Bitboard::new(0xff0000));
        let state = GameState {
            board,
            to_move: Player::Black,
        };
        assert_eq!(state.winner(), Some(Player::Black));
    }
}
