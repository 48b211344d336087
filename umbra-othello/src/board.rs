//! The board substrate: two color bitboards plus the full move semantics.
//!
//! [`Board`] is `Copy` and every operation is pure, returning new values:
//! search code clones and explores hypothetical boards freely without
//! aliasing the live game state. The two color masks are disjoint by
//! construction; an overlap is a bug and trips an assertion rather than
//! being reported as a recoverable error.
//!
//! Move application comes in two flavors with identical semantics:
//! [`Board::apply_move`] walks each compass ray square by square and
//! reports the ordered per-direction flip groups (the reference
//! implementation, and what UIs animate from), while
//! [`Board::apply_move_unchecked`] uses the bitboard propagation in
//! [`crate::bitboard`] for the search hot path. Property tests hold the
//! two bit-exact equal.

use crate::bitboard::{self, Bitboard, Direction};
use crate::game::Player;
use crate::location::{Location, LocationList};
use crate::utils;
use arrayvec::ArrayVec;
use std::fmt;
use thiserror::Error;

/// The discs flipped along a single compass ray, ordered from the placed
/// disc outward.
pub type FlipRun = ArrayVec<[Location; 6]>;

/// The discs flipped by one move, grouped by direction. Directions that
/// flip nothing hold an empty run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FlipSet {
    runs: [FlipRun; 8],
}

/// Population counts for the two colors.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DiscCount {
    pub black: u8,
    pub white: u8,
}

/// Why a move was rejected. Rejection never mutates the board.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum MoveError {
    #[error("square {0} is already occupied")]
    Occupied(Location),
    #[error("a disc on {0} would flip nothing")]
    NoFlips(Location),
    #[error("cannot pass while legal moves exist")]
    PassWithMoves,
}

/// A complete disc position: one bitboard per color.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct Board {
    black: Bitboard,
    white: Bitboard,
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Board {
    /// The standard starting position.
    #[inline]
    pub fn new() -> Self {
        Self {
            black: bitboard::BLACK_START,
            white: bitboard::WHITE_START,
        }
    }

    /// Build a board from raw color masks.
    /// Panics if the masks intersect; overlapping discs are unrepresentable.
    pub fn from_masks(black: Bitboard, white: Bitboard) -> Self {
        assert!(
            (black & white).is_empty(),
            "color masks intersect: the board is corrupt"
        );
        Self { black, white }
    }

    /// The mask of discs owned by `color`.
    #[inline]
    pub fn discs(&self, color: Player) -> Bitboard {
        match color {
            Player::Black => self.black,
            Player::White => self.white,
        }
    }

    /// The mask of occupied squares.
    #[inline]
    pub fn occupied(&self) -> Bitboard {
        self.black | self.white
    }

    /// The mask of empty squares.
    #[inline]
    pub fn empties(&self) -> Bitboard {
        !self.occupied()
    }

    /// Total discs on the board, 4..=64. Doubles as the game-phase measure.
    #[inline]
    pub fn phase(&self) -> u8 {
        self.occupied().count_occupied()
    }

    /// Population count of each color's mask.
    #[inline]
    pub fn score(&self) -> DiscCount {
        DiscCount {
            black: self.black.count_occupied(),
            white: self.white.count_occupied(),
        }
    }

    /// The set of legal destinations for `color`.
    #[inline]
    pub fn legal_moves(&self, color: Player) -> LocationList {
        LocationList::from(bitboard::move_mask(self.discs(color), self.discs(!color)))
    }

    /// Whether `color` has at least one legal move.
    #[inline]
    pub fn has_legal_moves(&self, color: Player) -> bool {
        !bitboard::move_mask(self.discs(color), self.discs(!color)).is_empty()
    }

    /// The game is over iff neither color can move.
    #[inline]
    pub fn is_terminal(&self) -> bool {
        !self.has_legal_moves(Player::Black) && !self.has_legal_moves(Player::White)
    }

    /// Walk each compass ray outward from `loc`, collecting the run of
    /// opponent discs; a run counts only if the walk ends on an own disc.
    /// An occupied `loc` yields all-empty runs.
    pub fn flip_set(&self, loc: Location, color: Player) -> FlipSet {
        let own = self.discs(color);
        let opp = self.discs(!color);
        let mut flips = FlipSet::default();

        if self.occupied().contains_any(loc.mask()) {
            return flips;
        }

        for direction in Direction::ALL {
            let (d_row, d_col) = direction.step();
            let mut run = FlipRun::new();
            let mut row = loc.row() as i8 + d_row;
            let mut col = loc.col() as i8 + d_col;

            loop {
                // A negative coordinate wraps far out of range, so the
                // bounds check below covers both board edges.
                let square = match Location::from_coords(row as u8, col as u8) {
                    Some(square) => square,
                    None => {
                        // The ray ran off the board unanchored.
                        run.clear();
                        break;
                    }
                };
                if opp.contains_any(square.mask()) {
                    if run.is_full() {
                        // Seven opponent discs in a row leave no room for
                        // an anchor on this ray.
                        run.clear();
                        break;
                    }
                    run.push(square);
                    row += d_row;
                    col += d_col;
                } else {
                    if !own.contains_any(square.mask()) {
                        // Empty square: no anchor, the run dies.
                        run.clear();
                    }
                    break;
                }
            }

            flips.runs[direction.index()] = run;
        }

        flips
    }

    /// Place a disc for `color` on `loc`, flipping every captured run.
    /// Returns the successor board and the per-direction flip groups;
    /// rejects occupied squares and flipless placements without mutation.
    pub fn apply_move(&self, loc: Location, color: Player) -> Result<(Board, FlipSet), MoveError> {
        if self.occupied().contains_any(loc.mask()) {
            return Err(MoveError::Occupied(loc));
        }

        let flips = self.flip_set(loc, color);
        if flips.is_empty() {
            return Err(MoveError::NoFlips(loc));
        }

        let flipped = flips.mask();
        let next = self.with_flips(loc, color, flipped);
        Ok((next, flips))
    }

    /// Hot-path move application for search: same placement and flipping
    /// semantics as [`Board::apply_move`], computed with the bitboard
    /// propagation and skipping flip-group construction and legality
    /// checks. The move must be legal.
    #[inline]
    pub fn apply_move_unchecked(&self, loc: Location, color: Player) -> Board {
        let own = self.discs(color);
        let opp = self.discs(!color);
        let flipped = bitboard::flip_mask(own, opp, loc.mask());
        debug_assert!(!flipped.is_empty(), "apply_move_unchecked on illegal move");
        self.with_flips(loc, color, flipped)
    }

    #[inline]
    fn with_flips(&self, loc: Location, color: Player, flipped: Bitboard) -> Board {
        let gained = flipped | loc.mask();
        let next = match color {
            Player::Black => Self {
                black: self.black | gained,
                white: self.white & !flipped,
            },
            Player::White => Self {
                black: self.black & !flipped,
                white: self.white | gained,
            },
        };
        debug_assert!((next.black & next.white).is_empty());
        next
    }
}

impl FlipSet {
    /// The flipped discs along `direction`, ordered from the placed disc
    /// outward.
    #[inline]
    pub fn run(&self, direction: Direction) -> &[Location] {
        &self.runs[direction.index()]
    }

    /// True if no direction flips anything (the move is illegal).
    pub fn is_empty(&self) -> bool {
        self.runs.iter().all(|run| run.is_empty())
    }

    /// Total number of flipped discs.
    pub fn len(&self) -> usize {
        self.runs.iter().map(|run| run.len()).sum()
    }

    /// Union of every run as a mask.
    pub fn mask(&self) -> Bitboard {
        let mut mask = Bitboard::EMPTY;
        for run in &self.runs {
            for loc in run {
                mask |= loc.mask();
            }
        }
        mask
    }

    /// Iterate over all flipped discs, direction by direction.
    pub fn iter(&self) -> impl Iterator<Item = Location> + '_ {
        self.runs.iter().flat_map(|run| run.iter().copied())
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        utils::format_grid(
            (0..64).map(|index| {
                let mask = Bitboard::new(1u64 << index);
                if self.black.contains_any(mask) {
                    '#'
                } else if self.white.contains_any(mask) {
                    'O'
                } else {
                    '.'
                }
            }),
            f,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loc(row: u8, col: u8) -> Location {
        Location::from_coords(row, col).unwrap()
    }

    #[test]
    fn starting_score() {
        let board = Board::new();
        assert_eq!(board.score(), DiscCount { black: 2, white: 2 });
        assert_eq!(board.phase(), 4);
        assert!(!board.is_terminal());
    }

    #[test]
    fn starting_moves_match_flip_sets() {
        let board = Board::new();
        for color in [Player::Black, Player::White] {
            let moves = board.legal_moves(color);
            for index in 0..64 {
                let square = Location::from_index(index);
                let has_flips = !board.flip_set(square, color).is_empty();
                assert_eq!(moves.contains(square), has_flips);
            }
            assert_eq!(moves.len(), 4);
        }
    }

    #[test]
    fn opening_capture() {
        // Black plays C4 and flips exactly the white disc on D4.
        let board = Board::new();
        let (next, flips) = board.apply_move(loc(3, 2), Player::Black).unwrap();

        assert_eq!(flips.len(), 1);
        assert_eq!(flips.run(Direction::East), &[loc(3, 3)]);
        assert_eq!(next.score(), DiscCount { black: 4, white: 1 });

        // The input board is untouched.
        assert_eq!(board.score(), DiscCount { black: 2, white: 2 });
    }

    #[test]
    fn move_adds_exactly_one_disc() {
        let board = Board::new();
        for mv in board.legal_moves(Player::Black) {
            let (next, _) = board.apply_move(mv, Player::Black).unwrap();
            assert_eq!(next.phase(), board.phase() + 1);
        }
    }

    #[test]
    fn occupied_and_flipless_moves_rejected() {
        let board = Board::new();
        assert_eq!(
            board.apply_move(loc(3, 3), Player::Black),
            Err(MoveError::Occupied(loc(3, 3)))
        );
        assert_eq!(
            board.apply_move(loc(0, 0), Player::Black),
            Err(MoveError::NoFlips(loc(0, 0)))
        );
    }

    #[test]
    fn unchecked_apply_matches_checked() {
        let board = Board::new();
        for mv in board.legal_moves(Player::Black) {
            let (checked, _) = board.apply_move(mv, Player::Black).unwrap();
            assert_eq!(board.apply_move_unchecked(mv, Player::Black), checked);
        }
    }

    #[test]
    fn flip_runs_ordered_outward() {
        // Black D1 anchors a two-disc white run below it; placing on D4
        // reports D3 before D2 since the walk moves outward.
        let black = loc(0, 3).mask();
        let white = loc(1, 3).mask() | loc(2, 3).mask();
        let board = Board::from_masks(black, white);

        let flips = board.flip_set(loc(3, 3), Player::Black);
        assert_eq!(flips.run(Direction::North), &[loc(2, 3), loc(1, 3)]);
    }

    #[test]
    #[should_panic]
    fn overlapping_masks_rejected() {
        let overlap = Bitboard::new(1 << 9);
        Board::from_masks(overlap, overlap);
    }

    #[test]
    fn terminal_when_neither_side_moves() {
        // A board fully packed with one color is over.
        let board = Board::from_masks(!Bitboard::EMPTY, Bitboard::EMPTY);
        assert!(board.is_terminal());
        assert!(!board.has_legal_moves(Player::Black));
        assert!(!board.has_legal_moves(Player::White));
    }
}
