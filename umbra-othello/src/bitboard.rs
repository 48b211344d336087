//! Low-level bitboard operations.
//!
//! For efficiency, these operations are unchecked and may produce nonsense
//! if the two players' masks overlap.
//!
//! Under the hood, everything works on u64 bitboards. By convention, bit
//! `row * 8 + col` is the square at `(row, col)`, with row 0 the top of the
//! board: the LSB is the upper-left corner (A1).
//!
//! Move generation and flip computation propagate runs of opponent discs by
//! repeated shift-and-mask steps, bounded by 6 iterations (the board width
//! minus the two end squares). Each [`Direction`] carries a boundary mask
//! that zeroes out bits which would otherwise wrap across the left or right
//! board edge when shifted.

use crate::utils;
use derive_more::{
    BitAnd, BitAndAssign, BitOr, BitOrAssign, BitXor, BitXorAssign, From, Into, Not,
};
use std::fmt::{self, Display, Formatter};

/// Holds a single bit per location on an Othello board.
/// Wraps [`u64`] for efficient bit-twiddling, but avoids mixing with numerics.
#[derive(
    Clone,
    Copy,
    Debug,
    Eq,
    Hash,
    PartialEq,
    PartialOrd,
    Ord,
    Default,
    From,
    Into,
    BitAnd,
    BitAndAssign,
    BitOr,
    BitOrAssign,
    BitXor,
    BitXorAssign,
    Not,
)]
pub struct Bitboard(u64);

/// Starting bitboard for Black: D5 and E4.
pub const BLACK_START: Bitboard = Bitboard((1 << 28) | (1 << 35));

/// Starting bitboard for White: D4 and E5.
pub const WHITE_START: Bitboard = Bitboard((1 << 27) | (1 << 36));

/// Everything except the far-left column (file A).
const NOT_FILE_A: u64 = 0xfefefefefefefefe;

/// Everything except the far-right column (file H).
const NOT_FILE_H: u64 = 0x7f7f7f7f7f7f7f7f;

const FULL_MASK: u64 = 0xffffffffffffffff;

/// One of the 8 compass rays on the 8x8 grid.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Direction {
    North,
    NorthEast,
    East,
    SouthEast,
    South,
    SouthWest,
    West,
    NorthWest,
}

impl Direction {
    /// All 8 directions, in the order used to index flip groups.
    pub const ALL: [Direction; 8] = [
        Direction::North,
        Direction::NorthEast,
        Direction::East,
        Direction::SouthEast,
        Direction::South,
        Direction::SouthWest,
        Direction::West,
        Direction::NorthWest,
    ];

    /// Index of this direction in [`Direction::ALL`].
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Step as a `(d_row, d_col)` pair.
    #[inline]
    pub fn step(self) -> (i8, i8) {
        match self {
            Direction::North => (-1, 0),
            Direction::NorthEast => (-1, 1),
            Direction::East => (0, 1),
            Direction::SouthEast => (1, 1),
            Direction::South => (1, 0),
            Direction::SouthWest => (1, -1),
            Direction::West => (0, -1),
            Direction::NorthWest => (-1, -1),
        }
    }

    /// Bit-index offset of one step (positive: left shift, negative: right shift).
    #[inline]
    fn offset(self) -> i8 {
        let (d_row, d_col) = self.step();
        d_row * 8 + d_col
    }

    /// Mask that clips off the invalid wraparound bits after one shift.
    #[inline]
    fn wrap_mask(self) -> u64 {
        match self.step().1 {
            1 => NOT_FILE_A,
            -1 => NOT_FILE_H,
            _ => FULL_MASK,
        }
    }
}

impl Bitboard {
    /// The empty bitboard.
    pub const EMPTY: Bitboard = Bitboard(0);

    /// Construct directly from a raw mask.
    #[inline]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Count the number of occupied spaces in the bitboard.
    #[inline]
    pub fn count_occupied(self) -> u8 {
        self.0.count_ones() as u8
    }

    /// Count the number of empty spaces in the bitboard.
    #[inline]
    pub fn count_empty(self) -> u8 {
        self.0.count_zeros() as u8
    }

    /// Return true if this bitboard is empty.
    #[inline]
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Shift every bit one step along `direction`, clipping bits that would
    /// wrap across the left or right board edge.
    #[inline]
    pub fn shifted(self, direction: Direction) -> Self {
        let offset = direction.offset();
        let raw = if offset > 0 {
            self.0 << offset
        } else {
            self.0 >> -offset
        };
        Self(raw & direction.wrap_mask())
    }

    /// Whether this bitboard intersects `other`.
    #[inline]
    pub fn contains_any(self, other: Bitboard) -> bool {
        !(self & other).is_empty()
    }

    /// Union of the one-step neighbors of every set bit, in all 8 directions.
    #[inline]
    pub fn dilated(self) -> Self {
        let mut out = Bitboard::EMPTY;
        for direction in Direction::ALL {
            out |= self.shifted(direction);
        }
        out
    }
}

/// Compute a mask of the legal moves for the player owning `own` against
/// the player owning `opp`. Results are unspecified if the masks overlap.
///
/// For each direction: shift the mover's discs one step, intersect with the
/// opponent's discs to start candidate rays, then extend each ray through
/// consecutive opponent discs to a fixed point. One further shift into the
/// empty squares yields the legal destinations along that ray.
#[inline]
pub fn move_mask(own: Bitboard, opp: Bitboard) -> Bitboard {
    let empties = !(own | opp);
    let mut moves = Bitboard::EMPTY;

    for direction in Direction::ALL {
        let mut run = own.shifted(direction) & opp;
        let mut flips = Bitboard::EMPTY;

        // At most 6 opponent discs fit between two squares on one ray.
        for _ in 0..6 {
            if run.is_empty() {
                break;
            }
            flips |= run;

            let next = run.shifted(direction) & opp;
            if next.is_empty() {
                break;
            }
            run = next;
        }

        moves |= flips.shifted(direction) & empties;
    }

    moves
}

/// Compute the discs flipped along a single direction by placing a disc on
/// the one-hot mask `placed`: the maximal run of opponent discs terminated
/// by an own disc, or the empty mask if the run ends on an empty square or
/// the board edge.
#[inline]
pub fn directional_flips(
    own: Bitboard,
    opp: Bitboard,
    placed: Bitboard,
    direction: Direction,
) -> Bitboard {
    let mut flips = Bitboard::EMPTY;
    let mut frontier = placed.shifted(direction) & opp;

    for _ in 0..6 {
        if frontier.is_empty() {
            break;
        }
        flips |= frontier;

        let next = frontier.shifted(direction) & opp;
        if next.is_empty() {
            break;
        }
        frontier = next;
    }

    // The run counts only if the square past its far end holds an own disc.
    if !(frontier.shifted(direction) & own).is_empty() {
        flips
    } else {
        Bitboard::EMPTY
    }
}

/// Compute the full mask of discs flipped by placing a disc on the one-hot
/// mask `placed`: the union of [`directional_flips`] over all 8 directions.
#[inline]
pub fn flip_mask(own: Bitboard, opp: Bitboard, placed: Bitboard) -> Bitboard {
    let mut flips = Bitboard::EMPTY;
    for direction in Direction::ALL {
        flips |= directional_flips(own, opp, placed, direction);
    }
    flips
}

impl Display for Bitboard {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        utils::format_grid(
            (0..64).map(|index| match self.0 & (1u64 << index) {
                0 => '.',
                _ => '#',
            }),
            f,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_masks_disjoint() {
        assert!((BLACK_START & WHITE_START).is_empty());
        assert_eq!(BLACK_START.count_occupied(), 2);
        assert_eq!(WHITE_START.count_occupied(), 2);
    }

    #[test]
    fn shift_clips_wraparound() {
        // H1 shifted east must vanish, not wrap onto A2.
        let h1 = Bitboard::new(1 << 7);
        assert!(h1.shifted(Direction::East).is_empty());

        // A1 shifted west must vanish, not wrap onto H1 of the row above.
        let a1 = Bitboard::new(1);
        assert!(a1.shifted(Direction::West).is_empty());

        // A1 shifted north falls off the board.
        assert!(a1.shifted(Direction::North).is_empty());
    }

    #[test]
    fn initial_moves() {
        // Black to move on the starting board: D3, C4, F5, E6.
        let moves = move_mask(BLACK_START, WHITE_START);
        let expected = (1u64 << 19) | (1 << 26) | (1 << 37) | (1 << 44);
        assert_eq!(moves, Bitboard::new(expected));
    }

    #[test]
    fn flips_confirmed_only_with_anchor() {
        // Black on C4, White on D4: placing on E4 flips D4 westward.
        let own = Bitboard::new(1 << 26);
        let opp = Bitboard::new(1 << 27);
        let placed = Bitboard::new(1 << 28);
        assert_eq!(
            directional_flips(own, opp, placed, Direction::West),
            Bitboard::new(1 << 27)
        );

        // Without the anchoring black disc, the run dies on an empty square.
        assert!(directional_flips(Bitboard::EMPTY, opp, placed, Direction::West).is_empty());
    }

    #[test]
    fn flip_mask_crosses_multiple_directions() {
        // White discs north and east of the placed square, each anchored by black.
        let own = Bitboard::new((1 << 2) | (1 << 21));
        let opp = Bitboard::new((1 << 10) | (1 << 19) | (1 << 20));
        let placed = Bitboard::new(1 << 18);
        assert_eq!(
            flip_mask(own, opp, placed),
            Bitboard::new((1 << 10) | (1 << 19) | (1 << 20))
        );
    }

    #[test]
    fn dilated_reaches_all_neighbors() {
        // A lone interior disc has 8 neighbors; a corner disc has 3.
        let center = Bitboard::new(1 << 27);
        assert_eq!(center.dilated().count_occupied(), 8);
        let corner = Bitboard::new(1);
        assert_eq!(corner.dilated().count_occupied(), 3);
    }
}
