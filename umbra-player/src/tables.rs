//! Search caches: position hashing, the transposition table, and the
//! history table.
//!
//! Both tables are pure caches owned by one search engine: losing an entry
//! can never change a search result, only make it slower. They are
//! unsynchronized on purpose; the engine is single-threaded.

use std::collections::{HashMap, VecDeque};
use umbra_othello::{Board, Location, Player};

/// Fixed seed for the key tables, so hashes are reproducible across runs.
const ZOBRIST_SEED: u64 = 0x9c5a_61f2_33d1_8f0b;

/// SplitMix64 step, used only to derive the key tables.
fn splitmix64(state: &mut u64) -> u64 {
    *state = state.wrapping_add(0x9e37_79b9_7f4a_7c15);
    let mut z = *state;
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}

/// Zobrist keys: one per (color, square), plus a side-to-move key and a
/// key for the perspective the stored values were computed from. A search
/// engine may serve either color over its lifetime, so two searches of the
/// same position from opposite perspectives must never share an entry.
pub struct Zobrist {
    pieces: [[u64; 64]; 2],
    white_to_move: u64,
    white_perspective: u64,
}

impl Default for Zobrist {
    fn default() -> Self {
        Self::new()
    }
}

impl Zobrist {
    pub fn new() -> Self {
        let mut state = ZOBRIST_SEED;
        let mut pieces = [[0u64; 64]; 2];
        for color in &mut pieces {
            for key in color.iter_mut() {
                *key = splitmix64(&mut state);
            }
        }
        Self {
            pieces,
            white_to_move: splitmix64(&mut state),
            white_perspective: splitmix64(&mut state),
        }
    }

    /// Hash the disc position, the side to move, and the color whose
    /// perspective the search values take.
    pub fn hash(&self, board: &Board, to_move: Player, perspective: Player) -> u64 {
        let mut hash = 0u64;
        for loc in board.discs(Player::Black).locations() {
            hash ^= self.pieces[0][loc.index() as usize];
        }
        for loc in board.discs(Player::White).locations() {
            hash ^= self.pieces[1][loc.index() as usize];
        }
        if to_move == Player::White {
            hash ^= self.white_to_move;
        }
        if perspective == Player::White {
            hash ^= self.white_perspective;
        }
        hash
    }
}

/// How a stored value relates to the true score of its node.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Bound {
    Exact,
    Lower,
    Upper,
}

/// A completed search result for one position.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TtEntry {
    pub depth: u8,
    pub bound: Bound,
    pub value: f64,
}

/// Bounded cache from position hash to search result. Eviction is
/// first-in-first-out: once over capacity, the oldest surviving entry goes.
pub struct TranspositionTable {
    entries: HashMap<u64, TtEntry>,
    insertion_order: VecDeque<u64>,
    capacity: usize,
}

impl TranspositionTable {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: HashMap::with_capacity(capacity.min(1 << 16)),
            insertion_order: VecDeque::new(),
            capacity: capacity.max(1),
        }
    }

    /// Look up a stored value usable under the current window: an entry
    /// must be at least as deep as requested, and its bound must already
    /// decide the node (Exact always; a lower bound only at/above beta; an
    /// upper bound only at/below alpha).
    pub fn probe(&self, hash: u64, depth: u8, alpha: f64, beta: f64) -> Option<f64> {
        let entry = self.entries.get(&hash)?;
        if entry.depth < depth {
            return None;
        }
        match entry.bound {
            Bound::Exact => Some(entry.value),
            Bound::Lower if entry.value >= beta => Some(entry.value),
            Bound::Upper if entry.value <= alpha => Some(entry.value),
            _ => None,
        }
    }

    /// Insert or overwrite an entry, evicting the oldest once the table
    /// outgrows its capacity.
    pub fn store(&mut self, hash: u64, entry: TtEntry) {
        if self.entries.insert(hash, entry).is_none() {
            self.insertion_order.push_back(hash);
        }
        while self.entries.len() > self.capacity {
            match self.insertion_order.pop_front() {
                Some(oldest) => {
                    self.entries.remove(&oldest);
                }
                None => break,
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.insertion_order.clear();
    }
}

/// Accumulated move-ordering weight cap; rewards saturate here.
const HISTORY_CAP: u64 = 1 << 32;

/// Move-ordering weights: moves that caused cutoffs or improvements get
/// searched earlier next time, independent of position.
pub struct HistoryTable {
    weights: [u64; 64],
}

impl Default for HistoryTable {
    fn default() -> Self {
        Self::new()
    }
}

impl HistoryTable {
    pub fn new() -> Self {
        Self { weights: [0; 64] }
    }

    #[inline]
    pub fn weight(&self, loc: Location) -> u64 {
        self.weights[loc.index() as usize]
    }

    /// Reward a move that cut off or improved at `depth`: deeper successes
    /// count exponentially more.
    #[inline]
    pub fn reward(&mut self, loc: Location, depth: u8) {
        let weight = &mut self.weights[loc.index() as usize];
        *weight = weight
            .saturating_add(1u64 << depth.min(32))
            .min(HISTORY_CAP);
    }

    pub fn clear(&mut self) {
        self.weights = [0; 64];
    }
}
