//! Iterative-deepening alpha-beta search with a transposition table,
//! history-based move ordering, and principal-variation null windows.
//!
//! One search runs synchronously per move request and explores private
//! `Board` copies only; the live game state is never touched. Cancellation
//! is a wall-clock check between sibling root moves, never preemptive: a
//! node's recursive evaluation always runs to completion once started, and
//! blowing the budget means falling back to the best move of the last
//! fully completed deepening level.

use crate::eval::{self, EvalWeights, WIN_SCORE};
use crate::tables::{Bound, HistoryTable, TranspositionTable, TtEntry, Zobrist};
use arrayvec::ArrayVec;
use log::debug;
use std::time::{Duration, Instant};
use umbra_othello::{Board, Location, Player};

/// Legal moves of one position. 64 slots is comfortably above the maximum
/// branching factor.
type MoveVec = ArrayVec<[Location; 64]>;

/// Search tuning knobs. Defaults carry the shipped tuning; none of the
/// numbers are load-bearing for correctness.
#[derive(Clone, Debug)]
pub struct SearchConfig {
    /// Plies searched in the middlegame.
    pub base_depth: u8,
    /// Extra plies once the board fills up past `endgame_phase` discs.
    pub endgame_depth_bonus: u8,
    pub endgame_phase: u8,
    /// Positions with at most this many legal moves get one extra ply.
    pub scarce_move_threshold: usize,
    /// With at most this many empties, search the full remaining game.
    pub solve_empties: u8,
    /// Wall-clock budget used by [`SearchEngine::select_move_default`].
    pub time_budget: Duration,
    /// Transposition-table capacity, in entries.
    pub table_capacity: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            base_depth: 5,
            endgame_depth_bonus: 3,
            endgame_phase: 50,
            scarce_move_threshold: 6,
            solve_empties: 10,
            time_budget: Duration::from_millis(1000),
            table_capacity: 500_000,
        }
    }
}

/// The search-based move picker. Owns its caches; construct one per game
/// or call [`SearchEngine::reset`] between games.
pub struct SearchEngine {
    config: SearchConfig,
    weights: EvalWeights,
    zobrist: Zobrist,
    tt: TranspositionTable,
    history: HistoryTable,
    nodes: u64,
}

impl Default for SearchEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl SearchEngine {
    pub fn new() -> Self {
        Self::with_config(SearchConfig::default(), EvalWeights::default())
    }

    pub fn with_config(config: SearchConfig, weights: EvalWeights) -> Self {
        let tt = TranspositionTable::new(config.table_capacity);
        Self {
            config,
            weights,
            zobrist: Zobrist::new(),
            tt,
            history: HistoryTable::new(),
            nodes: 0,
        }
    }

    /// Drop all cached state; call between games.
    pub fn reset(&mut self) {
        self.tt.clear();
        self.history.clear();
        self.nodes = 0;
    }

    /// Nodes visited by the most recent [`SearchEngine::select_move`] call.
    pub fn node_count(&self) -> u64 {
        self.nodes
    }

    /// [`SearchEngine::select_move`] under the configured default budget.
    pub fn select_move_default(&mut self, board: &Board, color: Player) -> Option<Location> {
        self.select_move(board, color, self.config.time_budget)
    }

    /// Pick a move for `color` within `budget`, or None iff `color` has no
    /// legal move (a forced pass). Whenever a legal move exists one is
    /// returned, regardless of how small the budget is.
    pub fn select_move(
        &mut self,
        board: &Board,
        color: Player,
        budget: Duration,
    ) -> Option<Location> {
        let mut moves: MoveVec = board.legal_moves(color).collect();
        if moves.is_empty() {
            return None;
        }
        if moves.len() == 1 {
            return Some(moves[0]);
        }

        self.nodes = 0;
        let start = Instant::now();
        let phase = board.phase();
        let max_depth = self.max_depth(board, moves.len());

        self.order_moves(&mut moves, phase);
        let mut best_move = moves[0];
        let mut best_score = f64::NEG_INFINITY;

        'deepening: for depth in 1..=max_depth {
            // Search last iteration's best line first.
            if let Some(found) = moves.iter().position(|&mv| mv == best_move) {
                moves.swap(0, found);
            }

            let mut level_best: Option<Location> = None;
            let mut level_score = f64::NEG_INFINITY;

            for &mv in moves.iter() {
                // Cooperative cancellation between sibling evaluations: a
                // partially searched level is discarded, keeping the best
                // move of the last completed one.
                if start.elapsed() > budget {
                    debug!(
                        "search timeout at depth {} after {} nodes; keeping {}",
                        depth, self.nodes, best_move
                    );
                    break 'deepening;
                }

                let next = board.apply_move_unchecked(mv, color);
                let score = match level_best {
                    // First move: full window.
                    None => self.alpha_beta(
                        next,
                        color,
                        depth - 1,
                        f64::NEG_INFINITY,
                        f64::INFINITY,
                        false,
                    ),
                    // Later moves: null window around the level best, with
                    // a full re-search when the null window fails high.
                    Some(_) => {
                        let probe = self.alpha_beta(
                            next,
                            color,
                            depth - 1,
                            level_score,
                            level_score + 1.0,
                            false,
                        );
                        if probe > level_score {
                            self.alpha_beta(
                                next,
                                color,
                                depth - 1,
                                f64::NEG_INFINITY,
                                f64::INFINITY,
                                false,
                            )
                        } else {
                            probe
                        }
                    }
                };

                if score > level_score {
                    level_score = score;
                    level_best = Some(mv);
                    self.history.reward(mv, depth);
                }
            }

            if let Some(mv) = level_best {
                best_move = mv;
                best_score = level_score;
                debug!(
                    "depth {depth}: best {best_move} score {best_score:.1} \
                     ({} nodes, {:?} elapsed, {} table entries)",
                    self.nodes,
                    start.elapsed(),
                    self.tt.len()
                );
            }

            // A certain win needs no deeper confirmation.
            if best_score >= WIN_SCORE {
                break;
            }
            if start.elapsed() > budget {
                break;
            }
        }

        Some(best_move)
    }

    /// Depth bound for this position: deeper once the endgame nears or when
    /// few moves are available, and a full-width solve of the remaining
    /// game once the empty count is small enough.
    fn max_depth(&self, board: &Board, move_count: usize) -> u8 {
        let phase = board.phase();
        let empties = 64 - phase;
        if empties <= self.config.solve_empties {
            return empties.max(1);
        }

        let mut depth = self.config.base_depth;
        if phase >= self.config.endgame_phase {
            depth += self.config.endgame_depth_bonus;
        }
        if move_count <= self.config.scarce_move_threshold {
            depth += 1;
        }
        depth
    }

    /// Fail-soft alpha-beta over positions seen from `me`'s perspective.
    /// `maximizing` is true when `me` is to move.
    fn alpha_beta(
        &mut self,
        board: Board,
        me: Player,
        depth: u8,
        mut alpha: f64,
        mut beta: f64,
        maximizing: bool,
    ) -> f64 {
        self.nodes += 1;
        let to_move = if maximizing { me } else { !me };
        let hash = self.zobrist.hash(&board, to_move, me);

        if let Some(value) = self.tt.probe(hash, depth, alpha, beta) {
            return value;
        }
        let (alpha_in, beta_in) = (alpha, beta);

        if depth == 0 || board.is_terminal() {
            let value = eval::evaluate(&board, me, &self.weights);
            self.tt.store(
                hash,
                TtEntry {
                    depth,
                    bound: Bound::Exact,
                    value,
                },
            );
            return value;
        }

        let mut moves: MoveVec = board.legal_moves(to_move).collect();

        // Forced pass: the turn flips but no ply is consumed, so the
        // search horizon stays put.
        if moves.is_empty() {
            let value = self.alpha_beta(board, me, depth, alpha, beta, !maximizing);
            self.store(hash, depth, value, alpha_in, beta_in);
            return value;
        }

        self.order_moves(&mut moves, board.phase());

        let mut best = if maximizing {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        };

        for &mv in moves.iter() {
            let next = board.apply_move_unchecked(mv, to_move);
            let value = self.alpha_beta(next, me, depth - 1, alpha, beta, !maximizing);

            if maximizing {
                if value > best {
                    best = value;
                    self.history.reward(mv, depth);
                }
                alpha = alpha.max(best);
            } else {
                if value < best {
                    best = value;
                    self.history.reward(mv, depth);
                }
                beta = beta.min(best);
            }

            if beta <= alpha {
                // The refutation deserves to be tried early elsewhere.
                self.history.reward(mv, depth);
                break;
            }
        }

        self.store(hash, depth, best, alpha_in, beta_in);
        best
    }

    /// Store a node result classified against the window it was searched
    /// with: inside is exact, at/below alpha an upper bound, at/above beta
    /// a lower bound.
    fn store(&mut self, hash: u64, depth: u8, value: f64, alpha: f64, beta: f64) {
        let bound = if value <= alpha {
            Bound::Upper
        } else if value >= beta {
            Bound::Lower
        } else {
            Bound::Exact
        };
        self.tt.store(
            hash,
            TtEntry {
                depth,
                bound,
                value,
            },
        );
    }

    /// Order moves best-first by accumulated history weight combined with
    /// the phase-aware static square value. Ties break on the square index,
    /// which keeps move choice deterministic for a fixed position.
    fn order_moves(&self, moves: &mut MoveVec, phase: u8) {
        let key = |mv: Location| {
            self.history.weight(mv) as f64 * 10.0 + eval::square_value(mv, phase)
        };
        moves.sort_unstable_by(|&a, &b| {
            key(b)
                .total_cmp(&key(a))
                .then_with(|| a.index().cmp(&b.index()))
        });
    }
}
