//! The move-picker variants behind the CPU difficulty tiers.
//!
//! Every variant answers the same question: given a board, a color, and a
//! time budget, which square do we play? `None` always means a forced
//! pass, never a failure; each variant degrades internally instead of
//! erroring out.

use crate::search::SearchEngine;
use log::warn;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::Duration;
use umbra_othello::{Board, Location, Player};

/// Contract for an external per-square move scorer (e.g. a policy network).
/// Higher scores mean more preferred squares; only scores of legal squares
/// are ever consulted.
pub trait MoveScorer {
    fn score_moves(&self, board: &Board, color: Player) -> [f32; 64];
}

/// A way of choosing moves. The tiers select among these by configuration.
pub enum Strategy {
    /// Uniform-random over legal moves.
    Random(StdRng),
    /// Iterative-deepening alpha-beta search.
    Search(SearchEngine),
    /// Greedy over an external scorer's preferences. A missing scorer
    /// degrades this variant (and only this variant) to random play.
    Model {
        scorer: Option<Box<dyn MoveScorer>>,
        rng: StdRng,
        warned: bool,
    },
}

impl Strategy {
    pub fn random() -> Self {
        Self::Random(StdRng::from_entropy())
    }

    /// Random play with a fixed seed, for reproducible games.
    pub fn random_seeded(seed: u64) -> Self {
        Self::Random(StdRng::seed_from_u64(seed))
    }

    pub fn search() -> Self {
        Self::Search(SearchEngine::new())
    }

    /// A model-backed picker. Passing `None` (the scorer failed to load)
    /// is valid and falls back to uniform-random selection.
    pub fn model(scorer: Option<Box<dyn MoveScorer>>) -> Self {
        Self::Model {
            scorer,
            rng: StdRng::from_entropy(),
            warned: false,
        }
    }

    /// Choose a move for `color`, or None iff `color` must pass.
    pub fn select_move(
        &mut self,
        board: &Board,
        color: Player,
        budget: Duration,
    ) -> Option<Location> {
        let moves: Vec<Location> = board.legal_moves(color).collect();
        if moves.is_empty() {
            return None;
        }

        match self {
            Strategy::Random(rng) => Some(moves[rng.gen_range(0..moves.len())]),
            Strategy::Search(engine) => engine.select_move(board, color, budget),
            Strategy::Model {
                scorer,
                rng,
                warned,
            } => match scorer {
                Some(scorer) => {
                    let scores = scorer.score_moves(board, color);
                    moves.into_iter().max_by(|&a, &b| {
                        let (sa, sb) = (scores[a.index() as usize], scores[b.index() as usize]);
                        sa.total_cmp(&sb)
                            .then_with(|| b.index().cmp(&a.index()))
                    })
                }
                None => {
                    if !*warned {
                        warn!("move scorer unavailable; model tier plays randomly");
                        *warned = true;
                    }
                    Some(moves[rng.gen_range(0..moves.len())])
                }
            },
        }
    }

    /// Drop per-game state (search caches); call between games.
    pub fn reset(&mut self) {
        if let Strategy::Search(engine) = self {
            engine.reset();
        }
    }
}
