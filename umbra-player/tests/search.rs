//! End-to-end scenarios for the move pickers over real game flows.

use std::time::Duration;
use umbra_othello::bitboard::Bitboard;
use umbra_othello::{Action, Board, GameState, Location, Player};
use umbra_player::{EvalWeights, SearchConfig, SearchEngine, Strategy};

fn loc(row: u8, col: u8) -> Location {
    Location::from_coords(row, col).unwrap()
}

fn shallow_engine() -> SearchEngine {
    let config = SearchConfig {
        base_depth: 3,
        time_budget: Duration::from_millis(20),
        ..SearchConfig::default()
    };
    SearchEngine::with_config(config, EvalWeights::default())
}

#[test]
fn default_budget_entry_point_moves() {
    let mut engine = shallow_engine();
    let board = Board::new();
    let mv = engine
        .select_move_default(&board, Player::Black)
        .expect("black can move");
    assert!(board.legal_moves(Player::Black).contains(mv));
}

#[test]
fn opening_capture_scenario() {
    // Initial board: two discs each. Black's capture on the square above
    // the white center disc flips exactly that disc.
    let board = Board::new();
    let score = board.score();
    assert_eq!((score.black, score.white), (2, 2));

    let (next, flips) = board.apply_move(loc(2, 3), Player::Black).unwrap();
    let flipped: Vec<Location> = flips.iter().collect();
    assert_eq!(flipped, vec![loc(3, 3)]);

    let score = next.score();
    assert_eq!((score.black, score.white), (4, 1));
}

#[test]
fn forced_win_detected_and_applied() {
    // Black A1 against White B1: Black's one legal move is C1, and taking
    // it wipes White out entirely.
    let board = Board::from_masks(Bitboard::new(0x01), Bitboard::new(0x02));
    let moves: Vec<Location> = board.legal_moves(Player::Black).collect();
    assert_eq!(moves, vec![loc(0, 2)]);
    assert!(board.legal_moves(Player::White).is_empty());

    let mut engine = SearchEngine::new();
    let mv = engine
        .select_move(&board, Player::Black, Duration::from_millis(100))
        .expect("black has a move");
    assert_eq!(mv, loc(0, 2));

    let (after, _) = board.apply_move(mv, Player::Black).unwrap();
    assert!(after.is_terminal());
    assert_eq!(after.score().white, 0);

    let finished = GameState {
        board: after,
        to_move: Player::White,
    };
    assert!(finished.is_finished());
    assert_eq!(finished.winner(), Some(Player::Black));
}

#[test]
fn tiny_budget_never_starves() {
    let mut engine = shallow_engine();
    let mut state = GameState::new();

    // March a few plies into the midgame with an effectively zero budget:
    // a legal move must come back at every turn that has one.
    for _ in 0..12 {
        if state.is_finished() {
            break;
        }
        let action = match engine.select_move(&state.board, state.to_move, Duration::from_millis(0))
        {
            Some(mv) => {
                assert!(state.legal_moves().contains(mv));
                Action::Place(mv)
            }
            None => {
                assert!(state.must_pass());
                Action::Pass
            }
        };
        state = state.advance(action).unwrap().0;
    }
}

#[test]
fn search_beats_itself_deterministically() {
    let board = Board::new();
    let budget = Duration::from_secs(30);

    let mv_a = shallow_engine().select_move(&board, Player::Black, budget);
    let mv_b = shallow_engine().select_move(&board, Player::Black, budget);
    assert_eq!(mv_a, mv_b);
}

#[test]
fn full_game_between_strategies_terminates_cleanly() {
    let mut search = Strategy::Search(shallow_engine());
    let mut random = Strategy::random_seeded(0xbead);
    let budget = Duration::from_millis(20);

    let mut state = GameState::new();
    let mut plies = 0;

    while !state.is_finished() {
        plies += 1;
        assert!(plies <= 130, "game failed to terminate");

        let strategy: &mut Strategy = match state.to_move {
            Player::Black => &mut search,
            Player::White => &mut random,
        };

        let action = match strategy.select_move(&state.board, state.to_move, budget) {
            Some(mv) => Action::Place(mv),
            None => Action::Pass,
        };

        // Every committed transition is validated by the rules layer.
        state = state.advance(action).unwrap().0;
    }

    let score = state.board.score();
    assert!(score.black + score.white <= 64);
    assert!(state.board.legal_moves(Player::Black).is_empty());
    assert!(state.board.legal_moves(Player::White).is_empty());
}

/// Game-theoretic win/loss/draw value from `to_move`'s point of view,
/// by exhaustive negamax. Only viable with a handful of empties.
fn wld(board: Board, to_move: Player, passed: bool) -> i8 {
    let moves: Vec<Location> = board.legal_moves(to_move).collect();
    if moves.is_empty() {
        if passed {
            let score = board.score();
            let diff = score.black as i8 - score.white as i8;
            let signed = match to_move {
                Player::Black => diff,
                Player::White => -diff,
            };
            return signed.signum();
        }
        return -wld(board, !to_move, true);
    }

    let mut best = -1;
    for mv in moves {
        let next = board.apply_move_unchecked(mv, to_move);
        best = best.max(-wld(next, !to_move, false));
        if best == 1 {
            break;
        }
    }
    best
}

#[test]
fn endgame_solve_achieves_the_optimal_outcome() {
    // Drive seeded random games into positions with few empties, then
    // check the full-width solve never concedes a better outcome than
    // exhaustive analysis allows.
    let mut tested = 0;

    for seed in 0..5u64 {
        let mut random = Strategy::random_seeded(seed);
        let mut state = GameState::new();

        while !state.is_finished() && state.board.empties().count_occupied() > 7 {
            let action = match random.select_move(
                &state.board,
                state.to_move,
                Duration::from_millis(5),
            ) {
                Some(mv) => Action::Place(mv),
                None => Action::Pass,
            };
            state = state.advance(action).unwrap().0;
        }
        if state.is_finished() || state.must_pass() {
            continue;
        }

        let color = state.to_move;
        let optimal = wld(state.board, color, false);

        let mut engine = SearchEngine::new();
        let mv = engine
            .select_move(&state.board, color, Duration::from_secs(30))
            .expect("side to move has moves");
        let after = state.board.apply_move_unchecked(mv, color);
        let achieved = -wld(after, !color, false);

        assert_eq!(achieved, optimal, "seed {} played below its potential", seed);
        tested += 1;
    }

    assert!(tested > 0, "no playout produced a solvable endgame");
}
