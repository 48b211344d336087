use crate::game::{Action, GameState};
use crate::location::Location;

/// Play an interactive two-player Othello game on the console.
pub fn play_interactive() {
    use std::io::Write;
    let mut game = GameState::new();

    while !game.is_finished() {
        loop {
            println!("\n{}", game);

            if game.must_pass() {
                println!("No legal moves: {} passes.", game.to_move);
                game = game.advance(Action::Pass).unwrap().0;
                break;
            }

            print!("Enter a move: ");
            std::io::stdout().flush().unwrap();
            let mut input_line = String::new();
            std::io::stdin().read_line(&mut input_line).unwrap();

            let parsed: Result<Location, _> = input_line.trim().parse();
            let loc = match parsed {
                Ok(loc) => loc,
                Err(_) => {
                    println!("Cannot parse move.");
                    continue;
                }
            };

            match game.advance(Action::Place(loc)) {
                Ok((next, _)) => {
                    game = next;
                    break;
                }
                Err(_) => {
                    println!("Invalid move. Legal moves: {}", game.legal_moves());
                    continue;
                }
            }
        }
    }

    let score = game.board.score();
    println!("\n{}", game.board);
    println!("Final score: {} - {}.", score.black, score.white);
    if let Some(winner) = game.winner() {
        println!("Winner: {}.", winner);
    } else {
        println!("Draw.")
    }
}
