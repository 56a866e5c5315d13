use checkerboard::error::ErrorKind;
use checkerboard::game::Game;
use checkerboard::piece::{Colour, JUMPED};
use checkerboard::state;

#[test]
fn diff_of_successive_snapshots_isolates_the_move() {
    let mut game = Game::standard().unwrap();

    let before = game.state();
    let after = game.move_piece(Colour::White, 9, 24).unwrap();

    let changed = state::diff(&before, &after).unwrap();
    assert_eq!(changed.len(), 1);
    assert_eq!(changed[0].colour, Colour::White);
    assert_eq!(changed[0].number, 9);
    assert_eq!(changed[0].position, 24);
}

#[test]
fn diff_of_a_jump_includes_the_captured_piece() {
    let mut game = Game::standard().unwrap();
    let rules = game.rules().clone();
    let mut pieces = game.full_state().to_vec();
    for p in &mut pieces {
        match (p.colour(), p.number()) {
            (Colour::White, 1) => p.set_position(&rules, 17).unwrap(),
            (Colour::Black, 1) => p.set_position(&rules, 26).unwrap(),
            (Colour::Black, 2) => p.set_position(&rules, 42).unwrap(),
            _ => p.jumped(),
        }
    }
    game.set_state(pieces).unwrap();

    let before = game.state();
    let after = game.move_piece(Colour::White, 1, 35).unwrap();

    let changed = state::diff(&before, &after).unwrap();
    assert_eq!(changed.len(), 2);
    let mover = changed.iter().find(|ps| ps.colour == Colour::White).unwrap();
    assert_eq!(mover.position, 35);
    let jumped = changed.iter().find(|ps| ps.colour == Colour::Black).unwrap();
    assert_eq!(jumped.number, 1);
    assert_eq!(jumped.position, JUMPED);
}

#[test]
fn attempts_are_logged_before_validation() {
    let mut game = Game::standard().unwrap();

    // 25 is off the playable colour; the move fails but is still logged.
    let err = game.move_piece(Colour::White, 9, 25).unwrap_err();
    assert_eq!(err.kind, ErrorKind::IllegalValue);
    assert_eq!(game.moves().len(), 1);
    assert_eq!(game.moves()[0].game_id, -1);
    assert_eq!(game.moves()[0].colour, Colour::White);
    assert_eq!(game.moves()[0].number, 9);
    assert_eq!(game.moves()[0].to_position, 25);

    game.set_game_id(7);
    game.move_piece(Colour::White, 9, 24).unwrap();
    assert_eq!(game.moves().len(), 2);
    assert_eq!(game.moves()[1].game_id, 7);

    game.clear_moves();
    assert!(game.moves().is_empty());
}

#[test]
fn move_errors_carry_the_offending_request() {
    let mut game = Game::standard().unwrap();

    let err = game.move_piece(Colour::White, 9, 10).unwrap_err();
    assert_eq!(err.kind, ErrorKind::IllegalMove);
    assert_eq!(err.colour, Some(Colour::White));
    assert_eq!(err.number, Some(9));
    assert_eq!(err.to_position, Some(10));
    assert!(!err.to_string().is_empty());
}
