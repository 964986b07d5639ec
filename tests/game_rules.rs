use chess_duel::{BotPlayer, Color, GameEngine, GameStatus, MoveError, Square};
use chess_duel::config::BotConfig;
use pretty_assertions::assert_eq;
use std::time::Duration;

fn sq(name: &str) -> Square {
    name.parse().unwrap()
}

fn play(engine: &mut GameEngine, moves: &[&str]) -> GameStatus {
    let mut status = engine.status();
    for mv in moves {
        status = engine
            .apply_request(mv.parse().unwrap())
            .unwrap_or_else(|e| panic!("{} rejected: {}", mv, e));
    }
    status
}

/// A reproducible legal game, driven by a seeded random bot.
fn random_game(seed: u64, plies: usize) -> GameEngine {
    let mut bot = BotPlayer::new(&BotConfig {
        think_delay: Duration::ZERO,
        seed: Some(seed),
    });
    let mut engine = GameEngine::new();
    for _ in 0..plies {
        if engine.status().is_over() {
            break;
        }
        let Some(mv) = bot.choose_move(&engine, engine.side_to_move()) else {
            break;
        };
        engine.apply_request(mv).unwrap();
    }
    engine
}

#[test]
fn fools_mate_is_checkmate() {
    let mut engine = GameEngine::new();
    let status = play(&mut engine, &["f2f3", "e7e5", "g2g4", "d8h4"]);
    assert_eq!(status, GameStatus::Checkmate { winner: Color::Black });
    assert!(engine.is_checkmate(Color::White));
    assert!(engine.legal_moves(Color::White).is_empty());
    assert_eq!(engine.apply_request("a2a3".parse().unwrap()), Err(MoveError::GameOver));
}

#[test]
fn discovered_rook_attack_is_check_not_mate() {
    let mut engine = GameEngine::from_fen("k3r3/8/8/4n3/8/8/8/4K3", Color::Black).unwrap();
    assert_eq!(engine.status(), GameStatus::InProgress);

    let status = engine.apply_move(sq("e5"), sq("c6")).unwrap();
    assert_eq!(status, GameStatus::Check(Color::White));
    assert!(!engine.is_checkmate(Color::White));
    assert!(engine.legal_targets(sq("e1")).contains(&sq("d1")));
    // Staying on the open file is not a reply.
    assert!(!engine.legal_targets(sq("e1")).contains(&sq("e2")));
}

#[test]
fn capturing_the_king_ends_the_game_immediately() {
    let mut engine = GameEngine::from_fen("4k3/8/8/8/4R3/8/8/7K", Color::White).unwrap();
    let board_before = *engine.board();

    let status = engine.apply_move(sq("e4"), sq("e8")).unwrap();
    assert_eq!(status, GameStatus::KingCaptured { winner: Color::White });
    assert_eq!(engine.status(), status);
    assert_eq!(engine.side_to_move(), Color::White);
    assert!(engine.history().is_empty());
    assert_eq!(*engine.board(), board_before);
    assert_eq!(engine.apply_move(sq("h1"), sq("h2")), Err(MoveError::GameOver));
}

#[test]
fn stalemate_is_reported() {
    let mut engine = GameEngine::from_fen("k7/8/1K6/8/8/8/8/2Q5", Color::White).unwrap();
    let status = engine.apply_move(sq("c1"), sq("c7")).unwrap();
    assert_eq!(status, GameStatus::Stalemate);
    assert!(engine.is_stalemate(Color::Black));
    assert!(!engine.is_checkmate(Color::Black));
}

#[test]
fn self_check_filter_never_mutates_the_board() {
    let engine = random_game(11, 30);
    let board = *engine.board();
    for color in [Color::White, Color::Black] {
        for from in Square::all() {
            for to in Square::all() {
                engine.can_move_without_check(from, to, color);
                assert_eq!(*engine.board(), board);
            }
        }
    }
}

#[test]
fn king_cannot_step_into_an_attacked_square() {
    let engine = GameEngine::from_fen("4k3/8/8/8/8/8/r7/4K3", Color::White).unwrap();
    // The rook on a2 covers the whole second rank.
    assert!(!engine.can_move_without_check(sq("e1"), sq("e2"), Color::White));
    assert!(engine.can_move_without_check(sq("e1"), sq("f1"), Color::White));
    assert_eq!(engine.board().to_fen(), "4k3/8/8/8/8/8/r7/4K3");
}

#[test]
fn undo_then_redo_restores_every_prefix() {
    for seed in [1, 2, 3] {
        let mut bot = BotPlayer::new(&BotConfig {
            think_delay: Duration::ZERO,
            seed: Some(seed),
        });
        let mut engine = GameEngine::new();
        for _ in 0..40 {
            if engine.status().is_over() {
                break;
            }
            let Some(mv) = bot.choose_move(&engine, engine.side_to_move()) else {
                break;
            };
            engine.apply_request(mv).unwrap();

            let snapshot = engine.clone();
            assert!(engine.undo());
            assert_ne!(engine.history().cursor(), snapshot.history().cursor());
            assert!(engine.redo());
            assert_eq!(engine, snapshot);
        }
    }
}

#[test]
fn full_rewind_and_replay() {
    let finished = random_game(5, 30);
    let mut engine = finished.clone();

    while engine.undo() {}
    assert_eq!(*engine.board(), *GameEngine::new().board());
    assert_eq!(engine.side_to_move(), Color::White);
    assert_eq!(engine.last_move(), None);
    assert!(!engine.can_undo());
    assert!(engine.can_redo());

    while engine.redo() {}
    assert_eq!(engine, finished);
    assert!(!engine.can_redo());
}

#[test]
fn new_move_after_undo_drops_the_redo_branch() {
    let mut engine = GameEngine::new();
    play(&mut engine, &["e2e4", "e7e5", "g1f3"]);
    engine.undo();
    engine.undo();
    assert_eq!(engine.side_to_move(), Color::Black);

    play(&mut engine, &["c7c5"]);
    assert_eq!(engine.history().len(), 2);
    assert!(!engine.can_redo());
    assert!(!engine.redo());
    assert_eq!(engine.last_move().map(|m| m.to), Some(sq("c5")));
}

#[test]
fn undo_restores_captured_pieces() {
    let mut engine = GameEngine::new();
    play(&mut engine, &["e2e4", "d7d5", "e4d5"]);
    let captured = engine.last_move().and_then(|m| m.piece_captured);
    assert!(captured.is_some());

    engine.undo();
    assert_eq!(engine.board().get(sq("d5")), captured);
    assert_eq!(engine.side_to_move(), Color::White);
    assert_eq!(engine.last_move().map(|m| m.to), Some(sq("d5")));
}

#[test]
fn undo_at_start_is_a_no_op() {
    let mut engine = GameEngine::new();
    assert!(!engine.undo());
    assert!(!engine.redo());
    assert_eq!(engine, GameEngine::new());
}
