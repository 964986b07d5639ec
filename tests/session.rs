use std::time::Duration;

use chess_duel::config::BotConfig;
use chess_duel::protocol::{ClientMessage, WireMove};
use chess_duel::{BotPlayer, Color, GameEngine, MoveError, MoveRequest, Session};
use pretty_assertions::assert_eq;
use tokio::sync::mpsc;

fn mv(text: &str) -> MoveRequest {
    text.parse().unwrap()
}

fn quick_bot(seed: u64) -> BotPlayer {
    BotPlayer::new(&BotConfig {
        think_delay: Duration::ZERO,
        seed: Some(seed),
    })
}

#[test]
fn local_players_alternate() {
    let mut session = Session::local();
    assert!(session.is_local_turn());
    session.play(mv("e2e4")).unwrap();
    assert!(session.is_local_turn());
    session.play(mv("e7e5")).unwrap();
    assert_eq!(session.engine().history().len(), 2);

    assert!(session.undo());
    assert_eq!(session.engine().side_to_move(), Color::Black);
    assert!(session.redo());
    assert!(session.reset());
    assert_eq!(session.engine(), &GameEngine::new());
}

#[tokio::test]
async fn bot_answers_after_the_human() {
    let mut session = Session::against_bot(Color::Black, quick_bot(4));
    assert!(!session.bot_to_move());
    assert!(session.bot_reply().await.is_none());

    session.play(mv("d2d4")).unwrap();
    assert!(session.bot_to_move());
    assert_eq!(session.play(mv("d7d5")), Err(MoveError::NotYourTurn));

    let reply = session.bot_reply().await;
    assert!(matches!(reply, Some(Ok(_))));
    assert_eq!(session.engine().side_to_move(), Color::White);
    assert_eq!(session.engine().history().len(), 2);
    assert!(!session.bot_to_move());
}

#[tokio::test]
async fn undo_against_the_bot_returns_to_the_human() {
    let mut session = Session::against_bot(Color::Black, quick_bot(8));
    session.play(mv("e2e4")).unwrap();
    session.bot_reply().await;
    session.play(mv("g1f3")).unwrap();
    session.bot_reply().await;
    assert_eq!(session.engine().history().cursor(), 4);

    assert!(session.undo());
    assert_eq!(session.engine().history().cursor(), 2);
    assert_eq!(session.engine().side_to_move(), Color::White);

    assert!(session.redo());
    assert_eq!(session.engine().history().cursor(), 4);
    assert!(!session.redo());
}

#[tokio::test]
async fn bot_playing_white_opens_the_game() {
    let mut session = Session::against_bot(Color::White, quick_bot(2));
    assert!(session.bot_to_move());
    assert!(!session.is_local_turn());
    assert!(matches!(session.bot_reply().await, Some(Ok(_))));
    assert!(session.is_local_turn());
}

#[test]
fn online_moves_are_sent_and_remote_moves_are_not_echoed() {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut session = Session::online(Color::White, "room-1".to_string(), tx);

    let opponent_move = WireMove::from(mv("e7e5"));
    assert_eq!(session.apply_remote(opponent_move), Err(MoveError::NotYourTurn));

    session.play(mv("e2e4")).unwrap();
    assert_eq!(
        rx.try_recv().unwrap(),
        ClientMessage::Move {
            room_id: "room-1".to_string(),
            mv: WireMove::from(mv("e2e4")),
        }
    );

    assert_eq!(session.play(mv("d2d4")), Err(MoveError::NotYourTurn));
    session.apply_remote(opponent_move).unwrap();
    assert!(rx.try_recv().is_err());
    assert!(session.is_local_turn());

    assert!(!session.undo());
    assert!(!session.redo());
    assert!(!session.reset());
    assert_eq!(session.engine().history().len(), 2);

    session.leave();
    assert_eq!(rx.try_recv().unwrap(), ClientMessage::LeaveGame);
}

#[test]
fn illegal_local_moves_are_not_sent() {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut session = Session::online(Color::White, "room-2".to_string(), tx);
    assert!(session.play(mv("e2e5")).is_err());
    assert!(rx.try_recv().is_err());
}

#[test]
fn black_seat_waits_for_white() {
    let (tx, _rx) = mpsc::unbounded_channel();
    let mut session = Session::online(Color::Black, "room-3".to_string(), tx);
    assert!(!session.is_local_turn());
    assert_eq!(session.play(mv("e7e5")), Err(MoveError::NotYourTurn));
    session.apply_remote(WireMove::from(mv("e2e4"))).unwrap();
    assert!(session.is_local_turn());
}

#[test]
fn out_of_range_remote_moves_are_rejected() {
    let (tx, _rx) = mpsc::unbounded_channel();
    let mut session = Session::online(Color::Black, "room-4".to_string(), tx);
    let bogus = WireMove { from_row: 6, from_col: 4, to_row: 9, to_col: 4 };
    assert_eq!(session.apply_remote(bogus), Err(MoveError::OutOfBounds));
}
