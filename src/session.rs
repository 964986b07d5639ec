//////////////////////////
// session.rs
//////////////////////////
//
// A game plus whoever sits on the other side of the board. This is where
// the post-move hook lives: a bot gets asked for a reply, a remote peer
// gets the move through the relay.

use log::{debug, warn};
use tokio::sync::mpsc;

use crate::bot::BotPlayer;
use crate::game::GameEngine;
use crate::protocol::{ClientMessage, WireMove};
use crate::types::*;

pub struct RemoteSeat {
    pub seat: Color,
    pub room_id: String,
    outbox: mpsc::UnboundedSender<ClientMessage>,
}

pub enum Opponent {
    /// Both sides are played from this terminal.
    Local,
    Bot { color: Color, player: BotPlayer },
    Remote(RemoteSeat),
}

pub struct Session {
    engine: GameEngine,
    opponent: Opponent,
}

impl Session {
    pub fn local() -> Self {
        Session {
            engine: GameEngine::new(),
            opponent: Opponent::Local,
        }
    }

    pub fn against_bot(bot_color: Color, player: BotPlayer) -> Self {
        Session {
            engine: GameEngine::new(),
            opponent: Opponent::Bot {
                color: bot_color,
                player,
            },
        }
    }

    pub fn online(seat: Color, room_id: String, outbox: mpsc::UnboundedSender<ClientMessage>) -> Self {
        Session {
            engine: GameEngine::new(),
            opponent: Opponent::Remote(RemoteSeat {
                seat,
                room_id,
                outbox,
            }),
        }
    }

    pub fn engine(&self) -> &GameEngine {
        &self.engine
    }

    /// Whether the human(s) at this terminal are the ones to move.
    pub fn is_local_turn(&self) -> bool {
        let side = self.engine.side_to_move();
        match &self.opponent {
            Opponent::Local => true,
            Opponent::Bot { color, .. } => side != *color,
            Opponent::Remote(remote) => side == remote.seat,
        }
    }

    /// A move entered at this terminal.
    pub fn play(&mut self, mv: MoveRequest) -> Result<GameStatus, MoveError> {
        if !self.is_local_turn() {
            return Err(MoveError::NotYourTurn);
        }
        let status = self.engine.apply_request(mv)?;

        if let Opponent::Remote(remote) = &self.opponent {
            let msg = ClientMessage::Move {
                room_id: remote.room_id.clone(),
                mv: WireMove::from(mv),
            };
            if remote.outbox.send(msg).is_err() {
                warn!("relay connection is gone, {} was not sent", mv);
            }
        }
        Ok(status)
    }

    /// A move that arrived from the relay. Applied through the same entry
    /// point as local input, and never echoed back.
    pub fn apply_remote(&mut self, mv: WireMove) -> Result<GameStatus, MoveError> {
        match &self.opponent {
            Opponent::Remote(_) if !self.is_local_turn() => {}
            _ => return Err(MoveError::NotYourTurn),
        }
        debug!("opponent played {:?}", mv);
        self.engine.apply_request(MoveRequest::from(mv))
    }

    pub fn bot_to_move(&self) -> bool {
        matches!(self.opponent, Opponent::Bot { color, .. }
            if color == self.engine.side_to_move() && !self.engine.status().is_over())
    }

    /// Lets the bot answer after its delay. `None` when it is not the bot's
    /// turn or it has nothing to play.
    pub async fn bot_reply(&mut self) -> Option<Result<GameStatus, MoveError>> {
        if !self.bot_to_move() {
            return None;
        }
        let Opponent::Bot { color, player } = &mut self.opponent else {
            return None;
        };
        let mv = player.think(&self.engine, *color).await?;
        Some(self.engine.apply_request(mv))
    }

    /// Takes back moves. Against the bot this rewinds to the human's turn;
    /// online games cannot be rewound.
    pub fn undo(&mut self) -> bool {
        match &self.opponent {
            Opponent::Remote(_) => false,
            Opponent::Local => self.engine.undo(),
            Opponent::Bot { color, .. } => {
                let bot = *color;
                let mut undone = false;
                while self.engine.undo() {
                    undone = true;
                    if self.engine.side_to_move() != bot {
                        break;
                    }
                }
                undone
            }
        }
    }

    pub fn redo(&mut self) -> bool {
        match &self.opponent {
            Opponent::Remote(_) => false,
            Opponent::Local => self.engine.redo(),
            Opponent::Bot { color, .. } => {
                let bot = *color;
                let mut redone = false;
                while self.engine.redo() {
                    redone = true;
                    if self.engine.side_to_move() != bot {
                        break;
                    }
                }
                redone
            }
        }
    }

    /// New game. Not available online, where it would desync the peers.
    pub fn reset(&mut self) -> bool {
        if matches!(self.opponent, Opponent::Remote(_)) {
            return false;
        }
        self.engine.reset();
        true
    }

    /// Tells the relay we are leaving. No-op outside online games.
    pub fn leave(&self) {
        if let Opponent::Remote(remote) = &self.opponent {
            let _ = remote.outbox.send(ClientMessage::LeaveGame);
        }
    }
}
