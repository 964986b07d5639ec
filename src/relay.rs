//////////////////////////
// relay.rs
//////////////////////////
//
// Matchmaking and move forwarding. Pure in-memory state; the WebSocket side
// lives in server.rs and talks to this through `ConnId`s and one outbound
// channel per connection.

use std::collections::{HashMap, VecDeque};
use std::fmt;

use log::{debug, info, warn};
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::protocol::{ClientMessage, RawMove, ServerMessage};
use crate::types::Color;

/// What the relay reads from a connection.
pub type RelayRequest = ClientMessage<RawMove>;
/// What the relay writes to a connection.
pub type RelayReply = ServerMessage<RawMove>;

pub type Outbound = mpsc::UnboundedSender<RelayReply>;

/// Opaque connection handle, assigned at connect time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnId(u64);

impl fmt::Display for ConnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Room {
    pub id: String,
    pub white: ConnId,
    pub black: ConnId,
}

impl Room {
    pub fn contains(&self, conn: ConnId) -> bool {
        self.white == conn || self.black == conn
    }

    pub fn opponent_of(&self, conn: ConnId) -> Option<ConnId> {
        if conn == self.white {
            Some(self.black)
        } else if conn == self.black {
            Some(self.white)
        } else {
            None
        }
    }

    pub fn color_of(&self, conn: ConnId) -> Option<Color> {
        if conn == self.white {
            Some(Color::White)
        } else if conn == self.black {
            Some(Color::Black)
        } else {
            None
        }
    }
}

#[derive(Default)]
pub struct RelayServer {
    next_conn: u64,
    connections: HashMap<ConnId, Outbound>,
    waiting: VecDeque<ConnId>,
    rooms: HashMap<String, Room>,
}

impl RelayServer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn connect(&mut self, outbound: Outbound) -> ConnId {
        self.next_conn += 1;
        let conn = ConnId(self.next_conn);
        self.connections.insert(conn, outbound);
        debug!("{} connected", conn);
        conn
    }

    /// Transport closed: same as leaving, then forget the connection.
    pub fn disconnect(&mut self, conn: ConnId) {
        self.leave(conn);
        self.connections.remove(&conn);
        debug!("{} disconnected", conn);
    }

    pub fn handle(&mut self, conn: ConnId, msg: RelayRequest) {
        match msg {
            ClientMessage::FindGame => self.find_game(conn),
            ClientMessage::Move { room_id, mv } => {
                self.relay_move(conn, &room_id, mv);
            }
            ClientMessage::LeaveGame => {
                self.leave(conn);
            }
        }
    }

    /// Pairs `conn` with the longest-waiting connection, or queues it.
    pub fn find_game(&mut self, conn: ConnId) {
        if self.waiting.contains(&conn) {
            self.send(conn, ServerMessage::Waiting);
            return;
        }
        if self.room_of(conn).is_some() {
            self.leave(conn);
        }

        let Some(opponent) = self.pop_waiting() else {
            self.waiting.push_back(conn);
            self.send(conn, ServerMessage::Waiting);
            debug!("{} is waiting for an opponent", conn);
            return;
        };

        let room = Room {
            id: Uuid::new_v4().to_string(),
            white: opponent,
            black: conn,
        };
        info!("room {} created: {} (white) vs {} (black)", room.id, room.white, room.black);

        self.send(
            room.white,
            ServerMessage::GameStart {
                color: Color::White,
                room_id: room.id.clone(),
            },
        );
        self.send(
            room.black,
            ServerMessage::GameStart {
                color: Color::Black,
                room_id: room.id.clone(),
            },
        );
        self.rooms.insert(room.id.clone(), room);
    }

    /// Forwards `mv` as-is to the other seat of `room_id`. Unknown rooms and
    /// strangers are dropped silently. Returns whether the move went out.
    pub fn relay_move(&mut self, conn: ConnId, room_id: &str, mv: RawMove) -> bool {
        let Some(room) = self.rooms.get(room_id) else {
            debug!("{} sent a move for unknown room {}", conn, room_id);
            return false;
        };
        let Some(opponent) = room.opponent_of(conn) else {
            warn!("{} is not seated in room {}", conn, room_id);
            return false;
        };
        if let Some(seat) = room.color_of(conn) {
            debug!("{} ({}) moved in room {}", conn, seat, room_id);
        }
        self.send(opponent, ServerMessage::OpponentMove { mv })
    }

    /// Drops `conn` from the queue and tears down its room. Returns the
    /// opponent if it was told about it.
    pub fn leave(&mut self, conn: ConnId) -> Option<ConnId> {
        self.waiting.retain(|c| *c != conn);

        let room_id = self.room_of(conn)?.id.clone();
        let room = self.rooms.remove(&room_id)?;
        info!("room {} closed, {} left", room.id, conn);

        let opponent = room.opponent_of(conn)?;
        if self.send(opponent, ServerMessage::OpponentLeft) {
            Some(opponent)
        } else {
            None
        }
    }

    pub fn room_of(&self, conn: ConnId) -> Option<&Room> {
        self.rooms.values().find(|room| room.contains(conn))
    }

    pub fn room(&self, room_id: &str) -> Option<&Room> {
        self.rooms.get(room_id)
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    pub fn waiting_count(&self) -> usize {
        self.waiting.len()
    }

    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    // Connections whose transport already closed are skipped.
    fn pop_waiting(&mut self) -> Option<ConnId> {
        while let Some(conn) = self.waiting.pop_front() {
            if self.is_open(conn) {
                return Some(conn);
            }
            debug!("skipping closed waiting connection {}", conn);
        }
        None
    }

    fn is_open(&self, conn: ConnId) -> bool {
        self.connections.get(&conn).is_some_and(|tx| !tx.is_closed())
    }

    fn send(&self, conn: ConnId, msg: RelayReply) -> bool {
        match self.connections.get(&conn) {
            Some(tx) if !tx.is_closed() => tx.send(msg).is_ok(),
            _ => {
                debug!("dropping {:?} for closed {}", msg, conn);
                false
            }
        }
    }
}
