//////////////////////////
// protocol.rs
//////////////////////////
//
// Client <-> relay messages. One JSON object per WebSocket text frame,
// discriminated by its "type" field.
//
// Both message enums are generic over the move payload. Players speak in
// `WireMove`s; the relay reads and writes `RawMove`s so that whatever a
// client puts in "move" reaches the other seat untouched.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::{Color, MoveRequest, Square};

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct WireMove {
    pub from_row: usize,
    pub from_col: usize,
    pub to_row: usize,
    pub to_col: usize,
}

impl From<MoveRequest> for WireMove {
    fn from(mv: MoveRequest) -> Self {
        WireMove {
            from_row: mv.from.row,
            from_col: mv.from.col,
            to_row: mv.to.row,
            to_col: mv.to.col,
        }
    }
}

impl From<WireMove> for MoveRequest {
    fn from(mv: WireMove) -> Self {
        MoveRequest::new(
            Square::new(mv.from_row, mv.from_col),
            Square::new(mv.to_row, mv.to_col),
        )
    }
}

/// A move record as the relay sees it: opaque JSON.
pub type RawMove = Value;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage<M = WireMove> {
    FindGame,
    Move {
        #[serde(rename = "roomId")]
        room_id: String,
        #[serde(rename = "move")]
        mv: M,
    },
    LeaveGame,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage<M = WireMove> {
    Waiting,
    GameStart {
        color: Color,
        #[serde(rename = "roomId")]
        room_id: String,
    },
    OpponentMove {
        #[serde(rename = "move")]
        mv: M,
    },
    OpponentLeft,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn client_messages_use_the_browser_field_names() {
        let msg: ClientMessage = serde_json::from_value(json!({
            "type": "move",
            "roomId": "r1",
            "move": { "fromRow": 6, "fromCol": 4, "toRow": 4, "toCol": 4 }
        }))
        .unwrap();
        assert_eq!(
            msg,
            ClientMessage::Move {
                room_id: "r1".to_string(),
                mv: WireMove { from_row: 6, from_col: 4, to_row: 4, to_col: 4 },
            }
        );

        let find: ClientMessage = serde_json::from_str(r#"{"type":"find_game"}"#).unwrap();
        assert_eq!(find, ClientMessage::FindGame);
        let leave: ClientMessage = serde_json::from_str(r#"{"type":"leave_game"}"#).unwrap();
        assert_eq!(leave, ClientMessage::LeaveGame);
    }

    #[test]
    fn server_messages_serialize_with_type_tag() {
        let start: ServerMessage = ServerMessage::GameStart {
            color: Color::White,
            room_id: "abc".to_string(),
        };
        assert_eq!(
            serde_json::to_value(&start).unwrap(),
            json!({ "type": "game_start", "color": "white", "roomId": "abc" })
        );
        assert_eq!(
            serde_json::to_value(ServerMessage::<WireMove>::OpponentLeft).unwrap(),
            json!({ "type": "opponent_left" })
        );
    }

    #[test]
    fn unknown_or_malformed_messages_fail_to_parse() {
        assert!(serde_json::from_str::<ClientMessage>(r#"{"type":"chat"}"#).is_err());
        assert!(serde_json::from_str::<ClientMessage>(r#"{"type":"move","roomId":"x"}"#).is_err());
        assert!(serde_json::from_str::<ClientMessage>("not json").is_err());
    }

    #[test]
    fn raw_moves_keep_every_field() {
        let text = r#"{"type":"move","roomId":"r1","move":{"fromRow":6,"fromCol":4,"toRow":4,"toCol":4,"piece":"P"}}"#;
        let msg: ClientMessage<RawMove> = serde_json::from_str(text).unwrap();
        let ClientMessage::Move { mv, .. } = msg else {
            panic!("expected a move");
        };
        let out: ServerMessage<RawMove> = ServerMessage::OpponentMove { mv: mv.clone() };
        assert_eq!(
            serde_json::to_value(&out).unwrap(),
            json!({ "type": "opponent_move", "move": mv })
        );
        assert_eq!(mv["piece"], "P");
    }

    #[test]
    fn wire_moves_map_onto_squares() {
        let mv: MoveRequest = "e2e4".parse().unwrap();
        let wire = WireMove::from(mv);
        assert_eq!(wire, WireMove { from_row: 6, from_col: 4, to_row: 4, to_col: 4 });
        assert_eq!(MoveRequest::from(wire), mv);
    }
}
