//////////////////////////
// lib.rs
//////////////////////////

pub mod board;
pub mod bot;
pub mod client;
pub mod config;
pub mod game;
pub mod history;
pub mod protocol;
pub mod relay;
pub mod rules;
pub mod server;
pub mod session;
pub mod types;

pub use board::Board;
pub use bot::BotPlayer;
pub use game::GameEngine;
pub use history::MoveHistory;
pub use relay::{ConnId, RelayReply, RelayRequest, RelayServer, Room};
pub use server::start_server;
pub use session::Session;
pub use types::*;
