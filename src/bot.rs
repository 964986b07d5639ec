//////////////////////////
// bot.rs
//////////////////////////
//
// The random-move computer opponent.

use std::time::Duration;

use log::debug;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::config::BotConfig;
use crate::game::GameEngine;
use crate::types::{Color, MoveRequest};

/// Plays a uniformly random legal move.
pub struct BotPlayer {
    rng: StdRng,
    think_delay: Duration,
}

impl BotPlayer {
    pub fn new(config: &BotConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        BotPlayer {
            rng,
            think_delay: config.think_delay,
        }
    }

    /// `None` when `color` has no legal move left.
    pub fn choose_move(&mut self, engine: &GameEngine, color: Color) -> Option<MoveRequest> {
        let moves = engine.legal_moves(color);
        let choice = moves.choose(&mut self.rng).copied();
        debug!("bot picked {:?} out of {} moves", choice, moves.len());
        choice
    }

    /// Waits the configured delay, then picks a move.
    pub async fn think(&mut self, engine: &GameEngine, color: Color) -> Option<MoveRequest> {
        if !self.think_delay.is_zero() {
            tokio::time::sleep(self.think_delay).await;
        }
        self.choose_move(engine, color)
    }
}
