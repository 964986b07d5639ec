//////////////////////////
// config.rs
//////////////////////////

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_BOT_DELAY_MS: u64 = 500;

/// Where the relay listens.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServerConfig {
    pub addr: SocketAddr,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), DEFAULT_PORT),
        }
    }
}

impl ServerConfig {
    pub fn new(host: IpAddr, port: u16) -> Self {
        ServerConfig {
            addr: SocketAddr::new(host, port),
        }
    }
}

/// Where an online client connects to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientConfig {
    pub url: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            url: format!("ws://localhost:{}/", DEFAULT_PORT),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BotConfig {
    /// Cosmetic pause before the bot answers.
    pub think_delay: Duration,
    /// Fixed RNG seed, for reproducible games.
    pub seed: Option<u64>,
}

impl Default for BotConfig {
    fn default() -> Self {
        BotConfig {
            think_delay: Duration::from_millis(DEFAULT_BOT_DELAY_MS),
            seed: None,
        }
    }
}
