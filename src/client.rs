//////////////////////////
// client.rs
//////////////////////////
//
// WebSocket client side of the relay protocol, used by online play.

use futures_util::{SinkExt, StreamExt};
use log::{debug, error, warn};
use thiserror::Error;
use tokio::sync::mpsc;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::{self, Message};

use crate::config::ClientConfig;
use crate::protocol::{ClientMessage, ServerMessage};

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("could not connect to {url}: {source}")]
    Connect {
        url: String,
        #[source]
        source: tungstenite::Error,
    },
}

/// A live connection to the relay. Outgoing messages are fire-and-forget;
/// `recv` returning `None` means the connection is gone.
pub struct RelayConnection {
    outgoing: mpsc::UnboundedSender<ClientMessage>,
    incoming: mpsc::UnboundedReceiver<ServerMessage>,
}

impl RelayConnection {
    pub fn sender(&self) -> mpsc::UnboundedSender<ClientMessage> {
        self.outgoing.clone()
    }

    pub fn send(&self, msg: ClientMessage) -> bool {
        self.outgoing.send(msg).is_ok()
    }

    pub async fn recv(&mut self) -> Option<ServerMessage> {
        self.incoming.recv().await
    }
}

pub async fn connect(config: &ClientConfig) -> Result<RelayConnection, ClientError> {
    let (stream, _) = connect_async(config.url.as_str())
        .await
        .map_err(|source| ClientError::Connect {
            url: config.url.clone(),
            source,
        })?;
    let (mut sink, mut source) = stream.split();

    let (out_tx, mut out_rx) = mpsc::unbounded_channel::<ClientMessage>();
    let (in_tx, in_rx) = mpsc::unbounded_channel::<ServerMessage>();

    tokio::spawn(async move {
        while let Some(msg) = out_rx.recv().await {
            let text = match serde_json::to_string(&msg) {
                Ok(t) => t,
                Err(e) => {
                    error!("could not encode {:?}: {}", msg, e);
                    continue;
                }
            };
            if let Err(e) = sink.send(Message::Text(text)).await {
                warn!("relay write failed: {}", e);
                break;
            }
        }
        let _ = sink.close().await;
    });

    tokio::spawn(async move {
        while let Some(frame) = source.next().await {
            let frame = match frame {
                Ok(f) => f,
                Err(e) => {
                    warn!("relay read failed: {}", e);
                    break;
                }
            };
            match frame {
                Message::Text(text) => match serde_json::from_str::<ServerMessage>(&text) {
                    Ok(msg) => {
                        if in_tx.send(msg).is_err() {
                            break;
                        }
                    }
                    Err(e) => debug!("ignoring relay message {:?}: {}", text, e),
                },
                Message::Close(_) => break,
                _ => {}
            }
        }
        debug!("relay connection closed");
    });

    Ok(RelayConnection {
        outgoing: out_tx,
        incoming: in_rx,
    })
}
