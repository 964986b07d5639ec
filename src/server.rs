//////////////////////////
// server.rs
//////////////////////////

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use futures_util::{SinkExt, StreamExt};
use log::{debug, error, info, warn};
use tokio::sync::{mpsc, Mutex};
use warp::ws::{Message, WebSocket, Ws};
use warp::Filter;

use crate::config::ServerConfig;
use crate::relay::{RelayReply, RelayRequest, RelayServer};

pub type SharedRelay = Arc<Mutex<RelayServer>>;

async fn handle_connection(ws: WebSocket, relay: SharedRelay) {
    let (mut ws_tx, mut ws_rx) = ws.split();
    let (tx, mut rx) = mpsc::unbounded_channel::<RelayReply>();
    let conn = relay.lock().await.connect(tx);
    info!("New client connected: {}", conn);

    // Socket writes happen here so the relay lock is never held across I/O.
    let writer = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            let text = match serde_json::to_string(&msg) {
                Ok(t) => t,
                Err(e) => {
                    error!("could not encode {:?}: {}", msg, e);
                    continue;
                }
            };
            if ws_tx.send(Message::text(text)).await.is_err() {
                break;
            }
        }
        let _ = ws_tx.close().await;
    });

    while let Some(result) = ws_rx.next().await {
        let msg = match result {
            Ok(m) => m,
            Err(e) => {
                warn!("WebSocket error on {}: {}", conn, e);
                break;
            }
        };
        if msg.is_close() {
            break;
        }

        let text = match msg.to_str() {
            Ok(s) => s,
            Err(_) => continue,
        };
        let client_msg: RelayRequest = match serde_json::from_str(text) {
            Ok(c) => c,
            Err(e) => {
                debug!("ignoring message from {}: {}", conn, e);
                continue;
            }
        };

        relay.lock().await.handle(conn, client_msg);
    }

    info!("Client {} disconnected", conn);
    // Dropping the outbound sender lets the writer task finish on its own.
    relay.lock().await.disconnect(conn);
    let _ = writer.await;
}

/// The relay's only route: a WebSocket upgrade at `/`.
pub fn routes(
    relay: SharedRelay,
) -> impl Filter<Extract = (impl warp::Reply,), Error = warp::Rejection> + Clone {
    let relay = warp::any().map(move || relay.clone());
    warp::path::end()
        .and(warp::ws())
        .and(relay)
        .map(|ws: Ws, relay: SharedRelay| {
            ws.on_upgrade(move |socket| handle_connection(socket, relay))
        })
}

/// Binds the relay and hands back the real address plus the future that
/// serves it until `shutdown` resolves.
pub fn bind(
    config: &ServerConfig,
    relay: SharedRelay,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<(SocketAddr, impl Future<Output = ()> + 'static), warp::Error> {
    warp::serve(routes(relay)).try_bind_with_graceful_shutdown(config.addr, shutdown)
}

/// Runs the relay until Ctrl-C.
pub async fn start_server(config: &ServerConfig) -> Result<(), warp::Error> {
    let relay = SharedRelay::default();
    let (addr, server) = bind(config, relay, async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("could not listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    })?;

    info!("Relay started on ws://{}/", addr);
    server.await;
    info!("Relay stopped");
    Ok(())
}
