use std::sync::Arc;

use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{Mutex, mpsc};
use tokio_tungstenite::accept_async;
use tracing::{debug, error, info, warn};
use tungstenite::Message;

use car_physics::Controls;

use crate::server::DriveServer;

/// Everything a client may send. Unknown or malformed messages are dropped.
#[derive(Debug, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ClientMessage {
    Input(Controls),
    Ping,
    Reset,
}

impl ClientMessage {
    pub fn from_json(txt: &str) -> Option<Self> {
        serde_json::from_str(txt).ok()
    }
}

pub async fn start_websocket_server(server: Arc<Mutex<DriveServer>>, bind_address: String) -> std::io::Result<()> {
    let listener = TcpListener::bind(&bind_address).await?;
    info!("websocket listening on ws://{bind_address}");

    loop {
        let (raw, peer) = match listener.accept().await {
            Ok(conn) => conn,
            Err(e) => {
                warn!("accept failed: {e}");
                continue;
            }
        };
        debug!(%peer, "tcp connection");
        tokio::spawn(handle_connection(Arc::clone(&server), raw));
    }
}

async fn handle_connection(server: Arc<Mutex<DriveServer>>, raw: TcpStream) {
    let ws = match accept_async(raw).await {
        Ok(ws) => ws,
        Err(e) => {
            warn!("websocket handshake failed: {e}");
            return;
        }
    };
    let (mut write, mut read) = ws.split();

    // -------------------------------
    // 1) outgoing channel + send loop
    // -------------------------------
    let (tx, mut rx) = mpsc::unbounded_channel::<String>();
    tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if write.send(Message::Text(msg)).await.is_err() {
                break;
            }
        }
    });

    // -------------------------------
    // 2) session + car (welcome goes out through tx)
    // -------------------------------
    let id = match server.lock().await.join(tx) {
        Ok(id) => id,
        Err(e) => {
            error!("could not spawn car: {e}");
            return;
        }
    };

    // -------------------------------
    // 3) receive loop
    // -------------------------------
    while let Some(msg) = read.next().await {
        let msg = match msg {
            Ok(m) => m,
            Err(_) => break,
        };
        if !msg.is_text() {
            continue;
        }
        let Ok(text) = msg.to_text() else { continue };

        let Some(parsed) = ClientMessage::from_json(text) else {
            debug!(%id, "ignoring message: {text}");
            continue;
        };

        let mut srv = server.lock().await;
        match parsed {
            ClientMessage::Input(controls) => srv.set_input(&id, controls),
            ClientMessage::Ping => srv.pong(&id),
            ClientMessage::Reset => {
                if let Err(e) = srv.reset(&id) {
                    error!(%id, "reset failed: {e}");
                }
            }
        }
    }

    server.lock().await.leave(&id);
}
