//! WebSocket transport built on tokio-tungstenite.
//!
//! A successful [`WsConnector::connect`] splits the socket and spawns two
//! tasks:
//!
//! - **writer** – drains a command channel and writes binary frames (or a
//!   close frame) to the socket.
//! - **reader** – forwards every data frame from the server into the
//!   inbound channel of the returned [`TransportLink`].  When the server
//!   closes the socket, the reader ends and the inbound channel closes with
//!   it, which is how the supervisor learns about remote disconnects.
//!
//! Sending never blocks: [`WsTransport::send`] pushes onto an unbounded
//! channel, so the translator can call it from synchronous key handlers.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_tungstenite::{connect_async, tungstenite::Message as WsMessage};
use tracing::{debug, info, warn};

use crate::application::{Connector, OutputTransport, TransportError, TransportLink};

/// Inbound frames buffered before the reader applies backpressure.
pub const DEFAULT_INBOUND_CAPACITY: usize = 128;

enum WsCommand {
    Send(Vec<u8>),
    Close,
}

/// Opens WebSocket connections.
#[derive(Debug, Clone)]
pub struct WsConnector {
    inbound_capacity: usize,
}

impl Default for WsConnector {
    fn default() -> Self {
        Self {
            inbound_capacity: DEFAULT_INBOUND_CAPACITY,
        }
    }
}

impl WsConnector {
    pub fn with_inbound_capacity(inbound_capacity: usize) -> Self {
        Self {
            inbound_capacity: inbound_capacity.max(1),
        }
    }
}

#[async_trait]
impl Connector for WsConnector {
    async fn connect(&self, url: &str) -> Result<TransportLink, TransportError> {
        let (stream, _response) =
            connect_async(url)
                .await
                .map_err(|e| TransportError::Connect {
                    url: url.to_string(),
                    reason: e.to_string(),
                })?;
        info!("WebSocket connection established: {url}");

        let (mut ws_tx, mut ws_rx) = stream.split();
        let (command_tx, mut command_rx) = mpsc::unbounded_channel::<WsCommand>();
        let (inbound_tx, inbound_rx) = mpsc::channel::<Vec<u8>>(self.inbound_capacity);

        // ── Writer ────────────────────────────────────────────────────────────
        let writer_url = url.to_string();
        tokio::spawn(async move {
            while let Some(command) = command_rx.recv().await {
                match command {
                    WsCommand::Send(data) => {
                        if let Err(e) = ws_tx.send(WsMessage::Binary(data)).await {
                            warn!("{writer_url}: WebSocket send failed: {e}");
                            break;
                        }
                    }
                    WsCommand::Close => {
                        if let Err(e) = ws_tx.close().await {
                            debug!("{writer_url}: close handshake failed: {e}");
                        }
                        break;
                    }
                }
            }
            debug!("{writer_url}: writer task finished");
        });

        // ── Reader ────────────────────────────────────────────────────────────
        let reader_url = url.to_string();
        tokio::spawn(async move {
            loop {
                let data = match ws_rx.next().await {
                    Some(Ok(WsMessage::Binary(data))) => data,
                    Some(Ok(WsMessage::Text(text))) => text.into_bytes(),
                    Some(Ok(WsMessage::Close(_))) | None => {
                        debug!("{reader_url}: server closed the WebSocket");
                        break;
                    }
                    // Ping/pong are answered by tungstenite itself.
                    Some(Ok(_)) => continue,
                    Some(Err(e)) => {
                        warn!("{reader_url}: WebSocket read error: {e}");
                        break;
                    }
                };
                if inbound_tx.send(data).await.is_err() {
                    debug!("{reader_url}: inbound receiver dropped; stopping reader");
                    break;
                }
            }
        });

        Ok(TransportLink {
            transport: Arc::new(WsTransport {
                commands: command_tx,
                open: AtomicBool::new(true),
            }),
            inbound: inbound_rx,
        })
    }
}

/// Outbound half of a WebSocket connection.
pub struct WsTransport {
    commands: mpsc::UnboundedSender<WsCommand>,
    open: AtomicBool,
}

impl OutputTransport for WsTransport {
    fn send(&self, data: Vec<u8>) -> Result<(), TransportError> {
        if !self.open.load(Ordering::SeqCst) {
            return Err(TransportError::Closed);
        }
        self.commands
            .send(WsCommand::Send(data))
            .map_err(|_| TransportError::Closed)
    }

    fn close(&self) {
        if self.open.swap(false, Ordering::SeqCst) {
            let _ = self.commands.send(WsCommand::Close);
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
