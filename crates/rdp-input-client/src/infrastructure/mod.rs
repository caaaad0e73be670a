//! Infrastructure layer: concrete implementations of the application traits.
//!
//! - [`ws_transport`] – `Connector` / `OutputTransport` over tokio-tungstenite.
//! - [`json_engine`] – `ProtocolEngine` that frames primitives as JSON lines.
//! - [`stdin_surface`] – reads input-surface events from a byte stream.

pub mod json_engine;
pub mod stdin_surface;
pub mod ws_transport;

pub use json_engine::JsonLineEngine;
pub use stdin_surface::{parse_surface_line, pump_surface_events};
pub use ws_transport::{WsConnector, WsTransport};
