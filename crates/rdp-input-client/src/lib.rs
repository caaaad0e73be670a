//! rdp-input-client library crate.
//!
//! Everything between the keyboard translator and the network: the adapter
//! that feeds translated primitives into a remote-protocol engine, the
//! connection supervisor with its reconnect backoff, the client event bus,
//! and a WebSocket transport.
//!
//! # Architecture (clean architecture)
//!
//! ```text
//! Input surface (JSON events)
//!         ↓
//! [rdp-input-core]  KeyTranslator → InputSink
//!         ↓
//! [rdp-input-client]
//!   ├── domain/           ClientConfig (TOML)
//!   ├── application/
//!   │     ├── engine_sink     InputSink over a ProtocolEngine + transport slot
//!   │     ├── events          Connected / Disconnected / Error / Log fan-out
//!   │     ├── input_surface   attach / detach / dispatch
//!   │     └── supervisor      connect, backoff, inbound loop, disconnect
//!   └── infrastructure/
//!         ├── ws_transport    tokio-tungstenite client
//!         ├── json_engine     line-oriented demo engine
//!         └── stdin_surface   newline-delimited JSON event reader
//!         ↓
//! Remote host
//! ```
//!
//! # Layer rules
//!
//! - `domain` has no I/O beyond reading and writing its own config file.
//! - `application` depends on `domain` and `rdp-input-core`; it talks to the
//!   engine and the network only through traits.
//! - `infrastructure` implements those traits with `tokio` and `tungstenite`.

/// Domain layer: configuration.
pub mod domain;

/// Application layer: sink adapter, event bus, input surface, supervisor.
pub mod application;

/// Infrastructure layer: WebSocket transport, demo engine, stdin reader.
pub mod infrastructure;
