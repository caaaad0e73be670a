//! Application layer for the input client.
//!
//! Glues the translator from `rdp-input-core` to a protocol engine and a
//! transport, both of which are reached only through traits defined here:
//!
//! - [`engine_sink`] – `ProtocolEngine`, `OutputTransport`, and the
//!   `EngineSink` adapter that the translator writes into.
//! - [`events`] – the client event bus.
//! - [`input_surface`] – attach/detach gate in front of the translator.
//! - [`supervisor`] – connect with backoff, inbound loop, disconnect.

pub mod engine_sink;
pub mod events;
pub mod input_surface;
pub mod supervisor;

pub use engine_sink::{
    flush_engine_output, EngineError, EngineNotice, EngineSink, OutputTransport, ProtocolEngine,
    TransportError, TransportSlot,
};
pub use events::{ClientEvent, EventBus, EventKind, SubscriptionId};
pub use input_surface::InputSurface;
pub use supervisor::{
    ConnectError, ConnectionState, ConnectionSupervisor, Connector, SupervisorOptions,
    TransportLink,
};
