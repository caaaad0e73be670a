//! Adapter from the translator's [`InputSink`] to a remote-protocol engine.
//!
//! The engine (an RDP stack, or the JSON demo engine in this crate) encodes
//! input primitives into an internal output buffer.  Nothing reaches the
//! network until someone drains that buffer and hands it to a transport.
//! [`EngineSink`] does both halves:
//!
//! ```text
//! KeyTranslator ──write──▶ ProtocolEngine (buffer)
//!               ──flush──▶ output_data() → reset_output_data() → OutputTransport::send
//! ```
//!
//! The transport lives in a [`TransportSlot`] shared with the connection
//! supervisor, which installs it on connect and clears it on disconnect.
//! Output flushed while the slot is empty is discarded.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use rdp_input_core::{InputSink, LockState, SinkError};
use thiserror::Error;
use tracing::debug;

// ── Engine ────────────────────────────────────────────────────────────────────

/// Failure reported by the protocol engine.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// The engine could not encode an outbound primitive.
    #[error("engine rejected {primitive}: {reason}")]
    Encode {
        primitive: &'static str,
        reason: String,
    },
    /// Inbound data from the server could not be processed.
    #[error("failed to process inbound data: {0}")]
    Decode(String),
}

/// Something the engine learned from inbound data that the client must act on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineNotice {
    /// The server reported its real lock-indicator state.
    LockStateReport(LockState),
    /// A diagnostic message from the server side.
    Log(String),
}

/// The remote-protocol engine, seen from the input path.
///
/// Implementations buffer output internally and use interior mutability, so
/// the engine can be shared between the sink and the supervisor.
pub trait ProtocolEngine: Send + Sync {
    /// Queues the session-opening packet.
    fn write_first_packet(&self) -> Result<(), EngineError>;

    fn write_scancode_event(&self, code: u32) -> Result<(), EngineError>;

    fn write_unicode_event(&self, codepoint: u32, flags: u32) -> Result<(), EngineError>;

    fn sync_kbd_locks(&self, mask: u32) -> Result<(), EngineError>;

    /// Returns a copy of the pending output.  Empty when nothing is queued.
    fn output_data(&self) -> Vec<u8>;

    /// Discards the pending output.
    fn reset_output_data(&self);

    /// Feeds one inbound frame to the engine.
    fn process_input_data(&self, data: &[u8]) -> Result<Vec<EngineNotice>, EngineError>;
}

// ── Transport ─────────────────────────────────────────────────────────────────

/// Failure on the outbound side of a transport.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The transport could not be opened.
    #[error("failed to connect to {url}: {reason}")]
    Connect { url: String, reason: String },
    /// The transport has already been closed.
    #[error("transport is closed")]
    Closed,
    /// A frame could not be queued for sending.
    #[error("send failed: {0}")]
    Send(String),
}

/// Outbound half of an open connection.
pub trait OutputTransport: Send + Sync {
    /// Sends one binary frame.
    fn send(&self, data: Vec<u8>) -> Result<(), TransportError>;

    /// Closes the connection.  Safe to call more than once.
    fn close(&self);
}

/// Holder for the currently installed transport, if any.
#[derive(Default)]
pub struct TransportSlot {
    current: Mutex<Option<Arc<dyn OutputTransport>>>,
}

impl TransportSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs `transport`, replacing any previous one.
    pub fn install(&self, transport: Arc<dyn OutputTransport>) {
        *self.lock() = Some(transport);
    }

    /// Removes and returns the installed transport.
    pub fn take(&self) -> Option<Arc<dyn OutputTransport>> {
        self.lock().take()
    }

    pub fn current(&self) -> Option<Arc<dyn OutputTransport>> {
        self.lock().clone()
    }

    pub fn is_installed(&self) -> bool {
        self.lock().is_some()
    }

    fn lock(&self) -> MutexGuard<'_, Option<Arc<dyn OutputTransport>>> {
        self.current.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Drains the engine's pending output into the installed transport.
///
/// A no-op when nothing is pending.  The engine buffer is reset before the
/// send, so a failed send does not resend stale bytes on the next flush.
pub fn flush_engine_output(
    engine: &dyn ProtocolEngine,
    slot: &TransportSlot,
) -> Result<(), TransportError> {
    let data = engine.output_data();
    if data.is_empty() {
        return Ok(());
    }
    engine.reset_output_data();

    match slot.current() {
        Some(transport) => transport.send(data),
        None => {
            debug!("discarding {} byte(s) of output: no transport", data.len());
            Ok(())
        }
    }
}

// ── Sink adapter ──────────────────────────────────────────────────────────────

/// [`InputSink`] that writes into a [`ProtocolEngine`] and flushes to the
/// transport in a [`TransportSlot`].
pub struct EngineSink {
    engine: Arc<dyn ProtocolEngine>,
    slot: Arc<TransportSlot>,
}

impl EngineSink {
    pub fn new(engine: Arc<dyn ProtocolEngine>, slot: Arc<TransportSlot>) -> Self {
        Self { engine, slot }
    }
}

impl InputSink for EngineSink {
    fn write_scancode_event(&self, code: u32) -> Result<(), SinkError> {
        self.engine
            .write_scancode_event(code)
            .map_err(|e| SinkError::Write(e.to_string()))
    }

    fn write_unicode_event(&self, codepoint: u32, flags: u32) -> Result<(), SinkError> {
        self.engine
            .write_unicode_event(codepoint, flags)
            .map_err(|e| SinkError::Write(e.to_string()))
    }

    fn sync_kbd_locks(&self, mask: u32) -> Result<(), SinkError> {
        self.engine
            .sync_kbd_locks(mask)
            .map_err(|e| SinkError::Write(e.to_string()))
    }

    fn flush_output(&self) -> Result<(), SinkError> {
        flush_engine_output(self.engine.as_ref(), &self.slot)
            .map_err(|e| SinkError::Flush(e.to_string()))
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
