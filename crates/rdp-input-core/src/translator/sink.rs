//! The output side of the translator.
//!
//! The translator does not know how key events are encoded on the wire.  It
//! hands primitive events to an [`InputSink`], which is normally an adapter
//! over the remote-protocol engine.  Tests plug in a recording sink instead.

use thiserror::Error;

/// Failure while handing an event to the sink.
///
/// Sink failures never roll back translator state: the local state mirrors
/// the physical keyboard whether or not the event reached the host.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SinkError {
    /// The protocol engine rejected the event.
    #[error("sink write failed: {0}")]
    Write(String),
    /// Pending output could not be handed to the transport.
    #[error("output flush failed: {0}")]
    Flush(String),
}

/// Consumer of translated keyboard primitives.
///
/// Implementations use interior mutability so a single sink can be shared
/// between the translator and whatever owns the transport.
pub trait InputSink: Send + Sync {
    /// Queues a scancode event.  `code` already carries the release and
    /// extended flag bits.
    fn write_scancode_event(&self, code: u32) -> Result<(), SinkError>;

    /// Queues a unicode event; `flags` is `0` for press or `0x8000` for release.
    fn write_unicode_event(&self, codepoint: u32, flags: u32) -> Result<(), SinkError>;

    /// Queues a lock-indicator synchronization with the given bitmask.
    fn sync_kbd_locks(&self, mask: u32) -> Result<(), SinkError>;

    /// Sends anything queued.  Must be a no-op when nothing is pending.
    fn flush_output(&self) -> Result<(), SinkError>;
}
