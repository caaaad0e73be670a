//! Recording sink for unit and integration tests.
//!
//! # Why a recording sink?
//!
//! The real sink feeds a protocol engine whose output is opaque bytes.  The
//! `RecordingSink` instead remembers every call in order, so a test can assert
//! exactly which primitives were emitted and that each write was followed by
//! a flush.
//!
//! ```ignore
//! let sink = Arc::new(RecordingSink::new());
//! let mut translator = KeyTranslator::new(sink.clone());
//! translator.key_down("KeyA", Modifiers::NONE);
//! assert_eq!(sink.scancodes(), vec![0x1E]);
//! ```
//!
//! # Failure injection
//!
//! [`RecordingSink::set_failing`] makes every write return
//! [`SinkError::Write`] (the call is still recorded), which exercises the
//! translator's log-and-continue path.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use super::sink::{InputSink, SinkError};
use crate::keymap::KEY_RELEASE;

/// One call received by the sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkCall {
    Scancode(u32),
    Unicode { codepoint: u32, flags: u32 },
    SyncLocks(u32),
    Flush,
}

/// A sink that records every call without sending anything.
#[derive(Debug, Default)]
pub struct RecordingSink {
    calls: Mutex<Vec<SinkCall>>,
    failing: AtomicBool,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// When `true`, writes fail after being recorded.  Flushes always succeed.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Every recorded call, in order.
    pub fn calls(&self) -> Vec<SinkCall> {
        self.lock().clone()
    }

    /// Only the scancode event values, in order.
    pub fn scancodes(&self) -> Vec<u32> {
        self.lock()
            .iter()
            .filter_map(|c| match c {
                SinkCall::Scancode(v) => Some(*v),
                _ => None,
            })
            .collect()
    }

    /// Scancode events without the release bit.
    pub fn presses(&self) -> Vec<u32> {
        self.scancodes()
            .into_iter()
            .filter(|v| v & KEY_RELEASE == 0)
            .collect()
    }

    /// Scancode events with the release bit.
    pub fn releases(&self) -> Vec<u32> {
        self.scancodes()
            .into_iter()
            .filter(|v| v & KEY_RELEASE != 0)
            .collect()
    }

    /// Only the `(codepoint, flags)` pairs of unicode events, in order.
    pub fn unicode_events(&self) -> Vec<(u32, u32)> {
        self.lock()
            .iter()
            .filter_map(|c| match c {
                SinkCall::Unicode { codepoint, flags } => Some((*codepoint, *flags)),
                _ => None,
            })
            .collect()
    }

    /// Only the lock-sync masks, in order.
    pub fn lock_syncs(&self) -> Vec<u32> {
        self.lock()
            .iter()
            .filter_map(|c| match c {
                SinkCall::SyncLocks(m) => Some(*m),
                _ => None,
            })
            .collect()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<SinkCall>> {
        self.calls
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn record_write(&self, call: SinkCall) -> Result<(), SinkError> {
        self.lock().push(call);
        if self.failing.load(Ordering::SeqCst) {
            return Err(SinkError::Write("injected failure".into()));
        }
        Ok(())
    }
}

impl InputSink for RecordingSink {
    fn write_scancode_event(&self, code: u32) -> Result<(), SinkError> {
        self.record_write(SinkCall::Scancode(code))
    }

    fn write_unicode_event(&self, codepoint: u32, flags: u32) -> Result<(), SinkError> {
        self.record_write(SinkCall::Unicode { codepoint, flags })
    }

    fn sync_kbd_locks(&self, mask: u32) -> Result<(), SinkError> {
        self.record_write(SinkCall::SyncLocks(mask))
    }

    fn flush_output(&self) -> Result<(), SinkError> {
        self.lock().push(SinkCall::Flush);
        Ok(())
    }
}
