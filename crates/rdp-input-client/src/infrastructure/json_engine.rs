//! A line-oriented stand-in for a real remote-protocol engine.
//!
//! Each outbound primitive becomes one JSON object followed by `\n`:
//!
//! ```text
//! {"type":"hello","keyboard_layout":1033}
//! {"type":"scancode","code":30}
//! {"type":"unicode","codepoint":8364,"flags":0}
//! {"type":"sync_locks","mask":4}
//! ```
//!
//! Inbound frames carry one or more newline-separated objects:
//!
//! ```text
//! {"type":"lock_state","mask":2}
//! {"type":"log","message":"session ready"}
//! {"type":"ping"}
//! ```
//!
//! A `ping` queues a `pong`.  Malformed lines are logged and skipped; a
//! frame in which no line decodes is an error.  This is enough to drive the whole input path
//! against a simple WebSocket gateway without an RDP stack.

use std::sync::{Mutex, MutexGuard, PoisonError};

use rdp_input_core::{KeyboardLayout, LockState};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::application::{EngineError, EngineNotice, ProtocolEngine};

/// One outbound line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutboundRecord {
    Hello { keyboard_layout: u32 },
    Scancode { code: u32 },
    Unicode { codepoint: u32, flags: u32 },
    SyncLocks { mask: u32 },
    Pong,
}

/// One inbound line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InboundRecord {
    LockState { mask: u32 },
    Log { message: String },
    Ping,
}

pub struct JsonLineEngine {
    layout: KeyboardLayout,
    output: Mutex<Vec<u8>>,
}

impl JsonLineEngine {
    pub fn new(layout: KeyboardLayout) -> Self {
        Self {
            layout,
            output: Mutex::new(Vec::new()),
        }
    }

    fn append(&self, primitive: &'static str, record: &OutboundRecord) -> Result<(), EngineError> {
        let mut line = serde_json::to_vec(record).map_err(|e| EngineError::Encode {
            primitive,
            reason: e.to_string(),
        })?;
        line.push(b'\n');
        self.output().extend_from_slice(&line);
        Ok(())
    }

    fn output(&self) -> MutexGuard<'_, Vec<u8>> {
        self.output.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl ProtocolEngine for JsonLineEngine {
    fn write_first_packet(&self) -> Result<(), EngineError> {
        self.append(
            "first packet",
            &OutboundRecord::Hello {
                keyboard_layout: self.layout.lcid(),
            },
        )
    }

    fn write_scancode_event(&self, code: u32) -> Result<(), EngineError> {
        self.append("scancode", &OutboundRecord::Scancode { code })
    }

    fn write_unicode_event(&self, codepoint: u32, flags: u32) -> Result<(), EngineError> {
        self.append("unicode", &OutboundRecord::Unicode { codepoint, flags })
    }

    fn sync_kbd_locks(&self, mask: u32) -> Result<(), EngineError> {
        self.append("lock sync", &OutboundRecord::SyncLocks { mask })
    }

    fn output_data(&self) -> Vec<u8> {
        self.output().clone()
    }

    fn reset_output_data(&self) {
        self.output().clear();
    }

    fn process_input_data(&self, data: &[u8]) -> Result<Vec<EngineNotice>, EngineError> {
        let text = std::str::from_utf8(data).map_err(|e| EngineError::Decode(e.to_string()))?;

        // Decode every line before acting on any of them; a bad line is
        // skipped without discarding its neighbours.
        let mut records = Vec::new();
        let mut first_error = None;
        for (index, line) in text.lines().map(str::trim).enumerate() {
            if line.is_empty() {
                continue;
            }
            match serde_json::from_str::<InboundRecord>(line) {
                Ok(record) => records.push(record),
                Err(e) => {
                    warn!("skipping malformed inbound line {}: {e}", index + 1);
                    first_error.get_or_insert(e);
                }
            }
        }
        if let (true, Some(e)) = (records.is_empty(), first_error) {
            return Err(EngineError::Decode(e.to_string()));
        }

        let mut notices = Vec::new();
        for record in records {
            match record {
                InboundRecord::LockState { mask } => {
                    notices.push(EngineNotice::LockStateReport(LockState::from_mask(mask)));
                }
                InboundRecord::Log { message } => notices.push(EngineNotice::Log(message)),
                InboundRecord::Ping => self.append("pong", &OutboundRecord::Pong)?,
            }
        }
        Ok(notices)
    }
}

/// Splits an engine output buffer back into records.
///
/// # Errors
///
/// Returns the first line that is not a valid [`OutboundRecord`].
pub fn parse_output(data: &[u8]) -> Result<Vec<OutboundRecord>, serde_json::Error> {
    data.split(|b| *b == b'\n')
        .filter(|line| !line.is_empty())
        .map(serde_json::from_slice)
        .collect()
}

// ── Tests ─────────────────────────────────────────────────────────────────────
