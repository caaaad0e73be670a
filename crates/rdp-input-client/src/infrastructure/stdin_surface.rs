//! Newline-delimited JSON input surface.
//!
//! Stands in for the browser page: each line is one [`InputSurfaceEvent`]
//! (see `rdp_input_core::domain::events` for the format).  Blank lines are
//! skipped; malformed lines are logged and skipped.

use rdp_input_core::InputSurfaceEvent;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{debug, warn};

use crate::application::ConnectionSupervisor;

/// Parses one line.  `Ok(None)` for blank lines.
///
/// # Errors
///
/// Returns the JSON error for lines that are not a valid event.
pub fn parse_surface_line(line: &str) -> Result<Option<InputSurfaceEvent>, serde_json::Error> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    serde_json::from_str(line).map(Some)
}

/// Reads events from `reader` until EOF and dispatches each one.
///
/// Returns the number of events dispatched.
///
/// # Errors
///
/// Returns an error only if reading from `reader` fails.
pub async fn pump_surface_events<R>(
    reader: R,
    supervisor: &ConnectionSupervisor,
) -> std::io::Result<usize>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();
    let mut dispatched = 0;
    let mut line_no = 0usize;

    while let Some(line) = lines.next_line().await? {
        line_no += 1;
        match parse_surface_line(&line) {
            Ok(Some(event)) => {
                let action = supervisor.dispatch(&event);
                debug!("line {line_no}: {event:?} → {action:?}");
                dispatched += 1;
            }
            Ok(None) => {}
            Err(e) => warn!("line {line_no}: ignoring malformed input event: {e}"),
        }
    }
    Ok(dispatched)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
