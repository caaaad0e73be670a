//! Input-surface events, as delivered by the browser.
//!
//! These mirror the DOM events the translator listens to.  They are
//! serializable so that a host can ship them across a process boundary as
//! JSON, one object per event, tagged by `"type"`:
//!
//! ```json
//! {"type":"KeyDown","code":"KeyA","key":"a","modifiers":{"shift":false}}
//! {"type":"CompositionUpdate","data":"ni"}
//! {"type":"FocusLost"}
//! ```

use serde::{Deserialize, Serialize};

use super::state::Modifiers;

/// A key-down or key-up event.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyEvent {
    /// Physical key position (`KeyboardEvent.code`).  Events without one are
    /// dropped.
    #[serde(default)]
    pub code: Option<String>,
    /// Produced character or key name (`KeyboardEvent.key`), used only by the
    /// default-action gate.
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default)]
    pub modifiers: Modifiers,
}

impl KeyEvent {
    pub fn new(code: &str, key: &str, modifiers: Modifiers) -> Self {
        Self {
            code: Some(code.to_owned()),
            key: Some(key.to_owned()),
            modifiers,
        }
    }

    /// Returns the code if present and non-empty.
    pub fn code(&self) -> Option<&str> {
        self.code.as_deref().filter(|c| !c.is_empty())
    }
}

/// Every event the input surface can deliver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum InputSurfaceEvent {
    KeyDown(KeyEvent),
    KeyUp(KeyEvent),
    CompositionStart,
    CompositionUpdate {
        #[serde(default)]
        data: Option<String>,
    },
    CompositionEnd {
        #[serde(default)]
        data: Option<String>,
    },
    /// The surface lost exclusive keyboard capture (window blur).
    FocusLost,
}

/// Whether the browser's native handling of an event should proceed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DefaultAction {
    Allow,
    Prevent,
}

impl DefaultAction {
    pub fn is_prevented(self) -> bool {
        self == DefaultAction::Prevent
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
