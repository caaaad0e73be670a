//! Which browser shortcuts keep their native behaviour.
//!
//! By default every key combination is swallowed so that the remote session
//! sees it (Ctrl+A should select-all on the remote desktop, not in the page).
//! A handful of browser shortcuts are too disruptive to take away from the
//! user and are let through.  Letting a shortcut through does not stop it
//! from also being translated and sent to the host.

use crate::domain::events::{DefaultAction, KeyEvent};
use crate::domain::state::Modifiers;

/// One allow-listed combination, matched against `KeyboardEvent.key`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BrowserShortcut {
    pub key: &'static str,
    pub control: bool,
    pub shift: bool,
    pub purpose: &'static str,
}

/// Combinations whose native browser handling is preserved.
///
/// A `false` modifier means "not required", not "must be released".
pub const ALLOWED_BROWSER_SHORTCUTS: &[BrowserShortcut] = &[
    BrowserShortcut {
        key: "F5",
        control: false,
        shift: false,
        purpose: "refresh",
    },
    BrowserShortcut {
        key: "F12",
        control: false,
        shift: false,
        purpose: "developer tools",
    },
    BrowserShortcut {
        key: "w",
        control: true,
        shift: false,
        purpose: "close tab",
    },
    BrowserShortcut {
        key: "t",
        control: true,
        shift: false,
        purpose: "new tab",
    },
    BrowserShortcut {
        key: "T",
        control: true,
        shift: true,
        purpose: "reopen closed tab",
    },
];

impl BrowserShortcut {
    fn matches(&self, key: &str, modifiers: &Modifiers) -> bool {
        self.key == key
            && (!self.control || modifiers.control)
            && (!self.shift || modifiers.shift)
    }
}

/// Returns `true` if the browser should be allowed to handle `key` natively.
pub fn should_allow_default(key: &str, modifiers: &Modifiers) -> bool {
    ALLOWED_BROWSER_SHORTCUTS
        .iter()
        .any(|shortcut| shortcut.matches(key, modifiers))
}

/// Applies the gate to a whole key event.  Events without a `key` are prevented.
pub fn default_action_for(event: &KeyEvent) -> DefaultAction {
    match event.key.as_deref() {
        Some(key) if should_allow_default(key, &event.modifiers) => DefaultAction::Allow,
        _ => DefaultAction::Prevent,
    }
}
