//! Keyboard state owned by the translator.
//!
//! Four pieces of state live here:
//!
//! - [`PressedKeySet`] – which key codes are currently held down.
//! - [`Modifiers`] – the Shift/Control/Alt/Meta snapshot from the last event.
//! - [`LockState`] – this client's belief about CapsLock/NumLock/ScrollLock.
//! - [`CompositionSession`] – whether an IME currently owns input.
//!
//! None of these types perform I/O.  The translator mutates them; everything
//! else only ever sees an immutable [`TranslatorSnapshot`].

use serde::{Deserialize, Serialize};

use crate::keymap::LockKey;

// ── Modifiers ─────────────────────────────────────────────────────────────────

/// Snapshot of the four modifier flags carried by a browser key event.
///
/// This is authoritative input, not something derived from the pressed-key
/// set: the browser knows about modifiers pressed while the page did not have
/// focus, and we trust it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Modifiers {
    pub shift: bool,
    pub control: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    /// No modifiers held.
    pub const NONE: Modifiers = Modifiers {
        shift: false,
        control: false,
        alt: false,
        meta: false,
    };

    /// Only Control held.
    pub fn control() -> Self {
        Self {
            control: true,
            ..Self::NONE
        }
    }

    /// Only Shift held.
    pub fn shift() -> Self {
        Self {
            shift: true,
            ..Self::NONE
        }
    }
}

// ── Lock indicators ───────────────────────────────────────────────────────────

/// Local toggle state of the three keyboard lock indicators.
///
/// The remote host owns the real LED state.  This value is what we push to it
/// after every accepted lock-key press, and what we overwrite when the host
/// reports its own state back.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LockState {
    pub caps_lock: bool,
    pub num_lock: bool,
    pub scroll_lock: bool,
}

impl LockState {
    pub const SCROLL_LOCK: u32 = 1 << 0;
    pub const NUM_LOCK: u32 = 1 << 1;
    pub const CAPS_LOCK: u32 = 1 << 2;

    /// Returns the lock-sync bitmask (scroll = bit 0, num = bit 1, caps = bit 2).
    pub fn mask(&self) -> u32 {
        let mut mask = 0;
        if self.scroll_lock {
            mask |= Self::SCROLL_LOCK;
        }
        if self.num_lock {
            mask |= Self::NUM_LOCK;
        }
        if self.caps_lock {
            mask |= Self::CAPS_LOCK;
        }
        mask
    }

    /// Builds a lock state from a bitmask; bits above bit 2 are ignored.
    pub fn from_mask(mask: u32) -> Self {
        Self {
            scroll_lock: mask & Self::SCROLL_LOCK != 0,
            num_lock: mask & Self::NUM_LOCK != 0,
            caps_lock: mask & Self::CAPS_LOCK != 0,
        }
    }

    /// Flips the indicator for `key`.
    pub fn toggle(&mut self, key: LockKey) {
        match key {
            LockKey::CapsLock => self.caps_lock = !self.caps_lock,
            LockKey::NumLock => self.num_lock = !self.num_lock,
            LockKey::ScrollLock => self.scroll_lock = !self.scroll_lock,
        }
    }
}

// ── IME composition ───────────────────────────────────────────────────────────

/// An input-method composition in progress.
///
/// While `active`, raw key events belong to the IME and are ignored.  The
/// buffer holds the latest interim text so it can be committed if the final
/// composition-end event arrives without data.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompositionSession {
    active: bool,
    buffer: String,
}

impl CompositionSession {
    /// Opens a session with an empty buffer.
    pub fn start(&mut self) {
        self.active = true;
        self.buffer.clear();
    }

    /// Replaces the buffer with the latest interim text.
    pub fn update(&mut self, text: Option<&str>) {
        self.buffer.clear();
        self.buffer.push_str(text.unwrap_or_default());
    }

    /// Closes the session and returns the text to commit.
    ///
    /// `final_text` wins when non-empty; otherwise the accumulated buffer is
    /// used.  The buffer is cleared either way.
    pub fn finish(&mut self, final_text: Option<&str>) -> String {
        self.active = false;
        let buffered = std::mem::take(&mut self.buffer);
        match final_text {
            Some(text) if !text.is_empty() => text.to_owned(),
            _ => buffered,
        }
    }

    /// Drops the session without committing anything.
    pub fn abort(&mut self) {
        self.active = false;
        self.buffer.clear();
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn buffer(&self) -> &str {
        &self.buffer
    }
}

// ── Held keys ─────────────────────────────────────────────────────────────────

/// The set of key codes currently held down, in press order.
///
/// Entries are the raw `KeyboardEvent.code` strings, not parsed identifiers:
/// a code with no scancode still has to be tracked so that it can be cleared
/// later and never left "stuck".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PressedKeySet {
    codes: Vec<String>,
}

impl PressedKeySet {
    /// Inserts `code`; returns `false` if it was already present.
    pub fn insert(&mut self, code: &str) -> bool {
        if self.contains(code) {
            return false;
        }
        self.codes.push(code.to_owned());
        true
    }

    /// Removes `code`; returns `false` if it was not present.
    pub fn remove(&mut self, code: &str) -> bool {
        match self.codes.iter().position(|c| c == code) {
            Some(idx) => {
                self.codes.remove(idx);
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, code: &str) -> bool {
        self.codes.iter().any(|c| c == code)
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    /// Removes and returns every entry, leaving the set empty.
    pub fn drain(&mut self) -> Vec<String> {
        std::mem::take(&mut self.codes)
    }

    /// Returns a copy of the entries in press order.
    pub fn to_vec(&self) -> Vec<String> {
        self.codes.clone()
    }
}

// ── Diagnostics ───────────────────────────────────────────────────────────────

/// Immutable copy of the translator state, for debugging and status UIs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslatorSnapshot {
    pub pressed_keys: Vec<String>,
    pub modifiers: Modifiers,
    pub locks: LockState,
    pub composing: bool,
}

// ── Tests ─────────────────────────────────────────────────────────────────────
