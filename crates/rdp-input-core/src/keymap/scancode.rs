//! XT Set 1 scancodes and the flag layout of a scancode input event.
//!
//! RDP keyboard events carry the PC/XT "Set 1" scancode of the physical key.
//! Keys that the original IBM keyboard did not have (arrows, the edit
//! cluster, right-hand Ctrl/Alt, the Windows keys) are sent with a `0xE0`
//! prefix on the wire.  This table folds that prefix into the value: any
//! scancode above `0xFF` is *extended*.
//!
//! | Key       | Scancode | Extended? |
//! |-----------|----------|-----------|
//! | KeyA      | `0x1E`   | no        |
//! | ArrowUp   | `0x148`  | yes       |
//! | NumpadEnter | `0x11C`| yes       |
//!
//! Pause and PrintScreen are multi-byte sequences on real hardware.  They are
//! kept here as single wide integers (`0xE11D45`, `0xE02AE037`) so that the
//! lookup stays a plain table; they are extended by the same `> 0xFF` rule.
//!
//! # Event value layout
//!
//! The value handed to the protocol engine's `write_scancode_event` is:
//!
//! ```text
//! value = scancode | (release ? 0x8000 : 0) | (extended ? 0x0100 : 0)
//! ```

use serde::{Deserialize, Serialize};

use super::code::KeyIdentifier;

/// Flag bit set on a key-release event.
pub const KEY_RELEASE: u32 = 0x8000;

/// Flag bit set on an event for an extended (`0xE0`-prefixed) key.
pub const KEY_EXTENDED: u32 = 0x0100;

/// A hardware scancode, possibly with the extension prefix folded in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Scancode(pub u32);

impl Scancode {
    /// Returns the raw table value.
    pub fn value(self) -> u32 {
        self.0
    }

    /// Returns `true` when the key needs the extension prefix.
    pub fn is_extended(self) -> bool {
        self.0 > 0xFF
    }

    /// Builds the event value for a press (`release = false`) or release.
    pub fn event_value(self, release: bool) -> u32 {
        let mut flags = if release { KEY_RELEASE } else { 0 };
        if self.is_extended() {
            flags |= KEY_EXTENDED;
        }
        self.0 | flags
    }
}

impl From<Scancode> for u32 {
    fn from(code: Scancode) -> Self {
        code.0
    }
}

impl KeyIdentifier {
    /// Returns the scancode for this key position.
    pub fn scancode(self) -> Scancode {
        let raw = match self {
            KeyIdentifier::KeyA => 0x1E,
            KeyIdentifier::KeyB => 0x30,
            KeyIdentifier::KeyC => 0x2E,
            KeyIdentifier::KeyD => 0x20,
            KeyIdentifier::KeyE => 0x12,
            KeyIdentifier::KeyF => 0x21,
            KeyIdentifier::KeyG => 0x22,
            KeyIdentifier::KeyH => 0x23,
            KeyIdentifier::KeyI => 0x17,
            KeyIdentifier::KeyJ => 0x24,
            KeyIdentifier::KeyK => 0x25,
            KeyIdentifier::KeyL => 0x26,
            KeyIdentifier::KeyM => 0x32,
            KeyIdentifier::KeyN => 0x31,
            KeyIdentifier::KeyO => 0x18,
            KeyIdentifier::KeyP => 0x19,
            KeyIdentifier::KeyQ => 0x10,
            KeyIdentifier::KeyR => 0x13,
            KeyIdentifier::KeyS => 0x1F,
            KeyIdentifier::KeyT => 0x14,
            KeyIdentifier::KeyU => 0x16,
            KeyIdentifier::KeyV => 0x2F,
            KeyIdentifier::KeyW => 0x11,
            KeyIdentifier::KeyX => 0x2D,
            KeyIdentifier::KeyY => 0x15,
            KeyIdentifier::KeyZ => 0x2C,

            KeyIdentifier::Digit0 => 0x0B,
            KeyIdentifier::Digit1 => 0x02,
            KeyIdentifier::Digit2 => 0x03,
            KeyIdentifier::Digit3 => 0x04,
            KeyIdentifier::Digit4 => 0x05,
            KeyIdentifier::Digit5 => 0x06,
            KeyIdentifier::Digit6 => 0x07,
            KeyIdentifier::Digit7 => 0x08,
            KeyIdentifier::Digit8 => 0x09,
            KeyIdentifier::Digit9 => 0x0A,

            KeyIdentifier::F1 => 0x3B,
            KeyIdentifier::F2 => 0x3C,
            KeyIdentifier::F3 => 0x3D,
            KeyIdentifier::F4 => 0x3E,
            KeyIdentifier::F5 => 0x3F,
            KeyIdentifier::F6 => 0x40,
            KeyIdentifier::F7 => 0x41,
            KeyIdentifier::F8 => 0x42,
            KeyIdentifier::F9 => 0x43,
            KeyIdentifier::F10 => 0x44,
            KeyIdentifier::F11 => 0x57,
            KeyIdentifier::F12 => 0x58,

            KeyIdentifier::Minus => 0x0C,
            KeyIdentifier::Equal => 0x0D,
            KeyIdentifier::Backspace => 0x0E,
            KeyIdentifier::Tab => 0x0F,
            KeyIdentifier::BracketLeft => 0x1A,
            KeyIdentifier::BracketRight => 0x1B,
            KeyIdentifier::Enter => 0x1C,
            KeyIdentifier::Semicolon => 0x27,
            KeyIdentifier::Quote => 0x28,
            KeyIdentifier::Backquote => 0x29,
            KeyIdentifier::Backslash => 0x2B,
            KeyIdentifier::Comma => 0x33,
            KeyIdentifier::Period => 0x34,
            KeyIdentifier::Slash => 0x35,
            KeyIdentifier::Space => 0x39,

            KeyIdentifier::CapsLock => 0x3A,
            KeyIdentifier::ShiftLeft => 0x2A,
            KeyIdentifier::ShiftRight => 0x36,
            KeyIdentifier::ControlLeft => 0x1D,
            KeyIdentifier::ControlRight => 0x11D,
            KeyIdentifier::AltLeft => 0x38,
            KeyIdentifier::AltRight => 0x138,
            KeyIdentifier::OsLeft | KeyIdentifier::MetaLeft => 0x15B,
            KeyIdentifier::OsRight | KeyIdentifier::MetaRight => 0x15C,

            KeyIdentifier::ArrowUp => 0x148,
            KeyIdentifier::ArrowDown => 0x150,
            KeyIdentifier::ArrowLeft => 0x14B,
            KeyIdentifier::ArrowRight => 0x14D,

            KeyIdentifier::Insert => 0x152,
            KeyIdentifier::Delete => 0x153,
            KeyIdentifier::Home => 0x147,
            KeyIdentifier::End => 0x14F,
            KeyIdentifier::PageUp => 0x149,
            KeyIdentifier::PageDown => 0x151,

            KeyIdentifier::Escape => 0x01,
            KeyIdentifier::NumLock => 0x45,
            KeyIdentifier::ScrollLock => 0x46,
            KeyIdentifier::Pause => 0xE1_1D45,
            KeyIdentifier::ContextMenu => 0x15D,
            KeyIdentifier::PrintScreen => 0xE02A_E037,

            KeyIdentifier::Numpad0 => 0x52,
            KeyIdentifier::Numpad1 => 0x4F,
            KeyIdentifier::Numpad2 => 0x50,
            KeyIdentifier::Numpad3 => 0x51,
            KeyIdentifier::Numpad4 => 0x4B,
            KeyIdentifier::Numpad5 => 0x4C,
            KeyIdentifier::Numpad6 => 0x4D,
            KeyIdentifier::Numpad7 => 0x47,
            KeyIdentifier::Numpad8 => 0x48,
            KeyIdentifier::Numpad9 => 0x49,
            KeyIdentifier::NumpadDecimal => 0x53,
            KeyIdentifier::NumpadEnter => 0x11C,
            KeyIdentifier::NumpadAdd => 0x4E,
            KeyIdentifier::NumpadSubtract => 0x4A,
            KeyIdentifier::NumpadMultiply => 0x37,
            KeyIdentifier::NumpadDivide => 0x135,
        };
        Scancode(raw)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
