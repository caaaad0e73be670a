//! Physical key identifiers, named by DOM `KeyboardEvent.code` strings.
//!
//! A [`KeyIdentifier`] names a key *position* on the keyboard, not the
//! character it produces.  `KeyQ` is the key to the right of Tab whether the
//! user's layout is QWERTY (it types `q`) or AZERTY (it types `a`).  The
//! remote host applies its own layout to the scancode, so the browser must
//! send positions, never characters.
//!
//! # Why an enum and not plain strings? (for beginners)
//!
//! The browser hands us arbitrary strings.  Parsing them once into a closed
//! enum at the boundary means every later `match` is checked by the compiler:
//! adding a new key without giving it a scancode is a compile error, not a
//! silent runtime miss.  Strings that are not in the set (for example
//! `"IntlBackslash"` or media keys) parse to `None`; that is a recoverable
//! miss, not an error.
//!
//! # OS vs. Meta
//!
//! Older browsers report the Windows/Command key as `OSLeft`/`OSRight`, newer
//! ones as `MetaLeft`/`MetaRight`.  Both spellings are accepted and resolve to
//! the same scancodes.

use serde::{Deserialize, Serialize};

/// A physical key position from the closed set the translator understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum KeyIdentifier {
    // Letters
    KeyA,
    KeyB,
    KeyC,
    KeyD,
    KeyE,
    KeyF,
    KeyG,
    KeyH,
    KeyI,
    KeyJ,
    KeyK,
    KeyL,
    KeyM,
    KeyN,
    KeyO,
    KeyP,
    KeyQ,
    KeyR,
    KeyS,
    KeyT,
    KeyU,
    KeyV,
    KeyW,
    KeyX,
    KeyY,
    KeyZ,

    // Digit row
    Digit0,
    Digit1,
    Digit2,
    Digit3,
    Digit4,
    Digit5,
    Digit6,
    Digit7,
    Digit8,
    Digit9,

    // Function keys
    F1,
    F2,
    F3,
    F4,
    F5,
    F6,
    F7,
    F8,
    F9,
    F10,
    F11,
    F12,

    // Punctuation and whitespace
    Minus,
    Equal,
    Backspace,
    Tab,
    BracketLeft,
    BracketRight,
    Enter,
    Semicolon,
    Quote,
    Backquote,
    Backslash,
    Comma,
    Period,
    Slash,
    Space,

    // Modifiers and CapsLock
    CapsLock,
    ShiftLeft,
    ShiftRight,
    ControlLeft,
    ControlRight,
    AltLeft,
    AltRight,
    OsLeft,
    OsRight,
    MetaLeft,
    MetaRight,

    // Arrows (extended)
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,

    // Edit cluster (extended)
    Insert,
    Delete,
    Home,
    End,
    PageUp,
    PageDown,

    // Miscellaneous
    Escape,
    NumLock,
    ScrollLock,
    Pause,
    ContextMenu,
    PrintScreen,

    // Numeric keypad
    Numpad0,
    Numpad1,
    Numpad2,
    Numpad3,
    Numpad4,
    Numpad5,
    Numpad6,
    Numpad7,
    Numpad8,
    Numpad9,
    NumpadDecimal,
    NumpadEnter,
    NumpadAdd,
    NumpadSubtract,
    NumpadMultiply,
    NumpadDivide,
}

/// The three keys whose press toggles a keyboard indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LockKey {
    CapsLock,
    NumLock,
    ScrollLock,
}

/// Which logical modifier a modifier key belongs to (left and right collapse).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModifierGroup {
    Shift,
    Control,
    Alt,
    Meta,
}

impl KeyIdentifier {
    /// Every identifier in the set, in declaration order.
    pub const ALL: &'static [KeyIdentifier] = &[
        KeyIdentifier::KeyA,
        KeyIdentifier::KeyB,
        KeyIdentifier::KeyC,
        KeyIdentifier::KeyD,
        KeyIdentifier::KeyE,
        KeyIdentifier::KeyF,
        KeyIdentifier::KeyG,
        KeyIdentifier::KeyH,
        KeyIdentifier::KeyI,
        KeyIdentifier::KeyJ,
        KeyIdentifier::KeyK,
        KeyIdentifier::KeyL,
        KeyIdentifier::KeyM,
        KeyIdentifier::KeyN,
        KeyIdentifier::KeyO,
        KeyIdentifier::KeyP,
        KeyIdentifier::KeyQ,
        KeyIdentifier::KeyR,
        KeyIdentifier::KeyS,
        KeyIdentifier::KeyT,
        KeyIdentifier::KeyU,
        KeyIdentifier::KeyV,
        KeyIdentifier::KeyW,
        KeyIdentifier::KeyX,
        KeyIdentifier::KeyY,
        KeyIdentifier::KeyZ,
        KeyIdentifier::Digit0,
        KeyIdentifier::Digit1,
        KeyIdentifier::Digit2,
        KeyIdentifier::Digit3,
        KeyIdentifier::Digit4,
        KeyIdentifier::Digit5,
        KeyIdentifier::Digit6,
        KeyIdentifier::Digit7,
        KeyIdentifier::Digit8,
        KeyIdentifier::Digit9,
        KeyIdentifier::F1,
        KeyIdentifier::F2,
        KeyIdentifier::F3,
        KeyIdentifier::F4,
        KeyIdentifier::F5,
        KeyIdentifier::F6,
        KeyIdentifier::F7,
        KeyIdentifier::F8,
        KeyIdentifier::F9,
        KeyIdentifier::F10,
        KeyIdentifier::F11,
        KeyIdentifier::F12,
        KeyIdentifier::Minus,
        KeyIdentifier::Equal,
        KeyIdentifier::Backspace,
        KeyIdentifier::Tab,
        KeyIdentifier::BracketLeft,
        KeyIdentifier::BracketRight,
        KeyIdentifier::Enter,
        KeyIdentifier::Semicolon,
        KeyIdentifier::Quote,
        KeyIdentifier::Backquote,
        KeyIdentifier::Backslash,
        KeyIdentifier::Comma,
        KeyIdentifier::Period,
        KeyIdentifier::Slash,
        KeyIdentifier::Space,
        KeyIdentifier::CapsLock,
        KeyIdentifier::ShiftLeft,
        KeyIdentifier::ShiftRight,
        KeyIdentifier::ControlLeft,
        KeyIdentifier::ControlRight,
        KeyIdentifier::AltLeft,
        KeyIdentifier::AltRight,
        KeyIdentifier::OsLeft,
        KeyIdentifier::OsRight,
        KeyIdentifier::MetaLeft,
        KeyIdentifier::MetaRight,
        KeyIdentifier::ArrowUp,
        KeyIdentifier::ArrowDown,
        KeyIdentifier::ArrowLeft,
        KeyIdentifier::ArrowRight,
        KeyIdentifier::Insert,
        KeyIdentifier::Delete,
        KeyIdentifier::Home,
        KeyIdentifier::End,
        KeyIdentifier::PageUp,
        KeyIdentifier::PageDown,
        KeyIdentifier::Escape,
        KeyIdentifier::NumLock,
        KeyIdentifier::ScrollLock,
        KeyIdentifier::Pause,
        KeyIdentifier::ContextMenu,
        KeyIdentifier::PrintScreen,
        KeyIdentifier::Numpad0,
        KeyIdentifier::Numpad1,
        KeyIdentifier::Numpad2,
        KeyIdentifier::Numpad3,
        KeyIdentifier::Numpad4,
        KeyIdentifier::Numpad5,
        KeyIdentifier::Numpad6,
        KeyIdentifier::Numpad7,
        KeyIdentifier::Numpad8,
        KeyIdentifier::Numpad9,
        KeyIdentifier::NumpadDecimal,
        KeyIdentifier::NumpadEnter,
        KeyIdentifier::NumpadAdd,
        KeyIdentifier::NumpadSubtract,
        KeyIdentifier::NumpadMultiply,
        KeyIdentifier::NumpadDivide,
    ];

    /// Parses a DOM `KeyboardEvent.code` string.
    ///
    /// Returns `None` for any string outside the supported set.
    pub fn from_code(code: &str) -> Option<Self> {
        let id = match code {
            "KeyA" => KeyIdentifier::KeyA,
            "KeyB" => KeyIdentifier::KeyB,
            "KeyC" => KeyIdentifier::KeyC,
            "KeyD" => KeyIdentifier::KeyD,
            "KeyE" => KeyIdentifier::KeyE,
            "KeyF" => KeyIdentifier::KeyF,
            "KeyG" => KeyIdentifier::KeyG,
            "KeyH" => KeyIdentifier::KeyH,
            "KeyI" => KeyIdentifier::KeyI,
            "KeyJ" => KeyIdentifier::KeyJ,
            "KeyK" => KeyIdentifier::KeyK,
            "KeyL" => KeyIdentifier::KeyL,
            "KeyM" => KeyIdentifier::KeyM,
            "KeyN" => KeyIdentifier::KeyN,
            "KeyO" => KeyIdentifier::KeyO,
            "KeyP" => KeyIdentifier::KeyP,
            "KeyQ" => KeyIdentifier::KeyQ,
            "KeyR" => KeyIdentifier::KeyR,
            "KeyS" => KeyIdentifier::KeyS,
            "KeyT" => KeyIdentifier::KeyT,
            "KeyU" => KeyIdentifier::KeyU,
            "KeyV" => KeyIdentifier::KeyV,
            "KeyW" => KeyIdentifier::KeyW,
            "KeyX" => KeyIdentifier::KeyX,
            "KeyY" => KeyIdentifier::KeyY,
            "KeyZ" => KeyIdentifier::KeyZ,
            "Digit0" => KeyIdentifier::Digit0,
            "Digit1" => KeyIdentifier::Digit1,
            "Digit2" => KeyIdentifier::Digit2,
            "Digit3" => KeyIdentifier::Digit3,
            "Digit4" => KeyIdentifier::Digit4,
            "Digit5" => KeyIdentifier::Digit5,
            "Digit6" => KeyIdentifier::Digit6,
            "Digit7" => KeyIdentifier::Digit7,
            "Digit8" => KeyIdentifier::Digit8,
            "Digit9" => KeyIdentifier::Digit9,
            "F1" => KeyIdentifier::F1,
            "F2" => KeyIdentifier::F2,
            "F3" => KeyIdentifier::F3,
            "F4" => KeyIdentifier::F4,
            "F5" => KeyIdentifier::F5,
            "F6" => KeyIdentifier::F6,
            "F7" => KeyIdentifier::F7,
            "F8" => KeyIdentifier::F8,
            "F9" => KeyIdentifier::F9,
            "F10" => KeyIdentifier::F10,
            "F11" => KeyIdentifier::F11,
            "F12" => KeyIdentifier::F12,
            "Minus" => KeyIdentifier::Minus,
            "Equal" => KeyIdentifier::Equal,
            "Backspace" => KeyIdentifier::Backspace,
            "Tab" => KeyIdentifier::Tab,
            "BracketLeft" => KeyIdentifier::BracketLeft,
            "BracketRight" => KeyIdentifier::BracketRight,
            "Enter" => KeyIdentifier::Enter,
            "Semicolon" => KeyIdentifier::Semicolon,
            "Quote" => KeyIdentifier::Quote,
            "Backquote" => KeyIdentifier::Backquote,
            "Backslash" => KeyIdentifier::Backslash,
            "Comma" => KeyIdentifier::Comma,
            "Period" => KeyIdentifier::Period,
            "Slash" => KeyIdentifier::Slash,
            "Space" => KeyIdentifier::Space,
            "CapsLock" => KeyIdentifier::CapsLock,
            "ShiftLeft" => KeyIdentifier::ShiftLeft,
            "ShiftRight" => KeyIdentifier::ShiftRight,
            "ControlLeft" => KeyIdentifier::ControlLeft,
            "ControlRight" => KeyIdentifier::ControlRight,
            "AltLeft" => KeyIdentifier::AltLeft,
            "AltRight" => KeyIdentifier::AltRight,
            "OSLeft" => KeyIdentifier::OsLeft,
            "OSRight" => KeyIdentifier::OsRight,
            "MetaLeft" => KeyIdentifier::MetaLeft,
            "MetaRight" => KeyIdentifier::MetaRight,
            "ArrowUp" => KeyIdentifier::ArrowUp,
            "ArrowDown" => KeyIdentifier::ArrowDown,
            "ArrowLeft" => KeyIdentifier::ArrowLeft,
            "ArrowRight" => KeyIdentifier::ArrowRight,
            "Insert" => KeyIdentifier::Insert,
            "Delete" => KeyIdentifier::Delete,
            "Home" => KeyIdentifier::Home,
            "End" => KeyIdentifier::End,
            "PageUp" => KeyIdentifier::PageUp,
            "PageDown" => KeyIdentifier::PageDown,
            "Escape" => KeyIdentifier::Escape,
            "NumLock" => KeyIdentifier::NumLock,
            "ScrollLock" => KeyIdentifier::ScrollLock,
            "Pause" => KeyIdentifier::Pause,
            "ContextMenu" => KeyIdentifier::ContextMenu,
            "PrintScreen" => KeyIdentifier::PrintScreen,
            "Numpad0" => KeyIdentifier::Numpad0,
            "Numpad1" => KeyIdentifier::Numpad1,
            "Numpad2" => KeyIdentifier::Numpad2,
            "Numpad3" => KeyIdentifier::Numpad3,
            "Numpad4" => KeyIdentifier::Numpad4,
            "Numpad5" => KeyIdentifier::Numpad5,
            "Numpad6" => KeyIdentifier::Numpad6,
            "Numpad7" => KeyIdentifier::Numpad7,
            "Numpad8" => KeyIdentifier::Numpad8,
            "Numpad9" => KeyIdentifier::Numpad9,
            "NumpadDecimal" => KeyIdentifier::NumpadDecimal,
            "NumpadEnter" => KeyIdentifier::NumpadEnter,
            "NumpadAdd" => KeyIdentifier::NumpadAdd,
            "NumpadSubtract" => KeyIdentifier::NumpadSubtract,
            "NumpadMultiply" => KeyIdentifier::NumpadMultiply,
            "NumpadDivide" => KeyIdentifier::NumpadDivide,
            _ => return None,
        };
        Some(id)
    }

    /// Returns the DOM `KeyboardEvent.code` spelling of this identifier.
    pub fn as_code(self) -> &'static str {
        match self {
            KeyIdentifier::KeyA => "KeyA",
            KeyIdentifier::KeyB => "KeyB",
            KeyIdentifier::KeyC => "KeyC",
            KeyIdentifier::KeyD => "KeyD",
            KeyIdentifier::KeyE => "KeyE",
            KeyIdentifier::KeyF => "KeyF",
            KeyIdentifier::KeyG => "KeyG",
            KeyIdentifier::KeyH => "KeyH",
            KeyIdentifier::KeyI => "KeyI",
            KeyIdentifier::KeyJ => "KeyJ",
            KeyIdentifier::KeyK => "KeyK",
            KeyIdentifier::KeyL => "KeyL",
            KeyIdentifier::KeyM => "KeyM",
            KeyIdentifier::KeyN => "KeyN",
            KeyIdentifier::KeyO => "KeyO",
            KeyIdentifier::KeyP => "KeyP",
            KeyIdentifier::KeyQ => "KeyQ",
            KeyIdentifier::KeyR => "KeyR",
            KeyIdentifier::KeyS => "KeyS",
            KeyIdentifier::KeyT => "KeyT",
            KeyIdentifier::KeyU => "KeyU",
            KeyIdentifier::KeyV => "KeyV",
            KeyIdentifier::KeyW => "KeyW",
            KeyIdentifier::KeyX => "KeyX",
            KeyIdentifier::KeyY => "KeyY",
            KeyIdentifier::KeyZ => "KeyZ",
            KeyIdentifier::Digit0 => "Digit0",
            KeyIdentifier::Digit1 => "Digit1",
            KeyIdentifier::Digit2 => "Digit2",
            KeyIdentifier::Digit3 => "Digit3",
            KeyIdentifier::Digit4 => "Digit4",
            KeyIdentifier::Digit5 => "Digit5",
            KeyIdentifier::Digit6 => "Digit6",
            KeyIdentifier::Digit7 => "Digit7",
            KeyIdentifier::Digit8 => "Digit8",
            KeyIdentifier::Digit9 => "Digit9",
            KeyIdentifier::F1 => "F1",
            KeyIdentifier::F2 => "F2",
            KeyIdentifier::F3 => "F3",
            KeyIdentifier::F4 => "F4",
            KeyIdentifier::F5 => "F5",
            KeyIdentifier::F6 => "F6",
            KeyIdentifier::F7 => "F7",
            KeyIdentifier::F8 => "F8",
            KeyIdentifier::F9 => "F9",
            KeyIdentifier::F10 => "F10",
            KeyIdentifier::F11 => "F11",
            KeyIdentifier::F12 => "F12",
            KeyIdentifier::Minus => "Minus",
            KeyIdentifier::Equal => "Equal",
            KeyIdentifier::Backspace => "Backspace",
            KeyIdentifier::Tab => "Tab",
            KeyIdentifier::BracketLeft => "BracketLeft",
            KeyIdentifier::BracketRight => "BracketRight",
            KeyIdentifier::Enter => "Enter",
            KeyIdentifier::Semicolon => "Semicolon",
            KeyIdentifier::Quote => "Quote",
            KeyIdentifier::Backquote => "Backquote",
            KeyIdentifier::Backslash => "Backslash",
            KeyIdentifier::Comma => "Comma",
            KeyIdentifier::Period => "Period",
            KeyIdentifier::Slash => "Slash",
            KeyIdentifier::Space => "Space",
            KeyIdentifier::CapsLock => "CapsLock",
            KeyIdentifier::ShiftLeft => "ShiftLeft",
            KeyIdentifier::ShiftRight => "ShiftRight",
            KeyIdentifier::ControlLeft => "ControlLeft",
            KeyIdentifier::ControlRight => "ControlRight",
            KeyIdentifier::AltLeft => "AltLeft",
            KeyIdentifier::AltRight => "AltRight",
            KeyIdentifier::OsLeft => "OSLeft",
            KeyIdentifier::OsRight => "OSRight",
            KeyIdentifier::MetaLeft => "MetaLeft",
            KeyIdentifier::MetaRight => "MetaRight",
            KeyIdentifier::ArrowUp => "ArrowUp",
            KeyIdentifier::ArrowDown => "ArrowDown",
            KeyIdentifier::ArrowLeft => "ArrowLeft",
            KeyIdentifier::ArrowRight => "ArrowRight",
            KeyIdentifier::Insert => "Insert",
            KeyIdentifier::Delete => "Delete",
            KeyIdentifier::Home => "Home",
            KeyIdentifier::End => "End",
            KeyIdentifier::PageUp => "PageUp",
            KeyIdentifier::PageDown => "PageDown",
            KeyIdentifier::Escape => "Escape",
            KeyIdentifier::NumLock => "NumLock",
            KeyIdentifier::ScrollLock => "ScrollLock",
            KeyIdentifier::Pause => "Pause",
            KeyIdentifier::ContextMenu => "ContextMenu",
            KeyIdentifier::PrintScreen => "PrintScreen",
            KeyIdentifier::Numpad0 => "Numpad0",
            KeyIdentifier::Numpad1 => "Numpad1",
            KeyIdentifier::Numpad2 => "Numpad2",
            KeyIdentifier::Numpad3 => "Numpad3",
            KeyIdentifier::Numpad4 => "Numpad4",
            KeyIdentifier::Numpad5 => "Numpad5",
            KeyIdentifier::Numpad6 => "Numpad6",
            KeyIdentifier::Numpad7 => "Numpad7",
            KeyIdentifier::Numpad8 => "Numpad8",
            KeyIdentifier::Numpad9 => "Numpad9",
            KeyIdentifier::NumpadDecimal => "NumpadDecimal",
            KeyIdentifier::NumpadEnter => "NumpadEnter",
            KeyIdentifier::NumpadAdd => "NumpadAdd",
            KeyIdentifier::NumpadSubtract => "NumpadSubtract",
            KeyIdentifier::NumpadMultiply => "NumpadMultiply",
            KeyIdentifier::NumpadDivide => "NumpadDivide",
        }
    }

    /// Returns the lock indicator this key toggles, if any.
    pub fn lock_key(self) -> Option<LockKey> {
        match self {
            KeyIdentifier::CapsLock => Some(LockKey::CapsLock),
            KeyIdentifier::NumLock => Some(LockKey::NumLock),
            KeyIdentifier::ScrollLock => Some(LockKey::ScrollLock),
            _ => None,
        }
    }

    /// Returns the modifier group for Shift/Control/Alt/Meta keys.
    pub fn modifier_group(self) -> Option<ModifierGroup> {
        match self {
            KeyIdentifier::ShiftLeft | KeyIdentifier::ShiftRight => Some(ModifierGroup::Shift),
            KeyIdentifier::ControlLeft | KeyIdentifier::ControlRight => {
                Some(ModifierGroup::Control)
            }
            KeyIdentifier::AltLeft | KeyIdentifier::AltRight => Some(ModifierGroup::Alt),
            KeyIdentifier::MetaLeft
            | KeyIdentifier::MetaRight
            | KeyIdentifier::OsLeft
            | KeyIdentifier::OsRight => Some(ModifierGroup::Meta),
            _ => None,
        }
    }

    /// Returns `true` for Shift, Control, Alt, and Meta/OS keys on either side.
    pub fn is_modifier(self) -> bool {
        self.modifier_group().is_some()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_identifier_code_parses_back_to_itself() {
        for &id in KeyIdentifier::ALL {
            assert_eq!(
                KeyIdentifier::from_code(id.as_code()),
                Some(id),
                "{id:?} must survive as_code → from_code"
            );
        }
    }

    #[test]
    fn test_all_contains_no_duplicates() {
        let mut seen = std::collections::HashSet::new();
        for &id in KeyIdentifier::ALL {
            assert!(seen.insert(id), "{id:?} listed twice");
        }
        assert_eq!(seen.len(), 106);
    }

    #[test]
    fn test_unknown_code_is_none() {
        assert_eq!(KeyIdentifier::from_code("IntlBackslash"), None);
        assert_eq!(KeyIdentifier::from_code(""), None);
        // Codes are case-sensitive, exactly as the browser reports them.
        assert_eq!(KeyIdentifier::from_code("keya"), None);
    }

    #[test]
    fn test_os_keys_use_legacy_spelling() {
        assert_eq!(KeyIdentifier::from_code("OSLeft"), Some(KeyIdentifier::OsLeft));
        assert_eq!(KeyIdentifier::OsRight.as_code(), "OSRight");
    }

    #[test]
    fn test_lock_keys_are_classified() {
        assert_eq!(KeyIdentifier::CapsLock.lock_key(), Some(LockKey::CapsLock));
        assert_eq!(KeyIdentifier::NumLock.lock_key(), Some(LockKey::NumLock));
        assert_eq!(KeyIdentifier::ScrollLock.lock_key(), Some(LockKey::ScrollLock));
        assert_eq!(KeyIdentifier::KeyA.lock_key(), None);
    }

    #[test]
    fn test_modifier_groups() {
        assert_eq!(KeyIdentifier::ShiftRight.modifier_group(), Some(ModifierGroup::Shift));
        assert_eq!(KeyIdentifier::ControlLeft.modifier_group(), Some(ModifierGroup::Control));
        assert_eq!(KeyIdentifier::AltRight.modifier_group(), Some(ModifierGroup::Alt));
        assert_eq!(KeyIdentifier::OsLeft.modifier_group(), Some(ModifierGroup::Meta));
        assert_eq!(KeyIdentifier::MetaRight.modifier_group(), Some(ModifierGroup::Meta));
        assert!(!KeyIdentifier::CapsLock.is_modifier());
        assert!(KeyIdentifier::ShiftLeft.is_modifier());
    }
}
