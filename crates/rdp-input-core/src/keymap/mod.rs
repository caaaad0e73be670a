//! Key code translation tables for the browser → RDP keyboard path.
//!
//! The browser identifies keys by `KeyboardEvent.code` strings; the RDP input
//! channel wants XT Set 1 scancodes.  This module owns the closed, read-only
//! mapping between the two.  There is no runtime configuration: the tables
//! are `match` expressions compiled into the binary.

pub mod code;
pub mod scancode;

pub use code::{KeyIdentifier, LockKey, ModifierGroup};
pub use scancode::{Scancode, KEY_EXTENDED, KEY_RELEASE};

/// Unified key mapper over the static tables.
pub struct KeyMapper;

impl KeyMapper {
    /// Resolves a DOM `KeyboardEvent.code` string to its scancode.
    ///
    /// Returns `None` (a *miss*) when the code is not in the supported set.
    /// A miss is never fatal: callers log it and drop the event.
    pub fn lookup_scancode(code: &str) -> Option<Scancode> {
        KeyIdentifier::from_code(code).map(KeyIdentifier::scancode)
    }

    /// Returns `true` if `code` names a Shift, Control, Alt, or Meta key.
    pub fn is_modifier_code(code: &str) -> bool {
        KeyIdentifier::from_code(code).is_some_and(KeyIdentifier::is_modifier)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
