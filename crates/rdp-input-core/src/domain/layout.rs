//! Keyboard layout identifiers announced to the remote host.
//!
//! Scancodes are layout-independent, but the host still needs to know which
//! layout to apply to them.  RDP carries that as a Windows locale identifier
//! (LCID) in the first packet of the session.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A supported keyboard layout, named by its short language tag.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyboardLayout {
    #[default]
    En,
    Fr,
    De,
    Es,
    It,
    Pt,
    Zh,
    Ja,
    Ko,
}

impl KeyboardLayout {
    /// Parses a language tag; unknown tags fall back to US English.
    pub fn from_tag(tag: &str) -> Self {
        match tag.to_ascii_lowercase().as_str() {
            "fr" => KeyboardLayout::Fr,
            "de" => KeyboardLayout::De,
            "es" => KeyboardLayout::Es,
            "it" => KeyboardLayout::It,
            "pt" => KeyboardLayout::Pt,
            "zh" => KeyboardLayout::Zh,
            "ja" => KeyboardLayout::Ja,
            "ko" => KeyboardLayout::Ko,
            _ => KeyboardLayout::En,
        }
    }

    pub fn tag(self) -> &'static str {
        match self {
            KeyboardLayout::En => "en",
            KeyboardLayout::Fr => "fr",
            KeyboardLayout::De => "de",
            KeyboardLayout::Es => "es",
            KeyboardLayout::It => "it",
            KeyboardLayout::Pt => "pt",
            KeyboardLayout::Zh => "zh",
            KeyboardLayout::Ja => "ja",
            KeyboardLayout::Ko => "ko",
        }
    }

    /// Windows locale identifier for this layout.
    pub fn lcid(self) -> u32 {
        match self {
            KeyboardLayout::En => 0x409,
            KeyboardLayout::Fr => 0x40C,
            KeyboardLayout::De => 0x407,
            KeyboardLayout::Es => 0x40A,
            KeyboardLayout::It => 0x410,
            KeyboardLayout::Pt => 0x416,
            KeyboardLayout::Zh => 0x804,
            KeyboardLayout::Ja => 0x411,
            KeyboardLayout::Ko => 0x412,
        }
    }
}

impl fmt::Display for KeyboardLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (0x{:04x})", self.tag(), self.lcid())
    }
}
