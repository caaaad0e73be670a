//! # rdp-input-core
//!
//! Keyboard translation engine for the RDP web input bridge.
//!
//! This crate has no async runtime, no sockets, and no knowledge of how the
//! remote-desktop protocol encodes anything.  It turns browser keyboard
//! events into RDP input primitives and hands them to an [`InputSink`].
//!
//! # Architecture overview (for beginners)
//!
//! A web page captures keystrokes and wants the remote Windows host to see
//! them as if they came from a real keyboard.  The browser describes keys by
//! *where they are* (`KeyboardEvent.code`, e.g. `"KeyA"`) and the host expects
//! XT scancodes (`0x1E`).  In between sits this crate:
//!
//! - **`keymap`** – The closed table from DOM key codes to scancodes, plus the
//!   bit layout of a scancode event (release flag `0x8000`, extended flag
//!   `0x0100`).
//!
//! - **`domain`** – Plain data: pressed keys, modifier and lock state, IME
//!   composition, input-surface events, keyboard layouts, and the reconnect
//!   backoff policy used by the client crate.
//!
//! - **`translator`** – The stateful [`KeyTranslator`] that suppresses
//!   auto-repeat, tracks lock toggles, commits IME text as unicode, and
//!   releases every held key when focus is lost.

pub mod domain;
pub mod keymap;
pub mod translator;

pub use domain::events::{DefaultAction, InputSurfaceEvent, KeyEvent};
pub use domain::layout::KeyboardLayout;
pub use domain::reconnect::{ReconnectAttemptCounter, ReconnectPolicy};
pub use domain::state::{LockState, Modifiers, TranslatorSnapshot};
pub use keymap::{KeyIdentifier, KeyMapper, Scancode, KEY_EXTENDED, KEY_RELEASE};
pub use translator::{should_allow_default, InputSink, KeyTranslator, SinkError};
