//! Domain types for the input bridge.
//!
//! Everything in here is plain data plus pure functions: keyboard state,
//! input-surface events, keyboard layouts, and the reconnect policy.  There
//! is no I/O and no async runtime.

pub mod events;
pub mod layout;
pub mod reconnect;
pub mod state;

pub use events::{DefaultAction, InputSurfaceEvent, KeyEvent};
pub use layout::KeyboardLayout;
pub use reconnect::{ReconnectAttemptCounter, ReconnectPolicy};
pub use state::{
    CompositionSession, LockState, Modifiers, PressedKeySet, TranslatorSnapshot,
};
