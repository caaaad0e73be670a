//! KeyTranslator: browser keyboard events → RDP key primitives.
//!
//! The translator is the stateful heart of the input bridge.  It receives
//! DOM-style key and composition events and turns them into three kinds of
//! output on an [`InputSink`]:
//!
//! - scancode events (`scancode | release bit | extended bit`)
//! - unicode events (one press and one release per UTF-16 code unit)
//! - lock-indicator synchronization (a 3-bit mask)
//!
//! # Guarantees
//!
//! - **One press per physical press.**  Browsers fire repeated `keydown`
//!   events while a key is held.  Only the first one is forwarded.
//! - **No stuck keys.**  [`KeyTranslator::release_all`] releases every held
//!   key and empties the set, even for keys that have no scancode.
//! - **The IME owns input while composing.**  Between composition start and
//!   end, key events are ignored entirely; the committed text is sent as
//!   unicode when the composition ends.
//! - **Emit then flush.**  Every emitted primitive is immediately followed by
//!   a flush, so the transport sees events one at a time.
//!
//! Sink failures are logged and never undo local state.

pub mod default_action;
pub mod recording;
pub mod sink;

use std::sync::Arc;

use tracing::{debug, error, warn};

use crate::domain::events::{DefaultAction, InputSurfaceEvent};
use crate::domain::state::{
    CompositionSession, LockState, Modifiers, PressedKeySet, TranslatorSnapshot,
};
use crate::keymap::{KeyIdentifier, KeyMapper, Scancode, KEY_RELEASE};

pub use default_action::{default_action_for, should_allow_default};
pub use sink::{InputSink, SinkError};

/// Stateful keyboard translator.
///
/// Owns all keyboard state exclusively; nothing outside this type mutates it.
pub struct KeyTranslator {
    sink: Arc<dyn InputSink>,
    pressed: PressedKeySet,
    modifiers: Modifiers,
    locks: LockState,
    composition: CompositionSession,
}

impl KeyTranslator {
    /// Creates a translator with no keys held and all locks off.
    pub fn new(sink: Arc<dyn InputSink>) -> Self {
        Self {
            sink,
            pressed: PressedKeySet::default(),
            modifiers: Modifiers::default(),
            locks: LockState::default(),
            composition: CompositionSession::default(),
        }
    }

    /// Resolves a `KeyboardEvent.code` to its scancode; `None` is a miss.
    pub fn lookup_scancode(code: &str) -> Option<Scancode> {
        KeyMapper::lookup_scancode(code)
    }

    // ── Surface dispatch ──────────────────────────────────────────────────────

    /// Routes one input-surface event and returns the default-action verdict.
    ///
    /// The default-action gate runs first and independently of translation:
    /// an allowed shortcut is still translated.  Key events without a code
    /// are dropped silently.
    pub fn handle_event(&mut self, event: &InputSurfaceEvent) -> DefaultAction {
        match event {
            InputSurfaceEvent::KeyDown(key) => {
                let action = default_action_for(key);
                if let Some(code) = key.code() {
                    self.key_down(code, key.modifiers);
                }
                action
            }
            InputSurfaceEvent::KeyUp(key) => {
                let action = default_action_for(key);
                if let Some(code) = key.code() {
                    self.key_up(code, key.modifiers);
                }
                action
            }
            InputSurfaceEvent::CompositionStart => {
                self.composition_start();
                DefaultAction::Allow
            }
            InputSurfaceEvent::CompositionUpdate { data } => {
                self.composition_update(data.as_deref());
                DefaultAction::Allow
            }
            InputSurfaceEvent::CompositionEnd { data } => {
                self.composition_end(data.as_deref());
                DefaultAction::Allow
            }
            InputSurfaceEvent::FocusLost => {
                self.release_all();
                DefaultAction::Allow
            }
        }
    }

    // ── Key events ────────────────────────────────────────────────────────────

    /// Handles a key-down for `code`.
    pub fn key_down(&mut self, code: &str, modifiers: Modifiers) {
        if self.composition.is_active() {
            return;
        }

        // Auto-repeat: the key is already down.
        if !self.pressed.insert(code) {
            return;
        }

        self.modifiers = modifiers;

        let identifier = KeyIdentifier::from_code(code);
        if let Some(lock) = identifier.and_then(KeyIdentifier::lock_key) {
            self.locks.toggle(lock);
            self.sync_locks();
        }

        match identifier.map(KeyIdentifier::scancode) {
            Some(scancode) => self.emit_scancode(scancode, false),
            None => warn!("unknown key code on key down: {code}"),
        }
    }

    /// Handles a key-up for `code`.
    pub fn key_up(&mut self, code: &str, modifiers: Modifiers) {
        if self.composition.is_active() {
            return;
        }

        self.pressed.remove(code);
        self.modifiers = modifiers;

        match Self::lookup_scancode(code) {
            Some(scancode) => self.emit_scancode(scancode, true),
            None => debug!("unknown key code on key up: {code}"),
        }
    }

    /// Releases every held key and empties the pressed set.
    ///
    /// Call on focus loss and on detach so the host never sees a key that
    /// stays down after the user has left the surface.
    pub fn release_all(&mut self) {
        let held = self.pressed.drain();
        if !held.is_empty() {
            debug!("releasing {} held key(s)", held.len());
        }
        for code in &held {
            if let Some(scancode) = Self::lookup_scancode(code) {
                self.emit_scancode(scancode, true);
            }
        }
    }

    // ── IME composition ───────────────────────────────────────────────────────

    pub fn composition_start(&mut self) {
        self.composition.start();
    }

    pub fn composition_update(&mut self, text: Option<&str>) {
        self.composition.update(text);
    }

    /// Ends the composition and commits its text as unicode events.
    pub fn composition_end(&mut self, final_text: Option<&str>) {
        let text = self.composition.finish(final_text);
        if !text.is_empty() {
            self.send_unicode_text(&text);
        }
    }

    /// Drops any composition in progress without committing its text.
    pub fn abort_composition(&mut self) {
        if self.composition.is_active() {
            debug!("discarding uncommitted composition");
        }
        self.composition.abort();
    }

    // ── Lock synchronization ──────────────────────────────────────────────────

    /// Pushes the current lock state to the sink.
    pub fn sync_locks(&self) {
        let mask = self.locks.mask();
        if let Err(e) = self.emit(|sink| sink.sync_kbd_locks(mask)) {
            error!("failed to sync lock keys (mask {mask:#05b}): {e}");
        }
    }

    /// Overwrites the lock state with an authoritative value and re-syncs.
    ///
    /// This is the escape hatch for when the host reports its real indicator
    /// state.  Normal key presses never go through here.
    pub fn force_sync_locks(&mut self, locks: LockState) {
        self.locks = locks;
        self.sync_locks();
    }

    // ── Direct injection ──────────────────────────────────────────────────────

    /// Sends a raw scancode press or release, bypassing held-key tracking.
    ///
    /// No extended bit is added; pass it in `scancode` if the key needs it.
    pub fn send_key_event(&self, scancode: u32, pressed: bool) {
        let value = if pressed {
            scancode
        } else {
            scancode | KEY_RELEASE
        };
        if let Err(e) = self.emit(|sink| sink.write_scancode_event(value)) {
            error!("failed to send scancode {value:#06x}: {e}");
        }
    }

    /// Sends a single unicode press or release.
    pub fn send_unicode_event(&self, codepoint: u32, pressed: bool) {
        let flags = if pressed { 0 } else { KEY_RELEASE };
        if let Err(e) = self.emit(|sink| sink.write_unicode_event(codepoint, flags)) {
            error!("failed to send unicode {codepoint:#06x}: {e}");
        }
    }

    // ── Diagnostics ───────────────────────────────────────────────────────────

    pub fn snapshot(&self) -> TranslatorSnapshot {
        TranslatorSnapshot {
            pressed_keys: self.pressed.to_vec(),
            modifiers: self.modifiers,
            locks: self.locks,
            composing: self.composition.is_active(),
        }
    }

    pub fn is_composing(&self) -> bool {
        self.composition.is_active()
    }

    pub fn lock_state(&self) -> LockState {
        self.locks
    }

    // ── Emission ──────────────────────────────────────────────────────────────

    fn emit_scancode(&self, scancode: Scancode, release: bool) {
        let value = scancode.event_value(release);
        if let Err(e) = self.emit(|sink| sink.write_scancode_event(value)) {
            error!("failed to send scancode {value:#06x}: {e}");
        }
    }

    fn send_unicode_text(&self, text: &str) {
        for unit in text.encode_utf16() {
            self.send_unicode_event(u32::from(unit), true);
            self.send_unicode_event(u32::from(unit), false);
        }
    }

    /// Writes one primitive and flushes it.
    fn emit<F>(&self, write: F) -> Result<(), SinkError>
    where
        F: FnOnce(&dyn InputSink) -> Result<(), SinkError>,
    {
        write(self.sink.as_ref())?;
        self.sink.flush_output()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::recording::{RecordingSink, SinkCall};
    use super::*;
    use crate::domain::events::KeyEvent;

    fn make_translator() -> (KeyTranslator, Arc<RecordingSink>) {
        let sink = Arc::new(RecordingSink::new());
        let translator = KeyTranslator::new(Arc::clone(&sink) as Arc<dyn InputSink>);
        (translator, sink)
    }

    // ── Press / release ───────────────────────────────────────────────────────

    #[test]
    fn test_key_down_emits_press_then_flush() {
        // Arrange
        let (mut t, sink) = make_translator();

        // Act
        t.key_down("KeyA", Modifiers::NONE);

        // Assert
        assert_eq!(sink.calls(), vec![SinkCall::Scancode(0x1E), SinkCall::Flush]);
    }

    #[test]
    fn test_key_up_emits_release_with_flag() {
        // Arrange
        let (mut t, sink) = make_translator();
        t.key_down("KeyA", Modifiers::NONE);
        sink.clear();

        // Act
        t.key_up("KeyA", Modifiers::NONE);

        // Assert
        assert_eq!(sink.calls(), vec![SinkCall::Scancode(0x801E), SinkCall::Flush]);
        assert!(t.snapshot().pressed_keys.is_empty());
    }

    #[test]
    fn test_repeated_key_down_emits_exactly_one_press() {
        // Arrange
        let (mut t, sink) = make_translator();

        // Act – three auto-repeat events with no key-up in between
        t.key_down("KeyA", Modifiers::NONE);
        t.key_down("KeyA", Modifiers::NONE);
        t.key_down("KeyA", Modifiers::NONE);

        // Assert
        assert_eq!(sink.presses(), vec![0x1E]);
    }

    #[test]
    fn test_key_can_be_pressed_again_after_release() {
        let (mut t, sink) = make_translator();
        t.key_down("KeyA", Modifiers::NONE);
        t.key_up("KeyA", Modifiers::NONE);
        t.key_down("KeyA", Modifiers::NONE);
        assert_eq!(sink.scancodes(), vec![0x1E, 0x801E, 0x1E]);
    }

    #[test]
    fn test_extended_key_sets_extended_bit() {
        let (mut t, sink) = make_translator();
        t.key_down("ArrowUp", Modifiers::NONE);
        t.key_up("ArrowUp", Modifiers::NONE);
        assert_eq!(sink.scancodes(), vec![0x148, 0x8148]);
        assert!(sink.scancodes().iter().all(|v| v & 0x0100 != 0));
    }

    #[test]
    fn test_key_up_without_key_down_still_emits_release() {
        let (mut t, sink) = make_translator();
        t.key_up("KeyB", Modifiers::NONE);
        assert_eq!(sink.scancodes(), vec![0x8030]);
    }

    // ── Misses ────────────────────────────────────────────────────────────────

    #[test]
    fn test_unknown_code_emits_nothing_but_is_tracked() {
        // Arrange
        let (mut t, sink) = make_translator();

        // Act
        t.key_down("IntlRo", Modifiers::shift());

        // Assert – no emission, but bookkeeping still happened
        assert!(sink.calls().is_empty());
        let snap = t.snapshot();
        assert_eq!(snap.pressed_keys, vec!["IntlRo"]);
        assert_eq!(snap.modifiers, Modifiers::shift());
    }

    #[test]
    fn test_unknown_code_key_up_removes_entry() {
        let (mut t, sink) = make_translator();
        t.key_down("IntlRo", Modifiers::NONE);
        t.key_up("IntlRo", Modifiers::NONE);
        assert!(sink.calls().is_empty());
        assert!(t.snapshot().pressed_keys.is_empty());
    }

    // ── Modifiers ─────────────────────────────────────────────────────────────

    #[test]
    fn test_modifiers_are_overwritten_from_event_snapshot() {
        let (mut t, _sink) = make_translator();
        t.key_down("ShiftLeft", Modifiers::shift());
        assert_eq!(t.snapshot().modifiers, Modifiers::shift());

        // The snapshot is authoritative even if it disagrees with held keys.
        t.key_down("KeyA", Modifiers::control());
        assert_eq!(t.snapshot().modifiers, Modifiers::control());
    }

    #[test]
    fn test_repeat_does_not_update_modifiers() {
        let (mut t, _sink) = make_translator();
        t.key_down("KeyA", Modifiers::NONE);
        t.key_down("KeyA", Modifiers::shift());
        assert_eq!(t.snapshot().modifiers, Modifiers::NONE);
    }

    // ── Lock keys ─────────────────────────────────────────────────────────────

    #[test]
    fn test_caps_lock_press_toggles_and_syncs_before_scancode() {
        // Arrange
        let (mut t, sink) = make_translator();

        // Act
        t.key_down("CapsLock", Modifiers::NONE);

        // Assert
        assert_eq!(
            sink.calls(),
            vec![
                SinkCall::SyncLocks(LockState::CAPS_LOCK),
                SinkCall::Flush,
                SinkCall::Scancode(0x3A),
                SinkCall::Flush,
            ]
        );
        assert!(t.lock_state().caps_lock);
    }

    #[test]
    fn test_caps_lock_repeat_toggles_once() {
        let (mut t, sink) = make_translator();
        t.key_down("CapsLock", Modifiers::NONE);
        t.key_down("CapsLock", Modifiers::NONE);
        assert!(t.lock_state().caps_lock);
        assert_eq!(sink.lock_syncs(), vec![0b100]);
    }

    #[test]
    fn test_lock_key_release_does_not_toggle() {
        let (mut t, sink) = make_translator();
        t.key_down("NumLock", Modifiers::NONE);
        t.key_up("NumLock", Modifiers::NONE);
        assert!(t.lock_state().num_lock);
        assert_eq!(sink.lock_syncs(), vec![0b010]);
    }

    #[test]
    fn test_second_press_toggles_off() {
        let (mut t, sink) = make_translator();
        for _ in 0..2 {
            t.key_down("ScrollLock", Modifiers::NONE);
            t.key_up("ScrollLock", Modifiers::NONE);
        }
        assert!(!t.lock_state().scroll_lock);
        assert_eq!(sink.lock_syncs(), vec![0b001, 0b000]);
    }

    #[test]
    fn test_mask_combines_all_locks() {
        let (mut t, sink) = make_translator();
        t.key_down("CapsLock", Modifiers::NONE);
        t.key_down("NumLock", Modifiers::NONE);
        t.key_down("ScrollLock", Modifiers::NONE);
        assert_eq!(sink.lock_syncs(), vec![0b100, 0b110, 0b111]);
    }

    #[test]
    fn test_force_sync_overwrites_state() {
        // Arrange
        let (mut t, sink) = make_translator();
        t.key_down("CapsLock", Modifiers::NONE);
        sink.clear();

        // Act – the host says only NumLock is on
        t.force_sync_locks(LockState::from_mask(LockState::NUM_LOCK));

        // Assert
        assert_eq!(sink.calls(), vec![SinkCall::SyncLocks(0b010), SinkCall::Flush]);
        assert!(!t.lock_state().caps_lock);
        assert!(t.lock_state().num_lock);
    }

    #[test]
    fn test_sync_locks_is_reinvocable() {
        let (t, sink) = make_translator();
        t.sync_locks();
        t.sync_locks();
        assert_eq!(sink.lock_syncs(), vec![0, 0]);
    }

    // ── Composition ───────────────────────────────────────────────────────────

    #[test]
    fn test_keys_are_ignored_while_composing() {
        // Arrange
        let (mut t, sink) = make_translator();
        t.composition_start();

        // Act
        t.key_down("KeyN", Modifiers::NONE);
        t.key_up("KeyN", Modifiers::NONE);
        t.key_down("CapsLock", Modifiers::NONE);

        // Assert
        assert!(sink.calls().is_empty());
        let snap = t.snapshot();
        assert!(snap.pressed_keys.is_empty());
        assert!(snap.composing);
        assert!(!snap.locks.caps_lock);
    }

    #[test]
    fn test_composition_end_sends_press_release_per_char() {
        // Arrange
        let (mut t, sink) = make_translator();
        t.composition_start();

        // Act
        t.composition_end(Some("A€"));

        // Assert
        assert_eq!(
            sink.unicode_events(),
            vec![(0x41, 0), (0x41, 0x8000), (0x20AC, 0), (0x20AC, 0x8000)]
        );
        assert!(!t.is_composing());
    }

    #[test]
    fn test_composition_end_uses_buffer_when_final_text_empty() {
        let (mut t, sink) = make_translator();
        t.composition_start();
        t.composition_update(Some("é"));
        t.composition_end(None);
        assert_eq!(sink.unicode_events(), vec![(0xE9, 0), (0xE9, 0x8000)]);
    }

    #[test]
    fn test_empty_composition_emits_nothing() {
        let (mut t, sink) = make_translator();
        t.composition_start();
        t.composition_end(Some(""));
        assert!(sink.calls().is_empty());
    }

    #[test]
    fn test_each_unicode_event_is_flushed() {
        let (mut t, sink) = make_translator();
        t.composition_start();
        t.composition_end(Some("x"));
        assert_eq!(
            sink.calls(),
            vec![
                SinkCall::Unicode { codepoint: 0x78, flags: 0 },
                SinkCall::Flush,
                SinkCall::Unicode { codepoint: 0x78, flags: 0x8000 },
                SinkCall::Flush,
            ]
        );
    }

    #[test]
    fn test_astral_char_is_sent_as_surrogate_pair() {
        let (mut t, sink) = make_translator();
        t.composition_start();
        t.composition_end(Some("😀"));
        assert_eq!(
            sink.unicode_events(),
            vec![(0xD83D, 0), (0xD83D, 0x8000), (0xDE00, 0), (0xDE00, 0x8000)]
        );
    }

    #[test]
    fn test_keys_resume_after_composition_end() {
        let (mut t, sink) = make_translator();
        t.composition_start();
        t.composition_end(None);
        t.key_down("KeyA", Modifiers::NONE);
        assert_eq!(sink.presses(), vec![0x1E]);
    }

    #[test]
    fn test_abort_composition_discards_text() {
        let (mut t, sink) = make_translator();
        t.composition_start();
        t.composition_update(Some("draft"));
        t.abort_composition();
        t.composition_end(None);
        assert!(sink.unicode_events().is_empty());
    }

    // ── Release all ───────────────────────────────────────────────────────────

    #[test]
    fn test_release_all_releases_every_held_key() {
        // Arrange
        let (mut t, sink) = make_translator();
        t.key_down("ShiftLeft", Modifiers::shift());
        t.key_down("KeyA", Modifiers::shift());
        t.key_down("ArrowLeft", Modifiers::shift());
        sink.clear();

        // Act
        t.release_all();

        // Assert
        assert_eq!(sink.releases(), vec![0x802A, 0x801E, 0x814B]);
        assert!(t.snapshot().pressed_keys.is_empty());
    }

    #[test]
    fn test_release_all_clears_unresolvable_entries() {
        let (mut t, sink) = make_translator();
        t.key_down("KeyA", Modifiers::NONE);
        t.key_down("Lang1", Modifiers::NONE);
        sink.clear();

        t.release_all();

        assert_eq!(sink.releases(), vec![0x801E]);
        assert!(t.snapshot().pressed_keys.is_empty());
    }

    #[test]
    fn test_release_all_with_nothing_held_is_silent() {
        let (mut t, sink) = make_translator();
        t.release_all();
        assert!(sink.calls().is_empty());
    }

    // ── Sink failures ─────────────────────────────────────────────────────────

    #[test]
    fn test_sink_failure_does_not_roll_back_state() {
        // Arrange
        let (mut t, sink) = make_translator();
        sink.set_failing(true);

        // Act
        t.key_down("CapsLock", Modifiers::NONE);
        t.key_down("KeyA", Modifiers::NONE);

        // Assert – state reflects the physical keyboard
        let snap = t.snapshot();
        assert_eq!(snap.pressed_keys, vec!["CapsLock", "KeyA"]);
        assert!(snap.locks.caps_lock);
    }

    #[test]
    fn test_failed_write_is_not_flushed() {
        let (mut t, sink) = make_translator();
        sink.set_failing(true);
        t.key_down("KeyA", Modifiers::NONE);
        assert_eq!(sink.calls(), vec![SinkCall::Scancode(0x1E)]);
    }

    #[test]
    fn test_release_all_recovers_after_sink_failure() {
        let (mut t, sink) = make_translator();
        sink.set_failing(true);
        t.key_down("KeyA", Modifiers::NONE);
        sink.set_failing(false);
        sink.clear();

        t.release_all();

        assert_eq!(sink.releases(), vec![0x801E]);
        assert!(t.snapshot().pressed_keys.is_empty());
    }

    // ── Direct injection ──────────────────────────────────────────────────────

    #[test]
    fn test_send_key_event_bypasses_tracking() {
        let (t, sink) = make_translator();
        t.send_key_event(0x1E, true);
        t.send_key_event(0x1E, false);
        assert_eq!(sink.scancodes(), vec![0x1E, 0x801E]);
        assert!(t.snapshot().pressed_keys.is_empty());
    }

    #[test]
    fn test_send_unicode_event_flags() {
        let (t, sink) = make_translator();
        t.send_unicode_event(0x263A, true);
        t.send_unicode_event(0x263A, false);
        assert_eq!(sink.unicode_events(), vec![(0x263A, 0), (0x263A, 0x8000)]);
    }

    // ── Event dispatch ────────────────────────────────────────────────────────

    #[test]
    fn test_handle_event_prevents_default_for_plain_keys() {
        let (mut t, sink) = make_translator();
        let event = InputSurfaceEvent::KeyDown(KeyEvent::new("KeyA", "a", Modifiers::NONE));
        assert_eq!(t.handle_event(&event), DefaultAction::Prevent);
        assert_eq!(sink.presses(), vec![0x1E]);
    }

    #[test]
    fn test_allowed_shortcut_is_still_translated() {
        let (mut t, sink) = make_translator();
        let event = InputSurfaceEvent::KeyDown(KeyEvent::new("F5", "F5", Modifiers::NONE));
        assert_eq!(t.handle_event(&event), DefaultAction::Allow);
        assert_eq!(sink.presses(), vec![0x3F]);
    }

    #[test]
    fn test_gate_runs_even_while_composing() {
        let (mut t, sink) = make_translator();
        t.composition_start();
        let event = InputSurfaceEvent::KeyDown(KeyEvent::new("KeyW", "w", Modifiers::control()));
        assert_eq!(t.handle_event(&event), DefaultAction::Allow);
        assert!(sink.calls().is_empty());
    }

    #[test]
    fn test_event_without_code_is_dropped() {
        let (mut t, sink) = make_translator();
        let event = InputSurfaceEvent::KeyDown(KeyEvent {
            code: None,
            key: Some("a".into()),
            modifiers: Modifiers::shift(),
        });
        t.handle_event(&event);
        assert!(sink.calls().is_empty());
        // Dropped before any state change.
        assert_eq!(t.snapshot().modifiers, Modifiers::NONE);
    }

    #[test]
    fn test_focus_lost_releases_all() {
        let (mut t, sink) = make_translator();
        t.key_down("KeyA", Modifiers::NONE);
        t.handle_event(&InputSurfaceEvent::FocusLost);
        assert_eq!(sink.releases(), vec![0x801E]);
    }

    #[test]
    fn test_composition_events_route_through_handle_event() {
        let (mut t, sink) = make_translator();
        t.handle_event(&InputSurfaceEvent::CompositionStart);
        t.handle_event(&InputSurfaceEvent::CompositionUpdate {
            data: Some("ß".into()),
        });
        t.handle_event(&InputSurfaceEvent::CompositionEnd { data: None });
        assert_eq!(sink.unicode_events(), vec![(0xDF, 0), (0xDF, 0x8000)]);
    }
}
