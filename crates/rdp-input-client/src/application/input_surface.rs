//! The input surface: the thing that captures keys while a session is live.
//!
//! The surface is either attached (keys go to the translator and their
//! browser default is usually prevented) or detached (nothing is translated
//! and the browser keeps every default).  Detaching releases every held key
//! first, so the host never sees a key that stays down after capture ends.

use rdp_input_core::{DefaultAction, InputSurfaceEvent, KeyTranslator, TranslatorSnapshot};
use tracing::debug;

pub struct InputSurface {
    translator: KeyTranslator,
    attached: bool,
}

impl InputSurface {
    /// Wraps `translator` in a detached surface.
    pub fn new(translator: KeyTranslator) -> Self {
        Self {
            translator,
            attached: false,
        }
    }

    pub fn attach(&mut self) {
        if !self.attached {
            debug!("input surface attached");
        }
        self.attached = true;
    }

    /// Stops capturing.  Drops any in-progress composition, then releases
    /// every held key.  Safe to call when already detached.
    pub fn detach(&mut self) {
        self.translator.abort_composition();
        self.translator.release_all();
        if self.attached {
            debug!("input surface detached");
        }
        self.attached = false;
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }

    /// Routes one event to the translator.
    ///
    /// While detached the event is ignored and its default is allowed.
    pub fn dispatch(&mut self, event: &InputSurfaceEvent) -> DefaultAction {
        if !self.attached {
            return DefaultAction::Allow;
        }
        self.translator.handle_event(event)
    }

    pub fn snapshot(&self) -> TranslatorSnapshot {
        self.translator.snapshot()
    }

    pub fn translator(&self) -> &KeyTranslator {
        &self.translator
    }

    pub fn translator_mut(&mut self) -> &mut KeyTranslator {
        &mut self.translator
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
