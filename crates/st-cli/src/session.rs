//! Recorded session state for replay.
//!
//! A live client would implement [`SessionView`] against the host engine;
//! during replay the same surface is backed by the most recent
//! session-state record from the log, shared between the record loop and
//! the tracker.

use std::cell::RefCell;
use std::rc::Rc;

use serde::Deserialize;

use st_core::{OpenContainer, ProfileId, SessionView};

/// One session-state record from a captured log.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SessionState {
    #[serde(default)]
    pub profile_id: Option<String>,
    #[serde(default)]
    pub map: Option<String>,
    #[serde(default)]
    pub on_own_island: bool,
    #[serde(default = "default_true")]
    pub export_enabled: bool,
    #[serde(default = "default_true")]
    pub exporting: bool,
    #[serde(default = "default_true")]
    pub always_export: bool,
    #[serde(default)]
    pub open_container: Option<OpenContainer>,
}

const fn default_true() -> bool {
    true
}

/// Shared, replaceable session state implementing [`SessionView`].
///
/// Replay is single-threaded; the tracker holds one clone and the record
/// loop another.
#[derive(Debug, Clone, Default)]
pub struct SharedSession {
    state: Rc<RefCell<SessionState>>,
}

impl SharedSession {
    /// Replaces the whole session state with a new record.
    pub fn replace(&self, state: SessionState) {
        *self.state.borrow_mut() = state;
    }
}

impl SessionView for SharedSession {
    fn profile_id(&self) -> Option<ProfileId> {
        self.state
            .borrow()
            .profile_id
            .as_deref()
            .and_then(|id| ProfileId::new(id).ok())
    }

    fn last_map(&self) -> Option<String> {
        self.state.borrow().map.clone()
    }

    fn on_own_island(&self) -> bool {
        self.state.borrow().on_own_island
    }

    fn open_container(&self) -> Option<OpenContainer> {
        self.state.borrow().open_container.clone()
    }

    fn export_enabled(&self) -> bool {
        self.state.borrow().export_enabled
    }

    fn is_exporting(&self) -> bool {
        self.state.borrow().exporting
    }

    fn always_export(&self) -> bool {
        self.state.borrow().always_export
    }
}
