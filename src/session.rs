//! Session registry
//!
//! An explicit, injectable record of which checkout sessions have been
//! seen. The tracker owns one and feeds it on every tracked event; it can
//! also be used standalone by callers that observe sessions from other
//! sources. No global state: two trackers have two independent registries.

use parking_lot::RwLock;
use rustc_hash::FxHashSet;

/// Thread-safe set of observed session ids.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    seen: RwLock<FxHashSet<String>>,
}

impl SessionRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a session id. Returns `true` the first time it is seen.
    pub fn observe(&self, session_id: &str) -> bool {
        let mut seen = self.seen.write();
        if seen.contains(session_id) {
            return false;
        }
        seen.insert(session_id.to_string())
    }

    /// Check whether a session has been observed.
    pub fn contains(&self, session_id: &str) -> bool {
        self.seen.read().contains(session_id)
    }

    /// All observed session ids, sorted.
    pub fn sessions(&self) -> Vec<String> {
        let mut sessions: Vec<String> = self.seen.read().iter().cloned().collect();
        sessions.sort();
        sessions
    }

    /// Number of observed sessions.
    pub fn len(&self) -> usize {
        self.seen.read().len()
    }

    /// Check if no session has been observed.
    pub fn is_empty(&self) -> bool {
        self.seen.read().is_empty()
    }

    /// Forget every observed session.
    pub fn reset(&self) {
        self.seen.write().clear();
    }
}
