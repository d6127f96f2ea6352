//! Live policy state owned by the settings UI.

use std::sync::{Arc, RwLock};

use super::flags::PolicyFlags;

/// The settings UI's current view of the policy.
///
/// The orchestrator reads it on every trigger, so edits take effect on the
/// next focus event without a notification channel, and flushes it to the
/// [`PolicyStore`](super::PolicyStore) at the query-close checkpoint.
pub trait PolicySource: Send + Sync {
    /// Current flags, or `None` if the UI state is unavailable.
    fn snapshot(&self) -> Option<PolicyFlags>;

    /// Replace the UI state (used at startup with the stored values).
    fn publish(&self, flags: PolicyFlags);
}

impl PolicySource for Arc<dyn PolicySource> {
    fn snapshot(&self) -> Option<PolicyFlags> {
        (**self).snapshot()
    }

    fn publish(&self, flags: PolicyFlags) {
        (**self).publish(flags);
    }
}

/// A [`PolicySource`] shared between the orchestrator and a settings UI.
///
/// Cloning shares the same cell.
#[derive(Clone, Debug, Default)]
pub struct SharedPolicy {
    current: Arc<RwLock<Option<PolicyFlags>>>,
}

impl SharedPolicy {
    /// Create an empty cell; [`PolicySource::snapshot`] yields `None`
    /// until something is published.
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply an edit from the UI.
    pub fn update(&self, edit: impl FnOnce(&mut PolicyFlags)) {
        if let Ok(mut guard) = self.current.write() {
            let flags = guard.get_or_insert_with(PolicyFlags::default);
            edit(flags);
        }
    }

    /// Drop the UI state, as when the options page is torn down.
    pub fn clear(&self) {
        if let Ok(mut guard) = self.current.write() {
            *guard = None;
        }
    }
}

impl PolicySource for SharedPolicy {
    fn snapshot(&self) -> Option<PolicyFlags> {
        self.current.read().ok().and_then(|g| g.clone())
    }

    fn publish(&self, flags: PolicyFlags) {
        if let Ok(mut guard) = self.current.write() {
            *guard = Some(flags);
        }
    }
}
