use std::collections::HashSet;

use parking_lot::RwLock;
use uuid::Uuid;

/// Subjects that turned their sounds off.
#[derive(Debug, Default)]
pub struct SoundToggles {
    disabled: RwLock<HashSet<Uuid>>,
}

impl SoundToggles {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_enabled(&self, subject: Uuid) -> bool {
        !self.disabled.read().contains(&subject)
    }

    pub fn set(&self, subject: Uuid, enabled: bool) {
        let mut disabled = self.disabled.write();
        if enabled {
            disabled.remove(&subject);
        } else {
            disabled.insert(subject);
        }
    }

    /// Flip the subject's setting and return the new state.
    pub fn toggle(&self, subject: Uuid) -> bool {
        let mut disabled = self.disabled.write();
        if disabled.remove(&subject) {
            true
        } else {
            disabled.insert(subject);
            false
        }
    }
}
