use std::sync::{Mutex, MutexGuard};

/// Single-slot holder for the latest reply. A newer reply replaces an
/// unread one; a successful take empties the slot.
#[derive(Debug, Default)]
pub struct ReplyMailbox {
    slot: Mutex<Option<String>>,
}

impl ReplyMailbox {
    pub fn set(&self, message: String) {
        *self.slot() = Some(message);
    }

    pub fn take_if_present(&self) -> Option<String> {
        self.slot().take()
    }

    fn slot(&self) -> MutexGuard<'_, Option<String>> {
        // Poisoning carries no meaning for a plain Option.
        self.slot
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
