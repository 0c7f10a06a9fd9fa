//! Single-slot completion signals
//!
//! An operation that triggers a visual change arms the slot and waits; the
//! render layer completes it once the change has finished animating.

use std::sync::{Mutex, PoisonError};

use tokio::sync::oneshot;

/// Slot holding at most one pending waiter
#[derive(Debug, Default)]
pub struct CompletionSlot {
    waiter: Mutex<Option<oneshot::Sender<()>>>,
}

impl CompletionSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm the slot. A previously armed waiter is abandoned.
    pub fn arm(&self) -> Completion {
        let (tx, rx) = oneshot::channel();
        *self.waiter.lock().unwrap_or_else(PoisonError::into_inner) = Some(tx);
        Completion { rx }
    }

    /// Resolve the pending waiter, if any. Returns whether one was waiting.
    pub fn complete(&self) -> bool {
        let waiter = self
            .waiter
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        match waiter {
            Some(tx) => tx.send(()).is_ok(),
            None => false,
        }
    }

    pub fn is_armed(&self) -> bool {
        self.waiter
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }
}

/// Pending side of a [`CompletionSlot`]
#[derive(Debug)]
pub struct Completion {
    rx: oneshot::Receiver<()>,
}

impl Completion {
    /// Wait for the slot to be completed. Returns `false` if the slot was
    /// re-armed or dropped instead.
    pub async fn wait(self) -> bool {
        self.rx.await.is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_complete_resolves_waiter_once() {
        let slot = CompletionSlot::new();
        let completion = slot.arm();

        assert!(slot.complete());
        assert!(!slot.complete());
        assert!(completion.wait().await);
    }

    #[tokio::test]
    async fn test_rearm_abandons_previous_waiter() {
        let slot = CompletionSlot::new();
        let first = slot.arm();
        let second = slot.arm();

        assert!(slot.complete());
        assert!(!first.wait().await);
        assert!(second.wait().await);
    }

    #[test]
    fn test_complete_without_waiter_is_noop() {
        let slot = CompletionSlot::new();
        assert!(!slot.is_armed());
        assert!(!slot.complete());
    }
}
