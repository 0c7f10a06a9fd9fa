//! Idle hints and flash notices
//!
//! A hint is armed when the script starts waiting on the user. If it is not
//! disarmed before the idle delay elapses, the hint becomes visible and stays
//! until hidden (or until its visible duration runs out). At most one hint is
//! visible at a time.

use std::{
    sync::{Arc, Mutex, PoisonError, Weak},
    time::Duration,
};

use tokio::task::JoinHandle;
use tracing::debug;

use crate::terminal::{Shared, Terminal};

/// Idle time before a hint is shown when the caller does not pick one
pub const DEFAULT_IDLE_DELAY: Duration = Duration::from_secs(5);

/// Timer tasks owned by one terminal
#[derive(Debug, Default)]
pub(crate) struct HintTimers {
    idle: Mutex<Option<JoinHandle<()>>>,
    auto_hide: Mutex<Option<JoinHandle<()>>>,
    flash: Mutex<Option<JoinHandle<()>>>,
}

impl HintTimers {
    fn replace(slot: &Mutex<Option<JoinHandle<()>>>, handle: JoinHandle<()>) {
        let previous = slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(handle);
        if let Some(previous) = previous {
            previous.abort();
        }
    }

    /// Abort the task in `slot`. Returns whether it had not yet finished.
    fn cancel(slot: &Mutex<Option<JoinHandle<()>>>) -> bool {
        let handle = slot.lock().unwrap_or_else(PoisonError::into_inner).take();
        match handle {
            Some(handle) => {
                let pending = !handle.is_finished();
                handle.abort();
                pending
            }
            None => false,
        }
    }

    pub(crate) fn cancel_all(&self) {
        Self::cancel(&self.idle);
        Self::cancel(&self.auto_hide);
        Self::cancel(&self.flash);
    }
}

impl Drop for HintTimers {
    fn drop(&mut self) {
        self.cancel_all();
    }
}

fn upgrade(shared: &Weak<Shared>) -> Option<Terminal> {
    shared.upgrade().map(|shared| Terminal { shared })
}

impl Terminal {
    /// Arm the idle timer. After `idle` the hint `text` is shown, for `visible`
    /// or until hidden when `visible` is `None`. Re-arming replaces a pending
    /// timer; arming while a hint is visible does nothing.
    pub async fn arm_idle_hint(
        &self,
        text: impl Into<String>,
        idle: Duration,
        visible: Option<Duration>,
    ) {
        if self.read(|s| s.hint.is_some()).await {
            debug!("hint already visible, not arming");
            return;
        }

        let text = text.into();
        let weak = Arc::downgrade(&self.shared);
        let task = tokio::spawn(async move {
            tokio::time::sleep(idle).await;
            if let Some(terminal) = upgrade(&weak) {
                terminal.show_hint(text, visible).await;
            }
        });
        HintTimers::replace(&self.shared.hints.idle, task);
    }

    /// Cancel a pending idle timer. Returns whether a timer was still pending.
    pub fn disarm_hint(&self) -> bool {
        HintTimers::cancel(&self.shared.hints.idle)
    }

    /// Dismiss the visible hint, if any
    pub async fn hide_hint(&self) {
        HintTimers::cancel(&self.shared.hints.auto_hide);
        let hidden = self.mutate(|s| s.hint.take()).await;
        if hidden.is_some() {
            debug!("hint hidden");
        }
    }

    /// Show a transient notice for `ttl`, replacing any previous one
    pub async fn flash(&self, text: impl Into<String>, ttl: Duration) {
        let text = text.into();
        self.mutate(|s| s.flash = Some(text)).await;

        let weak = Arc::downgrade(&self.shared);
        let task = tokio::spawn(async move {
            tokio::time::sleep(ttl).await;
            if let Some(terminal) = upgrade(&weak) {
                terminal.mutate(|s| s.flash = None).await;
            }
        });
        HintTimers::replace(&self.shared.hints.flash, task);
    }

    async fn show_hint(&self, text: String, visible: Option<Duration>) {
        let shown = self
            .mutate(|s| {
                if s.hint.is_some() {
                    return false;
                }
                s.hint = Some(text);
                true
            })
            .await;
        if !shown {
            return;
        }
        debug!(?visible, "hint shown");

        if let Some(visible) = visible {
            let weak = Arc::downgrade(&self.shared);
            let task = tokio::spawn(async move {
                tokio::time::sleep(visible).await;
                if let Some(terminal) = upgrade(&weak) {
                    terminal.mutate(|s| s.hint = None).await;
                }
            });
            HintTimers::replace(&self.shared.hints.auto_hide, task);
        }
    }
}
