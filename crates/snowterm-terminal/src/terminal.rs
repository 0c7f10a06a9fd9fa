//! Terminal engine core
//!
//! Owns the line buffer and the presentation flags, and hands out the
//! mutation primitives the animated operations are built from. Every mutation
//! bumps a revision counter so the presentation layer can re-render.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, watch, Mutex, RwLock};
use tracing::debug;

use crate::{
    buffer::{Buffer, Line, LineId, Style},
    hint::HintTimers,
    input::{Key, KeySender},
    transition::CompletionSlot,
    TerminalError,
};

/// Mutable screen state guarded by the terminal
#[derive(Debug, Default)]
pub(crate) struct Screen {
    pub(crate) buffer: Buffer,
    pub(crate) focusable: bool,
    pub(crate) visible: bool,
    pub(crate) hint: Option<String>,
    pub(crate) flash: Option<String>,
}

#[derive(Debug)]
pub(crate) struct Shared {
    pub(crate) screen: RwLock<Screen>,
    pub(crate) revision: watch::Sender<u64>,
    pub(crate) keys: Mutex<mpsc::UnboundedReceiver<Key>>,
    pub(crate) hints: HintTimers,
    pub(crate) transition: CompletionSlot,
}

/// Handle to a scripted terminal instance
///
/// Clones share the same buffer. Operations are applied in the order they
/// are issued; at most one input capture may be in flight at a time.
#[derive(Debug, Clone)]
pub struct Terminal {
    pub(crate) shared: Arc<Shared>,
}

impl Terminal {
    /// Create a new terminal together with the sender that feeds it keystrokes
    pub fn new() -> (Self, KeySender) {
        let (key_tx, key_rx) = mpsc::unbounded_channel();
        let (revision, _) = watch::channel(0);

        let terminal = Self {
            shared: Arc::new(Shared {
                screen: RwLock::new(Screen::default()),
                revision,
                keys: Mutex::new(key_rx),
                hints: HintTimers::default(),
                transition: CompletionSlot::new(),
            }),
        };

        (terminal, KeySender::new(key_tx))
    }

    /// Subscribe to buffer revisions; the value changes on every mutation
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.shared.revision.subscribe()
    }

    /// Copy of everything the presentation layer needs to draw a frame
    pub async fn snapshot(&self) -> TerminalSnapshot {
        let screen = self.shared.screen.read().await;
        TerminalSnapshot {
            lines: screen.buffer.lines().to_vec(),
            focusable: screen.focusable,
            visible: screen.visible,
            hint: screen.hint.clone(),
            flash: screen.flash.clone(),
            revision: *self.shared.revision.borrow(),
        }
    }

    pub(crate) async fn mutate<R>(&self, f: impl FnOnce(&mut Screen) -> R) -> R {
        let result = {
            let mut screen = self.shared.screen.write().await;
            f(&mut screen)
        };
        self.shared.revision.send_modify(|rev| *rev = rev.wrapping_add(1));
        result
    }

    pub(crate) async fn read<R>(&self, f: impl FnOnce(&Screen) -> R) -> R {
        let screen = self.shared.screen.read().await;
        f(&screen)
    }

    pub async fn line_count(&self) -> usize {
        self.read(|s| s.buffer.len()).await
    }

    pub async fn row_of(&self, id: LineId) -> Option<usize> {
        self.read(|s| s.buffer.row_of(id)).await
    }

    /// Append a line instantly
    pub async fn write(&self, text: impl Into<String>, style: Style) -> LineId {
        let text = text.into();
        self.mutate(|s| s.buffer.append(text, style)).await
    }

    /// Append a block-display line instantly
    pub async fn write_line(&self, text: impl Into<String>) -> LineId {
        let text = text.into();
        self.mutate(|s| s.buffer.write_line(text)).await
    }

    pub async fn replace_char_at(
        &self,
        row: usize,
        col: usize,
        ch: char,
    ) -> Result<(), TerminalError> {
        self.mutate(|s| s.buffer.replace_char_at(row, col, ch)).await
    }

    pub async fn replace_char_in(
        &self,
        id: LineId,
        col: usize,
        ch: char,
    ) -> Result<(), TerminalError> {
        self.mutate(|s| s.buffer.replace_char_in(id, col, ch)).await
    }

    pub async fn delete_row(&self, row: usize) -> Result<Line, TerminalError> {
        self.mutate(|s| s.buffer.delete_row(row)).await
    }

    pub async fn delete_line(&self, id: LineId) -> Result<Line, TerminalError> {
        self.mutate(|s| s.buffer.delete_line(id)).await
    }

    /// Remove the last `count` columns of a line
    pub async fn erase_tail(&self, id: LineId, count: usize) -> Result<usize, TerminalError> {
        self.mutate(|s| s.buffer.erase_tail(id, count)).await
    }

    /// Remove `value` from the end of the last line
    pub async fn erase_value(&self, value: &str) -> Result<usize, TerminalError> {
        self.mutate(|s| {
            let len = s.buffer.len();
            let id = s
                .buffer
                .last()
                .map(Line::id)
                .ok_or(TerminalError::RowOutOfRange { row: 0, len })?;
            s.buffer.erase_suffix(id, value)
        })
        .await
    }

    /// Clear all lines
    pub async fn reset(&self) {
        self.mutate(|s| s.buffer.reset()).await;
        debug!("terminal buffer reset");
    }

    /// Make the terminal visible and wait until the front end reports the
    /// transition finished
    pub async fn show(&self) {
        self.set_visible(true).await;
    }

    /// Hide the terminal and wait until the front end reports the transition
    /// finished
    pub async fn hide(&self) {
        self.set_visible(false).await;
    }

    /// Called by the presentation layer once a show/hide transition is done
    pub fn transition_finished(&self) -> bool {
        self.shared.transition.complete()
    }

    /// Whether a show/hide call is waiting on the front end
    pub fn transition_pending(&self) -> bool {
        self.shared.transition.is_armed()
    }

    async fn set_visible(&self, visible: bool) {
        let completion = self.shared.transition.arm();
        self.mutate(|s| s.visible = visible).await;
        if !completion.wait().await {
            debug!("visibility transition abandoned");
        }
    }

    /// Tear down timers and notices owned by this terminal
    pub async fn shutdown(&self) {
        self.shared.hints.cancel_all();
        self.mutate(|s| {
            s.hint = None;
            s.flash = None;
            s.focusable = false;
        })
        .await;
    }
}

/// Snapshot of terminal state handed across the render boundary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TerminalSnapshot {
    pub lines: Vec<Line>,
    pub focusable: bool,
    pub visible: bool,
    pub hint: Option<String>,
    pub flash: Option<String>,
    pub revision: u64,
}

impl TerminalSnapshot {
    pub fn texts(&self) -> Vec<&str> {
        self.lines.iter().map(Line::text).collect()
    }

    pub fn last_text(&self) -> &str {
        self.lines.last().map(Line::text).unwrap_or_default()
    }
}
