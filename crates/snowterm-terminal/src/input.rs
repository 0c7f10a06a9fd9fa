//! Keystroke capture
//!
//! While a capture session runs the terminal is focusable: every accepted key
//! is applied to a pending input and echoed into the last line. Enter commits.

use tokio::sync::mpsc;
use tracing::{debug, trace};
use unicode_segmentation::UnicodeSegmentation;

use crate::{
    buffer::{Line, LineId, Style},
    terminal::Terminal,
    TerminalError,
};

/// Key event as seen by the terminal engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Char(char),
    Backspace,
    Enter,
    /// Any key the engine ignores (arrows, function keys, ...)
    Other,
}

/// Printable ASCII plus everything from U+00A0 upwards
pub fn is_printable(c: char) -> bool {
    ('\u{20}'..='\u{7e}').contains(&c) || c >= '\u{a0}'
}

/// Feeds keystrokes into a [`Terminal`]
#[derive(Debug, Clone)]
pub struct KeySender {
    tx: mpsc::UnboundedSender<Key>,
}

impl KeySender {
    pub(crate) fn new(tx: mpsc::UnboundedSender<Key>) -> Self {
        Self { tx }
    }

    pub fn send(&self, key: Key) -> Result<(), TerminalError> {
        self.tx.send(key).map_err(|_| TerminalError::InputClosed)
    }

    /// Send every character of `text` as a key press
    pub fn type_str(&self, text: &str) -> Result<(), TerminalError> {
        text.chars().try_for_each(|c| self.send(Key::Char(c)))
    }

    /// Type `text` and press Enter
    pub fn submit(&self, text: &str) -> Result<(), TerminalError> {
        self.type_str(text)?;
        self.send(Key::Enter)
    }
}

/// A committed input together with the line it was echoed into
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Captured {
    pub input: String,
    line: LineId,
    /// Text the line held before the first keystroke
    prefix: String,
}

impl Terminal {
    /// Capture one line of input, echoing into the last line of the buffer.
    ///
    /// Only one capture may run per terminal at a time; a second concurrent
    /// capture waits for the first to commit.
    pub async fn capture_input(&self) -> Result<String, TerminalError> {
        Ok(self.capture().await?.input)
    }

    /// Put the echo line of a committed capture back to its prefix
    pub async fn rollback_input(&self, captured: &Captured) -> Result<(), TerminalError> {
        let prefix = captured.prefix.clone();
        self.mutate(|s| s.buffer.set_text(captured.line, prefix)).await
    }

    /// Like [`Terminal::capture_input`], keeping the echo line and prefix
    pub async fn capture(&self) -> Result<Captured, TerminalError> {
        let mut keys = self.shared.keys.lock().await;

        let (target, prefix) = self
            .mutate(|s| {
                s.focusable = true;
                let id = match s.buffer.last().map(Line::id) {
                    Some(id) => id,
                    None => s.buffer.append("", Style::default()),
                };
                let prefix = s
                    .buffer
                    .get(id)
                    .map(|l| l.text().to_owned())
                    .unwrap_or_default();
                (id, prefix)
            })
            .await;

        let mut input = String::new();
        let committed = loop {
            let Some(key) = keys.recv().await else {
                break Err(TerminalError::InputClosed);
            };

            match key {
                Key::Enter => break Ok(()),
                Key::Backspace => match input.grapheme_indices(true).next_back() {
                    Some((idx, _)) => input.truncate(idx),
                    None => continue,
                },
                Key::Char(c) if is_printable(c) => input.push(c),
                Key::Char(_) | Key::Other => continue,
            }

            trace!(line = %target, "echo {:?}", input);
            let echoed = format!("{prefix}{input}");
            if let Err(e) = self.mutate(|s| s.buffer.set_text(target, echoed)).await {
                break Err(e);
            }
        };

        self.mutate(|s| s.focusable = false).await;
        committed?;

        debug!("input committed: {:?}", input);
        Ok(Captured {
            input,
            line: target,
            prefix,
        })
    }
}
