//! Spinner controller
//!
//! A spinner overwrites one cell of a line on a fixed interval until it is
//! disposed, then writes a final glyph into the same cell.

use std::time::Duration;

use tokio::{
    sync::oneshot,
    task::JoinHandle,
    time::{interval_at, Instant, MissedTickBehavior},
};
use tracing::{debug, warn};

use crate::{
    buffer::{Color, LineId, Style},
    terminal::Terminal,
    TerminalError,
};

/// Braille rotation, one glyph per tick
pub const SPINNER_FRAMES: [char; 10] = ['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];

/// Color applied to the spinner's line while it runs
pub const SPINNER_COLOR: Color = Color::Rgb(255, 165, 0);

pub const DEFAULT_SPINNER_INTERVAL: Duration = Duration::from_millis(100);

/// Running spinner. Dropping it stops the ticks but skips the final overwrite;
/// call [`Spinner::dispose`] to place the final glyph.
#[must_use = "a spinner must be disposed to place its final glyph"]
#[derive(Debug)]
pub struct Spinner {
    terminal: Terminal,
    line: LineId,
    col: usize,
    style: Style,
    shutdown: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl Spinner {
    pub fn line(&self) -> LineId {
        self.line
    }

    /// Stop ticking and write `final_glyph` into the spinner cell. The line's
    /// original style is restored.
    pub async fn dispose(mut self, final_glyph: char) -> Result<(), TerminalError> {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        if let Some(task) = self.task.take() {
            task.await
                .map_err(|e| TerminalError::SpinnerTaskFailed(e.to_string()))?;
        }

        let (line, col, style) = (self.line, self.col, self.style);
        self.terminal
            .mutate(|s| {
                s.buffer.replace_char_in(line, col, final_glyph)?;
                s.buffer.set_style(line, style)
            })
            .await?;

        debug!(line = %line, col, glyph = %final_glyph, "spinner disposed");
        Ok(())
    }
}

impl Drop for Spinner {
    fn drop(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
    }
}

impl Terminal {
    /// Start a spinner on column `col` of the line behind `line`
    pub async fn start_spinner(
        &self,
        line: LineId,
        col: usize,
        interval: Duration,
    ) -> Result<Spinner, TerminalError> {
        let style = self
            .read(|s| s.buffer.get(line).map(|l| l.style()))
            .await
            .ok_or(TerminalError::LineNotFound(line))?;

        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let task = tokio::spawn(spin(self.clone(), line, col, interval, shutdown_rx));

        debug!(line = %line, col, "spinner started");
        Ok(Spinner {
            terminal: self.clone(),
            line,
            col,
            style,
            shutdown: Some(shutdown_tx),
            task: Some(task),
        })
    }

    /// Start a spinner on the line currently at `row`. The row is resolved
    /// once; the spinner keeps following that line if earlier rows are deleted.
    pub async fn start_spinner_at(
        &self,
        row: usize,
        col: usize,
        interval: Duration,
    ) -> Result<Spinner, TerminalError> {
        let line = self
            .read(|s| {
                s.buffer
                    .line(row)
                    .map(|l| l.id())
                    .ok_or(TerminalError::RowOutOfRange { row, len: s.buffer.len() })
            })
            .await?;
        self.start_spinner(line, col, interval).await
    }
}

async fn spin(
    terminal: Terminal,
    line: LineId,
    col: usize,
    period: Duration,
    mut shutdown: oneshot::Receiver<()>,
) {
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut frame = 0usize;

    loop {
        tokio::select! {
            biased;

            _ = &mut shutdown => break,

            _ = ticker.tick() => {
                let glyph = SPINNER_FRAMES[frame % SPINNER_FRAMES.len()];
                let result = terminal
                    .mutate(|s| {
                        s.buffer.replace_char_in(line, col, glyph)?;
                        let style = s.buffer.get(line).map(|l| l.style()).unwrap_or_default();
                        s.buffer.set_style(line, style.with_color(SPINNER_COLOR))
                    })
                    .await;

                if let Err(e) = result {
                    warn!(line = %line, "spinner stopped: {}", e);
                    break;
                }
                frame = frame.wrapping_add(1);
            }
        }
    }
}
