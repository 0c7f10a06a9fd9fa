//! Animated typing
//!
//! Reveals a string into a fresh line one grapheme cluster per tick.

use std::time::Duration;

use tracing::trace;
use unicode_segmentation::UnicodeSegmentation;

use crate::{
    buffer::{LineId, Style},
    terminal::Terminal,
    TerminalError,
};

/// Delay between revealed units when the caller does not pick one
pub const DEFAULT_TYPING_DELAY: Duration = Duration::from_millis(40);

/// Split text into the units the animator reveals
pub fn units(text: &str) -> impl DoubleEndedIterator<Item = &str> {
    text.graphemes(true)
}

impl Terminal {
    /// Append a new line with `style` and reveal `text` into it, one unit every
    /// `delay`. Resolves after the last unit has been written.
    pub async fn type_text(
        &self,
        text: &str,
        style: Style,
        delay: Duration,
    ) -> Result<LineId, TerminalError> {
        let id = self.write("", style).await;
        trace!(line = %id, len = text.len(), "typing");

        for unit in units(text) {
            tokio::time::sleep(delay).await;
            self.mutate(|s| s.buffer.push_str(id, unit)).await?;
        }

        Ok(id)
    }

    /// Type an unstyled inline line at the default pace
    pub async fn type_line(&self, text: &str) -> Result<LineId, TerminalError> {
        self.type_text(text, Style::default(), DEFAULT_TYPING_DELAY).await
    }
}
