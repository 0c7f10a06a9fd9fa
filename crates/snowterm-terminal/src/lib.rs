//! Scripted terminal engine for Snowterm
//!
//! Provides an append-only buffer of styled lines together with the awaitable
//! operations a scenario script composes: animated typing, spinners, keystroke
//! capture, command gates and idle hints.

pub mod buffer;
pub mod display;
pub mod gate;
pub mod hint;
pub mod input;
pub mod spinner;
pub mod terminal;
pub mod transition;
pub mod typing;

pub use buffer::{Buffer, Color, Line, LineId, Style};
pub use display::{layout_rows, wrap_row, Span};
pub use gate::{Matcher, OnMismatch, PROMPT};
pub use hint::DEFAULT_IDLE_DELAY;
pub use input::{is_printable, Captured, Key, KeySender};
pub use spinner::{Spinner, DEFAULT_SPINNER_INTERVAL, SPINNER_COLOR, SPINNER_FRAMES};
pub use terminal::{Terminal, TerminalSnapshot};
pub use transition::{Completion, CompletionSlot};
pub use typing::DEFAULT_TYPING_DELAY;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TerminalError {
    #[error("Row {row} is out of range (buffer has {len} lines)")]
    RowOutOfRange { row: usize, len: usize },

    #[error("Line {0} no longer exists")]
    LineNotFound(LineId),

    #[error("Keyboard input channel closed")]
    InputClosed,

    #[error("Command rejected: {0:?}")]
    CommandRejected(String),

    #[error("Invalid matcher pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    #[error("Spinner task failed: {0}")]
    SpinnerTaskFailed(String),
}
