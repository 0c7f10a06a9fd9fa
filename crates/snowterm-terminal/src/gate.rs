//! Command gate
//!
//! Repeats input capture until the captured value satisfies a matcher.

use std::time::Duration;

use regex::{Regex, RegexBuilder};
use tracing::debug;

use crate::{buffer::Style, terminal::Terminal, TerminalError};

/// Shell prompt written after a rejected command
pub const PROMPT: &str = "$ ";

/// Pause after a denied input before capturing again
const DENY_SETTLE: Duration = Duration::from_millis(10);

/// Acceptance predicate for a command gate
#[derive(Debug, Clone)]
pub enum Matcher {
    /// Exact string equality
    Exact(String),
    /// Equality with any entry of a fixed table
    OneOf(Vec<String>),
    /// Full match of a compiled pattern
    Pattern(Regex),
}

impl Matcher {
    pub fn exact(command: impl Into<String>) -> Self {
        Self::Exact(command.into())
    }

    pub fn one_of<I, S>(accepted: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::OneOf(accepted.into_iter().map(Into::into).collect())
    }

    /// Case-sensitive pattern that must match the whole input
    pub fn pattern(pattern: &str) -> Result<Self, TerminalError> {
        Self::build(pattern, false)
    }

    /// Case-insensitive pattern that must match the whole input
    pub fn phrase(pattern: &str) -> Result<Self, TerminalError> {
        Self::build(pattern, true)
    }

    fn build(pattern: &str, case_insensitive: bool) -> Result<Self, TerminalError> {
        let regex = RegexBuilder::new(&format!("^(?:{pattern})$"))
            .case_insensitive(case_insensitive)
            .build()?;
        Ok(Self::Pattern(regex))
    }

    pub fn matches(&self, input: &str) -> bool {
        match self {
            Self::Exact(expected) => input == expected,
            Self::OneOf(accepted) => accepted.iter().any(|a| a == input),
            Self::Pattern(regex) => regex.is_match(input),
        }
    }
}

/// What the gate does with a rejected input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OnMismatch {
    /// Print `<input>: command not found` and a fresh prompt
    #[default]
    CommandNotFound,
    /// Silently erase the rejected characters so the user retypes in place
    EraseInPlace,
    /// Flash `notice` for `ttl`, then erase in place
    Deny { notice: &'static str, ttl: Duration },
    /// Give up on the first rejection with [`TerminalError::CommandRejected`]
    Reject,
}

impl Terminal {
    /// Capture input until it satisfies `matcher`, returning the accepted input
    pub async fn wait_for_command(
        &self,
        matcher: &Matcher,
        on_mismatch: OnMismatch,
    ) -> Result<String, TerminalError> {
        let mut attempts = 0usize;

        loop {
            let captured = self.capture().await?;
            attempts += 1;

            if matcher.matches(&captured.input) {
                debug!(attempts, "command accepted");
                return Ok(captured.input);
            }

            debug!(attempts, ?on_mismatch, "command rejected: {:?}", captured.input);
            match on_mismatch {
                OnMismatch::CommandNotFound => {
                    let error = format!("{}: command not found", captured.input);
                    self.mutate(|s| {
                        s.buffer.append(error, Style::default());
                        s.buffer.write_line("\u{a0}");
                        s.buffer.write_line(PROMPT);
                    })
                    .await;
                }
                OnMismatch::EraseInPlace => self.rollback_input(&captured).await?,
                OnMismatch::Deny { notice, ttl } => {
                    self.flash(notice, ttl).await;
                    self.rollback_input(&captured).await?;
                    tokio::time::sleep(DENY_SETTLE).await;
                }
                OnMismatch::Reject => {
                    return Err(TerminalError::CommandRejected(captured.input));
                }
            }
        }
    }
}
