//! RAII guard for the screen while the card is playing

use anyhow::{Context, Result};
use crossterm::{cursor, execute, terminal};
use std::io;

/// Owns raw mode and the alternate screen. Dropping the guard restores the
/// user's terminal even when the card exits through an error.
pub struct TerminalGuard {
    raw_mode_enabled: bool,
    alternate_screen: bool,
    // Marker to ensure this type is !Send and !Sync
    _marker: std::marker::PhantomData<*const ()>,
}

impl TerminalGuard {
    /// Switch to raw mode on the alternate screen with the cursor hidden
    pub fn acquire() -> Result<Self> {
        let mut guard = Self {
            raw_mode_enabled: false,
            alternate_screen: false,
            _marker: std::marker::PhantomData,
        };

        terminal::enable_raw_mode().context("Failed to enable raw mode")?;
        guard.raw_mode_enabled = true;

        execute!(io::stdout(), terminal::EnterAlternateScreen, cursor::Hide)
            .context("Failed to enter the alternate screen")?;
        guard.alternate_screen = true;

        Ok(guard)
    }

    /// Check if raw mode is currently enabled
    pub fn is_raw_mode(&self) -> bool {
        self.raw_mode_enabled
    }

    /// Restore the terminal now instead of on drop
    pub fn release(&mut self) -> Result<()> {
        if self.alternate_screen {
            execute!(io::stdout(), cursor::Show, terminal::LeaveAlternateScreen)?;
            self.alternate_screen = false;
        }
        if self.raw_mode_enabled {
            terminal::disable_raw_mode()?;
            self.raw_mode_enabled = false;
        }
        Ok(())
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        // Always try to restore terminal state
        if self.alternate_screen {
            let _ = execute!(io::stdout(), cursor::Show, terminal::LeaveAlternateScreen);
        }
        if self.raw_mode_enabled {
            let _ = terminal::disable_raw_mode();
        }
    }
}
