use anyhow::Result;
use snowterm_terminal::{Key, KeySender, Terminal};
use std::time::Duration;
use tokio::task::JoinHandle;

/// Types scripted answers into a terminal
#[derive(Debug, Clone)]
pub struct KeyFeeder {
    sender: KeySender,
}

impl KeyFeeder {
    pub fn new(sender: KeySender) -> Self {
        Self { sender }
    }

    /// Type every answer followed by Enter
    pub fn submit_all(&self, answers: &[&str]) -> Result<()> {
        for answer in answers {
            self.sender.submit(answer)?;
        }
        Ok(())
    }

    pub fn submit(&self, answer: &str) -> Result<()> {
        self.sender.submit(answer)?;
        Ok(())
    }

    pub fn type_str(&self, text: &str) -> Result<()> {
        self.sender.type_str(text)?;
        Ok(())
    }

    pub fn backspace(&self, times: usize) -> Result<()> {
        for _ in 0..times {
            self.sender.send(Key::Backspace)?;
        }
        Ok(())
    }

    pub fn enter(&self) -> Result<()> {
        self.sender.send(Key::Enter)?;
        Ok(())
    }
}

/// Stand in for a front end: complete every show/hide transition shortly
/// after it starts
pub fn auto_complete_transitions(terminal: Terminal) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            tokio::time::sleep(Duration::from_millis(10)).await;
            terminal.transition_finished();
        }
    })
}
