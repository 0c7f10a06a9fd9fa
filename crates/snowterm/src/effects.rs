//! Side effects the scenario fires outside the terminal
//!
//! The scenario only sees the [`Effects`] trait; the card wires it to the
//! shared [`Stage`] the renderer draws from.

use anyhow::Result;
use async_trait::async_trait;
use snowterm_terminal::CompletionSlot;
use std::sync::Arc;
use tokio::{sync::RwLock, time::Instant};
use tracing::{debug, info};

use crate::{
    config::CardConfig,
    epilogue::{Epilogue, EPILOGUE_ROWS, EPILOGUE_STEP},
    snowfall::Snowfall,
};

#[async_trait]
pub trait Effects: Send + Sync {
    /// Fade out the loading screen
    async fn hide_loader(&self);

    /// Start the snowfall behind the terminal
    async fn start_snow(&self);

    /// Start the music. Never fails and never blocks the script.
    async fn play_music(&self);

    /// Show the scrolling epilogue and wait until it has run through
    async fn run_epilogue(&self) -> Result<()>;
}

/// Everything drawn around the terminal
#[derive(Debug)]
pub struct Stage {
    pub loading: bool,
    pub snowfall: Option<Snowfall>,
    pub music: bool,
    /// Bell not yet written to the screen
    pub bell_pending: bool,
    pub epilogue: Option<Epilogue>,
    pub width: u16,
    pub height: u16,
}

impl Stage {
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            loading: true,
            snowfall: None,
            music: false,
            bell_pending: false,
            epilogue: None,
            width,
            height,
        }
    }

    pub fn resize(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
        if let Some(snowfall) = &mut self.snowfall {
            snowfall.resize(width, height);
        }
    }
}

/// [`Effects`] backed by the shared stage
#[derive(Debug, Clone)]
pub struct StageEffects {
    stage: Arc<RwLock<Stage>>,
    epilogue_done: Arc<CompletionSlot>,
    config: CardConfig,
}

impl StageEffects {
    pub fn new(
        stage: Arc<RwLock<Stage>>,
        epilogue_done: Arc<CompletionSlot>,
        config: CardConfig,
    ) -> Self {
        Self {
            stage,
            epilogue_done,
            config,
        }
    }
}

#[async_trait]
impl Effects for StageEffects {
    async fn hide_loader(&self) {
        self.stage.write().await.loading = false;
        debug!("loader hidden");
    }

    async fn start_snow(&self) {
        if !self.config.snow {
            debug!("snowfall disabled");
            return;
        }
        let mut stage = self.stage.write().await;
        let (width, height) = (stage.width, stage.height);
        stage.snowfall = Some(Snowfall::new(width, height));
        info!("snowfall started");
    }

    async fn play_music(&self) {
        if !self.config.music {
            debug!("music disabled");
            return;
        }
        let mut stage = self.stage.write().await;
        stage.music = true;
        stage.bell_pending = true;
        info!("music cue played");
    }

    async fn run_epilogue(&self) -> Result<()> {
        let done = self.epilogue_done.arm();
        let step = self.config.pace.scale(EPILOGUE_STEP);
        let epilogue = Epilogue::new(EPILOGUE_ROWS, step, Instant::now());
        self.stage.write().await.epilogue = Some(epilogue);
        info!("epilogue started");

        let finished = done.wait().await;
        self.stage.write().await.epilogue = None;
        if !finished {
            anyhow::bail!("Epilogue was abandoned before it finished");
        }
        Ok(())
    }
}
