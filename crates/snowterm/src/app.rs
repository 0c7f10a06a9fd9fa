//! Card event loop
//!
//! Owns the screen: reads crossterm events on a blocking thread, forwards
//! keystrokes to the terminal while it accepts input, and redraws on every
//! buffer revision and on a frame tick for the animations.

use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    terminal,
};
use snowterm_terminal::{CompletionSlot, Key, KeySender, Terminal, TerminalSnapshot};
use std::{io, sync::Arc, time::Duration};
use tokio::{
    sync::{broadcast, mpsc, RwLock},
    task::JoinHandle,
    time::{self, Instant},
};
use tracing::{debug, info, warn};

use crate::{
    config::CardConfig,
    effects::{Stage, StageEffects},
    render::{Renderer, Scene, CARET_BLINK},
    scenario::{self, ScenarioOutcome},
    terminal_guard::TerminalGuard,
};

/// Redraw period for snowfall, spinners and the epilogue
const FRAME_INTERVAL: Duration = Duration::from_millis(50);

/// Duration of the show/hide fade
const FADE: Duration = Duration::from_millis(300);

/// What the loop should do after an input event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Continue,
    Quit,
}

/// Routes one key press. Keys reach the terminal only while it accepts input;
/// otherwise navigation keys scroll and Space holds the epilogue.
pub fn route_key<W: io::Write>(
    key: KeyEvent,
    snapshot: &TerminalSnapshot,
    stage: &mut Stage,
    renderer: &mut Renderer<W>,
    keys: &KeySender,
    now: Instant,
) -> Control {
    if key.kind == KeyEventKind::Release {
        return Control::Continue;
    }
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Control::Quit;
    }

    if let Some(epilogue) = &mut stage.epilogue {
        if key.code == KeyCode::Char(' ') {
            epilogue.hold(now);
        }
        return Control::Continue;
    }

    if snapshot.focusable {
        let forwarded = match key.code {
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => Key::Char(c),
            KeyCode::Enter => Key::Enter,
            KeyCode::Backspace => Key::Backspace,
            _ => Key::Other,
        };
        if keys.send(forwarded).is_err() {
            warn!("terminal stopped accepting keys");
        }
        return Control::Continue;
    }

    match key.code {
        KeyCode::Up => renderer.scroll(-1, now),
        KeyCode::Down => renderer.scroll(1, now),
        KeyCode::PageUp => renderer.scroll(-renderer.page(), now),
        KeyCode::PageDown => renderer.scroll(renderer.page(), now),
        _ => {}
    }
    Control::Continue
}

/// Play the card until it finishes or the user quits
pub async fn run(config: CardConfig) -> Result<Option<ScenarioOutcome>> {
    let (width, height) = terminal::size().context("Failed to read the screen size")?;
    let (term, keys) = Terminal::new();
    let stage = Arc::new(RwLock::new(Stage::new(width, height)));
    let epilogue_done = Arc::new(CompletionSlot::new());
    let effects = StageEffects::new(stage.clone(), epilogue_done.clone(), config.clone());

    let mut guard = TerminalGuard::acquire()?;
    let mut renderer = Renderer::new(io::stdout(), width, height);

    // Input thread, as crossterm polling blocks
    let (input_tx, mut input_rx) = mpsc::unbounded_channel::<Event>();
    let (shutdown_tx, _shutdown_rx) = broadcast::channel::<()>(1);
    let input_handle = tokio::task::spawn_blocking({
        let mut shutdown_rx = shutdown_tx.subscribe();
        move || loop {
            if shutdown_rx.try_recv().is_ok() {
                break;
            }
            if event::poll(Duration::from_millis(100)).unwrap_or(false) {
                match event::read() {
                    Ok(event) => {
                        if input_tx.send(event).is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        warn!("failed to read terminal event: {}", e);
                        break;
                    }
                }
            }
        }
    });

    let scenario: JoinHandle<Result<ScenarioOutcome>> = tokio::spawn({
        let term = term.clone();
        async move { scenario::run(&term, &effects, &config).await }
    });
    let scenario_abort = scenario.abort_handle();

    let result = event_loop(
        &term,
        &keys,
        &stage,
        &epilogue_done,
        &mut renderer,
        &mut input_rx,
        scenario,
    )
    .await;

    scenario_abort.abort();
    let _ = shutdown_tx.send(());
    let _ = input_handle.await;
    term.shutdown().await;
    guard.release()?;

    result
}

async fn event_loop<W: io::Write>(
    term: &Terminal,
    keys: &KeySender,
    stage: &RwLock<Stage>,
    epilogue_done: &CompletionSlot,
    renderer: &mut Renderer<W>,
    input_rx: &mut mpsc::UnboundedReceiver<Event>,
    mut scenario: JoinHandle<Result<ScenarioOutcome>>,
) -> Result<Option<ScenarioOutcome>> {
    let mut revisions = term.subscribe();
    let mut frame_tick = time::interval(FRAME_INTERVAL);
    let started = Instant::now();
    let mut last_frame = started;
    let mut fade_until: Option<Instant> = None;
    let mut finished: Option<ScenarioOutcome> = None;

    loop {
        tokio::select! {
            Some(event) = input_rx.recv() => {
                let now = Instant::now();
                match event {
                    Event::Key(key) => {
                        // A locked card stays on screen until any key
                        if finished.is_some() && key.kind != KeyEventKind::Release {
                            return Ok(finished);
                        }
                        let snapshot = term.snapshot().await;
                        let mut stage = stage.write().await;
                        let control = route_key(key, &snapshot, &mut stage, renderer, keys, now);
                        if control == Control::Quit {
                            info!("quit requested");
                            return Ok(None);
                        }
                    }
                    Event::Resize(width, height) => {
                        debug!(width, height, "resized");
                        renderer.resize(width, height);
                        stage.write().await.resize(width, height);
                    }
                    _ => {}
                }
                draw(term, stage, renderer, started, now).await?;
            }

            result = &mut scenario, if finished.is_none() => {
                let outcome = result.context("Scenario task failed")??;
                info!(?outcome, "scenario ended");
                if outcome == ScenarioOutcome::Completed {
                    return Ok(Some(outcome));
                }
                finished = Some(outcome);
            }

            changed = revisions.changed() => {
                if changed.is_err() {
                    return Ok(finished);
                }
                draw(term, stage, renderer, started, Instant::now()).await?;
            }

            _ = frame_tick.tick() => {
                let now = Instant::now();
                let dt = now.duration_since(last_frame).as_secs_f32();
                last_frame = now;

                {
                    let mut stage = stage.write().await;
                    let height = stage.height.saturating_sub(1);
                    if let Some(snowfall) = &mut stage.snowfall {
                        snowfall.step(dt);
                    }
                    if let Some(epilogue) = &mut stage.epilogue {
                        epilogue.advance(now);
                        if epilogue.is_finished(height) {
                            epilogue_done.complete();
                        }
                    }
                }

                // Show/hide resolve once the fade has run
                match fade_until {
                    Some(until) if now >= until => {
                        term.transition_finished();
                        fade_until = None;
                    }
                    None if term.transition_pending() => fade_until = Some(now + FADE),
                    _ => {}
                }

                draw(term, stage, renderer, started, now).await?;
            }
        }
    }
}

async fn draw<W: io::Write>(
    term: &Terminal,
    stage: &RwLock<Stage>,
    renderer: &mut Renderer<W>,
    started: Instant,
    now: Instant,
) -> Result<()> {
    let snapshot = term.snapshot().await;
    let mut stage = stage.write().await;
    let bell = std::mem::take(&mut stage.bell_pending);
    let caret_on = (now.duration_since(started).as_millis() / CARET_BLINK.as_millis()) % 2 == 0;

    let frame = renderer.compose(&Scene {
        snapshot: &snapshot,
        stage: &stage,
        caret_on,
        bell,
        now,
    });
    renderer.draw(&frame).context("Failed to draw frame")
}
