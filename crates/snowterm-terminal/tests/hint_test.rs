//! Tests for idle hints and flash notices

use snowterm_terminal::{Terminal, DEFAULT_IDLE_DELAY};
use std::time::Duration;
use tokio::time::sleep;

const HINT: &str = "Введи snow";

#[tokio::test(start_paused = true)]
async fn test_disarmed_hint_never_shows() {
    let (terminal, _keys) = Terminal::new();
    terminal.arm_idle_hint(HINT, DEFAULT_IDLE_DELAY, None).await;

    sleep(Duration::from_secs(3)).await;
    assert!(terminal.disarm_hint());

    sleep(Duration::from_secs(10)).await;
    assert_eq!(terminal.snapshot().await.hint, None);
}

#[tokio::test(start_paused = true)]
async fn test_idle_hint_shows_once_and_stays() {
    let (terminal, _keys) = Terminal::new();
    terminal.arm_idle_hint(HINT, DEFAULT_IDLE_DELAY, None).await;

    sleep(Duration::from_millis(4_900)).await;
    assert_eq!(terminal.snapshot().await.hint, None);

    sleep(Duration::from_millis(200)).await;
    assert_eq!(terminal.snapshot().await.hint.as_deref(), Some(HINT));

    sleep(Duration::from_secs(60)).await;
    assert_eq!(terminal.snapshot().await.hint.as_deref(), Some(HINT));

    terminal.hide_hint().await;
    assert_eq!(terminal.snapshot().await.hint, None);
}

#[tokio::test(start_paused = true)]
async fn test_arming_while_visible_is_a_noop() {
    let (terminal, _keys) = Terminal::new();
    terminal.arm_idle_hint("first", DEFAULT_IDLE_DELAY, None).await;
    sleep(Duration::from_millis(5_001)).await;

    terminal
        .arm_idle_hint("second", Duration::from_secs(1), None)
        .await;
    sleep(Duration::from_secs(5)).await;

    assert_eq!(terminal.snapshot().await.hint.as_deref(), Some("first"));
    assert!(!terminal.disarm_hint());
}

#[tokio::test(start_paused = true)]
async fn test_rearm_replaces_pending_timer() {
    let (terminal, _keys) = Terminal::new();
    terminal.arm_idle_hint("a", DEFAULT_IDLE_DELAY, None).await;
    sleep(Duration::from_secs(3)).await;
    terminal.arm_idle_hint("b", DEFAULT_IDLE_DELAY, None).await;

    sleep(Duration::from_secs(3)).await;
    assert_eq!(terminal.snapshot().await.hint, None);

    sleep(Duration::from_secs(3)).await;
    assert_eq!(terminal.snapshot().await.hint.as_deref(), Some("b"));
}

#[tokio::test(start_paused = true)]
async fn test_hint_with_visible_duration_hides_itself() {
    let (terminal, _keys) = Terminal::new();
    terminal
        .arm_idle_hint(HINT, DEFAULT_IDLE_DELAY, Some(Duration::from_secs(5)))
        .await;

    sleep(Duration::from_millis(5_001)).await;
    assert_eq!(terminal.snapshot().await.hint.as_deref(), Some(HINT));

    sleep(Duration::from_secs(5)).await;
    assert_eq!(terminal.snapshot().await.hint, None);
}

#[tokio::test(start_paused = true)]
async fn test_flash_expires_independently_of_hint() {
    let (terminal, _keys) = Terminal::new();
    terminal.arm_idle_hint(HINT, Duration::from_secs(1), None).await;
    terminal
        .flash("Доступ разрешён только для Лизы", Duration::from_secs(3))
        .await;

    sleep(Duration::from_millis(1_500)).await;
    let snapshot = terminal.snapshot().await;
    assert_eq!(snapshot.hint.as_deref(), Some(HINT));
    assert!(snapshot.flash.is_some());

    sleep(Duration::from_secs(2)).await;
    let snapshot = terminal.snapshot().await;
    assert_eq!(snapshot.hint.as_deref(), Some(HINT));
    assert_eq!(snapshot.flash, None);
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_cancels_pending_timers() {
    let (terminal, _keys) = Terminal::new();
    terminal.flash("notice", Duration::from_secs(30)).await;
    terminal.arm_idle_hint(HINT, DEFAULT_IDLE_DELAY, None).await;

    terminal.shutdown().await;
    sleep(Duration::from_secs(10)).await;

    let snapshot = terminal.snapshot().await;
    assert_eq!(snapshot.hint, None);
    assert_eq!(snapshot.flash, None);
    assert!(!terminal.disarm_hint());
}
