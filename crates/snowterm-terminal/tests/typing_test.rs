//! Tests for the typing animator

use pretty_assertions::assert_eq;
use snowterm_terminal::{Style, Terminal, DEFAULT_TYPING_DELAY};
use std::time::Duration;

#[tokio::test(start_paused = true)]
async fn test_typed_line_equals_source_text() {
    let (terminal, _keys) = Terminal::new();
    let text = "> Снегопад инициализирован! ❄️";

    let id = terminal
        .type_text(text, Style::default().with_italic(), DEFAULT_TYPING_DELAY)
        .await
        .unwrap();

    let snapshot = terminal.snapshot().await;
    assert_eq!(snapshot.lines.len(), 1);
    assert_eq!(snapshot.lines[0].id(), id);
    assert_eq!(snapshot.lines[0].text(), text);
    assert!(snapshot.lines[0].style().italic);
}

#[tokio::test(start_paused = true)]
async fn test_typing_reveals_one_unit_per_tick() {
    let (terminal, _keys) = Terminal::new();
    let task = tokio::spawn({
        let terminal = terminal.clone();
        async move {
            terminal
                .type_text("a❄️b", Style::default(), Duration::from_millis(40))
                .await
        }
    });

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(terminal.snapshot().await.last_text(), "a");
    assert!(!task.is_finished());

    tokio::time::sleep(Duration::from_millis(40)).await;
    assert_eq!(terminal.snapshot().await.last_text(), "a❄️");
    assert!(!task.is_finished());

    tokio::time::sleep(Duration::from_millis(40)).await;
    assert_eq!(terminal.snapshot().await.last_text(), "a❄️b");
    task.await.unwrap().unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_typing_takes_one_delay_per_unit() {
    let (terminal, _keys) = Terminal::new();
    let start = tokio::time::Instant::now();

    terminal
        .type_text("Привет", Style::default(), Duration::from_millis(90))
        .await
        .unwrap();

    assert_eq!(start.elapsed(), Duration::from_millis(90 * 6));
}

#[tokio::test(start_paused = true)]
async fn test_typing_empty_text_appends_empty_line() {
    let (terminal, _keys) = Terminal::new();
    terminal.write_line("before").await;

    terminal.type_line("").await.unwrap();

    let snapshot = terminal.snapshot().await;
    assert_eq!(snapshot.texts(), vec!["before", ""]);
    assert!(!snapshot.lines[1].style().block);
}
