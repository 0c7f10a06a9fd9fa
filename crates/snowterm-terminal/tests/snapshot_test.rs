//! Tests for the snapshot handed to front ends

use snowterm_terminal::{Color, Style, Terminal, TerminalSnapshot};

#[tokio::test]
async fn test_snapshot_serializes_lines_and_flags() {
    let (terminal, _keys) = Terminal::new();
    terminal.write_line("$ ").await;
    terminal
        .write("snow", Style::default().with_color(Color::Rgb(184, 216, 189)))
        .await;

    let snapshot = terminal.snapshot().await;
    let value = serde_json::to_value(&snapshot).unwrap();

    assert_eq!(value["lines"][0]["text"], "$ ");
    assert_eq!(value["lines"][0]["style"]["block"], true);
    assert_eq!(value["lines"][1]["style"]["color"]["Rgb"][0], 184);
    assert_eq!(value["focusable"], false);
    assert_eq!(value["revision"], 2);

    let decoded: TerminalSnapshot = serde_json::from_value(value).unwrap();
    assert_eq!(decoded, snapshot);
}

#[tokio::test]
async fn test_reset_starts_fresh_with_new_handles() {
    let (terminal, _keys) = Terminal::new();
    let old = terminal.write_line("old").await;
    terminal.reset().await;
    let new = terminal.write_line("new").await;

    assert_ne!(old, new);
    assert_eq!(terminal.row_of(old).await, None);
    assert_eq!(terminal.row_of(new).await, Some(0));
    assert_eq!(terminal.snapshot().await.texts(), vec!["new"]);
}
