//! Tests for keystroke capture and command gates

use pretty_assertions::assert_eq;
use snowterm_terminal::{Key, Matcher, OnMismatch, Style, Terminal, TerminalError};
use snowterm_test_utils::{assert_lines_eq, init_test_logging, KeyFeeder};
use std::time::Duration;

#[tokio::test]
async fn test_capture_echoes_into_last_line() {
    init_test_logging();
    let (terminal, keys) = Terminal::new();
    terminal.write_line("$ ").await;

    let feeder = KeyFeeder::new(keys);
    feeder.type_str("snwo").unwrap();
    feeder.backspace(2).unwrap();
    feeder.type_str("ow").unwrap();
    feeder.enter().unwrap();

    let input = terminal.capture_input().await.unwrap();
    let snapshot = terminal.snapshot().await;

    assert_eq!(input, "snow");
    assert_eq!(snapshot.last_text(), "$ snow");
    assert!(!snapshot.focusable);
}

#[tokio::test]
async fn test_capture_ignores_nonprintable_keys() {
    let (terminal, keys) = Terminal::new();
    terminal.write_line("Имя: ").await;

    for key in [
        Key::Char('\u{7}'),
        Key::Other,
        Key::Char('Л'),
        Key::Char('\u{7f}'),
        Key::Char('\u{85}'),
        Key::Char('и'),
        Key::Char('\t'),
        Key::Enter,
    ] {
        keys.send(key).unwrap();
    }

    assert_eq!(terminal.capture_input().await.unwrap(), "Ли");
    assert_eq!(terminal.snapshot().await.last_text(), "Имя: Ли");
}

#[tokio::test]
async fn test_backspace_never_eats_the_prefix() {
    let (terminal, keys) = Terminal::new();
    terminal.write_line("$ ").await;

    keys.send(Key::Backspace).unwrap();
    keys.send(Key::Backspace).unwrap();
    keys.submit("a").unwrap();

    assert_eq!(terminal.capture_input().await.unwrap(), "a");
    assert_eq!(terminal.snapshot().await.last_text(), "$ a");
}

#[tokio::test]
async fn test_backspace_removes_whole_emoji() {
    let (terminal, keys) = Terminal::new();
    terminal.write_line("$ ").await;

    keys.type_str("a❄️").unwrap();
    keys.send(Key::Backspace).unwrap();
    keys.send(Key::Enter).unwrap();

    assert_eq!(terminal.capture_input().await.unwrap(), "a");
}

#[tokio::test]
async fn test_terminal_is_focusable_only_while_capturing() {
    let (terminal, keys) = Terminal::new();
    terminal.write_line("$ ").await;
    assert!(!terminal.snapshot().await.focusable);

    let capture = tokio::spawn({
        let terminal = terminal.clone();
        async move { terminal.capture_input().await }
    });
    while !terminal.snapshot().await.focusable {
        tokio::task::yield_now().await;
    }

    keys.submit("ok").unwrap();
    assert_eq!(capture.await.unwrap().unwrap(), "ok");
    assert!(!terminal.snapshot().await.focusable);
}

#[tokio::test]
async fn test_capture_on_empty_buffer_creates_a_line() {
    let (terminal, keys) = Terminal::new();
    keys.submit("hi").unwrap();

    assert_eq!(terminal.capture_input().await.unwrap(), "hi");
    assert_eq!(terminal.snapshot().await.texts(), vec!["hi"]);
}

#[tokio::test]
async fn test_closed_input_is_an_error() {
    let (terminal, keys) = Terminal::new();
    terminal.write_line("$ ").await;
    keys.type_str("par").unwrap();
    drop(keys);

    assert!(matches!(
        terminal.capture_input().await,
        Err(TerminalError::InputClosed)
    ));
    assert!(!terminal.snapshot().await.focusable);
}

#[tokio::test]
async fn test_command_not_found_until_match() {
    init_test_logging();
    let (terminal, keys) = Terminal::new();
    terminal.write_line("$ ").await;
    KeyFeeder::new(keys).submit_all(&["foo", "bar", "snow"]).unwrap();

    let accepted = terminal
        .wait_for_command(&Matcher::exact("snow"), OnMismatch::CommandNotFound)
        .await
        .unwrap();
    let snapshot = terminal.snapshot().await;

    assert_eq!(accepted, "snow");
    assert_lines_eq(
        &snapshot.texts(),
        &[
            "$ foo",
            "foo: command not found",
            "\u{a0}",
            "$ bar",
            "bar: command not found",
            "\u{a0}",
            "$ snow",
        ],
    );
    let errors = snapshot
        .texts()
        .iter()
        .filter(|t| t.ends_with(": command not found"))
        .count();
    assert_eq!(errors, 2);
}

#[tokio::test(start_paused = true)]
async fn test_erase_gate_retypes_in_place() {
    let (terminal, keys) = Terminal::new();
    terminal
        .write("К нам приходит ", Style::default().with_italic())
        .await;
    keys.submit("nyet").unwrap();

    let gate = tokio::spawn({
        let terminal = terminal.clone();
        async move {
            let matcher = Matcher::phrase("новый год").unwrap();
            terminal.wait_for_command(&matcher, OnMismatch::EraseInPlace).await
        }
    });

    tokio::time::sleep(Duration::from_millis(1)).await;
    let snapshot = terminal.snapshot().await;
    assert_eq!(snapshot.last_text(), "К нам приходит ");
    assert!(snapshot.focusable);
    assert!(!gate.is_finished());

    keys.submit("Новый Год").unwrap();
    assert_eq!(gate.await.unwrap().unwrap(), "Новый Год");
    assert_eq!(terminal.snapshot().await.texts(), vec!["К нам приходит Новый Год"]);
}

#[tokio::test(start_paused = true)]
async fn test_erase_gate_keeps_prompt_after_leading_combining_mark() {
    let (terminal, keys) = Terminal::new();
    terminal.write("К нам приходит ", Style::default()).await;
    KeyFeeder::new(keys)
        .submit_all(&["\u{301}x", "новый год"])
        .unwrap();

    let matcher = Matcher::phrase("новый год").unwrap();
    let accepted = terminal
        .wait_for_command(&matcher, OnMismatch::EraseInPlace)
        .await
        .unwrap();

    assert_eq!(accepted, "новый год");
    assert_eq!(terminal.snapshot().await.last_text(), "К нам приходит новый год");
}

#[tokio::test]
async fn test_erase_value_strips_exact_suffix() {
    let (terminal, _keys) = Terminal::new();
    terminal.write("🟩 Представьтесь: \u{301}x", Style::default()).await;

    assert_eq!(terminal.erase_value("\u{301}x").await.unwrap(), 2);
    assert_eq!(terminal.snapshot().await.last_text(), "🟩 Представьтесь: ");
}

#[tokio::test(start_paused = true)]
async fn test_deny_flashes_notice_and_rolls_back() {
    let (terminal, keys) = Terminal::new();
    terminal.write("🟩 Представьтесь: ", Style::default()).await;
    keys.submit("\u{301}Вася").unwrap();

    let gate = tokio::spawn({
        let terminal = terminal.clone();
        async move {
            let on_mismatch = OnMismatch::Deny {
                notice: "Доступ запрещён",
                ttl: Duration::from_secs(4),
            };
            terminal
                .wait_for_command(&Matcher::one_of(["Лиза"]), on_mismatch)
                .await
        }
    });

    tokio::time::sleep(Duration::from_millis(20)).await;
    let snapshot = terminal.snapshot().await;
    assert_eq!(snapshot.flash.as_deref(), Some("Доступ запрещён"));
    assert_eq!(snapshot.last_text(), "🟩 Представьтесь: ");
    assert!(snapshot.focusable);

    keys.submit("Лиза").unwrap();
    assert_eq!(gate.await.unwrap().unwrap(), "Лиза");
    assert_eq!(terminal.snapshot().await.last_text(), "🟩 Представьтесь: Лиза");
}

#[tokio::test]
async fn test_reject_gives_up_on_first_mismatch() {
    let (terminal, keys) = Terminal::new();
    terminal.write("🟩 Представьтесь: ", Style::default()).await;
    KeyFeeder::new(keys).submit_all(&["Вася", "Лиза"]).unwrap();

    let result = terminal
        .wait_for_command(&Matcher::one_of(["Лиза"]), OnMismatch::Reject)
        .await;

    assert!(matches!(result, Err(TerminalError::CommandRejected(ref input)) if input == "Вася"));
    assert_eq!(terminal.snapshot().await.last_text(), "🟩 Представьтесь: Вася");
    assert!(!terminal.snapshot().await.focusable);
}
