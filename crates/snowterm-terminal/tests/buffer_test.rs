//! Property tests for the line buffer

use proptest::prelude::*;
use snowterm_terminal::{Buffer, Style, TerminalError};

fn buffer_from(lines: &[String]) -> Buffer {
    let mut buffer = Buffer::new();
    for line in lines {
        buffer.append(line.as_str(), Style::default());
    }
    buffer
}

fn columns(text: &str) -> Vec<String> {
    text.chars().map(String::from).collect()
}

proptest! {
    #[test]
    fn replace_changes_exactly_one_cell(
        lines in prop::collection::vec("[a-zа-я ]{0,12}", 1..6),
        row_seed in any::<usize>(),
        col in 0usize..16,
        ch in prop::char::range('A', 'Z'),
    ) {
        let mut buffer = buffer_from(&lines);
        let row = row_seed % lines.len();
        let before: Vec<Vec<String>> = lines.iter().map(|l| columns(l)).collect();

        buffer.replace_char_at(row, col, ch).unwrap();

        for (r, line) in buffer.lines().iter().enumerate() {
            let after = columns(line.text());
            if r != row {
                prop_assert_eq!(&after, &before[r]);
                continue;
            }

            prop_assert_eq!(after.len(), before[r].len().max(col + 1));
            for (c, unit) in after.iter().enumerate() {
                if c == col {
                    prop_assert_eq!(unit, &ch.to_string());
                } else {
                    let expected = before[r].get(c).cloned().unwrap_or_else(|| " ".to_string());
                    prop_assert_eq!(unit, &expected);
                }
            }
        }
    }

    #[test]
    fn delete_shifts_later_rows(
        lines in prop::collection::vec("[a-z]{0,6}", 1..8),
        row_seed in any::<usize>(),
    ) {
        let mut buffer = buffer_from(&lines);
        let row = row_seed % lines.len();

        let removed = buffer.delete_row(row).unwrap();

        prop_assert_eq!(removed.text(), lines[row].as_str());
        prop_assert_eq!(buffer.len(), lines.len() - 1);
        for r in 0..buffer.len() {
            let expected = if r < row { &lines[r] } else { &lines[r + 1] };
            prop_assert_eq!(buffer.line(r).unwrap().text(), expected.as_str());
        }
    }

    #[test]
    fn reset_leaves_no_residue(
        first in prop::collection::vec("[a-z]{0,6}", 0..6),
        second in prop::collection::vec("[a-z]{0,6}", 0..6),
    ) {
        let mut used = buffer_from(&first);
        used.reset();
        for line in &second {
            used.append(line.as_str(), Style::default());
        }
        let fresh = buffer_from(&second);

        prop_assert_eq!(used.texts(), fresh.texts());
        let used_styles: Vec<Style> = used.lines().iter().map(|l| l.style()).collect();
        let fresh_styles: Vec<Style> = fresh.lines().iter().map(|l| l.style()).collect();
        prop_assert_eq!(used_styles, fresh_styles);
    }
}

#[test]
fn test_out_of_range_rows_are_errors() {
    let mut buffer = Buffer::new();
    buffer.write_line("only");

    assert!(matches!(
        buffer.replace_char_at(1, 0, 'x'),
        Err(TerminalError::RowOutOfRange { row: 1, len: 1 })
    ));
    assert!(matches!(
        buffer.delete_row(5),
        Err(TerminalError::RowOutOfRange { row: 5, len: 1 })
    ));
    assert_eq!(buffer.texts(), vec!["only"]);
}

#[test]
fn test_deleted_handle_is_an_error() {
    let mut buffer = Buffer::new();
    let id = buffer.write_line("gone");
    buffer.delete_line(id).unwrap();

    assert!(matches!(buffer.delete_line(id), Err(TerminalError::LineNotFound(_))));
    assert!(matches!(buffer.push_str(id, "x"), Err(TerminalError::LineNotFound(_))));
}
