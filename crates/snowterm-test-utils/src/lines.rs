use similar::{ChangeTag, TextDiff};

/// Line-by-line diff of two buffers, `-` for expected and `+` for actual
pub fn diff_lines(expected: &[&str], actual: &[&str]) -> String {
    let expected = expected.join("\n");
    let actual = actual.join("\n");
    let diff = TextDiff::from_lines(&expected, &actual);

    let mut output = String::new();
    for change in diff.iter_all_changes() {
        let sign = match change.tag() {
            ChangeTag::Delete => "-",
            ChangeTag::Insert => "+",
            ChangeTag::Equal => " ",
        };
        output.push_str(&format!("{sign}{}", change));
        if !change.to_string().ends_with('\n') {
            output.push('\n');
        }
    }
    output
}

/// Assert two buffers hold the same text, printing a diff when they do not
#[track_caller]
pub fn assert_lines_eq(actual: &[&str], expected: &[&str]) {
    if actual != expected {
        panic!(
            "buffer mismatch:\n{}",
            diff_lines(expected, actual)
        );
    }
}
