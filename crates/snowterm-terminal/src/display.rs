//! Terminal display conversion
//!
//! Converts the line buffer into visual rows and wraps them to a width.
//! Inline lines flow into the current row, block lines occupy a row of their
//! own, and an empty block line only ends the current row.

use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

use crate::buffer::{Line, Style};

/// A run of text sharing one style within a visual row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    pub text: String,
    pub style: Style,
}

impl Span {
    pub fn new(text: impl Into<String>, style: Style) -> Self {
        Self {
            text: text.into(),
            style,
        }
    }

    /// Display width in terminal cells
    pub fn width(&self) -> usize {
        self.text.width()
    }
}

/// Group buffer lines into visual rows
pub fn layout_rows(lines: &[Line]) -> Vec<Vec<Span>> {
    let mut rows = Vec::new();
    let mut current: Option<Vec<Span>> = None;

    for line in lines {
        let span = Span::new(line.text().replace('\u{a0}', " "), line.style());
        if line.style().block {
            if let Some(row) = current.take() {
                rows.push(row);
            }
            if !line.text().is_empty() {
                rows.push(vec![span]);
            }
        } else {
            current.get_or_insert_with(Vec::new).push(span);
        }
    }

    if let Some(row) = current {
        rows.push(row);
    }
    rows
}

/// Break a visual row into chunks no wider than `width` cells
pub fn wrap_row(row: &[Span], width: usize) -> Vec<Vec<Span>> {
    let width = width.max(1);
    let mut wrapped = vec![Vec::new()];
    let mut used = 0;

    for span in row {
        let mut chunk = String::new();
        for grapheme in span.text.graphemes(true) {
            let w = grapheme.width();
            if used + w > width && used > 0 {
                if !chunk.is_empty() {
                    let done = Span::new(std::mem::take(&mut chunk), span.style);
                    if let Some(last) = wrapped.last_mut() {
                        last.push(done);
                    }
                }
                wrapped.push(Vec::new());
                used = 0;
            }
            chunk.push_str(grapheme);
            used += w;
        }
        if !chunk.is_empty() {
            if let Some(last) = wrapped.last_mut() {
                last.push(Span::new(chunk, span.style));
            }
        }
    }

    wrapped
}
