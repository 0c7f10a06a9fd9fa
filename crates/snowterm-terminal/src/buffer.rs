//! Line buffer implementation for terminal content
//!
//! Manages the ordered list of styled lines that make up the terminal display.
//! Columns are counted in extended grapheme clusters so that emoji carrying
//! variation selectors are addressed as a single unit.

use std::fmt;

use serde::{Deserialize, Serialize};
use unicode_segmentation::UnicodeSegmentation;

use crate::TerminalError;

/// Stable handle to a line, unaffected by deletions of other lines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LineId(u64);

impl LineId {
    /// Raw numeric value of the handle
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for LineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Color representation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Color {
    /// Default terminal color
    #[default]
    Default,

    /// ANSI 256-color palette index
    Indexed(u8),

    /// RGB color
    Rgb(u8, u8, u8),
}

/// Display attributes attached to a line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Style {
    pub color: Color,
    pub italic: bool,
    pub bold: bool,

    /// Occupies a visual row of its own instead of flowing after the previous line
    pub block: bool,
}

impl Style {
    /// Style used by `write_line`
    pub const fn block() -> Self {
        Self {
            color: Color::Default,
            italic: false,
            bold: false,
            block: true,
        }
    }

    pub const fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    pub const fn with_italic(mut self) -> Self {
        self.italic = true;
        self
    }

    pub const fn with_bold(mut self) -> Self {
        self.bold = true;
        self
    }
}

/// One row of terminal output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Line {
    id: LineId,
    text: String,
    style: Style,
}

impl Line {
    pub fn id(&self) -> LineId {
        self.id
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn style(&self) -> Style {
        self.style
    }

    /// Number of addressable columns (grapheme clusters)
    pub fn width(&self) -> usize {
        self.text.graphemes(true).count()
    }
}

/// Ordered sequence of lines, insertion order is display order
#[derive(Debug, Clone, Default)]
pub struct Buffer {
    lines: Vec<Line>,

    /// Next handle to hand out; never rewound, not even by `reset`
    next_id: u64,
}

impl Buffer {
    /// Create an empty buffer
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    /// Get line at row
    pub fn line(&self, row: usize) -> Option<&Line> {
        self.lines.get(row)
    }

    pub fn last(&self) -> Option<&Line> {
        self.lines.last()
    }

    /// Current row index of a line handle
    pub fn row_of(&self, id: LineId) -> Option<usize> {
        self.lines.iter().position(|line| line.id == id)
    }

    pub fn get(&self, id: LineId) -> Option<&Line> {
        self.lines.iter().find(|line| line.id == id)
    }

    /// Append a line and return its handle
    pub fn append(&mut self, text: impl Into<String>, style: Style) -> LineId {
        let id = LineId(self.next_id);
        self.next_id += 1;
        self.lines.push(Line {
            id,
            text: text.into(),
            style,
        });
        id
    }

    /// Append a block-display line
    pub fn write_line(&mut self, text: impl Into<String>) -> LineId {
        self.append(text, Style::block())
    }

    /// Overwrite one column of a row, padding with spaces when the row is shorter
    pub fn replace_char_at(
        &mut self,
        row: usize,
        col: usize,
        ch: char,
    ) -> Result<(), TerminalError> {
        let len = self.lines.len();
        let line = self
            .lines
            .get_mut(row)
            .ok_or(TerminalError::RowOutOfRange { row, len })?;
        line.text = replace_column(&line.text, col, ch);
        Ok(())
    }

    /// Overwrite one column of the line behind `id`
    pub fn replace_char_in(
        &mut self,
        id: LineId,
        col: usize,
        ch: char,
    ) -> Result<(), TerminalError> {
        let line = self.get_mut(id)?;
        line.text = replace_column(&line.text, col, ch);
        Ok(())
    }

    /// Append text to the end of an existing line
    pub fn push_str(&mut self, id: LineId, text: &str) -> Result<(), TerminalError> {
        self.get_mut(id)?.text.push_str(text);
        Ok(())
    }

    pub fn set_text(&mut self, id: LineId, text: impl Into<String>) -> Result<(), TerminalError> {
        self.get_mut(id)?.text = text.into();
        Ok(())
    }

    pub fn set_style(&mut self, id: LineId, style: Style) -> Result<(), TerminalError> {
        self.get_mut(id)?.style = style;
        Ok(())
    }

    /// Remove the last `count` columns of a line, returning how many were removed
    pub fn erase_tail(&mut self, id: LineId, count: usize) -> Result<usize, TerminalError> {
        let line = self.get_mut(id)?;
        let mut removed = 0;
        while removed < count {
            match line.text.grapheme_indices(true).next_back() {
                Some((idx, _)) => line.text.truncate(idx),
                None => break,
            }
            removed += 1;
        }
        Ok(removed)
    }

    /// Remove `value` from the end of a line. When the line does not end with
    /// it, falls back to erasing as many columns as `value` has.
    pub fn erase_suffix(&mut self, id: LineId, value: &str) -> Result<usize, TerminalError> {
        let count = value.graphemes(true).count();
        let line = self.get_mut(id)?;
        if let Some(keep) = line.text.strip_suffix(value).map(str::len) {
            line.text.truncate(keep);
            return Ok(count);
        }
        self.erase_tail(id, count)
    }

    /// Remove the line at `row`, shifting every later row up by one
    pub fn delete_row(&mut self, row: usize) -> Result<Line, TerminalError> {
        let len = self.lines.len();
        if row >= len {
            return Err(TerminalError::RowOutOfRange { row, len });
        }
        Ok(self.lines.remove(row))
    }

    /// Remove the line behind `id`
    pub fn delete_line(&mut self, id: LineId) -> Result<Line, TerminalError> {
        let row = self.row_of(id).ok_or(TerminalError::LineNotFound(id))?;
        Ok(self.lines.remove(row))
    }

    /// Clear all lines
    pub fn reset(&mut self) {
        self.lines.clear();
    }

    /// Text of every line, top to bottom
    pub fn texts(&self) -> Vec<&str> {
        self.lines.iter().map(|line| line.text.as_str()).collect()
    }

    fn get_mut(&mut self, id: LineId) -> Result<&mut Line, TerminalError> {
        self.lines
            .iter_mut()
            .find(|line| line.id == id)
            .ok_or(TerminalError::LineNotFound(id))
    }
}

fn replace_column(text: &str, col: usize, ch: char) -> String {
    let mut units: Vec<&str> = text.graphemes(true).collect();
    let mut glyph = [0u8; 4];
    let glyph: &str = ch.encode_utf8(&mut glyph);

    if col >= units.len() {
        units.resize(col, " ");
        units.push(glyph);
    } else {
        units[col] = glyph;
    }

    units.concat()
}
