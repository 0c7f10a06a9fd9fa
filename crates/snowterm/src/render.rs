//! Presentation layer
//!
//! Composes a frame from the terminal snapshot and the stage, then draws it
//! with crossterm. Composition is pure so it can be tested without a tty.

use anyhow::Result;
use crossterm::{
    cursor, queue,
    style::{self, Attribute, Print, SetAttribute, SetForegroundColor},
    terminal::{self, ClearType},
};
use snowterm_terminal::{
    layout_rows, wrap_row, Color, Span, Style, TerminalSnapshot, SPINNER_FRAMES,
};
use std::{io::Write, time::Duration};
use tokio::time::Instant;
use unicode_width::UnicodeWidthStr;

use crate::effects::Stage;

/// Manual scrolling pauses auto-scroll for this long
pub const FOLLOW_AFTER: Duration = Duration::from_secs(2);

/// Caret blink half-period
pub const CARET_BLINK: Duration = Duration::from_millis(500);

pub const TITLE: &str = "happy-new-year-card.sh ~ zsh";

const CARET: &str = "█";
const TITLE_STYLE: Style = Style::block().with_color(Color::Indexed(8));
const HINT_STYLE: Style = Style::block().with_color(Color::Indexed(8)).with_italic();
const ERROR_STYLE: Style = Style::block().with_color(Color::Rgb(239, 68, 68));
const SNOW_STYLE: Style = Style::block().with_color(Color::Rgb(200, 220, 255));

/// Scroll position of the text area
#[derive(Debug, Default, Clone)]
pub struct Viewport {
    offset: usize,
    manual_at: Option<Instant>,
}

impl Viewport {
    pub fn is_following(&self, now: Instant) -> bool {
        self.manual_at
            .map_or(true, |at| now.duration_since(at) >= FOLLOW_AFTER)
    }

    /// First visible row out of `total`, for a text area `height` rows tall
    pub fn top(&self, total: usize, height: usize, now: Instant) -> usize {
        let bottom = total.saturating_sub(height);
        if self.is_following(now) {
            bottom
        } else {
            self.offset.min(bottom)
        }
    }

    pub fn scroll(&mut self, delta: isize, total: usize, height: usize, now: Instant) {
        let top = self.top(total, height, now) as isize;
        let bottom = total.saturating_sub(height) as isize;
        self.offset = (top + delta).clamp(0, bottom) as usize;
        self.manual_at = Some(now);
    }
}

/// Text placed at a screen position
#[derive(Debug, Clone, PartialEq)]
pub struct Placed {
    pub x: u16,
    pub y: u16,
    pub span: Span,
}

#[derive(Debug, Clone, Default)]
pub struct Frame {
    pub width: u16,
    pub height: u16,
    pub items: Vec<Placed>,
    pub bell: bool,
}

impl Frame {
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            ..Self::default()
        }
    }

    /// Place text at `(x, y)`, cut at the right edge of the screen
    fn put(&mut self, x: u16, y: u16, text: impl Into<String>, style: Style) {
        if y >= self.height || x >= self.width {
            return;
        }
        let avail = usize::from(self.width - x);
        let mut span = Span::new(text, style);
        if span.width() > avail {
            let clipped = wrap_row(&[span], avail)
                .into_iter()
                .next()
                .and_then(|row| row.into_iter().next());
            match clipped {
                Some(clipped) => span = clipped,
                None => return,
            }
        }
        self.items.push(Placed { x, y, span });
    }

    /// Visible text of screen row `y`, trailing blanks removed
    pub fn row_text(&self, y: u16) -> String {
        let mut items: Vec<&Placed> = self.items.iter().filter(|p| p.y == y).collect();
        items.sort_by_key(|p| p.x);

        let mut out = String::new();
        let mut col = 0usize;
        for item in items {
            let x = item.x as usize;
            if x > col {
                out.push_str(&" ".repeat(x - col));
                col = x;
            }
            out.push_str(&item.span.text);
            col += item.span.width();
        }
        out.trim_end().to_string()
    }
}

/// Inputs of one frame
#[derive(Debug)]
pub struct Scene<'a> {
    pub snapshot: &'a TerminalSnapshot,
    pub stage: &'a Stage,
    pub caret_on: bool,
    pub bell: bool,
    pub now: Instant,
}

pub struct Renderer<W: Write> {
    out: W,
    width: u16,
    height: u16,
    viewport: Viewport,
    total_rows: usize,
    started: Instant,
}

impl<W: Write> Renderer<W> {
    pub fn new(out: W, width: u16, height: u16) -> Self {
        Self {
            out,
            width,
            height,
            viewport: Viewport::default(),
            total_rows: 0,
            started: Instant::now(),
        }
    }

    pub fn resize(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
    }

    fn text_width(&self) -> usize {
        self.width.saturating_sub(2).max(1) as usize
    }

    fn text_height(&self) -> usize {
        self.height.saturating_sub(2).max(1) as usize
    }

    /// Scroll the text area by `delta` rows
    pub fn scroll(&mut self, delta: isize, now: Instant) {
        let (total, height) = (self.total_rows, self.text_height());
        self.viewport.scroll(delta, total, height, now);
    }

    /// Rows moved by PageUp/PageDown
    pub fn page(&self) -> isize {
        self.text_height().saturating_sub(1).max(1) as isize
    }

    pub fn compose(&mut self, scene: &Scene<'_>) -> Frame {
        let mut frame = Frame::new(self.width, self.height);
        frame.bell = scene.bell;

        if let Some(snowfall) = &scene.stage.snowfall {
            for (x, y, glyph) in snowfall.cells() {
                frame.put(x, y, glyph.to_string(), SNOW_STYLE);
            }
        }

        if scene.stage.loading {
            self.compose_loader(&mut frame, scene.now);
        } else if let Some(epilogue) = &scene.stage.epilogue {
            let area = self.height.saturating_sub(1);
            for (y, text) in epilogue.visible(area) {
                let text = text.replace('\u{a0}', " ");
                let x = (self.width as usize).saturating_sub(text.width()) / 2;
                frame.put(x as u16, y, text, Style::block());
            }
        } else if scene.snapshot.visible {
            self.compose_terminal(&mut frame, scene);
        }

        self.compose_status(&mut frame, scene);
        frame
    }

    fn compose_loader(&self, frame: &mut Frame, now: Instant) {
        let tick = now.duration_since(self.started).as_millis() / 100;
        let glyph = SPINNER_FRAMES[tick as usize % SPINNER_FRAMES.len()];
        let text = format!("{glyph} Загрузка");
        let x = (self.width as usize).saturating_sub(text.width()) / 2;
        frame.put(x as u16, self.height / 2, text, Style::block());
    }

    fn compose_terminal(&mut self, frame: &mut Frame, scene: &Scene<'_>) {
        frame.put(1, 0, "●", Style::block().with_color(Color::Rgb(239, 68, 68)));
        frame.put(3, 0, "●", Style::block().with_color(Color::Rgb(234, 179, 8)));
        frame.put(5, 0, "●", Style::block().with_color(Color::Rgb(34, 197, 94)));
        frame.put(8, 0, TITLE, TITLE_STYLE);

        let lines = &scene.snapshot.lines;
        let mut rows = layout_rows(lines);
        let caret = Span::new(if scene.caret_on { CARET } else { " " }, Style::default());
        let caret_on_new_row = match lines.last() {
            Some(line) => line.style().block && line.text().is_empty(),
            None => true,
        };
        match rows.last_mut() {
            Some(row) if !caret_on_new_row => row.push(caret),
            _ => rows.push(vec![caret]),
        }

        let text_width = self.text_width();
        let wrapped: Vec<Vec<Span>> = rows
            .iter()
            .flat_map(|row| wrap_row(row, text_width))
            .collect();

        let height = self.text_height();
        self.total_rows = wrapped.len();
        let top = self.viewport.top(wrapped.len(), height, scene.now);

        for (i, row) in wrapped.iter().skip(top).take(height).enumerate() {
            let mut x = 1u16;
            for span in row {
                frame.put(x, 1 + i as u16, span.text.clone(), span.style);
                x = x.saturating_add(span.width() as u16);
            }
        }
    }

    fn compose_status(&self, frame: &mut Frame, scene: &Scene<'_>) {
        let y = self.height.saturating_sub(1);
        let mut x = 1u16;

        if let Some(flash) = &scene.snapshot.flash {
            let text = format!("✖ {flash}");
            let width = text.width() as u16;
            frame.put(x, y, text, ERROR_STYLE);
            x = x.saturating_add(width + 2);
        }
        if let Some(hint) = &scene.snapshot.hint {
            frame.put(x, y, format!("💡 {hint}"), HINT_STYLE);
        }
        if scene.stage.music {
            frame.put(self.width.saturating_sub(2), y, "♪", TITLE_STYLE);
        }
    }

    /// Write a composed frame to the output
    pub fn draw(&mut self, frame: &Frame) -> Result<()> {
        queue!(
            self.out,
            terminal::BeginSynchronizedUpdate,
            terminal::Clear(ClearType::All)
        )?;

        for item in &frame.items {
            let style = item.span.style;
            queue!(
                self.out,
                cursor::MoveTo(item.x, item.y),
                SetForegroundColor(to_crossterm(style.color))
            )?;
            if style.bold {
                queue!(self.out, SetAttribute(Attribute::Bold))?;
            }
            if style.italic {
                queue!(self.out, SetAttribute(Attribute::Italic))?;
            }
            queue!(self.out, Print(&item.span.text), SetAttribute(Attribute::Reset))?;
        }

        if frame.bell {
            queue!(self.out, Print('\u{7}'))?;
        }
        queue!(self.out, terminal::EndSynchronizedUpdate)?;
        self.out.flush()?;
        Ok(())
    }
}

fn to_crossterm(color: Color) -> style::Color {
    match color {
        Color::Default => style::Color::Reset,
        Color::Indexed(idx) => style::Color::AnsiValue(idx),
        Color::Rgb(r, g, b) => style::Color::Rgb { r, g, b },
    }
}
