//! Output frames and ANSI serialization of rendered views.
//!
//! A [`Model`] draws into a ratatui [`Frame`](ratatui::Frame) sized to the
//! session geometry. [`render_model`] runs that draw against an off-screen
//! backend and turns the resulting cell buffer into ANSI text, and
//! [`OutputFrame::repaint`] wraps the text into one self-contained full-screen
//! repaint that the writer loop sends as a single write.

use std::fmt::Write as _;

use crossterm::cursor::{Hide, MoveTo, Show};
use crossterm::style::{
    Attribute, Color as AnsiColor, SetAttribute, SetBackgroundColor, SetForegroundColor,
};
use crossterm::terminal::{Clear, ClearType};
use crossterm::Command as _;
use ratatui::backend::TestBackend;
use ratatui::buffer::{Buffer, Cell};
use ratatui::style::{Color, Modifier};
use ratatui::Terminal;
use unicode_width::UnicodeWidthStr;

use crate::event::Geometry;
use crate::model::Model;

/// Errors produced while rendering a view to text.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// The off-screen backend refused to draw.
    #[error("render backend error: {0}")]
    Backend(String),
    /// Writing escape sequences into the output string failed.
    #[error("ANSI formatting failed")]
    Format(#[from] std::fmt::Error),
}

/// One full-screen repaint, ready to be written to the transport.
///
/// The text starts with clear-screen, cursor-home and cursor-hide sequences
/// and ends with cursor-show, so every frame fully replaces the previous one
/// and dropping an intermediate frame never corrupts the remote screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputFrame {
    text: String,
    body: std::ops::Range<usize>,
}

impl OutputFrame {
    /// Wrap rendered text into a repaint frame.
    pub fn repaint(rendered: &str) -> Result<Self, RenderError> {
        let mut text = String::with_capacity(rendered.len() + 24);
        Clear(ClearType::All).write_ansi(&mut text)?;
        MoveTo(0, 0).write_ansi(&mut text)?;
        Hide.write_ansi(&mut text)?;
        let start = text.len();
        text.push_str(rendered);
        let end = text.len();
        Show.write_ansi(&mut text)?;
        Ok(Self {
            text,
            body: start..end,
        })
    }

    /// The full frame, control sequences included.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// The full frame as bytes.
    pub fn as_bytes(&self) -> &[u8] {
        self.text.as_bytes()
    }

    /// Only the rendered view, without the repaint prefix and suffix.
    pub fn body(&self) -> &str {
        &self.text[self.body.clone()]
    }

    /// Length of the full frame in bytes.
    pub fn len(&self) -> usize {
        self.text.len()
    }

    /// Whether the frame is empty. A repaint frame never is.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// Render a model at `geometry` and serialize the result to ANSI text.
///
/// Returns an empty string when the view left every cell blank.
pub fn render_model<M: Model>(model: &M, geometry: Geometry) -> Result<String, RenderError> {
    let backend = TestBackend::new(geometry.cols(), geometry.rows());
    let mut terminal = Terminal::new(backend).map_err(|e| RenderError::Backend(e.to_string()))?;
    terminal
        .draw(|frame| model.view(frame))
        .map_err(|e| RenderError::Backend(e.to_string()))?;
    buffer_to_ansi(terminal.backend().buffer())
}

/// Serialize a cell buffer to ANSI text.
///
/// Rows are separated by `\r\n` (the remote terminal is in raw mode), blank
/// cells at the end of a row and blank rows at the end of the buffer are
/// trimmed, and styles are emitted only where they change.
pub fn buffer_to_ansi(buffer: &Buffer) -> Result<String, RenderError> {
    let area = buffer.area;
    let mut rows = Vec::with_capacity(area.height as usize);
    for y in area.top()..area.bottom() {
        let cells: Vec<&Cell> = (area.left()..area.right())
            .map(|x| &buffer[(x, y)])
            .collect();
        rows.push(row_to_ansi(&cells)?);
    }
    while rows.last().is_some_and(|row: &String| row.is_empty()) {
        rows.pop();
    }
    Ok(rows.join("\r\n"))
}

fn row_to_ansi(cells: &[&Cell]) -> Result<String, std::fmt::Error> {
    let Some(end) = cells.iter().rposition(|cell| !is_blank(cell)) else {
        return Ok(String::new());
    };

    let mut out = String::new();
    let mut current = CellStyle::default();
    let mut skip = 0usize;
    for cell in &cells[..=end] {
        // Trailing half of a wide grapheme.
        if skip > 0 {
            skip -= 1;
            continue;
        }
        let style = CellStyle::of(cell);
        if style != current {
            style.write_transition(&mut out)?;
            current = style;
        }
        let symbol = cell.symbol();
        out.write_str(symbol)?;
        skip = symbol.width().saturating_sub(1);
    }
    if current != CellStyle::default() {
        SetAttribute(Attribute::Reset).write_ansi(&mut out)?;
    }
    Ok(out)
}

fn is_blank(cell: &Cell) -> bool {
    let visible_modifiers = Modifier::UNDERLINED | Modifier::REVERSED | Modifier::CROSSED_OUT;
    cell.symbol() == " "
        && cell.bg == Color::Reset
        && !cell.modifier.intersects(visible_modifiers)
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct CellStyle {
    fg: Color,
    bg: Color,
    modifier: Modifier,
}

const ATTRIBUTES: [(Modifier, Attribute); 9] = [
    (Modifier::BOLD, Attribute::Bold),
    (Modifier::DIM, Attribute::Dim),
    (Modifier::ITALIC, Attribute::Italic),
    (Modifier::UNDERLINED, Attribute::Underlined),
    (Modifier::SLOW_BLINK, Attribute::SlowBlink),
    (Modifier::RAPID_BLINK, Attribute::RapidBlink),
    (Modifier::REVERSED, Attribute::Reverse),
    (Modifier::HIDDEN, Attribute::Hidden),
    (Modifier::CROSSED_OUT, Attribute::CrossedOut),
];

impl CellStyle {
    fn of(cell: &Cell) -> Self {
        Self {
            fg: cell.fg,
            bg: cell.bg,
            modifier: cell.modifier,
        }
    }

    // Reset, then re-apply; simpler than diffing SGR state and just as short
    // for the few style runs a menu screen has.
    fn write_transition(&self, out: &mut String) -> std::fmt::Result {
        SetAttribute(Attribute::Reset).write_ansi(out)?;
        if self.fg != Color::Reset {
            SetForegroundColor(ansi_color(self.fg)).write_ansi(out)?;
        }
        if self.bg != Color::Reset {
            SetBackgroundColor(ansi_color(self.bg)).write_ansi(out)?;
        }
        for (modifier, attribute) in ATTRIBUTES {
            if self.modifier.contains(modifier) {
                SetAttribute(attribute).write_ansi(out)?;
            }
        }
        Ok(())
    }
}

fn ansi_color(color: Color) -> AnsiColor {
    match color {
        Color::Reset => AnsiColor::Reset,
        Color::Black => AnsiColor::Black,
        Color::Red => AnsiColor::DarkRed,
        Color::Green => AnsiColor::DarkGreen,
        Color::Yellow => AnsiColor::DarkYellow,
        Color::Blue => AnsiColor::DarkBlue,
        Color::Magenta => AnsiColor::DarkMagenta,
        Color::Cyan => AnsiColor::DarkCyan,
        Color::Gray => AnsiColor::Grey,
        Color::DarkGray => AnsiColor::DarkGrey,
        Color::LightRed => AnsiColor::Red,
        Color::LightGreen => AnsiColor::Green,
        Color::LightYellow => AnsiColor::Yellow,
        Color::LightBlue => AnsiColor::Blue,
        Color::LightMagenta => AnsiColor::Magenta,
        Color::LightCyan => AnsiColor::Cyan,
        Color::White => AnsiColor::White,
        Color::Indexed(i) => AnsiColor::AnsiValue(i),
        Color::Rgb(r, g, b) => AnsiColor::Rgb { r, g, b },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::layout::Rect;
    use ratatui::style::Style;

    #[test]
    fn repaint_wraps_with_clear_home_and_cursor_toggles() {
        let frame = OutputFrame::repaint("hello").unwrap();
        assert_eq!(frame.as_str(), "\x1b[2J\x1b[1;1H\x1b[?25lhello\x1b[?25h");
        assert_eq!(frame.body(), "hello");
    }

    #[test]
    fn plain_rows_are_trimmed_and_joined_with_crlf() {
        let mut buffer = Buffer::empty(Rect::new(0, 0, 10, 4));
        buffer.set_string(0, 0, "one", Style::default());
        buffer.set_string(2, 1, "two", Style::default());
        assert_eq!(buffer_to_ansi(&buffer).unwrap(), "one\r\n  two");
    }

    #[test]
    fn blank_buffer_serializes_to_empty() {
        let buffer = Buffer::empty(Rect::new(0, 0, 20, 5));
        assert_eq!(buffer_to_ansi(&buffer).unwrap(), "");
    }

    #[test]
    fn styled_run_is_wrapped_in_sgr_and_reset() {
        let mut buffer = Buffer::empty(Rect::new(0, 0, 8, 1));
        buffer.set_string(0, 0, "ab", Style::default().fg(Color::Cyan));
        let text = buffer_to_ansi(&buffer).unwrap();
        assert_eq!(text, "\x1b[0m\x1b[38;5;6mab\x1b[0m");
    }

    #[test]
    fn rgb_and_bold_are_emitted() {
        let mut buffer = Buffer::empty(Rect::new(0, 0, 4, 1));
        let style = Style::default()
            .fg(Color::Rgb(0x22, 0xe9, 0xd8))
            .add_modifier(Modifier::BOLD);
        buffer.set_string(0, 0, "x", style);
        let text = buffer_to_ansi(&buffer).unwrap();
        assert!(text.contains("\x1b[38;2;34;233;216m"), "{text:?}");
        assert!(text.contains("\x1b[1m"), "{text:?}");
        assert!(text.starts_with("\x1b[0m"));
        assert!(text.ends_with("x\x1b[0m"));
    }

    #[test]
    fn wide_graphemes_are_not_doubled() {
        let mut buffer = Buffer::empty(Rect::new(0, 0, 6, 1));
        buffer.set_string(0, 0, "📧ab", Style::default());
        assert_eq!(buffer_to_ansi(&buffer).unwrap(), "📧ab");
    }
}
