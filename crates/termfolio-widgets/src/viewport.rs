//! Scrollable content area over wrapped, pre-styled lines.

use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::text::Line;
use ratatui::widgets::{Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState};
use ratatui::Frame;
use termfolio_core::{Command, Component};

use crate::wrap::wrap_lines;

/// Messages for the viewport component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    /// Scroll up by the given number of rows.
    ScrollUp(u16),
    /// Scroll down by the given number of rows.
    ScrollDown(u16),
}

/// Style configuration for the viewport.
#[derive(Debug, Clone)]
pub struct ViewportStyle {
    /// Style applied to the vertical scrollbar.
    pub scrollbar: Style,
}

impl Default for ViewportStyle {
    fn default() -> Self {
        Self {
            scrollbar: Style::default().fg(Color::DarkGray),
        }
    }
}

/// A scrollable content area.
///
/// Content is hard-wrapped to the viewport width (one column is kept free
/// for the scrollbar), so the number of rows, and therefore how far the
/// content scrolls, depends on the size set with
/// [`set_size`](Viewport::set_size).
///
/// # Example
///
/// ```ignore
/// let mut vp = Viewport::new(80, 10);
/// vp.set_content(vec![Line::raw("Hello"), Line::raw("world")]);
/// vp.update(Message::ScrollDown(1));
/// ```
#[derive(Clone)]
pub struct Viewport {
    content: Vec<Line<'static>>,
    rows: Vec<Line<'static>>,
    offset: usize,
    width: u16,
    height: u16,
    style: ViewportStyle,
    focus: bool,
}

impl Viewport {
    /// Create an empty viewport of the given size.
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            content: Vec::new(),
            rows: Vec::new(),
            offset: 0,
            width,
            height,
            style: ViewportStyle::default(),
            focus: false,
        }
    }

    /// Set the viewport style configuration.
    pub fn with_style(mut self, style: ViewportStyle) -> Self {
        self.style = style;
        self
    }

    /// Replace the content, resetting the scroll position.
    pub fn set_content(&mut self, lines: Vec<Line<'static>>) {
        self.content = lines;
        self.offset = 0;
        self.rewrap();
    }

    /// Remove all content.
    pub fn clear(&mut self) {
        self.set_content(Vec::new());
    }

    /// Change the size; content is re-wrapped and the offset clamped.
    pub fn set_size(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
        self.rewrap();
    }

    /// Give focus to the viewport.
    pub fn focus(&mut self) {
        self.focus = true;
    }

    /// Remove focus from the viewport.
    pub fn blur(&mut self) {
        self.focus = false;
    }

    /// Current vertical scroll offset, in rows.
    pub fn y_offset(&self) -> usize {
        self.offset
    }

    /// Width the content is wrapped to.
    pub fn text_width(&self) -> u16 {
        self.width.saturating_sub(1).max(1)
    }

    /// The wrapped rows.
    pub fn rows(&self) -> &[Line<'static>] {
        &self.rows
    }

    fn max_offset(&self) -> usize {
        self.rows.len().saturating_sub(usize::from(self.height))
    }

    fn rewrap(&mut self) {
        self.rows = wrap_lines(&self.content, usize::from(self.text_width()));
        self.offset = self.offset.min(self.max_offset());
    }

    fn scroll_by(&mut self, delta: isize) {
        let target = self.offset.saturating_add_signed(delta);
        self.offset = target.min(self.max_offset());
    }
}

impl Component for Viewport {
    type Message = Message;

    fn update(&mut self, msg: Message) -> Command<Message> {
        match msg {
            Message::ScrollUp(n) => self.scroll_by(-(n as isize)),
            Message::ScrollDown(n) => self.scroll_by(n as isize),
        }
        Command::none()
    }

    fn view(&self, frame: &mut Frame, area: Rect) {
        let visible = usize::from(area.height.min(self.height));
        let end = (self.offset + visible).min(self.rows.len());
        let rows = self.rows[self.offset.min(end)..end].to_vec();
        frame.render_widget(Paragraph::new(rows), area);

        if self.rows.len() > visible {
            let mut state = ScrollbarState::new(self.max_offset()).position(self.offset);
            let scrollbar = Scrollbar::new(ScrollbarOrientation::VerticalRight)
                .begin_symbol(None)
                .end_symbol(None)
                .style(self.style.scrollbar);
            frame.render_stateful_widget(scrollbar, area, &mut state);
        }
    }

    fn focused(&self) -> bool {
        self.focus
    }
}
