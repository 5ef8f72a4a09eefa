//! Sectioned selection menu.
//!
//! Items are grouped under titled sections but share one cursor that runs
//! through every item in order. Choosing an item emits
//! [`Message::Selected`] so the parent can react to it.

use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;
use termfolio_core::{Command, Component};

use crate::selection::SelectionState;

/// Messages for the menu component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    /// Move the cursor to the previous item.
    CursorUp,
    /// Move the cursor to the next item.
    CursorDown,
    /// Place the cursor on a specific item.
    Focus(usize),
    /// Choose the item under the cursor.
    Choose,
    /// Emitted when an item is chosen, carrying its flat index.
    Selected(usize),
}

/// One selectable entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuItem {
    pub name: String,
    pub description: String,
}

impl MenuItem {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
        }
    }
}

/// A titled group of items.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub title: String,
    pub items: Vec<MenuItem>,
}

impl Section {
    pub fn new(title: impl Into<String>, items: Vec<MenuItem>) -> Self {
        Self {
            title: title.into(),
            items,
        }
    }
}

/// Visual style configuration for the [`Menu`] component.
#[derive(Debug, Clone)]
pub struct MenuStyle {
    /// Section titles.
    pub title: Style,
    /// The item under the cursor.
    pub selected: Style,
    /// Every other item.
    pub normal: Style,
    /// Marker drawn before the item under the cursor.
    pub indicator: String,
}

impl Default for MenuStyle {
    fn default() -> Self {
        Self {
            title: Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
            selected: Style::default()
                .fg(Color::Magenta)
                .add_modifier(Modifier::BOLD),
            normal: Style::default(),
            indicator: "▸ ".to_string(),
        }
    }
}

/// A vertical menu of sectioned items with a clamped cursor.
pub struct Menu {
    sections: Vec<Section>,
    selection: SelectionState,
    style: MenuStyle,
    focus: bool,
}

impl Menu {
    /// Create a menu over `sections`, cursor on the first item.
    pub fn new(sections: Vec<Section>) -> Self {
        let count = sections.iter().map(|s| s.items.len()).sum();
        Self {
            sections,
            selection: SelectionState::new(count),
            style: MenuStyle::default(),
            focus: true,
        }
    }

    /// Set the visual style.
    pub fn with_style(mut self, style: MenuStyle) -> Self {
        self.style = style;
        self
    }

    /// Flat index of the item under the cursor.
    pub fn cursor(&self) -> usize {
        self.selection.cursor()
    }

    /// Total number of items across all sections.
    pub fn len(&self) -> usize {
        self.selection.count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn items(&self) -> impl Iterator<Item = &MenuItem> {
        self.sections.iter().flat_map(|s| s.items.iter())
    }

    /// Flat index of the first item called `name`.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.items().position(|item| item.name == name)
    }

    /// Give keyboard focus to the menu.
    pub fn focus(&mut self) {
        self.focus = true;
    }

    /// Remove keyboard focus from the menu.
    pub fn blur(&mut self) {
        self.focus = false;
    }

    /// The rendered menu, one entry per line, with a blank line between
    /// sections.
    pub fn lines(&self) -> Vec<Line<'static>> {
        let mut lines = Vec::new();
        let mut index = 0;
        for (section_idx, section) in self.sections.iter().enumerate() {
            if section_idx > 0 {
                lines.push(Line::raw(""));
            }
            lines.push(Line::from(Span::styled(
                section.title.clone(),
                self.style.title,
            )));
            for item in &section.items {
                let text = format!("{} - {}", item.name, item.description);
                let line = if index == self.cursor() {
                    Line::from(vec![
                        Span::raw("  "),
                        Span::styled(format!("{}{text}", self.style.indicator), self.style.selected),
                    ])
                } else {
                    Line::from(vec![Span::raw("    "), Span::styled(text, self.style.normal)])
                };
                lines.push(line);
                index += 1;
            }
        }
        lines
    }
}

impl Component for Menu {
    type Message = Message;

    fn update(&mut self, msg: Message) -> Command<Message> {
        match msg {
            Message::CursorUp => self.selection.move_up(),
            Message::CursorDown => self.selection.move_down(),
            Message::Focus(index) => self.selection.select(index),
            Message::Choose if !self.is_empty() => {
                return Command::message(Message::Selected(self.cursor()));
            }
            Message::Choose | Message::Selected(_) => {}
        }
        Command::none()
    }

    fn view(&self, frame: &mut Frame, area: Rect) {
        frame.render_widget(Paragraph::new(self.lines()), area);
    }

    fn focused(&self) -> bool {
        self.focus
    }
}
