//! The portfolio program served to every client.
//!
//! A welcome banner sits above either the command menu or the output of the
//! chosen command. Menu choices travel as a [`menu::Message::Selected`]
//! follow-up so opening a command goes through the same effect path as any
//! other command.

use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::text::Line;
use ratatui::widgets::{Block, BorderType, Padding, Paragraph};
use ratatui::Frame;
use termfolio_core::{Command, Component, Geometry, InputEvent, Model};
use termfolio_widgets::help::Help;
use termfolio_widgets::key::{Binding, KeyMap};
use termfolio_widgets::menu::{self, Menu, MenuItem, Section};
use termfolio_widgets::viewport::{self, Viewport};

use crate::content::{Category, Entry};
use crate::theme::{StyleTag, Theme};


const BANNER: [&str; 6] = [
    "  ██████╗ ███████╗███╗   ██╗ █████╗ ██████╗ ",
    " ██╔════╝ ██╔════╝████╗  ██║██╔══██╗██╔══██╗",
    " ██║  ███╗█████╗  ██╔██╗ ██║███████║██████╔╝",
    " ██║   ██║██╔══╝  ██║╚██╗██║██╔══██║██╔══██╗",
    " ╚██████╔╝███████╗██║ ╚████║██║  ██║██║  ██║",
    "  ╚═════╝ ╚══════╝╚═╝  ╚═══╝╚═╝  ╚═╝╚═╝  ╚═╝",
];

/// Banner art, greeting, hint line and the blank rows between them.
const BANNER_HEIGHT: u16 = BANNER.len() as u16 + 4;
/// The key help line.
const FOOTER_HEIGHT: u16 = 1;
const MENU_TITLE: &str = "SELECT A COMMAND";

/// Per-connection startup data.
#[derive(Debug, Clone, Default)]
pub struct Flags {
    pub theme: Theme,
}

/// Which screen is showing below the banner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Menu,
    Content(Entry),
}

#[derive(Debug)]
pub enum Msg {
    Input(InputEvent),
    Menu(menu::Message),
    Viewport(viewport::Message),
}

impl From<InputEvent> for Msg {
    fn from(event: InputEvent) -> Self {
        Msg::Input(event)
    }
}

/// The program's key bindings.
#[derive(Debug, Clone)]
pub struct Keys {
    pub up: Binding,
    pub down: Binding,
    pub select: Binding,
    pub back: Binding,
    pub help: Binding,
    pub quit: Binding,
}

impl Default for Keys {
    fn default() -> Self {
        Self {
            up: Binding::new([InputEvent::ArrowUp, InputEvent::Char('k')], "up"),
            down: Binding::new([InputEvent::ArrowDown, InputEvent::Char('j')], "down"),
            select: Binding::new([InputEvent::Enter, InputEvent::Space], "select")
                .with_help_key("enter"),
            back: Binding::new([InputEvent::Escape, InputEvent::Backspace], "back")
                .with_help_key("esc"),
            help: Binding::new([InputEvent::Char('h')], "help"),
            quit: Binding::new([InputEvent::Char('q')], "quit"),
        }
    }
}

pub struct Portfolio {
    theme: Theme,
    keys: Keys,
    help: Help,
    menu: Menu,
    viewport: Viewport,
    mode: Mode,
    geometry: Geometry,
}

impl Portfolio {
    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn cursor(&self) -> usize {
        self.menu.cursor()
    }

    pub fn geometry(&self) -> Geometry {
        self.geometry
    }

    /// Width command output is wrapped to.
    pub fn content_width(&self) -> u16 {
        self.viewport.text_width()
    }

    /// First visible row of the command output.
    pub fn scroll_offset(&self) -> usize {
        self.viewport.y_offset()
    }

    /// Command output rows after wrapping.
    pub fn content_rows(&self) -> &[Line<'static>] {
        self.viewport.rows()
    }

    fn open(&mut self, entry: Entry) {
        let mut lines = entry.render(&self.theme);
        if entry == Entry::Help {
            lines.extend(self.help.full_help_lines(&self.keys));
        }
        self.viewport.set_content(lines);
        self.viewport.focus();
        self.menu.blur();
        self.mode = Mode::Content(entry);
    }

    fn back(&mut self) {
        self.viewport.clear();
        self.viewport.blur();
        self.menu.focus();
        self.mode = Mode::Menu;
    }

    fn handle_key(&mut self, event: InputEvent) -> Command<Msg> {
        if self.keys.quit.matches(&event) {
            return Command::quit();
        }
        match self.mode {
            Mode::Menu => {
                let msg = if self.keys.up.matches(&event) {
                    menu::Message::CursorUp
                } else if self.keys.down.matches(&event) {
                    menu::Message::CursorDown
                } else if self.keys.select.matches(&event) {
                    menu::Message::Choose
                } else if self.keys.help.matches(&event) {
                    if let Some(index) = self.menu.position(Entry::Help.name()) {
                        self.menu.update(menu::Message::Focus(index));
                    }
                    self.open(Entry::Help);
                    return Command::none();
                } else {
                    return Command::none();
                };
                self.menu.update(msg).map(Msg::Menu)
            }
            Mode::Content(_) => {
                if self.keys.back.matches(&event) {
                    self.back();
                    Command::none()
                } else if self.keys.up.matches(&event) {
                    Command::message(Msg::Viewport(viewport::Message::ScrollUp(1)))
                } else if self.keys.down.matches(&event) {
                    Command::message(Msg::Viewport(viewport::Message::ScrollDown(1)))
                } else {
                    Command::none()
                }
            }
        }
    }

    fn banner_lines(&self) -> Vec<Line<'static>> {
        let mut lines: Vec<Line<'static>> = BANNER
            .iter()
            .map(|row| Line::from(self.theme.styled(*row, StyleTag::Banner)))
            .collect();
        lines.push(Line::raw(""));
        lines.push(Line::from(self.theme.styled(
            "                    Welcome to my SSH Portfolio Terminal!",
            StyleTag::Welcome,
        )));
        lines.push(Line::raw(""));
        lines.push(Line::from(self.theme.styled(
            "                Navigate with ↑↓/jk, Enter to select, 'q' to quit, ESC to go back",
            StyleTag::Dim,
        )));
        lines
    }

    fn view_menu(&self, frame: &mut Frame, area: Rect) {
        let title_width = MENU_TITLE.len() as u16 + 6;
        let [title, list] =
            Layout::vertical([Constraint::Length(3), Constraint::Fill(1)]).areas(area);
        let [title, _] =
            Layout::horizontal([Constraint::Length(title_width), Constraint::Fill(1)])
                .areas(title);

        let block = Block::bordered()
            .border_type(BorderType::Rounded)
            .border_style(self.theme.style(StyleTag::Title))
            .padding(Padding::horizontal(1));
        frame.render_widget(
            Paragraph::new(self.theme.styled(format!(" {MENU_TITLE} "), StyleTag::Title))
                .block(block),
            title,
        );
        self.menu.view(frame, list);
    }
}

/// Content area size for a client of the given geometry.
fn viewport_size(geometry: Geometry) -> (u16, u16) {
    let height = geometry
        .rows()
        .saturating_sub(BANNER_HEIGHT + FOOTER_HEIGHT)
        .max(1);
    (geometry.cols(), height)
}

fn sections(theme: &Theme) -> Menu {
    let section = |category: Category| {
        let items = Entry::ALL
            .iter()
            .filter(|entry| entry.category() == category)
            .map(|entry| MenuItem::new(entry.name(), entry.description()))
            .collect();
        Section::new(category.title(), items)
    };
    Menu::new(vec![section(Category::Portfolio), section(Category::System)])
        .with_style(theme.menu_style())
}

impl Model for Portfolio {
    type Message = Msg;
    type Flags = Flags;

    fn init(flags: Flags, geometry: Geometry) -> (Self, Command<Msg>) {
        let theme = flags.theme;
        let (width, height) = viewport_size(geometry);
        let model = Portfolio {
            keys: Keys::default(),
            help: Help::new().with_style(theme.help_style()),
            menu: sections(&theme),
            viewport: Viewport::new(width, height).with_style(theme.viewport_style()),
            mode: Mode::Menu,
            geometry,
            theme,
        };
        (model, Command::none())
    }

    fn update(&mut self, msg: Msg) -> Command<Msg> {
        match msg {
            Msg::Input(event) => self.handle_key(event),
            Msg::Menu(menu::Message::Selected(index)) => {
                if let Some(entry) = Entry::ALL.get(index).copied() {
                    self.open(entry);
                }
                Command::none()
            }
            Msg::Menu(msg) => self.menu.update(msg).map(Msg::Menu),
            Msg::Viewport(msg) => self.viewport.update(msg).map(Msg::Viewport),
        }
    }

    fn view(&self, frame: &mut Frame) {
        let [banner, body, footer] = Layout::vertical([
            Constraint::Length(BANNER_HEIGHT),
            Constraint::Fill(1),
            Constraint::Length(FOOTER_HEIGHT),
        ])
        .areas(frame.area());

        frame.render_widget(Paragraph::new(self.banner_lines()), banner);
        match self.mode {
            Mode::Menu => self.view_menu(frame, body),
            Mode::Content(Entry::Date) => {
                // re-read the clock on every render so the heartbeat keeps it current
                let mut live = self.viewport.clone();
                live.set_content(Entry::Date.render(&self.theme));
                live.view(frame, body);
            }
            Mode::Content(_) => self.viewport.view(frame, body),
        }

        let line = self.help.short_help_line(self, footer.width);
        frame.render_widget(Paragraph::new(line), footer);
    }

    fn resize(&mut self, geometry: Geometry) -> Command<Msg> {
        self.geometry = geometry;
        let (width, height) = viewport_size(geometry);
        self.viewport.set_size(width, height);
        Command::none()
    }
}

impl KeyMap for Keys {
    fn short_help(&self) -> Vec<&Binding> {
        vec![&self.up, &self.down, &self.select, &self.help, &self.quit]
    }

    fn full_help(&self) -> Vec<Vec<&Binding>> {
        vec![
            vec![&self.up, &self.down],
            vec![&self.select, &self.back, &self.help],
            vec![&self.quit],
        ]
    }
}

impl KeyMap for Portfolio {
    fn short_help(&self) -> Vec<&Binding> {
        match self.mode {
            Mode::Menu => self.keys.short_help(),
            Mode::Content(_) => vec![&self.keys.up, &self.keys.down, &self.keys.back, &self.keys.quit],
        }
    }

    fn full_help(&self) -> Vec<Vec<&Binding>> {
        self.keys.full_help()
    }
}
