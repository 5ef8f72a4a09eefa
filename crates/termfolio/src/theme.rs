//! Stateless styling for the portfolio program.
//!
//! A [`Theme`] maps a semantic [`StyleTag`] to a ratatui [`Style`]. It is a
//! plain value handed to each session through its flags, so every piece of
//! content is styled by calling [`Theme::styled`] rather than reaching for
//! shared style constants.

use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Span;
use serde::Deserialize;
use termfolio_widgets::help::HelpStyle;
use termfolio_widgets::menu::MenuStyle;
use termfolio_widgets::viewport::ViewportStyle;

/// What a piece of text is, independent of how it looks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StyleTag {
    /// The block-letter banner.
    Banner,
    /// The welcome greeting under the banner.
    Welcome,
    /// Boxed titles and their borders.
    Title,
    /// Menu section headings and content labels.
    Label,
    /// Values next to labels.
    Value,
    /// Secondary, de-emphasized text.
    Dim,
    /// Ordinary body text.
    Body,
    /// Highlighted body text.
    Accent,
    /// The menu entry under the cursor.
    Selected,
    /// Table rules and frames.
    TableBorder,
    /// Table column headings.
    TableHeader,
    /// Key labels in help lines.
    Key,
}

/// Available color palettes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Palette {
    /// Neon colors on the terminal's own background.
    #[default]
    Cyberpunk,
    /// No colors; emphasis through attributes only.
    Plain,
}

const CYAN: Color = Color::Rgb(0x22, 0xe9, 0xd8);
const PINK: Color = Color::Rgb(0xe3, 0x48, 0x80);
const PURPLE: Color = Color::Rgb(0x8b, 0x5c, 0xf6);
const GREEN: Color = Color::Rgb(0x10, 0xb9, 0x81);
const YELLOW: Color = Color::Rgb(0xfb, 0xbf, 0x24);
const LIGHT: Color = Color::Rgb(0xf9, 0xfa, 0xfb);
const DIM: Color = Color::Rgb(0x9c, 0xa3, 0xaf);

/// Maps [`StyleTag`]s to concrete styles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Theme {
    palette: Palette,
}

impl Theme {
    pub fn new(palette: Palette) -> Self {
        Self { palette }
    }

    pub fn cyberpunk() -> Self {
        Self::new(Palette::Cyberpunk)
    }

    pub fn plain() -> Self {
        Self::new(Palette::Plain)
    }

    pub fn palette(&self) -> Palette {
        self.palette
    }

    /// The style for `tag`.
    pub fn style(&self, tag: StyleTag) -> Style {
        match self.palette {
            Palette::Cyberpunk => cyberpunk(tag),
            Palette::Plain => plain(tag),
        }
    }

    /// `text` as a span styled for `tag`.
    pub fn styled(&self, text: impl Into<String>, tag: StyleTag) -> Span<'static> {
        Span::styled(text.into(), self.style(tag))
    }

    pub fn menu_style(&self) -> MenuStyle {
        MenuStyle {
            title: self.style(StyleTag::Label),
            selected: self.style(StyleTag::Selected),
            normal: self.style(StyleTag::Body),
            indicator: "▸ ".to_string(),
        }
    }

    pub fn help_style(&self) -> HelpStyle {
        HelpStyle {
            key: self.style(StyleTag::Key),
            description: self.style(StyleTag::Dim),
            separator: self.style(StyleTag::Dim),
        }
    }

    pub fn viewport_style(&self) -> ViewportStyle {
        ViewportStyle {
            scrollbar: self.style(StyleTag::Accent),
        }
    }
}

fn cyberpunk(tag: StyleTag) -> Style {
    let base = Style::default();
    match tag {
        StyleTag::Banner | StyleTag::Title | StyleTag::Key => {
            base.fg(CYAN).add_modifier(Modifier::BOLD)
        }
        StyleTag::Welcome | StyleTag::Selected => base.fg(PINK).add_modifier(Modifier::BOLD),
        StyleTag::Label | StyleTag::TableHeader => base.fg(GREEN).add_modifier(Modifier::BOLD),
        StyleTag::Value | StyleTag::TableBorder => base.fg(YELLOW),
        StyleTag::Dim => base.fg(DIM).add_modifier(Modifier::ITALIC),
        StyleTag::Body => base.fg(LIGHT),
        StyleTag::Accent => base.fg(PURPLE),
    }
}

fn plain(tag: StyleTag) -> Style {
    let base = Style::default();
    match tag {
        StyleTag::Banner
        | StyleTag::Welcome
        | StyleTag::Title
        | StyleTag::Label
        | StyleTag::TableHeader
        | StyleTag::Key => base.add_modifier(Modifier::BOLD),
        StyleTag::Selected => base.add_modifier(Modifier::REVERSED),
        StyleTag::Dim => base.add_modifier(Modifier::DIM),
        StyleTag::Value | StyleTag::Body | StyleTag::Accent | StyleTag::TableBorder => base,
    }
}
