//! Keybinding help with a one-line short view and a grouped full view.

use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use unicode_width::UnicodeWidthStr;

use crate::key::{Binding, KeyMap};

/// Renders [`KeyMap`] bindings as a status line or a grouped listing.
#[derive(Debug, Clone)]
pub struct Help {
    style: HelpStyle,
    separator: String,
    ellipsis: String,
    max_entries: usize,
}

/// Visual style configuration for the [`Help`] component.
#[derive(Debug, Clone)]
pub struct HelpStyle {
    /// Style applied to key labels.
    pub key: Style,
    /// Style applied to binding descriptions.
    pub description: Style,
    /// Style applied to the separator between entries.
    pub separator: Style,
}

impl Default for HelpStyle {
    fn default() -> Self {
        Self {
            key: Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
            description: Style::default().fg(Color::Gray),
            separator: Style::default().fg(Color::DarkGray),
        }
    }
}

impl Help {
    /// Create a help renderer with default settings.
    pub fn new() -> Self {
        Self {
            style: HelpStyle::default(),
            separator: " \u{2022} ".to_string(), // " • "
            ellipsis: "\u{2026}".to_string(),    // "…"
            max_entries: 6,
        }
    }

    /// Set the visual style.
    pub fn with_style(mut self, style: HelpStyle) -> Self {
        self.style = style;
        self
    }

    /// Set the separator used between entries in the short line.
    pub fn with_separator(mut self, s: impl Into<String>) -> Self {
        self.separator = s.into();
        self
    }

    /// Build the short help line for `keymap`, truncated to `max_width`
    /// display columns.
    pub fn short_help_line(&self, keymap: &impl KeyMap, max_width: u16) -> Line<'static> {
        self.short_help_view(&keymap.short_help(), max_width)
    }

    /// Build a short help line from explicit bindings.
    ///
    /// Disabled bindings are skipped. When the next entry would not fit, an
    /// ellipsis is appended instead.
    pub fn short_help_view(&self, bindings: &[&Binding], max_width: u16) -> Line<'static> {
        let max = usize::from(max_width);
        let mut spans: Vec<Span<'static>> = Vec::new();
        let mut total_width = 0usize;

        let enabled = bindings.iter().filter(|b| b.enabled).take(self.max_entries);
        for (idx, b) in enabled.enumerate() {
            let entry_width = b.help_key.width() + 1 + b.description.width();
            let sep_width = if idx > 0 { self.separator.width() } else { 0 };

            if total_width + sep_width + entry_width > max {
                if total_width + sep_width + self.ellipsis.width() <= max {
                    if idx > 0 {
                        spans.push(Span::styled(self.separator.clone(), self.style.separator));
                    }
                    spans.push(Span::styled(self.ellipsis.clone(), self.style.separator));
                }
                break;
            }

            if idx > 0 {
                spans.push(Span::styled(self.separator.clone(), self.style.separator));
                total_width += sep_width;
            }
            spans.push(Span::styled(b.help_key.clone(), self.style.key));
            spans.push(Span::raw(" "));
            spans.push(Span::styled(b.description.clone(), self.style.description));
            total_width += entry_width;
        }
        Line::from(spans)
    }

    /// Build the full grouped listing for `keymap`, one binding per line
    /// with key labels padded to a common column.
    pub fn full_help_lines(&self, keymap: &impl KeyMap) -> Vec<Line<'static>> {
        let groups = keymap.full_help();
        let pad = groups
            .iter()
            .flatten()
            .map(|b| b.help_key.width())
            .max()
            .unwrap_or(0)
            + 2;

        let mut lines = Vec::new();
        for (group_idx, group) in groups.iter().enumerate() {
            if group_idx > 0 {
                lines.push(Line::raw(""));
            }
            for b in group.iter().filter(|b| b.enabled) {
                let gap = pad.saturating_sub(b.help_key.width());
                lines.push(Line::from(vec![
                    Span::raw("  "),
                    Span::styled(b.help_key.clone(), self.style.key),
                    Span::raw(" ".repeat(gap)),
                    Span::styled(b.description.clone(), self.style.description),
                ]));
            }
        }
        lines
    }
}

impl Default for Help {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use termfolio_core::InputEvent;

    struct Keys {
        up: Binding,
        down: Binding,
        quit: Binding,
        hidden: Binding,
    }

    impl Keys {
        fn new() -> Self {
            Self {
                up: Binding::new([InputEvent::ArrowUp, InputEvent::Char('k')], "up"),
                down: Binding::new([InputEvent::ArrowDown, InputEvent::Char('j')], "down"),
                quit: Binding::new([InputEvent::Char('q')], "quit"),
                hidden: Binding::new([InputEvent::Char('x')], "secret").enabled(false),
            }
        }
    }

    impl KeyMap for Keys {
        fn short_help(&self) -> Vec<&Binding> {
            vec![&self.up, &self.down, &self.hidden, &self.quit]
        }

        fn full_help(&self) -> Vec<Vec<&Binding>> {
            vec![vec![&self.up, &self.down], vec![&self.quit]]
        }
    }

    fn plain(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn short_line_joins_enabled_entries() {
        let line = Help::new().short_help_line(&Keys::new(), 80);
        assert_eq!(plain(&line), "↑/k up • ↓/j down • q quit");
    }

    #[test]
    fn short_line_truncates_with_ellipsis() {
        let line = Help::new().short_help_line(&Keys::new(), 16);
        assert_eq!(plain(&line), "↑/k up • …");
    }

    #[test]
    fn short_line_respects_custom_separator() {
        let line = Help::new()
            .with_separator("  ")
            .short_help_line(&Keys::new(), 80);
        assert_eq!(plain(&line), "↑/k up  ↓/j down  q quit");
    }

    #[test]
    fn full_lines_are_grouped_and_aligned() {
        let lines = Help::new().full_help_lines(&Keys::new());
        let text: Vec<String> = lines.iter().map(plain).collect();
        assert_eq!(
            text,
            vec!["  ↑/k  up", "  ↓/j  down", "", "  q    quit"]
        );
    }
}
