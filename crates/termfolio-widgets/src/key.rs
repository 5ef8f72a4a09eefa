//! Named key bindings and the [`KeyMap`] trait the help widget reads.

use termfolio_core::InputEvent;

/// An action reachable through one or more input events.
#[derive(Debug, Clone)]
pub struct Binding {
    pub keys: Vec<InputEvent>,
    /// Label for help lines, `↑/k` by default for `[ArrowUp, Char('k')]`.
    pub help_key: String,
    pub description: String,
    pub enabled: bool,
}

impl Binding {
    pub fn new(keys: impl IntoIterator<Item = InputEvent>, description: impl Into<String>) -> Self {
        let keys: Vec<InputEvent> = keys.into_iter().collect();
        let labels: Vec<String> = keys.iter().map(InputEvent::label).collect();
        Self {
            help_key: labels.join("/"),
            keys,
            description: description.into(),
            enabled: true,
        }
    }

    pub fn with_help_key(self, label: impl Into<String>) -> Self {
        Self {
            help_key: label.into(),
            ..self
        }
    }

    pub fn enabled(self, enabled: bool) -> Self {
        Self { enabled, ..self }
    }

    /// True when `event` is one of this binding's keys and the binding is on.
    pub fn matches(&self, event: &InputEvent) -> bool {
        self.enabled && self.keys.iter().any(|key| key == event)
    }
}

/// Bindings a program wants shown by [`Help`](crate::help::Help).
pub trait KeyMap {
    /// The few bindings worth a place on the one-line footer.
    fn short_help(&self) -> Vec<&Binding>;

    /// Every binding, in display groups.
    fn full_help(&self) -> Vec<Vec<&Binding>>;
}
