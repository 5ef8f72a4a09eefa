/// Abstract input events decoded from a remote terminal.
///
/// `InputEvent` is what a [`Model`](crate::Model) receives for every inbound
/// keystroke frame, regardless of which transport carried it. The set is
/// closed: byte sequences the [`decoder`](crate::decoder) does not know map
/// to [`InputEvent::Unrecognized`] and the program decides what to do with
/// them.
///
/// # Example
///
/// ```rust,ignore
/// impl From<InputEvent> for Msg {
///     fn from(event: InputEvent) -> Self {
///         match event {
///             InputEvent::ArrowUp | InputEvent::Char('k') => Msg::Up,
///             InputEvent::ArrowDown | InputEvent::Char('j') => Msg::Down,
///             _ => Msg::Noop,
///         }
///     }
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputEvent {
    /// `ESC [ A`
    ArrowUp,
    /// `ESC [ B`
    ArrowDown,
    /// `ESC [ D`
    ArrowLeft,
    /// `ESC [ C`
    ArrowRight,
    /// Carriage return or line feed.
    Enter,
    /// A lone `ESC` byte.
    Escape,
    /// `DEL` or `BS`.
    Backspace,
    /// The space bar.
    Space,
    /// A printable ASCII character (0x21–0x7E).
    Char(char),
    /// Anything the decoder has no mapping for.
    Unrecognized,
}

impl InputEvent {
    /// Short human-readable label, used by help lines and logs.
    pub fn label(&self) -> String {
        match self {
            InputEvent::ArrowUp => "↑".to_string(),
            InputEvent::ArrowDown => "↓".to_string(),
            InputEvent::ArrowLeft => "←".to_string(),
            InputEvent::ArrowRight => "→".to_string(),
            InputEvent::Enter => "enter".to_string(),
            InputEvent::Escape => "esc".to_string(),
            InputEvent::Backspace => "backspace".to_string(),
            InputEvent::Space => "space".to_string(),
            InputEvent::Char(c) => c.to_string(),
            InputEvent::Unrecognized => "?".to_string(),
        }
    }
}

/// Terminal dimensions in character cells.
///
/// Both axes are always at least 1; [`Geometry::new`] clamps zero up to one.
/// A session starts at [`Geometry::FALLBACK`] until the transport reports a
/// real size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Geometry {
    cols: u16,
    rows: u16,
}

impl Geometry {
    /// The size assumed before the first geometry notification.
    pub const FALLBACK: Geometry = Geometry { cols: 80, rows: 24 };

    /// Largest accepted value for either axis. Bigger resize requests are
    /// treated as malformed control messages.
    pub const MAX_DIMENSION: u16 = 1000;

    /// Create a geometry, clamping each axis into `1..=MAX_DIMENSION`.
    pub fn new(cols: u16, rows: u16) -> Self {
        Self {
            cols: cols.clamp(1, Self::MAX_DIMENSION),
            rows: rows.clamp(1, Self::MAX_DIMENSION),
        }
    }

    /// Checked constructor for untrusted input: `None` unless both axes are
    /// within `1..=MAX_DIMENSION`.
    pub fn try_new(cols: u64, rows: u64) -> Option<Self> {
        let valid = 1..=u64::from(Self::MAX_DIMENSION);
        if valid.contains(&cols) && valid.contains(&rows) {
            Some(Self {
                cols: cols as u16,
                rows: rows as u16,
            })
        } else {
            None
        }
    }

    /// Number of columns.
    pub fn cols(&self) -> u16 {
        self.cols
    }

    /// Number of rows.
    pub fn rows(&self) -> u16 {
        self.rows
    }

    /// The geometry as a ratatui area anchored at the origin.
    pub fn area(&self) -> ratatui::layout::Rect {
        ratatui::layout::Rect::new(0, 0, self.cols, self.rows)
    }
}

impl Default for Geometry {
    fn default() -> Self {
        Self::FALLBACK
    }
}

impl std::fmt::Display for Geometry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.cols, self.rows)
    }
}
