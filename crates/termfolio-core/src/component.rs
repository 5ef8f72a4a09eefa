use ratatui::layout::Rect;
use ratatui::Frame;

use crate::command::Command;

/// A piece of a [`Model`](crate::Model) that owns its own state and draws
/// into whatever area its parent hands it.
///
/// The parent keeps a message variant per child and forwards with
/// [`Command::map`]:
///
/// ```rust,ignore
/// Msg::Menu(inner) => self.menu.update(inner).map(Msg::Menu),
/// ```
pub trait Component: Send + 'static {
    type Message: Send + 'static;

    fn update(&mut self, msg: Self::Message) -> Command<Self::Message>;

    /// Draw into `area` only.
    fn view(&self, frame: &mut Frame, area: Rect);

    /// Whether keystrokes should be routed here.
    fn focused(&self) -> bool {
        false
    }
}
