use crate::command::Command;
use crate::event::{Geometry, InputEvent};
use ratatui::Frame;

/// The interactive program served to every remote client, following the
/// [Elm Architecture].
///
/// Each connection gets its own `Model` instance, owned by a
/// [`Session`](crate::Session). The session drives the cycle:
///
/// 1. [`init`](Model::init) creates the initial state for the client's
///    geometry and may return a [`Command`] for early side effects.
/// 2. Decoded keystrokes arrive as `Message::from(InputEvent)` and go through
///    [`update`](Model::update), which mutates state and returns a follow-up
///    [`Command`].
/// 3. Geometry changes go through [`resize`](Model::resize).
/// 4. [`view`](Model::view) draws the current state into a frame whose area
///    equals the current geometry. The session calls it on every forced
///    render and on a slow heartbeat, never in response to a specific
///    message, so it must be a pure function of `&self`.
///
/// # Example
///
/// ```rust,ignore
/// use termfolio_core::{Command, Geometry, InputEvent, Model};
/// use ratatui::Frame;
/// use ratatui::widgets::Paragraph;
///
/// struct Counter {
///     count: i32,
/// }
///
/// enum Msg {
///     Increment,
///     Ignore,
/// }
///
/// impl From<InputEvent> for Msg {
///     fn from(event: InputEvent) -> Self {
///         match event {
///             InputEvent::Char('+') => Msg::Increment,
///             _ => Msg::Ignore,
///         }
///     }
/// }
///
/// impl Model for Counter {
///     type Message = Msg;
///     type Flags = ();
///
///     fn init(_flags: (), _geometry: Geometry) -> (Self, Command<Msg>) {
///         (Counter { count: 0 }, Command::none())
///     }
///
///     fn update(&mut self, msg: Msg) -> Command<Msg> {
///         if let Msg::Increment = msg {
///             self.count += 1;
///         }
///         Command::none()
///     }
///
///     fn view(&self, frame: &mut Frame) {
///         frame.render_widget(
///             Paragraph::new(format!("Count: {}", self.count)),
///             frame.area(),
///         );
///     }
/// }
/// ```
///
/// [Elm Architecture]: https://guide.elm-lang.org/architecture/
pub trait Model: Sized + Send + 'static {
    /// The program's message type.
    ///
    /// Every keystroke reaches the program through the `From<InputEvent>`
    /// conversion; other messages come from [`Command::message`] or from
    /// async work completed via [`Command::perform`].
    type Message: From<InputEvent> + Send + 'static;

    /// Per-connection startup data, cloned from the server's configuration
    /// for every new session.
    type Flags: Clone + Send + Sync + 'static;

    /// Create the initial state for a client with the given geometry.
    fn init(flags: Self::Flags, geometry: Geometry) -> (Self, Command<Self::Message>);

    /// Process a message, mutate state, and return a follow-up command.
    fn update(&mut self, msg: Self::Message) -> Command<Self::Message>;

    /// Draw the current state into `frame`.
    fn view(&self, frame: &mut Frame);

    /// The client terminal changed size.
    ///
    /// The default implementation ignores the notification, which is fine
    /// for views that only read `frame.area()`.
    fn resize(&mut self, geometry: Geometry) -> Command<Self::Message> {
        let _ = geometry;
        Command::none()
    }
}
